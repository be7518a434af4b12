use std::sync::{Arc, Mutex};
use std::time::Duration;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Stream, StreamConfig};
use tracing::{error, info};

use crate::buffer::AudioBuffer;
use crate::error::{Result, SynthError};

struct PlaybackCursor {
    buffer: AudioBuffer,
    position: f64, // in source frames
    step: f64,     // source frames per device frame
    finished: bool,
}

impl PlaybackCursor {
    fn new(buffer: AudioBuffer, device_rate: u32) -> Self {
        let step = buffer.sample_rate() as f64 / device_rate as f64;
        let finished = buffer.is_empty();
        PlaybackCursor { buffer, position: 0.0, step, finished }
    }

    // Linear interpolation between neighbouring frames; channels are summed
    // down to mono and then fanned out to every device channel.
    fn next_sample(&mut self) -> f32 {
        let frames = self.buffer.frames();
        let idx = self.position as usize;
        if idx >= frames {
            self.finished = true;
            return 0.0;
        }

        let channels = self.buffer.channels() as usize;
        let samples = self.buffer.samples();
        let frame_value = |i: usize| -> f32 {
            samples[i * channels..(i + 1) * channels].iter().sum::<f32>() / channels as f32
        };

        let frac = (self.position - idx as f64) as f32;
        let s1 = frame_value(idx);
        let s2 = if idx + 1 < frames { frame_value(idx + 1) } else { s1 };
        self.position += self.step;
        s1 * (1.0 - frac) + s2 * frac
    }
}

/// Fire-and-forget output to the default device. Nothing here feeds back into
/// composition; dropping the player stops the sound.
pub struct Player {
    device: cpal::Device,
    stream_config: StreamConfig,
    cursor: Arc<Mutex<Option<PlaybackCursor>>>,
    stream: Option<Stream>,
}

impl Player {
    pub fn new() -> Result<Self> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| SynthError::AudioError("No output device found".to_string()))?;
        let config = device
            .default_output_config()
            .map_err(|e| SynthError::AudioError(e.to_string()))?;

        Ok(Player {
            device,
            stream_config: config.config(),
            cursor: Arc::new(Mutex::new(None)),
            stream: None,
        })
    }

    pub fn device_sample_rate(&self) -> u32 {
        self.stream_config.sample_rate.0
    }

    pub fn play(&mut self, buffer: &AudioBuffer) -> Result<()> {
        self.stop();

        let device_rate = self.device_sample_rate();
        info!(
            "playing {} ms ({} Hz source, {} Hz device, {} channels)",
            buffer.duration_ms(),
            buffer.sample_rate(),
            device_rate,
            self.stream_config.channels
        );

        if let Ok(mut cursor) = self.cursor.lock() {
            *cursor = Some(PlaybackCursor::new(buffer.clone(), device_rate));
        }

        let channels = self.stream_config.channels as usize;
        let cursor = Arc::clone(&self.cursor);
        let stream = self
            .device
            .build_output_stream(
                &self.stream_config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    let Ok(mut lock) = cursor.lock() else {
                        data.fill(0.0);
                        return;
                    };
                    match lock.as_mut() {
                        Some(cursor) => {
                            for frame in data.chunks_mut(channels) {
                                let value = cursor.next_sample();
                                frame.fill(value);
                            }
                        }
                        None => data.fill(0.0),
                    }
                },
                |err| error!("Stream error: {}", err),
                None,
            )
            .map_err(|e| SynthError::AudioError(e.to_string()))?;

        stream.play().map_err(|e| SynthError::AudioError(e.to_string()))?;
        self.stream = Some(stream);
        Ok(())
    }

    pub fn is_finished(&self) -> bool {
        match self.cursor.lock() {
            Ok(cursor) => cursor.as_ref().is_none_or(|c| c.finished),
            Err(_) => true,
        }
    }

    /// Blocks until the buffer has been played out.
    pub fn wait(&self) {
        while !self.is_finished() {
            std::thread::sleep(Duration::from_millis(50));
        }
    }

    pub fn stop(&mut self) {
        if let Some(stream) = self.stream.take() {
            drop(stream);
        }
        if let Ok(mut cursor) = self.cursor.lock() {
            *cursor = None;
        }
    }
}
