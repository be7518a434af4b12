use fastrand::Rng;

use crate::buffer::AudioBuffer;
use crate::filter::db_to_amplitude;

/// Atomic signal source: sine tones and white-noise bursts at a fixed sample
/// rate. Owns the random source so a seeded generator renders identically
/// every time.
#[derive(Debug, Clone)]
pub struct ToneGenerator {
    sample_rate: u32,
    rng: Rng,
}

impl ToneGenerator {
    pub fn new(sample_rate: u32) -> Self {
        ToneGenerator { sample_rate, rng: Rng::new() }
    }

    pub fn with_seed(sample_rate: u32, seed: u64) -> Self {
        ToneGenerator { sample_rate, rng: Rng::with_seed(seed) }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn rng(&mut self) -> &mut Rng {
        &mut self.rng
    }

    /// Pure sine at `frequency` Hz, scaled so that 0 dB is full scale.
    /// `frequency` must be positive.
    pub fn sine(&self, frequency: f32, duration_ms: u64, volume_db: f32) -> AudioBuffer {
        let frames = AudioBuffer::frames_for_ms(duration_ms, self.sample_rate);
        let amplitude = db_to_amplitude(volume_db);
        let step = frequency as f64 / self.sample_rate as f64;

        let mut phase = 0.0f64; // [0.0, 1.0)
        let samples = (0..frames)
            .map(|_| {
                let output = (phase * std::f64::consts::TAU).sin() as f32 * amplitude;
                phase += step;
                if phase >= 1.0 {
                    phase -= phase.floor();
                }
                output
            })
            .collect();

        AudioBuffer::mono(samples, self.sample_rate)
    }

    /// Uniform white noise in [-1, 1) scaled by `volume_db`.
    pub fn noise(&mut self, duration_ms: u64, volume_db: f32) -> AudioBuffer {
        let frames = AudioBuffer::frames_for_ms(duration_ms, self.sample_rate);
        let amplitude = db_to_amplitude(volume_db);
        let samples = (0..frames)
            .map(|_| (self.rng.f32() * 2.0 - 1.0) * amplitude)
            .collect();

        AudioBuffer::mono(samples, self.sample_rate)
    }
}
