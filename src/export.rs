//! WAV file export/import: 16-bit signed little-endian PCM.

use std::path::Path;

use tracing::info;

use crate::buffer::AudioBuffer;
use crate::error::{Result, SynthError};

pub const DEFAULT_EXPORT_FILE: &str = "generated_dungeon_jazz.wav";

/// Clamps to [-1, 1] and scales to the i16 range.
pub fn to_pcm_i16(samples: &[f32]) -> Vec<i16> {
    samples
        .iter()
        .map(|&s| (s.clamp(-1.0, 1.0) * i16::MAX as f32) as i16)
        .collect()
}

pub fn write_wav(buffer: &AudioBuffer, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let file_error = |e: hound::Error| SynthError::FileError(format!("{}: {}", path.display(), e));

    let spec = hound::WavSpec {
        channels: buffer.channels(),
        sample_rate: buffer.sample_rate(),
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut writer = hound::WavWriter::create(path, spec).map_err(file_error)?;
    for sample in to_pcm_i16(buffer.samples()) {
        writer.write_sample(sample).map_err(file_error)?;
    }
    writer.finalize().map_err(file_error)?;

    info!("wrote {} ms of audio to {}", buffer.duration_ms(), path.display());
    Ok(())
}

pub fn read_wav(path: impl AsRef<Path>) -> Result<AudioBuffer> {
    let path = path.as_ref();
    let file_error = |e: hound::Error| SynthError::FileError(format!("{}: {}", path.display(), e));

    let mut reader = hound::WavReader::open(path).map_err(file_error)?;
    let spec = reader.spec();
    if spec.sample_format != hound::SampleFormat::Int || spec.bits_per_sample != 16 {
        return Err(SynthError::FileError(format!(
            "{}: expected 16-bit PCM, found {} bit {:?}",
            path.display(),
            spec.bits_per_sample,
            spec.sample_format
        )));
    }

    let samples = reader
        .samples::<i16>()
        .map(|r| r.map(|s| s as f32 / i16::MAX as f32))
        .collect::<std::result::Result<Vec<f32>, _>>()
        .map_err(file_error)?;

    Ok(AudioBuffer::new(samples, spec.sample_rate, spec.channels))
}
