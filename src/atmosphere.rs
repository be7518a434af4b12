use crate::buffer::AudioBuffer;
use crate::filter::low_pass;
use crate::tone::ToneGenerator;

pub const ATMOSPHERE_CUTOFF_HZ: f32 = 500.0;
pub const ATMOSPHERE_ATTENUATION_DB: f32 = -10.0;

/// Dark noise bed: white noise, low-passed, then pulled down a further 10 dB.
pub fn atmosphere(tone: &mut ToneGenerator, duration_ms: u64, volume_db: f32) -> AudioBuffer {
    let noise = tone.noise(duration_ms, volume_db);
    low_pass(&noise, ATMOSPHERE_CUTOFF_HZ).apply_gain(ATMOSPHERE_ATTENUATION_DB)
}
