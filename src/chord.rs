use crate::buffer::AudioBuffer;
use crate::error::{Result, SynthError};
use crate::theory::interval_frequency;
use crate::tone::ToneGenerator;

/// All chord tones sounding together for the full duration.
pub fn chord(
    tone: &ToneGenerator,
    root_freq: f32,
    intervals: &[i32],
    duration_ms: u64,
    volume_db: f32,
) -> Result<AudioBuffer> {
    let mut out = AudioBuffer::silent(duration_ms, tone.sample_rate());
    for &interval in intervals {
        let voice = tone.sine(interval_frequency(root_freq, interval), duration_ms, volume_db);
        out.mix_at(&voice, 0)?;
    }
    Ok(out)
}

/// Chord tones one after another. Each note gets `duration_ms / intervals.len()`
/// ms; the remainder is dropped, so the result can be slightly short.
pub fn arpeggio(
    tone: &ToneGenerator,
    root_freq: f32,
    intervals: &[i32],
    duration_ms: u64,
    volume_db: f32,
) -> Result<AudioBuffer> {
    if intervals.is_empty() {
        return Err(SynthError::validation("arpeggio needs at least one interval"));
    }

    let note_ms = duration_ms / intervals.len() as u64;
    let mut out = AudioBuffer::empty(tone.sample_rate());
    for &interval in intervals {
        out.append(&tone.sine(interval_frequency(root_freq, interval), note_ms, volume_db))?;
    }
    Ok(out)
}
