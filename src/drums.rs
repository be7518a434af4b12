//! Procedural drum loop.
//!
//! The pattern is a fixed skeleton keyed on the position inside the measure
//! (kick on the downbeat, kick + crash on the last beat, snares on the other
//! even beats, hi-hat every fourth beat, tom mid-measure) plus two random
//! fills per beat drawn from the caller's generator.

use fastrand::Rng;
use tracing::debug;

use crate::buffer::AudioBuffer;
use crate::error::{Result, SynthError};
use crate::filter::{high_pass, low_pass};
use crate::theory::TimeSignature;
use crate::tone::ToneGenerator;

pub const HI_HAT_FILL_THRESHOLD: f32 = 0.7;
pub const TOM_FILL_THRESHOLD: f32 = 0.8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DrumVoice {
    Kick,
    Snare,
    HiHat,
    Tom,
    Crash,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrumHit {
    pub beat_index: u64,
    pub position_ms: u64,
    pub voice: DrumVoice,
    pub fill: bool, // true for the random embellishments
}

/// One rendered hit per voice, built once per loop and reused for every beat.
struct DrumKit {
    kick: AudioBuffer,
    snare: AudioBuffer,
    hi_hat: AudioBuffer,
    tom: AudioBuffer,
    crash: AudioBuffer,
}

impl DrumKit {
    fn new(tone: &mut ToneGenerator, beat_ms: u64, volume_db: f32) -> Self {
        DrumKit {
            kick: low_pass(&tone.sine(100.0, beat_ms / 2, volume_db), 60.0),
            snare: high_pass(&tone.noise(beat_ms / 2, volume_db), 1000.0),
            hi_hat: high_pass(&tone.noise(beat_ms / 4, volume_db), 5000.0),
            tom: low_pass(&tone.sine(150.0, beat_ms / 2, volume_db), 200.0),
            crash: high_pass(&tone.noise(beat_ms, volume_db), 2000.0),
        }
    }

    fn voice(&self, voice: DrumVoice) -> &AudioBuffer {
        match voice {
            DrumVoice::Kick => &self.kick,
            DrumVoice::Snare => &self.snare,
            DrumVoice::HiHat => &self.hi_hat,
            DrumVoice::Tom => &self.tom,
            DrumVoice::Crash => &self.crash,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrumSequencer {
    beat_ms: u64,
    beats_per_measure: u32,
}

impl DrumSequencer {
    pub fn new(bpm: u32, signature: TimeSignature) -> Result<Self> {
        if bpm == 0 {
            return Err(SynthError::validation("bpm must be positive"));
        }
        let beat_ms = 60_000 / bpm as u64;
        if beat_ms == 0 {
            return Err(SynthError::validation(format!("bpm {} is shorter than one millisecond per beat", bpm)));
        }
        if signature.beats_per_measure == 0 {
            return Err(SynthError::validation("time signature has zero beats per measure"));
        }
        Ok(DrumSequencer { beat_ms, beats_per_measure: signature.beats_per_measure })
    }

    pub fn beat_ms(&self) -> u64 {
        self.beat_ms
    }

    pub fn beats_per_measure(&self) -> u32 {
        self.beats_per_measure
    }

    pub fn measure_position(&self, beat_index: u64) -> u32 {
        (beat_index % self.beats_per_measure as u64) as u32
    }

    /// Every hit that lands inside `[0, duration_ms)`, in beat order.
    pub fn plan(&self, duration_ms: u64, rng: &mut Rng) -> Vec<DrumHit> {
        let last = self.beats_per_measure - 1;
        let middle = self.beats_per_measure / 2;
        let mut hits = Vec::new();

        for (beat_index, position_ms) in (0..duration_ms).step_by(self.beat_ms as usize).enumerate() {
            let beat_index = beat_index as u64;
            let position = self.measure_position(beat_index);
            let mut push = |voice, fill| hits.push(DrumHit { beat_index, position_ms, voice, fill });

            if position == 0 {
                push(DrumVoice::Kick, false);
            } else if position == last {
                push(DrumVoice::Kick, false);
                push(DrumVoice::Crash, false);
            } else if position % 2 == 0 {
                push(DrumVoice::Snare, false);
            }

            if position % 4 == 0 {
                push(DrumVoice::HiHat, false);
            }
            if position == middle {
                push(DrumVoice::Tom, false);
            }

            if rng.f32() > HI_HAT_FILL_THRESHOLD {
                push(DrumVoice::HiHat, true);
            }
            if rng.f32() > TOM_FILL_THRESHOLD {
                push(DrumVoice::Tom, true);
            }
        }

        hits
    }

    /// Renders the loop; the result is always exactly `duration_ms` long,
    /// hits near the end are cut off rather than extending it.
    pub fn render(&self, tone: &mut ToneGenerator, duration_ms: u64, volume_db: f32) -> Result<AudioBuffer> {
        let kit = DrumKit::new(tone, self.beat_ms, volume_db);
        let hits = self.plan(duration_ms, tone.rng());

        let mut out = AudioBuffer::silent(duration_ms, tone.sample_rate());
        for hit in &hits {
            out.mix_at(kit.voice(hit.voice), hit.position_ms)
                .map_err(|e| e.in_stage("drums"))?;
        }

        debug!(
            "drum loop: {} ms, {} ms/beat, {} beats/measure, {} hits ({} fills)",
            duration_ms,
            self.beat_ms,
            self.beats_per_measure,
            hits.len(),
            hits.iter().filter(|h| h.fill).count()
        );
        Ok(out)
    }
}

pub fn drum_beat(
    tone: &mut ToneGenerator,
    duration_ms: u64,
    bpm: u32,
    time_signature: &str,
    volume_db: f32,
) -> Result<AudioBuffer> {
    DrumSequencer::new(bpm, time_signature.parse()?)?.render(tone, duration_ms, volume_db)
}
