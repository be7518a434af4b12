//! Fixed lookup tables shared by the editor and the synthesis core.
//!
//! Pitch classes map to their octave-4 frequency; chord types map to an
//! ordered list of semitone offsets from the root. Both tables are constant,
//! so validating a name here is all the core needs before rendering.

use std::fmt;
use std::str::FromStr;

use crate::error::{Result, SynthError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PitchClass {
    C,
    CSharp,
    D,
    DSharp,
    E,
    F,
    FSharp,
    G,
    GSharp,
    A,
    ASharp,
    B,
}

impl PitchClass {
    pub const ALL: [PitchClass; 12] = [
        PitchClass::C,
        PitchClass::CSharp,
        PitchClass::D,
        PitchClass::DSharp,
        PitchClass::E,
        PitchClass::F,
        PitchClass::FSharp,
        PitchClass::G,
        PitchClass::GSharp,
        PitchClass::A,
        PitchClass::ASharp,
        PitchClass::B,
    ];

    pub fn name(self) -> &'static str {
        match self {
            PitchClass::C => "C",
            PitchClass::CSharp => "C#",
            PitchClass::D => "D",
            PitchClass::DSharp => "D#",
            PitchClass::E => "E",
            PitchClass::F => "F",
            PitchClass::FSharp => "F#",
            PitchClass::G => "G",
            PitchClass::GSharp => "G#",
            PitchClass::A => "A",
            PitchClass::ASharp => "A#",
            PitchClass::B => "B",
        }
    }

    /// Frequency in Hz at octave 4.
    pub fn base_frequency(self) -> f32 {
        match self {
            PitchClass::C => 261.63,
            PitchClass::CSharp => 277.18,
            PitchClass::D => 293.66,
            PitchClass::DSharp => 311.13,
            PitchClass::E => 329.63,
            PitchClass::F => 349.23,
            PitchClass::FSharp => 369.99,
            PitchClass::G => 392.00,
            PitchClass::GSharp => 415.30,
            PitchClass::A => 440.00,
            PitchClass::ASharp => 466.16,
            PitchClass::B => 493.88,
        }
    }

    pub fn frequency(self, octave: i32) -> f32 {
        self.base_frequency() * 2.0_f32.powi(octave.saturating_sub(4))
    }
}

impl FromStr for PitchClass {
    type Err = SynthError;

    fn from_str(s: &str) -> Result<Self> {
        PitchClass::ALL
            .iter()
            .copied()
            .find(|p| p.name() == s)
            .ok_or_else(|| SynthError::validation(format!("unknown pitch class '{}'", s)))
    }
}

impl fmt::Display for PitchClass {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChordType {
    pub name: &'static str,
    pub intervals: &'static [i32],
}

pub const CHORD_TYPES: &[ChordType] = &[
    ChordType { name: "Major", intervals: &[0, 4, 7] },
    ChordType { name: "Minor", intervals: &[0, 3, 7] },
    ChordType { name: "Diminished", intervals: &[0, 3, 6] },
    ChordType { name: "Augmented", intervals: &[0, 4, 8] },
    ChordType { name: "Dominant 7th", intervals: &[0, 4, 7, 10] },
    ChordType { name: "Major 7th", intervals: &[0, 4, 7, 11] },
    ChordType { name: "Minor 7th", intervals: &[0, 3, 7, 10] },
    ChordType { name: "Diminished 7th", intervals: &[0, 3, 6, 9] },
    ChordType { name: "Half-Diminished 7th", intervals: &[0, 3, 6, 10] },
    ChordType { name: "Minor-Major 7th", intervals: &[0, 3, 7, 11] },
    ChordType { name: "Suspended 2nd", intervals: &[0, 2, 7] },
    ChordType { name: "Suspended 4th", intervals: &[0, 5, 7] },
    ChordType { name: "Major 6th", intervals: &[0, 4, 7, 9] },
    ChordType { name: "Minor 6th", intervals: &[0, 3, 7, 9] },
    ChordType { name: "9th", intervals: &[0, 4, 7, 10, 14] },
    ChordType { name: "Major 9th", intervals: &[0, 4, 7, 11, 14] },
    ChordType { name: "Minor 9th", intervals: &[0, 3, 7, 10, 14] },
    ChordType { name: "11th", intervals: &[0, 4, 7, 10, 14, 17] },
    ChordType { name: "Major 11th", intervals: &[0, 4, 7, 11, 14, 17] },
    ChordType { name: "Minor 11th", intervals: &[0, 3, 7, 10, 14, 17] },
    ChordType { name: "13th", intervals: &[0, 4, 7, 10, 14, 17, 21] },
    ChordType { name: "Major 13th", intervals: &[0, 4, 7, 11, 14, 17, 21] },
    ChordType { name: "Minor 13th", intervals: &[0, 3, 7, 10, 14, 17, 21] },
    ChordType { name: "Add 9", intervals: &[0, 4, 7, 14] },
    ChordType { name: "Minor Add 9", intervals: &[0, 3, 7, 14] },
    ChordType { name: "Augmented 7th", intervals: &[0, 4, 8, 10] },
    ChordType { name: "Augmented Major 7th", intervals: &[0, 4, 8, 11] },
];

pub fn intervals_for(chord_type: &str) -> Result<&'static [i32]> {
    CHORD_TYPES
        .iter()
        .find(|c| c.name == chord_type)
        .map(|c| c.intervals)
        .ok_or_else(|| SynthError::validation(format!("unknown chord type '{}'", chord_type)))
}

#[inline]
pub fn interval_frequency(root_freq: f32, interval: i32) -> f32 {
    root_freq * 2.0_f32.powf(interval as f32 / 12.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeSignature {
    pub beats_per_measure: u32,
    pub beat_unit: u32,
}

impl FromStr for TimeSignature {
    type Err = SynthError;

    // "beats/unit"; only the numerator drives the drum pattern
    fn from_str(s: &str) -> Result<Self> {
        let invalid = || SynthError::validation(format!("invalid time signature '{}', expected beats/unit", s));
        let (beats, unit) = s.split_once('/').ok_or_else(invalid)?;
        let beats_per_measure: u32 = beats.trim().parse().map_err(|_| invalid())?;
        let beat_unit: u32 = unit.trim().parse().map_err(|_| invalid())?;
        if beat_unit == 0 {
            return Err(invalid());
        }
        if beats_per_measure == 0 {
            return Err(SynthError::validation(format!(
                "time signature '{}' has zero beats per measure",
                s
            )));
        }
        Ok(TimeSignature { beats_per_measure, beat_unit })
    }
}

impl fmt::Display for TimeSignature {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}/{}", self.beats_per_measure, self.beat_unit)
    }
}

/// Whole seconds covering `measures` bars, for loops that end on a bar line.
pub fn duration_for_measures(bpm: u32, time_signature: &str, measures: u32) -> Result<u32> {
    if bpm == 0 {
        return Err(SynthError::validation("bpm must be positive"));
    }
    let signature: TimeSignature = time_signature.parse()?;
    let beats = signature.beats_per_measure as u64 * measures as u64;
    Ok((beats * 60 / bpm as u64) as u32)
}
