use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::engine::MAX_VOLUME_DB;
use crate::error::Result;
use crate::settings::CompositionSettings;
use crate::theory::{intervals_for, PitchClass};

/// One section of the song: a chord plus the rhythm and timbre it plays with.
/// Root and chord type stay as names so that entries loaded from disk can be
/// rejected with a precise message instead of failing to deserialize.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChordEntry {
    pub root_pitch_class: String,
    pub chord_type: String,
    pub is_arpeggio: bool,
    pub include_drums: bool,
    pub include_tonal_layer: bool,
    pub duration_seconds: u32,
    pub bpm: u32,
    pub time_signature: String,
    pub volume_db: i32,
    pub reverb_decay: f32,
    pub echo_delay_ms: u32,
    pub echo_decay: f32,
    pub octave: i32,
}

impl ChordEntry {
    pub fn new(root: &str, chord_type: &str) -> Self {
        Self::with_settings(root, chord_type, &CompositionSettings::default())
    }

    /// Entry whose per-entry parameters are copied from `settings`.
    pub fn with_settings(root: &str, chord_type: &str, settings: &CompositionSettings) -> Self {
        ChordEntry {
            root_pitch_class: root.to_string(),
            chord_type: chord_type.to_string(),
            is_arpeggio: false,
            include_drums: settings.include_drums,
            include_tonal_layer: settings.include_tonal,
            duration_seconds: settings
                .effective_duration_seconds()
                .unwrap_or(settings.duration_seconds),
            bpm: settings.bpm,
            time_signature: settings.time_signature.clone(),
            volume_db: settings.volume_db,
            reverb_decay: settings.reverb_decay,
            echo_delay_ms: settings.echo_delay_ms,
            echo_decay: settings.echo_decay,
            octave: settings.octave,
        }
    }

    pub fn duration_ms(&self) -> u64 {
        self.duration_seconds as u64 * 1000
    }

    pub fn pitch_class(&self) -> Result<PitchClass> {
        self.root_pitch_class.parse()
    }

    pub fn intervals(&self) -> Result<&'static [i32]> {
        intervals_for(&self.chord_type)
    }

    pub fn root_frequency(&self) -> Result<f32> {
        Ok(self.pitch_class()?.frequency(self.octave))
    }

    /// Short display form, e.g. `C4 Major (Arpeggio) (Drums)`.
    pub fn label(&self) -> String {
        let mut label = format!("{}{} {}", self.root_pitch_class, self.octave, self.chord_type);
        if self.is_arpeggio {
            label.push_str(" (Arpeggio)");
        }
        if self.include_drums {
            label.push_str(" (Drums)");
        }
        if self.include_tonal_layer {
            label.push_str(" (Chords)");
        }
        label
    }
}

/// Raw editor form, every numeric field still text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntryDraft {
    pub root: String,
    pub chord_type: String,
    pub octave: String,
    pub is_arpeggio: bool,
    pub include_drums: bool,
    pub include_tonal_layer: bool,
    pub apply_settings: bool, // false: ignore the numeric fields and take the defaults
    pub duration_seconds: String,
    pub bpm: String,
    pub time_signature: String,
    pub volume_db: String,
    pub reverb_decay: String,
    pub echo_delay_ms: String,
    pub echo_decay: String,
}

fn field_or<T: FromStr + Copy>(name: &str, raw: &str, default: T, valid: impl Fn(&T) -> bool) -> T {
    match raw.trim().parse::<T>() {
        Ok(value) if valid(&value) => value,
        _ => {
            debug!("draft field '{}' = {:?} unusable, falling back to default", name, raw);
            default
        }
    }
}

impl EntryDraft {
    /// Turns the form into a well-formed entry. Unparsable or out-of-range
    /// numbers become the matching default from `defaults`; names are only
    /// tidied here and checked later by the engine.
    pub fn normalize(&self, defaults: &CompositionSettings) -> ChordEntry {
        let root = self.root.trim().to_uppercase();
        let chord_type = self.chord_type.trim();
        let mut entry = ChordEntry::with_settings(&root, chord_type, defaults);
        entry.is_arpeggio = self.is_arpeggio;
        entry.include_drums = self.include_drums;
        entry.include_tonal_layer = self.include_tonal_layer;

        if !self.apply_settings {
            return entry;
        }

        let unit = |d: &f32| (0.0..1.0).contains(d);
        entry.duration_seconds = field_or("duration_seconds", &self.duration_seconds, entry.duration_seconds, |d| *d > 0);
        entry.bpm = field_or("bpm", &self.bpm, entry.bpm, |b| *b > 0);
        entry.volume_db = field_or("volume_db", &self.volume_db, entry.volume_db, |v| *v <= MAX_VOLUME_DB);
        entry.reverb_decay = field_or("reverb_decay", &self.reverb_decay, entry.reverb_decay, unit);
        entry.echo_delay_ms = field_or("echo_delay_ms", &self.echo_delay_ms, entry.echo_delay_ms, |_| true);
        entry.echo_decay = field_or("echo_decay", &self.echo_decay, entry.echo_decay, unit);
        entry.octave = field_or("octave", &self.octave, entry.octave, |o| (0..=8).contains(o));

        let time_signature = self.time_signature.trim();
        if !time_signature.is_empty() {
            entry.time_signature = time_signature.to_string();
        }

        entry
    }
}
