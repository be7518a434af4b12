use serde::{Deserialize, Serialize};

use crate::error::{Result, SynthError};
use crate::theory::duration_for_measures;

/// Global defaults for new entries plus the switches that apply to the whole
/// composition (layer toggles, loop count).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompositionSettings {
    pub duration_seconds: u32,
    pub bpm: u32,
    pub time_signature: String,
    pub volume_db: i32,
    pub reverb_decay: f32,
    pub echo_delay_ms: u32,
    pub echo_decay: f32,
    pub octave: i32,
    pub loop_count: u32,
    pub include_tonal: bool,
    pub include_drums: bool, // default for new entries; each entry's flag decides
    pub include_noise: bool,
    pub measures: Option<u32>, // when set, overrides duration_seconds
}

impl Default for CompositionSettings {
    fn default() -> Self {
        CompositionSettings {
            duration_seconds: 60,
            bpm: 120,
            time_signature: "4/4".to_string(),
            volume_db: -10,
            reverb_decay: 0.5,
            echo_delay_ms: 300,
            echo_decay: 0.5,
            octave: 4,
            loop_count: 1,
            include_tonal: true,
            include_drums: true,
            include_noise: false,
            measures: None,
        }
    }
}

impl CompositionSettings {
    /// Entry length in seconds, derived from `measures` when that is set so
    /// the loop closes on a bar line.
    pub fn effective_duration_seconds(&self) -> Result<u32> {
        match self.measures {
            Some(measures) => duration_for_measures(self.bpm, &self.time_signature, measures),
            None => Ok(self.duration_seconds),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.loop_count == 0 {
            return Err(SynthError::validation("loop count must be at least 1"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let s = CompositionSettings::default();
        assert_eq!(s.effective_duration_seconds().unwrap(), 60);
        assert!(s.validate().is_ok());
        assert!(!s.include_noise);
    }

    #[test]
    fn test_measures_override_duration() {
        let s = CompositionSettings { measures: Some(4), bpm: 96, ..Default::default() };
        assert_eq!(s.effective_duration_seconds().unwrap(), 10);

        let bad = CompositionSettings { measures: Some(4), bpm: 0, ..Default::default() };
        assert!(bad.effective_duration_seconds().is_err());
    }

    #[test]
    fn test_zero_loops_rejected() {
        let s = CompositionSettings { loop_count: 0, ..Default::default() };
        assert!(matches!(s.validate(), Err(SynthError::ValidationError(_))));
    }

    #[test]
    fn test_missing_fields_take_defaults() {
        let s: CompositionSettings = serde_json::from_str(r#"{ "bpm": 90, "include_noise": true }"#).unwrap();
        assert_eq!(s.bpm, 90);
        assert!(s.include_noise);
        assert_eq!(s.time_signature, "4/4");
        assert_eq!(s.loop_count, 1);
    }
}
