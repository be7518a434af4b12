use tracing::{debug, info, warn};

use crate::atmosphere::atmosphere;
use crate::buffer::{AudioBuffer, SAMPLE_RATE};
use crate::chord::{arpeggio, chord};
use crate::drums::DrumSequencer;
use crate::effects::{check_decay, EchoParams, EffectsChain, ReverbParams};
use crate::entry::ChordEntry;
use crate::error::{Result, SynthError};
use crate::settings::CompositionSettings;
use crate::theory::interval_frequency;
use crate::tone::ToneGenerator;

/// Lowest rate the drum and atmosphere filters are tuned for.
pub const MIN_SAMPLE_RATE: u32 = 8_000;

/// Loudest per-entry volume accepted; anything above is a typo, not a mix.
pub const MAX_VOLUME_DB: i32 = 24;

/// An entry after every lookup and range check has passed. Building these for
/// the whole sequence up front is what keeps a bad entry from wasting any
/// synthesis work.
#[derive(Debug, Clone)]
struct ResolvedEntry {
    root_freq: f32,
    intervals: &'static [i32],
    is_arpeggio: bool,
    include_drums: bool,
    include_tonal_layer: bool,
    duration_ms: u64,
    sequencer: DrumSequencer,
    volume_db: f32,
    effects: EffectsChain,
}

impl ResolvedEntry {
    fn resolve(entry: &ChordEntry, sample_rate: u32) -> Result<Self> {
        let root_freq = entry.root_frequency()?;
        let intervals = entry.intervals()?;
        if intervals.is_empty() {
            return Err(SynthError::validation(format!("chord type '{}' has no intervals", entry.chord_type)));
        }
        let nyquist = sample_rate as f32 / 2.0;
        let top = intervals.iter().map(|&i| interval_frequency(root_freq, i)).fold(0.0f32, f32::max);
        if root_freq <= 0.0 || !top.is_finite() || top >= nyquist {
            return Err(SynthError::validation(format!(
                "octave {} puts {} {} at {} Hz, outside (0, {}) Hz",
                entry.octave, entry.root_pitch_class, entry.chord_type, top, nyquist
            )));
        }
        if entry.volume_db > MAX_VOLUME_DB {
            return Err(SynthError::validation(format!(
                "volume {} dB is above the {} dB ceiling",
                entry.volume_db, MAX_VOLUME_DB
            )));
        }
        if entry.duration_seconds == 0 {
            return Err(SynthError::validation("duration must be at least one second"));
        }
        let sequencer = DrumSequencer::new(entry.bpm, entry.time_signature.parse()?)?;
        check_decay("reverb", entry.reverb_decay)?;
        check_decay("echo", entry.echo_decay)?;

        Ok(ResolvedEntry {
            root_freq,
            intervals,
            is_arpeggio: entry.is_arpeggio,
            include_drums: entry.include_drums,
            include_tonal_layer: entry.include_tonal_layer,
            duration_ms: entry.duration_ms(),
            sequencer,
            volume_db: entry.volume_db as f32,
            effects: EffectsChain {
                reverb: Some(ReverbParams { decay: entry.reverb_decay }),
                echo: Some(EchoParams { delay_ms: entry.echo_delay_ms as u64, decay: entry.echo_decay }),
            },
        })
    }

    fn tonal_section(&self, tone: &ToneGenerator) -> Result<AudioBuffer> {
        if self.is_arpeggio {
            arpeggio(tone, self.root_freq, self.intervals, self.duration_ms, self.volume_db)
        } else {
            chord(tone, self.root_freq, self.intervals, self.duration_ms, self.volume_db)
        }
    }
}

/// Offline renderer for a chord sequence. Holds no song state of its own; each
/// call works on the slice it is handed and returns a fresh buffer.
#[derive(Debug, Clone)]
pub struct CompositionEngine {
    sample_rate: u32,
    seed: Option<u64>,
}

impl Default for CompositionEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl CompositionEngine {
    pub fn new() -> Self {
        CompositionEngine { sample_rate: SAMPLE_RATE, seed: None }
    }

    pub fn with_sample_rate(mut self, sample_rate: u32) -> Result<Self> {
        if sample_rate < MIN_SAMPLE_RATE {
            return Err(SynthError::validation(format!(
                "sample rate {} Hz is below the {} Hz minimum",
                sample_rate, MIN_SAMPLE_RATE
            )));
        }
        self.sample_rate = sample_rate;
        Ok(self)
    }

    /// Fixes the random source so drum fills and noise render identically.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn tone_generator(&self) -> ToneGenerator {
        match self.seed {
            Some(seed) => ToneGenerator::with_seed(self.sample_rate, seed),
            None => ToneGenerator::new(self.sample_rate),
        }
    }

    /// Checks every entry without rendering anything. Stops at the first bad
    /// entry and reports its index.
    pub fn validate(&self, entries: &[ChordEntry], settings: &CompositionSettings) -> Result<()> {
        self.resolve_all(entries, settings).map(|_| ())
    }

    fn resolve_all(&self, entries: &[ChordEntry], settings: &CompositionSettings) -> Result<Vec<ResolvedEntry>> {
        settings.validate()?;
        entries
            .iter()
            .enumerate()
            .map(|(index, entry)| ResolvedEntry::resolve(entry, self.sample_rate).map_err(|e| e.at_entry(index)))
            .collect()
    }

    /// Renders the whole sequence: tonal and drum timelines side by side,
    /// optional noise bed, reverb then echo, then `loop_count` repeats.
    ///
    /// Only the first entry's volume (for the noise bed) and reverb/echo
    /// parameters are used for the combined mix.
    pub fn compose(&self, entries: &[ChordEntry], settings: &CompositionSettings) -> Result<AudioBuffer> {
        let resolved = self.resolve_all(entries, settings)?;
        let Some(first) = resolved.first() else {
            debug!("empty chord sequence, nothing to render");
            return Ok(AudioBuffer::empty(self.sample_rate));
        };

        if resolved.iter().skip(1).any(|r| r.effects != first.effects) {
            warn!("per-entry reverb/echo settings differ; only entry 0's are applied to the mix");
        }

        let mut tone = self.tone_generator();
        let mut sections = Vec::with_capacity(resolved.len());
        let mut drum_sections = Vec::with_capacity(resolved.len());

        for (index, entry) in resolved.iter().enumerate() {
            let frames = AudioBuffer::frames_for_ms(entry.duration_ms, self.sample_rate);

            let mut section = if settings.include_tonal && entry.include_tonal_layer {
                entry.tonal_section(&tone).map_err(|e| e.at_entry(index))?
            } else {
                AudioBuffer::silent(entry.duration_ms, self.sample_rate)
            };
            // arpeggios lose the division remainder; keep the timeline aligned
            section.pad_to_frames(frames);
            sections.push(section);

            let drums = if entry.include_drums {
                entry.sequencer.render(&mut tone, entry.duration_ms, entry.volume_db)?
            } else {
                AudioBuffer::silent(entry.duration_ms, self.sample_rate)
            };
            drum_sections.push(drums);

            debug!(
                "section {}: {} ms, {}, drums {}",
                index,
                entry.duration_ms,
                if entry.is_arpeggio { "arpeggio" } else { "chord" },
                entry.include_drums
            );
        }

        let mut music = AudioBuffer::concat(&sections, self.sample_rate).map_err(|e| e.in_stage("timeline"))?;
        let drum_track = AudioBuffer::concat(&drum_sections, self.sample_rate).map_err(|e| e.in_stage("drums"))?;

        if music.frames() != drum_track.frames() {
            return Err(SynthError::computation(
                "timeline",
                format!("tonal track has {} frames, drum track has {}", music.frames(), drum_track.frames()),
            ));
        }

        if settings.include_noise {
            let total_ms = resolved.iter().map(|r| r.duration_ms).sum();
            let bed = atmosphere(&mut tone, total_ms, first.volume_db);
            music = music.overlay(&bed, 0).map_err(|e| e.in_stage("atmosphere"))?;
        }

        music = music.overlay(&drum_track, 0).map_err(|e| e.in_stage("drums"))?;
        music = first.effects.apply(&music)?;

        let output = music.repeat(settings.loop_count as usize);
        info!(
            "composed {} sections into {} ms x{} loops ({} frames @ {} Hz)",
            resolved.len(),
            music.duration_ms(),
            settings.loop_count,
            output.frames(),
            self.sample_rate
        );
        Ok(output)
    }

    /// Renders a single entry for auditioning: its tonal section with its drum
    /// loop laid over it when the entry has drums. Layer toggles, noise,
    /// effects and looping are all skipped.
    pub fn preview_entry(&self, entry: &ChordEntry) -> Result<AudioBuffer> {
        let resolved = ResolvedEntry::resolve(entry, self.sample_rate).map_err(|e| e.at_entry(0))?;
        let mut tone = self.tone_generator();

        let section = resolved.tonal_section(&tone)?;
        if !resolved.include_drums {
            return Ok(section);
        }
        let drums = resolved.sequencer.render(&mut tone, resolved.duration_ms, resolved.volume_db)?;
        section.overlay(&drums, 0).map_err(|e| e.in_stage("preview"))
    }
}
