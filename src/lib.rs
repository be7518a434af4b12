//  ______              _         _______   _______   _______   _
// (  __  \  |\     /| ( (    /| (  ____ \ (  ____ \ (  ___  ) ( (    /|
// | (  \  ) | )   ( | |  \  ( | | (    \/ | (    \/ | (   ) | |  \  ( |
// | |   ) | | |   | | |   \ | | | |       | (__     | |   | | |   \ | |
// | |   | | | |   | | | (\ \) | | | ____  |  __)    | |   | | | (\ \) |
// | |   ) | | |   | | | | \   | | | \_  ) | (       | |   | | | | \   |
// | (__/  ) | (___) | | )  \  | | (___) | | (____/\ | (___) | | )  \  |
// (______/  (_______) |/    )_) (_______) (_______/ (_______) |/    )_)
//
//    _____   _______   _______   _______
//    \__  \ (  ___  ) / ___   ) / ___   )
//       ) ( | (   ) | \/   )  | \/   )  |
//       | | | (___) |     /   )     /   )
//       | | |  ___  |    /   /     /   /
//       | | | (   ) |   /   /     /   /
//    |\_) ) | )   ( |  /   (_/\  /   (_/\
//    (____/ |/     \| (_______/ (_______/

//! Procedural chord-sequence music generator.
//!
//! A list of [`ChordEntry`] values becomes a tonal timeline (chords or
//! arpeggios of stacked sines), a parallel procedural drum track, an optional
//! noise bed, then reverb and echo, looped as requested. Rendering is offline
//! and single-threaded; the result is one [`AudioBuffer`] for export or
//! playback.

pub mod error;
pub mod buffer;
pub mod filter;
pub mod tone;
pub mod theory;
pub mod chord;
pub mod drums;
pub mod atmosphere;
pub mod effects;
pub mod settings;
pub mod entry;
pub mod engine;
pub mod project;
pub mod export;
pub mod playback;

pub use error::{SynthError, Result};
pub use buffer::{AudioBuffer, SAMPLE_RATE};
pub use filter::{FilterType, FilterParams, db_to_amplitude, low_pass, high_pass};
pub use tone::ToneGenerator;
pub use theory::{PitchClass, ChordType, TimeSignature, CHORD_TYPES, intervals_for, duration_for_measures};
pub use chord::{chord, arpeggio};
pub use drums::{DrumSequencer, DrumVoice, DrumHit, drum_beat};
pub use atmosphere::atmosphere;
pub use effects::{EffectsChain, ReverbParams, EchoParams, reverb, echo};
pub use settings::CompositionSettings;
pub use entry::{ChordEntry, EntryDraft};
pub use engine::CompositionEngine;
pub use project::Project;
pub use export::{write_wav, read_wav};
pub use playback::Player;
