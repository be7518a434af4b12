use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::entry::ChordEntry;
use crate::error::{Result, SynthError};
use crate::settings::CompositionSettings;

pub const DEFAULT_PROJECT_FILE: &str = "settings.json";

/// Everything the editor persists: the ordered chord sequence and the global
/// settings. The synthesis core never reads or writes this itself.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Project {
    #[serde(default)]
    pub settings: CompositionSettings,
    #[serde(default)]
    pub entries: Vec<ChordEntry>,
}

impl Project {
    /// Starter project with one C major section.
    pub fn example() -> Self {
        let settings = CompositionSettings { duration_seconds: 8, ..Default::default() };
        let entries = vec![ChordEntry::with_settings("C", "Major", &settings)];
        Project { settings, entries }
    }

    pub fn from_json(content: &str) -> Result<Self> {
        serde_json::from_str(content).map_err(|e| SynthError::FileError(format!("invalid project: {}", e)))
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| SynthError::FileError(e.to_string()))
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| SynthError::FileError(format!("{}: {}", path.display(), e)))?;
        let project = Self::from_json(&content)?;
        info!("loaded {} entries from {}", project.entries.len(), path.display());
        Ok(project)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        std::fs::write(path, self.to_json()?)
            .map_err(|e| SynthError::FileError(format!("{}: {}", path.display(), e)))?;
        info!("saved {} entries to {}", self.entries.len(), path.display());
        Ok(())
    }
}
