use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SynthError {
    #[error("Validation Error: entry {index}: {reason}")]
    InvalidEntry { index: usize, reason: String },
    #[error("Validation Error: {0}")]
    ValidationError(String),
    #[error("Computation Error in {stage}: {reason}")]
    ComputationError { stage: String, reason: String },
    #[error("File Error: {0}")]
    FileError(String),
    #[error("Audio Error: {0}")]
    AudioError(String),
}

pub type Result<T> = std::result::Result<T, SynthError>;

impl SynthError {
    pub(crate) fn validation(reason: impl Into<String>) -> Self {
        SynthError::ValidationError(reason.into())
    }

    pub(crate) fn computation(stage: &str, reason: impl Into<String>) -> Self {
        SynthError::ComputationError { stage: stage.to_string(), reason: reason.into() }
    }

    /// Pins a free-standing validation failure to the chord entry that caused it.
    pub fn at_entry(self, index: usize) -> Self {
        match self {
            SynthError::ValidationError(reason) => SynthError::InvalidEntry { index, reason },
            other => other,
        }
    }

    /// Relabels a mixing failure with the pipeline stage it happened in.
    pub fn in_stage(self, stage: &str) -> Self {
        match self {
            SynthError::ComputationError { reason, .. } => SynthError::ComputationError {
                stage: stage.to_string(),
                reason,
            },
            other => other,
        }
    }
}
