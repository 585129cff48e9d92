use std::path::PathBuf;

use plock_core::PatternParseError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, GateError>;

#[derive(Debug, Error)]
pub enum GateError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid reference pattern: {0}")]
    Pattern(#[from] PatternParseError),

    #[error("invalid gate config: {}", .0.join("; "))]
    Validation(Vec<String>),
}

impl GateError {
    #[must_use]
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Validation messages, if this is a validation failure.
    #[must_use]
    pub fn validation_errors(&self) -> &[String] {
        match self {
            Self::Validation(errors) => errors,
            _ => &[],
        }
    }
}
