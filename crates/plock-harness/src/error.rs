use std::path::PathBuf;

use plock_gate::GateError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ReplayError>;

#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error: {0}")]
    Stream(#[from] std::io::Error),

    #[error("trace line {line}: {source}")]
    Record {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("unsupported trace schema `{found}` (expected `{expected}`)")]
    Schema { found: String, expected: &'static str },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Gate(#[from] GateError),
}

impl ReplayError {
    #[must_use]
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Process exit code for the replay binary.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Gate(GateError::Validation(_)) => 2,
            Self::Record { .. } | Self::Schema { .. } => 3,
            _ => 1,
        }
    }
}
