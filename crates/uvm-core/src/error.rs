// UVM Core - Error types

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Result alias used across the UVM crates
pub type UvmResult<T> = std::result::Result<T, UvmError>;

/// Unified error type for config loading and analysis
#[derive(Error, Debug)]
pub enum UvmError {
    /// Requested lender config is absent from the corpus
    #[error("lender config {id} not found")]
    NotFound { id: i64 },

    /// A single document could not be read or parsed
    #[error("failed to load {path}: {message}")]
    Load { path: PathBuf, message: String },

    /// The corpus scope itself cannot be enumerated
    #[error("cannot enumerate configs in {path}: {message}")]
    Scope { path: PathBuf, message: String },

    /// A repository call exceeded the caller's deadline
    #[error("{operation} timed out after {elapsed:?}")]
    Timeout {
        operation: String,
        elapsed: Duration,
    },

    /// Invalid journey rule table
    #[error("invalid journey rules: {0}")]
    Rules(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl UvmError {
    pub fn load(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        Self::Load {
            path: path.into(),
            message: message.to_string(),
        }
    }

    pub fn scope(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        Self::Scope {
            path: path.into(),
            message: message.to_string(),
        }
    }

    /// Whether this error only affects a single document and may be skipped
    pub fn is_per_document(&self) -> bool {
        matches!(self, Self::Load { .. })
    }
}
