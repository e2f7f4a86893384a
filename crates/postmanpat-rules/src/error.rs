//! Error types for rule derivation.

use std::path::PathBuf;

use thiserror::Error;

use crate::convert::ConvertError;
use crate::prompt::PromptError;

/// Errors that can occur while deriving or storing rules.
#[derive(Debug, Error)]
pub enum Error {
    /// Reading an input file failed.
    #[error("failed to read {path}: {source}")]
    Read {
        /// File that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Analysis JSON could not be parsed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A rule document or checkpoint could not be parsed.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Writing an output document failed.
    #[error(transparent)]
    Write(#[from] postmanpat_yaml::Error),

    /// Input document is missing required structure.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Checkpoint file exists but cannot be understood.
    #[error("malformed checkpoint {path}: {reason}")]
    Checkpoint {
        /// Checkpoint location.
        path: PathBuf,
        /// What was wrong with it.
        reason: String,
    },

    /// Batch conversion rejected a rule.
    #[error(transparent)]
    Convert(#[from] ConvertError),

    /// Operator interaction failed.
    #[error(transparent)]
    Prompt(#[from] PromptError),
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;
