//! Error types for YAML output.

use std::path::PathBuf;

/// Result type alias for YAML output operations.
pub type Result<T> = std::result::Result<T, Error>;

/// YAML output error types.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Writing the rendered document failed.
    #[error("failed to write {path}: {source}")]
    Write {
        /// Destination that was being written.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}
