//! Tool error types.

use std::io;
use std::path::PathBuf;

use porcupine_core::raid::ComposerError;
use porcupine_loader::LoadError;
use thiserror::Error;

/// Result type alias using [`ToolError`].
pub type Result<T> = std::result::Result<T, ToolError>;

/// Errors reported by the tools.
#[derive(Debug, Error)]
pub enum ToolError {
    /// Mod loading failed.
    #[error(transparent)]
    Load(#[from] LoadError),

    /// The raid calculator rejected its input.
    #[error("Invalid raid input: {0}")]
    Composer(#[from] ComposerError),

    /// A file could not be read.
    #[error("Failed to read '{path}': {source}")]
    Io {
        /// File path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: io::Error,
    },

    /// A RON file did not parse.
    #[error("Failed to parse '{path}': {source}")]
    Parse {
        /// File path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: ron::error::SpannedError,
    },
}
