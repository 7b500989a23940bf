//! Loader error types.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using [`LoadError`].
pub type Result<T> = std::result::Result<T, LoadError>;

/// Errors that abort a whole load pass.
#[derive(Debug, Error)]
pub enum LoadError {
    /// Loader config file could not be read.
    #[error("Failed to read loader config '{path}': {source}")]
    ConfigIo {
        /// Config file path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: io::Error,
    },

    /// Loader config file is not valid RON.
    #[error("Failed to parse loader config '{path}': {source}")]
    ConfigParse {
        /// Config file path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: ron::error::SpannedError,
    },

    /// A mods root or scripts directory could not be listed.
    #[error("Failed to read mods directory '{path}': {source}")]
    ModsIo {
        /// Directory path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: io::Error,
    },

    /// Archive path does not name a regular file.
    #[error("Invalid archive path '{0}'")]
    InvalidPath(PathBuf),

    /// Archive could not be opened.
    #[error("Failed to open archive '{path}': {source}")]
    ArchiveIo {
        /// Archive path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: io::Error,
    },

    /// Archive is not a readable zip file.
    #[error("Failed to read archive '{path}': {source}")]
    ArchiveFormat {
        /// Archive path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: zip::result::ZipError,
    },
}

/// Errors reading or writing a mod's `.properties` config.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File could not be opened or created.
    #[error("Failed to access config '{path}': {source}")]
    Io {
        /// Config file path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: io::Error,
    },

    /// File is not valid properties syntax.
    #[error("Failed to parse config '{path}': {source}")]
    Parse {
        /// Config file path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: java_properties::PropertiesError,
    },

    /// Properties could not be written.
    #[error("Failed to write config '{path}': {source}")]
    Write {
        /// Config file path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: java_properties::PropertiesError,
    },
}

impl ConfigError {
    /// Path of the file involved.
    pub fn path(&self) -> &std::path::Path {
        match self {
            Self::Io { path, .. } | Self::Parse { path, .. } | Self::Write { path, .. } => path,
        }
    }
}
