//! Error types for class resolution and instantiation.

use thiserror::Error;

/// Result type alias using [`ClassError`].
pub type Result<T> = std::result::Result<T, ClassError>;

/// A factory refused to build an instance.
///
/// Plugin factories return this when their constructor cannot complete,
/// e.g. because a required config key is missing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ConstructError(pub String);

impl ConstructError {
    /// Create a construction error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Failure to turn one class entry into a module or event.
///
/// Every variant is skip-and-continue: the loader logs it with the class and
/// archive name and moves on to the next entry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClassError {
    /// The archive lists a class that no plugin registered.
    #[error("Failed to load class {class} from {archive}: no registered definition")]
    ClassNotFound {
        /// Fully-qualified class name.
        class: String,
        /// File name of the archive the entry came from.
        archive: String,
    },

    /// The class factory failed.
    #[error("Failed to instantiate class {class} from {archive}: {source}")]
    Instantiation {
        /// Fully-qualified class name.
        class: String,
        /// File name of the archive the entry came from.
        archive: String,
        /// Error raised by the factory.
        #[source]
        source: ConstructError,
    },

    /// The instance implements none of the four capabilities.
    #[error("Invalid aggregate {class} from {archive}: implements no capability")]
    InvalidAggregate {
        /// Fully-qualified class name.
        class: String,
        /// File name of the archive the entry came from.
        archive: String,
    },
}

impl ClassError {
    /// Name of the class that failed.
    #[must_use]
    pub fn class(&self) -> &str {
        match self {
            Self::ClassNotFound { class, .. }
            | Self::Instantiation { class, .. }
            | Self::InvalidAggregate { class, .. } => class,
        }
    }

    /// File name of the archive that contributed the class.
    #[must_use]
    pub fn archive(&self) -> &str {
        match self {
            Self::ClassNotFound { archive, .. }
            | Self::Instantiation { archive, .. }
            | Self::InvalidAggregate { archive, .. } => archive,
        }
    }

    /// Whether this failure indicates a malformed mod rather than an
    /// ordinary helper class.
    #[must_use]
    pub const fn is_reportable(&self) -> bool {
        !matches!(self, Self::ClassNotFound { .. })
    }
}
