//! Save/load plumbing.
//!
//! The host owns the save file; modules only see named byte sections through
//! [`StateWriter`] and [`StateReader`]. [`SaveBuffer`] is an in-memory
//! implementation for hosts without their own handle.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while saving or loading module state.
#[derive(Debug, Error)]
pub enum PersistError {
    /// A value could not be encoded.
    #[error("Failed to encode section '{key}': {source}")]
    Encode {
        /// Section key.
        key: String,
        /// Underlying bincode error.
        #[source]
        source: bincode::Error,
    },

    /// A section could not be decoded.
    #[error("Failed to decode section '{key}': {source}")]
    Decode {
        /// Section key.
        key: String,
        /// Underlying bincode error.
        #[source]
        source: bincode::Error,
    },

    /// The host's storage failed.
    #[error("{context}: {source}")]
    Backend {
        /// What was being done.
        context: String,
        /// Host error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// Sink for named byte sections.
pub trait StateWriter {
    /// Store `bytes` under `key`, replacing any previous section.
    fn write_section(&mut self, key: &str, bytes: Vec<u8>) -> Result<(), PersistError>;
}

/// Source of named byte sections.
pub trait StateReader {
    /// Bytes stored under `key`, if any.
    fn read_section(&self, key: &str) -> Option<&[u8]>;
}

/// Encode `value` with bincode and store it under `key`.
pub fn write_value<T: Serialize + ?Sized>(
    writer: &mut dyn StateWriter,
    key: &str,
    value: &T,
) -> Result<(), PersistError> {
    let bytes = bincode::serialize(value).map_err(|source| PersistError::Encode {
        key: key.to_string(),
        source,
    })?;
    writer.write_section(key, bytes)
}

/// Read and decode the value stored under `key`. Returns `Ok(None)` when the
/// section is absent.
pub fn read_value<T: DeserializeOwned>(
    reader: &dyn StateReader,
    key: &str,
) -> Result<Option<T>, PersistError> {
    reader
        .read_section(key)
        .map(|bytes| {
            bincode::deserialize(bytes).map_err(|source| PersistError::Decode {
                key: key.to_string(),
                source,
            })
        })
        .transpose()
}

/// In-memory section store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveBuffer {
    sections: BTreeMap<String, Vec<u8>>,
}

impl SaveBuffer {
    /// Create an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of sections.
    pub fn len(&self) -> usize {
        self.sections.len()
    }

    /// True when nothing has been written.
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Section keys in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.sections.keys().map(String::as_str)
    }

    /// Encode the whole buffer.
    pub fn to_bytes(&self) -> Result<Vec<u8>, PersistError> {
        bincode::serialize(self).map_err(|source| PersistError::Encode {
            key: "<buffer>".to_string(),
            source,
        })
    }

    /// Decode a buffer produced by [`SaveBuffer::to_bytes`].
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PersistError> {
        bincode::deserialize(bytes).map_err(|source| PersistError::Decode {
            key: "<buffer>".to_string(),
            source,
        })
    }
}

impl StateWriter for SaveBuffer {
    fn write_section(&mut self, key: &str, bytes: Vec<u8>) -> Result<(), PersistError> {
        self.sections.insert(key.to_string(), bytes);
        Ok(())
    }
}

impl StateReader for SaveBuffer {
    fn read_section(&self, key: &str) -> Option<&[u8]> {
        self.sections.get(key).map(Vec::as_slice)
    }
}

/// Writer that namespaces every key as `prefix::key`.
pub struct ScopedWriter<'a> {
    prefix: &'a str,
    inner: &'a mut dyn StateWriter,
}

impl<'a> ScopedWriter<'a> {
    /// Wrap `inner` under `prefix`.
    pub fn new(prefix: &'a str, inner: &'a mut dyn StateWriter) -> Self {
        Self { prefix, inner }
    }
}

impl StateWriter for ScopedWriter<'_> {
    fn write_section(&mut self, key: &str, bytes: Vec<u8>) -> Result<(), PersistError> {
        self.inner
            .write_section(&format!("{}::{key}", self.prefix), bytes)
    }
}

/// Reader counterpart of [`ScopedWriter`].
pub struct ScopedReader<'a> {
    prefix: &'a str,
    inner: &'a dyn StateReader,
}

impl<'a> ScopedReader<'a> {
    /// Wrap `inner` under `prefix`.
    pub fn new(prefix: &'a str, inner: &'a dyn StateReader) -> Self {
        Self { prefix, inner }
    }
}

impl StateReader for ScopedReader<'_> {
    fn read_section(&self, key: &str) -> Option<&[u8]> {
        self.inner.read_section(&format!("{}::{key}", self.prefix))
    }
}
