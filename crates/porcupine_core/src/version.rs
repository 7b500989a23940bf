//! Semantic versions of mods.
//!
//! Mods declare their version as `major[.minor[.patch[-suffix]]]`. Missing
//! components default to zero and a missing suffix is empty.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors produced while parsing a version string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VersionError {
    /// The version string was empty.
    #[error("Invalid version string: empty")]
    Empty,

    /// A numeric component did not parse.
    #[error("Invalid version component '{component}' in '{input}'")]
    InvalidComponent {
        /// The full input string.
        input: String,
        /// The component that failed to parse.
        component: String,
    },

    /// More than three numeric components were given.
    #[error("Invalid version string '{0}': expected at most major.minor.patch")]
    TooManyComponents(String),
}

/// A `major.minor.patch[-suffix]` version.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Version {
    major: u32,
    minor: u32,
    patch: u32,
    suffix: String,
}

impl Version {
    /// Create a version without a suffix.
    #[must_use]
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
            suffix: String::new(),
        }
    }

    /// Create a version with a pre-release suffix.
    pub fn with_suffix(major: u32, minor: u32, patch: u32, suffix: impl Into<String>) -> Self {
        Self {
            major,
            minor,
            patch,
            suffix: suffix.into(),
        }
    }

    /// Major component.
    #[must_use]
    pub const fn major(&self) -> u32 {
        self.major
    }

    /// Minor component.
    #[must_use]
    pub const fn minor(&self) -> u32 {
        self.minor
    }

    /// Patch component.
    #[must_use]
    pub const fn patch(&self) -> u32 {
        self.patch
    }

    /// Suffix, empty when the version is a release.
    #[must_use]
    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    /// Whether the version carries a pre-release suffix.
    #[must_use]
    pub fn is_prerelease(&self) -> bool {
        !self.suffix.is_empty()
    }
}

impl FromStr for Version {
    type Err = VersionError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(VersionError::Empty);
        }

        let (numbers, suffix) = match trimmed.split_once('-') {
            Some((numbers, suffix)) => (numbers, suffix),
            None => (trimmed, ""),
        };

        let mut parts = [0u32; 3];
        let mut count = 0;
        for component in numbers.split('.') {
            if count == parts.len() {
                return Err(VersionError::TooManyComponents(input.to_string()));
            }
            parts[count] = component
                .parse()
                .map_err(|_| VersionError::InvalidComponent {
                    input: input.to_string(),
                    component: component.to_string(),
                })?;
            count += 1;
        }

        Ok(Self {
            major: parts[0],
            minor: parts[1],
            patch: parts[2],
            suffix: suffix.to_string(),
        })
    }
}

impl TryFrom<String> for Version {
    type Error = VersionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Version> for String {
    fn from(version: Version) -> Self {
        version.to_string()
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        if !self.suffix.is_empty() {
            write!(f, "-{}", self.suffix)?;
        }
        Ok(())
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.major, self.minor, self.patch)
            .cmp(&(other.major, other.minor, other.patch))
            .then_with(|| match (self.suffix.is_empty(), other.suffix.is_empty()) {
                // A release ranks above any of its pre-releases.
                (true, true) => Ordering::Equal,
                (true, false) => Ordering::Greater,
                (false, true) => Ordering::Less,
                (false, false) => self.suffix.cmp(&other.suffix),
            })
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
