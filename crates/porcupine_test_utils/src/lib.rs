//! # Porcupine Test Utilities
//!
//! Shared testing utilities for all crates:
//! - Fixture modules and a registry that knows them
//! - Real mod folders with jar archives and properties files on disk
//! - Determinism helpers for the army composer
//! - Log capture for asserting on warnings
//! - Property-based testing strategies

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod determinism;
pub mod fixtures;
pub mod logs;
pub mod mod_folder;

/// Re-export proptest for convenience.
pub use proptest;
