//! # Porcupine Development Tools
//!
//! Command-line tools for mod authors:
//! - Mod folder scanner
//! - Raid army calculator
//! - Config file checker

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod check;
pub mod error;
pub mod raid;
pub mod scan;

pub use error::{Result, ToolError};
