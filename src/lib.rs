//! verstamp - date-based release version stamping.
//!
//! This library provides the pieces behind the verstamp CLI: version
//! derivation, git head lookup, and writing the generated version file and
//! CI step outputs.

#![deny(missing_docs)]

/// Version string from Cargo.toml.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod cli;
pub mod git;
pub mod output;
pub mod template;
pub mod version;

pub use version::{normalize, resolve, Stamp, VersionError};
