//! Diffset library - structured access to unified git diff output.
//!
//! This crate provides:
//! - Diff text parsing into ordered per-file records (`diff`)
//! - Lazy, cached diff requests against a backend (`diff::Diff`)
//! - Backend abstraction plus git and in-memory implementations (`sources`)
//!
//! Feature flags:
//! - `cli`: Command-line interface

pub mod diff;
pub mod error;
pub mod sources;

// CLI module (feature-gated)
#[cfg(feature = "cli")]
pub mod cli;

// Re-export commonly used types
pub use diff::{Diff, DiffSet, FileChange, Side};
pub use error::DiffError;
pub use sources::traits::{DiffRequest, DiffSource, DiffStats};
