//! tablescope CLI library.
//!
//! This module exposes internal types for testing purposes.
//! The main entry point is the `tablescope` binary.

pub mod catalog;
pub mod cli;
#[cfg(feature = "metadata-provider")]
pub mod metadata;
pub mod output;
pub mod report;

// Re-export commonly used types
pub use cli::Args;
