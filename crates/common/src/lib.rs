//! facecursor common utilities
//!
//! Shared infrastructure for all facecursor crates:
//! - Error types and result aliases
//! - Session wall-clock anchor for action logs
//! - Tracing/logging initialization
//! - Configuration loading

pub mod clock;
pub mod config;
pub mod error;
pub mod logging;

pub use clock::*;
pub use config::*;
pub use error::*;
