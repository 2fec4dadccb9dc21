//! HandsOff Common Utilities
//!
//! Shared infrastructure for all HandsOff crates:
//! - Error types and result aliases
//! - Frame-clock and rate utilities for the per-frame loop
//! - Tracing/logging initialization
//! - Typed configuration with documented defaults

pub mod clock;
pub mod config;
pub mod error;
pub mod logging;

pub use clock::*;
pub use config::*;
pub use error::*;
