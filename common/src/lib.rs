//! Shared utilities for the development launchers
//!
//! This crate provides common functionality used by the launcher binaries:
//! - Structured logging initialization
//! - Environment variable parsing helpers

pub mod config;
pub mod logging;

pub use config::ConfigExt;
pub use logging::{init_logging, LogGuard};
