//! Environment variable parsing helpers
//!
//! Provides ergonomic helpers for reading configuration from environment variables.

use std::env;
use std::ffi::OsString;

/// Extension trait for parsing environment variables.
///
/// Provides convenient methods for reading env vars with defaults.
pub trait ConfigExt {
    /// Get an environment variable with a default value.
    ///
    /// # Example
    /// ```ignore
    /// let bind = String::env_or("BIND", "0.0.0.0:8000");
    /// ```
    fn env_or(name: &str, default: &str) -> String {
        env::var(name).unwrap_or_else(|_| default.to_string())
    }

    /// Get an environment variable only if it is set to a non-empty value.
    ///
    /// The raw value is returned, so non-unicode bytes still count as set,
    /// matching the shell's `[ -n "$VAR" ]`.
    fn env_opt(name: &str) -> Option<OsString> {
        env::var_os(name).filter(|v| !v.is_empty())
    }
}

// Blanket implementation for all types
impl<T> ConfigExt for T {}
