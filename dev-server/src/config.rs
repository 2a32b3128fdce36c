//! Launcher configuration from environment variables

use common::ConfigExt;

pub const DRY_RUN_VAR: &str = "DEV_SERVER_DRY_RUN";

/// What to do instead of launching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DryRun {
    Off,
    /// Print the shell command line.
    CommandLine,
    /// Print the full plan as JSON.
    Json,
}

impl DryRun {
    pub fn parse(value: &str) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "true" => Self::CommandLine,
            "json" => Self::Json,
            _ => Self::Off,
        }
    }
}

/// Configuration for the launcher itself
pub struct Config {
    pub dry_run: DryRun,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            dry_run: DryRun::parse(&String::env_or(DRY_RUN_VAR, "false")),
        }
    }
}
