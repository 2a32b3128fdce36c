//! Development server launcher
//!
//! Reads the StatsD and APM environment, assembles the gunicorn command line
//! (optionally wrapped by `ddtrace-run`) and execs it in place of the
//! launcher process.

pub mod command;
pub mod config;
pub mod env;
pub mod launch;

pub use command::{render_arg, statsd_suffix, LaunchPlan};
pub use config::{Config, DryRun};
pub use env::LaunchEnv;
pub use launch::{exec, LaunchError};
