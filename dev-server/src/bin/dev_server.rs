//! Development server launcher
//!
//! Starts gunicorn in auto-reload mode on 0.0.0.0:8000, wrapped by
//! `ddtrace-run` unless ELASTIC_APM_ENABLED is set, with StatsD flags when
//! STATSD_HOST is set. Never use this in production: auto-reload is unsafe
//! there.

use anyhow::{Context, Result};
use common::init_logging;
use dev_server::{exec, Config, DryRun, LaunchEnv, LaunchPlan};
use std::env;
use tracing::{error, info};

fn main() -> Result<()> {
    let _guard = init_logging("dev-server");

    let config = Config::from_env();
    let launch_env = LaunchEnv::from_env();
    launch_env.warn_on_suspicious_port();

    let plan = LaunchPlan::assemble(&launch_env).with_extra_args(env::args_os().skip(1));

    info!(
        traced = plan.traced,
        statsd = %plan.statsd_suffix.to_string_lossy(),
        "Assembled development server command"
    );

    match config.dry_run {
        DryRun::CommandLine => {
            println!("{}", plan.command_line());
            return Ok(());
        }
        DryRun::Json => {
            let json = serde_json::to_string_pretty(&plan).context("Failed to serialize plan")?;
            println!("{}", json);
            return Ok(());
        }
        DryRun::Off => {}
    }

    // exec only returns if there was an error
    let err = exec(&plan);
    error!(error = %err, "Failed to start development server");
    std::process::exit(err.exit_code());
}
