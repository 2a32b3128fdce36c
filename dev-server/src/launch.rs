//! Process replacement

use crate::command::LaunchPlan;
use std::io;
use std::os::unix::process::CommandExt;
use std::process::Command;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("{program}: command not found")]
    NotFound { program: String },

    #[error("{program}: permission denied")]
    PermissionDenied { program: String },

    #[error("failed to exec {program}: {source}")]
    Exec {
        program: String,
        #[source]
        source: io::Error,
    },
}

impl LaunchError {
    fn from_io(program: &str, err: io::Error) -> Self {
        let program = program.to_string();
        match err.kind() {
            io::ErrorKind::NotFound => Self::NotFound { program },
            io::ErrorKind::PermissionDenied => Self::PermissionDenied { program },
            _ => Self::Exec {
                program,
                source: err,
            },
        }
    }

    /// Exit status a POSIX shell would report for the same failure.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::NotFound { .. } => 127,
            Self::PermissionDenied { .. } => 126,
            Self::Exec { .. } => 1,
        }
    }
}

/// Build the `Command` for a plan without running it.
pub fn build_command(plan: &LaunchPlan) -> Command {
    let argv = plan.argv();
    let mut cmd = Command::new(&argv[0]);
    cmd.args(&argv[1..]).envs(&plan.env);
    cmd
}

/// Replace the current process with the planned command.
///
/// Only returns if exec failed. On success the server inherits this PID,
/// stdio and, eventually, the exit status.
pub fn exec(plan: &LaunchPlan) -> LaunchError {
    info!(command = %plan.command_line(), "Starting development server");

    let err = build_command(plan).exec();
    LaunchError::from_io(plan.program(), err)
}
