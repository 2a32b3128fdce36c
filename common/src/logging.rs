//! Structured logging initialization
//!
//! Provides consistent logging initialization across the launcher binaries.

use std::io;
use tracing::span::EnteredSpan;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Guard that keeps the component span entered.
///
/// Hold it for the lifetime of the program. Once the launcher execs the
/// target process it is never dropped, which is fine.
pub struct LogGuard {
    _span: EnteredSpan,
}

/// Initialize structured logging for a component.
///
/// Logs go to stderr: stdout belongs to the launched server's access log
/// and to dry-run output.
///
/// # Example
/// ```ignore
/// let _guard = init_logging("dev-server");
/// info!("Starting up...");
/// ```
pub fn init_logging(component: &str) -> LogGuard {
    let filter = EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into());

    let format = fmt::layer().with_target(false).with_writer(io::stderr);

    tracing_subscriber::registry()
        .with(filter)
        .with(format)
        .init();

    LogGuard {
        _span: tracing::info_span!("launcher", component).entered(),
    }
}
