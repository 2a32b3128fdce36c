//! Launch inputs read from the process environment

use common::ConfigExt;
use std::ffi::OsString;
use tracing::warn;

pub const STATSD_HOST: &str = "STATSD_HOST";
pub const STATSD_PORT: &str = "STATSD_PORT";
pub const ELASTIC_APM_ENABLED: &str = "ELASTIC_APM_ENABLED";

/// The three variables that shape the server command.
///
/// Values are kept as raw OS strings so non-unicode bytes reach the server
/// untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LaunchEnv {
    /// `None` when `STATSD_HOST` is unset or empty.
    pub statsd_host: Option<OsString>,
    /// Verbatim `STATSD_PORT`, empty when unset.
    pub statsd_port: OsString,
    /// `ELASTIC_APM_ENABLED` is set to any non-empty value.
    pub apm_enabled: bool,
}

impl LaunchEnv {
    /// Read from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(OsString::env_opt)
    }

    /// Read through an arbitrary lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<OsString>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.is_empty());

        Self {
            statsd_host: get(STATSD_HOST),
            statsd_port: get(STATSD_PORT).unwrap_or_default(),
            apm_enabled: get(ELASTIC_APM_ENABLED).is_some(),
        }
    }

    /// Warn about a StatsD port that will produce a broken flag.
    ///
    /// The port is still passed through untouched.
    pub fn warn_on_suspicious_port(&self) {
        let Some(host) = &self.statsd_host else {
            return;
        };
        let host = host.to_string_lossy();

        if self.statsd_port.is_empty() {
            warn!(
                host = %host,
                "STATSD_HOST is set but STATSD_PORT is empty, passing --statsd-host {}:",
                host
            );
        } else if self
            .statsd_port
            .to_str()
            .and_then(|port| port.parse::<u16>().ok())
            .is_none()
        {
            warn!(
                host = %host,
                port = %self.statsd_port.to_string_lossy(),
                "STATSD_PORT is not a valid port number, passing it through as-is"
            );
        }
    }
}
