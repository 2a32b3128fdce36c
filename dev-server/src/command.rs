//! Server command assembly

use crate::env::LaunchEnv;
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::ffi::{OsStr, OsString};
use std::os::unix::ffi::OsStrExt;

pub const TRACER: &str = "ddtrace-run";
pub const APP_SERVER: &str = "gunicorn";
pub const WSGI_APP: &str = "codecov.wsgi:application";
pub const BIND: &str = "0.0.0.0:8000";

/// Environment applied to the launched server on top of the inherited one.
pub const CHILD_ENV: &[(&str, &str)] = &[("PYTHONWARNINGS", "always")];

/// Build the StatsD flag suffix.
///
/// Empty without a host. The port is interpolated verbatim, so an empty
/// port yields `--statsd-host <host>:`.
pub fn statsd_suffix(env: &LaunchEnv) -> OsString {
    let mut suffix = OsString::new();
    if let Some(host) = &env.statsd_host {
        suffix.push("--statsd-host ");
        suffix.push(host);
        suffix.push(":");
        suffix.push(&env.statsd_port);
    }
    suffix
}

/// Split on the shell's default IFS (space, tab, newline).
fn split_words(value: &OsStr) -> impl Iterator<Item = OsString> + '_ {
    value
        .as_bytes()
        .split(|&b| matches!(b, b' ' | b'\t' | b'\n'))
        .filter(|word| !word.is_empty())
        .map(|word| OsStr::from_bytes(word).to_os_string())
}

fn serialize_lossy<S: Serializer>(value: &OsStr, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&value.to_string_lossy())
}

fn serialize_lossy_seq<S: Serializer>(
    values: &[OsString],
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(values.iter().map(|v| v.to_string_lossy()))
}

/// A fully assembled server invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LaunchPlan {
    /// Wrapped by the tracing agent.
    pub traced: bool,
    /// Program and fixed flags, before the StatsD suffix.
    pub base: Vec<String>,
    #[serde(serialize_with = "serialize_lossy")]
    pub statsd_suffix: OsString,
    /// Arguments forwarded from the launcher's own command line.
    #[serde(serialize_with = "serialize_lossy_seq")]
    pub extra_args: Vec<OsString>,
    pub env: BTreeMap<String, String>,
}

impl LaunchPlan {
    /// Select the command template and attach the StatsD suffix.
    ///
    /// A non-empty `ELASTIC_APM_ENABLED` runs gunicorn directly, anything
    /// else wraps it in `ddtrace-run`.
    pub fn assemble(env: &LaunchEnv) -> Self {
        let traced = !env.apm_enabled;

        let mut base = Vec::with_capacity(8);
        if traced {
            base.push(TRACER.to_string());
        }
        base.extend(
            [
                APP_SERVER,
                WSGI_APP,
                "--reload",
                "--bind",
                BIND,
                "--access-logfile",
                "-",
            ]
            .map(String::from),
        );

        Self {
            traced,
            base,
            statsd_suffix: statsd_suffix(env),
            extra_args: Vec::new(),
            env: CHILD_ENV
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    /// Forward extra arguments, appended after the StatsD suffix.
    pub fn with_extra_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.extra_args.extend(args.into_iter().map(Into::into));
        self
    }

    /// The executable that will be exec'd.
    pub fn program(&self) -> &str {
        &self.base[0]
    }

    /// Full argv including the program.
    ///
    /// The suffix is word-split the way an unquoted shell expansion would be.
    pub fn argv(&self) -> Vec<OsString> {
        self.base
            .iter()
            .map(OsString::from)
            .chain(split_words(&self.statsd_suffix))
            .chain(self.extra_args.iter().cloned())
            .collect()
    }

    /// Shell rendering of the command.
    ///
    /// The suffix is always preceded by a single space and appended verbatim,
    /// so an empty suffix leaves a trailing space. Non-unicode bytes are
    /// shown lossily; `argv` keeps them intact.
    pub fn command_line(&self) -> String {
        let base = self
            .base
            .iter()
            .map(|arg| render_arg(arg))
            .collect::<Vec<_>>()
            .join(" ");

        let mut line = format!("{} {}", base, self.statsd_suffix.to_string_lossy());
        for arg in &self.extra_args {
            line.push(' ');
            line.push_str(&render_arg(&arg.to_string_lossy()));
        }
        line
    }
}

/// Quote an argument for display in a POSIX shell command line.
///
/// A lone `-` is quoted so it reads as a value rather than a flag.
pub fn render_arg(arg: &str) -> String {
    let plain = arg != "-"
        && !arg.is_empty()
        && arg
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "_-./:=@%+,".contains(c));

    if plain {
        arg.to_string()
    } else {
        format!("'{}'", arg.replace('\'', r"'\''"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn statsd(host: &str, port: &str) -> LaunchEnv {
        LaunchEnv {
            statsd_host: Some(host.into()),
            statsd_port: port.into(),
            apm_enabled: false,
        }
    }

    #[test]
    fn test_suffix_empty_without_host() {
        assert_eq!(statsd_suffix(&LaunchEnv::default()), "");

        let env = LaunchEnv {
            statsd_port: "9125".into(),
            ..LaunchEnv::default()
        };
        assert_eq!(statsd_suffix(&env), "");
    }

    #[test]
    fn test_suffix_with_host_and_port() {
        assert_eq!(statsd_suffix(&statsd("h", "9125")), "--statsd-host h:9125");
    }

    #[test]
    fn test_suffix_with_empty_port_is_malformed() {
        assert_eq!(statsd_suffix(&statsd("h", "")), "--statsd-host h:");
    }

    #[test]
    fn test_apm_enabled_skips_tracer() {
        let env = LaunchEnv {
            apm_enabled: true,
            ..LaunchEnv::default()
        };
        let plan = LaunchPlan::assemble(&env);

        assert!(!plan.traced);
        assert_eq!(plan.program(), "gunicorn");
        assert!(!plan.command_line().contains(TRACER));
    }

    #[test]
    fn test_apm_unset_wraps_with_tracer() {
        let plan = LaunchPlan::assemble(&LaunchEnv::default());

        assert!(plan.traced);
        assert_eq!(plan.program(), "ddtrace-run");
        assert_eq!(plan.argv()[1], "gunicorn");
    }

    #[test]
    fn test_command_line_with_statsd() {
        let plan = LaunchPlan::assemble(&statsd("metrics.local", "8125"));
        assert_eq!(
            plan.command_line(),
            "ddtrace-run gunicorn codecov.wsgi:application --reload --bind 0.0.0.0:8000 \
             --access-logfile '-' --statsd-host metrics.local:8125"
        );
    }

    #[test]
    fn test_command_line_all_unset_keeps_trailing_space() {
        let plan = LaunchPlan::assemble(&LaunchEnv::default());
        assert_eq!(
            plan.command_line(),
            "ddtrace-run gunicorn codecov.wsgi:application --reload --bind 0.0.0.0:8000 \
             --access-logfile '-' "
        );
    }

    #[test]
    fn test_argv_splits_suffix_into_words() {
        let plan = LaunchPlan::assemble(&LaunchEnv {
            apm_enabled: true,
            ..statsd("metrics.local", "8125")
        });
        assert_eq!(
            plan.argv(),
            [
                "gunicorn",
                "codecov.wsgi:application",
                "--reload",
                "--bind",
                "0.0.0.0:8000",
                "--access-logfile",
                "-",
                "--statsd-host",
                "metrics.local:8125",
            ]
        );
    }

    #[test]
    fn test_extra_args_follow_suffix() {
        let plan =
            LaunchPlan::assemble(&statsd("h", "1")).with_extra_args(["--workers", "2"]);

        let argv = plan.argv();
        assert_eq!(&argv[argv.len() - 4..], ["--statsd-host", "h:1", "--workers", "2"]);
        assert!(plan.command_line().ends_with("--statsd-host h:1 --workers 2"));
    }

    #[test]
    fn test_non_unicode_values_reach_argv_intact() {
        let env = LaunchEnv {
            statsd_host: Some(OsStr::from_bytes(b"h\xff").into()),
            statsd_port: "8125".into(),
            apm_enabled: true,
        };
        let plan = LaunchPlan::assemble(&env)
            .with_extra_args([OsStr::from_bytes(b"--name=\xfe")]);

        let expected: Vec<OsString> = [&b"--statsd-host"[..], b"h\xff:8125", b"--name=\xfe"]
            .iter()
            .map(|bytes| OsStr::from_bytes(bytes).to_os_string())
            .collect();
        let argv = plan.argv();
        assert_eq!(argv[argv.len() - 3..], expected[..]);
        assert!(plan
            .command_line()
            .ends_with("--statsd-host h\u{FFFD}:8125 '--name=\u{FFFD}'"));
    }

    #[test]
    fn test_suffix_split_on_shell_whitespace() {
        let plan = LaunchPlan::assemble(&statsd("a\tb", "1"));
        let argv = plan.argv();
        assert_eq!(&argv[argv.len() - 3..], ["--statsd-host", "a", "b:1"]);
    }

    #[test]
    fn test_child_env_forces_python_warnings() {
        let plan = LaunchPlan::assemble(&LaunchEnv::default());
        assert_eq!(plan.env.get("PYTHONWARNINGS").map(String::as_str), Some("always"));
    }

    #[test]
    fn test_render_arg_quoting() {
        assert_eq!(render_arg("--reload"), "--reload");
        assert_eq!(render_arg("0.0.0.0:8000"), "0.0.0.0:8000");
        assert_eq!(render_arg("-"), "'-'");
        assert_eq!(render_arg(""), "''");
        assert_eq!(render_arg("a b"), "'a b'");
        assert_eq!(render_arg("it's"), r"'it'\''s'");
    }
}
