use std::fmt;
use std::time::Duration;

use crate::runtime::DEFAULT_UNIT_MARKERS;

pub const INTERVAL_VAR: &str = "REPORTER_INTERVAL";
pub const RUNTIME_ENDPOINT_VAR: &str = "RUNTIME_ENDPOINT";
pub const REMOTE_ENDPOINT_VAR: &str = "REMOTE_ENDPOINT";
pub const REMOTE_TOKEN_VAR: &str = "REMOTE_TOKEN";
pub const UNIT_MARKERS_VAR: &str = "UNIT_ENV_MARKERS";

pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(60);
pub const DEFAULT_RUNTIME_ENDPOINT: &str = "unix:///var/run/docker.sock";

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("environment variable `{0}` must be set")]
    Missing(&'static str),
    #[error("invalid value {value:?} for `{var}`: expected a positive number of seconds")]
    InvalidInterval { var: &'static str, value: String },
    #[error("`{0}` must name at least one environment variable")]
    NoUnitMarkers(&'static str),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Settings of a reporter. Immutable once the reporter is started.
#[derive(Clone, PartialEq, Eq)]
pub struct ReporterConfig {
    /// Pause between the end of one cycle and the start of the next.
    pub interval: Duration,
    pub runtime_endpoint: String,
    /// Base URL of the control plane; reports go to `{remote_endpoint}/units/status`.
    pub remote_endpoint: String,
    pub remote_token: String,
    /// Environment variables that mark a container as a managed unit.
    pub unit_markers: Vec<String>,
}

impl ReporterConfig {
    pub fn new(
        interval: Duration,
        runtime_endpoint: impl Into<String>,
        remote_endpoint: impl Into<String>,
        remote_token: impl Into<String>,
    ) -> Self {
        Self {
            interval,
            runtime_endpoint: runtime_endpoint.into(),
            remote_endpoint: remote_endpoint.into(),
            remote_token: remote_token.into(),
            unit_markers: DEFAULT_UNIT_MARKERS.iter().map(|m| m.to_string()).collect(),
        }
    }

    pub fn with_unit_markers(mut self, unit_markers: Vec<String>) -> Self {
        self.unit_markers = unit_markers;
        self
    }

    /// Reads the configuration from the process environment.
    ///
    /// | variable            | default                       |
    /// |---------------------|-------------------------------|
    /// | `REPORTER_INTERVAL` | `60` (seconds)                |
    /// | `RUNTIME_ENDPOINT`  | `unix:///var/run/docker.sock` |
    /// | `REMOTE_ENDPOINT`   | required                      |
    /// | `REMOTE_TOKEN`      | required                      |
    /// | `UNIT_ENV_MARKERS`  | `UNIT_APP_NAME`               |
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] for missing required variables, an interval that is
    /// not a positive integer or an empty marker list.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Like [`ReporterConfig::from_env`], resolving variables through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let interval = match lookup(INTERVAL_VAR) {
            Some(value) => parse_interval(&value)?,
            None => DEFAULT_INTERVAL,
        };
        let runtime_endpoint =
            lookup(RUNTIME_ENDPOINT_VAR).unwrap_or_else(|| DEFAULT_RUNTIME_ENDPOINT.to_owned());
        let remote_endpoint = required(&lookup, REMOTE_ENDPOINT_VAR)?;
        let remote_token = required(&lookup, REMOTE_TOKEN_VAR)?;

        let mut config = Self::new(interval, runtime_endpoint, remote_endpoint, remote_token);
        if let Some(raw) = lookup(UNIT_MARKERS_VAR) {
            let markers: Vec<String> = raw
                .split(',')
                .map(str::trim)
                .filter(|m| !m.is_empty())
                .map(str::to_owned)
                .collect();
            if markers.is_empty() {
                return Err(Error::NoUnitMarkers(UNIT_MARKERS_VAR));
            }
            config = config.with_unit_markers(markers);
        }

        Ok(config)
    }
}

fn required(lookup: &impl Fn(&str) -> Option<String>, var: &'static str) -> Result<String> {
    lookup(var)
        .filter(|value| !value.trim().is_empty())
        .ok_or(Error::Missing(var))
}

fn parse_interval(value: &str) -> Result<Duration> {
    match value.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        _ => Err(Error::InvalidInterval {
            var: INTERVAL_VAR,
            value: value.to_owned(),
        }),
    }
}

impl fmt::Debug for ReporterConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReporterConfig")
            .field("interval", &self.interval)
            .field("runtime_endpoint", &self.runtime_endpoint)
            .field("remote_endpoint", &self.remote_endpoint)
            .field("remote_token", &"<redacted>")
            .field("unit_markers", &self.unit_markers)
            .finish()
    }
}
