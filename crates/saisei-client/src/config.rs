//! Connection configuration
//!
//! A [`SaiseiConfig`] is built once, either through [`SaiseiConfig::builder`] or
//! from `SAISEI_*` environment variables, and is immutable afterwards.

use crate::error::SaiseiError;
use std::env;
use std::fmt;
use std::time::Duration;

/// Default REST port of a Saisei appliance
pub const DEFAULT_PORT: u16 = 5000;

/// Path prefix under which every resource of the running configuration lives
pub const DEFAULT_BASE_PATH: &str = "/rest/top/configurations/running";

/// Connection settings for a Saisei appliance
#[derive(Clone, PartialEq, Eq)]
pub struct SaiseiConfig {
    host: String,
    port: u16,
    base_path: String,
    username: String,
    password: String,
    debug: bool,
    insecure_skip_verify: bool,
    timeout: Option<Duration>,
}

impl SaiseiConfig {
    /// Create a config with default port, base path and flags
    ///
    /// # Arguments
    /// * `host` - Scheme and host name (e.g., "https://saisei.example.net")
    /// * `username` - Basic auth user
    /// * `password` - Basic auth password
    ///
    /// # Errors
    /// Returns [`SaiseiError::InvalidConfig`] if the host is empty.
    pub fn new(
        host: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<Self, SaiseiError> {
        Self::builder(host, username, password).build()
    }

    /// Start building a config
    pub fn builder(
        host: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> SaiseiConfigBuilder {
        SaiseiConfigBuilder {
            host: host.into(),
            port: DEFAULT_PORT,
            base_path: DEFAULT_BASE_PATH.to_string(),
            username: username.into(),
            password: password.into(),
            debug: false,
            insecure_skip_verify: false,
            timeout: None,
        }
    }

    /// Load configuration from environment variables
    ///
    /// | Variable | Default |
    /// |---|---|
    /// | `SAISEI_URL` | required |
    /// | `SAISEI_USERNAME` | required |
    /// | `SAISEI_PASSWORD` | required |
    /// | `SAISEI_PORT` | `5000` |
    /// | `SAISEI_BASE_PATH` | `/rest/top/configurations/running` |
    /// | `SAISEI_DEBUG` | `false` |
    /// | `SAISEI_INSECURE_SKIP_VERIFY` | `false` |
    /// | `SAISEI_TIMEOUT_SECS` | unset (no timeout) |
    ///
    /// # Errors
    /// Returns [`SaiseiError::InvalidConfig`] when a required variable is missing
    /// or a value cannot be parsed.
    pub fn from_env() -> Result<Self, SaiseiError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self, SaiseiError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key).ok_or_else(|| {
                SaiseiError::InvalidConfig(format!("{key} environment variable is required"))
            })
        };

        let mut builder = Self::builder(
            required("SAISEI_URL")?,
            required("SAISEI_USERNAME")?,
            required("SAISEI_PASSWORD")?,
        );

        if let Some(port) = lookup("SAISEI_PORT") {
            let port = port.trim().parse::<u16>().map_err(|e| {
                SaiseiError::InvalidConfig(format!("SAISEI_PORT={port:?} is not a valid port: {e}"))
            })?;
            builder = builder.port(port);
        }
        if let Some(base_path) = lookup("SAISEI_BASE_PATH") {
            builder = builder.base_path(base_path);
        }
        if let Some(debug) = lookup("SAISEI_DEBUG") {
            builder = builder.debug(parse_flag("SAISEI_DEBUG", &debug)?);
        }
        if let Some(insecure) = lookup("SAISEI_INSECURE_SKIP_VERIFY") {
            builder = builder.insecure_skip_verify(parse_flag("SAISEI_INSECURE_SKIP_VERIFY", &insecure)?);
        }
        if let Some(secs) = lookup("SAISEI_TIMEOUT_SECS") {
            let secs = secs.trim().parse::<u64>().map_err(|e| {
                SaiseiError::InvalidConfig(format!("SAISEI_TIMEOUT_SECS={secs:?} is not a number: {e}"))
            })?;
            builder = builder.timeout(Duration::from_secs(secs));
        }

        builder.build()
    }

    /// Scheme and host, without trailing slash
    pub fn host(&self) -> &str {
        &self.host
    }

    /// REST port
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Path prefix of every resource
    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    /// Basic auth user
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Basic auth password
    pub fn password(&self) -> &str {
        &self.password
    }

    /// Whether per-request transport diagnostics are captured
    pub fn debug(&self) -> bool {
        self.debug
    }

    /// Whether TLS certificate validation is disabled
    pub fn insecure_skip_verify(&self) -> bool {
        self.insecure_skip_verify
    }

    /// Request timeout, `None` when requests may run indefinitely
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// `{host}:{port}`
    pub fn base_url(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl fmt::Debug for SaiseiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SaiseiConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("base_path", &self.base_path)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("debug", &self.debug)
            .field("insecure_skip_verify", &self.insecure_skip_verify)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Builder for [`SaiseiConfig`]
#[derive(Clone)]
pub struct SaiseiConfigBuilder {
    host: String,
    port: u16,
    base_path: String,
    username: String,
    password: String,
    debug: bool,
    insecure_skip_verify: bool,
    timeout: Option<Duration>,
}

impl fmt::Debug for SaiseiConfigBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SaiseiConfigBuilder")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("base_path", &self.base_path)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish_non_exhaustive()
    }
}

impl SaiseiConfigBuilder {
    /// Set the REST port
    #[must_use]
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set the resource path prefix
    #[must_use]
    pub fn base_path(mut self, base_path: impl Into<String>) -> Self {
        self.base_path = base_path.into();
        self
    }

    /// Enable or disable transport diagnostics
    #[must_use]
    pub fn debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Accept any server certificate
    #[must_use]
    pub fn insecure_skip_verify(mut self, insecure: bool) -> Self {
        self.insecure_skip_verify = insecure;
        self
    }

    /// Bound every request by `timeout`
    ///
    /// Without this, no timeout is applied.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Validate and build the config
    ///
    /// # Errors
    /// Returns [`SaiseiError::InvalidConfig`] if the host is empty or the base
    /// path does not start with `/`.
    pub fn build(self) -> Result<SaiseiConfig, SaiseiError> {
        let host = self.host.trim().trim_end_matches('/').to_string();
        if host.is_empty() {
            return Err(SaiseiError::InvalidConfig("host must not be empty".to_string()));
        }

        let base_path = self.base_path.trim().trim_end_matches('/').to_string();
        if !base_path.is_empty() && !base_path.starts_with('/') {
            return Err(SaiseiError::InvalidConfig(format!(
                "base path must start with '/': {base_path}"
            )));
        }

        Ok(SaiseiConfig {
            host,
            port: self.port,
            base_path,
            username: self.username,
            password: self.password,
            debug: self.debug,
            insecure_skip_verify: self.insecure_skip_verify,
            timeout: self.timeout,
        })
    }
}

fn parse_flag(key: &str, value: &str) -> Result<bool, SaiseiError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => Err(SaiseiError::InvalidConfig(format!(
            "{key}={other:?} is not a boolean"
        ))),
    }
}
