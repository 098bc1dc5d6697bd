//! Client configuration structures

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use crate::constants::{DEFAULT_HTTPS_PORT, DEFAULT_HTTP_PORT, DEFAULT_TIMEOUT_MS};
use crate::errors::ErrorModel;
use crate::impl_wire_enum_conversions;

/// Configuration failures. Surfaced to callers as caller errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("unsupported protocol: {0}")]
    UnsupportedProtocol(String),

    #[error("invalid base url: {0}")]
    InvalidUrl(String),

    #[error("Config file not found: {0}")]
    NotFound(String),

    #[error("Invalid {format} format: {message}")]
    Format { format: String, message: String },

    #[error("Configuration error: {0}")]
    Invalid(String),
}

impl From<ConfigError> for ErrorModel {
    fn from(err: ConfigError) -> Self {
        ErrorModel::caller(err.to_string())
    }
}

/// Transport scheme of the REST endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Protocol {
    #[default]
    Https,
    Http,
}

impl_wire_enum_conversions!(Protocol {
    Https => "https",
    Http => "http",
});

impl Protocol {
    pub fn default_port(self) -> u16 {
        match self {
            Self::Https => DEFAULT_HTTPS_PORT,
            Self::Http => DEFAULT_HTTP_PORT,
        }
    }

    /// Parse a scheme string, rejecting anything but http/https.
    pub fn parse(value: &str) -> Result<Self, ConfigError> {
        value.parse().map_err(|_| ConfigError::UnsupportedProtocol(value.to_string()))
    }
}

impl Serialize for Protocol {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Protocol {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// Login credentials. The password never appears in Debug output or in
/// serialized call context.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Credentials {
    pub user: String,
    #[serde(skip_serializing)]
    pub password: String,
}

impl Credentials {
    pub fn new(user: impl Into<String>, password: impl Into<String>) -> Self {
        Self { user: user.into(), password: password.into() }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials").field("user", &self.user).field("password", &"***").finish()
    }
}

/// Connection settings for one client instance.
///
/// Everything is optional up front; `server`, `user` and `password` only
/// have to be present by the time `authenticate` runs.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClientConfig {
    pub protocol: Protocol,
    pub server: String,
    /// Defaults to 443 for https and 80 for http.
    pub port: Option<u16>,
    /// Path prefix when the REST API sits behind a reverse proxy.
    pub proxy_path: Option<String>,
    pub user: Option<String>,
    #[serde(skip_serializing)]
    pub password: Option<String>,
    pub timeout_ms: u64,
    /// Emit request-level debug events.
    pub debug: bool,
    /// Skip TLS certificate validation for this client only.
    pub accept_invalid_certs: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            protocol: Protocol::Https,
            server: String::new(),
            port: None,
            proxy_path: None,
            user: None,
            password: None,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            debug: false,
            accept_invalid_certs: false,
        }
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("protocol", &self.protocol)
            .field("server", &self.server)
            .field("port", &self.port)
            .field("proxy_path", &self.proxy_path)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("timeout_ms", &self.timeout_ms)
            .field("debug", &self.debug)
            .field("accept_invalid_certs", &self.accept_invalid_certs)
            .finish()
    }
}

impl ClientConfig {
    /// Build a configuration from a base URL such as
    /// `https://ars.example.com:8443/proxy`.
    ///
    /// # Errors
    /// Returns `ConfigError` if the URL does not parse, has no host, or uses
    /// a scheme other than http/https.
    pub fn from_base_url(base_url: &str) -> Result<Self, ConfigError> {
        let parsed =
            url::Url::parse(base_url).map_err(|e| ConfigError::InvalidUrl(format!("{base_url}: {e}")))?;
        let protocol = Protocol::parse(parsed.scheme())?;
        let server = parsed
            .host_str()
            .ok_or_else(|| ConfigError::InvalidUrl(format!("{base_url}: missing host")))?
            .to_string();
        let proxy_path = Some(parsed.path().trim_end_matches('/'))
            .filter(|path| !path.is_empty())
            .map(str::to_string);

        Ok(Self { protocol, server, port: parsed.port(), proxy_path, ..Self::default() })
    }

    pub fn with_credentials(mut self, user: impl Into<String>, password: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self.password = Some(password.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    pub fn effective_port(&self) -> u16 {
        self.port.unwrap_or_else(|| self.protocol.default_port())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// `<protocol>://<server>:<port><proxy_path>` without a trailing slash.
    pub fn base_url(&self) -> String {
        let proxy = self
            .proxy_path
            .as_deref()
            .map(|path| path.trim().trim_matches('/'))
            .filter(|path| !path.is_empty())
            .map(|path| format!("/{path}"))
            .unwrap_or_default();

        format!("{}://{}:{}{}", self.protocol, self.server.trim(), self.effective_port(), proxy)
    }

    /// Credentials assembled from `user`/`password` when a user is set.
    ///
    /// A missing password comes back empty; login reports it.
    pub fn credentials(&self) -> Option<Credentials> {
        let user = self.user.as_deref().filter(|user| !user.trim().is_empty())?;
        Some(Credentials::new(user, self.password.as_deref().unwrap_or_default()))
    }
}
