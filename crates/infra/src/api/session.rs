//! Connection state of one client: endpoint, credentials and token.

use std::time::Duration;

use arsrest_domain::constants::{AUTH_SCHEME, NOT_AUTHENTICATED};
use arsrest_domain::{ClientConfig, Credentials, ErrorModel, Outcome};

/// Owns the bearer token. Only `set_token`/`clear_token` change it.
#[derive(Clone)]
pub struct Session {
    base_url: String,
    server: String,
    credentials: Option<Credentials>,
    token: Option<String>,
    timeout: Duration,
    debug: bool,
}

impl Session {
    /// Unauthenticated session for `config`.
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            base_url: config.base_url(),
            server: config.server.trim().to_string(),
            credentials: config.credentials(),
            token: None,
            timeout: config.timeout(),
            debug: config.debug,
        }
    }

    /// `<protocol>://<server>:<port><proxy_path>`
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Host name, trimmed; empty when not configured.
    pub fn server(&self) -> &str {
        &self.server
    }

    /// Credentials used by the next login, if any.
    pub fn credentials(&self) -> Option<&Credentials> {
        self.credentials.as_ref()
    }

    /// Replace the credentials used by the next login.
    pub fn set_credentials(&mut self, credentials: Credentials) {
        self.credentials = Some(credentials);
    }

    /// Per-request timeout applied to every call.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Whether request-level debug events are emitted.
    pub fn debug(&self) -> bool {
        self.debug
    }

    /// True while a token is held.
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// Store the token returned by a successful login.
    pub fn set_token(&mut self, token: String) {
        self.token = Some(token);
    }

    /// Forget the token after a successful logout.
    pub fn clear_token(&mut self) {
        self.token = None;
    }

    /// `Authorization` header value for the current token.
    ///
    /// # Errors
    /// Returns a caller error when no token is held.
    pub fn authorization(&self) -> Outcome<String> {
        self.token
            .as_deref()
            .map(|token| format!("{AUTH_SCHEME} {token}"))
            .ok_or_else(|| ErrorModel::caller(NOT_AUTHENTICATED))
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("base_url", &self.base_url)
            .field("credentials", &self.credentials)
            .field("authenticated", &self.token.is_some())
            .field("timeout", &self.timeout)
            .field("debug", &self.debug)
            .finish()
    }
}
