//! Configuration loader
//!
//! Loads client configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If `ARS_REST_SERVER` is not set, falls back to loading from file
//! 3. Probes the working directory for config files
//! 4. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! - `ARS_REST_SERVER`: AR server host name (required)
//! - `ARS_REST_PROTOCOL`: `https` (default) or `http`
//! - `ARS_REST_PORT`: Port; defaults to 443/80 by protocol
//! - `ARS_REST_PROXY_PATH`: Path prefix when behind a reverse proxy
//! - `ARS_REST_USER`: Login user
//! - `ARS_REST_PASSWORD`: Login password
//! - `ARS_REST_TIMEOUT_MS`: Per-request timeout in milliseconds
//! - `ARS_REST_DEBUG`: Emit request debug events (true/false)
//! - `ARS_REST_ACCEPT_INVALID_CERTS`: Skip TLS validation (true/false)
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./arsrest.json` or `./arsrest.toml`
//! 2. `./config.json` or `./config.toml`

use std::path::{Path, PathBuf};

use arsrest_domain::{ClientConfig, ConfigError, Protocol};

/// Load configuration with automatic fallback strategy
///
/// # Errors
/// Returns `ConfigError` if configuration cannot be loaded from either
/// source or has invalid values.
pub fn load() -> Result<ClientConfig, ConfigError> {
    match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            Ok(config)
        }
        Err(e) => {
            tracing::debug!(error = %e, "Failed to load from environment, trying file");
            load_from_file(None)
        }
    }
}

/// Load configuration from the process environment
///
/// # Errors
/// Returns `ConfigError` if `ARS_REST_SERVER` is missing or a variable has
/// an invalid value.
pub fn load_from_env() -> Result<ClientConfig, ConfigError> {
    load_from_lookup(|key| std::env::var(key).ok())
}

/// Load configuration through an arbitrary variable lookup
///
/// # Errors
/// Same as [`load_from_env`].
pub fn load_from_lookup<F>(lookup: F) -> Result<ClientConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let var = |key: &str| lookup(key).map(|value| value.trim().to_string()).filter(|v| !v.is_empty());

    let server = var("ARS_REST_SERVER").ok_or_else(|| {
        ConfigError::Invalid("Missing required environment variable: ARS_REST_SERVER".to_string())
    })?;

    let mut config = ClientConfig { server, ..ClientConfig::default() };

    if let Some(protocol) = var("ARS_REST_PROTOCOL") {
        config.protocol = Protocol::parse(&protocol)?;
    }
    if let Some(port) = var("ARS_REST_PORT") {
        config.port = Some(
            port.parse::<u16>().map_err(|e| ConfigError::Invalid(format!("Invalid port: {e}")))?,
        );
    }
    if let Some(timeout) = var("ARS_REST_TIMEOUT_MS") {
        config.timeout_ms = timeout
            .parse::<u64>()
            .map_err(|e| ConfigError::Invalid(format!("Invalid timeout: {e}")))?;
    }

    config.proxy_path = var("ARS_REST_PROXY_PATH");
    config.user = var("ARS_REST_USER");
    config.password = lookup("ARS_REST_PASSWORD");
    config.debug = var("ARS_REST_DEBUG").map_or(false, |v| parse_bool(&v));
    config.accept_invalid_certs = var("ARS_REST_ACCEPT_INVALID_CERTS").map_or(false, |v| parse_bool(&v));

    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, probes the standard locations. Format is detected
/// by file extension.
///
/// # Errors
/// Returns `ConfigError` if the file is missing, unreadable or invalid.
pub fn load_from_file(path: Option<PathBuf>) -> Result<ClientConfig, ConfigError> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(ConfigError::NotFound(p.display().to_string()));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            ConfigError::NotFound("no config file in any of the standard locations".to_string())
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| ConfigError::Invalid(format!("Failed to read config file: {e}")))?;

    parse_config(&contents, &config_path)
}

/// Parse configuration from string content
///
/// # Errors
/// Returns `ConfigError::Format` if parsing fails, `ConfigError::Invalid`
/// for unsupported extensions.
fn parse_config(contents: &str, path: &Path) -> Result<ClientConfig, ConfigError> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| ConfigError::Format { format: "TOML".to_string(), message: e.to_string() }),
        "json" => serde_json::from_str(contents)
            .map_err(|e| ConfigError::Format { format: "JSON".to_string(), message: e.to_string() }),
        _ => Err(ConfigError::Invalid(format!("Unsupported config format: {extension}"))),
    }
}

/// Probe the working directory for configuration files
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let cwd = std::env::current_dir().ok()?;
    probe_in(&cwd)
}

fn probe_in(dir: &Path) -> Option<PathBuf> {
    ["arsrest.json", "arsrest.toml", "config.json", "config.toml"]
        .into_iter()
        .map(|name| dir.join(name))
        .find(|path| path.exists())
}

/// Accepts: `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive)
fn parse_bool(value: &str) -> bool {
    matches!(value.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use tempfile::TempDir;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            vars.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_parse_bool() {
        for value in ["1", "true", "YES", "On"] {
            assert!(parse_bool(value), "{value}");
        }
        for value in ["0", "false", "no", "off", "maybe"] {
            assert!(!parse_bool(value), "{value}");
        }
    }

    #[test]
    fn test_load_from_lookup_all_vars_set() {
        let config = load_from_lookup(lookup(&[
            ("ARS_REST_SERVER", "ars.example.com"),
            ("ARS_REST_PROTOCOL", "http"),
            ("ARS_REST_PORT", "8008"),
            ("ARS_REST_PROXY_PATH", "/rest"),
            ("ARS_REST_USER", "Demo"),
            ("ARS_REST_PASSWORD", "pw"),
            ("ARS_REST_TIMEOUT_MS", "5000"),
            ("ARS_REST_DEBUG", "true"),
            ("ARS_REST_ACCEPT_INVALID_CERTS", "1"),
        ]))
        .unwrap();

        assert_eq!(config.base_url(), "http://ars.example.com:8008/rest");
        assert_eq!(config.timeout_ms, 5000);
        assert!(config.debug);
        assert!(config.accept_invalid_certs);
        assert_eq!(config.credentials().map(|c| c.user), Some("Demo".to_string()));
    }

    #[test]
    fn test_load_from_lookup_defaults() {
        let config = load_from_lookup(lookup(&[("ARS_REST_SERVER", "ars")])).unwrap();
        assert_eq!(config.base_url(), "https://ars:443");
        assert_eq!(config.timeout_ms, 120_000);
        assert!(!config.accept_invalid_certs);
        assert!(config.credentials().is_none());
    }

    #[test]
    fn test_load_from_lookup_missing_server() {
        let err = load_from_lookup(lookup(&[("ARS_REST_USER", "Demo")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_load_from_lookup_invalid_values() {
        let err =
            load_from_lookup(lookup(&[("ARS_REST_SERVER", "a"), ("ARS_REST_PORT", "not-a-port")]))
                .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));

        let err =
            load_from_lookup(lookup(&[("ARS_REST_SERVER", "a"), ("ARS_REST_PROTOCOL", "ftp")]))
                .unwrap_err();
        assert_eq!(err, ConfigError::UnsupportedProtocol("ftp".to_string()));
    }

    #[test]
    fn test_parse_config_json_and_toml() {
        let json = r#"{ "server": "ars", "port": 8443, "user": "Demo", "password": "pw" }"#;
        let config = parse_config(json, Path::new("arsrest.json")).unwrap();
        assert_eq!(config.base_url(), "https://ars:8443");
        assert!(config.credentials().is_some());

        let toml = "server = \"ars\"\nprotocol = \"http\"\ntimeout_ms = 1000\n";
        let config = parse_config(toml, Path::new("arsrest.toml")).unwrap();
        assert_eq!(config.base_url(), "http://ars:80");
        assert_eq!(config.timeout_ms, 1000);
    }

    #[test]
    fn test_parse_config_rejects_unknown_keys_and_formats() {
        let err = parse_config(r#"{ "server": "ars", "hostname": "x" }"#, Path::new("a.json"))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Format { .. }));

        let err = parse_config("server: ars", Path::new("a.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_probe_prefers_arsrest_over_config() {
        let dir = TempDir::new().unwrap();
        assert_eq!(probe_in(dir.path()), None);

        std::fs::write(dir.path().join("config.toml"), "server = \"b\"").unwrap();
        assert_eq!(probe_in(dir.path()), Some(dir.path().join("config.toml")));

        std::fs::write(dir.path().join("arsrest.json"), r#"{"server":"a"}"#).unwrap();
        assert_eq!(probe_in(dir.path()), Some(dir.path().join("arsrest.json")));
    }

    #[test]
    fn test_load_from_file_not_found() {
        let err = load_from_file(Some(PathBuf::from("/nonexistent/arsrest.json"))).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }
}
