//! Protocol constants
//!
//! Paths, header values and defaults shared by the domain and infra crates.

// Endpoint defaults
pub const DEFAULT_TIMEOUT_MS: u64 = 2 * 60 * 1000;
pub const DEFAULT_HTTPS_PORT: u16 = 443;
pub const DEFAULT_HTTP_PORT: u16 = 80;

// REST paths (relative to the optional proxy path)
pub const LOGIN_PATH: &str = "/api/jwt/login";
pub const LOGOUT_PATH: &str = "/api/jwt/logout";
pub const ENTRY_PATH: &str = "/api/arsys/v1/entry";
pub const MERGE_ENTRY_PATH: &str = "/api/arsys/v1/mergeEntry";

// Headers
pub const AUTH_SCHEME: &str = "AR-JWT";
pub const CONTENT_TYPE_JSON: &str = "application/json";
pub const CONTENT_TYPE_FORM: &str = "application/x-www-form-urlencoded";
pub const CACHE_CONTROL_NO_CACHE: &str = "no-cache";

// Error messages
pub const NO_MESSAGE_AVAILABLE: &str =
    "no error message available (not set, cannot be parsed from response)";
pub const NO_ERROR_OBJECT: &str = "(error object not returned from ARServer)";
pub const NOT_AUTHENTICATED: &str =
    "operation requires authentication and api handle is not authenticated";
