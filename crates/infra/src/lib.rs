//! # ARS REST Infrastructure
//!
//! Everything in the ARS REST client that performs I/O.
//!
//! This crate contains:
//! - The request dispatcher (reqwest-backed HTTP exchange with a deadline)
//! - Conversions from transport failures into `ErrorModel`
//! - The record client and its attachment fan-out
//! - Configuration loading from environment or JSON/TOML files
//!
//! ## Architecture
//! - Depends on `arsrest-domain` for all data and error types
//! - Never installs a tracing subscriber; callers own log output

pub mod api;
pub mod config;
pub mod errors;
pub mod http;

// Re-export commonly used items
pub use api::{ArsRestClient, AttachmentFanout, AttachmentSource, Session};
pub use http::{HttpClient, RawResponse, RequestDispatcher, RequestSpec};
