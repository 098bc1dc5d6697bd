//! ARS REST API client
//!
//! # Architecture
//!
//! - `session`: endpoint, credentials and the bearer token
//! - `endpoints`: URL construction with percent-encoding
//! - `fanout`: concurrent attachment downloads for reads
//! - `client`: the public record operations
//!
//! All network I/O goes through a [`RequestDispatcher`](crate::http::RequestDispatcher).

pub mod client;
pub mod endpoints;
pub mod fanout;
pub mod session;

pub use client::ArsRestClient;
pub use fanout::{AttachmentFanout, AttachmentSource};
pub use session::Session;
