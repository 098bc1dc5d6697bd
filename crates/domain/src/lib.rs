//! # ARS REST Domain
//!
//! Record, request and error types for the ARS REST client.
//!
//! This crate contains:
//! - The normalized error value every failed call resolves to (`ErrorModel`)
//! - Decoded record shapes (entries, attachment fields, query results)
//! - Validated per-operation argument types
//! - Merge option resolution (duplicate handling and multi-match policy)
//! - Client configuration structures
//!
//! ## Architecture
//! - No dependencies on other workspace crates
//! - No I/O; everything here is pure data and validation

pub mod config;
pub mod constants;
pub mod errors;
pub mod macros;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
