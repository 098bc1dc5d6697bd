//! Error conversions for infrastructure failures

pub mod conversions;

pub use conversions::{collect_headers, from_read_error, from_send_error, status_error};
