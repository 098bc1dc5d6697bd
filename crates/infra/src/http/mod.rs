//! HTTP dispatch
//!
//! Every REST call goes through a [`RequestDispatcher`]: one exchange, no
//! retries, bounded by a deadline, resolving to either the accepted response
//! or an `ErrorModel`.

pub mod client;
pub mod request;

use arsrest_domain::Outcome;
use async_trait::async_trait;

pub use client::{HttpClient, HttpClientBuilder};
pub use request::{RawResponse, RequestBody, RequestSpec, ResponseBody, ResponseShape};

/// Executes one HTTP exchange.
///
/// Succeeds only when the response status is in the request's accepted set.
/// Implementations must not retry.
#[async_trait]
pub trait RequestDispatcher: Send + Sync {
    async fn execute(&self, spec: RequestSpec) -> Outcome<RawResponse>;
}
