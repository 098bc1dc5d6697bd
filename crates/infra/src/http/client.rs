//! reqwest-backed request dispatcher
//!
//! One exchange per call, bounded end to end by the request timeout. Status
//! codes outside the request's accepted set become `ErrorModel`s built from
//! the response; transport failures map through `errors::conversions`.

use std::time::Duration;

use arsrest_domain::constants::DEFAULT_TIMEOUT_MS;
use arsrest_domain::{ErrorModel, FailureEvent, Outcome};
use async_trait::async_trait;
use reqwest::Client as ReqwestClient;
use tracing::debug;

use super::request::{RequestBody, RequestParts, RequestSpec, ResponseBody, ResponseShape};
use super::{RawResponse, RequestDispatcher};
use crate::errors::conversions;

/// reqwest-backed dispatcher. One exchange per call, no retries.
#[derive(Clone)]
pub struct HttpClient {
    client: ReqwestClient,
    timeout: Duration,
    debug: bool,
}

impl HttpClient {
    /// Start building a new HTTP client.
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::default()
    }

    /// Convenience constructor with default configuration.
    pub fn new() -> Outcome<Self> {
        Self::builder().build()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn exchange(&self, spec: RequestSpec, timeout: Duration) -> Outcome<RawResponse> {
        let shape = spec.shape();
        let RequestParts { method, url, headers, body, accepted } = spec.into_parts();

        let mut request = self.client.request(method, &url).timeout(timeout);
        for (name, value) in &headers {
            request = request.header(name.as_str(), value.as_str());
        }
        request = match body {
            Some(RequestBody::Json(value)) => request.json(&value),
            Some(RequestBody::Raw(text)) => request.body(text),
            None => request,
        };

        let response = request.send().await.map_err(|err| conversions::from_send_error(&err))?;
        let status = response.status().as_u16();
        let (headers, notes) = conversions::collect_headers(response.headers());

        if !accepted.contains(&status) {
            let body = response.text().await;
            return Err(conversions::status_error(status, headers, notes, body));
        }

        let body = match shape {
            ResponseShape::Text => ResponseBody::Text(
                response.text().await.map_err(|err| conversions::from_read_error(status, &err))?,
            ),
            ResponseShape::Binary => ResponseBody::Binary(
                response
                    .bytes()
                    .await
                    .map_err(|err| conversions::from_read_error(status, &err))?
                    .to_vec(),
            ),
        };

        Ok(RawResponse { status, headers, body })
    }
}

#[async_trait]
impl RequestDispatcher for HttpClient {
    async fn execute(&self, spec: RequestSpec) -> Outcome<RawResponse> {
        let timeout = spec.timeout_override().unwrap_or(self.timeout);
        let method = spec.method().clone();
        let url = spec.url().to_string();

        if self.debug {
            debug!(%method, %url, timeout_ms = %timeout.as_millis(), "sending HTTP request");
        }

        let result = match tokio::time::timeout(timeout, self.exchange(spec, timeout)).await {
            Ok(result) => result,
            Err(_) => Err(ErrorModel::transport(FailureEvent::Timeout, "HTTP request timed out")
                .with_diagnostic(format!("deadline of {} ms elapsed", timeout.as_millis()))),
        };

        if self.debug {
            match &result {
                Ok(response) => debug!(%method, %url, status = response.status, "received HTTP response"),
                Err(err) => debug!(%method, %url, error = %err, "HTTP request failed"),
            }
        }

        result
    }
}

/// Builder for [`HttpClient`].
#[derive(Debug)]
pub struct HttpClientBuilder {
    timeout: Duration,
    debug: bool,
    user_agent: Option<String>,
    accept_invalid_certs: bool,
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            debug: false,
            user_agent: None,
            accept_invalid_certs: false,
        }
    }
}

impl HttpClientBuilder {
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Emit `debug!` events for each request.
    pub fn debug(mut self, enabled: bool) -> Self {
        self.debug = enabled;
        self
    }

    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Skip TLS certificate validation for this client only (self-signed
    /// ARS servers). Off by default.
    pub fn accept_invalid_certs(mut self, enabled: bool) -> Self {
        self.accept_invalid_certs = enabled;
        self
    }

    pub fn build(self) -> Outcome<HttpClient> {
        let mut builder = ReqwestClient::builder().timeout(self.timeout).no_proxy();

        if let Some(agent) = self.user_agent {
            builder = builder.user_agent(agent);
        }

        if self.accept_invalid_certs {
            builder = builder.danger_accept_invalid_certs(true);
        }

        let client = builder
            .build()
            .map_err(|err| ErrorModel::caller(format!("failed to build HTTP client: {err}")))?;

        Ok(HttpClient { client, timeout: self.timeout, debug: self.debug })
    }
}
