//! Request and response values exchanged with a [`RequestDispatcher`](super::RequestDispatcher).

use std::collections::BTreeMap;
use std::time::Duration;

use reqwest::Method;
use serde_json::Value;

/// Body of an outgoing request.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    /// Serialized as JSON.
    Json(Value),
    /// Sent verbatim (form-encoded login).
    Raw(String),
}

/// How the body of an accepted response is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResponseShape {
    #[default]
    Text,
    Binary,
}

/// One HTTP exchange. Built once, consumed by `execute`.
#[derive(Debug, Clone)]
pub struct RequestSpec {
    method: Method,
    url: String,
    headers: Vec<(String, String)>,
    body: Option<RequestBody>,
    accepted: Vec<u16>,
    shape: ResponseShape,
    timeout: Option<Duration>,
}

impl RequestSpec {
    /// New request that accepts `200 OK` and reads a text body.
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Vec::new(),
            body: None,
            accepted: vec![200],
            shape: ResponseShape::Text,
            timeout: None,
        }
    }

    /// `GET` expecting 200.
    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::GET, url)
    }

    /// `POST` expecting 200.
    pub fn post(url: impl Into<String>) -> Self {
        Self::new(Method::POST, url)
    }

    /// `PUT` expecting 200.
    pub fn put(url: impl Into<String>) -> Self {
        Self::new(Method::PUT, url)
    }

    /// `DELETE` expecting 200.
    pub fn delete(url: impl Into<String>) -> Self {
        Self::new(Method::DELETE, url)
    }

    /// Append a request header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Send `body` serialized as JSON.
    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(RequestBody::Json(body));
        self
    }

    /// Send `body` verbatim (form-encoded login).
    pub fn raw(mut self, body: impl Into<String>) -> Self {
        self.body = Some(RequestBody::Raw(body.into()));
        self
    }

    /// Accept exactly one status code.
    pub fn expect(mut self, status: u16) -> Self {
        self.accepted = vec![status];
        self
    }

    /// Accept any of the given status codes.
    pub fn expect_any(mut self, statuses: &[u16]) -> Self {
        self.accepted = statuses.to_vec();
        self
    }

    /// Read the response body as bytes instead of text.
    pub fn binary(mut self) -> Self {
        self.shape = ResponseShape::Binary;
        self
    }

    /// Override the dispatcher timeout for this request only.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    pub fn body(&self) -> Option<&RequestBody> {
        self.body.as_ref()
    }

    /// True if `status` counts as success for this request.
    pub fn accepts(&self, status: u16) -> bool {
        self.accepted.contains(&status)
    }

    pub fn shape(&self) -> ResponseShape {
        self.shape
    }

    /// Per-request timeout, if one was set.
    pub fn timeout_override(&self) -> Option<Duration> {
        self.timeout
    }

    pub(crate) fn into_parts(self) -> RequestParts {
        RequestParts {
            method: self.method,
            url: self.url,
            headers: self.headers,
            body: self.body,
            accepted: self.accepted,
        }
    }
}

pub(crate) struct RequestParts {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<RequestBody>,
    pub accepted: Vec<u16>,
}

/// Body of an accepted response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseBody {
    Text(String),
    Binary(Vec<u8>),
}

/// Accepted response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    /// Lowercase header names.
    pub headers: BTreeMap<String, String>,
    pub body: ResponseBody,
}

impl RawResponse {
    /// Text response, mostly for scripted dispatchers in tests.
    pub fn text(status: u16, body: impl Into<String>) -> Self {
        Self { status, headers: BTreeMap::new(), body: ResponseBody::Text(body.into()) }
    }

    /// Binary response, mostly for scripted dispatchers in tests.
    pub fn binary(status: u16, body: Vec<u8>) -> Self {
        Self { status, headers: BTreeMap::new(), body: ResponseBody::Binary(body) }
    }

    /// Add a response header (name stored lowercase).
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
        self
    }

    /// Header value by name, ignoring case.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_ascii_lowercase()).map(String::as_str)
    }

    /// Text body; empty for binary responses.
    pub fn body_text(&self) -> &str {
        match &self.body {
            ResponseBody::Text(text) => text,
            ResponseBody::Binary(_) => "",
        }
    }

    /// Body as bytes, whichever shape was read.
    pub fn into_bytes(self) -> Vec<u8> {
        match self.body {
            ResponseBody::Text(text) => text.into_bytes(),
            ResponseBody::Binary(bytes) => bytes,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn defaults_accept_ok_as_text() {
        let spec = RequestSpec::get("http://ars/api");
        assert!(spec.accepts(200));
        assert!(!spec.accepts(204));
        assert_eq!(spec.shape(), ResponseShape::Text);
        assert_eq!(spec.timeout_override(), None);
    }

    #[test]
    fn builder_collects_settings() {
        let spec = RequestSpec::post("http://ars/api")
            .header("Cache-Control", "no-cache")
            .json(json!({ "values": {} }))
            .expect_any(&[201, 204])
            .binary()
            .timeout(Duration::from_millis(50));

        assert_eq!(spec.method(), &Method::POST);
        assert_eq!(spec.headers().len(), 1);
        assert!(spec.accepts(201) && spec.accepts(204) && !spec.accepts(200));
        assert_eq!(spec.body(), Some(&RequestBody::Json(json!({ "values": {} }))));
        assert_eq!(spec.shape(), ResponseShape::Binary);
        assert_eq!(spec.timeout_override(), Some(Duration::from_millis(50)));
    }

    #[test]
    fn response_header_lookup_is_case_insensitive() {
        let response = RawResponse::text(201, "").with_header("Location", "http://ars/x/1");
        assert_eq!(response.header("location"), Some("http://ars/x/1"));
        assert_eq!(response.header("LOCATION"), Some("http://ars/x/1"));
        assert_eq!(RawResponse::binary(200, vec![1, 2]).into_bytes(), vec![1, 2]);
    }
}
