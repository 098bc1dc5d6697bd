//! Conversions from transport failures and rejected responses into `ErrorModel`.

use std::collections::BTreeMap;

use arsrest_domain::{ErrorModel, FailureEvent};
use reqwest::header::HeaderMap;
use reqwest::Error as HttpError;

/* -------------------------------------------------------------------------- */
/* reqwest::Error → ErrorModel */
/* -------------------------------------------------------------------------- */

/// Map a failure raised while sending the request or waiting for the
/// response head.
pub fn from_send_error(err: &HttpError) -> ErrorModel {
    if err.is_timeout() {
        return ErrorModel::transport(FailureEvent::Timeout, "HTTP request timed out")
            .with_diagnostic(err.to_string());
    }

    if err.is_builder() {
        return ErrorModel::caller(format!("invalid request: {err}"));
    }

    #[cfg(not(target_arch = "wasm32"))]
    if err.is_connect() {
        return ErrorModel::transport(FailureEvent::Transport, "HTTP connection failure")
            .with_diagnostic(err.to_string());
    }

    if err.is_body() || err.is_decode() {
        return ErrorModel::transport(FailureEvent::Abort, format!("HTTP exchange aborted: {err}"));
    }

    ErrorModel::transport(FailureEvent::Transport, format!("HTTP request failed: {err}"))
}

/// Map a failure raised while reading an accepted response body.
pub fn from_read_error(status: u16, err: &HttpError) -> ErrorModel {
    if err.is_timeout() {
        return ErrorModel::transport(FailureEvent::Timeout, "HTTP request timed out")
            .with_diagnostic(format!("[body]: timed out reading HTTP {status} response"));
    }

    ErrorModel::transport(FailureEvent::Abort, format!("HTTP {status} response body was cut short"))
        .with_diagnostic(format!("[body]: {err}"))
}

/* -------------------------------------------------------------------------- */
/* Rejected responses */
/* -------------------------------------------------------------------------- */

/// Flatten response headers into a lowercase name → value map.
///
/// Repeated headers are joined with `", "`. Values that are not valid UTF-8
/// are skipped and reported in the returned notes.
pub fn collect_headers(headers: &HeaderMap) -> (BTreeMap<String, String>, Vec<String>) {
    let mut flat: BTreeMap<String, String> = BTreeMap::new();
    let mut notes = Vec::new();

    for (name, value) in headers {
        match value.to_str() {
            Ok(text) => {
                flat.entry(name.as_str().to_string())
                    .and_modify(|existing| {
                        existing.push_str(", ");
                        existing.push_str(text);
                    })
                    .or_insert_with(|| text.to_string());
            }
            Err(err) => notes.push(format!("[httpResponseHeaders]: skipped {name}: {err}")),
        }
    }

    (flat, notes)
}

/// Build the error for a response whose status was not accepted.
///
/// Status, headers and body are extracted independently; a body that could
/// not be read still yields an error with status and headers intact.
pub fn status_error(
    status: u16,
    headers: BTreeMap<String, String>,
    notes: Vec<String>,
    body: Result<String, HttpError>,
) -> ErrorModel {
    let (text, read_note) = match body {
        Ok(text) => (text, None),
        Err(err) => (String::new(), Some(format!("[arsErrorList]: failed to read body: {err}"))),
    };

    notes
        .into_iter()
        .chain(read_note)
        .fold(ErrorModel::from_response(status, headers, &text), |err, note| err.with_diagnostic(note))
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */

#[cfg(test)]
mod tests {
    use std::net::TcpListener;

    use arsrest_domain::MessageType;
    use reqwest::header::HeaderValue;
    use reqwest::Client;

    use super::*;

    #[test]
    fn headers_are_flattened_and_joined() {
        let mut headers = HeaderMap::new();
        headers.append("Set-Cookie", HeaderValue::from_static("a=1"));
        headers.append("set-cookie", HeaderValue::from_static("b=2"));
        headers.insert("Content-Type", HeaderValue::from_static("application/json"));
        headers.insert("X-Binary", HeaderValue::from_bytes(&[0xff, 0xfe]).unwrap());

        let (flat, notes) = collect_headers(&headers);

        assert_eq!(flat.get("set-cookie").map(String::as_str), Some("a=1, b=2"));
        assert_eq!(flat.get("content-type").map(String::as_str), Some("application/json"));
        assert!(!flat.contains_key("x-binary"));
        assert_eq!(notes.len(), 1);
        assert!(notes[0].contains("x-binary"));
    }

    #[test]
    fn status_error_keeps_notes_as_diagnostics() {
        let err = status_error(
            500,
            BTreeMap::new(),
            vec!["[httpResponseHeaders]: skipped x".to_string()],
            Ok(String::new()),
        );

        assert_eq!(err.http_status(), 500);
        assert_eq!(err.event(), FailureEvent::Status);
        assert_eq!(err.message_type(), MessageType::NonArs);
        assert_eq!(err.diagnostics(), ["[httpResponseHeaders]: skipped x".to_string()]);
    }

    #[tokio::test]
    async fn refused_connection_maps_to_transport() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener); // release the port so that requests fail with ECONNREFUSED

        let client = Client::builder().no_proxy().build().unwrap();
        let error = client.get(format!("http://{addr}")).send().await.unwrap_err();

        let mapped = from_send_error(&error);
        assert_eq!(mapped.event(), FailureEvent::Transport);
        assert_eq!(mapped.message_type(), MessageType::NonArs);
        assert_eq!(mapped.http_status(), 0);
    }

    #[tokio::test]
    async fn malformed_url_is_a_caller_error() {
        let client = Client::builder().no_proxy().build().unwrap();
        let error = client.get("http://").send().await.unwrap_err();

        assert!(from_send_error(&error).is_caller_error());
    }
}
