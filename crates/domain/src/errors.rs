//! Error types used throughout the client
//!
//! Every failed call, whether it never left the process, died on the wire or
//! came back with an unexpected status, resolves to exactly one
//! [`ErrorModel`]. The ARS server's error payload shape is not guaranteed, so
//! every accessor here degrades to a fallback instead of failing while
//! reporting the first failure.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::ser::SerializeStruct;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::constants::{NO_ERROR_OBJECT, NO_MESSAGE_AVAILABLE};
use crate::impl_wire_enum_conversions;

/// Result type alias for client operations
pub type Outcome<T> = std::result::Result<T, ErrorModel>;

/// Classification of a single server-reported message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageType {
    Ok,
    Error,
    Warning,
    Fatal,
    BadStatus,
    /// Not produced by the AR server (client-side or transport failure).
    NonArs,
}

impl_wire_enum_conversions!(MessageType {
    Ok => "ok",
    Error => "error",
    Warning => "warning",
    Fatal => "fatal",
    BadStatus => "bad status",
    NonArs => "non-ars",
});

impl Serialize for MessageType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for MessageType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        // Servers send "ERROR", "BAD_STATUS" and friends; anything unrecognised
        // is still a server-side error.
        Ok(raw.replace('_', " ").parse().unwrap_or(Self::Error))
    }
}

fn default_message_type() -> MessageType {
    MessageType::Error
}

/// One entry of the error list an AR server returns with a failed request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArsMessage {
    #[serde(default = "default_message_type")]
    pub message_type: MessageType,
    #[serde(default)]
    pub message_text: String,
    #[serde(default)]
    pub message_appended_text: Option<String>,
    #[serde(default)]
    pub message_number: Option<i64>,
}

impl ArsMessage {
    /// True when the entry carries something the server actually reported.
    pub fn is_server_entry(&self) -> bool {
        !self.message_text.trim().is_empty() || self.message_number.is_some()
    }
}

/// What ended the exchange. Diagnostic only; callers branch on the failure,
/// not on its cause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureEvent {
    /// A response arrived with a status outside the accepted set.
    Status,
    /// The per-call deadline elapsed.
    Timeout,
    /// Connection or request-level transport failure.
    Transport,
    /// The exchange was cut short while the response was being read.
    Abort,
    /// The response was accepted but its body could not be decoded.
    Decode,
    /// Rejected before any network I/O (bad arguments, not authenticated).
    Caller,
}

/// Pick the message an error reports.
///
/// Priority: explicit override, then the first server entry's text, then a
/// fixed fallback. Blank overrides count as unset.
pub fn resolve_message<'a>(override_message: Option<&'a str>, entries: &'a [ArsMessage]) -> &'a str {
    override_message
        .filter(|message| !message.trim().is_empty())
        .or_else(|| entries.first().map(|entry| entry.message_text.as_str()))
        .unwrap_or(NO_MESSAGE_AVAILABLE)
}

/// Pick the message type an error reports: override, first entry, `non-ars`.
pub fn resolve_message_type(
    override_type: Option<MessageType>,
    entries: &[ArsMessage],
) -> MessageType {
    override_type
        .or_else(|| entries.first().map(|entry| entry.message_type))
        .unwrap_or(MessageType::NonArs)
}

/// Internal state; never serialized.
#[derive(Debug, Clone, Default)]
struct ErrorInternals {
    message: Option<String>,
    message_type: Option<MessageType>,
    diagnostics: Vec<String>,
}

/// Normalized failure of any client operation.
#[derive(Debug, Clone)]
pub struct ErrorModel {
    http_status: u16,
    http_response_headers: BTreeMap<String, String>,
    ars_error_list: Vec<ArsMessage>,
    thrown_by_function: Option<String>,
    thrown_by_function_args: Option<Value>,
    event: FailureEvent,
    time: DateTime<Utc>,
    internal: ErrorInternals,
}

impl ErrorModel {
    fn base(event: FailureEvent) -> Self {
        Self {
            http_status: 0,
            http_response_headers: BTreeMap::new(),
            ars_error_list: Vec::new(),
            thrown_by_function: None,
            thrown_by_function_args: None,
            event,
            time: Utc::now(),
            internal: ErrorInternals::default(),
        }
    }

    fn non_ars(event: FailureEvent, message: String) -> Self {
        let mut model = Self::base(event);
        model.internal.message = Some(message);
        model.internal.message_type = Some(MessageType::NonArs);
        model
    }

    /// Caller error: bad arguments or wrong client state, detected before I/O.
    pub fn caller(message: impl Into<String>) -> Self {
        Self::non_ars(FailureEvent::Caller, message.into())
    }

    /// Transport failure (timeout, connection error, aborted read).
    pub fn transport(event: FailureEvent, message: impl Into<String>) -> Self {
        Self::non_ars(event, message.into())
    }

    /// Accepted response whose body did not decode as expected.
    pub fn decode(http_status: u16, message: impl Into<String>) -> Self {
        let mut model = Self::non_ars(FailureEvent::Decode, message.into());
        model.http_status = http_status;
        model
    }

    /// Build from a response whose status was not accepted.
    ///
    /// The body is parsed as the server's error list (a JSON array of
    /// entries, or a single entry). An empty body, an unparseable one, or JSON
    /// whose entries carry neither text nor number yields a `non-ars` error
    /// with a synthesized message instead.
    pub fn from_response(
        http_status: u16,
        http_response_headers: BTreeMap<String, String>,
        body: &str,
    ) -> Self {
        let mut model = Self::base(FailureEvent::Status);
        model.http_status = http_status;
        model.http_response_headers = http_response_headers;

        if body.trim().is_empty() {
            model.internal.message_type = Some(MessageType::NonArs);
            model.internal.message = Some(NO_ERROR_OBJECT.to_string());
            return model;
        }

        match parse_error_list(body) {
            Ok(list) => model.ars_error_list = list,
            Err(err) => {
                model.internal.diagnostics.push(format!("[arsErrorList]: failed to parse {err}"));
                model.internal.message_type = Some(MessageType::NonArs);
                model.internal.message = Some(format!(
                    "HTTP {http_status} response body is not an ARS error list"
                ));
            }
        }

        model
    }

    /// Record a note about a field that could not be extracted.
    pub fn with_diagnostic(mut self, note: impl Into<String>) -> Self {
        self.internal.diagnostics.push(note.into());
        self
    }

    /// Attach the name of the public operation that failed and a copy of its
    /// arguments.
    pub fn with_context<A: Serialize + ?Sized>(mut self, function: &str, args: &A) -> Self {
        self.thrown_by_function = Some(function.to_string());
        match serde_json::to_value(args) {
            Ok(value) => self.thrown_by_function_args = Some(value),
            Err(err) => {
                self.internal.diagnostics.push(format!("[thrownByFunctionArgs]: {err}"));
            }
        }
        self
    }

    /// Attach only the name of the public operation that failed.
    pub fn thrown_by(mut self, function: &str) -> Self {
        self.thrown_by_function = Some(function.to_string());
        self
    }

    /// HTTP status of the failed exchange; 0 when no response arrived.
    pub fn http_status(&self) -> u16 {
        self.http_status
    }

    /// Response headers, lowercase names.
    pub fn http_response_headers(&self) -> &BTreeMap<String, String> {
        &self.http_response_headers
    }

    /// Entries the server reported, in order.
    pub fn ars_error_list(&self) -> &[ArsMessage] {
        &self.ars_error_list
    }

    /// Public operation that failed, once context is attached.
    pub fn thrown_by_function(&self) -> Option<&str> {
        self.thrown_by_function.as_deref()
    }

    /// JSON copy of that operation's arguments, secrets omitted.
    pub fn thrown_by_function_args(&self) -> Option<&Value> {
        self.thrown_by_function_args.as_ref()
    }

    /// What ended the exchange.
    pub fn event(&self) -> FailureEvent {
        self.event
    }

    /// When the failure was recorded.
    pub fn time(&self) -> DateTime<Utc> {
        self.time
    }

    /// Notes collected while extracting status, headers and body.
    pub fn diagnostics(&self) -> &[String] {
        &self.internal.diagnostics
    }

    /// Override message, else the first entry's text, else a fixed fallback.
    pub fn message(&self) -> &str {
        resolve_message(self.internal.message.as_deref(), &self.ars_error_list)
    }

    /// Override type, else the first entry's type, else `non-ars`.
    pub fn message_type(&self) -> MessageType {
        resolve_message_type(self.internal.message_type, &self.ars_error_list)
    }

    /// Text of the first server entry.
    pub fn message_text(&self) -> Option<&str> {
        self.ars_error_list.first().map(|entry| entry.message_text.as_str())
    }

    /// Appended text of the first entry, usually the offending field or form.
    pub fn message_appended_text(&self) -> Option<&str> {
        self.ars_error_list.first().and_then(|entry| entry.message_appended_text.as_deref())
    }

    /// Number of the first server entry.
    pub fn message_number(&self) -> Option<i64> {
        self.ars_error_list.first().and_then(|entry| entry.message_number)
    }

    /// True when the failure was detected before any network I/O.
    pub fn is_caller_error(&self) -> bool {
        self.event == FailureEvent::Caller
    }
}

/// Parse an error body: a JSON array of entries, or one bare entry.
///
/// Every entry must carry a `messageText` or a `messageNumber`; arbitrary
/// JSON such as a gateway's `{"error": "..."}` is rejected.
fn parse_error_list(body: &str) -> Result<Vec<ArsMessage>, String> {
    let list = match serde_json::from_str::<Vec<ArsMessage>>(body) {
        Ok(list) => list,
        Err(list_err) => serde_json::from_str::<ArsMessage>(body)
            .map(|one| vec![one])
            .map_err(|_| list_err.to_string())?,
    };

    match list.iter().position(|entry| !entry.is_server_entry()) {
        Some(index) => Err(format!("entry {index} has neither messageText nor messageNumber")),
        None => Ok(list),
    }
}

impl fmt::Display for ErrorModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let number = self.message_number().map_or_else(|| "-".to_string(), |n| n.to_string());
        write!(
            f,
            "[http/{} {} ({})]: {} / {}",
            self.http_status,
            self.message_type(),
            number,
            self.message(),
            self.message_appended_text().unwrap_or_default()
        )
    }
}

impl std::error::Error for ErrorModel {}

impl Serialize for ErrorModel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ErrorModel", 9)?;
        state.serialize_field("httpStatus", &self.http_status)?;
        state.serialize_field("httpResponseHeaders", &self.http_response_headers)?;
        state.serialize_field("arsErrorList", &self.ars_error_list)?;
        state.serialize_field("message", self.message())?;
        state.serialize_field("messageType", &self.message_type())?;
        state.serialize_field("event", &self.event)?;
        state.serialize_field("time", &self.time)?;
        state.serialize_field("thrownByFunction", &self.thrown_by_function)?;
        state.serialize_field("thrownByFunctionArgs", &self.thrown_by_function_args)?;
        state.end()
    }
}
