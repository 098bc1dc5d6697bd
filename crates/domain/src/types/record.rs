//! Decoded record shapes
//!
//! Field values are kept as raw JSON except for attachment fields, which are
//! recognised structurally: an object carrying `name` and `sizeBytes`.

use std::borrow::Cow;
use std::collections::BTreeMap;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

/// Field name → value map as sent to the server on create/modify/merge.
pub type Values = Map<String, Value>;

/// Field name → decoded value map as returned by the server.
pub type FieldMap = BTreeMap<String, FieldValue>;

/// Metadata of an attachment field, plus its payload once fetched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachmentValue {
    pub name: String,
    pub size_bytes: u64,
    #[serde(
        skip_deserializing,
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_base64"
    )]
    pub data: Option<Vec<u8>>,
    /// Any other keys the server sent alongside the metadata.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl AttachmentValue {
    /// True while the field carries metadata only and no inline data.
    pub fn needs_fetch(&self) -> bool {
        self.data.is_none() && !self.extra.contains_key("data")
    }
}

fn serialize_base64<S: Serializer>(data: &Option<Vec<u8>>, serializer: S) -> Result<S::Ok, S::Error> {
    match data {
        Some(bytes) => serializer.serialize_str(&STANDARD.encode(bytes)),
        None => serializer.serialize_none(),
    }
}

/// A single decoded field value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Attachment(AttachmentValue),
    Value(Value),
}

impl FieldValue {
    pub fn as_attachment(&self) -> Option<&AttachmentValue> {
        match self {
            Self::Attachment(attachment) => Some(attachment),
            Self::Value(_) => None,
        }
    }

    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Self::Value(value) => Some(value),
            Self::Attachment(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        self.as_value().and_then(Value::as_str)
    }
}

impl From<Value> for FieldValue {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

/// One record: `{ "values": {...}, "_links": {...} }`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    #[serde(default)]
    pub values: FieldMap,
    #[serde(rename = "_links", default, skip_serializing_if = "Option::is_none")]
    pub links: Option<Value>,
}

impl Entry {
    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.values.get(field)
    }

    /// Entry id taken from the final path segment of `_links.self[0].href`.
    pub fn self_entry_id(&self) -> Option<String> {
        let href = self.links.as_ref()?.get("self")?.get(0)?.get("href")?.as_str()?;
        last_path_segment(href)
    }

    /// Names of attachment fields that still need their payload fetched.
    pub fn pending_attachments(&self) -> Vec<String> {
        self.values
            .iter()
            .filter(|(_, value)| value.as_attachment().is_some_and(AttachmentValue::needs_fetch))
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// Store a fetched payload on an attachment field. Returns false if the
    /// field is missing or not an attachment.
    pub fn set_attachment_data(&mut self, field: &str, data: Vec<u8>) -> bool {
        match self.values.get_mut(field) {
            Some(FieldValue::Attachment(attachment)) => {
                attachment.data = Some(data);
                true
            }
            _ => false,
        }
    }
}

/// Result of a query: `{ "entries": [...], "_links": {...} }`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryResponse {
    #[serde(default)]
    pub entries: Vec<Entry>,
    #[serde(rename = "_links", default, skip_serializing_if = "Option::is_none")]
    pub links: Option<Value>,
}

/// Location of a record created or merged on the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordId {
    pub url: String,
    pub entry_id: String,
}

impl RecordId {
    /// Parse the entry id out of a `Location` header value.
    pub fn from_location(location: &str) -> Option<Self> {
        let entry_id = last_path_segment(location)?;
        Some(Self { url: location.to_string(), entry_id })
    }
}

/// Final path segment, percent-decoded so it can be re-encoded as a path
/// component without doubling escapes.
fn last_path_segment(href: &str) -> Option<String> {
    let segment = href.rsplit('/').next().map(str::trim).filter(|segment| !segment.is_empty())?;
    Some(urlencoding::decode(segment).map_or_else(|_| segment.to_string(), Cow::into_owned))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn attachment_fields_are_detected_structurally() {
        let entry: Entry = serde_json::from_value(json!({
            "values": {
                "Entry ID": "000000000000001",
                "Picture": { "name": "cat.jpg", "sizeBytes": 2048 },
                "Notes": { "name": "not an attachment" },
                "Inline": { "name": "a.txt", "sizeBytes": 3, "data": "YWJj" }
            }
        }))
        .unwrap();

        assert!(entry.get("Picture").and_then(FieldValue::as_attachment).is_some());
        assert!(entry.get("Notes").and_then(FieldValue::as_attachment).is_none());
        assert_eq!(entry.get("Entry ID").and_then(FieldValue::as_str), Some("000000000000001"));
        assert_eq!(entry.pending_attachments(), vec!["Picture".to_string()]);
    }

    #[test]
    fn self_link_yields_entry_id() {
        let entry: Entry = serde_json::from_value(json!({
            "values": {},
            "_links": { "self": [{ "href": "https://ars/api/arsys/v1/entry/Demo/000000000000042" }] }
        }))
        .unwrap();
        assert_eq!(entry.self_entry_id().as_deref(), Some("000000000000042"));

        let broken: Entry = serde_json::from_value(json!({
            "values": {},
            "_links": { "self": [{ "href": "https://ars/api/arsys/v1/entry/Demo/" }] }
        }))
        .unwrap();
        assert_eq!(broken.self_entry_id(), None);
        assert_eq!(Entry::default().self_entry_id(), None);
    }

    #[test]
    fn fetched_data_serializes_as_base64() {
        let mut entry: Entry = serde_json::from_value(json!({
            "values": { "File": { "name": "a.txt", "sizeBytes": 3, "href": "x" } }
        }))
        .unwrap();

        assert!(entry.set_attachment_data("File", b"abc".to_vec()));
        assert!(!entry.set_attachment_data("Missing", vec![]));

        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(
            value,
            json!({ "values": { "File": { "name": "a.txt", "sizeBytes": 3, "data": "YWJj", "href": "x" } } })
        );
        assert!(entry.pending_attachments().is_empty());
    }

    #[test]
    fn record_id_from_location() {
        let id = RecordId::from_location("https://ars/api/arsys/v1/entry/Demo/000000000000007").unwrap();
        assert_eq!(id.entry_id, "000000000000007");
        assert!(RecordId::from_location("https://ars/api/arsys/v1/entry/Demo/").is_none());
    }

    #[test]
    fn encoded_ids_are_decoded_once() {
        let entry: Entry = serde_json::from_value(json!({
            "values": {},
            "_links": { "self": [{ "href": "https://ars/api/arsys/v1/entry/Demo/000000000000001%7C000000000000002" }] }
        }))
        .unwrap();
        assert_eq!(entry.self_entry_id().as_deref(), Some("000000000000001|000000000000002"));

        let location = "https://ars/api/arsys/v1/entry/Demo/000000000000001%7C000000000000002";
        let id = RecordId::from_location(location).unwrap();
        assert_eq!(id.entry_id, "000000000000001|000000000000002");
        assert_eq!(id.url, location);
    }

    #[test]
    fn query_response_preserves_plain_values() {
        let raw = json!({ "entries": [{ "values": { "Entry ID": "1", "Item Name": "Foo" } }] });
        let parsed: QueryResponse = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(serde_json::to_value(&parsed).unwrap(), raw);
    }
}
