//! Per-operation argument types
//!
//! Each public client operation takes one of these. They deserialize with
//! `deny_unknown_fields` so JSON-driven callers get a hard error on typos, and
//! `validate()` runs once before any request is built.

use serde::{Deserialize, Serialize};

use super::merge::{MergeIntent, MergeOptionsArgs};
use super::record::Values;
use crate::errors::{ErrorModel, Outcome};

fn require_text(name: &str, value: &str) -> Outcome<()> {
    if value.trim().is_empty() {
        return Err(missing(name));
    }
    Ok(())
}

fn require_fields(fields: &[String]) -> Outcome<()> {
    if fields.is_empty() || fields.iter().any(|field| field.trim().is_empty()) {
        return Err(missing("fields"));
    }
    Ok(())
}

fn require_values(values: &Values) -> Outcome<()> {
    if values.is_empty() {
        return Err(missing("values"));
    }
    Ok(())
}

fn missing(name: &str) -> ErrorModel {
    ErrorModel::caller(format!("required argument missing: {name}"))
}

/// Arguments for a qualified search over one form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct QueryRequest {
    pub schema: String,
    pub fields: Vec<String>,
    /// Qualification expression, e.g. `'Status' = "New"`.
    #[serde(rename = "QBE")]
    pub qbe: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    /// `<field>.asc` or `<field>.desc`, comma separated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort: Option<String>,
    #[serde(default)]
    pub fetch_attachments: bool,
}

impl QueryRequest {
    pub fn new<I, S>(schema: impl Into<String>, fields: I, qbe: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            schema: schema.into(),
            fields: fields.into_iter().map(Into::into).collect(),
            qbe: qbe.into(),
            offset: None,
            limit: None,
            sort: None,
            fetch_attachments: false,
        }
    }

    pub fn offset(mut self, offset: u32) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn sort(mut self, sort: impl Into<String>) -> Self {
        self.sort = Some(sort.into());
        self
    }

    pub fn fetch_attachments(mut self, fetch: bool) -> Self {
        self.fetch_attachments = fetch;
        self
    }

    pub fn validate(&self) -> Outcome<()> {
        require_text("schema", &self.schema)?;
        require_fields(&self.fields)?;
        require_text("QBE", &self.qbe)
    }
}

/// Arguments for reading a single record by id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct GetRecordRequest {
    pub schema: String,
    pub entry_id: String,
    pub fields: Vec<String>,
    #[serde(default)]
    pub fetch_attachments: bool,
}

impl GetRecordRequest {
    pub fn new<I, S>(schema: impl Into<String>, entry_id: impl Into<String>, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            schema: schema.into(),
            entry_id: entry_id.into(),
            fields: fields.into_iter().map(Into::into).collect(),
            fetch_attachments: false,
        }
    }

    pub fn fetch_attachments(mut self, fetch: bool) -> Self {
        self.fetch_attachments = fetch;
        self
    }

    pub fn validate(&self) -> Outcome<()> {
        require_text("schema", &self.schema)?;
        require_fields(&self.fields)?;
        require_text("entryId", &self.entry_id)
    }
}

/// Arguments for downloading one attachment field's payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AttachmentRequest {
    pub schema: String,
    pub entry_id: String,
    pub field_name: String,
}

impl AttachmentRequest {
    pub fn new(
        schema: impl Into<String>,
        entry_id: impl Into<String>,
        field_name: impl Into<String>,
    ) -> Self {
        Self { schema: schema.into(), entry_id: entry_id.into(), field_name: field_name.into() }
    }

    pub fn validate(&self) -> Outcome<()> {
        require_text("schema", &self.schema)?;
        require_text("entryId", &self.entry_id)?;
        require_text("fieldName", &self.field_name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateRecordRequest {
    pub schema: String,
    pub values: Values,
}

impl CreateRecordRequest {
    pub fn new(schema: impl Into<String>, values: Values) -> Self {
        Self { schema: schema.into(), values }
    }

    pub fn validate(&self) -> Outcome<()> {
        require_text("schema", &self.schema)?;
        require_values(&self.values)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ModifyRecordRequest {
    pub schema: String,
    pub entry_id: String,
    pub values: Values,
}

impl ModifyRecordRequest {
    pub fn new(schema: impl Into<String>, entry_id: impl Into<String>, values: Values) -> Self {
        Self { schema: schema.into(), entry_id: entry_id.into(), values }
    }

    pub fn validate(&self) -> Outcome<()> {
        require_text("schema", &self.schema)?;
        require_values(&self.values)?;
        require_text("entryId", &self.entry_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DeleteRecordRequest {
    pub schema: String,
    pub entry_id: String,
}

impl DeleteRecordRequest {
    pub fn new(schema: impl Into<String>, entry_id: impl Into<String>) -> Self {
        Self { schema: schema.into(), entry_id: entry_id.into() }
    }

    pub fn validate(&self) -> Outcome<()> {
        require_text("schema", &self.schema)?;
        require_text("entryId", &self.entry_id)
    }
}

/// Arguments for a mergeEntry call.
///
/// `qbe` selects the duplicate-match candidate in addition to (or instead
/// of) the Request ID carried in `values`. Building that string is up to the
/// caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct MergeRecordRequest {
    pub schema: String,
    pub values: Values,
    #[serde(rename = "QBE", default, skip_serializing_if = "Option::is_none")]
    pub qbe: Option<String>,
    #[serde(flatten)]
    pub options: MergeOptionsArgs,
}

impl MergeRecordRequest {
    pub fn new(schema: impl Into<String>, values: Values) -> Self {
        Self { schema: schema.into(), values, qbe: None, options: MergeOptionsArgs::default() }
    }

    pub fn qualification(mut self, qbe: impl Into<String>) -> Self {
        self.qbe = Some(qbe.into());
        self
    }

    pub fn intent(mut self, intent: MergeIntent) -> Self {
        self.options = intent.into();
        self
    }

    pub fn options(mut self, options: MergeOptionsArgs) -> Self {
        self.options = options;
        self
    }

    /// Checks required arguments only; option values are checked by
    /// [`MergeResolver::resolve`](super::merge::MergeResolver::resolve).
    pub fn validate(&self) -> Outcome<()> {
        require_text("schema", &self.schema)?;
        require_values(&self.values)
    }
}
