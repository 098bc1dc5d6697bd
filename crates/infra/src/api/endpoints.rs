//! REST endpoint URLs
//!
//! Every user-supplied component (schema, entry id, field names, QBE, sort)
//! is percent-encoded.

use arsrest_domain::constants::{ENTRY_PATH, LOGIN_PATH, LOGOUT_PATH, MERGE_ENTRY_PATH};
use arsrest_domain::QueryRequest;
use urlencoding::encode;

pub fn login(base: &str) -> String {
    format!("{base}{LOGIN_PATH}")
}

pub fn logout(base: &str) -> String {
    format!("{base}{LOGOUT_PATH}")
}

/// `.../entry/{schema}`
pub fn entry(base: &str, schema: &str) -> String {
    format!("{base}{ENTRY_PATH}/{}", encode(schema))
}

/// `.../entry/{schema}/{id}`
pub fn record(base: &str, schema: &str, entry_id: &str) -> String {
    format!("{}/{}", entry(base, schema), encode(entry_id))
}

/// `.../entry/{schema}/{id}?fields=values(...)`
pub fn record_fields(base: &str, schema: &str, entry_id: &str, fields: &[String]) -> String {
    format!("{}?fields={}", record(base, schema, entry_id), field_list(fields))
}

/// `.../entry/{schema}/{id}/attach/{field}`
pub fn attachment(base: &str, schema: &str, entry_id: &str, field: &str) -> String {
    format!("{}/attach/{}", record(base, schema, entry_id), encode(field))
}

/// `.../entry/{schema}/?q=...&fields=values(...)[&offset=][&limit=][&sort=]`
pub fn query(base: &str, request: &QueryRequest) -> String {
    let mut url = format!(
        "{}/?q={}&fields={}",
        entry(base, &request.schema),
        encode(&request.qbe),
        field_list(&request.fields)
    );

    if let Some(offset) = request.offset {
        url.push_str(&format!("&offset={offset}"));
    }
    if let Some(limit) = request.limit {
        url.push_str(&format!("&limit={limit}"));
    }
    if let Some(sort) = request.sort.as_deref().filter(|sort| !sort.trim().is_empty()) {
        url.push_str(&format!("&sort={}", encode(sort)));
    }

    url
}

/// `.../mergeEntry/{schema}`
pub fn merge(base: &str, schema: &str) -> String {
    format!("{base}{MERGE_ENTRY_PATH}/{}", encode(schema))
}

/// `values(f1,f2,...)` with each field name encoded.
fn field_list(fields: &[String]) -> String {
    let encoded: Vec<_> = fields.iter().map(|field| encode(field)).collect();
    format!("values({})", encoded.join(","))
}
