//! Attachment fan-out
//!
//! Reads return attachment fields as metadata only (`name`, `sizeBytes`).
//! When the caller asks for attachments, one download is issued per such
//! field, all concurrently, and the payloads are written back into the
//! record before it is returned.
//!
//! Known limitation: if several downloads fail, only the first failure to
//! complete is reported; the others are dropped.

use arsrest_domain::{AttachmentRequest, Entry, Outcome, QueryResponse};
use async_trait::async_trait;
use futures::future::try_join_all;
use tracing::{debug, warn};

/// Downloads a single attachment payload.
#[async_trait]
pub trait AttachmentSource: Send + Sync {
    async fn fetch_attachment(&self, request: AttachmentRequest) -> Outcome<Vec<u8>>;
}

/// One pending download: which row and field it belongs to.
struct FetchJob {
    row: usize,
    request: AttachmentRequest,
}

/// Enriches decoded records with their attachment payloads.
pub struct AttachmentFanout<'a, S: AttachmentSource + ?Sized> {
    source: &'a S,
}

impl<'a, S: AttachmentSource + ?Sized> AttachmentFanout<'a, S> {
    pub fn new(source: &'a S) -> Self {
        Self { source }
    }

    /// Enrich a single record read by id.
    ///
    /// With `fetch == false`, or when the record has no pending attachment
    /// fields, the record is returned untouched without any I/O.
    pub async fn enrich_entry(
        &self,
        schema: &str,
        entry_id: &str,
        entry: Entry,
        fetch: bool,
    ) -> Outcome<Entry> {
        if !fetch {
            return Ok(entry);
        }

        let jobs: Vec<FetchJob> = jobs_for(0, schema, entry_id, &entry).collect();
        let mut entries = [entry];
        self.run(jobs, &mut entries).await?;
        let [entry] = entries;
        Ok(entry)
    }

    /// Enrich every row of a query result.
    ///
    /// A row's entry id comes from its `_links.self` href; rows where that
    /// cannot be parsed are skipped with a warning.
    pub async fn enrich_query(
        &self,
        schema: &str,
        mut response: QueryResponse,
        fetch: bool,
    ) -> Outcome<QueryResponse> {
        if !fetch {
            return Ok(response);
        }

        let mut jobs = Vec::new();
        for (row, entry) in response.entries.iter().enumerate() {
            if entry.pending_attachments().is_empty() {
                continue;
            }
            match entry.self_entry_id() {
                Some(entry_id) => jobs.extend(jobs_for(row, schema, &entry_id, entry)),
                None => warn!(schema, row, "cannot parse entry id from _links.self; skipping attachments"),
            }
        }

        self.run(jobs, &mut response.entries).await?;
        Ok(response)
    }

    async fn run(&self, jobs: Vec<FetchJob>, entries: &mut [Entry]) -> Outcome<()> {
        if jobs.is_empty() {
            return Ok(());
        }

        debug!(count = jobs.len(), "fetching attachments");
        let payloads =
            try_join_all(jobs.iter().map(|job| self.source.fetch_attachment(job.request.clone())))
                .await?;

        for (job, data) in jobs.into_iter().zip(payloads) {
            if let Some(entry) = entries.get_mut(job.row) {
                entry.set_attachment_data(&job.request.field_name, data);
            }
        }

        Ok(())
    }
}

fn jobs_for<'e>(
    row: usize,
    schema: &'e str,
    entry_id: &'e str,
    entry: &Entry,
) -> impl Iterator<Item = FetchJob> + 'e {
    entry.pending_attachments().into_iter().map(move |field| FetchJob {
        row,
        request: AttachmentRequest::new(schema, entry_id, field),
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use arsrest_domain::{ErrorModel, FailureEvent, FieldValue};
    use serde_json::json;

    use super::*;

    /// Serves payloads keyed by `entry_id/field` and records every call.
    #[derive(Default)]
    struct StubSource {
        payloads: HashMap<String, Vec<u8>>,
        failing: Option<String>,
        calls: Mutex<Vec<String>>,
    }

    impl StubSource {
        fn with(mut self, key: &str, data: &[u8]) -> Self {
            self.payloads.insert(key.to_string(), data.to_vec());
            self
        }

        fn failing_on(mut self, key: &str) -> Self {
            self.failing = Some(key.to_string());
            self
        }

        fn calls(&self) -> Vec<String> {
            let mut calls = self.calls.lock().unwrap().clone();
            calls.sort();
            calls
        }
    }

    #[async_trait]
    impl AttachmentSource for StubSource {
        async fn fetch_attachment(&self, request: AttachmentRequest) -> Outcome<Vec<u8>> {
            let key = format!("{}/{}", request.entry_id, request.field_name);
            self.calls.lock().unwrap().push(key.clone());

            if self.failing.as_deref() == Some(key.as_str()) {
                return Err(ErrorModel::transport(FailureEvent::Transport, format!("failed {key}")));
            }
            Ok(self.payloads.get(&key).cloned().unwrap_or_default())
        }
    }

    fn entry_with_attachments() -> Entry {
        serde_json::from_value(json!({
            "values": {
                "Entry ID": "000000000000001",
                "Attachment 1": { "name": "a.txt", "sizeBytes": 3 },
                "Attachment 2": { "name": "b.txt", "sizeBytes": 2 },
                "Status": "New"
            }
        }))
        .unwrap()
    }

    fn query_row(id: Option<&str>, with_attachment: bool) -> serde_json::Value {
        let mut values = json!({ "Entry ID": id.unwrap_or("?") });
        if with_attachment {
            values["File"] = json!({ "name": "f.bin", "sizeBytes": 1 });
        }
        match id {
            Some(id) => json!({
                "values": values,
                "_links": { "self": [{ "href": format!("https://ars/api/arsys/v1/entry/Demo/{id}") }] }
            }),
            None => json!({ "values": values, "_links": { "self": [{ "href": "" }] } }),
        }
    }

    fn data_of(entry: &Entry, field: &str) -> Option<Vec<u8>> {
        entry.get(field).and_then(FieldValue::as_attachment).and_then(|a| a.data.clone())
    }

    #[tokio::test]
    async fn disabled_fetch_returns_input_untouched() {
        let source = StubSource::default();
        let entry = entry_with_attachments();

        let result =
            AttachmentFanout::new(&source).enrich_entry("Demo", "1", entry.clone(), false).await.unwrap();

        assert_eq!(result, entry);
        assert!(source.calls().is_empty());
    }

    #[tokio::test]
    async fn entry_without_attachments_issues_no_fetches() {
        let source = StubSource::default();
        let entry: Entry =
            serde_json::from_value(json!({ "values": { "Status": "New" } })).unwrap();

        let result =
            AttachmentFanout::new(&source).enrich_entry("Demo", "1", entry.clone(), true).await.unwrap();

        assert_eq!(result, entry);
        assert!(source.calls().is_empty());
    }

    #[tokio::test]
    async fn entry_fetches_each_attachment_once() {
        let source = StubSource::default()
            .with("000000000000001/Attachment 1", b"abc")
            .with("000000000000001/Attachment 2", b"de");

        let result = AttachmentFanout::new(&source)
            .enrich_entry("Demo", "000000000000001", entry_with_attachments(), true)
            .await
            .unwrap();

        assert_eq!(
            source.calls(),
            vec!["000000000000001/Attachment 1", "000000000000001/Attachment 2"]
        );
        assert_eq!(data_of(&result, "Attachment 1"), Some(b"abc".to_vec()));
        assert_eq!(data_of(&result, "Attachment 2"), Some(b"de".to_vec()));
        assert_eq!(result.get("Status").and_then(FieldValue::as_str), Some("New"));
    }

    #[tokio::test]
    async fn any_failed_fetch_fails_the_whole_call() {
        let source = StubSource::default()
            .with("000000000000001/Attachment 1", b"abc")
            .failing_on("000000000000001/Attachment 2");

        let err = AttachmentFanout::new(&source)
            .enrich_entry("Demo", "000000000000001", entry_with_attachments(), true)
            .await
            .unwrap_err();

        assert_eq!(err.message(), "failed 000000000000001/Attachment 2");
    }

    #[tokio::test]
    async fn query_rows_use_self_link_ids_and_skip_unparsable_rows() {
        let response: QueryResponse = serde_json::from_value(json!({
            "entries": [
                query_row(Some("000000000000007"), true),
                query_row(None, true),
                query_row(Some("000000000000008"), false)
            ]
        }))
        .unwrap();
        let source = StubSource::default().with("000000000000007/File", b"z");

        let result =
            AttachmentFanout::new(&source).enrich_query("Demo", response, true).await.unwrap();

        assert_eq!(source.calls(), vec!["000000000000007/File"]);
        assert_eq!(data_of(&result.entries[0], "File"), Some(b"z".to_vec()));
        assert_eq!(data_of(&result.entries[1], "File"), None);
        assert_eq!(result.entries.len(), 3);
    }

    #[tokio::test]
    async fn empty_query_resolves_without_io() {
        let source = StubSource::default();
        let result = AttachmentFanout::new(&source)
            .enrich_query("Demo", QueryResponse::default(), true)
            .await
            .unwrap();

        assert!(result.entries.is_empty());
        assert!(source.calls().is_empty());
    }
}
