//! ARS REST record client
//!
//! Public operations over a single AR server session. Every operation
//! validates its arguments before any I/O, requires a token (except
//! `authenticate`/`logout`), and reports failures as an `ErrorModel` carrying
//! the operation name and a copy of its arguments.

use std::sync::Arc;

use arsrest_domain::constants::{CACHE_CONTROL_NO_CACHE, CONTENT_TYPE_FORM, CONTENT_TYPE_JSON};
use arsrest_domain::{
    AttachmentRequest, ClientConfig, CreateRecordRequest, Credentials, DeleteRecordRequest, Entry,
    ErrorModel, GetRecordRequest, MergeRecordRequest, MergeResolver, ModifyRecordRequest, Outcome,
    QueryRequest, QueryResponse, RecordId,
};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;
use tracing::{debug, info, instrument};

use super::endpoints;
use super::fanout::{AttachmentFanout, AttachmentSource};
use super::session::Session;
use crate::http::{HttpClient, RawResponse, RequestDispatcher, RequestSpec};

/// Client for the ARS REST API.
///
/// `authenticate` and `logout` take `&mut self`; every other operation
/// borrows the client shared, so the token never changes mid-call.
pub struct ArsRestClient {
    session: Session,
    dispatcher: Arc<dyn RequestDispatcher>,
}

impl ArsRestClient {
    /// Create an unauthenticated client backed by [`HttpClient`].
    ///
    /// # Errors
    /// Returns a caller error if the HTTP client cannot be built.
    pub fn new(config: ClientConfig) -> Outcome<Self> {
        let http = HttpClient::builder()
            .timeout(config.timeout())
            .debug(config.debug)
            .accept_invalid_certs(config.accept_invalid_certs)
            .build()?;

        Ok(Self::with_dispatcher(&config, Arc::new(http)))
    }

    /// Create an unauthenticated client over any dispatcher.
    pub fn with_dispatcher(config: &ClientConfig, dispatcher: Arc<dyn RequestDispatcher>) -> Self {
        Self { session: Session::new(config), dispatcher }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    /// Log in with the configured credentials and store the returned token.
    ///
    /// Valid in either state; an existing token is replaced.
    #[instrument(skip(self), fields(server = %self.session.server()))]
    pub async fn authenticate(&mut self) -> Outcome<()> {
        let credentials = self.session.credentials().cloned();
        self.login(credentials.as_ref())
            .await
            .map_err(|err| err.with_context("authenticate", &credentials))
    }

    /// Replace the stored credentials, then [`authenticate`](Self::authenticate).
    pub async fn authenticate_with(&mut self, credentials: Credentials) -> Outcome<()> {
        self.session.set_credentials(credentials);
        self.authenticate().await
    }

    async fn login(&mut self, credentials: Option<&Credentials>) -> Outcome<()> {
        if self.session.server().is_empty() {
            return Err(ErrorModel::caller("required argument missing: server"));
        }
        let credentials = credentials
            .filter(|credentials| !credentials.user.trim().is_empty())
            .ok_or_else(|| ErrorModel::caller("required argument missing: user"))?;
        if credentials.password.is_empty() {
            return Err(ErrorModel::caller("required argument missing: password"));
        }

        let form = format!(
            "username={}&password={}",
            urlencoding::encode(&credentials.user),
            urlencoding::encode(&credentials.password)
        );
        let spec = RequestSpec::post(endpoints::login(self.session.base_url()))
            .header("Content-Type", CONTENT_TYPE_FORM)
            .raw(form)
            .expect(200)
            .timeout(self.session.timeout());

        let response = self.dispatcher.execute(spec).await?;
        let token = response.body_text().trim();
        if token.is_empty() {
            return Err(ErrorModel::decode(response.status, "login response did not contain a token"));
        }

        self.session.set_token(token.to_string());
        info!(user = %credentials.user, "authenticated");
        Ok(())
    }

    /// Invalidate the token on the server and forget it.
    ///
    /// A no-op when not authenticated. On failure the token is kept.
    #[instrument(skip(self))]
    pub async fn logout(&mut self) -> Outcome<()> {
        let Ok(authorization) = self.session.authorization() else {
            debug!("logout requested without a token; nothing to do");
            return Ok(());
        };

        let spec = RequestSpec::post(endpoints::logout(self.session.base_url()))
            .header("Authorization", authorization)
            .expect(204)
            .timeout(self.session.timeout());

        self.dispatcher.execute(spec).await.map_err(|err| err.thrown_by("logout"))?;
        self.session.clear_token();
        info!("logged out");
        Ok(())
    }

    /// Run a qualified search, optionally downloading attachment payloads.
    #[instrument(skip(self, request), fields(schema = %request.schema))]
    pub async fn query(&self, request: &QueryRequest) -> Outcome<QueryResponse> {
        self.run_query(request).await.map_err(|err| in_context(err, "query", request))
    }

    async fn run_query(&self, request: &QueryRequest) -> Outcome<QueryResponse> {
        let authorization = self.session.authorization()?;
        request.validate()?;

        let spec = self.authorized(
            RequestSpec::get(endpoints::query(self.session.base_url(), request)),
            authorization,
        );
        let response = self.dispatcher.execute(spec).await?;
        let decoded: QueryResponse = decode_json(&response)?;
        debug!(rows = decoded.entries.len(), "query returned");

        AttachmentFanout::new(self)
            .enrich_query(&request.schema, decoded, request.fetch_attachments)
            .await
    }

    /// Read one record by id, optionally downloading attachment payloads.
    #[instrument(skip(self, request), fields(schema = %request.schema, entry_id = %request.entry_id))]
    pub async fn get_record(&self, request: &GetRecordRequest) -> Outcome<Entry> {
        self.run_get_record(request).await.map_err(|err| in_context(err, "getRecord", request))
    }

    async fn run_get_record(&self, request: &GetRecordRequest) -> Outcome<Entry> {
        let authorization = self.session.authorization()?;
        request.validate()?;

        let url = endpoints::record_fields(
            self.session.base_url(),
            &request.schema,
            &request.entry_id,
            &request.fields,
        );
        let response =
            self.dispatcher.execute(self.authorized(RequestSpec::get(url), authorization)).await?;
        let decoded: Entry = decode_json(&response)?;

        AttachmentFanout::new(self)
            .enrich_entry(&request.schema, &request.entry_id, decoded, request.fetch_attachments)
            .await
    }

    /// Create a record; returns its location and new entry id.
    #[instrument(skip(self, request), fields(schema = %request.schema))]
    pub async fn create_record(&self, request: &CreateRecordRequest) -> Outcome<RecordId> {
        self.run_create_record(request).await.map_err(|err| in_context(err, "createRecord", request))
    }

    async fn run_create_record(&self, request: &CreateRecordRequest) -> Outcome<RecordId> {
        let authorization = self.session.authorization()?;
        request.validate()?;

        let spec = self.authorized(
            RequestSpec::post(endpoints::entry(self.session.base_url(), &request.schema))
                .header("Content-Type", CONTENT_TYPE_JSON)
                .json(json!({ "values": request.values }))
                .expect(201),
            authorization,
        );
        let response = self.dispatcher.execute(spec).await?;

        let id = location(&response)?.ok_or_else(|| {
            ErrorModel::decode(response.status, "response did not include a Location header")
        })?;
        info!(entry_id = %id.entry_id, "record created");
        Ok(id)
    }

    /// Update the supplied fields of an existing record.
    #[instrument(skip(self, request), fields(schema = %request.schema, entry_id = %request.entry_id))]
    pub async fn modify_record(&self, request: &ModifyRecordRequest) -> Outcome<()> {
        self.run_modify_record(request).await.map_err(|err| in_context(err, "modifyRecord", request))
    }

    async fn run_modify_record(&self, request: &ModifyRecordRequest) -> Outcome<()> {
        let authorization = self.session.authorization()?;
        request.validate()?;

        let url = endpoints::record(self.session.base_url(), &request.schema, &request.entry_id);
        let spec = self.authorized(
            RequestSpec::put(url)
                .header("Content-Type", CONTENT_TYPE_JSON)
                .json(json!({ "values": request.values }))
                .expect(204),
            authorization,
        );
        self.dispatcher.execute(spec).await?;
        Ok(())
    }

    /// Delete a record; returns the deleted entry id.
    #[instrument(skip(self, request), fields(schema = %request.schema, entry_id = %request.entry_id))]
    pub async fn delete_record(&self, request: &DeleteRecordRequest) -> Outcome<String> {
        self.run_delete_record(request).await.map_err(|err| in_context(err, "deleteRecord", request))
    }

    async fn run_delete_record(&self, request: &DeleteRecordRequest) -> Outcome<String> {
        let authorization = self.session.authorization()?;
        request.validate()?;

        let url = endpoints::record(self.session.base_url(), &request.schema, &request.entry_id);
        self.dispatcher
            .execute(self.authorized(RequestSpec::delete(url).expect(204), authorization))
            .await?;
        Ok(request.entry_id.clone())
    }

    /// Merge a record using the requested duplicate and multi-match policy.
    ///
    /// Returns the record location when the server reports one.
    #[instrument(skip(self, request), fields(schema = %request.schema))]
    pub async fn merge_record(&self, request: &MergeRecordRequest) -> Outcome<Option<RecordId>> {
        self.run_merge_record(request).await.map_err(|err| in_context(err, "mergeRecord", request))
    }

    async fn run_merge_record(&self, request: &MergeRecordRequest) -> Outcome<Option<RecordId>> {
        let authorization = self.session.authorization()?;
        request.validate()?;
        let body =
            MergeResolver::build_body(request.values.clone(), &request.options, request.qbe.as_deref())?;
        debug!(merge_type = %body.merge_options.merge_type, "merge options resolved");

        let body = serde_json::to_value(&body)
            .map_err(|err| ErrorModel::caller(format!("failed to serialize merge body: {err}")))?;
        let spec = self.authorized(
            RequestSpec::post(endpoints::merge(self.session.base_url(), &request.schema))
                .header("Content-Type", CONTENT_TYPE_JSON)
                .json(body)
                .expect_any(&[201, 204]),
            authorization,
        );
        let response = self.dispatcher.execute(spec).await?;
        location(&response)
    }

    /// Download the raw payload of one attachment field.
    #[instrument(skip(self, request), fields(schema = %request.schema, entry_id = %request.entry_id))]
    pub async fn get_attachment(&self, request: &AttachmentRequest) -> Outcome<Vec<u8>> {
        self.run_get_attachment(request).await.map_err(|err| in_context(err, "getAttachment", request))
    }

    async fn run_get_attachment(&self, request: &AttachmentRequest) -> Outcome<Vec<u8>> {
        let authorization = self.session.authorization()?;
        request.validate()?;

        let url = endpoints::attachment(
            self.session.base_url(),
            &request.schema,
            &request.entry_id,
            &request.field_name,
        );
        let response = self
            .dispatcher
            .execute(self.authorized(RequestSpec::get(url).binary(), authorization))
            .await?;
        Ok(response.into_bytes())
    }

    fn authorized(&self, spec: RequestSpec, authorization: String) -> RequestSpec {
        spec.header("Authorization", authorization)
            .header("Cache-Control", CACHE_CONTROL_NO_CACHE)
            .timeout(self.session.timeout())
    }
}

#[async_trait]
impl AttachmentSource for ArsRestClient {
    async fn fetch_attachment(&self, request: AttachmentRequest) -> Outcome<Vec<u8>> {
        self.get_attachment(&request).await
    }
}

/// Attach call context unless an inner operation already did.
fn in_context<A: Serialize + ?Sized>(err: ErrorModel, function: &str, args: &A) -> ErrorModel {
    if err.thrown_by_function().is_some() {
        return err;
    }
    err.with_context(function, args)
}

fn decode_json<T: DeserializeOwned>(response: &RawResponse) -> Outcome<T> {
    serde_json::from_str(response.body_text()).map_err(|err| {
        ErrorModel::decode(response.status, format!("failed to parse server response: {err}"))
    })
}

/// Record location from the `Location` header, if present.
fn location(response: &RawResponse) -> Outcome<Option<RecordId>> {
    match response.header("location") {
        None => Ok(None),
        Some(value) => RecordId::from_location(value).map(Some).ok_or_else(|| {
            ErrorModel::decode(response.status, format!("cannot parse entry id from Location: {value}"))
        }),
    }
}
