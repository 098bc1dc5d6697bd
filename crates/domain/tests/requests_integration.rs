//! Integration tests for request arguments and error reporting
//!
//! Covers the path a JSON-driven caller takes: raw arguments deserialize into
//! a request, validate, resolve into a wire body, and any failure serializes
//! into a stable error report.

use std::collections::BTreeMap;

use arsrest_domain::{
    Credentials, ErrorModel, FailureEvent, MergeRecordRequest, MergeResolver, MessageType,
    QueryRequest,
};
use serde_json::json;

// ============================================================================
// Merge arguments
// ============================================================================

/// Scenario: caller merges on Request ID, overwriting the existing record
#[test]
fn test_merge_arguments_to_wire_body() {
    let request: MergeRecordRequest = serde_json::from_value(json!({
        "schema": "HPD:Help Desk",
        "values": { "Request ID": "INC000000000001", "Status": "Resolved" },
        "handleDuplicateEntryId": "overwrite",
        "ignoreRequired": true,
        "workflowEnabled": false
    }))
    .expect("merge arguments should deserialize");
    request.validate().expect("merge arguments should validate");

    let body =
        MergeResolver::build_body(request.values.clone(), &request.options, request.qbe.as_deref())
            .expect("merge options should resolve");

    assert_eq!(
        serde_json::to_value(&body).unwrap(),
        json!({
            "values": { "Request ID": "INC000000000001", "Status": "Resolved" },
            "mergeOptions": {
                "mergeType": "DUP_OVERWRITE",
                "multimatchOption": 0,
                "ignorePatterns": false,
                "ignoreRequired": true,
                "workflowEnabled": false,
                "associationsEnabled": true
            }
        })
    );
}

#[test]
fn test_merge_arguments_reject_unknown_policy() {
    let request: MergeRecordRequest = serde_json::from_value(json!({
        "schema": "S",
        "values": { "Status": "New" },
        "handleDuplicateEntryId": "replace"
    }))
    .unwrap();

    let err = MergeResolver::build_body(request.values.clone(), &request.options, None).unwrap_err();
    assert!(err.is_caller_error());
    assert_eq!(err.message(), "invalid value (handleDuplicateEntryId): replace");
}

#[test]
fn test_merge_arguments_reject_misspelled_keys() {
    let result = serde_json::from_value::<MergeRecordRequest>(json!({
        "schema": "S",
        "values": { "Status": "New" },
        "handleDuplicateEntryID": "merge"
    }));
    assert!(result.is_err());
}

// ============================================================================
// Error reports
// ============================================================================

/// Scenario: a query fails server-side and the caller logs the error as JSON
#[test]
fn test_failed_query_report() {
    let request = QueryRequest::new("HPD:Help Desk", ["Entry ID"], "'Status' = ");
    let body = json!([{
        "messageType": "ERROR",
        "messageText": "Syntax error in qualification",
        "messageAppendedText": "'Status' = ",
        "messageNumber": 1587
    }])
    .to_string();

    let err = ErrorModel::from_response(400, BTreeMap::new(), &body).with_context("query", &request);
    let report = serde_json::to_value(&err).unwrap();

    assert_eq!(report["httpStatus"], 400);
    assert_eq!(report["message"], "Syntax error in qualification");
    assert_eq!(report["messageType"], "error");
    assert_eq!(report["event"], "status");
    assert_eq!(report["thrownByFunction"], "query");
    assert_eq!(report["thrownByFunctionArgs"]["QBE"], "'Status' = ");
    assert_eq!(report["arsErrorList"][0]["messageNumber"], 1587);
}

#[test]
fn test_login_report_never_carries_password() {
    let credentials = Some(Credentials::new("Demo", "hunter2"));
    let err = ErrorModel::from_response(401, BTreeMap::new(), "")
        .with_context("authenticate", &credentials);

    let report = serde_json::to_string(&err).unwrap();
    assert!(!report.contains("hunter2"));
    assert_eq!(err.thrown_by_function_args(), Some(&json!({ "user": "Demo" })));
    assert_eq!(err.message_type(), MessageType::NonArs);
}

#[test]
fn test_unparseable_error_body_keeps_status() {
    let err = ErrorModel::from_response(502, BTreeMap::new(), "<html>Bad Gateway</html>");

    assert_eq!(err.http_status(), 502);
    assert_eq!(err.event(), FailureEvent::Status);
    assert_eq!(err.message_type(), MessageType::NonArs);
    assert!(err.ars_error_list().is_empty());
    assert!(!err.diagnostics().is_empty());
    assert_eq!(err.to_string(), format!("[http/502 non-ars (-)]: {} / ", err.message()));
}
