//! Record, request and merge types

pub mod merge;
pub mod record;
pub mod requests;

pub use merge::{
    DuplicateHandling, MergeBody, MergeIntent, MergeOptionsArgs, MergeResolver, MultimatchOption,
    WireMergeOptions,
};
pub use record::{AttachmentValue, Entry, FieldMap, FieldValue, QueryResponse, RecordId, Values};
pub use requests::{
    AttachmentRequest, CreateRecordRequest, DeleteRecordRequest, GetRecordRequest,
    MergeRecordRequest, ModifyRecordRequest, QueryRequest,
};
