//! Merge option resolution
//!
//! Translates the caller's duplicate-handling and multi-match intent into the
//! two wire enumerations the mergeEntry endpoint expects.
//!
//! Server-side semantics worth knowing (preserved as-is, not corrected here):
//! - `overwrite` replaces the whole record, clearing fields the merge body
//!   omits.
//! - `merge` only touches supplied fields, but the server still rejects the
//!   request unless every required field is supplied.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::record::Values;
use crate::errors::{ErrorModel, Outcome};

/// What the server does when the merged record's Request ID already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DuplicateHandling {
    /// Reject the merge.
    #[default]
    Error,
    /// Create a new record under a fresh id.
    Create,
    /// Replace the existing record entirely.
    Overwrite,
    /// Update only the supplied fields.
    Merge,
    /// Always generate a new id, even without a conflict.
    AlwaysCreate,
}

impl DuplicateHandling {
    pub const ALL: [Self; 5] =
        [Self::Error, Self::Create, Self::Overwrite, Self::Merge, Self::AlwaysCreate];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Create => "create",
            Self::Overwrite => "overwrite",
            Self::Merge => "merge",
            Self::AlwaysCreate => "alwaysCreate",
        }
    }

    pub fn wire_token(self) -> &'static str {
        match self {
            Self::Error => "DUP_ERROR",
            Self::Create => "DUP_NEW_ID",
            Self::Overwrite => "DUP_OVERWRITE",
            Self::Merge => "DUP_MERGE",
            Self::AlwaysCreate => "GEN_NEW_ID",
        }
    }

    pub fn from_wire_token(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|value| value.wire_token() == token)
    }
}

impl fmt::Display for DuplicateHandling {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DuplicateHandling {
    type Err = ErrorModel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|value| value.as_str() == s)
            .ok_or_else(|| ErrorModel::caller(format!("invalid value (handleDuplicateEntryId): {s}")))
    }
}

/// What the server does when the qualification matches several records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MultimatchOption {
    #[default]
    Error,
    UseFirstMatching,
}

impl MultimatchOption {
    pub const ALL: [Self; 2] = [Self::Error, Self::UseFirstMatching];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::UseFirstMatching => "useFirstMatching",
        }
    }

    pub fn wire_token(self) -> u8 {
        match self {
            Self::Error => 0,
            Self::UseFirstMatching => 1,
        }
    }

    pub fn from_wire_token(token: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|value| value.wire_token() == token)
    }
}

impl fmt::Display for MultimatchOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MultimatchOption {
    type Err = ErrorModel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|value| value.as_str() == s)
            .ok_or_else(|| ErrorModel::caller(format!("invalid value (multimatchOption): {s}")))
    }
}

/// Typed merge intent for one mergeRecord call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeIntent {
    pub handle_duplicate_entry_id: DuplicateHandling,
    pub multimatch_option: MultimatchOption,
    pub ignore_patterns: bool,
    pub ignore_required: bool,
    pub workflow_enabled: bool,
    pub associations_enabled: bool,
}

impl Default for MergeIntent {
    fn default() -> Self {
        Self {
            handle_duplicate_entry_id: DuplicateHandling::Error,
            multimatch_option: MultimatchOption::Error,
            ignore_patterns: false,
            ignore_required: false,
            workflow_enabled: true,
            associations_enabled: true,
        }
    }
}

impl MergeIntent {
    pub fn new(handle_duplicate_entry_id: DuplicateHandling) -> Self {
        Self { handle_duplicate_entry_id, ..Self::default() }
    }

    pub fn multimatch(mut self, option: MultimatchOption) -> Self {
        self.multimatch_option = option;
        self
    }

    pub fn to_wire(self) -> WireMergeOptions {
        WireMergeOptions {
            merge_type: self.handle_duplicate_entry_id.wire_token().to_string(),
            multimatch_option: self.multimatch_option.wire_token(),
            ignore_patterns: self.ignore_patterns,
            ignore_required: self.ignore_required,
            workflow_enabled: self.workflow_enabled,
            associations_enabled: self.associations_enabled,
        }
    }
}

/// Merge options as received from a caller, before validation.
///
/// Blank or missing enum values take their defaults; unknown ones are
/// rejected by [`MergeResolver::resolve`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct MergeOptionsArgs {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub handle_duplicate_entry_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub multimatch_option: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ignore_patterns: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ignore_required: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workflow_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub associations_enabled: Option<bool>,
}

impl From<MergeIntent> for MergeOptionsArgs {
    fn from(intent: MergeIntent) -> Self {
        Self {
            handle_duplicate_entry_id: Some(intent.handle_duplicate_entry_id.to_string()),
            multimatch_option: Some(intent.multimatch_option.to_string()),
            ignore_patterns: Some(intent.ignore_patterns),
            ignore_required: Some(intent.ignore_required),
            workflow_enabled: Some(intent.workflow_enabled),
            associations_enabled: Some(intent.associations_enabled),
        }
    }
}

impl TryFrom<&MergeOptionsArgs> for MergeIntent {
    type Error = ErrorModel;

    fn try_from(args: &MergeOptionsArgs) -> Result<Self, Self::Error> {
        let defaults = Self::default();
        Ok(Self {
            handle_duplicate_entry_id: parse_or_default(
                args.handle_duplicate_entry_id.as_deref(),
                defaults.handle_duplicate_entry_id,
            )?,
            multimatch_option: parse_or_default(
                args.multimatch_option.as_deref(),
                defaults.multimatch_option,
            )?,
            ignore_patterns: args.ignore_patterns.unwrap_or(defaults.ignore_patterns),
            ignore_required: args.ignore_required.unwrap_or(defaults.ignore_required),
            workflow_enabled: args.workflow_enabled.unwrap_or(defaults.workflow_enabled),
            associations_enabled: args.associations_enabled.unwrap_or(defaults.associations_enabled),
        })
    }
}

/// Blank means "not given"; anything else must match exactly, padding included.
fn parse_or_default<T: FromStr<Err = ErrorModel>>(raw: Option<&str>, default: T) -> Outcome<T> {
    match raw.filter(|value| !value.trim().is_empty()) {
        Some(value) => value.parse(),
        None => Ok(default),
    }
}

/// The `mergeOptions` object of a mergeEntry request body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireMergeOptions {
    pub merge_type: String,
    pub multimatch_option: u8,
    pub ignore_patterns: bool,
    pub ignore_required: bool,
    pub workflow_enabled: bool,
    pub associations_enabled: bool,
}

/// Full mergeEntry request body.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeBody {
    pub values: Values,
    pub merge_options: WireMergeOptions,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qualification: Option<String>,
}

/// Validates merge options and assembles merge request bodies.
pub struct MergeResolver;

impl MergeResolver {
    /// Validate raw options and map them to wire values.
    ///
    /// # Errors
    /// Returns a caller error for any duplicate-handling value outside
    /// `error|create|overwrite|merge|alwaysCreate` or multimatch value outside
    /// `error|useFirstMatching`.
    pub fn resolve(args: &MergeOptionsArgs) -> Outcome<WireMergeOptions> {
        MergeIntent::try_from(args).map(MergeIntent::to_wire)
    }

    /// Build the request body. A blank qualification is left out.
    pub fn build_body(
        values: Values,
        args: &MergeOptionsArgs,
        qualification: Option<&str>,
    ) -> Outcome<MergeBody> {
        let merge_options = Self::resolve(args)?;
        let qualification =
            qualification.filter(|qbe| !qbe.trim().is_empty()).map(str::to_string);

        Ok(MergeBody { values, merge_options, qualification })
    }
}
