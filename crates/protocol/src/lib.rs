use anyhow::Result;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

pub const BUNDLE_SCHEMA_VERSION: u32 = 1;

/// A single document as listed by an upstream file service.
///
/// Every descriptive field is optional and loosely formatted; the engine
/// tolerates missing or malformed values instead of rejecting the request.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DocumentRequest {
    pub source_system: String,
    pub document_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub participant_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classification: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disposition_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issue_date: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct BundleRequest {
    pub case_id: String,
    #[serde(default)]
    pub documents: Vec<DocumentRequest>,
    #[serde(default)]
    pub key_documents_only: bool,
}

/// Pages a source document occupies in the merged output (1-based, inclusive).
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, JsonSchema)]
pub struct PageRange {
    pub start: u32,
    pub end: u32,
}

impl PageRange {
    pub fn len(&self) -> u32 {
        (self.end + 1).saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.end < self.start
    }
}

/// Why a single document could not be included in a bundle.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    NotFound,
    Unauthorized,
    Timeout,
    MalformedContent,
    UpstreamUnavailable,
}

impl ErrorKind {
    /// Transient failures get one more attempt; the rest are deterministic.
    pub fn is_retryable(self) -> bool {
        matches!(self, Self::Timeout | Self::UpstreamUnavailable)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::Unauthorized => "unauthorized",
            Self::Timeout => "timeout",
            Self::MalformedContent => "malformed_content",
            Self::UpstreamUnavailable => "upstream_unavailable",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct BundleWarning {
    pub document_id: String,
    pub source_system: String,
    pub error_kind: ErrorKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum BundleStatus {
    Succeeded,
    Partial,
    Failed,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct BundleStats {
    pub requested: usize,
    pub merged: usize,
    pub failed: usize,
    pub total_pages: u32,
    pub elapsed_ms: u64,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct BundleResponse {
    pub schema_version: u32,
    pub status: BundleStatus,
    /// Empty when `status` is `failed`.
    pub base64_pdf: String,
    /// Parallel to the successfully merged documents only.
    pub page_ranges: Vec<PageRange>,
    #[serde(default)]
    pub warnings: Vec<BundleWarning>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha256: Option<String>,
    pub stats: BundleStats,
}

#[derive(Debug, Serialize, Deserialize, Clone, JsonSchema)]
pub struct ErrorEnvelope {
    pub code: String,
    pub message: String,
    pub hint: Option<String>,
}

pub fn serialize_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string(value).map_err(Into::into)
}

pub fn serialize_json_pretty<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).map_err(Into::into)
}

pub fn response_schema() -> Result<serde_json::Value> {
    let schema = schemars::schema_for!(BundleResponse);
    serde_json::to_value(schema).map_err(Into::into)
}

pub fn request_schema() -> Result<serde_json::Value> {
    let schema = schemars::schema_for!(BundleRequest);
    serde_json::to_value(schema).map_err(Into::into)
}
