use crate::category::{normalize, NormalizedCategory};
use crate::error::{CatalogError, Result};
use crate::issue_date::parse_issue_date;
use crate::source::SourceSystem;
use casebundle_protocol::DocumentRequest;
use chrono::NaiveDateTime;
use serde::Serialize;

/// Unresolved listing fields, exactly as an upstream service reported them.
#[derive(Debug, Clone, Default)]
pub struct RawDocument {
    pub case_id: String,
    pub file_id: Option<String>,
    pub participant_id: Option<String>,
    pub document_id: String,
    pub category: Option<String>,
    pub classification: Option<String>,
    pub disposition_description: Option<String>,
    pub issue_date: Option<String>,
}

/// A resolved, immutable pointer to one upstream document.
///
/// Category normalization and issue-date parsing happen once, in
/// [`DocumentReference::resolve`]; nothing is recomputed on access.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentReference {
    source_system: SourceSystem,
    case_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    file_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    participant_id: Option<String>,
    document_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    raw_category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    raw_classification: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    disposition_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    raw_issue_date: Option<String>,
    category: NormalizedCategory,
    #[serde(skip)]
    issue_date: Option<NaiveDateTime>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl DocumentReference {
    pub fn resolve(source_system: SourceSystem, raw: RawDocument) -> Result<Self> {
        let document_id = raw.document_id.trim().to_string();
        if document_id.is_empty() {
            return Err(CatalogError::EmptyDocumentId(source_system.to_string()));
        }

        let raw_category = non_blank(raw.category);
        let raw_classification = non_blank(raw.classification);
        let raw_issue_date = non_blank(raw.issue_date);
        let category = normalize(raw_category.as_deref(), raw_classification.as_deref());
        let issue_date = raw_issue_date.as_deref().and_then(parse_issue_date);
        if raw_issue_date.is_some() && issue_date.is_none() {
            log::debug!(
                "Unparseable issue date {:?} on {source_system} document {document_id}",
                raw_issue_date
            );
        }

        Ok(Self {
            source_system,
            case_id: raw.case_id.trim().to_string(),
            file_id: non_blank(raw.file_id),
            participant_id: non_blank(raw.participant_id),
            document_id,
            raw_category,
            raw_classification,
            disposition_description: non_blank(raw.disposition_description),
            raw_issue_date,
            category,
            issue_date,
        })
    }

    /// Resolve one entry of a bundle request.
    pub fn from_request(request: &DocumentRequest, case_id: &str) -> Result<Self> {
        let source_system = request.source_system.parse::<SourceSystem>()?;
        Self::resolve(
            source_system,
            RawDocument {
                case_id: case_id.to_string(),
                file_id: request.file_id.clone(),
                participant_id: request.participant_id.clone(),
                document_id: request.document_id.clone(),
                category: request.category.clone(),
                classification: request.classification.clone(),
                disposition_description: request.disposition_description.clone(),
                issue_date: request.issue_date.clone(),
            },
        )
    }

    pub fn source_system(&self) -> SourceSystem {
        self.source_system
    }

    pub fn case_id(&self) -> &str {
        &self.case_id
    }

    pub fn file_id(&self) -> Option<&str> {
        self.file_id.as_deref()
    }

    pub fn participant_id(&self) -> Option<&str> {
        self.participant_id.as_deref()
    }

    pub fn document_id(&self) -> &str {
        &self.document_id
    }

    pub fn raw_category(&self) -> Option<&str> {
        self.raw_category.as_deref()
    }

    pub fn raw_classification(&self) -> Option<&str> {
        self.raw_classification.as_deref()
    }

    pub fn disposition_description(&self) -> Option<&str> {
        self.disposition_description.as_deref()
    }

    pub fn raw_issue_date(&self) -> Option<&str> {
        self.raw_issue_date.as_deref()
    }

    pub fn category(&self) -> NormalizedCategory {
        self.category
    }

    /// `None` when the upstream date was missing or unparseable.
    pub fn issue_date(&self) -> Option<NaiveDateTime> {
        self.issue_date
    }

    /// True when either the resolved category or the classification alone
    /// names `category`.
    pub fn is_classified_as(&self, category: NormalizedCategory) -> bool {
        self.category == category || normalize(None, self.raw_classification()) == category
    }

    /// Identity used for de-duplication: document ids are only unique per
    /// source system.
    pub fn key(&self) -> (SourceSystem, &str) {
        (self.source_system, &self.document_id)
    }
}

impl std::fmt::Display for DocumentReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.source_system, self.document_id)
    }
}
