use casebundle_catalog::CatalogError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, BundleError>;

/// Request-level failures. Problems with individual documents are never
/// raised here; they travel as warnings in the response.
#[derive(Error, Debug)]
pub enum BundleError {
    #[error("No documents requested")]
    EmptyRequest,

    #[error("No key documents found for case {0}")]
    NoKeyDocuments(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(#[from] CatalogError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Bundle request cancelled")]
    Cancelled,

    #[error("PDF error: {0}")]
    Pdf(String),
}

impl BundleError {
    pub fn pdf(msg: impl Into<String>) -> Self {
        Self::Pdf(msg.into())
    }

    /// Stable code for error envelopes.
    pub fn code(&self) -> &'static str {
        match self {
            Self::EmptyRequest => "empty_request",
            Self::NoKeyDocuments(_) => "no_key_documents",
            Self::InvalidRequest(_) => "invalid_request",
            Self::InvalidConfig(_) => "invalid_config",
            Self::Cancelled => "cancelled",
            Self::Pdf(_) => "pdf_error",
        }
    }
}
