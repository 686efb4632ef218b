use thiserror::Error;

/// Result type for catalog operations
pub type Result<T> = std::result::Result<T, CatalogError>;

/// Errors raised while resolving upstream document listings
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    /// The listing named a source system this engine does not know
    #[error("Unknown source system: {0}")]
    UnknownSourceSystem(String),

    /// A document reference without an id cannot be fetched
    #[error("Document id is empty (source system {0})")]
    EmptyDocumentId(String),

    /// Selection policy is internally inconsistent
    #[error("Invalid selection policy: {0}")]
    InvalidPolicy(String),
}

impl CatalogError {
    pub fn invalid_policy(msg: impl Into<String>) -> Self {
        Self::InvalidPolicy(msg.into())
    }
}
