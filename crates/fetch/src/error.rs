use casebundle_protocol::ErrorKind;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, FetchError>;

/// Failure to retrieve one document. Recorded per document, never raised
/// to abort a whole bundle.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind}: {message}")]
pub struct FetchError {
    pub kind: ErrorKind,
    pub message: String,
}

impl FetchError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unauthorized, message)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Timeout, message)
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::MalformedContent, message)
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::UpstreamUnavailable, message)
    }

    pub fn is_retryable(&self) -> bool {
        self.kind.is_retryable()
    }
}

/// The bundle request was cancelled before every fetch settled.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("fetch cancelled")]
pub struct FetchCancelled;

/// Misconfigured document source.
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("Invalid upstream base URL {url}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),

    #[error("Document root does not exist: {0}")]
    MissingRoot(String),
}
