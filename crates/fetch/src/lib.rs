//! # Casebundle Fetch
//!
//! Retrieval of raw PDF bytes for resolved document references.
//!
//! ## Model
//!
//! ```text
//! DocumentReference[] (input order)
//!     │
//!     ├──> Semaphore (max_concurrency permits per request)
//!     │
//!     ├──> DocumentSource::fetch   (filesystem share / HTTP / in-memory)
//!     │      ├─ per-attempt timeout      → timeout
//!     │      ├─ one retry for timeout / upstream_unavailable
//!     │      └─ %PDF- header check       → malformed_content
//!     │
//!     └──> re-sequenced by input index
//!            └─> FetchedDocument[] (input order, Ok(bytes) | Err(FetchError))
//! ```

mod config;
mod error;
mod fetcher;
mod fs_source;
mod http_source;
mod source;

pub use casebundle_protocol::ErrorKind;
pub use config::{
    FetchConfig, ENV_FETCH_CONCURRENCY, ENV_FETCH_RETRY_BACKOFF_MS, ENV_FETCH_TIMEOUT_MS,
    MAX_FETCH_CONCURRENCY, MAX_FETCH_RETRIES,
};
pub use error::{FetchCancelled, FetchError, Result, SourceError};
pub use fetcher::{FetchedDocument, Fetcher};
pub use fs_source::FsDocumentSource;
pub use http_source::{classify_status, HttpDocumentSource};
pub use source::{DocumentSource, StaticDocumentSource};
