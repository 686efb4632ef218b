//! # Casebundle Bundle
//!
//! Assembly of a single merged PDF from a case's documents, together with the
//! page range each source document occupies in it.
//!
//! ## Pipeline
//!
//! ```text
//! BundleRequest
//!     │
//!     ├──> resolve (DocumentReference per entry)
//!     │      └─> Key-Document Selector when keyDocumentsOnly
//!     │
//!     ├──> Fetcher (bounded, concurrent, input order preserved)
//!     │
//!     ├──> PdfMerger
//!     │      ├─ successful fetch → pages appended, PageRange{start, end}
//!     │      └─ failed fetch / unreadable PDF → failure, no pages
//!     │
//!     └──> BundleResponseBuilder
//!            └─> { status, base64Pdf, pageRanges, warnings, stats }
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use casebundle_bundle::{BundleService, EngineConfig};
//! use casebundle_fetch::FsDocumentSource;
//! use casebundle_protocol::BundleRequest;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let source = Arc::new(FsDocumentSource::new("/mnt/transitory")?);
//!     let service = BundleService::new(source, EngineConfig::default())?;
//!
//!     let raw = std::fs::read_to_string("request.json")?;
//!     let request: BundleRequest = serde_json::from_str(&raw)?;
//!     let response = service.assemble(&request).await?;
//!     println!("{:?}: {} pages", response.status, response.stats.total_pages);
//!     Ok(())
//! }
//! ```

mod config;
mod error;
mod merger;
mod response;
mod result;
mod service;

pub use config::EngineConfig;
pub use error::{BundleError, Result};
pub use merger::{blank_pdf, PdfMerger};
pub use response::{BundleResponseBuilder, NO_DOCUMENTS_MESSAGE};
pub use result::{BundleResult, DocumentFailure, MergedDocument};
pub use service::BundleService;
