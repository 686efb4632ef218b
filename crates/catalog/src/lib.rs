//! # Casebundle Catalog
//!
//! Resolution of upstream document listings into a single taxonomy, and the
//! policy that picks a case's key documents.
//!
//! ## Pipeline
//!
//! ```text
//! DocumentRequest[] (criminal / civil / DARS / transitory listings)
//!     │
//!     ├──> SourceSystem parse
//!     ├──> Category Normalizer (category, then classification)
//!     ├──> Issue-date parse (unparseable ⇒ oldest)
//!     │      └─> DocumentReference[] (immutable)
//!     │
//!     └──> Key-Document Selector
//!            ├─ always-key categories, input order
//!            └─ + latest perfected bail (at most one, appended last)
//! ```
//!
//! ## Example
//!
//! ```rust
//! use casebundle_catalog::{select_key_documents, DocumentReference, RawDocument, SourceSystem};
//!
//! let rop = DocumentReference::resolve(
//!     SourceSystem::Criminal,
//!     RawDocument {
//!         document_id: "1".to_string(),
//!         category: Some("ROP".to_string()),
//!         ..Default::default()
//!     },
//! )
//! .unwrap();
//!
//! let key = select_key_documents(&[rop]);
//! assert_eq!(key.document_ids(), vec!["1"]);
//! ```

mod category;
mod error;
mod issue_date;
mod policy;
mod reference;
mod selector;
mod source;

pub use category::{lookup_category, normalize, NormalizedCategory};
pub use error::{CatalogError, Result};
pub use issue_date::parse_issue_date;
pub use policy::SelectionPolicy;
pub use reference::{DocumentReference, RawDocument};
pub use selector::{select_key_documents, KeyDocumentSelector, KeyDocumentSet};
pub use source::SourceSystem;
