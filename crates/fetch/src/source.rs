use crate::error::{FetchError, Result};
use async_trait::async_trait;
use casebundle_catalog::{DocumentReference, SourceSystem};
use casebundle_protocol::ErrorKind;
use std::collections::HashMap;

/// Retrieval of raw PDF bytes for one resolved reference.
///
/// Implementations report failures through [`FetchError::kind`]; they do not
/// retry or apply timeouts themselves, the [`crate::Fetcher`] does.
#[async_trait]
pub trait DocumentSource: Send + Sync {
    async fn fetch(&self, reference: &DocumentReference) -> Result<Vec<u8>>;

    /// Short label for logs
    fn name(&self) -> &str {
        "document-source"
    }
}

/// In-memory source keyed by `(source system, document id)`.
#[derive(Debug, Clone, Default)]
pub struct StaticDocumentSource {
    entries: HashMap<(SourceSystem, String), std::result::Result<Vec<u8>, ErrorKind>>,
}

impl StaticDocumentSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, system: SourceSystem, document_id: &str, bytes: Vec<u8>) {
        self.entries
            .insert((system, document_id.to_string()), Ok(bytes));
    }

    pub fn insert_error(&mut self, system: SourceSystem, document_id: &str, kind: ErrorKind) {
        self.entries
            .insert((system, document_id.to_string()), Err(kind));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl DocumentSource for StaticDocumentSource {
    async fn fetch(&self, reference: &DocumentReference) -> Result<Vec<u8>> {
        let key = (reference.source_system(), reference.document_id().to_string());
        match self.entries.get(&key) {
            Some(Ok(bytes)) => Ok(bytes.clone()),
            Some(Err(kind)) => Err(FetchError::new(*kind, format!("{reference} is unavailable"))),
            None => Err(FetchError::not_found(format!("{reference} is not registered"))),
        }
    }

    fn name(&self) -> &str {
        "static"
    }
}
