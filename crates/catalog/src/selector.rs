use crate::policy::SelectionPolicy;
use crate::reference::DocumentReference;
use crate::source::SourceSystem;
use serde::Serialize;
use std::collections::HashSet;
use std::convert::Infallible;

/// Ordered key documents of one case: always-key documents in input order,
/// then at most one bail document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct KeyDocumentSet {
    documents: Vec<DocumentReference>,
    has_bail: bool,
}

impl KeyDocumentSet {
    pub fn documents(&self) -> &[DocumentReference] {
        &self.documents
    }

    pub fn into_documents(self) -> Vec<DocumentReference> {
        self.documents
    }

    /// The selected bail document, always the last entry when present.
    pub fn bail_document(&self) -> Option<&DocumentReference> {
        self.has_bail.then(|| self.documents.last()).flatten()
    }

    pub fn document_ids(&self) -> Vec<&str> {
        self.documents.iter().map(|d| d.document_id()).collect()
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

impl IntoIterator for KeyDocumentSet {
    type Item = DocumentReference;
    type IntoIter = std::vec::IntoIter<DocumentReference>;

    fn into_iter(self) -> Self::IntoIter {
        self.documents.into_iter()
    }
}

/// Picks the documents a reviewer sees by default.
#[derive(Debug, Clone, Default)]
pub struct KeyDocumentSelector {
    policy: SelectionPolicy,
}

impl KeyDocumentSelector {
    pub fn new(policy: SelectionPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &SelectionPolicy {
        &self.policy
    }

    pub fn select(&self, documents: &[DocumentReference]) -> KeyDocumentSet {
        match self.try_select(documents.iter().cloned().map(Ok::<_, Infallible>)) {
            Ok(set) => set,
            Err(never) => match never {},
        }
    }

    /// Selection over a fallible listing; the first listing error aborts
    /// selection and is returned unchanged.
    pub fn try_select<I, E>(&self, documents: I) -> Result<KeyDocumentSet, E>
    where
        I: IntoIterator<Item = Result<DocumentReference, E>>,
    {
        let mut seen: HashSet<(SourceSystem, String)> = HashSet::new();
        let mut selected = Vec::new();
        let mut best_bail: Option<DocumentReference> = None;

        for document in documents {
            let document = document?;

            if self.policy.is_always_key(document.category()) {
                let (system, id) = document.key();
                if seen.insert((system, id.to_string())) {
                    selected.push(document);
                }
                continue;
            }

            if !self.is_bail_candidate(&document) {
                continue;
            }
            // Strictly later replaces; ties keep the earlier candidate.
            // A missing date sorts before every parsed one.
            let replace = match &best_bail {
                None => true,
                Some(current) => document.issue_date() > current.issue_date(),
            };
            if replace {
                best_bail = Some(document);
            }
        }

        let mut has_bail = false;
        if let Some(bail) = best_bail {
            let (system, id) = bail.key();
            if seen.insert((system, id.to_string())) {
                log::debug!(
                    "Selected bail document {bail} (issued {})",
                    bail.raw_issue_date().unwrap_or("unknown")
                );
                selected.push(bail);
                has_bail = true;
            }
        }

        Ok(KeyDocumentSet {
            documents: selected,
            has_bail,
        })
    }

    fn is_bail_candidate(&self, document: &DocumentReference) -> bool {
        document.is_classified_as(self.policy.bail_category)
            && self.policy.is_perfected(document.disposition_description())
    }
}

/// Key documents under the default policy.
pub fn select_key_documents(documents: &[DocumentReference]) -> KeyDocumentSet {
    KeyDocumentSelector::default().select(documents)
}
