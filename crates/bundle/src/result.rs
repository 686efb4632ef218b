use casebundle_catalog::DocumentReference;
use casebundle_fetch::FetchError;
use casebundle_protocol::PageRange;

/// A document whose pages made it into the merged output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergedDocument {
    pub reference: DocumentReference,
    pub range: PageRange,
}

/// A document that contributed no pages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentFailure {
    pub reference: DocumentReference,
    pub error: FetchError,
}

/// Output of one merge. Every input document lands in exactly one of
/// `merged` or `failures`, both in input order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BundleResult {
    pub(crate) merged_pdf: Vec<u8>,
    pub(crate) merged: Vec<MergedDocument>,
    pub(crate) failures: Vec<DocumentFailure>,
}

impl BundleResult {
    /// Merged PDF bytes; empty when no document could be merged.
    pub fn merged_pdf(&self) -> &[u8] {
        &self.merged_pdf
    }

    pub fn into_merged_pdf(self) -> Vec<u8> {
        self.merged_pdf
    }

    pub fn merged_documents(&self) -> &[MergedDocument] {
        &self.merged
    }

    pub fn page_ranges(&self) -> Vec<PageRange> {
        self.merged.iter().map(|m| m.range).collect()
    }

    pub fn failures(&self) -> &[DocumentFailure] {
        &self.failures
    }

    pub fn total_pages(&self) -> u32 {
        self.merged.last().map(|m| m.range.end).unwrap_or(0)
    }

    pub fn document_count(&self) -> usize {
        self.merged.len() + self.failures.len()
    }

    /// True when nothing was merged.
    pub fn is_empty(&self) -> bool {
        self.merged.is_empty()
    }
}
