use crate::result::BundleResult;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use casebundle_protocol::{
    BundleResponse, BundleStats, BundleStatus, BundleWarning, BUNDLE_SCHEMA_VERSION,
};
use sha2::{Digest, Sha256};

pub const NO_DOCUMENTS_MESSAGE: &str = "No documents available";

fn hex_digest(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hasher
        .finalize()
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect()
}

/// Packages a merge result into the response the viewer consumes.
#[derive(Debug, Clone, Default)]
pub struct BundleResponseBuilder;

impl BundleResponseBuilder {
    pub fn new() -> Self {
        Self
    }

    pub fn build(&self, result: &BundleResult) -> BundleResponse {
        let warnings: Vec<BundleWarning> = result
            .failures()
            .iter()
            .map(|failure| BundleWarning {
                document_id: failure.reference.document_id().to_string(),
                source_system: failure.reference.source_system().to_string(),
                error_kind: failure.error.kind,
                detail: Some(failure.error.message.clone()),
            })
            .collect();

        let status = if result.is_empty() {
            BundleStatus::Failed
        } else if warnings.is_empty() {
            BundleStatus::Succeeded
        } else {
            BundleStatus::Partial
        };

        let stats = BundleStats {
            requested: result.document_count(),
            merged: result.merged_documents().len(),
            failed: result.failures().len(),
            total_pages: result.total_pages(),
            elapsed_ms: 0,
        };

        if status == BundleStatus::Failed {
            return BundleResponse {
                schema_version: BUNDLE_SCHEMA_VERSION,
                status,
                base64_pdf: String::new(),
                page_ranges: Vec::new(),
                warnings,
                message: Some(NO_DOCUMENTS_MESSAGE.to_string()),
                sha256: None,
                stats,
            };
        }

        BundleResponse {
            schema_version: BUNDLE_SCHEMA_VERSION,
            status,
            base64_pdf: STANDARD.encode(result.merged_pdf()),
            page_ranges: result.page_ranges(),
            warnings,
            message: None,
            sha256: Some(hex_digest(result.merged_pdf())),
            stats,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::merger::{blank_pdf, PdfMerger};
    use casebundle_catalog::{DocumentReference, RawDocument, SourceSystem};
    use casebundle_fetch::{FetchError, FetchedDocument};
    use casebundle_protocol::{ErrorKind, PageRange};
    use pretty_assertions::assert_eq;

    fn reference(id: &str) -> DocumentReference {
        DocumentReference::resolve(
            SourceSystem::Civil,
            RawDocument {
                document_id: id.to_string(),
                ..Default::default()
            },
        )
        .unwrap()
    }

    fn ok(id: &str, pages: usize) -> FetchedDocument {
        FetchedDocument::ok(reference(id), blank_pdf(pages).unwrap())
    }

    fn not_found(id: &str) -> FetchedDocument {
        FetchedDocument::failed(reference(id), FetchError::not_found("missing"))
    }

    fn build(input: &[FetchedDocument]) -> (BundleResult, BundleResponse) {
        let result = PdfMerger::new().merge(input).unwrap();
        let response = BundleResponseBuilder::new().build(&result);
        (result, response)
    }

    #[test]
    fn full_success_has_no_warnings() {
        let (result, response) = build(&[ok("1", 3), ok("2", 5)]);

        assert_eq!(response.status, BundleStatus::Succeeded);
        assert!(response.warnings.is_empty());
        assert_eq!(
            response.page_ranges,
            vec![PageRange { start: 1, end: 3 }, PageRange { start: 4, end: 8 }]
        );
        assert_eq!(STANDARD.decode(&response.base64_pdf).unwrap(), result.merged_pdf());
        assert_eq!(response.stats.total_pages, 8);
        assert_eq!(response.message, None);
        assert_eq!(response.sha256.as_deref().map(str::len), Some(64));
    }

    #[test]
    fn partial_success_surfaces_each_failure_once() {
        let (_, response) = build(&[ok("1", 2), not_found("2")]);

        assert_eq!(response.status, BundleStatus::Partial);
        assert_eq!(response.warnings.len(), 1);
        assert_eq!(response.warnings[0].document_id, "2");
        assert_eq!(response.warnings[0].source_system, "civil");
        assert_eq!(response.warnings[0].error_kind, ErrorKind::NotFound);
        assert_eq!(response.page_ranges, vec![PageRange { start: 1, end: 2 }]);
        assert_eq!(response.stats.requested, 2);
        assert_eq!(response.stats.merged, 1);
        assert_eq!(response.stats.failed, 1);
    }

    #[test]
    fn all_failed_is_a_failed_response() {
        let (_, response) = build(&[not_found("1"), not_found("2"), not_found("3")]);

        assert_eq!(response.status, BundleStatus::Failed);
        assert!(response.base64_pdf.is_empty());
        assert!(response.page_ranges.is_empty());
        assert_eq!(response.warnings.len(), 3);
        assert_eq!(response.message.as_deref(), Some(NO_DOCUMENTS_MESSAGE));
        assert_eq!(response.sha256, None);
    }

    #[test]
    fn digest_is_stable_for_identical_input() {
        let input = [ok("1", 1), ok("2", 2)];
        let (_, first) = build(&input);
        let (_, second) = build(&input);
        assert_eq!(first.sha256, second.sha256);
        assert_eq!(first.base64_pdf, second.base64_pdf);
    }

    #[test]
    fn hex_digest_of_empty_input() {
        assert_eq!(
            hex_digest(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }
}
