use crate::config::EngineConfig;
use crate::error::{BundleError, Result};
use crate::merger::PdfMerger;
use crate::response::BundleResponseBuilder;
use casebundle_catalog::{DocumentReference, KeyDocumentSelector};
use casebundle_fetch::{DocumentSource, Fetcher};
use casebundle_protocol::{BundleRequest, BundleResponse};
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

/// Request → (key-document selection) → concurrent fetch → merge → response.
///
/// Holds no per-request state; one service can serve many requests
/// concurrently.
#[derive(Debug, Clone)]
pub struct BundleService {
    fetcher: Fetcher,
    selector: KeyDocumentSelector,
    merger: PdfMerger,
    builder: BundleResponseBuilder,
}

impl BundleService {
    pub fn new(source: Arc<dyn DocumentSource>, config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            fetcher: Fetcher::new(source, config.fetch),
            selector: KeyDocumentSelector::new(config.selection),
            merger: PdfMerger::new(),
            builder: BundleResponseBuilder::new(),
        })
    }

    /// Resolve the request into the ordered list of documents to bundle.
    pub fn resolve(&self, request: &BundleRequest) -> Result<Vec<DocumentReference>> {
        if request.documents.is_empty() {
            return Err(BundleError::EmptyRequest);
        }

        let case_id = request.case_id.trim();
        let listing = request
            .documents
            .iter()
            .map(|doc| DocumentReference::from_request(doc, case_id));

        if !request.key_documents_only {
            return listing
                .collect::<std::result::Result<Vec<_>, _>>()
                .map_err(Into::into);
        }

        let key = self.selector.try_select(listing)?;
        if key.is_empty() {
            return Err(BundleError::NoKeyDocuments(case_id.to_string()));
        }
        log::debug!(
            "Case {case_id}: {} of {} documents are key documents",
            key.len(),
            request.documents.len()
        );
        Ok(key.into_documents())
    }

    /// Build the bundle for `request`.
    ///
    /// Per-document problems end up as warnings; only a malformed request or
    /// a failure to write the merged PDF is an error.
    pub async fn assemble(&self, request: &BundleRequest) -> Result<BundleResponse> {
        let started = Instant::now();
        let references = self.resolve(request)?;
        let fetched = self.fetcher.fetch_all(references).await;

        let merger = self.merger.clone();
        let result = tokio::task::spawn_blocking(move || merger.merge(&fetched))
            .await
            .map_err(|err| BundleError::pdf(format!("merge task failed: {err}")))??;

        let mut response = self.builder.build(&result);
        response.stats.elapsed_ms =
            u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        log::info!(
            "Bundle for case {}: {}/{} documents merged, {} pages, {} warnings, {} ms",
            request.case_id.trim(),
            response.stats.merged,
            response.stats.requested,
            response.stats.total_pages,
            response.warnings.len(),
            response.stats.elapsed_ms
        );
        Ok(response)
    }

    /// [`BundleService::assemble`] that stops as soon as `cancel` resolves.
    /// In-flight fetches are aborted and any partial merge is discarded.
    pub async fn assemble_or_cancel<F>(
        &self,
        request: &BundleRequest,
        cancel: F,
    ) -> Result<BundleResponse>
    where
        F: Future<Output = ()>,
    {
        tokio::select! {
            response = self.assemble(request) => response,
            () = cancel => {
                log::info!("Bundle for case {} cancelled", request.case_id.trim());
                Err(BundleError::Cancelled)
            }
        }
    }
}
