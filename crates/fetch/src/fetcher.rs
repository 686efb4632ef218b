use crate::config::FetchConfig;
use crate::error::{FetchCancelled, FetchError, Result};
use crate::source::DocumentSource;
use casebundle_catalog::DocumentReference;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

const PDF_MAGIC: &[u8] = b"%PDF-";
// Leading garbage before the header is tolerated by most readers.
const PDF_MAGIC_WINDOW: usize = 1024;

/// A reference paired with what its fetch produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedDocument {
    pub reference: DocumentReference,
    pub outcome: std::result::Result<Vec<u8>, FetchError>,
}

impl FetchedDocument {
    pub fn ok(reference: DocumentReference, bytes: Vec<u8>) -> Self {
        Self {
            reference,
            outcome: Ok(bytes),
        }
    }

    pub fn failed(reference: DocumentReference, error: FetchError) -> Self {
        Self {
            reference,
            outcome: Err(error),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.outcome.is_ok()
    }

    pub fn bytes(&self) -> Option<&[u8]> {
        self.outcome.as_deref().ok()
    }

    pub fn error(&self) -> Option<&FetchError> {
        self.outcome.as_ref().err()
    }
}

/// Concurrent, order-preserving retrieval of a bundle's documents.
#[derive(Clone)]
pub struct Fetcher {
    source: Arc<dyn DocumentSource>,
    config: FetchConfig,
}

impl std::fmt::Debug for Fetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Fetcher")
            .field("source", &self.source.name())
            .field("config", &self.config)
            .finish()
    }
}

impl Fetcher {
    pub fn new(source: Arc<dyn DocumentSource>, config: FetchConfig) -> Self {
        Self {
            source,
            config: config.normalized(),
        }
    }

    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    /// Fetch every reference; output order always equals input order.
    ///
    /// At most `max_concurrency` fetches are in flight; the rest wait for a
    /// permit. Failures are captured per document. Dropping the returned
    /// future aborts every outstanding fetch.
    pub async fn fetch_all(&self, references: Vec<DocumentReference>) -> Vec<FetchedDocument> {
        if references.is_empty() {
            return Vec::new();
        }

        let started = Instant::now();
        let permits = Arc::new(Semaphore::new(self.config.max_concurrency));
        let mut join = JoinSet::new();

        for (idx, reference) in references.iter().cloned().enumerate() {
            let source = Arc::clone(&self.source);
            let permits = Arc::clone(&permits);
            let config = self.config.clone();
            join.spawn(async move {
                // The semaphore lives as long as this call and is never closed.
                let _permit = permits.acquire_owned().await.ok();
                let outcome = fetch_with_retry(source.as_ref(), &reference, &config).await;
                (idx, outcome)
            });
        }

        let mut slots: Vec<Option<Result<Vec<u8>>>> = (0..references.len()).map(|_| None).collect();
        while let Some(joined) = join.join_next().await {
            match joined {
                Ok((idx, outcome)) => slots[idx] = Some(outcome),
                Err(err) => log::warn!("Fetch task ended abnormally: {err}"),
            }
        }

        let fetched: Vec<FetchedDocument> = references
            .into_iter()
            .zip(slots)
            .map(|(reference, slot)| {
                let outcome = slot.unwrap_or_else(|| {
                    Err(FetchError::unavailable(format!(
                        "fetch task for {reference} did not complete"
                    )))
                });
                FetchedDocument { reference, outcome }
            })
            .collect();

        let failed = fetched.iter().filter(|d| !d.is_ok()).count();
        log::debug!(
            "Fetched {} documents via {} in {} ms ({failed} failed)",
            fetched.len(),
            self.source.name(),
            started.elapsed().as_millis()
        );
        fetched
    }

    /// [`Fetcher::fetch_all`] that gives up as soon as `cancel` resolves.
    /// Outstanding fetches are aborted and nothing partial is returned.
    pub async fn fetch_all_or_cancel<F>(
        &self,
        references: Vec<DocumentReference>,
        cancel: F,
    ) -> std::result::Result<Vec<FetchedDocument>, FetchCancelled>
    where
        F: Future<Output = ()>,
    {
        tokio::select! {
            fetched = self.fetch_all(references) => Ok(fetched),
            () = cancel => {
                log::info!("Bundle fetch cancelled; aborting in-flight requests");
                Err(FetchCancelled)
            }
        }
    }
}

async fn fetch_once(
    source: &dyn DocumentSource,
    reference: &DocumentReference,
    config: &FetchConfig,
) -> Result<Vec<u8>> {
    let timeout = config.timeout();
    let bytes = match tokio::time::timeout(timeout, source.fetch(reference)).await {
        Ok(result) => result?,
        Err(_) => {
            return Err(FetchError::timeout(format!(
                "{reference} not received within {} ms",
                timeout.as_millis()
            )))
        }
    };
    check_pdf_header(reference, &bytes)?;
    Ok(bytes)
}

async fn fetch_with_retry(
    source: &dyn DocumentSource,
    reference: &DocumentReference,
    config: &FetchConfig,
) -> Result<Vec<u8>> {
    let mut attempt = 0u32;
    loop {
        let started = Instant::now();
        match fetch_once(source, reference, config).await {
            Ok(bytes) => {
                log::debug!(
                    "Fetched {reference} ({} bytes, {} ms)",
                    bytes.len(),
                    started.elapsed().as_millis()
                );
                return Ok(bytes);
            }
            Err(err) if err.is_retryable() && attempt < config.max_retries => {
                attempt += 1;
                log::warn!(
                    "Fetching {reference} failed ({err}); retry {attempt}/{}",
                    config.max_retries
                );
                tokio::time::sleep(config.retry_backoff()).await;
            }
            Err(err) => {
                log::warn!("Fetching {reference} failed: {err}");
                return Err(err);
            }
        }
    }
}

fn check_pdf_header(reference: &DocumentReference, bytes: &[u8]) -> Result<()> {
    let window = &bytes[..bytes.len().min(PDF_MAGIC_WINDOW)];
    if window.windows(PDF_MAGIC.len()).any(|w| w == PDF_MAGIC) {
        Ok(())
    } else {
        Err(FetchError::malformed(format!(
            "{reference} is not a PDF ({} bytes, no %PDF- header)",
            bytes.len()
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use casebundle_catalog::{RawDocument, SourceSystem};

    fn reference(id: &str) -> DocumentReference {
        DocumentReference::resolve(
            SourceSystem::Criminal,
            RawDocument {
                document_id: id.to_string(),
                ..Default::default()
            },
        )
        .unwrap()
    }

    #[test]
    fn header_check_accepts_pdf_and_rejects_other_bytes() {
        let doc = reference("1");
        assert!(check_pdf_header(&doc, b"%PDF-1.7\n...").is_ok());
        assert!(check_pdf_header(&doc, b"\xEF\xBB\xBF%PDF-1.4").is_ok());
        assert_eq!(
            check_pdf_header(&doc, b"<html>oops</html>").unwrap_err().kind,
            casebundle_protocol::ErrorKind::MalformedContent
        );
        assert!(check_pdf_header(&doc, b"").is_err());
    }

    #[test]
    fn fetched_document_accessors() {
        let ok = FetchedDocument::ok(reference("1"), b"%PDF-".to_vec());
        assert!(ok.is_ok());
        assert_eq!(ok.bytes(), Some(&b"%PDF-"[..]));
        assert!(ok.error().is_none());

        let failed = FetchedDocument::failed(reference("2"), FetchError::not_found("gone"));
        assert!(!failed.is_ok());
        assert_eq!(failed.bytes(), None);
        assert_eq!(failed.error().map(|e| e.message.as_str()), Some("gone"));
    }
}
