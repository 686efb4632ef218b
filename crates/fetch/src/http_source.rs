use crate::error::{FetchError, Result, SourceError};
use crate::source::DocumentSource;
use async_trait::async_trait;
use casebundle_catalog::DocumentReference;
use casebundle_protocol::ErrorKind;
use reqwest::{Client, StatusCode, Url};

/// Upstream PDF retrieval service.
///
/// Documents are requested as `GET {base}/{source system}/documents/{document id}`.
#[derive(Debug, Clone)]
pub struct HttpDocumentSource {
    client: Client,
    base_url: Url,
}

impl HttpDocumentSource {
    pub fn new(base_url: &str) -> std::result::Result<Self, SourceError> {
        let client = Client::builder().build()?;
        Self::with_client(client, base_url)
    }

    pub fn with_client(client: Client, base_url: &str) -> std::result::Result<Self, SourceError> {
        let parsed = Url::parse(base_url).map_err(|err| SourceError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: err.to_string(),
        })?;
        if parsed.cannot_be_a_base() {
            return Err(SourceError::InvalidBaseUrl {
                url: base_url.to_string(),
                reason: "URL cannot be a base".to_string(),
            });
        }
        Ok(Self {
            client,
            base_url: parsed,
        })
    }

    pub fn document_url(&self, reference: &DocumentReference) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| FetchError::unavailable(format!("cannot extend {}", self.base_url)))?
            .pop_if_empty()
            .extend([
                reference.source_system().as_str(),
                "documents",
                reference.document_id(),
            ]);
        Ok(url)
    }
}

/// Map a non-success status onto an error kind; `None` for success.
pub fn classify_status(status: StatusCode) -> Option<ErrorKind> {
    if status.is_success() {
        return None;
    }
    Some(match status {
        StatusCode::NOT_FOUND | StatusCode::GONE => ErrorKind::NotFound,
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ErrorKind::Unauthorized,
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => ErrorKind::Timeout,
        StatusCode::UNSUPPORTED_MEDIA_TYPE | StatusCode::UNPROCESSABLE_ENTITY => {
            ErrorKind::MalformedContent
        }
        _ => ErrorKind::UpstreamUnavailable,
    })
}

fn transport_error(url: &Url, err: reqwest::Error) -> FetchError {
    let kind = if err.is_timeout() {
        ErrorKind::Timeout
    } else {
        ErrorKind::UpstreamUnavailable
    };
    FetchError::new(kind, format!("GET {url}: {err}"))
}

#[async_trait]
impl DocumentSource for HttpDocumentSource {
    async fn fetch(&self, reference: &DocumentReference) -> Result<Vec<u8>> {
        let url = self.document_url(reference)?;
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|err| transport_error(&url, err))?;

        let status = response.status();
        if let Some(kind) = classify_status(status) {
            return Err(FetchError::new(kind, format!("GET {url}: HTTP {status}")));
        }

        let body = response
            .bytes()
            .await
            .map_err(|err| transport_error(&url, err))?;
        Ok(body.to_vec())
    }

    fn name(&self) -> &str {
        "http"
    }
}
