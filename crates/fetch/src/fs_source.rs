use crate::error::{FetchError, Result, SourceError};
use crate::source::DocumentSource;
use async_trait::async_trait;
use casebundle_catalog::DocumentReference;
use std::io;
use std::path::{Component, Path, PathBuf};

/// Documents stored as files under a mounted share.
///
/// Layout: `<root>/<source system>/<document id>.pdf`, falling back to
/// `<root>/<document id>.pdf`.
#[derive(Debug, Clone)]
pub struct FsDocumentSource {
    root: PathBuf,
}

impl FsDocumentSource {
    pub fn new(root: impl AsRef<Path>) -> std::result::Result<Self, SourceError> {
        let root = root.as_ref();
        if !root.is_dir() {
            return Err(SourceError::MissingRoot(root.display().to_string()));
        }
        Ok(Self {
            root: root.to_path_buf(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn candidates(&self, reference: &DocumentReference) -> Result<Vec<PathBuf>> {
        let file_name = document_file_name(reference.document_id())?;
        Ok(vec![
            self.root
                .join(reference.source_system().as_str())
                .join(&file_name),
            self.root.join(&file_name),
        ])
    }
}

fn document_file_name(document_id: &str) -> Result<String> {
    let rel = Path::new(document_id);
    let mut components = rel.components();
    let single_normal = matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    );
    if !single_normal || document_id.contains(['/', '\\']) {
        return Err(FetchError::not_found(format!(
            "document id '{document_id}' is not a plain file name"
        )));
    }

    if document_id.to_ascii_lowercase().ends_with(".pdf") {
        Ok(document_id.to_string())
    } else {
        Ok(format!("{document_id}.pdf"))
    }
}

fn classify_io_error(path: &Path, err: &io::Error) -> FetchError {
    match err.kind() {
        io::ErrorKind::NotFound => {
            FetchError::not_found(format!("{} does not exist", path.display()))
        }
        io::ErrorKind::PermissionDenied => {
            FetchError::unauthorized(format!("access to {} denied", path.display()))
        }
        io::ErrorKind::TimedOut => {
            FetchError::timeout(format!("reading {} timed out", path.display()))
        }
        _ => FetchError::unavailable(format!("failed to read {}: {err}", path.display())),
    }
}

#[async_trait]
impl DocumentSource for FsDocumentSource {
    async fn fetch(&self, reference: &DocumentReference) -> Result<Vec<u8>> {
        let mut last_error = None;
        for path in self.candidates(reference)? {
            match tokio::fs::read(&path).await {
                Ok(bytes) => {
                    log::debug!("Read {} ({} bytes)", path.display(), bytes.len());
                    return Ok(bytes);
                }
                Err(err) if err.kind() == io::ErrorKind::NotFound => {
                    last_error = Some(classify_io_error(&path, &err));
                }
                Err(err) => return Err(classify_io_error(&path, &err)),
            }
        }
        Err(last_error
            .unwrap_or_else(|| FetchError::not_found(format!("{reference} has no file"))))
    }

    fn name(&self) -> &str {
        "filesystem"
    }
}
