use crate::error::{BundleError, Result};
use crate::result::{BundleResult, DocumentFailure, MergedDocument};
use casebundle_catalog::DocumentReference;
use casebundle_fetch::{FetchError, FetchedDocument};
use casebundle_protocol::PageRange;
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId};

const PDF_VERSION: &str = "1.5";

// Page attributes a page may inherit from its ancestors in the page tree.
const INHERITABLE: &[&[u8]] = &[b"Resources", b"MediaBox", b"CropBox", b"Rotate"];
const MAX_TREE_DEPTH: usize = 64;

/// A parsed source document ready for concatenation.
struct LoadedDocument {
    reference: DocumentReference,
    document: Document,
    page_count: u32,
}

fn object_type(object: &Object) -> Option<&[u8]> {
    object
        .as_dict()
        .ok()?
        .get(b"Type")
        .ok()?
        .as_name()
        .ok()
}

fn load(reference: &DocumentReference, bytes: &[u8]) -> std::result::Result<Document, FetchError> {
    let document = Document::load_mem(bytes)
        .map_err(|err| FetchError::malformed(format!("{reference} could not be parsed: {err}")))?;
    if document.is_encrypted() {
        return Err(FetchError::malformed(format!("{reference} is encrypted")));
    }
    let pages = document.get_pages();
    if pages.is_empty() {
        return Err(FetchError::malformed(format!("{reference} has no pages")));
    }
    // A page we cannot copy would shift every later page range.
    if let Some((number, _)) = pages
        .iter()
        .find(|(_, id)| document.get_dictionary(**id).is_err())
    {
        return Err(FetchError::malformed(format!(
            "{reference} page {number} is not a dictionary"
        )));
    }
    Ok(document)
}

/// Copy attributes inherited through the page tree onto the page itself,
/// since the source page tree is not carried into the merged output.
fn flatten_inherited(document: &Document, page: &mut Dictionary) {
    let mut parent = page.get(b"Parent").and_then(Object::as_reference).ok();
    let mut depth = 0;
    while let Some(parent_id) = parent {
        depth += 1;
        if depth > MAX_TREE_DEPTH {
            break;
        }
        let Ok(node) = document.get_dictionary(parent_id) else {
            break;
        };
        for key in INHERITABLE {
            if !page.has(key) {
                if let Ok(value) = node.get(key) {
                    page.set(key.to_vec(), value.clone());
                }
            }
        }
        parent = node.get(b"Parent").and_then(Object::as_reference).ok();
    }
}

/// Concatenates fetched PDFs in input order and records where each one
/// landed.
#[derive(Debug, Clone, Default)]
pub struct PdfMerger;

impl PdfMerger {
    pub fn new() -> Self {
        Self
    }

    /// Merge every successfully fetched document.
    ///
    /// Failed fetches and unreadable PDFs are reported in
    /// [`BundleResult::failures`] and contribute no pages. The output is a
    /// pure function of the input bytes.
    pub fn merge(&self, fetched: &[FetchedDocument]) -> Result<BundleResult> {
        let mut loaded = Vec::new();
        let mut failures = Vec::new();

        for item in fetched {
            let outcome = match &item.outcome {
                Ok(bytes) => load(&item.reference, bytes),
                Err(err) => Err(err.clone()),
            };
            match outcome {
                Ok(document) => {
                    let page_count = u32::try_from(document.get_pages().len()).map_err(|_| {
                        BundleError::pdf(format!("{} has too many pages", item.reference))
                    })?;
                    loaded.push(LoadedDocument {
                        reference: item.reference.clone(),
                        document,
                        page_count,
                    });
                }
                Err(error) => {
                    log::debug!("Skipping {} in bundle: {error}", item.reference);
                    failures.push(DocumentFailure {
                        reference: item.reference.clone(),
                        error,
                    });
                }
            }
        }

        if loaded.is_empty() {
            return Ok(BundleResult {
                merged_pdf: Vec::new(),
                merged: Vec::new(),
                failures,
            });
        }

        let mut merged = Vec::with_capacity(loaded.len());
        let mut running_pages = 0u32;
        for doc in &loaded {
            let range = PageRange {
                start: running_pages + 1,
                end: running_pages + doc.page_count,
            };
            running_pages = range.end;
            merged.push(MergedDocument {
                reference: doc.reference.clone(),
                range,
            });
        }

        let merged_pdf = concatenate(loaded)?;
        Ok(BundleResult {
            merged_pdf,
            merged,
            failures,
        })
    }
}

fn concatenate(loaded: Vec<LoadedDocument>) -> Result<Vec<u8>> {
    let mut output = Document::with_version(PDF_VERSION);
    let mut next_id: u32 = 1;
    let mut kids: Vec<(ObjectId, Dictionary)> = Vec::new();

    for LoadedDocument { mut document, .. } in loaded {
        document.renumber_objects_with(next_id);
        next_id = document.max_id + 1;

        for page_id in document.get_pages().into_values() {
            let Ok(page) = document.get_dictionary(page_id) else {
                continue;
            };
            let mut page = page.clone();
            flatten_inherited(&document, &mut page);
            kids.push((page_id, page));
        }

        for (object_id, object) in document.objects {
            match object_type(&object) {
                Some(b"Catalog" | b"Pages" | b"Page" | b"Outlines" | b"Outline") => {}
                _ => {
                    output.objects.insert(object_id, object);
                }
            }
        }
    }

    output.max_id = next_id;
    let pages_id = output.new_object_id();

    let mut kid_refs = Vec::with_capacity(kids.len());
    for (page_id, mut page) in kids {
        page.set("Parent", Object::Reference(pages_id));
        output.objects.insert(page_id, Object::Dictionary(page));
        kid_refs.push(Object::Reference(page_id));
    }

    let count = i64::try_from(kid_refs.len()).map_err(|_| BundleError::pdf("page count overflow"))?;
    output.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kid_refs,
            "Count" => count,
        }),
    );
    let catalog_id = output.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    output.trailer.set("Root", catalog_id);
    output.renumber_objects();

    let mut buf = Vec::new();
    output
        .save_to(&mut buf)
        .map_err(|err| BundleError::pdf(format!("failed to write merged PDF: {err}")))?;
    Ok(buf)
}

/// A document of `page_count` empty US Letter pages. Used to seed tests and
/// fixtures.
pub fn blank_pdf(page_count: usize) -> Result<Vec<u8>> {
    let mut doc = Document::with_version(PDF_VERSION);
    let pages_id: ObjectId = doc.new_object_id();

    let mut page_ids: Vec<Object> = Vec::with_capacity(page_count);
    for _ in 0..page_count {
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        });
        page_ids.push(page_id.into());
    }

    let count = i64::try_from(page_count).map_err(|_| BundleError::pdf("page count overflow"))?;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => page_ids,
            "Count" => count,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buf = Vec::new();
    doc.save_to(&mut buf)
        .map_err(|err| BundleError::pdf(format!("failed to write PDF: {err}")))?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use casebundle_catalog::{RawDocument, SourceSystem};
    use casebundle_protocol::ErrorKind;
    use pretty_assertions::assert_eq;

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

    fn ok(id: &str, pages: usize) -> FetchedDocument {
        FetchedDocument::ok(reference(id), blank_pdf(pages).unwrap())
    }

    fn failed(id: &str, kind: ErrorKind) -> FetchedDocument {
        FetchedDocument::failed(reference(id), FetchError::new(kind, "upstream said no"))
    }

    fn page_count(bytes: &[u8]) -> usize {
        Document::load_mem(bytes).unwrap().get_pages().len()
    }

    #[test]
    fn blank_pdf_has_requested_pages() {
        assert_eq!(page_count(&blank_pdf(3).unwrap()), 3);
    }

    #[test]
    fn three_and_five_pages_give_adjacent_ranges() {
        let result = PdfMerger::new().merge(&[ok("a", 3), ok("b", 5)]).unwrap();

        assert_eq!(
            result.page_ranges(),
            vec![PageRange { start: 1, end: 3 }, PageRange { start: 4, end: 8 }]
        );
        assert_eq!(result.total_pages(), 8);
        assert!(result.failures().is_empty());
        assert_eq!(page_count(result.merged_pdf()), 8);
    }

    #[test]
    fn failed_fetches_are_skipped_and_reported() {
        let result = PdfMerger::new()
            .merge(&[ok("a", 2), failed("b", ErrorKind::NotFound), ok("c", 1)])
            .unwrap();

        assert_eq!(
            result.page_ranges(),
            vec![PageRange { start: 1, end: 2 }, PageRange { start: 3, end: 3 }]
        );
        assert_eq!(result.failures().len(), 1);
        assert_eq!(result.failures()[0].reference.document_id(), "b");
        assert_eq!(result.failures()[0].error.kind, ErrorKind::NotFound);
        assert_eq!(result.document_count(), 3);
    }

    #[test]
    fn unreadable_pdf_is_excluded_as_malformed() {
        let garbage = FetchedDocument::ok(reference("x"), b"%PDF-1.4 truncated".to_vec());
        let result = PdfMerger::new().merge(&[garbage, ok("a", 2)]).unwrap();

        assert_eq!(result.page_ranges(), vec![PageRange { start: 1, end: 2 }]);
        assert_eq!(result.failures()[0].error.kind, ErrorKind::MalformedContent);
        assert_eq!(page_count(result.merged_pdf()), 2);
    }

    #[test]
    fn all_failures_give_empty_output() {
        let result = PdfMerger::new()
            .merge(&[
                failed("1", ErrorKind::NotFound),
                failed("2", ErrorKind::NotFound),
                failed("3", ErrorKind::NotFound),
            ])
            .unwrap();

        assert!(result.is_empty());
        assert!(result.merged_pdf().is_empty());
        assert!(result.page_ranges().is_empty());
        assert_eq!(result.failures().len(), 3);
        assert_eq!(result.total_pages(), 0);
    }

    #[test]
    fn merge_is_byte_for_byte_repeatable() {
        let input = vec![ok("a", 2), failed("b", ErrorKind::Timeout), ok("c", 4)];
        let merger = PdfMerger::new();
        let first = merger.merge(&input).unwrap();
        let second = merger.merge(&input).unwrap();

        assert_eq!(first.merged_pdf(), second.merged_pdf());
        assert_eq!(first.page_ranges(), second.page_ranges());
    }

    #[test]
    fn inherited_media_box_survives_the_merge() {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![Object::from(page_id)],
                "Count" => 1i64,
                "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).unwrap();

        let result = PdfMerger::new()
            .merge(&[FetchedDocument::ok(reference("a4"), bytes), ok("letter", 1)])
            .unwrap();

        let merged = Document::load_mem(result.merged_pdf()).unwrap();
        let pages = merged.get_pages();
        let first = merged.get_dictionary(pages[&1]).unwrap();
        let media_box = first.get(b"MediaBox").unwrap().as_array().unwrap();
        assert_eq!(media_box[2].as_i64().unwrap(), 595);
    }
}
