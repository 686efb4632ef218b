use casebundle_bundle::{blank_pdf, PdfMerger};
use casebundle_catalog::{DocumentReference, RawDocument, SourceSystem};
use casebundle_fetch::{FetchError, FetchedDocument};
use proptest::prelude::*;

fn reference(index: usize) -> DocumentReference {
    DocumentReference::resolve(
        SourceSystem::Transitory,
        RawDocument {
            document_id: format!("doc-{index}"),
            ..Default::default()
        },
    )
    .unwrap()
}

// `None` is a failed fetch, `Some(n)` a PDF with n pages.
fn inputs() -> impl Strategy<Value = Vec<Option<usize>>> {
    prop::collection::vec(prop::option::weighted(0.75, 1usize..5), 0..8)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn ranges_are_contiguous_and_cover_every_page(plan in inputs()) {
        let fetched: Vec<FetchedDocument> = plan
            .iter()
            .enumerate()
            .map(|(i, pages)| match pages {
                Some(n) => FetchedDocument::ok(reference(i), blank_pdf(*n).unwrap()),
                None => FetchedDocument::failed(reference(i), FetchError::timeout("slow")),
            })
            .collect();

        let result = PdfMerger::new().merge(&fetched).unwrap();
        let expected: Vec<usize> = plan.iter().flatten().copied().collect();
        let ranges = result.page_ranges();

        prop_assert_eq!(ranges.len(), expected.len());
        prop_assert_eq!(result.failures().len(), plan.len() - expected.len());

        let mut next = 1u32;
        for (range, pages) in ranges.iter().zip(&expected) {
            prop_assert_eq!(range.start, next);
            prop_assert_eq!(range.len() as usize, *pages);
            next = range.end + 1;
        }
        prop_assert_eq!(result.total_pages() as usize, expected.iter().sum::<usize>());
        prop_assert_eq!(result.merged_pdf().is_empty(), expected.is_empty());
    }
}
