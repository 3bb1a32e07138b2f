//! Property-based tests for the pure stages of the pipeline.
//!
//! Case counts follow `PROPTEST_CASES` when set (default 64).

use chrono::NaiveDate;
use ctxpack::packer::{
    DocumentHeader, HeuristicEstimator, Minifier, PackedFile, TokenEstimator, WhitespaceMinifier,
    enforce_budget, render_document,
};
use proptest::prelude::*;

const DEFAULT_PROPTEST_CASES: u32 = 64;

fn proptest_config() -> ProptestConfig {
    let cases = std::env::var("PROPTEST_CASES")
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(DEFAULT_PROPTEST_CASES);
    ProptestConfig::with_cases(cases)
}

fn header() -> DocumentHeader {
    let generated = NaiveDate::from_ymd_opt(2025, 6, 1)
        .and_then(|d| d.and_hms_opt(12, 0, 0))
        .expect("valid timestamp");
    DocumentHeader::new("props", &[], generated, true)
}

/// Text made of short lines with frequent blank runs and stray whitespace.
fn messy_text() -> impl Strategy<Value = String> {
    prop::collection::vec(
        prop_oneof![
            Just(String::new()),
            Just("   ".to_string()),
            "[a-z ]{1,12}",
        ],
        0..40,
    )
    .prop_map(|lines| lines.join("\n"))
}

fn packed_files() -> impl Strategy<Value = Vec<PackedFile>> {
    prop::collection::vec((1usize..2_000, 0usize..3), 0..12).prop_map(|specs| {
        specs
            .into_iter()
            .enumerate()
            .map(|(i, (len, rank))| {
                let content = "word ".repeat(len / 5 + 1);
                PackedFile {
                    relative_path: format!("src/file_{i}.txt"),
                    packed_size: content.len(),
                    original_size: content.len(),
                    content,
                    priority: [0, 100, 1000][rank],
                }
            })
            .collect::<Vec<_>>()
    })
}

proptest! {
    #![proptest_config(proptest_config())]

    #[test]
    fn minify_is_idempotent(text in messy_text()) {
        let minifier = WhitespaceMinifier::default();
        let once = minifier.minify(&text, Some(".txt"));
        let twice = minifier.minify(&once, Some(".txt"));
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn minify_never_grows_content(text in messy_text()) {
        let once = WhitespaceMinifier::default().minify(&text, None);
        prop_assert!(once.len() <= text.len());
        prop_assert!(!once.contains("\n\n\n"));
    }

    #[test]
    fn estimate_is_monotonic_under_appending(base in "[a-z ]{0,200}", extra in "[a-z ]{0,200}") {
        let estimator = HeuristicEstimator::default();
        let combined = format!("{base}{extra}");
        prop_assert!(estimator.estimate(&combined) >= estimator.estimate(&base));
    }

    #[test]
    fn budget_never_grows_the_document(files in packed_files(), max_tokens in 1usize..5_000) {
        let mut sorted = files;
        sorted.sort_by_key(|f| f.priority);
        let header = header();
        let document = render_document(&header, &sorted);
        let estimator = HeuristicEstimator::default();

        let outcome = enforce_budget(
            document.clone(),
            sorted.clone(),
            max_tokens,
            &header,
            &estimator,
            50,
        );

        prop_assert!(outcome.files.len() <= sorted.len());
        prop_assert!(outcome.document.len() <= document.len());
        prop_assert!(outcome.tokens_after <= outcome.tokens_before);
        prop_assert_eq!(outcome.removed, sorted.len() - outcome.files.len());
        // Survivors are a prefix of the priority-ordered input.
        prop_assert_eq!(&outcome.files[..], &sorted[..outcome.files.len()]);
    }
}

#[test]
fn empty_text_estimates_to_zero() {
    assert_eq!(HeuristicEstimator::default().estimate(""), 0);
}
