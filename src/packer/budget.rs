// Copyright (c) 2025-2026 the ctxpack contributors
// SPDX-License-Identifier: Apache-2.0

//! Token budget enforcement.
//!
//! Trimming drops whole files from the back of the priority-sorted sequence.
//! The cost of each dropped file is approximated as its content estimate plus
//! a fixed per-record overhead, and the document is only re-rendered once, so
//! the final estimate can land slightly above or below the ceiling.

use super::PackedFile;
use super::output::{DocumentHeader, render_document};
use super::tokenizer::TokenEstimator;

/// What enforcement did to a document.
#[derive(Debug, Clone)]
pub struct BudgetOutcome {
    pub document: String,
    /// Surviving files, still in priority order
    pub files: Vec<PackedFile>,
    /// Number of files dropped from the back
    pub removed: usize,
    /// Estimate of the document before trimming
    pub tokens_before: usize,
    /// Estimate of the returned document
    pub tokens_after: usize,
}

/// How many leading files of `files` to keep so that the approximate
/// document cost fits in `max_tokens`.
///
/// Starting from `document_tokens`, the cost of the last remaining file is
/// subtracted until the running total is at or below the ceiling or nothing
/// is left. Keeping zero files is a valid answer.
pub fn plan_trim(
    files: &[PackedFile],
    document_tokens: usize,
    max_tokens: usize,
    estimator: &dyn TokenEstimator,
    record_overhead: usize,
) -> usize {
    let mut running = document_tokens;
    let mut keep = files.len();

    for file in files.iter().rev() {
        if running <= max_tokens {
            break;
        }
        running = running.saturating_sub(estimator.estimate(&file.content) + record_overhead);
        keep -= 1;
    }

    keep
}

/// Trim `files` to fit `max_tokens` and re-render `document` if anything was
/// dropped. A document already within budget is returned unchanged.
pub fn enforce_budget(
    document: String,
    mut files: Vec<PackedFile>,
    max_tokens: usize,
    header: &DocumentHeader,
    estimator: &dyn TokenEstimator,
    record_overhead: usize,
) -> BudgetOutcome {
    let tokens_before = estimator.estimate(&document);
    let keep = plan_trim(&files, tokens_before, max_tokens, estimator, record_overhead);

    if keep == files.len() {
        return BudgetOutcome {
            document,
            files,
            removed: 0,
            tokens_before,
            tokens_after: tokens_before,
        };
    }

    let removed = files.len() - keep;
    files.truncate(keep);
    let document = render_document(header, &files);
    let tokens_after = estimator.estimate(&document);

    tracing::info!(
        "Token budget {} exceeded ({} estimated); removed {} lowest-priority files, now {}",
        max_tokens,
        tokens_before,
        removed,
        tokens_after
    );

    BudgetOutcome {
        document,
        files,
        removed,
        tokens_before,
        tokens_after,
    }
}
