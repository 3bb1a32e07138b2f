// Copyright (c) 2025-2026 the ctxpack contributors
// SPDX-License-Identifier: Apache-2.0

use console::Term;
use indicatif::{ProgressBar, ProgressStyle};

const PACKING_TEMPLATE: &str =
    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} Packing... {wide_msg}";

/// Progress bar for the read/minify phase.
///
/// The length is set by the packer once discovery finishes. When stdout is
/// not a terminal, or `quiet` is set, the bar is hidden and prints nothing.
#[must_use]
pub fn packing_progress(quiet: bool) -> ProgressBar {
    if quiet || !Term::stdout().is_term() {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new(0);
    pb.set_style(packing_style());
    pb
}

fn packing_style() -> ProgressStyle {
    ProgressStyle::default_bar()
        .template(PACKING_TEMPLATE)
        .unwrap_or_else(|e| {
            tracing::warn!("Failed to parse progress bar template: {e}");
            ProgressStyle::default_bar()
        })
        .progress_chars("#>-")
}
