// Copyright (c) 2025-2026 the ctxpack contributors
// SPDX-License-Identifier: Apache-2.0

//! Terminal reports for a finished pack and for list-only runs.

use crate::packer::config::PRIORITY_PATH_SCORE;
use crate::packer::{ContextPack, format_tokens};
use crate::utils::formatting::{format_number, format_ratio, format_size};
use anyhow::Result;
use console::{Term, style};
use std::io::Write;
use std::path::Path;

const BRANCH: &str = "\u{251c}\u{2500}";
const LAST_BRANCH: &str = "\u{2514}\u{2500}";

/// Display the run report: file counts, sizes, compression and tokens.
///
/// # Errors
///
/// Returns an error if writing to the terminal fails.
pub fn display_pack_summary(pack: &ContextPack, output_path: &Path, quiet: bool) -> Result<()> {
    if quiet {
        return Ok(());
    }

    let mut term = Term::stdout();
    for line in summary_lines(pack) {
        writeln!(term, "{}", line)?;
    }
    writeln!(term)?;
    writeln!(
        term,
        "{} Saved to {}",
        style("\u{2713}").green().bold(),
        output_path.display()
    )?;

    Ok(())
}

/// Report body without styling, one entry per line.
pub fn summary_lines(pack: &ContextPack) -> Vec<String> {
    let stats = &pack.stats;
    let mut lines = vec![
        String::new(),
        format!("{}:", style("Pack Summary").bold()),
        format!("{} Files discovered: {}", style(BRANCH).dim(), format_number(stats.total_files)),
        format!("{} Files included: {}", style(BRANCH).dim(), format_number(stats.included_files)),
        format!("{} Files excluded: {}", style(BRANCH).dim(), format_number(stats.excluded_files)),
    ];

    if stats.failed_files > 0 {
        lines.push(format!(
            "{} Files failed: {}",
            style(BRANCH).dim(),
            style(format_number(stats.failed_files)).yellow()
        ));
    }
    if stats.trimmed_files > 0 {
        lines.push(format!(
            "{} Files trimmed for budget: {}",
            style(BRANCH).dim(),
            style(format_number(stats.trimmed_files)).yellow()
        ));
    }

    lines.push(format!(
        "{} Original size: {}",
        style(BRANCH).dim(),
        format_size(stats.original_size)
    ));
    lines.push(format!(
        "{} Packed size: {}",
        style(BRANCH).dim(),
        format_size(stats.packed_size)
    ));
    lines.push(format!(
        "{} Compression: {}%",
        style(BRANCH).dim(),
        format_ratio(stats.compression_ratio(), stats.original_size)
    ));
    lines.push(format!(
        "{} Estimated tokens: {} ({})",
        style(LAST_BRANCH).dim(),
        style(format_tokens(pack.estimated_tokens)).green(),
        format_number(pack.estimated_tokens)
    ));

    lines
}

/// Print discovered files for `--list-only`, starring pattern matches.
///
/// # Errors
///
/// Returns an error if writing to the terminal fails.
pub fn display_file_list(entries: &[(String, usize)]) -> Result<()> {
    let mut term = Term::stdout();
    writeln!(
        term,
        "{} {} files discovered",
        style("\u{2192}").cyan(),
        format_number(entries.len())
    )?;
    writeln!(term)?;

    for (path, priority) in entries {
        let marker = if *priority < PRIORITY_PATH_SCORE {
            style("*").yellow().bold().to_string()
        } else {
            " ".to_string()
        };
        writeln!(term, "  {} {}", marker, path)?;
    }

    Ok(())
}
