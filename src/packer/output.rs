// Copyright (c) 2025-2026 the ctxpack contributors
// SPDX-License-Identifier: Apache-2.0

//! Document assembly.
//!
//! Rendering is purely structural: the same header and file sequence always
//! produce the same bytes. Paths and contents are written verbatim.

use chrono::NaiveDateTime;

use super::PackedFile;

/// Target description used when no targets were requested.
pub const WHOLE_PROJECT: &str = "whole project";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Run metadata written into the `<meta>` block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentHeader {
    /// Base name of the project root
    pub project: String,
    /// Comma-joined targets, or [`WHOLE_PROJECT`]
    pub target: String,
    pub generated: NaiveDateTime,
    pub minified: bool,
}

impl DocumentHeader {
    pub fn new(
        project: impl Into<String>,
        targets: &[String],
        generated: NaiveDateTime,
        minified: bool,
    ) -> Self {
        let target = if targets.is_empty() {
            WHOLE_PROJECT.to_string()
        } else {
            targets.join(", ")
        };
        Self {
            project: project.into(),
            target,
            generated,
            minified,
        }
    }

    fn render(&self, files_count: usize) -> String {
        format!(
            "<context_pack>\n<meta>\n  <project>{}</project>\n  <target>{}</target>\n  <generated>{}</generated>\n  <files_count>{}</files_count>\n  <minified>{}</minified>\n</meta>\n",
            self.project,
            self.target,
            self.generated.format(TIMESTAMP_FORMAT),
            files_count,
            if self.minified { "yes" } else { "no" },
        )
    }
}

/// Serialize `files` (already in final order) into a context document.
pub fn render_document(header: &DocumentHeader, files: &[PackedFile]) -> String {
    let content_len: usize = files
        .iter()
        .map(|f| f.content.len() + 2 * f.relative_path.len() + 32)
        .sum();
    let mut out = String::with_capacity(content_len + 512);

    out.push_str(&header.render(files.len()));
    out.push('\n');

    out.push_str("<file_list>\n");
    for file in files {
        out.push_str("  - ");
        out.push_str(&file.relative_path);
        out.push('\n');
    }
    out.push_str("</file_list>\n\n<files>");

    for file in files {
        out.push_str("\n\n<file path=\"");
        out.push_str(&file.relative_path);
        out.push_str("\">\n");
        out.push_str(&file.content);
        out.push_str("\n</file>");
    }
    out.push_str("\n\n</files>");

    out
}
