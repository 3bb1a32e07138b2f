// Copyright (c) 2025-2026 the ctxpack contributors
// SPDX-License-Identifier: Apache-2.0

use std::sync::LazyLock;

use regex::Regex;

use super::config::DEFAULT_LARGE_FILE_THRESHOLD;

/// Three or more consecutive line breaks.
static BLANK_RUN_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{3,}").expect("Invalid blank-run regex"));

/// Text transform applied to every file before it is packed.
///
/// Implementations must be deterministic and idempotent, and must never make
/// content longer.
pub trait Minifier: Send + Sync {
    /// Transform `content`. `extension` is the lowercased file extension
    /// with its leading dot, when the file has one.
    fn minify(&self, content: &str, extension: Option<&str>) -> String;
}

/// Collapses blank-line runs and trims the edges of a file.
///
/// Never touches the inside of a line and treats all file types alike.
#[derive(Debug, Clone)]
pub struct WhitespaceMinifier {
    enabled: bool,
    large_file_threshold: usize,
}

impl WhitespaceMinifier {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            large_file_threshold: DEFAULT_LARGE_FILE_THRESHOLD,
        }
    }

    /// Files longer than `chars` characters skip the blank-run collapse.
    pub fn with_large_file_threshold(mut self, chars: usize) -> Self {
        self.large_file_threshold = chars;
        self
    }
}

impl Default for WhitespaceMinifier {
    fn default() -> Self {
        Self::new(true)
    }
}

impl Minifier for WhitespaceMinifier {
    fn minify(&self, content: &str, _extension: Option<&str>) -> String {
        if !self.enabled {
            return content.to_string();
        }

        // The threshold is measured after trimming so a second pass makes
        // the same decision as the first.
        let trimmed = content.trim();
        if trimmed.chars().count() > self.large_file_threshold {
            return trimmed.to_string();
        }

        BLANK_RUN_REGEX
            .replace_all(trimmed, "\n\n")
            .trim()
            .to_string()
    }
}
