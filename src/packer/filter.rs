// Copyright (c) 2025-2026 the ctxpack contributors
// SPDX-License-Identifier: Apache-2.0

//! Exclusion and priority decisions.
//!
//! Everything here is a pure function of the [`PackerConfig`] and the path
//! being asked about, apart from the single `stat` call needed to enforce
//! the size cap.

use std::path::Path;

use super::ExclusionReason;
use super::config::{DEFAULT_SCORE, PRIORITY_PATH_SCORE, PackerConfig};

/// Directory names starting with this are treated as private and pruned.
const PRIVATE_PREFIX: char = '.';

#[derive(Debug, Clone, Copy)]
pub struct FileFilter<'a> {
    config: &'a PackerConfig,
}

impl<'a> FileFilter<'a> {
    pub fn new(config: &'a PackerConfig) -> Self {
        Self { config }
    }

    pub fn should_exclude_dir(&self, name: &str) -> bool {
        self.config.excluded_dirs().contains(name) || name.starts_with(PRIVATE_PREFIX)
    }

    /// Why `path` is excluded, or `None` if it is eligible.
    ///
    /// Checks the base name, then the extension (case-insensitive), then the
    /// size. A file whose size cannot be read is excluded.
    pub fn exclusion_reason(&self, path: &Path) -> Option<ExclusionReason> {
        let name = path.file_name().map(|n| n.to_string_lossy());
        if let Some(name) = &name
            && self.config.excluded_files().contains(name.as_ref())
        {
            return Some(ExclusionReason::ExcludedName);
        }

        if let Some(ext) = extension_of(path)
            && self.config.excluded_extensions().contains(&ext)
        {
            return Some(ExclusionReason::ExcludedExtension);
        }

        match std::fs::metadata(path) {
            Ok(metadata) if metadata.len() > self.config.max_file_bytes() => {
                Some(ExclusionReason::TooLarge {
                    size: metadata.len(),
                    limit: self.config.max_file_bytes(),
                })
            }
            Ok(_) => None,
            Err(e) => {
                tracing::debug!("Cannot stat {}: {}", path.display(), e);
                Some(ExclusionReason::Unreadable)
            }
        }
    }

    /// Whether a POSIX relative path matches one of the configured globs.
    pub fn is_glob_excluded(&self, relative_path: &str) -> bool {
        self.config.exclude_globs().is_match(relative_path)
    }

    /// True if `relative_path` equals or is nested under a priority path.
    ///
    /// Comparison is case-insensitive and treats `\` as `/`.
    pub fn is_priority_path(&self, relative_path: &str) -> bool {
        let candidate = relative_path.replace('\\', "/").to_lowercase();
        self.config.priority_paths().iter().any(|priority| {
            let priority = priority.to_lowercase();
            candidate == priority
                || candidate
                    .strip_prefix(priority.as_str())
                    .is_some_and(|rest| rest.starts_with('/'))
        })
    }

    /// Rank of a file; lower sorts first.
    ///
    /// The index of the first matching pattern wins, then priority paths
    /// score [`PRIORITY_PATH_SCORE`], and everything else scores
    /// [`DEFAULT_SCORE`].
    pub fn priority_score(&self, relative_path: &str) -> usize {
        if let Some(index) = self
            .config
            .priority_patterns()
            .iter()
            .position(|pattern| pattern.is_match(relative_path))
        {
            return index;
        }

        if self.is_priority_path(relative_path) {
            return PRIORITY_PATH_SCORE;
        }

        DEFAULT_SCORE
    }
}

/// Lowercased extension with a leading dot (`a.TXT` -> `.txt`).
pub(crate) fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .map(|ext| format!(".{}", ext.to_string_lossy().to_lowercase()))
}
