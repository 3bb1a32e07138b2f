// Copyright (c) 2025-2026 the ctxpack contributors
// SPDX-License-Identifier: Apache-2.0

pub mod budget;
pub mod config;
pub mod engine;
pub mod filter;
pub mod minify;
pub mod output;
pub mod tokenizer;
pub mod walker;

use std::fmt;

use crate::utils::error::PackError;

/// One file's minified content and its rank in the pack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackedFile {
    /// POSIX path relative to the project root, unique within a run
    pub relative_path: String,
    /// Content after minification
    pub content: String,
    /// Size of the file on disk in bytes
    pub original_size: usize,
    /// Size of `content` in bytes
    pub packed_size: usize,
    /// Lower is more important
    pub priority: usize,
}

/// Why a file was left out of the pack. Exclusions are not errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExclusionReason {
    /// Base name is in the excluded file set
    ExcludedName,
    /// Extension is in the excluded extension set
    ExcludedExtension,
    /// Relative path matched an exclude glob
    ExcludedGlob,
    /// Larger than the configured byte cap
    TooLarge { size: u64, limit: u64 },
    /// Size could not be determined
    Unreadable,
    /// Content is not valid UTF-8
    Binary,
}

impl fmt::Display for ExclusionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ExcludedName => write!(f, "excluded file name"),
            Self::ExcludedExtension => write!(f, "excluded extension"),
            Self::ExcludedGlob => write!(f, "matched exclude glob"),
            Self::TooLarge { size, limit } => write!(f, "too large ({size} > {limit} bytes)"),
            Self::Unreadable => write!(f, "size unavailable"),
            Self::Binary => write!(f, "binary content"),
        }
    }
}

/// Result of processing a single discovered file.
#[derive(Debug)]
pub enum FileOutcome {
    Packed(PackedFile),
    Excluded(ExclusionReason),
    Failed(PackError),
}

/// Counters for the run report.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackStats {
    /// Files returned by discovery
    pub total_files: usize,
    /// Files in the final document
    pub included_files: usize,
    /// Files skipped as binary or otherwise excluded after discovery
    pub excluded_files: usize,
    /// Files skipped because reading or processing failed
    pub failed_files: usize,
    /// Files dropped to fit the token budget
    pub trimmed_files: usize,
    /// Total on-disk bytes of the packed files (before trimming)
    pub original_size: usize,
    /// Total minified bytes of the packed files (before trimming)
    pub packed_size: usize,
}

impl PackStats {
    /// Percentage saved by minification, e.g. `12.5`. Zero when nothing was read.
    pub fn compression_ratio(&self) -> f64 {
        if self.original_size == 0 {
            return 0.0;
        }
        (1.0 - self.packed_size as f64 / self.original_size as f64) * 100.0
    }
}

/// The assembled document together with what went into it.
#[derive(Debug, Clone)]
pub struct ContextPack {
    pub document: String,
    /// Files in document order
    pub files: Vec<PackedFile>,
    pub stats: PackStats,
    /// Estimated tokens of `document`
    pub estimated_tokens: usize,
}

pub use budget::{BudgetOutcome, enforce_budget, plan_trim};
pub use config::{PackerConfig, PackerConfigBuilder};
pub use engine::ContextPacker;
pub use filter::FileFilter;
pub use minify::{Minifier, WhitespaceMinifier};
pub use output::{DocumentHeader, render_document};
pub use tokenizer::{HeuristicEstimator, TokenEstimator, format_tokens};
pub use walker::FileDiscoverer;
