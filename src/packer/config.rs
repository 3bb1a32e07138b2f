// Copyright (c) 2025-2026 the ctxpack contributors
// SPDX-License-Identifier: Apache-2.0

//! Immutable packing policy.
//!
//! A [`PackerConfig`] is built once, validated, and then shared by reference
//! with every stage of the pipeline. There is no process-wide default
//! instance: callers start from [`PackerConfig::builder`] (which carries the
//! stock defaults) and layer their own settings on top.

use std::collections::HashSet;

use globset::{Glob, GlobSet, GlobSetBuilder};
use regex::{Regex, RegexBuilder};

use crate::utils::error::PackError;

/// Score for files under a configured priority path.
pub const PRIORITY_PATH_SCORE: usize = 100;

/// Score for files matching neither a pattern nor a priority path.
pub const DEFAULT_SCORE: usize = 1000;

/// Files longer than this (in characters) only get their edges trimmed.
pub const DEFAULT_LARGE_FILE_THRESHOLD: usize = 50_000;

/// Approximate tag overhead charged per file record when trimming.
pub const DEFAULT_RECORD_OVERHEAD_TOKENS: usize = 50;

/// Files larger than this many bytes are excluded.
pub const DEFAULT_MAX_FILE_BYTES: u64 = 100_000;

/// Traversal depth limit; also bounds symlink loops.
pub const DEFAULT_MAX_DEPTH: usize = 64;

const DEFAULT_EXCLUDED_DIRS: &[&str] = &[
    ".git",
    "node_modules",
    "build",
    "dist",
    "__pycache__",
    ".next",
    ".vercel",
    ".turbo",
    "coverage",
    ".nyc_output",
    "venv",
    ".venv",
    "env",
    ".env",
    ".idea",
    ".vscode",
];

const DEFAULT_EXCLUDED_FILES: &[&str] = &[
    "package-lock.json",
    "yarn.lock",
    "pnpm-lock.yaml",
    ".DS_Store",
    "Thumbs.db",
    ".gitignore",
];

const DEFAULT_EXCLUDED_EXTENSIONS: &[&str] = &[
    ".png", ".jpg", ".jpeg", ".gif", ".ico", ".svg", ".webp", ".mp4", ".mp3", ".wav", ".avi",
    ".mov", ".pdf", ".doc", ".docx", ".xls", ".xlsx", ".zip", ".tar", ".gz", ".rar", ".7z", ".exe",
    ".dll", ".so", ".dylib", ".pyc", ".pyo", ".class", ".o", ".woff", ".woff2", ".ttf", ".eot",
    ".otf",
];

const DEFAULT_PRIORITY_PATHS: &[&str] = &[
    ".cursorrules",
    "CLAUDE.md",
    "roadmap",
    "log/current-state.md",
    "core",
];

const DEFAULT_PRIORITY_PATTERNS: &[&str] = &[
    r"\.cursorrules$",
    r"CLAUDE\.md$",
    r"current-state\.md$",
    r"milestones\.md$",
    r"PRD\.md$",
    r"package\.json$",
    r"tsconfig\.json$",
    r"tailwind\.config\.",
];

/// Validated, immutable packing policy.
#[derive(Debug, Clone)]
pub struct PackerConfig {
    excluded_dirs: HashSet<String>,
    excluded_files: HashSet<String>,
    /// Stored lowercased with a leading dot.
    excluded_extensions: HashSet<String>,
    exclude_globs: GlobSet,
    priority_paths: Vec<String>,
    priority_patterns: Vec<Regex>,
    max_file_bytes: u64,
    tokens_per_word: f64,
    tokens_per_char: f64,
    minify: bool,
    large_file_threshold: usize,
    record_overhead_tokens: usize,
    respect_gitignore: bool,
    max_depth: usize,
}

impl PackerConfig {
    /// Start from the stock defaults.
    pub fn builder() -> PackerConfigBuilder {
        PackerConfigBuilder::default()
    }

    pub fn excluded_dirs(&self) -> &HashSet<String> {
        &self.excluded_dirs
    }

    pub fn excluded_files(&self) -> &HashSet<String> {
        &self.excluded_files
    }

    pub fn excluded_extensions(&self) -> &HashSet<String> {
        &self.excluded_extensions
    }

    pub fn exclude_globs(&self) -> &GlobSet {
        &self.exclude_globs
    }

    /// Priority paths in configuration order (POSIX separators).
    pub fn priority_paths(&self) -> &[String] {
        &self.priority_paths
    }

    /// Priority patterns in rank order; index is the score.
    pub fn priority_patterns(&self) -> &[Regex] {
        &self.priority_patterns
    }

    pub fn max_file_bytes(&self) -> u64 {
        self.max_file_bytes
    }

    pub fn tokens_per_word(&self) -> f64 {
        self.tokens_per_word
    }

    pub fn tokens_per_char(&self) -> f64 {
        self.tokens_per_char
    }

    pub fn minify(&self) -> bool {
        self.minify
    }

    pub fn large_file_threshold(&self) -> usize {
        self.large_file_threshold
    }

    pub fn record_overhead_tokens(&self) -> usize {
        self.record_overhead_tokens
    }

    pub fn respect_gitignore(&self) -> bool {
        self.respect_gitignore
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }
}

/// Builder for [`PackerConfig`].
///
/// List setters named `extra_*` extend the defaults; `clear_*` drops them
/// first. Scalar setters override.
#[derive(Debug, Clone)]
pub struct PackerConfigBuilder {
    excluded_dirs: Vec<String>,
    excluded_files: Vec<String>,
    excluded_extensions: Vec<String>,
    exclude_globs: Vec<String>,
    priority_paths: Vec<String>,
    priority_patterns: Vec<String>,
    max_file_bytes: u64,
    tokens_per_word: f64,
    tokens_per_char: f64,
    minify: bool,
    large_file_threshold: usize,
    record_overhead_tokens: usize,
    respect_gitignore: bool,
    max_depth: usize,
}

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}

impl Default for PackerConfigBuilder {
    fn default() -> Self {
        Self {
            excluded_dirs: owned(DEFAULT_EXCLUDED_DIRS),
            excluded_files: owned(DEFAULT_EXCLUDED_FILES),
            excluded_extensions: owned(DEFAULT_EXCLUDED_EXTENSIONS),
            exclude_globs: Vec::new(),
            priority_paths: owned(DEFAULT_PRIORITY_PATHS),
            priority_patterns: owned(DEFAULT_PRIORITY_PATTERNS),
            max_file_bytes: DEFAULT_MAX_FILE_BYTES,
            tokens_per_word: 1.3,
            tokens_per_char: 0.25,
            minify: true,
            large_file_threshold: DEFAULT_LARGE_FILE_THRESHOLD,
            record_overhead_tokens: DEFAULT_RECORD_OVERHEAD_TOKENS,
            respect_gitignore: false,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl PackerConfigBuilder {
    pub fn extra_excluded_dirs<I, S>(mut self, dirs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excluded_dirs.extend(dirs.into_iter().map(Into::into));
        self
    }

    pub fn extra_excluded_files<I, S>(mut self, files: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excluded_files.extend(files.into_iter().map(Into::into));
        self
    }

    /// Extensions may be given with or without the leading dot.
    pub fn extra_excluded_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excluded_extensions
            .extend(extensions.into_iter().map(Into::into));
        self
    }

    pub fn exclude_globs<I, S>(mut self, globs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude_globs.extend(globs.into_iter().map(Into::into));
        self
    }

    pub fn extra_priority_paths<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.priority_paths.extend(paths.into_iter().map(Into::into));
        self
    }

    /// Appended after the existing patterns, so they rank below them.
    pub fn extra_priority_patterns<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.priority_patterns
            .extend(patterns.into_iter().map(Into::into));
        self
    }

    pub fn clear_priority_paths(mut self) -> Self {
        self.priority_paths.clear();
        self
    }

    pub fn clear_priority_patterns(mut self) -> Self {
        self.priority_patterns.clear();
        self
    }

    pub fn max_file_bytes(mut self, bytes: u64) -> Self {
        self.max_file_bytes = bytes;
        self
    }

    pub fn tokens_per_word(mut self, value: f64) -> Self {
        self.tokens_per_word = value;
        self
    }

    pub fn tokens_per_char(mut self, value: f64) -> Self {
        self.tokens_per_char = value;
        self
    }

    pub fn minify(mut self, enabled: bool) -> Self {
        self.minify = enabled;
        self
    }

    pub fn large_file_threshold(mut self, chars: usize) -> Self {
        self.large_file_threshold = chars;
        self
    }

    pub fn record_overhead_tokens(mut self, tokens: usize) -> Self {
        self.record_overhead_tokens = tokens;
        self
    }

    pub fn respect_gitignore(mut self, enabled: bool) -> Self {
        self.respect_gitignore = enabled;
        self
    }

    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Validate and compile the configuration.
    pub fn build(self) -> Result<PackerConfig, PackError> {
        for (name, value) in [
            ("tokens_per_word", self.tokens_per_word),
            ("tokens_per_char", self.tokens_per_char),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(PackError::invalid_coefficient(name, value));
            }
        }

        if self.max_depth == 0 {
            return Err(PackError::Config(
                "max_depth must be at least 1".to_string(),
            ));
        }

        let priority_patterns = self
            .priority_patterns
            .iter()
            .map(|pattern| {
                RegexBuilder::new(pattern)
                    .case_insensitive(true)
                    .build()
                    .map_err(|source| PackError::InvalidPattern {
                        pattern: pattern.clone(),
                        source,
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let exclude_globs = build_globset(&self.exclude_globs)?;

        let excluded_extensions = self
            .excluded_extensions
            .iter()
            .map(|ext| normalize_extension(ext))
            .collect();

        let priority_paths = self
            .priority_paths
            .iter()
            .map(|p| p.replace('\\', "/").trim_end_matches('/').to_string())
            .filter(|p| !p.is_empty())
            .collect();

        Ok(PackerConfig {
            excluded_dirs: self.excluded_dirs.into_iter().collect(),
            excluded_files: self.excluded_files.into_iter().collect(),
            excluded_extensions,
            exclude_globs,
            priority_paths,
            priority_patterns,
            max_file_bytes: self.max_file_bytes,
            tokens_per_word: self.tokens_per_word,
            tokens_per_char: self.tokens_per_char,
            minify: self.minify,
            large_file_threshold: self.large_file_threshold,
            record_overhead_tokens: self.record_overhead_tokens,
            respect_gitignore: self.respect_gitignore,
            max_depth: self.max_depth,
        })
    }
}

/// Lowercase and ensure a single leading dot.
fn normalize_extension(ext: &str) -> String {
    let lower = ext.trim().to_lowercase();
    if lower.starts_with('.') {
        lower
    } else {
        format!(".{}", lower)
    }
}

fn build_globset(patterns: &[String]) -> Result<GlobSet, PackError> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern).map_err(|e| PackError::InvalidGlob {
            pattern: pattern.clone(),
            message: e.to_string(),
        })?;
        builder.add(glob);
    }
    builder.build().map_err(|e| PackError::InvalidGlob {
        pattern: patterns.join(", "),
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_build() {
        let config = PackerConfig::builder().build().expect("defaults are valid");
        assert_eq!(config.priority_patterns().len(), 8);
        assert_eq!(config.max_file_bytes(), 100_000);
        assert!(config.excluded_dirs().contains("node_modules"));
        assert!(config.excluded_extensions().contains(".png"));
        assert!(config.minify());
    }

    #[test]
    fn test_extensions_are_normalized() {
        let config = PackerConfig::builder()
            .extra_excluded_extensions(["LOG", ".Bin"])
            .build()
            .expect("valid config");
        assert!(config.excluded_extensions().contains(".log"));
        assert!(config.excluded_extensions().contains(".bin"));
    }

    #[test]
    fn test_invalid_pattern_is_rejected() {
        let err = PackerConfig::builder()
            .extra_priority_patterns(["(unclosed"])
            .build()
            .expect_err("invalid regex should fail");
        assert!(matches!(err, PackError::InvalidPattern { .. }));
    }

    #[test]
    fn test_invalid_glob_is_rejected() {
        let err = PackerConfig::builder()
            .exclude_globs(["src/[unterminated"])
            .build()
            .expect_err("invalid glob should fail");
        assert!(matches!(err, PackError::InvalidGlob { .. }));
    }

    #[test]
    fn test_non_positive_coefficient_is_rejected() {
        let err = PackerConfig::builder()
            .tokens_per_char(0.0)
            .build()
            .expect_err("zero coefficient should fail");
        assert!(matches!(err, PackError::ValidationError { .. }));
    }

    #[test]
    fn test_priority_paths_normalized() {
        let config = PackerConfig::builder()
            .clear_priority_paths()
            .extra_priority_paths(["docs\\specs/", ""])
            .build()
            .expect("valid config");
        assert_eq!(config.priority_paths(), ["docs/specs".to_string()]);
    }
}
