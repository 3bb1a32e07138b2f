// Copyright (c) 2025-2026 the ctxpack contributors
// SPDX-License-Identifier: Apache-2.0

//! Pack orchestration: discover, read, minify, rank, render, trim.

use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use indicatif::ProgressBar;

use super::budget::enforce_budget;
use super::config::PackerConfig;
use super::filter::{FileFilter, extension_of};
use super::minify::{Minifier, WhitespaceMinifier};
use super::output::{DocumentHeader, render_document};
use super::tokenizer::{HeuristicEstimator, TokenEstimator};
use super::walker::{FileDiscoverer, relative_posix};
use super::{ContextPack, ExclusionReason, FileOutcome, PackStats, PackedFile};
use crate::utils::error::PackError;

/// Builds a context document for one project root.
///
/// All reads are sequential and blocking; nothing under the root is written.
pub struct ContextPacker {
    root: PathBuf,
    project_name: String,
    targets: Vec<String>,
    max_tokens: Option<usize>,
    generated_at: Option<NaiveDateTime>,
    config: PackerConfig,
    minifier: Box<dyn Minifier>,
    estimator: Box<dyn TokenEstimator>,
}

impl std::fmt::Debug for ContextPacker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContextPacker")
            .field("root", &self.root)
            .field("targets", &self.targets)
            .field("max_tokens", &self.max_tokens)
            .finish_non_exhaustive()
    }
}

impl ContextPacker {
    /// Create a packer for `root`, which must be an existing directory.
    pub fn new(root: impl AsRef<Path>, config: PackerConfig) -> Result<Self, PackError> {
        let root = root.as_ref();
        if !root.exists() {
            return Err(PackError::RootNotFound(root.to_path_buf()));
        }
        let root = root.canonicalize().map_err(|e| {
            PackError::FileSystem(std::io::Error::new(
                e.kind(),
                format!("Failed to resolve root {}: {}", root.display(), e),
            ))
        })?;
        if !root.is_dir() {
            return Err(PackError::root_not_directory(&root));
        }

        let project_name = root
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| root.display().to_string());

        let minifier = WhitespaceMinifier::new(config.minify())
            .with_large_file_threshold(config.large_file_threshold());
        let estimator = HeuristicEstimator::from_config(&config);

        Ok(Self {
            root,
            project_name,
            targets: Vec::new(),
            max_tokens: None,
            generated_at: None,
            config,
            minifier: Box::new(minifier),
            estimator: Box::new(estimator),
        })
    }

    /// Restrict the pack to these root-relative paths (plus priority paths).
    pub fn with_targets(mut self, targets: Vec<String>) -> Self {
        self.targets = targets;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: Option<usize>) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Pin the header timestamp instead of using the local clock.
    pub fn with_timestamp(mut self, generated_at: NaiveDateTime) -> Self {
        self.generated_at = Some(generated_at);
        self
    }

    pub fn with_minifier(mut self, minifier: Box<dyn Minifier>) -> Self {
        self.minifier = minifier;
        self
    }

    pub fn with_estimator(mut self, estimator: Box<dyn TokenEstimator>) -> Self {
        self.estimator = estimator;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn discover(&self) -> Vec<PathBuf> {
        FileDiscoverer::new(&self.root, &self.config).discover(&self.targets)
    }

    /// POSIX path of `path` relative to the root.
    pub fn relative_path(&self, path: &Path) -> Option<String> {
        relative_posix(&self.root, path)
    }

    pub fn priority_score(&self, relative_path: &str) -> usize {
        FileFilter::new(&self.config).priority_score(relative_path)
    }

    /// Read, minify and rank a single file.
    ///
    /// Non-UTF-8 content is an exclusion, not a failure. CRLF and lone CR
    /// line endings are normalized to LF before minification.
    pub fn pack_file(&self, path: &Path) -> FileOutcome {
        let Some(relative_path) = self.relative_path(path) else {
            return FileOutcome::Failed(PackError::Config(format!(
                "{} is not inside {}",
                path.display(),
                self.root.display()
            )));
        };

        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) => {
                return FileOutcome::Failed(PackError::FileSystem(std::io::Error::new(
                    e.kind(),
                    format!("Failed to read {}: {}", path.display(), e),
                )));
            }
        };
        let original_size = bytes.len();

        let Ok(raw) = String::from_utf8(bytes) else {
            return FileOutcome::Excluded(ExclusionReason::Binary);
        };
        // Universal newlines: CRLF first, then any lone CR.
        let text = if raw.contains('\r') {
            raw.replace("\r\n", "\n").replace('\r', "\n")
        } else {
            raw
        };

        let extension = extension_of(path);
        let mut content = self.minifier.minify(&text, extension.as_deref());
        if content.len() > text.len() {
            tracing::debug!(
                "Minifier grew {}; keeping unminified content",
                relative_path
            );
            content = text;
        }

        let priority = self.priority_score(&relative_path);
        FileOutcome::Packed(PackedFile {
            packed_size: content.len(),
            relative_path,
            content,
            original_size,
            priority,
        })
    }

    pub fn pack(&self) -> ContextPack {
        self.pack_with_progress(&ProgressBar::hidden())
    }

    /// Run the full pipeline, advancing `progress` once per discovered file.
    pub fn pack_with_progress(&self, progress: &ProgressBar) -> ContextPack {
        let generated = self
            .generated_at
            .unwrap_or_else(|| chrono::Local::now().naive_local());

        let paths = self.discover();
        let mut stats = PackStats {
            total_files: paths.len(),
            ..PackStats::default()
        };

        progress.set_length(paths.len() as u64);
        let mut files = Vec::with_capacity(paths.len());
        for path in &paths {
            match self.pack_file(path) {
                FileOutcome::Packed(file) => {
                    stats.original_size += file.original_size;
                    stats.packed_size += file.packed_size;
                    progress.set_message(file.relative_path.clone());
                    files.push(file);
                }
                FileOutcome::Excluded(reason) => {
                    stats.excluded_files += 1;
                    tracing::debug!("Skipping {}: {}", path.display(), reason);
                }
                FileOutcome::Failed(e) => {
                    stats.failed_files += 1;
                    if e.is_permission_denied() {
                        tracing::warn!("Permission denied, skipping {}", path.display());
                    } else {
                        tracing::warn!("Failed to pack {}: {}", path.display(), e);
                    }
                }
            }
            progress.inc(1);
        }
        progress.finish_and_clear();

        // Stable: equal priorities keep discovery order.
        files.sort_by_key(|file| file.priority);

        let header = DocumentHeader::new(
            self.project_name.as_str(),
            &self.targets,
            generated,
            self.config.minify(),
        );
        let document = render_document(&header, &files);

        let (document, files, estimated_tokens) = match self.max_tokens {
            Some(max_tokens) => {
                let outcome = enforce_budget(
                    document,
                    files,
                    max_tokens,
                    &header,
                    self.estimator.as_ref(),
                    self.config.record_overhead_tokens(),
                );
                stats.trimmed_files = outcome.removed;
                (outcome.document, outcome.files, outcome.tokens_after)
            }
            None => {
                let tokens = self.estimator.estimate(&document);
                (document, files, tokens)
            }
        };
        stats.included_files = files.len();

        tracing::info!(
            "Packed {} of {} files ({} excluded, {} failed, {} trimmed)",
            stats.included_files,
            stats.total_files,
            stats.excluded_files,
            stats.failed_files,
            stats.trimmed_files
        );

        ContextPack {
            document,
            files,
            stats,
            estimated_tokens,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn packer(root: &Path) -> ContextPacker {
        let config = PackerConfig::builder().build().expect("valid config");
        ContextPacker::new(root, config).expect("valid root")
    }

    #[test]
    fn test_missing_root_is_fatal() {
        let config = PackerConfig::builder().build().expect("valid config");
        let err = ContextPacker::new("/definitely/not/here", config).expect_err("should fail");
        assert!(matches!(err, PackError::RootNotFound(_)));
    }

    #[test]
    fn test_file_root_is_fatal() {
        let dir = TempDir::new().expect("temp dir");
        let file = dir.path().join("a.txt");
        fs::write(&file, "x").expect("write");
        let config = PackerConfig::builder().build().expect("valid config");
        let err = ContextPacker::new(&file, config).expect_err("should fail");
        assert!(matches!(err, PackError::ValidationError { .. }));
    }

    #[test]
    fn test_pack_file_binary_is_excluded() {
        let dir = TempDir::new().expect("temp dir");
        let file = dir.path().join("blob.dat");
        fs::write(&file, [0xff, 0xfe, 0x00, 0x80]).expect("write");
        let packer = packer(dir.path());
        let file = packer.root().join("blob.dat");
        assert!(matches!(
            packer.pack_file(&file),
            FileOutcome::Excluded(ExclusionReason::Binary)
        ));
    }

    #[test]
    fn test_pack_file_normalizes_crlf_and_minifies() {
        let dir = TempDir::new().expect("temp dir");
        fs::write(dir.path().join("notes.md"), "a\r\n\r\n\r\n\r\nb\r\n").expect("write");
        let packer = packer(dir.path());
        let file = packer.root().join("notes.md");

        match packer.pack_file(&file) {
            FileOutcome::Packed(packed) => {
                assert_eq!(packed.relative_path, "notes.md");
                assert_eq!(packed.content, "a\n\nb");
                assert_eq!(packed.original_size, 12);
                assert_eq!(packed.packed_size, 4);
                assert_eq!(packed.priority, 1000);
            }
            other => panic!("expected packed file, got {other:?}"),
        }
    }

    #[test]
    fn test_pack_file_normalizes_lone_cr() {
        let dir = TempDir::new().expect("temp dir");
        fs::write(dir.path().join("mac.txt"), "a\r\r\r\r\rb\r").expect("write");
        let packer = packer(dir.path());
        let file = packer.root().join("mac.txt");

        match packer.pack_file(&file) {
            FileOutcome::Packed(packed) => {
                assert_eq!(packed.content, "a\n\nb");
                assert_eq!(packed.original_size, 7);
            }
            other => panic!("expected packed file, got {other:?}"),
        }
    }

    #[test]
    fn test_pack_file_missing_is_failure() {
        let dir = TempDir::new().expect("temp dir");
        let packer = packer(dir.path());
        let file = packer.root().join("gone.txt");
        assert!(matches!(packer.pack_file(&file), FileOutcome::Failed(_)));
    }

    #[test]
    fn test_growing_minifier_is_ignored() {
        struct Doubler;
        impl Minifier for Doubler {
            fn minify(&self, content: &str, _extension: Option<&str>) -> String {
                content.repeat(2)
            }
        }

        let dir = TempDir::new().expect("temp dir");
        fs::write(dir.path().join("a.txt"), "abc").expect("write");
        let packer = packer(dir.path()).with_minifier(Box::new(Doubler));
        let file = packer.root().join("a.txt");
        match packer.pack_file(&file) {
            FileOutcome::Packed(packed) => assert_eq!(packed.content, "abc"),
            other => panic!("expected packed file, got {other:?}"),
        }
    }
}
