// Copyright (c) 2025-2026 the ctxpack contributors
// SPDX-License-Identifier: Apache-2.0

use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};

use ignore::WalkBuilder;

use super::ExclusionReason;
use super::config::PackerConfig;
use super::filter::FileFilter;

/// Finds the files eligible for packing under a project root.
#[derive(Debug, Clone, Copy)]
pub struct FileDiscoverer<'a> {
    root: &'a Path,
    config: &'a PackerConfig,
}

impl<'a> FileDiscoverer<'a> {
    pub fn new(root: &'a Path, config: &'a PackerConfig) -> Self {
        Self { root, config }
    }

    /// Discover eligible files, deduplicated, in first-seen order.
    ///
    /// With no targets the whole root is walked. With targets, the
    /// configured priority paths are resolved first and each target after
    /// them.
    pub fn discover(&self, targets: &[String]) -> Vec<PathBuf> {
        let mut found = Vec::new();

        if targets.is_empty() {
            found.extend(self.scan_directory(self.root));
        } else {
            for priority in self.config.priority_paths() {
                self.resolve(priority, &mut found);
            }
            for target in targets {
                self.resolve(target, &mut found);
            }
        }

        let mut seen = HashSet::new();
        found.retain(|path| seen.insert(path.clone()));

        tracing::info!("Discovered {} files", found.len());
        found
    }

    /// Recursively list eligible files under `dir`, pruning excluded and
    /// private directories below it. Unreadable subtrees are skipped.
    pub fn scan_directory(&self, dir: &Path) -> Vec<PathBuf> {
        let prune_config = self.config.clone();
        let respect_gitignore = self.config.respect_gitignore();

        let walker = WalkBuilder::new(dir)
            .standard_filters(false)
            .git_ignore(respect_gitignore)
            .git_exclude(respect_gitignore)
            .parents(respect_gitignore)
            .require_git(false)
            .follow_links(true)
            .max_depth(Some(self.config.max_depth()))
            .filter_entry(move |entry| {
                if entry.depth() == 0 || !entry.file_type().is_some_and(|ft| ft.is_dir()) {
                    return true;
                }
                !FileFilter::new(&prune_config)
                    .should_exclude_dir(&entry.file_name().to_string_lossy())
            })
            .build();

        let mut files = Vec::new();
        for result in walker {
            match result {
                Ok(entry) => {
                    if !entry.file_type().is_some_and(|ft| ft.is_file()) {
                        continue;
                    }
                    let path = entry.path();
                    match self.exclusion_reason(path) {
                        None => files.push(path.to_path_buf()),
                        Some(reason) => {
                            tracing::trace!("Excluding {}: {}", path.display(), reason);
                        }
                    }
                }
                Err(e) => {
                    tracing::debug!("Skipping unreadable entry: {}", e);
                }
            }
        }
        files
    }

    /// Expand one root-relative entry (file or directory) into `out`.
    fn resolve(&self, relative: &str, out: &mut Vec<PathBuf>) {
        let path = self.root.join(relative);
        let escapes = Path::new(relative)
            .components()
            .any(|c| matches!(c, Component::ParentDir));
        if escapes || !path.starts_with(self.root) {
            tracing::warn!("Ignoring path outside the project root: {}", relative);
            return;
        }

        if path.is_file() {
            match self.exclusion_reason(&path) {
                None => out.push(path),
                Some(reason) => tracing::debug!("Excluding {}: {}", path.display(), reason),
            }
        } else if path.is_dir() {
            out.extend(self.scan_directory(&path));
        } else {
            tracing::debug!("Target not found: {}", path.display());
        }
    }

    fn exclusion_reason(&self, path: &Path) -> Option<ExclusionReason> {
        let filter = FileFilter::new(self.config);
        if let Some(relative) = relative_posix(self.root, path)
            && filter.is_glob_excluded(&relative)
        {
            return Some(ExclusionReason::ExcludedGlob);
        }
        filter.exclusion_reason(path)
    }
}

/// `path` relative to `root` with `/` separators, or `None` if it is not
/// under `root`.
pub fn relative_posix(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let parts: Vec<String> = relative
        .components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            Component::CurDir
            | Component::ParentDir
            | Component::RootDir
            | Component::Prefix(_) => None,
        })
        .collect();
    if parts.is_empty() {
        return None;
    }
    Some(parts.join("/"))
}
