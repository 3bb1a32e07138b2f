//! Configuration management using the `config` crate for hierarchical discovery and merging.
//!
//! ## Configuration Sources (in precedence order, highest to lowest):
//! 1. **CLI flags** - Highest precedence (applied in [`merge_config`])
//! 2. **Environment variables** - `CTXPACK_<SECTION>__<KEY>`, e.g. `CTXPACK_GENERAL__MAX_TOKENS`
//! 3. **Config files** - Lowest precedence
//!
//! ## Config File Discovery (in merge order, later overrides earlier):
//! 1. `~/.config/ctxpack/config.toml` (user config directory)
//! 2. `ctxpack.toml` in the git repository root containing `--root`
//! 3. `./ctxpack.toml` in the current directory
//! 4. Explicit `--config` path (must exist when given)
//!
//! List settings under `[filter]` extend the built-in defaults; scalar
//! settings replace them.
//!
//! ## Example `ctxpack.toml`
//! ```toml
//! [general]
//! max_tokens = 50000
//! clipboard = false
//!
//! [filter]
//! exclude_dirs = ["fixtures"]
//! priority_patterns = ['README\.md$']
//! max_file_bytes = 200000
//!
//! [tokens]
//! per_word = 1.3
//! per_char = 0.25
//! ```

use crate::MergedConfig;
use crate::cli::args::{Args, DEFAULT_CONFIG, DEFAULT_OUTPUT};
use crate::packer::PackerConfig;
use crate::utils::error::PackError;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Root configuration structure loaded from config files.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub filter: FilterConfig,
    #[serde(default)]
    pub tokens: TokensConfig,
}

/// Run-level settings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GeneralConfig {
    pub output: Option<PathBuf>,
    pub minify: Option<bool>,
    pub max_tokens: Option<usize>,
    pub clipboard: Option<bool>,
}

/// Additions and overrides for file selection.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FilterConfig {
    #[serde(default)]
    pub exclude_dirs: Vec<String>,
    #[serde(default)]
    pub exclude_files: Vec<String>,
    #[serde(default)]
    pub exclude_extensions: Vec<String>,
    #[serde(default)]
    pub exclude_globs: Vec<String>,
    #[serde(default)]
    pub priority_paths: Vec<String>,
    #[serde(default)]
    pub priority_patterns: Vec<String>,
    pub max_file_bytes: Option<u64>,
    pub respect_gitignore: Option<bool>,
    pub max_depth: Option<usize>,
    pub large_file_threshold: Option<usize>,
}

/// Token estimation coefficients.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TokensConfig {
    pub per_word: Option<f64>,
    pub per_char: Option<f64>,
    pub record_overhead: Option<usize>,
}

fn discover_config_paths(args: &Args) -> Vec<PathBuf> {
    let mut paths = Vec::new();

    // User config (lowest precedence)
    if let Some(user_config) = get_user_config_path() {
        paths.push(user_config);
    }

    // Git root config
    if let Some(git_root) = find_git_root(&args.root) {
        let git_config = git_root.join(DEFAULT_CONFIG);
        if git_config.exists() {
            paths.push(git_config);
        }
    }

    // Current directory config
    let current_dir_config = PathBuf::from(DEFAULT_CONFIG);
    if current_dir_config.exists() && !paths.iter().any(|p| same_file(p, &current_dir_config)) {
        paths.push(current_dir_config);
    }

    // Explicit --config path (highest precedence)
    if args.config != Path::new(DEFAULT_CONFIG) && args.config.exists() {
        paths.push(args.config.clone());
    }

    paths
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

fn find_git_root(start: &Path) -> Option<PathBuf> {
    git2::Repository::discover(start)
        .ok()
        .and_then(|repo| repo.workdir().map(|p| p.to_path_buf()))
}

fn get_user_config_path() -> Option<PathBuf> {
    dirs::config_dir()
        .map(|config_dir| config_dir.join("ctxpack").join("config.toml"))
        .filter(|path| path.exists())
}

/// Load configuration from discovered config files and environment variables.
pub fn load(args: &Args) -> Result<Config> {
    if args.config != Path::new(DEFAULT_CONFIG) && !args.config.exists() {
        return Err(PackError::Config(format!(
            "Config file not found: {}",
            args.config.display()
        ))
        .into());
    }

    let mut builder = config::Config::builder();

    for config_path in discover_config_paths(args) {
        tracing::debug!("Loading config from {}", config_path.display());
        builder = builder.add_source(config::File::from(config_path));
    }

    builder = builder.add_source(
        config::Environment::with_prefix("CTXPACK")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    );

    let settings = builder.build().context("Failed to build configuration")?;

    settings
        .try_deserialize()
        .context("Failed to deserialize configuration")
}

/// Build the packer policy from file settings.
///
/// `output_name` is added to the excluded file names so a previous pack is
/// never packed again.
pub fn build_packer_config(
    config: &Config,
    minify: bool,
    output_name: Option<&str>,
) -> Result<PackerConfig, PackError> {
    let filter = &config.filter;
    let mut builder = PackerConfig::builder()
        .minify(minify)
        .extra_excluded_dirs(filter.exclude_dirs.iter().cloned())
        .extra_excluded_files(filter.exclude_files.iter().cloned())
        .extra_excluded_files(output_name.map(str::to_string))
        .extra_excluded_extensions(filter.exclude_extensions.iter().cloned())
        .exclude_globs(filter.exclude_globs.iter().cloned())
        .extra_priority_paths(filter.priority_paths.iter().cloned())
        .extra_priority_patterns(filter.priority_patterns.iter().cloned());

    if let Some(bytes) = filter.max_file_bytes {
        builder = builder.max_file_bytes(bytes);
    }
    if let Some(respect) = filter.respect_gitignore {
        builder = builder.respect_gitignore(respect);
    }
    if let Some(depth) = filter.max_depth {
        builder = builder.max_depth(depth);
    }
    if let Some(threshold) = filter.large_file_threshold {
        builder = builder.large_file_threshold(threshold);
    }
    if let Some(per_word) = config.tokens.per_word {
        builder = builder.tokens_per_word(per_word);
    }
    if let Some(per_char) = config.tokens.per_char {
        builder = builder.tokens_per_char(per_char);
    }
    if let Some(overhead) = config.tokens.record_overhead {
        builder = builder.record_overhead_tokens(overhead);
    }

    builder.build()
}

/// Merge CLI arguments over file configuration into the final run settings.
pub fn merge_config(args: &Args, config: Config) -> Result<MergedConfig> {
    if !args.root.exists() {
        return Err(PackError::RootNotFound(args.root.clone()).into());
    }

    let output = args
        .output
        .clone()
        .or_else(|| config.general.output.clone())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT));

    let max_tokens = args.max_tokens.or(config.general.max_tokens);
    if max_tokens == Some(0) {
        return Err(PackError::invalid_max_tokens(0).into());
    }

    let minify = !args.no_minify && config.general.minify.unwrap_or(true);
    let clipboard = !args.no_clipboard && config.general.clipboard.unwrap_or(true);

    let output_name = output
        .file_name()
        .map(|name| name.to_string_lossy().into_owned());
    let packer = build_packer_config(&config, minify, output_name.as_deref())
        .context("Invalid packer configuration")?;

    Ok(MergedConfig {
        root: args.root.clone(),
        targets: args.targets(),
        output,
        max_tokens,
        clipboard,
        list_only: args.list_only,
        quiet: args.quiet,
        packer,
    })
}
