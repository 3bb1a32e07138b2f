//! # ctxpack
//!
//! ctxpack assembles a bounded, prioritized snapshot of a project's source
//! tree for a language model's context window. A run moves through these
//! stages:
//!
//! 1. **Init** - Configuration validation and setup
//! 2. **Discovering** - Walking the root (or the requested targets) for eligible files
//! 3. **Packing** - Reading, minifying and ranking each file, then rendering the document
//! 4. **Writing** - Writing the document to the output file
//! 5. **Reporting** - Printing counts, sizes and the token estimate
//! 6. **Copying** - Optional clipboard hand-off
//! 7. **Complete** - Run finished
//!
//! The packing engine lives in [`packer`]; everything in [`cli`] only maps
//! flags and config files onto a [`packer::PackerConfig`].
//!
//! Configuration follows hierarchical precedence:
//! 1. User config (~/.config/ctxpack/config.toml)
//! 2. Git root (ctxpack.toml)
//! 3. Current directory (ctxpack.toml)
//! 4. Explicit --config path
//! 5. Environment variables (CTXPACK_*)
//! 6. CLI flags (highest precedence)

pub mod cli;
pub mod packer;
pub mod utils;

use anyhow::{Context, Result};
use packer::{ContextPacker, PackerConfig};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use utils::clipboard::copy_to_clipboard;
use utils::progress::packing_progress;
use utils::summary::{display_file_list, display_pack_summary};

/// Final resolved configuration after merging all sources (CLI, env, config files).
#[derive(Debug, Clone)]
pub struct MergedConfig {
    /// Project root to pack
    pub root: PathBuf,
    /// Root-relative files or folders to restrict the pack to
    pub targets: Vec<String>,
    /// Output file path, resolved against the root
    pub output: PathBuf,
    /// Token ceiling for the document
    pub max_tokens: Option<usize>,
    /// Copy the document to the clipboard
    pub clipboard: bool,
    /// Only list discovered files
    pub list_only: bool,
    /// Quiet mode
    pub quiet: bool,
    /// Packing policy
    pub packer: PackerConfig,
}

/// Tracks the current stage of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Init,
    Discovering,
    Packing,
    Writing,
    Reporting,
    Copying,
    Complete,
}

fn enter(stage: PipelineStage) {
    tracing::debug!("Pipeline stage: {:?}", stage);
}

/// Install the stderr log subscriber. `RUST_LOG` overrides the level.
pub fn init_logging(verbose: u8, quiet: bool) {
    let level = if quiet {
        "warn"
    } else {
        match verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("ctxpack={level}")));

    // A subscriber may already be installed (tests, embedding); keep it.
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .try_init()
        .ok();
}

pub fn run(config: MergedConfig) -> Result<()> {
    tracing::info!("ctxpack v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::debug!(
        "Configuration: root={}, targets={:?}, output={}, minify={}, max_tokens={:?}",
        config.root.display(),
        config.targets,
        config.output.display(),
        config.packer.minify(),
        config.max_tokens
    );

    enter(PipelineStage::Init);
    let packer = ContextPacker::new(&config.root, config.packer)
        .context("Failed to initialize packer")?
        .with_targets(config.targets)
        .with_max_tokens(config.max_tokens);

    if config.list_only {
        enter(PipelineStage::Discovering);
        let entries: Vec<(String, usize)> = packer
            .discover()
            .iter()
            .filter_map(|path| packer.relative_path(path))
            .map(|relative| {
                let score = packer.priority_score(&relative);
                (relative, score)
            })
            .collect();
        display_file_list(&entries)?;
        enter(PipelineStage::Complete);
        return Ok(());
    }

    enter(PipelineStage::Packing);
    let progress = packing_progress(config.quiet);
    let pack = packer.pack_with_progress(&progress);

    enter(PipelineStage::Writing);
    let output_path = packer.root().join(&config.output);
    std::fs::write(&output_path, &pack.document)
        .with_context(|| format!("Failed to write output to {}", output_path.display()))?;

    enter(PipelineStage::Reporting);
    display_pack_summary(&pack, &output_path, config.quiet)?;

    if config.clipboard {
        enter(PipelineStage::Copying);
        if copy_to_clipboard(&pack.document) {
            tracing::info!("Copied to clipboard");
        } else {
            tracing::warn!("Clipboard copy failed; the pack is still saved to disk");
        }
    }

    enter(PipelineStage::Complete);
    Ok(())
}
