use clap::Parser;
use std::path::PathBuf;

/// Default output file name, written relative to the project root.
pub const DEFAULT_OUTPUT: &str = "_CONTEXT_PACK.txt";

/// Default config file name looked up in the git root and current directory.
pub const DEFAULT_CONFIG: &str = "ctxpack.toml";

/// CLI argument parsing.
///
/// Flags given here override values from config files.
#[derive(Parser, Debug)]
#[command(name = "ctxpack")]
#[command(about = "Pack a project's source tree into a prioritized context document for LLMs")]
#[command(version)]
pub struct Args {
    /// Files or folders to pack, comma-separated, relative to the root
    #[arg(short, long, value_delimiter = ',')]
    pub target: Vec<String>,

    /// Project root directory
    #[arg(short, long, default_value = ".")]
    pub root: PathBuf,

    /// Output file path, relative to the root [default: _CONTEXT_PACK.txt]
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Disable blank-line minification
    #[arg(long)]
    pub no_minify: bool,

    /// Trim lowest-priority files until the estimate fits this many tokens
    #[arg(long)]
    pub max_tokens: Option<usize>,

    /// Do not copy the result to the clipboard
    #[arg(long)]
    pub no_clipboard: bool,

    /// Only list discovered files with their priority marker
    #[arg(long)]
    pub list_only: bool,

    /// Config file path
    #[arg(short, long, default_value = DEFAULT_CONFIG, env = "CTXPACK_CONFIG")]
    pub config: PathBuf,

    /// Increase verbosity (-v, -vv)
    #[arg(short, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress the report and progress output
    #[arg(short)]
    pub quiet: bool,
}

impl Args {
    /// Targets with whitespace trimmed and empty entries dropped.
    pub fn targets(&self) -> Vec<String> {
        self.target
            .iter()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect()
    }
}

pub fn parse() -> Args {
    Args::parse()
}
