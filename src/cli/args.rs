//! Command-line arguments.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use ccount::cache::{Codec, ContentAddressedCache};
use ccount::collect::CounterCommand;
use ccount::pipeline::{DEFAULT_LIMIT, RunOptions};

#[derive(Parser, Debug)]
#[command(name = "ccount", version, about = "Chart lines of code per language over a git repository's history", after_help = "\
Counts run in a disposable clone; the repository itself is never checked out.\n\
Requires git and the counter (tokei by default) in PATH.\n\
Example: ccount ~/src/project -n 30 -l Rust,Python -o project.html")]
pub(crate) struct Cli {
    /// Path to the repository (must contain .git)
    pub repo: PathBuf,

    /// Maximum number of commits to measure (0 = all). First and last are always kept.
    #[arg(short = 'n', long, default_value_t = DEFAULT_LIMIT, value_parser = parse_limit)]
    pub limit: usize,

    /// Branch to walk (default: the repository's current HEAD)
    #[arg(short, long)]
    pub branch: Option<String>,

    /// Measure every commit instead of only the last one of each day
    #[arg(long)]
    pub no_collapse: bool,

    /// Languages to chart, comma-separated, as the counter names them
    #[arg(short, long, value_delimiter = ',', default_value = "Python,TypeScript,Sass")]
    pub languages: Vec<String>,

    /// Output HTML file
    #[arg(short, long, default_value = "ccount.html")]
    pub output: PathBuf,

    /// Cache directory (default: <user cache dir>/ccount)
    #[arg(long)]
    pub cache_dir: Option<PathBuf>,

    /// Compression for cache files
    #[arg(long, value_enum, default_value_t = CodecArg::Gzip)]
    pub codec: CodecArg,

    /// Gzip compression level (0-9)
    #[arg(long, default_value_t = 9, value_parser = clap::value_parser!(u32).range(0..=9))]
    pub gzip_level: u32,

    /// Ignore cached counts and measure every sampled commit again
    #[arg(long)]
    pub no_cache: bool,

    /// Counter command line, run in the checked-out tree; must print tokei-style JSON
    /// (default: "tokei --output json")
    #[arg(long, value_parser = parse_counter)]
    pub counter: Option<CounterCommand>,

    /// Shorthand for --log-level debug
    #[arg(short, long)]
    pub verbose: bool,

    /// Log level for stderr output (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum CodecArg {
    Identity,
    Gzip,
    Lz4,
}

impl Cli {
    pub fn codec(&self) -> Codec {
        match self.codec {
            CodecArg::Identity => Codec::Identity,
            CodecArg::Gzip => Codec::gzip(self.gzip_level),
            CodecArg::Lz4 => Codec::Lz4,
        }
    }

    pub fn max_log_level(&self) -> tracing::Level {
        if self.verbose {
            return tracing::Level::DEBUG;
        }
        match self.log_level.to_ascii_lowercase().as_str() {
            "error" => tracing::Level::ERROR,
            "warn" => tracing::Level::WARN,
            "debug" => tracing::Level::DEBUG,
            "trace" => tracing::Level::TRACE,
            _ => tracing::Level::INFO,
        }
    }

    pub fn run_options(&self) -> RunOptions {
        let mut opts = RunOptions::new(self.repo.clone());
        opts.revision = self.branch.clone();
        opts.limit = self.limit;
        opts.collapse = !self.no_collapse;
        opts.languages = self
            .languages
            .iter()
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty())
            .collect();
        opts.cache_root = self.cache_dir.clone().unwrap_or_else(ContentAddressedCache::default_root);
        opts.codec = self.codec();
        opts.counter = self.counter.clone().unwrap_or_default();
        opts.use_cache = !self.no_cache;
        opts
    }
}

fn parse_limit(s: &str) -> Result<usize, String> {
    let limit: usize = s.parse().map_err(|_| format!("'{}' is not a number", s))?;
    if limit == 1 {
        return Err("must be 0 (no limit) or at least 2, so both endpoints fit".to_string());
    }
    Ok(limit)
}

fn parse_counter(s: &str) -> Result<CounterCommand, String> {
    CounterCommand::parse(s)
}
