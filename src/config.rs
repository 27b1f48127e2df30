//! Configuration types for fs-walker
//!
//! This module defines:
//! - CLI argument parsing using clap derive macros
//! - Runtime configuration with validation

use crate::error::ConfigError;
use clap::Parser;
use regex::Regex;

/// Recursive filesystem walker
#[derive(Parser, Debug, Clone)]
#[command(
    name = "fs-walker",
    version,
    about = "Recursive filesystem walker with pattern filtering and content reading",
    long_about = "Walks a directory tree and prints every file and directory it visits.\n\n\
                  With a pattern, only non-directories whose full path matches the regular\n\
                  expression are reported; with --read their contents are fetched as well.\n\n\
                  The default engine dispatches probes concurrently; --sequential switches\n\
                  to a blocking depth-first walk that stops at the first error.",
    after_help = "EXAMPLES:\n    \
        fs-walker /data\n    \
        fs-walker /data -m '\\.txt$'\n    \
        fs-walker /data -m '\\.rs$' --read -q\n    \
        fs-walker --sequential --json /data\n    \
        fs-walker /mnt/archive -p -q"
)]
pub struct CliArgs {
    /// Directory to walk (defaults to the current directory)
    #[arg(value_name = "ROOT")]
    pub root: Option<String>,

    /// Only report non-directories whose full path matches this regex
    #[arg(short = 'm', long = "matching", value_name = "REGEX")]
    pub pattern: Option<String>,

    /// Read the contents of every matched file (requires --matching)
    #[arg(long)]
    pub read: bool,

    /// Use the blocking walker (first error aborts the whole walk)
    #[arg(long)]
    pub sequential: bool,

    /// Print entries as JSON lines
    #[arg(long)]
    pub json: bool,

    /// Show a live progress line while walking
    #[arg(short = 'p', long)]
    pub progress: bool,

    /// Quiet mode - suppress per-entry output
    #[arg(short = 'q', long)]
    pub quiet: bool,

    /// Verbose output (debug logging, size and mtime columns)
    #[arg(short = 'v', long)]
    pub verbose: bool,
}

/// Validated runtime configuration
#[derive(Debug, Clone)]
pub struct WalkConfig {
    /// Root to walk
    pub root: Option<String>,

    /// Compiled match pattern
    pub pattern: Option<Regex>,

    /// Read contents of matched files
    pub read_contents: bool,

    /// Use the blocking walker
    pub sequential: bool,

    /// Emit JSON lines instead of plain paths
    pub json: bool,

    /// Show progress indicator
    pub show_progress: bool,

    /// Suppress per-entry output
    pub quiet: bool,

    /// Verbose logging
    pub verbose: bool,
}

impl WalkConfig {
    /// Create and validate configuration from CLI arguments
    pub fn from_args(args: CliArgs) -> Result<Self, ConfigError> {
        let pattern = args
            .pattern
            .as_ref()
            .map(|p| {
                Regex::new(p).map_err(|e| ConfigError::InvalidPattern {
                    pattern: p.clone(),
                    reason: e.to_string(),
                })
            })
            .transpose()?;

        if args.read && pattern.is_none() {
            return Err(ConfigError::ReadWithoutPattern);
        }

        Ok(Self {
            root: args.root,
            pattern,
            read_contents: args.read,
            sequential: args.sequential,
            json: args.json,
            show_progress: args.progress && !args.quiet,
            quiet: args.quiet,
            verbose: args.verbose,
        })
    }
}
