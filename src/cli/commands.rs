//! CLI command definitions using clap.
//!
//! Defines the main CLI structure and subcommands:
//! - list: merged, filtered build history
//! - feed: recent completed builds
//! - summary: count, first and last build

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// runlist - browse CI build history
#[derive(Parser, Debug)]
#[command(name = "runlist")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Optional config file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory of <job>.jsonl history files (overrides config)
    #[arg(long, global = true)]
    pub history: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Check if verbose mode is enabled
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }
}

/// Main subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List builds, newest first
    List {
        /// Only these jobs (repeatable, default: all)
        #[arg(short, long = "job")]
        jobs: Vec<String>,

        /// Only builds that did not succeed
        #[arg(long)]
        failures: bool,

        /// Only builds that are worse than their predecessor
        #[arg(long)]
        regressions: bool,

        /// Only builds executed on this node
        #[arg(long)]
        node: Option<String>,

        /// Only builds started at or after this time (RFC 3339)
        #[arg(long)]
        since: Option<DateTime<Utc>>,

        /// Only builds started before this time (RFC 3339)
        #[arg(long)]
        until: Option<DateTime<Utc>>,

        /// Show at most this many builds
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },

    /// Recent completed builds, as published in feeds
    Feed {
        /// Only these jobs (repeatable, default: all)
        #[arg(short, long = "job")]
        jobs: Vec<String>,
    },

    /// Build count plus first and last build
    Summary {
        /// Only these jobs (repeatable, default: all)
        #[arg(short, long = "job")]
        jobs: Vec<String>,
    },
}
