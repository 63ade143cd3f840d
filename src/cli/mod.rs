//! CLI module for runlist - command-line interface and subcommands.
//!
//! Renders build history snapshots: filtered listings, the recent-builds
//! feed and a short summary.

pub mod commands;

pub use commands::Cli;
