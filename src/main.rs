use chrono::Utc;
use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use log::info;
use std::fs;
use std::path::PathBuf;

use runlist::domain::{Build, BuildResult, Run};
use runlist::storage::JsonlHistory;
use runlist::RunList;

mod cli;
mod config;

use cli::Cli;
use cli::commands::Commands;
use config::Config;

fn setup_logging() -> Result<()> {
    // Create log directory
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("runlist")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    let log_file = log_dir.join("runlist.log");

    // Setup env_logger with file output
    let target = Box::new(
        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)
            .context("Failed to open log file")?,
    );

    env_logger::Builder::from_default_env()
        .target(env_logger::Target::Pipe(target))
        .init();

    info!("Logging initialized, writing to: {}", log_file.display());
    Ok(())
}

fn run_application(cli: &Cli, config: &Config) -> Result<()> {
    info!("Starting application");

    let history_dir = cli.history.clone().unwrap_or_else(|| config.history.dir.clone());
    if cli.is_verbose() {
        println!("{} {}", "Reading history from".yellow(), history_dir.display());
    }

    let history = JsonlHistory::open(&history_dir)
        .context(format!("Failed to load history from {}", history_dir.display()))?;

    match &cli.command {
        Commands::List {
            jobs,
            failures,
            regressions,
            node,
            since,
            until,
            limit,
        } => {
            let mut list = RunList::from_jobs(history.select(jobs)?);
            if *failures {
                list = list.failure_only();
            }
            if *regressions {
                list = list.regression_only();
            }
            if let Some(node) = node {
                list = list.node(node.as_str());
            }
            if since.is_some() || until.is_some() {
                let start = since.map_or(i64::MIN, |t| t.timestamp_millis());
                let end = until.map_or(i64::MAX, |t| t.timestamp_millis());
                list = list.by_timestamp(start, end);
            }
            if let Some(max) = *limit {
                list = list.limit(move |index, _| index < max);
            }
            handle_list_command(&list)
        }
        Commands::Feed { jobs } => {
            let list = RunList::from_jobs(history.select(jobs)?).new_builds_within(config.feed.window()?, Utc::now());
            handle_list_command(&list)
        }
        Commands::Summary { jobs } => handle_summary_command(&RunList::from_jobs(history.select(jobs)?)),
    }
}

fn colored_result(build: &Build) -> ColoredString {
    match build.result {
        None => "building".cyan(),
        Some(BuildResult::Success) => "success".green(),
        Some(BuildResult::Unstable) => "unstable".yellow(),
        Some(result) => result.label().red(),
    }
}

fn print_build(build: &Build) {
    let mut line = format!(
        "{}  {:<30} {:<9}",
        build.timestamp.format("%Y-%m-%d %H:%M:%S"),
        build.display_name(),
        colored_result(build)
    );
    if let Some(node) = build.built_on() {
        line.push_str(&format!(" on {}", node));
    }
    if build.is_regression() {
        line.push_str(&format!("  {}", build.summary.message.red().bold()));
    }
    println!("{}", line);
}

fn handle_list_command(list: &RunList<'_, Build>) -> Result<()> {
    let mut shown = 0;
    for build in list {
        print_build(build);
        shown += 1;
    }
    info!("Listed {} builds", shown);
    if shown == 0 {
        println!("{}", "No builds".yellow());
    }
    Ok(())
}

fn handle_summary_command(list: &RunList<'_, Build>) -> Result<()> {
    println!("{} {}", "Builds:".green(), list.len());
    if let Some(build) = list.last_build() {
        println!("{} {}", "Last build:".green(), build.display_name());
    }
    if let Some(build) = list.first_build() {
        println!("{} {}", "First build:".green(), build.display_name());
    }
    let regressions = list.clone().regression_only().len();
    println!("{} {}", "Regressions:".green(), regressions);
    Ok(())
}

fn main() -> Result<()> {
    // Setup logging first
    setup_logging().context("Failed to setup logging")?;

    // Parse CLI arguments
    let cli = Cli::parse();

    // Load configuration
    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    info!("Starting with config from: {:?}", cli.config);

    // Run the main application logic
    run_application(&cli, &config).context("Application failed")?;

    Ok(())
}
