use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tailgrep::{
    config::{default_host, DEFAULT_BATCH_CAPACITY},
    scan_with, CancelToken, ScanConfig, StdoutSink,
};
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Scan a log file for matching lines, optionally tail-style.
#[derive(Parser)]
#[command(name = "tailgrep", author, version, about, long_about = None)]
struct Cli {
    /// File to scan
    file: PathBuf,

    /// Literal string or regular expression to match lines against
    #[arg(short = 'q', long)]
    query: String,

    /// Treat the query as a regular expression
    #[arg(short = 'r', long)]
    regex: bool,

    /// Maximum number of concurrent batch workers (values below 1 fall back
    /// to the default of 2)
    #[arg(short = 'j', long = "max-workers", default_value_t = 2, allow_negative_numbers = true)]
    max_workers: i64,

    /// Lines buffered before a batch is handed to a worker
    #[arg(long = "batch-size", default_value_t = DEFAULT_BATCH_CAPACITY)]
    batch_size: usize,

    /// Keep scanning for newly appended lines until interrupted
    #[arg(short = 'F', long)]
    follow: bool,

    /// Delay between follow-mode rescans (e.g. 500ms, 2s)
    #[arg(long, default_value = "1s", value_parser = humantime::parse_duration)]
    interval: Duration,

    /// Print each match as a JSON record on stdout
    #[arg(long)]
    debug: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = ScanConfig {
        path: cli.file,
        query: cli.query,
        is_regex: cli.regex,
        // Negative counts clamp to zero so the library fallback applies
        max_workers: cli.max_workers.max(0) as usize,
        batch_capacity: cli.batch_size,
        follow: cli.follow,
        poll_interval: cli.interval,
        host: default_host(),
        emit_records: cli.debug,
    };
    debug!(
        "Effective workers: {}, batch capacity: {}",
        config.effective_workers(),
        config.effective_batch_capacity()
    );

    let cancel = CancelToken::new();
    if config.follow {
        let token = cancel.clone();
        ctrlc::set_handler(move || {
            eprintln!("Interrupted, draining workers...");
            token.cancel();
        })
        .context("failed to install Ctrl-C handler")?;
    }

    let summary = match scan_with(&config, Arc::new(StdoutSink), cancel) {
        Ok(summary) => summary,
        Err(e) => {
            eprintln!("{} {}", "error:".red().bold(), e);
            println!("Total lines processed: 0");
            println!("Total matches: 0");
            std::process::exit(1);
        }
    };

    println!("Total lines processed: {}", summary.lines_scanned);
    println!(
        "Total matches: {}",
        summary.total_matches.to_string().green()
    );
    Ok(())
}
