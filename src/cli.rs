use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use crate::format::{self, View};
use crate::pipeline::{self, DEFAULT_QUEUE_CAPACITY, PipelineConfig};

fn parse_workers(s: &str) -> Result<usize, String> {
    let n: usize = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid number", s))?;
    match n {
        0 => Err("workers must be at least 1".to_string()),
        n if n > 64 => Err("workers cannot exceed 64".to_string()),
        n => Ok(n),
    }
}

fn parse_capacity(s: &str) -> Result<usize, String> {
    match s.parse::<usize>() {
        Ok(0) => Err("queue capacity must be at least 1".to_string()),
        Ok(n) => Ok(n),
        Err(_) => Err(format!("'{}' is not a valid number", s)),
    }
}

/// Per-page render latency breakdown from statistics logs
#[derive(Parser, Debug)]
#[command(name = "pagestats", version)]
pub struct Cli {
    /// Path to statistics logs
    #[arg(long, default_value = "/var/log/MedApps")]
    pub path: PathBuf,

    /// Display counts
    #[arg(short = 'c', long = "count", conflicts_with = "ci")]
    pub count: bool,

    /// Display confidence intervals
    #[arg(long)]
    pub ci: bool,

    /// Worker threads (1-64), default one per log file
    #[arg(long, value_parser = parse_workers)]
    pub workers: Option<usize>,

    /// Samples buffered between readers and the aggregator
    #[arg(long, default_value_t = DEFAULT_QUEUE_CAPACITY, value_parser = parse_capacity)]
    pub queue_capacity: usize,

    /// Log level (error, warn, info, debug, trace); RUST_LOG wins when set
    #[arg(long, default_value = "warn", value_parser = ["error", "warn", "info", "debug", "trace"])]
    pub log_level: String,
}

impl Cli {
    pub fn view(&self) -> View {
        if self.count {
            View::Count
        } else if self.ci {
            View::Ci
        } else {
            View::Times
        }
    }

    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            workers: self.workers,
            queue_capacity: self.queue_capacity,
        }
    }
}

/// Populate the database, then print the selected table. Nothing is
/// written to stdout unless population succeeded.
pub fn run(cli: Cli) -> Result<()> {
    let db = pipeline::populate_dir(&cli.path, &cli.pipeline_config())
        .with_context(|| format!("cannot build statistics from {}", cli.path.display()))?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    format::render(&db, cli.view(), &mut out).context("writing report")?;
    out.flush().context("writing report")?;
    Ok(())
}
