use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Fatal conditions. Malformed log lines never show up here, they are
/// skipped where they are read.
#[derive(Error, Debug)]
pub enum StatsError {
    #[error("{}: cannot list log directory: {source}", path.display())]
    Discovery { path: PathBuf, source: io::Error },

    #[error("{}/statistics.log*: No files found", path.display())]
    NoLogFiles { path: PathBuf },

    #[error("open {}: {source}", path.display())]
    Open { path: PathBuf, source: io::Error },

    #[error("read {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("ingest of {} panicked", path.display())]
    IngestPanicked { path: PathBuf },

    #[error("aggregator thread panicked")]
    AggregatorPanicked,
}

pub type Result<T> = std::result::Result<T, StatsError>;
