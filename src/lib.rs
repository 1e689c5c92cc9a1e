//! Per-page render latency statistics from web-server access logs.
//!
//! Log files are read concurrently, one pool job per file, and every
//! `Rendered <page>|<VERB> in <secs> secs` line is funnelled through a
//! bounded queue into a single aggregator that owns the [`StatsDb`].
//! Once population completes the database is read-only and produces a
//! [`Report`] per page and verb on demand.

pub mod cli;
pub mod error;
pub mod extract;
pub mod format;
pub mod ingest;
pub mod pipeline;
pub mod samples;
pub mod statistic;
pub mod thread_pool;

pub use error::{Result, StatsError};
pub use extract::{Sample, Verb, extract_line};
pub use pipeline::{PipelineConfig, populate, populate_dir};
pub use samples::SampleCollection;
pub use statistic::{Report, StatsDb};
pub use thread_pool::ThreadPool;
