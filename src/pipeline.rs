//! Fan-in of many concurrent file ingestors into one aggregator.
//!
//! ```text
//!   ingest job (file 1) ──┐
//!   ingest job (file 2) ──┼── bounded queue ──► aggregator ──► StatsDb
//!   ingest job (file N) ──┘
//! ```
//!
//! Every job owns a clone of the queue's sender and the driver drops its
//! own copy once all jobs are submitted. The aggregator iterates the
//! receiver, which only ends once every sender is gone *and* the queue is
//! empty, so samples pushed right before a job finishes are never lost.
//! The aggregator is the only writer of the database.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;

use crossbeam::channel::{Receiver, Sender, bounded};
use tracing::{error, info};

use crate::error::{Result, StatsError};
use crate::extract::Sample;
use crate::ingest::{ingest_file, list_files};
use crate::statistic::StatsDb;
use crate::thread_pool::ThreadPool;

pub const DEFAULT_QUEUE_CAPACITY: usize = 1000;

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Worker threads. `None` runs one worker per file.
    pub workers: Option<usize>,
    /// Samples that may sit in the queue before ingestors block.
    pub queue_capacity: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            workers: None,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }
}

impl PipelineConfig {
    fn pool_size(&self, files: usize) -> usize {
        let wanted = self.workers.unwrap_or(files);
        wanted.min(files).max(1)
    }
}

/// First failure per file index, so the reported error does not depend on
/// which thread lost the race.
#[derive(Default)]
struct FirstFailure(Mutex<Option<(usize, StatsError)>>);

impl FirstFailure {
    fn record(&self, index: usize, err: StatsError) {
        let mut slot = self.0.lock().unwrap_or_else(|e| e.into_inner());
        match &*slot {
            Some((first, _)) if *first <= index => {}
            _ => *slot = Some((index, err)),
        }
    }

    fn take(&self) -> Option<StatsError> {
        let mut slot = self.0.lock().unwrap_or_else(|e| e.into_inner());
        slot.take().map(|(_, err)| err)
    }
}

fn aggregate(samples: Receiver<Sample>) -> StatsDb {
    let mut db = StatsDb::new();
    for sample in samples {
        db.add_sample(sample);
    }
    db
}

/// Ingest every file concurrently and return the fully populated database.
/// Any file that cannot be opened or read fails the whole run; the other
/// files are still read to the end first.
pub fn populate(files: &[PathBuf], config: &PipelineConfig) -> Result<StatsDb> {
    populate_with(files, config, ingest_file)
}

fn populate_with<F>(files: &[PathBuf], config: &PipelineConfig, ingest: F) -> Result<StatsDb>
where
    F: Fn(&Path, &Sender<Sample>) -> Result<usize> + Send + Sync + 'static,
{
    let capacity = config.queue_capacity.max(1);
    let (tx, rx) = bounded::<Sample>(capacity);

    let aggregator = thread::spawn(move || aggregate(rx));

    let ingest = Arc::new(ingest);
    let failure = Arc::new(FirstFailure::default());
    // set only when a job returned, so a panicked job leaves its flag down
    let finished: Arc<Vec<AtomicBool>> =
        Arc::new(files.iter().map(|_| AtomicBool::new(false)).collect());
    let pool = ThreadPool::new(config.pool_size(files.len()));
    info!(
        files = files.len(),
        workers = pool.size(),
        queue_capacity = capacity,
        "ingesting logs"
    );

    for (index, path) in files.iter().enumerate() {
        let tx = tx.clone();
        let path = path.clone();
        let ingest = Arc::clone(&ingest);
        let failure = Arc::clone(&failure);
        let finished = Arc::clone(&finished);
        pool.execute(move || {
            if let Err(err) = ingest(&path, &tx) {
                error!(file = %path.display(), "{err}");
                failure.record(index, err);
            }
            finished[index].store(true, Ordering::Release);
        });
    }
    drop(tx);

    pool.join();
    drop(pool);

    for (index, path) in files.iter().enumerate() {
        if !finished[index].load(Ordering::Acquire) {
            error!(file = %path.display(), "ingest did not complete");
            failure.record(index, StatsError::IngestPanicked { path: path.clone() });
        }
    }

    let db = aggregator
        .join()
        .map_err(|_| StatsError::AggregatorPanicked)?;

    if let Some(err) = failure.take() {
        return Err(err);
    }

    info!(
        pages = db.len(),
        samples = db.sample_count(),
        "population complete"
    );
    Ok(db)
}

/// Discover the logs under `dir` and [`populate`] from them.
pub fn populate_dir(dir: &Path, config: &PipelineConfig) -> Result<StatsDb> {
    let files = list_files(dir)?;
    info!(dir = %dir.display(), files = files.len(), "found log files");
    populate(&files, config)
}
