//! Reading log files: finding them, opening plain or bzip2 streams, and
//! pushing every render sample into the aggregation queue.

use std::fs::{self, File};
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};

use bzip2::read::MultiBzDecoder;
use crossbeam::channel::Sender;
use tracing::debug;

use crate::error::{Result, StatsError};
use crate::extract::{Sample, extract_line};

/// File name prefix shared by the live log and its rotations.
pub const LOG_PREFIX: &str = "statistics.log";

/// Rotated logs ending in this are bzip2-compressed.
pub const COMPRESSED_SUFFIX: &str = ".bz2";

/// Every regular `statistics.log*` file directly inside `dir`, sorted.
pub fn list_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let discovery = |source| StatsError::Discovery {
        path: dir.to_path_buf(),
        source,
    };

    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(discovery)? {
        let path = entry.map_err(discovery)?.path();
        // follows symlinks; directories and dangling links are skipped
        if !path.is_file() {
            continue;
        }
        let matches = path
            .file_name()
            .is_some_and(|name| name.to_string_lossy().starts_with(LOG_PREFIX));
        if matches {
            files.push(path);
        }
    }

    if files.is_empty() {
        return Err(StatsError::NoLogFiles {
            path: dir.to_path_buf(),
        });
    }
    files.sort();
    Ok(files)
}

pub fn is_compressed(path: &Path) -> bool {
    path.to_string_lossy().ends_with(COMPRESSED_SUFFIX)
}

/// Line reader over `path`, decompressing when the name says so.
pub fn open_reader(path: &Path) -> Result<Box<dyn BufRead + Send>> {
    let file = File::open(path).map_err(|source| StatsError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    let reader: Box<dyn Read + Send> = if is_compressed(path) {
        Box::new(MultiBzDecoder::new(file))
    } else {
        Box::new(file)
    };
    Ok(Box::new(BufReader::new(reader)))
}

/// Push every sample in `path` to `sink`. Returns how many were sent.
pub fn ingest_file(path: &Path, sink: &Sender<Sample>) -> Result<usize> {
    let reader = open_reader(path)?;
    let sent = scan_lines(reader, sink).map_err(|source| StatsError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(file = %path.display(), samples = sent, "ingested");
    Ok(sent)
}

/// Extract samples line by line until end of stream. Lines that are not
/// render records are skipped. Stops early if the receiving side is gone.
pub fn scan_lines<R: BufRead>(mut reader: R, sink: &Sender<Sample>) -> std::io::Result<usize> {
    let mut buf = Vec::new();
    let mut sent = 0;

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        let line = String::from_utf8_lossy(&buf);
        let Some(sample) = extract_line(&line) else {
            continue;
        };
        if sink.send(sample).is_err() {
            break;
        }
        sent += 1;
    }

    Ok(sent)
}
