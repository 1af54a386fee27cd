//! Append-only persistence for metric results
//!
//! One log file per metric, one serialized JSON record per line. Each line
//! is written with a single `write_all` under that metric's lock, so
//! concurrent appends for different metrics never interleave bytes within
//! one file. Readers sort by window index: tasks complete in arbitrary
//! order, so on-disk order carries no meaning.

use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use log::{debug, warn};
use procdrift_core::{MetricResult, Result};

/// Abstract append-only sink for metric results
///
/// The file-backed implementation below is the only storage backend; the
/// seam exists so another backend can replace it without touching the
/// metric engine.
pub trait AppendSink: Send {
    fn append(&mut self, record: &MetricResult) -> Result<()>;
}

/// File-backed sink: one line-oriented JSON log
#[derive(Debug)]
pub struct FileSink {
    path: PathBuf,
    file: File,
}

impl FileSink {
    /// Open the sink, truncating any pre-existing log so a run's log
    /// reflects only that run
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        if path.exists() {
            debug!("removing stale metric log {}", path.display());
            fs::remove_file(&path)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self { path, file })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl AppendSink for FileSink {
    fn append(&mut self, record: &MetricResult) -> Result<()> {
        let mut line = serde_json::to_string(record)?;
        line.push('\n');
        // One write per record keeps every line complete and parseable
        self.file.write_all(line.as_bytes())?;
        Ok(())
    }
}

/// Read one metric's log back, sorted by window index.
///
/// Unparseable lines are skipped with a warning rather than failing the
/// read; a crash mid-append may leave at most one short final line.
pub fn read_metric_log(path: impl AsRef<Path>) -> Result<Vec<MetricResult>> {
    let path = path.as_ref();
    if !path.exists() {
        return Ok(Vec::new());
    }
    let reader = BufReader::new(File::open(path)?);
    let mut results = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<MetricResult>(&line) {
            Ok(record) => results.push(record),
            Err(e) => warn!("skipping malformed record in {}: {e}", path.display()),
        }
    }
    results.sort_by_key(|r| r.window_index);
    Ok(results)
}

/// Write one dimension's change-point log, one JSON record per line.
///
/// The log is written once per run, so pre-existing content is replaced.
pub fn write_change_points(
    path: impl AsRef<Path>,
    records: &[procdrift_core::ChangePointRecord],
) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = File::create(path)?;
    for record in records {
        let mut line = serde_json::to_string(record)?;
        line.push('\n');
        file.write_all(line.as_bytes())?;
    }
    Ok(())
}

/// Write the drift-window summary: the deduplicated, sorted candidate
/// window indices, as one JSON document
pub fn write_drift_summary(path: impl AsRef<Path>, candidates: &[u64]) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = File::create(path)?;
    let body = serde_json::to_string_pretty(&candidates)?;
    file.write_all(body.as_bytes())?;
    Ok(())
}
