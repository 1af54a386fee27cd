//! Per-run storage layout
//!
//! All persisted state of one run lives under a metrics directory keyed by
//! the input name and the windowing-configuration signature:
//!
//! ```text
//! <root>/<input>/<signature>/<metric>.log    one JSON record per line
//! <root>/<input>/<signature>/drift_windows.json
//! ```

use std::path::{Path, PathBuf};

use log::debug;

use crate::window::WindowingConfig;

/// Resolved storage paths for one run
#[derive(Debug, Clone, PartialEq)]
pub struct RunPaths {
    dir: PathBuf,
}

impl RunPaths {
    pub fn new(root: impl AsRef<Path>, input_name: &str, config: &WindowingConfig) -> Self {
        let dir = root
            .as_ref()
            .join(sanitize(input_name))
            .join(config.signature());
        debug!("run directory resolved to {}", dir.display());
        Self { dir }
    }

    /// The per-run metrics directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Append-only log file for one metric
    pub fn metric_log(&self, metric_name: &str) -> PathBuf {
        self.dir.join(format!("{}.log", sanitize(metric_name)))
    }

    /// Append-only change-point log for one monitored dimension
    pub fn dimension_log(&self, dimension: &str) -> PathBuf {
        self.dir.join(format!("drift_{}.log", sanitize(dimension)))
    }

    /// Drift-window summary, written at query time
    pub fn drift_summary(&self) -> PathBuf {
        self.dir.join("drift_windows.json")
    }
}

/// Keep path components free of separators and other hostile characters
fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.' {
                c
            } else {
                '_'
            }
        })
        .collect()
}
