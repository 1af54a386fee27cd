//! Run controller state machine
//!
//! Coordinates the mining phase (segmentation + model discovery, driven
//! sequentially in window order) and the metrics phase (the concurrent
//! engine). Each phase moves `NotStarted → Started → Finished`, with the
//! metrics phase alternatively terminating in `TimedOut`. Callers observe
//! progress by polling; nothing here blocks on the concurrent computation.
//!
//! The controller is an explicitly constructed instance handed to callers;
//! for process-wide sharing wrap it in an `Arc`.

use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::OnceLock;

use log::info;
use procdrift_core::{Error, Result, RunPaths, StreamItem, WindowingConfig};

use crate::engine::{MetricEngine, MetricsOptions};
use crate::metrics::{ArtifactPair, MetricKind};
use crate::miner::{ModelMiner, WindowArtifact};
use crate::segmenter;

/// Lifecycle of one phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum PhaseStatus {
    NotStarted = 0,
    Started = 1,
    Finished = 2,
    /// Degraded terminal state, reachable only by the metrics phase
    TimedOut = 3,
}

impl PhaseStatus {
    pub(crate) fn from_u8(value: u8) -> Self {
        match value {
            1 => PhaseStatus::Started,
            2 => PhaseStatus::Finished,
            3 => PhaseStatus::TimedOut,
            _ => PhaseStatus::NotStarted,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, PhaseStatus::Finished | PhaseStatus::TimedOut)
    }
}

impl fmt::Display for PhaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PhaseStatus::NotStarted => "NOT_STARTED",
            PhaseStatus::Started => "STARTED",
            PhaseStatus::Finished => "FINISHED",
            PhaseStatus::TimedOut => "TIMEOUT",
        };
        write!(f, "{s}")
    }
}

/// Snapshot of both phases, returned by polling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunStatus {
    pub mining: PhaseStatus,
    pub metrics: PhaseStatus,
}

impl RunStatus {
    /// A run is complete only when both phases reached a terminal state
    pub fn is_complete(&self) -> bool {
        self.mining.is_terminal() && self.metrics.is_terminal()
    }
}

/// Coordinates one drift-detection run
pub struct RunController {
    windowing: WindowingConfig,
    metrics: Vec<MetricKind>,
    options: MetricsOptions,
    paths: RunPaths,
    mining: AtomicU8,
    engine: OnceLock<MetricEngine>,
}

impl RunController {
    pub fn new(
        paths: RunPaths,
        windowing: WindowingConfig,
        metrics: Vec<MetricKind>,
        options: MetricsOptions,
    ) -> Self {
        Self {
            windowing,
            metrics,
            options,
            paths,
            mining: AtomicU8::new(PhaseStatus::NotStarted as u8),
            engine: OnceLock::new(),
        }
    }

    /// Drive a full run: segment the stream, discover one model per window
    /// through `miner`, and fan each adjacent window pair out to the
    /// metric engine. Returns the final window count.
    ///
    /// Segmentation is sequential (models must be discovered in window
    /// order); the metric computations run concurrently and outlive this
    /// call; poll [`status`](Self::status) for completion.
    pub fn run<M: ModelMiner>(
        &self,
        items: impl IntoIterator<Item = StreamItem>,
        miner: &mut M,
    ) -> Result<u64> {
        if self.engine.get().is_some() {
            return Err(Error::InvalidInput(
                "run already started on this controller".to_string(),
            ));
        }
        let engine = MetricEngine::start(
            self.paths.clone(),
            self.metrics.clone(),
            &self.options,
        )?;
        if self.engine.set(engine).is_err() {
            return Err(Error::InvalidInput(
                "run already started on this controller".to_string(),
            ));
        }
        // set() just succeeded
        let engine = self.engine.get().ok_or_else(|| {
            Error::Computation("metric engine unavailable after start".to_string())
        })?;

        self.mining
            .store(PhaseStatus::Started as u8, Ordering::Release);
        info!(
            "run started: windowing {}, {} metrics",
            self.windowing.signature(),
            self.metrics.len()
        );

        let attributes: Vec<String> = self
            .metrics
            .iter()
            .filter_map(|m| match m {
                MetricKind::AttributeShift { attribute } => Some(attribute.clone()),
                _ => None,
            })
            .collect();

        let mut previous: Option<std::sync::Arc<WindowArtifact>> = None;
        let window_count = segmenter::segment(items, &self.windowing, |window, sublog| {
            let model = miner.discover(window, sublog)?;
            let artifact = std::sync::Arc::new(WindowArtifact::from_sublog(
                model, sublog, &attributes,
            ));
            if let Some(left) = previous.take() {
                engine.submit(
                    window.index,
                    ArtifactPair {
                        left,
                        right: artifact.clone(),
                    },
                );
            }
            previous = Some(artifact);
            Ok(())
        })?;

        self.mining
            .store(PhaseStatus::Finished as u8, Ordering::Release);
        engine.set_final_window_count(window_count);
        info!("mining finished: {window_count} windows");
        Ok(window_count)
    }

    /// Poll both phases
    pub fn status(&self) -> RunStatus {
        RunStatus {
            mining: PhaseStatus::from_u8(self.mining.load(Ordering::Acquire)),
            metrics: self
                .engine
                .get()
                .map(MetricEngine::status)
                .unwrap_or(PhaseStatus::NotStarted),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.status().is_complete()
    }

    /// Deduplicated drift-candidate window indices computed so far; also
    /// refreshes the drift-window summary file
    pub fn drift_candidates(&self) -> Result<Vec<u64>> {
        match self.engine.get() {
            Some(engine) => engine.drift_candidates(),
            None => Ok(Vec::new()),
        }
    }

    /// Completed metric units so far
    pub fn completed_units(&self) -> u64 {
        self.engine
            .get()
            .map(MetricEngine::completed_units)
            .unwrap_or(0)
    }
}
