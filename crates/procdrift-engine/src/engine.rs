//! Concurrent dissimilarity metric engine
//!
//! For every adjacent window pair and every configured metric, one
//! independent unit of work is spawned onto a shared worker pool. Units
//! for different metrics never block each other; units for the same metric
//! serialize only on the log append. A shared atomic counter tracks
//! completions: the engine is finished exactly when the counter reaches
//! `(final_window_count − 1) × metric_count` (tumbling windows).
//!
//! A dedicated monitor thread enforces a wall-clock timeout. Exceeding it
//! force-transitions the engine to a degraded `TimedOut` terminal state;
//! in-flight units finish naturally (no forced kill, no partial log
//! writes) and whatever was computed remains available.

use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use log::{info, warn};
use procdrift_core::{MetricResult, Result, RunPaths};

use crate::controller::PhaseStatus;
use crate::metrics::{ArtifactPair, MetricKind};
use crate::store::{self, AppendSink, FileSink};

/// Sentinel: final window count not yet known
const WINDOW_COUNT_PENDING: u64 = u64::MAX;

/// Tunables of the metrics phase
#[derive(Debug, Clone)]
pub struct MetricsOptions {
    /// Wall-clock budget before the phase degrades to `TimedOut`
    pub timeout: Duration,
    /// Monitor poll interval
    pub poll_interval: Duration,
    /// Worker threads; `None` uses the host default
    pub worker_threads: Option<usize>,
}

impl Default for MetricsOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(120),
            poll_interval: Duration::from_millis(250),
            worker_threads: None,
        }
    }
}

struct EngineShared {
    metrics: Vec<MetricKind>,
    /// One lock per metric, index-aligned with `metrics`
    sinks: Vec<Mutex<FileSink>>,
    /// Completed units, dissimilar or not
    completed: AtomicU64,
    /// Set once mining finishes; `WINDOW_COUNT_PENDING` until then
    final_window_count: AtomicU64,
    status: AtomicU8,
    started_at: Instant,
    timeout: Duration,
}

impl EngineShared {
    fn status(&self) -> PhaseStatus {
        PhaseStatus::from_u8(self.status.load(Ordering::Acquire))
    }

    fn transition(&self, from: PhaseStatus, to: PhaseStatus) -> bool {
        self.status
            .compare_exchange(
                from as u8,
                to as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok()
    }

    /// Units expected for natural completion, once the window count is known
    fn expected_units(&self) -> Option<u64> {
        let windows = self.final_window_count.load(Ordering::Acquire);
        if windows == WINDOW_COUNT_PENDING {
            return None;
        }
        Some(windows.saturating_sub(1) * self.metrics.len() as u64)
    }

    /// Transition to `Finished` when the completion arithmetic is met
    fn maybe_finish(&self) {
        if let Some(expected) = self.expected_units() {
            if self.completed.load(Ordering::Acquire) >= expected
                && self.transition(PhaseStatus::Started, PhaseStatus::Finished)
            {
                info!("metric engine finished: {expected} units completed");
            }
        }
    }
}

/// The concurrent metric engine; cheap to clone handles via `Arc` inside
pub struct MetricEngine {
    shared: Arc<EngineShared>,
    pool: rayon::ThreadPool,
    paths: RunPaths,
}

impl MetricEngine {
    /// Start a metrics run.
    ///
    /// Deletes any pre-existing per-metric log for this configuration, so
    /// the run's logs reflect only this run, and spawns the timeout
    /// monitor.
    pub fn start(
        paths: RunPaths,
        metrics: Vec<MetricKind>,
        options: &MetricsOptions,
    ) -> Result<Self> {
        let mut sinks = Vec::with_capacity(metrics.len());
        for metric in &metrics {
            sinks.push(Mutex::new(FileSink::create(paths.metric_log(&metric.name()))?));
        }

        let shared = Arc::new(EngineShared {
            metrics,
            sinks,
            completed: AtomicU64::new(0),
            final_window_count: AtomicU64::new(WINDOW_COUNT_PENDING),
            status: AtomicU8::new(PhaseStatus::Started as u8),
            started_at: Instant::now(),
            timeout: options.timeout,
        });

        let mut builder = rayon::ThreadPoolBuilder::new();
        if let Some(threads) = options.worker_threads {
            builder = builder.num_threads(threads);
        }
        let pool = builder
            .build()
            .map_err(|e| procdrift_core::Error::Computation(format!("worker pool: {e}")))?;

        spawn_monitor(Arc::clone(&shared), options.poll_interval);

        Ok(Self {
            shared,
            pool,
            paths,
        })
    }

    /// Schedule one unit of work per configured metric for the window pair
    /// ending at `window_index`.
    ///
    /// Requires both windows of the pair to be fully materialized; the
    /// caller (the run controller) submits in window order, but tasks
    /// complete in any order.
    pub fn submit(&self, window_index: u64, pair: ArtifactPair) {
        for metric_index in 0..self.shared.metrics.len() {
            let shared = Arc::clone(&self.shared);
            let pair = pair.clone();
            self.pool.spawn(move || {
                run_unit(&shared, metric_index, window_index, &pair);
            });
        }
    }

    /// Record the final window count, enabling the completion arithmetic
    pub fn set_final_window_count(&self, windows: u64) {
        self.shared
            .final_window_count
            .store(windows, Ordering::Release);
        info!("final window count: {windows}");
        self.shared.maybe_finish();
    }

    /// Completed units so far (dissimilar or not)
    pub fn completed_units(&self) -> u64 {
        self.shared.completed.load(Ordering::Acquire)
    }

    pub fn status(&self) -> PhaseStatus {
        self.shared.status()
    }

    /// True once the completion counter reached
    /// `(final_window_count − 1) × metric_count`
    pub fn is_finished(&self) -> bool {
        self.shared.status() == PhaseStatus::Finished
    }

    /// Deduplicated, sorted drift-candidate window indices from the
    /// persisted dissimilar results; also writes the drift-window summary
    /// file. Usable mid-run and after a timeout (partial results).
    pub fn drift_candidates(&self) -> Result<Vec<u64>> {
        let mut candidates = Vec::new();
        for metric in &self.shared.metrics {
            let results = store::read_metric_log(self.paths.metric_log(&metric.name()))?;
            candidates.extend(
                results
                    .iter()
                    .filter(|r| r.dissimilar)
                    .map(|r| r.window_index),
            );
        }
        candidates.sort_unstable();
        candidates.dedup();
        store::write_drift_summary(self.paths.drift_summary(), &candidates)?;
        Ok(candidates)
    }
}

/// One unit: compute one metric for one window pair, persist if
/// dissimilar, bump the completion counter
fn run_unit(shared: &EngineShared, metric_index: usize, window_index: u64, pair: &ArtifactPair) {
    let metric = &shared.metrics[metric_index];

    // A failed computation is recorded as a placeholder, never aborts
    // sibling units or the run
    let result = match metric.calculate(pair) {
        Ok(value) => {
            let dissimilar = metric.is_dissimilar(&value);
            MetricResult::new(window_index, metric.name(), value, dissimilar)
        }
        Err(e) => {
            warn!(
                "metric {} not calculated for window {window_index}: {e}",
                metric.name()
            );
            MetricResult::not_calculated(window_index, metric.name())
        }
    };

    if result.dissimilar {
        match shared.sinks[metric_index].lock() {
            Ok(mut sink) => {
                if let Err(e) = sink.append(&result) {
                    warn!("append to {} log failed: {e}", metric.name());
                }
            }
            Err(poisoned) => {
                // A panicked append still leaves the file usable
                if let Err(e) = poisoned.into_inner().append(&result) {
                    warn!("append to {} log failed: {e}", metric.name());
                }
            }
        }
    }

    shared.completed.fetch_add(1, Ordering::AcqRel);
    shared.maybe_finish();
}

/// Timeout monitor: polls elapsed wall-clock time, never holds a metric
/// lock. On expiry the phase degrades to `TimedOut`; in-flight units are
/// left to finish naturally.
fn spawn_monitor(shared: Arc<EngineShared>, poll_interval: Duration) {
    std::thread::Builder::new()
        .name("procdrift-metrics-monitor".to_string())
        .spawn(move || loop {
            std::thread::sleep(poll_interval);
            match shared.status() {
                PhaseStatus::Started => {}
                _ => break,
            }
            if shared.started_at.elapsed() > shared.timeout {
                if shared.transition(PhaseStatus::Started, PhaseStatus::TimedOut) {
                    warn!(
                        "metrics phase timed out after {:?}; reporting partial results",
                        shared.timeout
                    );
                }
                break;
            }
        })
        // Thread spawn failure leaves the engine without a timeout, which
        // degrades liveness but not correctness
        .map_err(|e| warn!("could not spawn timeout monitor: {e}"))
        .ok();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::miner::{ModelHandle, WindowArtifact};
    use procdrift_core::{ReadAs, WindowUnit, WindowingConfig};
    use std::collections::BTreeSet;

    fn paths(dir: &std::path::Path) -> RunPaths {
        let cfg = WindowingConfig::new(WindowUnit::Items, 10, ReadAs::Trace).unwrap();
        RunPaths::new(dir, "test_log", &cfg)
    }

    fn artifact(nodes: &[&str]) -> Arc<WindowArtifact> {
        let nodes: BTreeSet<String> = nodes.iter().map(|s| s.to_string()).collect();
        Arc::new(WindowArtifact::new(ModelHandle::new(nodes, BTreeSet::new())))
    }

    fn wait_terminal(engine: &MetricEngine) -> PhaseStatus {
        let deadline = Instant::now() + Duration::from_secs(10);
        loop {
            let status = engine.status();
            if status != PhaseStatus::Started {
                return status;
            }
            assert!(Instant::now() < deadline, "engine never reached a terminal state");
            std::thread::sleep(Duration::from_millis(10));
        }
    }

    #[test]
    fn test_completion_counter_arithmetic() {
        let dir = tempfile::tempdir().unwrap();
        let metrics = vec![MetricKind::NodeOverlap, MetricKind::EdgeOverlap];
        let engine =
            MetricEngine::start(paths(dir.path()), metrics, &MetricsOptions::default()).unwrap();

        // 4 windows, 2 metrics: (4 - 1) * 2 = 6 units
        let artifacts = [
            artifact(&["a"]),
            artifact(&["a", "b"]),
            artifact(&["a", "b"]),
            artifact(&["c"]),
        ];
        for i in 1..artifacts.len() {
            engine.submit(
                (i + 1) as u64,
                ArtifactPair {
                    left: artifacts[i - 1].clone(),
                    right: artifacts[i].clone(),
                },
            );
        }
        engine.set_final_window_count(4);

        assert_eq!(wait_terminal(&engine), PhaseStatus::Finished);
        assert_eq!(engine.completed_units(), 6);
        assert!(engine.is_finished());
    }

    #[test]
    fn test_single_window_finishes_immediately() {
        let dir = tempfile::tempdir().unwrap();
        let engine = MetricEngine::start(
            paths(dir.path()),
            vec![MetricKind::NodeOverlap],
            &MetricsOptions::default(),
        )
        .unwrap();

        // One window means zero pairs: finished with zero units
        engine.set_final_window_count(1);
        assert!(engine.is_finished());
        assert_eq!(engine.completed_units(), 0);
    }

    #[test]
    fn test_only_dissimilar_results_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let run_paths = paths(dir.path());
        let engine = MetricEngine::start(
            run_paths.clone(),
            vec![MetricKind::NodeOverlap],
            &MetricsOptions::default(),
        )
        .unwrap();

        let same = artifact(&["a", "b"]);
        let changed = artifact(&["a", "z"]);
        engine.submit(
            2,
            ArtifactPair {
                left: same.clone(),
                right: same.clone(),
            },
        );
        engine.submit(
            3,
            ArtifactPair {
                left: same,
                right: changed,
            },
        );
        engine.set_final_window_count(3);
        wait_terminal(&engine);

        let results = store::read_metric_log(run_paths.metric_log("nodes")).unwrap();
        // Window 2 was similar: not persisted
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].window_index, 3);

        let candidates = engine.drift_candidates().unwrap();
        assert_eq!(candidates, vec![3]);
        assert!(run_paths.drift_summary().exists());
    }

    #[test]
    fn test_timeout_degrades_to_terminal_state() {
        let dir = tempfile::tempdir().unwrap();
        let options = MetricsOptions {
            timeout: Duration::from_millis(50),
            poll_interval: Duration::from_millis(10),
            worker_threads: Some(1),
        };
        let engine =
            MetricEngine::start(paths(dir.path()), vec![MetricKind::NodeOverlap], &options)
                .unwrap();

        // Never set the final window count: natural completion impossible
        engine.submit(
            2,
            ArtifactPair {
                left: artifact(&["a"]),
                right: artifact(&["b"]),
            },
        );

        assert_eq!(wait_terminal(&engine), PhaseStatus::TimedOut);
        // Partial results remain readable
        let candidates = engine.drift_candidates().unwrap();
        assert_eq!(candidates, vec![2]);
    }

    #[test]
    fn test_computation_error_counts_as_completed() {
        let dir = tempfile::tempdir().unwrap();
        let metrics = vec![MetricKind::AttributeShift {
            attribute: "duration".to_string(),
        }];
        let engine =
            MetricEngine::start(paths(dir.path()), metrics, &MetricsOptions::default()).unwrap();

        // Artifacts carry no samples: the test cannot be computed
        engine.submit(
            2,
            ArtifactPair {
                left: artifact(&["a"]),
                right: artifact(&["a"]),
            },
        );
        engine.set_final_window_count(2);

        assert_eq!(wait_terminal(&engine), PhaseStatus::Finished);
        assert_eq!(engine.completed_units(), 1);
        // Placeholder is not dissimilar, so nothing was persisted
        assert!(engine.drift_candidates().unwrap().is_empty());
    }
}
