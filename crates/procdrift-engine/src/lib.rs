//! Window segmentation, concurrent dissimilarity metrics, and run control
//!
//! The pipeline: an ordered event/trace stream is segmented into tumbling
//! windows; an external model miner discovers one model per window; for
//! every adjacent window pair each configured metric runs as one
//! independent unit on a shared worker pool, persisting dissimilar results
//! to per-metric append-only logs; a run controller exposes phase status
//! and the drift-candidate windows via polling.
//!
//! ```no_run
//! use procdrift_core::{stream_items, ReadAs, RunPaths, WindowUnit, WindowingConfig};
//! use procdrift_engine::{
//!     DirectlyFollowsMiner, MetricKind, MetricsOptions, RunController,
//! };
//!
//! # fn main() -> procdrift_core::Result<()> {
//! let windowing = WindowingConfig::new(WindowUnit::Items, 100, ReadAs::Trace)?;
//! let controller = RunController::new(
//!     RunPaths::new("metrics", "order_log", &windowing),
//!     windowing,
//!     vec![MetricKind::NodeOverlap, MetricKind::EdgeOverlap],
//!     MetricsOptions::default(),
//! );
//!
//! let traces = Vec::new(); // from a LogSource
//! let mut miner = DirectlyFollowsMiner;
//! controller.run(stream_items(traces, ReadAs::Trace), &mut miner)?;
//!
//! while !controller.is_complete() {
//!     std::thread::sleep(std::time::Duration::from_millis(100));
//! }
//! println!("drift candidates: {:?}", controller.drift_candidates()?);
//! # Ok(())
//! # }
//! ```

pub mod controller;
pub mod detect;
pub mod engine;
pub mod metrics;
pub mod miner;
pub mod segmenter;
pub mod store;

// Re-exports
pub use controller::{PhaseStatus, RunController, RunStatus};
pub use detect::{detect_attribute_drift, detect_and_persist};
pub use engine::{MetricEngine, MetricsOptions};
pub use metrics::{ArtifactPair, MetricKind, ATTRIBUTE_P_THRESHOLD};
pub use miner::{DirectlyFollowsMiner, LogSource, ModelHandle, ModelMiner, WindowArtifact};
pub use segmenter::segment;
pub use store::{read_metric_log, write_change_points, write_drift_summary, AppendSink, FileSink};
