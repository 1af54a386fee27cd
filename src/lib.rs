//! Concurrent concept-drift detection and evaluation for process event
//! streams.
//!
//! This facade re-exports the workspace crates:
//!
//! - [`procdrift_core`]: stream/window data model, configuration, errors
//! - [`procdrift_changepoint`]: streaming adaptive change-point detectors
//! - [`procdrift_engine`]: window segmentation, the concurrent dissimilarity
//!   metric engine, and the run controller
//! - [`procdrift_eval`]: accuracy metrics against ground-truth drift points

pub use procdrift_changepoint as changepoint;
pub use procdrift_core as core;
pub use procdrift_engine as engine;
pub use procdrift_eval as eval;

pub use procdrift_core::{Error, Result};
