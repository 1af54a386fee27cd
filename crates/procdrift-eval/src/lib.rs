//! Accuracy metrics for drift detection against ground truth
//!
//! Given the drift points a detector raised and the known ground-truth
//! drift points, [`evaluate`] matches them with a greedy closest-preceding
//! algorithm and derives F-score, false-positive rate, and mean detection
//! delay. Everything here is a pure function of its inputs: no I/O, no
//! side effects, identical inputs yield identical results.

pub mod matching;
pub mod result;

pub use matching::{evaluate, evaluate_records};
pub use result::EvaluationResult;
