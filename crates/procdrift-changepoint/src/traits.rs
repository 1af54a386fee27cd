//! Core traits for streaming drift detection
//!
//! Detectors in this crate are *adaptive*: their internal memory grows and
//! shrinks with the observed distribution rather than being a fixed-size
//! sliding window. One detector instance serves exactly one monitored
//! dimension; values must be pushed in stream order by a single caller.

/// Properties of a detector that don't depend on its state
pub trait DetectorProperties {
    /// Get the name of the detection algorithm
    fn algorithm_name(&self) -> &'static str;

    /// Observations required before the detector can fire
    fn minimum_observations(&self) -> usize;
}

/// Core trait for streaming drift detection
///
/// The usage pattern mirrors the classic online-detector loop: push one
/// value, query `detected_change`, and after a confirmed drift call `reset`
/// so subsequent observations are judged against a fresh baseline.
///
/// Observations are expected to lie in `[0, 1]` (p-values or normalized
/// dissimilarities); the Hoeffding-style bounds assume a unit value range.
pub trait StreamingDetector: DetectorProperties {
    /// Push one scalar observation, adapting the internal memory
    fn update(&mut self, value: f64);

    /// True exactly when the just-pushed value caused the detector to
    /// conclude the underlying distribution has shifted
    fn detected_change(&self) -> bool;

    /// True when the detector is in its warning zone (weaker evidence than
    /// a confirmed change)
    fn detected_warning(&self) -> bool {
        false
    }

    /// Re-instantiate internal memory while preserving configuration
    fn reset(&mut self);
}
