//! Streaming adaptive change-point detectors for drift monitoring
//!
//! This crate wraps a family of streaming change-point detectors behind one
//! uniform interface. Each detector consumes one scalar observation at a
//! time and maintains an *adaptive* memory of recent observations: the
//! effective window grows while the distribution is stable and shrinks when
//! it shifts.
//!
//! # Detectors
//!
//! - **ADWIN**: adaptive windowing with exponential-histogram compression
//!   and a Hoeffding cut bound, keyed by a `delta` significance
//! - **HDDM-W**: hypothesis test comparing a decayed recent mean against
//!   the running mean, keyed by drift/warning confidences and `lambda`
//!
//! # Usage
//!
//! ```rust
//! use procdrift_changepoint::{DetectorConfig, DetectorKind, StreamingDetector};
//!
//! let mut detector = DetectorKind::Adwin.instantiate(&DetectorConfig::default());
//! for &value in &[0.1, 0.1, 0.1, 0.9] {
//!     detector.update(value);
//!     if detector.detected_change() {
//!         detector.reset();
//!     }
//! }
//! ```
//!
//! One detector instance serves one monitored dimension; pushes must be in
//! stream order from a single caller. [`DimensionMonitor`] enforces the
//! ordering and keeps the accumulated change-point list.

pub mod adwin;
pub mod hddm;
pub mod kinds;
pub mod monitor;
pub mod traits;

// Re-exports
pub use adwin::{AdwinDetector, AdwinParameters};
pub use hddm::{HddmDetector, HddmParameters};
pub use kinds::{AdaptiveDetector, DetectorConfig, DetectorKind};
pub use monitor::DimensionMonitor;
pub use traits::{DetectorProperties, StreamingDetector};
