//! Per-dimension drift monitoring
//!
//! A [`DimensionMonitor`] owns exactly one detector state for one tracked
//! dimension (the whole control-flow perspective, or a single monitored
//! activity). Values must be pushed in window/trace order by one caller;
//! the monitor rejects out-of-order pushes, since an out-of-order update
//! would corrupt the adaptive memory.

use log::debug;
use procdrift_core::{ChangePointRecord, Error, Result};

use crate::kinds::{AdaptiveDetector, DetectorConfig, DetectorKind};
use crate::traits::StreamingDetector;

/// One monitored dimension: a detector plus its accumulated change points
#[derive(Debug, Clone)]
pub struct DimensionMonitor {
    dimension: String,
    detector: AdaptiveDetector,
    change_points: Vec<ChangePointRecord>,
    last_index: Option<u64>,
}

impl DimensionMonitor {
    pub fn new(dimension: impl Into<String>, kind: DetectorKind, config: &DetectorConfig) -> Self {
        Self {
            dimension: dimension.into(),
            detector: kind.instantiate(config),
            change_points: Vec::new(),
            last_index: None,
        }
    }

    pub fn dimension(&self) -> &str {
        &self.dimension
    }

    /// Change points raised so far, strictly increasing in index
    pub fn change_points(&self) -> &[ChangePointRecord] {
        &self.change_points
    }

    /// Push the observation for window/trace `index`.
    ///
    /// Returns the raised change point, if the detector fired. After a
    /// fire the detector is reset so subsequent observations are judged
    /// against a fresh baseline.
    pub fn push(&mut self, index: u64, value: f64) -> Result<Option<ChangePointRecord>> {
        if let Some(last) = self.last_index {
            if index <= last {
                return Err(Error::InvalidInput(format!(
                    "Out-of-order push to dimension {:?}: index {index} after {last}",
                    self.dimension
                )));
            }
        }
        self.last_index = Some(index);

        self.detector.update(value);
        if !self.detector.detected_change() {
            return Ok(None);
        }

        debug!(
            "drift on dimension {:?} at index {index} (value {value})",
            self.dimension
        );
        let record = ChangePointRecord::new(index, self.dimension.clone());
        self.change_points.push(record.clone());
        self.detector.reset();
        Ok(Some(record))
    }
}
