//! Closed enumeration of detector kinds
//!
//! Replaces a dictionary-of-constructors factory with a tagged union: every
//! supported kind is a variant, instantiation is a total function, and the
//! only failure point is parsing an unknown kind name at the string
//! boundary.

use std::str::FromStr;

use procdrift_core::Error;

use crate::adwin::{AdwinDetector, AdwinParameters};
use crate::hddm::{HddmDetector, HddmParameters};
use crate::traits::{DetectorProperties, StreamingDetector};

/// Supported detector families
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectorKind {
    /// Windowed-error-bound detector keyed by `delta`
    Adwin,
    /// Statistical-hypothesis detector keyed by confidences and `lambda`
    Hddm,
}

impl FromStr for DetectorKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "adwin" => Ok(DetectorKind::Adwin),
            "hddm" | "hddm-w" | "hddm_w" => Ok(DetectorKind::Hddm),
            other => Err(Error::unknown_detector(other)),
        }
    }
}

/// Configuration parameters covering every detector kind
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectorConfig {
    pub adwin: AdwinParameters,
    pub hddm: HddmParameters,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            adwin: AdwinParameters::default(),
            hddm: HddmParameters::default(),
        }
    }
}

impl DetectorKind {
    /// Build one fresh detector state for this kind
    pub fn instantiate(&self, config: &DetectorConfig) -> AdaptiveDetector {
        match self {
            DetectorKind::Adwin => {
                AdaptiveDetector::Adwin(AdwinDetector::with_parameters(config.adwin))
            }
            DetectorKind::Hddm => {
                AdaptiveDetector::Hddm(HddmDetector::with_parameters(config.hddm))
            }
        }
    }
}

/// Tagged union over the detector family, delegating the streaming
/// interface to the active variant
#[derive(Debug, Clone)]
pub enum AdaptiveDetector {
    Adwin(AdwinDetector),
    Hddm(HddmDetector),
}

impl DetectorProperties for AdaptiveDetector {
    fn algorithm_name(&self) -> &'static str {
        match self {
            AdaptiveDetector::Adwin(d) => d.algorithm_name(),
            AdaptiveDetector::Hddm(d) => d.algorithm_name(),
        }
    }

    fn minimum_observations(&self) -> usize {
        match self {
            AdaptiveDetector::Adwin(d) => d.minimum_observations(),
            AdaptiveDetector::Hddm(d) => d.minimum_observations(),
        }
    }
}

impl StreamingDetector for AdaptiveDetector {
    fn update(&mut self, value: f64) {
        match self {
            AdaptiveDetector::Adwin(d) => d.update(value),
            AdaptiveDetector::Hddm(d) => d.update(value),
        }
    }

    fn detected_change(&self) -> bool {
        match self {
            AdaptiveDetector::Adwin(d) => d.detected_change(),
            AdaptiveDetector::Hddm(d) => d.detected_change(),
        }
    }

    fn detected_warning(&self) -> bool {
        match self {
            AdaptiveDetector::Adwin(d) => d.detected_warning(),
            AdaptiveDetector::Hddm(d) => d.detected_warning(),
        }
    }

    fn reset(&mut self) {
        match self {
            AdaptiveDetector::Adwin(d) => d.reset(),
            AdaptiveDetector::Hddm(d) => d.reset(),
        }
    }
}
