//! Hoeffding-bound hypothesis detector over weighted moving averages
//!
//! Compares an exponentially weighted recent mean (decay `lambda`) against
//! the running mean of everything seen since the last reset. The two means
//! are treated as averages over their effective sample sizes and tested
//! with a two-sample Hoeffding bound: exceeding the bound at
//! `drift_confidence` signals drift, at `warning_confidence` a warning.

use crate::traits::{DetectorProperties, StreamingDetector};

/// HDDM parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HddmParameters {
    /// Significance level for a confirmed drift (typical 0.001)
    pub drift_confidence: f64,
    /// Significance level for the warning zone (typical 0.005)
    pub warning_confidence: f64,
    /// Decay of the recent weighted mean (typical 0.05)
    pub lambda: f64,
}

impl Default for HddmParameters {
    fn default() -> Self {
        Self {
            drift_confidence: 0.001,
            warning_confidence: 0.005,
            lambda: 0.05,
        }
    }
}

/// Statistical-hypothesis drift detector with weighted moving averages
#[derive(Debug, Clone)]
pub struct HddmDetector {
    params: HddmParameters,
    /// Count since last reset
    n: usize,
    /// Running mean of all observations since last reset
    total_mean: f64,
    /// Exponentially weighted recent mean
    ewma: f64,
    /// Sum of squared EWMA weights; 1 / w2 is the effective sample size
    w2: f64,
    change: bool,
    warning: bool,
}

impl HddmDetector {
    pub fn new(drift_confidence: f64, warning_confidence: f64, lambda: f64) -> Self {
        Self::with_parameters(HddmParameters {
            drift_confidence: drift_confidence.clamp(1e-12, 0.5),
            warning_confidence: warning_confidence.clamp(1e-12, 0.5),
            lambda: lambda.clamp(1e-3, 1.0),
        })
    }

    pub fn with_parameters(params: HddmParameters) -> Self {
        Self {
            params,
            n: 0,
            total_mean: 0.0,
            ewma: 0.0,
            w2: 0.0,
            change: false,
            warning: false,
        }
    }

    pub fn parameters(&self) -> &HddmParameters {
        &self.params
    }

    /// Two-sample Hoeffding bound at the given confidence, for effective
    /// sample sizes `n` (overall) and `1 / w2` (weighted recent)
    fn epsilon(&self, confidence: f64) -> f64 {
        let inv_sizes = 1.0 / self.n as f64 + self.w2;
        (inv_sizes / 2.0 * (1.0 / confidence).ln()).sqrt()
    }
}

impl DetectorProperties for HddmDetector {
    fn algorithm_name(&self) -> &'static str {
        "HDDM-W"
    }

    fn minimum_observations(&self) -> usize {
        10
    }
}

impl StreamingDetector for HddmDetector {
    fn update(&mut self, value: f64) {
        self.n += 1;
        self.total_mean += (value - self.total_mean) / self.n as f64;

        let lambda = self.params.lambda;
        if self.n == 1 {
            self.ewma = value;
            self.w2 = 1.0;
        } else {
            self.ewma = (1.0 - lambda) * self.ewma + lambda * value;
            self.w2 = (1.0 - lambda).powi(2) * self.w2 + lambda.powi(2);
        }

        self.change = false;
        self.warning = false;
        if self.n < self.minimum_observations() {
            return;
        }

        let diff = (self.ewma - self.total_mean).abs();
        if diff > self.epsilon(self.params.drift_confidence) {
            self.change = true;
        } else if diff > self.epsilon(self.params.warning_confidence) {
            self.warning = true;
        }
    }

    fn detected_change(&self) -> bool {
        self.change
    }

    fn detected_warning(&self) -> bool {
        self.warning
    }

    fn reset(&mut self) {
        self.n = 0;
        self.total_mean = 0.0;
        self.ewma = 0.0;
        self.w2 = 0.0;
        self.change = false;
        self.warning = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_constant_stream_stays_quiet() {
        let mut detector = HddmDetector::new(0.001, 0.005, 0.05);
        for _ in 0..500 {
            detector.update(0.3);
            assert!(!detector.detected_change());
        }
        assert_relative_eq!(detector.ewma, 0.3, epsilon = 1e-9);
    }

    #[test]
    fn test_shift_detected() {
        let mut detector = HddmDetector::new(0.001, 0.005, 0.05);
        for _ in 0..200 {
            detector.update(0.05);
        }
        let mut fired = false;
        for _ in 0..100 {
            detector.update(0.95);
            if detector.detected_change() {
                fired = true;
                break;
            }
        }
        assert!(fired, "shift never detected");
    }

    #[test]
    fn test_noisy_shift_detected() {
        use rand::rngs::StdRng;
        use rand::SeedableRng;
        use rand_distr::{Distribution, Normal};

        let mut rng = StdRng::seed_from_u64(19);
        let before = Normal::<f64>::new(0.2, 0.05).unwrap();
        let after = Normal::<f64>::new(0.8, 0.05).unwrap();

        let mut detector = HddmDetector::new(0.001, 0.005, 0.05);
        for i in 0..300 {
            detector.update(before.sample(&mut rng).clamp(0.0, 1.0));
            assert!(!detector.detected_change(), "spurious change at {i}");
        }
        let mut fired = false;
        for _ in 0..100 {
            detector.update(after.sample(&mut rng).clamp(0.0, 1.0));
            if detector.detected_change() {
                fired = true;
                break;
            }
        }
        assert!(fired, "noisy shift never detected");
    }

    #[test]
    fn test_warning_precedes_drift() {
        let mut detector = HddmDetector::new(0.0001, 0.05, 0.05);
        for _ in 0..200 {
            detector.update(0.1);
        }
        let mut warned_first = false;
        loop {
            detector.update(0.9);
            if detector.detected_change() {
                break;
            }
            if detector.detected_warning() {
                warned_first = true;
            }
        }
        assert!(warned_first, "no warning zone before the confirmed drift");
    }

    #[test]
    fn test_reset_restores_baseline() {
        let mut detector = HddmDetector::new(0.001, 0.005, 0.05);
        for _ in 0..200 {
            detector.update(0.05);
        }
        let mut suffix = Vec::new();
        loop {
            detector.update(0.95);
            suffix.push(0.95);
            if detector.detected_change() {
                break;
            }
        }

        detector.reset();
        for value in suffix {
            detector.update(value);
            assert!(!detector.detected_change());
        }
    }
}
