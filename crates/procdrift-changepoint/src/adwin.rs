//! ADWIN-style adaptive windowing detector
//!
//! Maintains a variable-length window of recent observations compressed
//! into an exponential histogram of buckets. After every insertion the
//! window is scanned for a cut point where the means of the two sub-windows
//! differ by more than a Hoeffding bound keyed by `delta`; when a cut is
//! found the older sub-window is dropped and a change is signalled.

use std::collections::VecDeque;

use crate::traits::{DetectorProperties, StreamingDetector};

/// Rows in the exponential histogram; bounds the representable window at
/// 2^32 observations
const BUCKET_ROWS: usize = 32;

/// ADWIN parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdwinParameters {
    /// Confidence parameter; smaller values demand stronger evidence
    /// (typical range 0.001–0.1)
    pub delta: f64,
    /// Maximum buckets per histogram row before compression
    pub max_buckets: usize,
}

impl Default for AdwinParameters {
    fn default() -> Self {
        Self {
            delta: 0.002,
            max_buckets: 5,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Bucket {
    total: f64,
    count: usize,
}

/// Adaptive-windowing drift detector keyed by a `delta` significance
#[derive(Debug, Clone)]
pub struct AdwinDetector {
    params: AdwinParameters,
    rows: Vec<VecDeque<Bucket>>,
    total: f64,
    count: usize,
    change: bool,
    warning: bool,
}

impl AdwinDetector {
    pub fn new(delta: f64) -> Self {
        let delta = delta.clamp(1e-9, 1.0);
        Self::with_parameters(AdwinParameters {
            delta,
            ..AdwinParameters::default()
        })
    }

    pub fn with_parameters(params: AdwinParameters) -> Self {
        Self {
            params,
            rows: vec![VecDeque::new(); BUCKET_ROWS],
            total: 0.0,
            count: 0,
            change: false,
            warning: false,
        }
    }

    pub fn parameters(&self) -> &AdwinParameters {
        &self.params
    }

    /// Current adaptive window length
    pub fn window_len(&self) -> usize {
        self.count
    }

    /// Mean of the current window
    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.total / self.count as f64
        }
    }

    fn insert(&mut self, value: f64) {
        self.rows[0].push_back(Bucket {
            total: value,
            count: 1,
        });
        self.total += value;
        self.count += 1;
        self.compress();
    }

    /// Merge the two oldest buckets of an overfull row into the next row
    fn compress(&mut self) {
        for row in 0..self.rows.len() - 1 {
            if self.rows[row].len() <= self.params.max_buckets {
                continue;
            }
            if let (Some(b1), Some(b2)) = (self.rows[row].pop_front(), self.rows[row].pop_front()) {
                self.rows[row + 1].push_back(Bucket {
                    total: b1.total + b2.total,
                    count: b1.count + b2.count,
                });
            }
        }
    }

    /// Drop the oldest bucket
    fn drop_oldest(&mut self) {
        for row in (0..self.rows.len()).rev() {
            if let Some(bucket) = self.rows[row].pop_front() {
                self.total -= bucket.total;
                self.count -= bucket.count;
                return;
            }
        }
    }

    /// Hoeffding bound for a cut between sub-windows of sizes n0 and n1
    fn epsilon(&self, n0: usize, n1: usize, delta: f64) -> f64 {
        let n = (n0 + n1) as f64;
        let m = 1.0 / n0 as f64 + 1.0 / n1 as f64;
        let ln_term = (2.0 * n / delta).ln();
        (m / 2.0 * ln_term).sqrt() + 2.0 / 3.0 * m * ln_term
    }

    /// Scan cut points oldest-first; on a significant cut, shrink the
    /// window to the newer side
    fn detect_and_shrink(&mut self) {
        self.change = false;
        self.warning = false;

        if self.count < self.minimum_observations() {
            return;
        }

        loop {
            let mut cut_found = false;
            let mut n0 = 0usize;
            let mut u0 = 0.0f64;

            'scan: for row in (0..self.rows.len()).rev() {
                for bucket in &self.rows[row] {
                    n0 += bucket.count;
                    u0 += bucket.total;

                    let n1 = self.count - n0;
                    if n1 == 0 {
                        break 'scan;
                    }

                    let mean0 = u0 / n0 as f64;
                    let mean1 = (self.total - u0) / n1 as f64;
                    let diff = (mean0 - mean1).abs();

                    if diff > self.epsilon(n0, n1, self.params.delta) {
                        cut_found = true;
                        break 'scan;
                    }
                    // Weaker evidence: relaxed confidence marks the warning zone
                    if !self.warning && diff > self.epsilon(n0, n1, self.params.delta * 10.0) {
                        self.warning = true;
                    }
                }
            }

            if !cut_found {
                break;
            }

            self.change = true;
            // Shed the older sub-window; whole buckets, may overshoot the
            // exact cut point
            let keep = (self.count - n0).max(1);
            while self.count > keep {
                self.drop_oldest();
            }
        }
    }
}

impl DetectorProperties for AdwinDetector {
    fn algorithm_name(&self) -> &'static str {
        "ADWIN"
    }

    fn minimum_observations(&self) -> usize {
        10
    }
}

impl StreamingDetector for AdwinDetector {
    fn update(&mut self, value: f64) {
        self.insert(value);
        self.detect_and_shrink();
    }

    fn detected_change(&self) -> bool {
        self.change
    }

    fn detected_warning(&self) -> bool {
        self.warning
    }

    fn reset(&mut self) {
        for row in &mut self.rows {
            row.clear();
        }
        self.total = 0.0;
        self.count = 0;
        self.change = false;
        self.warning = false;
    }
}
