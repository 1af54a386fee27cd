//! Dissimilarity metric kinds and comparator primitives
//!
//! A closed enumeration of metric kinds replaces a dictionary-based
//! factory: each kind computes a value for a pair of adjacent window
//! artifacts and decides dissimilarity by its own rule. Control-flow
//! metrics compare the discovered models' element sets (dissimilar when
//! the normalized overlap drops below 1); the attribute metric runs a
//! paired statistical test per activity (dissimilar when any p-value
//! falls below 0.05).

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use procdrift_core::{Error, MetricValue, Result};

use crate::miner::WindowArtifact;

/// Significance level for the per-activity attribute test
pub const ATTRIBUTE_P_THRESHOLD: f64 = 0.05;

/// The two window artifacts a metric task compares
#[derive(Debug, Clone)]
pub struct ArtifactPair {
    /// Artifact of window *i − 1*
    pub left: Arc<WindowArtifact>,
    /// Artifact of window *i*
    pub right: Arc<WindowArtifact>,
}

/// Supported dissimilarity metrics
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum MetricKind {
    /// Overlap of the models' node sets
    NodeOverlap,
    /// Overlap of the models' directly-follows edge sets
    EdgeOverlap,
    /// Per-activity two-sample test on a numeric event attribute
    AttributeShift { attribute: String },
}

impl MetricKind {
    /// Stable name, also the metric's log-file key
    pub fn name(&self) -> String {
        match self {
            MetricKind::NodeOverlap => "nodes".to_string(),
            MetricKind::EdgeOverlap => "edges".to_string(),
            MetricKind::AttributeShift { attribute } => format!("attr:{attribute}"),
        }
    }

    /// Compute the dissimilarity value for one adjacent window pair
    pub fn calculate(&self, pair: &ArtifactPair) -> Result<MetricValue> {
        match self {
            MetricKind::NodeOverlap => {
                let delta = compare::set_delta(
                    pair.left.model().nodes(),
                    pair.right.model().nodes(),
                );
                Ok(delta)
            }
            MetricKind::EdgeOverlap => {
                let left: BTreeSet<String> = pair
                    .left
                    .model()
                    .edges()
                    .iter()
                    .map(|(a, b)| format!("{a}->{b}"))
                    .collect();
                let right: BTreeSet<String> = pair
                    .right
                    .model()
                    .edges()
                    .iter()
                    .map(|(a, b)| format!("{a}->{b}"))
                    .collect();
                Ok(compare::set_delta(&left, &right))
            }
            MetricKind::AttributeShift { attribute } => {
                let left = pair.left.samples(attribute);
                let right = pair.right.samples(attribute);
                let (left, right) = match (left, right) {
                    (Some(l), Some(r)) => (l, r),
                    _ => {
                        return Err(Error::Computation(format!(
                            "No samples extracted for attribute {attribute:?}"
                        )))
                    }
                };
                compare::per_activity_p_values(left, right).map(MetricValue::PValues)
            }
        }
    }

    /// Metric-specific dissimilarity rule
    pub fn is_dissimilar(&self, value: &MetricValue) -> bool {
        match value {
            MetricValue::Scalar(overlap) => *overlap < 1.0,
            MetricValue::ElementDelta { added, removed } => {
                !added.is_empty() || !removed.is_empty()
            }
            MetricValue::PValues(p_values) => {
                p_values.values().any(|&p| p < ATTRIBUTE_P_THRESHOLD)
            }
            MetricValue::NotCalculated => false,
        }
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for MetricKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if let Some(attribute) = s.strip_prefix("attr:") {
            if attribute.is_empty() {
                return Err(Error::unknown_metric(s));
            }
            return Ok(MetricKind::AttributeShift {
                attribute: attribute.to_string(),
            });
        }
        match s.to_ascii_lowercase().as_str() {
            "nodes" => Ok(MetricKind::NodeOverlap),
            "edges" => Ok(MetricKind::EdgeOverlap),
            other => Err(Error::unknown_metric(other)),
        }
    }
}

/// Comparator primitives the metric kinds delegate to
pub mod compare {
    use super::*;
    use statrs::distribution::{ContinuousCDF, Normal};

    /// Minimum per-side sample count for the rank test
    pub const MIN_TEST_SAMPLES: usize = 4;

    /// Structured delta of two element sets.
    ///
    /// Equal sets yield `Scalar(1.0)` (fully similar); otherwise the
    /// elements present on only one side are reported.
    pub fn set_delta(left: &BTreeSet<String>, right: &BTreeSet<String>) -> MetricValue {
        let added: BTreeSet<String> = right.difference(left).cloned().collect();
        let removed: BTreeSet<String> = left.difference(right).cloned().collect();
        if added.is_empty() && removed.is_empty() {
            MetricValue::Scalar(1.0)
        } else {
            MetricValue::ElementDelta { added, removed }
        }
    }

    /// Mann-Whitney U p-value per activity present in both windows.
    ///
    /// Activities with too few samples on either side are skipped; if no
    /// activity is testable the whole computation fails (recorded upstream
    /// as a "not calculated" placeholder).
    pub fn per_activity_p_values(
        left: &BTreeMap<String, Vec<f64>>,
        right: &BTreeMap<String, Vec<f64>>,
    ) -> Result<BTreeMap<String, f64>> {
        let mut p_values = BTreeMap::new();
        for (activity, left_sample) in left {
            let Some(right_sample) = right.get(activity) else {
                continue;
            };
            if left_sample.len() < MIN_TEST_SAMPLES || right_sample.len() < MIN_TEST_SAMPLES {
                continue;
            }
            p_values.insert(
                activity.clone(),
                mann_whitney_p(left_sample, right_sample)?,
            );
        }
        if p_values.is_empty() {
            return Err(Error::InsufficientData {
                expected: MIN_TEST_SAMPLES,
                actual: left.values().map(Vec::len).min().unwrap_or(0),
            });
        }
        Ok(p_values)
    }

    /// Two-sided Mann-Whitney U test with normal approximation and tie
    /// correction
    pub fn mann_whitney_p(xs: &[f64], ys: &[f64]) -> Result<f64> {
        let n1 = xs.len();
        let n2 = ys.len();
        if n1 < MIN_TEST_SAMPLES || n2 < MIN_TEST_SAMPLES {
            return Err(Error::InsufficientData {
                expected: MIN_TEST_SAMPLES,
                actual: n1.min(n2),
            });
        }

        // Rank the combined sample, average ranks over ties
        let mut combined: Vec<(f64, usize)> = xs
            .iter()
            .map(|&v| (v, 0usize))
            .chain(ys.iter().map(|&v| (v, 1usize)))
            .collect();
        combined.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

        let n = combined.len();
        let mut rank_sum_x = 0.0f64;
        let mut tie_term = 0.0f64;
        let mut i = 0;
        while i < n {
            let mut j = i;
            while j + 1 < n && combined[j + 1].0 == combined[i].0 {
                j += 1;
            }
            let tied = (j - i + 1) as f64;
            let avg_rank = (i + j) as f64 / 2.0 + 1.0;
            for item in &combined[i..=j] {
                if item.1 == 0 {
                    rank_sum_x += avg_rank;
                }
            }
            tie_term += tied.powi(3) - tied;
            i = j + 1;
        }

        let n1f = n1 as f64;
        let n2f = n2 as f64;
        let nf = n as f64;
        let u = rank_sum_x - n1f * (n1f + 1.0) / 2.0;
        let mean_u = n1f * n2f / 2.0;
        let variance =
            n1f * n2f / 12.0 * ((nf + 1.0) - tie_term / (nf * (nf - 1.0)));
        if variance <= 0.0 {
            // All observations tied: no evidence of a shift
            return Ok(1.0);
        }

        // Continuity correction toward the mean
        let z = (u - mean_u).abs() - 0.5;
        let z = z.max(0.0) / variance.sqrt();
        let normal = Normal::new(0.0, 1.0)
            .map_err(|e| Error::Computation(format!("Normal distribution: {e}")))?;
        let p = 2.0 * (1.0 - normal.cdf(z));
        Ok(p.clamp(0.0, 1.0))
    }
}
