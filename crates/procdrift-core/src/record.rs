//! Persisted record types
//!
//! [`MetricResult`] and [`ChangePointRecord`] are created once, immutable
//! after creation, and appended to line-oriented JSON logs. Readers must
//! tolerate unknown extra fields (serde's default), so the on-disk format
//! stays forward-compatible.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

/// Value produced by one dissimilarity computation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MetricValue {
    /// Plain scalar, e.g. a normalized overlap ratio
    Scalar(f64),
    /// Structured model delta: elements only present on one side
    ElementDelta {
        added: BTreeSet<String>,
        removed: BTreeSet<String>,
    },
    /// Per-dimension breakdown: one p-value per activity
    PValues(BTreeMap<String, f64>),
    /// Placeholder for a computation that failed (e.g. too few samples);
    /// recorded instead of aborting sibling tasks
    NotCalculated,
}

/// Outcome of one dissimilarity computation between windows *i − 1* and *i*
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricResult {
    /// Index of the later window of the compared pair
    pub window_index: u64,
    /// Metric name
    pub metric: String,
    pub value: MetricValue,
    /// Metric-specific dissimilarity verdict
    pub dissimilar: bool,
}

impl MetricResult {
    pub fn new(window_index: u64, metric: impl Into<String>, value: MetricValue, dissimilar: bool) -> Self {
        Self {
            window_index,
            metric: metric.into(),
            value,
            dissimilar,
        }
    }

    /// Placeholder result for a failed computation
    pub fn not_calculated(window_index: u64, metric: impl Into<String>) -> Self {
        Self::new(window_index, metric, MetricValue::NotCalculated, false)
    }
}

impl fmt::Display for MetricResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "MetricResult {{ window: {}, metric: {}, dissimilar: {} }}",
            self.window_index, self.metric, self.dissimilar
        )
    }
}

/// A reported drift point for one monitored dimension
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangePointRecord {
    /// Window or trace index at which the drift was raised
    pub index: u64,
    /// Monitored dimension ("control-flow", or an activity name)
    pub dimension: String,
    /// Optional evidence: the set of elements that changed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evidence: Option<BTreeSet<String>>,
}

impl ChangePointRecord {
    pub fn new(index: u64, dimension: impl Into<String>) -> Self {
        Self {
            index,
            dimension: dimension.into(),
            evidence: None,
        }
    }

    pub fn with_evidence(mut self, evidence: BTreeSet<String>) -> Self {
        self.evidence = Some(evidence);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_result_roundtrip() {
        let result = MetricResult::new(
            7,
            "nodes",
            MetricValue::ElementDelta {
                added: BTreeSet::from(["pay".to_string()]),
                removed: BTreeSet::new(),
            },
            true,
        );

        let line = serde_json::to_string(&result).unwrap();
        assert!(!line.contains('\n'));
        let back: MetricResult = serde_json::from_str(&line).unwrap();
        assert_eq!(back, result);
    }

    #[test]
    fn test_unknown_fields_ignored() {
        // Forward compatibility: a future writer may add fields
        let line = r#"{"window_index":3,"metric":"edges","value":{"Scalar":0.5},"dissimilar":true,"elapsed_ms":12}"#;
        let result: MetricResult = serde_json::from_str(line).unwrap();
        assert_eq!(result.window_index, 3);
        assert_eq!(result.value, MetricValue::Scalar(0.5));
    }

    #[test]
    fn test_not_calculated_placeholder() {
        let result = MetricResult::not_calculated(4, "attr:duration");
        assert_eq!(result.value, MetricValue::NotCalculated);
        assert!(!result.dissimilar);
    }

    #[test]
    fn test_change_point_record() {
        let record = ChangePointRecord::new(12, "control-flow")
            .with_evidence(BTreeSet::from(["ship".to_string()]));
        let line = serde_json::to_string(&record).unwrap();
        let back: ChangePointRecord = serde_json::from_str(&line).unwrap();
        assert_eq!(back, record);

        // evidence is omitted from the line when absent
        let bare = ChangePointRecord::new(1, "duration");
        assert!(!serde_json::to_string(&bare).unwrap().contains("evidence"));
    }
}
