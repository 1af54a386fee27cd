//! Adaptive drift detection over recorded attribute comparisons
//!
//! The metric engine records per-activity p-values for attribute metrics.
//! This module replays those records, in window order, through one
//! [`DimensionMonitor`] per activity, turning the threshold verdicts of
//! the engine into adaptive change points. A run persists at most one
//! change-point log per monitored activity.

use std::collections::BTreeMap;

use log::info;
use procdrift_changepoint::{DetectorConfig, DetectorKind, DimensionMonitor};
use procdrift_core::{ChangePointRecord, MetricResult, MetricValue, Result, RunPaths};

use crate::store::{read_metric_log, write_change_points};

/// Replay attribute-metric results through adaptive detectors.
///
/// `results` must be sorted by window index and belong to one metric;
/// each [`MetricValue::PValues`] record contributes one observation per
/// listed activity. Windows where an activity was untestable simply skip
/// that activity's detector. Returns the raised change points keyed by
/// activity.
pub fn detect_attribute_drift(
    results: &[MetricResult],
    kind: DetectorKind,
    config: &DetectorConfig,
) -> Result<BTreeMap<String, Vec<ChangePointRecord>>> {
    let mut monitors: BTreeMap<String, DimensionMonitor> = BTreeMap::new();

    for result in results {
        let MetricValue::PValues(per_activity) = &result.value else {
            continue;
        };
        for (activity, p_value) in per_activity {
            let monitor = monitors
                .entry(activity.clone())
                .or_insert_with(|| DimensionMonitor::new(activity.clone(), kind, config));
            monitor.push(result.window_index, *p_value)?;
        }
    }

    Ok(monitors
        .into_iter()
        .map(|(activity, monitor)| (activity, monitor.change_points().to_vec()))
        .collect())
}

/// Read one attribute metric's log, run the detectors, and persist one
/// change-point log per activity under the run directory.
pub fn detect_and_persist(
    paths: &RunPaths,
    metric_name: &str,
    kind: DetectorKind,
    config: &DetectorConfig,
) -> Result<BTreeMap<String, Vec<ChangePointRecord>>> {
    let results = read_metric_log(paths.metric_log(metric_name))?;
    let detected = detect_attribute_drift(&results, kind, config)?;

    for (activity, records) in &detected {
        if records.is_empty() {
            continue;
        }
        info!(
            "{} change point(s) on activity {:?} for metric {metric_name}",
            records.len(),
            activity
        );
        write_change_points(paths.dimension_log(activity), records)?;
    }
    Ok(detected)
}
