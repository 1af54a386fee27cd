//! End-to-end pipeline tests: synthetic streams with injected drifts,
//! driven through the run controller with the real concurrent engine.

use std::time::{Duration, Instant};

use chrono::{TimeZone, Utc};
use procdrift_core::{stream_items, Event, ReadAs, RunPaths, Trace, WindowUnit, WindowingConfig};
use procdrift_engine::{
    read_metric_log, DirectlyFollowsMiner, MetricKind, MetricsOptions, PhaseStatus, RunController,
};

fn trace_ts(i: usize) -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap() + chrono::Duration::minutes(i as i64 * 10)
}

/// Control-flow drift: traces follow `register → review → approve` before
/// the drift point and `register → audit → approve` after it
fn control_flow_drift_log(total: usize, drift_at: usize) -> Vec<Trace> {
    (0..total)
        .map(|i| {
            let middle = if i < drift_at { "review" } else { "audit" };
            Trace::new(
                format!("case{i}"),
                vec![
                    Event::new("register", trace_ts(i)),
                    Event::new(middle, trace_ts(i)),
                    Event::new("approve", trace_ts(i)),
                ],
            )
        })
        .collect()
}

/// Performance drift: the control flow never changes, but the review
/// duration jumps at the drift point
fn duration_drift_log(total: usize, drift_at: usize) -> Vec<Trace> {
    (0..total)
        .map(|i| {
            let duration = if i < drift_at { 10.0 } else { 30.0 };
            Trace::new(
                format!("case{i}"),
                vec![
                    Event::new("register", trace_ts(i)).with_attribute("duration", 5.0),
                    Event::new("review", trace_ts(i)).with_attribute("duration", duration),
                    Event::new("approve", trace_ts(i)).with_attribute("duration", 2.0),
                ],
            )
        })
        .collect()
}

fn wait_complete(controller: &RunController) {
    let deadline = Instant::now() + Duration::from_secs(20);
    while !controller.is_complete() {
        assert!(Instant::now() < deadline, "run never completed");
        std::thread::sleep(Duration::from_millis(20));
    }
}

#[test]
fn test_full_run_detects_control_flow_drift() {
    let _ = env_logger::builder().is_test(true).try_init();
    let dir = tempfile::tempdir().unwrap();

    let windowing = WindowingConfig::new(WindowUnit::Items, 20, ReadAs::Trace).unwrap();
    let metrics = vec![MetricKind::NodeOverlap, MetricKind::EdgeOverlap];
    let controller = RunController::new(
        RunPaths::new(dir.path(), "control_flow", &windowing),
        windowing,
        metrics,
        MetricsOptions::default(),
    );

    // 200 traces, drift at trace 100: window 6 is the first mined from
    // post-drift behavior
    let items = stream_items(control_flow_drift_log(200, 100), ReadAs::Trace);
    let mut miner = DirectlyFollowsMiner;
    let window_count = controller.run(items, &mut miner).unwrap();
    assert_eq!(window_count, 10);

    wait_complete(&controller);

    let status = controller.status();
    assert_eq!(status.mining, PhaseStatus::Finished);
    assert_eq!(status.metrics, PhaseStatus::Finished);

    // Counter equality: (10 − 1) windows times 2 metrics
    assert_eq!(controller.completed_units(), 18);

    // The only dissimilar boundary is the drift window
    let candidates = controller.drift_candidates().unwrap();
    assert_eq!(candidates, vec![6]);
}

#[test]
fn test_metric_logs_hold_complete_lines() {
    let dir = tempfile::tempdir().unwrap();

    let windowing = WindowingConfig::new(WindowUnit::Items, 10, ReadAs::Trace).unwrap();
    let paths = RunPaths::new(dir.path(), "alternating", &windowing);
    let metrics = vec![MetricKind::NodeOverlap, MetricKind::EdgeOverlap];
    let controller = RunController::new(
        paths.clone(),
        windowing,
        metrics.clone(),
        MetricsOptions::default(),
    );

    // Alternate behavior every 10 traces so every boundary is dissimilar
    // and both logs see concurrent appends
    let traces: Vec<Trace> = (0..200)
        .map(|i| {
            let middle = if (i / 10) % 2 == 0 { "review" } else { "audit" };
            Trace::new(
                format!("case{i}"),
                vec![
                    Event::new("register", trace_ts(i)),
                    Event::new(middle, trace_ts(i)),
                    Event::new("approve", trace_ts(i)),
                ],
            )
        })
        .collect();

    let mut miner = DirectlyFollowsMiner;
    controller
        .run(stream_items(traces, ReadAs::Trace), &mut miner)
        .unwrap();
    wait_complete(&controller);

    // Every line of every metric log parses independently: concurrent
    // appends for different metrics never interleaved bytes
    for metric in &metrics {
        let path = paths.metric_log(&metric.name());
        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(!raw.is_empty());
        for line in raw.lines() {
            let parsed: serde_json::Value = serde_json::from_str(line).unwrap();
            assert_eq!(parsed["metric"], serde_json::json!(metric.name()));
        }
        // All 19 boundaries were dissimilar for both metrics
        assert_eq!(read_metric_log(&path).unwrap().len(), 19);
    }
}

#[test]
fn test_attribute_metric_flags_shifted_windows() {
    let dir = tempfile::tempdir().unwrap();

    let windowing = WindowingConfig::new(WindowUnit::Items, 20, ReadAs::Trace).unwrap();
    let metrics = vec![MetricKind::AttributeShift {
        attribute: "duration".to_string(),
    }];
    let controller = RunController::new(
        RunPaths::new(dir.path(), "durations", &windowing),
        windowing,
        metrics,
        MetricsOptions::default(),
    );

    let items = stream_items(duration_drift_log(200, 100), ReadAs::Trace);
    let mut miner = DirectlyFollowsMiner;
    controller.run(items, &mut miner).unwrap();
    wait_complete(&controller);

    // Only the review duration shifted, and only at the drift boundary
    let candidates = controller.drift_candidates().unwrap();
    assert_eq!(candidates, vec![6]);
}

#[test]
fn test_run_with_fewer_items_than_one_window() {
    let dir = tempfile::tempdir().unwrap();

    let windowing = WindowingConfig::new(WindowUnit::Items, 50, ReadAs::Trace).unwrap();
    let controller = RunController::new(
        RunPaths::new(dir.path(), "short", &windowing),
        windowing,
        vec![MetricKind::NodeOverlap],
        MetricsOptions::default(),
    );

    let items = stream_items(control_flow_drift_log(10, 5), ReadAs::Trace);
    let mut miner = DirectlyFollowsMiner;
    let window_count = controller.run(items, &mut miner).unwrap();

    // Remainder dropped: zero windows, zero pairs, still a clean finish
    assert_eq!(window_count, 0);
    wait_complete(&controller);
    assert_eq!(controller.completed_units(), 0);
    assert!(controller.drift_candidates().unwrap().is_empty());
}
