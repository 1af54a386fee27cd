//! Whole-pipeline test: a synthetic log with one injected performance
//! drift runs through segmentation, mining, the concurrent metric engine,
//! and finally the ground-truth evaluation.

use std::time::{Duration, Instant};

use anyhow::Result;
use chrono::{TimeZone, Utc};
use procdrift::core::{stream_items, Event, ReadAs, RunPaths, Trace, WindowUnit, WindowingConfig};
use procdrift::engine::{DirectlyFollowsMiner, MetricKind, MetricsOptions, RunController};
use procdrift::eval::evaluate;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

const WINDOW_SIZE: u64 = 30;
const TOTAL_TRACES: usize = 300;
const DRIFT_AT: usize = 150;

/// One injected drift: the review duration jumps at `DRIFT_AT`. Every
/// window draws the same duration multiset (shuffled within the window),
/// so adjacent same-regime windows compare as identical samples.
fn drifting_log() -> Vec<Trace> {
    let mut rng = StdRng::seed_from_u64(7);
    let start = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();

    let mut traces = Vec::with_capacity(TOTAL_TRACES);
    for window_start in (0..TOTAL_TRACES).step_by(WINDOW_SIZE as usize) {
        let base = if window_start < DRIFT_AT { 10.0 } else { 30.0 };
        let mut durations: Vec<f64> = (0..WINDOW_SIZE).map(|k| base + k as f64 * 0.05).collect();
        durations.shuffle(&mut rng);

        for (offset, duration) in durations.into_iter().enumerate() {
            let i = window_start + offset;
            let ts = start + chrono::Duration::minutes(i as i64 * 10);
            traces.push(Trace::new(
                format!("case{i}"),
                vec![
                    Event::new("register", ts).with_attribute("duration", 5.0),
                    Event::new("review", ts).with_attribute("duration", duration),
                    Event::new("approve", ts).with_attribute("duration", 2.0),
                ],
            ));
        }
    }
    traces
}

#[test]
fn test_detected_drift_scores_perfectly_against_ground_truth() -> Result<()> {
    let _ = env_logger::builder().is_test(true).try_init();
    let dir = tempfile::tempdir()?;

    let windowing = WindowingConfig::new(WindowUnit::Items, WINDOW_SIZE, ReadAs::Trace)?;
    let controller = RunController::new(
        RunPaths::new(dir.path(), "loan_log", &windowing),
        windowing,
        vec![MetricKind::AttributeShift {
            attribute: "duration".to_string(),
        }],
        MetricsOptions::default(),
    );

    let mut miner = DirectlyFollowsMiner;
    let window_count = controller.run(stream_items(drifting_log(), ReadAs::Trace), &mut miner)?;
    assert_eq!(window_count, 10);

    let deadline = Instant::now() + Duration::from_secs(20);
    while !controller.is_complete() {
        assert!(Instant::now() < deadline, "run never completed");
        std::thread::sleep(Duration::from_millis(20));
    }

    // Window 6 is the first window mined entirely from post-drift traces
    let candidates = controller.drift_candidates()?;
    assert_eq!(candidates, vec![6]);

    // Map candidate windows back to the stream offset they start at and
    // score against the injected drift point
    let detected: Vec<u64> = candidates.iter().map(|w| (w - 1) * WINDOW_SIZE).collect();
    let result = evaluate(&[DRIFT_AT as u64], &detected, TOTAL_TRACES as u64);

    assert_eq!(result.true_positives(), 1);
    assert_eq!(result.false_positives(), 0);
    assert_eq!(result.false_negatives(), 0);
    assert_eq!(result.f_score(), 1.0);
    assert_eq!(result.mean_delay(), 0.0);
    Ok(())
}
