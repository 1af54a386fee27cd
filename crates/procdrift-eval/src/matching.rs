//! Greedy closest-preceding matching of detected points to ground truth
//!
//! Both lists are sorted ascending. Each detected point claims the closest
//! still-unmatched ground-truth point at or before it (a true positive,
//! with delay = detected − matched); ground-truth points skipped over in
//! the process become false negatives, and a detected point with no
//! eligible preceding ground truth is a false positive. A ground-truth
//! point is matched at most once.

use procdrift_core::ChangePointRecord;

use crate::result::EvaluationResult;

/// Match `detected` drift points against `ground_truth` and derive counts.
///
/// `total_items` is the stream length the points index into; true
/// negatives are `total_items − TP − FP − FN`.
pub fn evaluate(ground_truth: &[u64], detected: &[u64], total_items: u64) -> EvaluationResult {
    let mut gt = ground_truth.to_vec();
    gt.sort_unstable();
    let mut det = detected.to_vec();
    det.sort_unstable();

    let mut true_positives = 0usize;
    let mut false_positives = 0usize;
    let mut false_negatives = 0usize;
    let mut delays = Vec::new();
    let mut matched = Vec::new();

    // Cursor into gt: everything before it has been matched or written off
    let mut cursor = 0usize;

    for &d in &det {
        // Ground-truth points at or before this detection, still unmatched
        let mut eligible_end = cursor;
        while eligible_end < gt.len() && gt[eligible_end] <= d {
            eligible_end += 1;
        }

        if eligible_end == cursor {
            // No eligible preceding ground truth
            false_positives += 1;
            continue;
        }

        // Closest preceding one is the true positive
        let matched_gt = gt[eligible_end - 1];
        true_positives += 1;
        delays.push(d - matched_gt);
        matched.push(matched_gt);

        // Skipped-over earlier points were missed entirely
        false_negatives += eligible_end - 1 - cursor;
        cursor = eligible_end;
    }

    // Ground truth never reached by any detection
    false_negatives += gt.len() - cursor;

    let accounted = (true_positives + false_positives + false_negatives) as u64;
    let true_negatives = total_items.saturating_sub(accounted) as usize;

    EvaluationResult::new(
        true_positives,
        false_positives,
        false_negatives,
        true_negatives,
        delays,
        matched,
    )
}

/// Evaluate recorded change points by their stream indices.
///
/// Convenience over [`evaluate`] for the change-point logs the detectors
/// produce; the records' dimensions are ignored, so callers scoring one
/// dimension should pass that dimension's records only.
pub fn evaluate_records(
    ground_truth: &[u64],
    records: &[ChangePointRecord],
    total_items: u64,
) -> EvaluationResult {
    let detected: Vec<u64> = records.iter().map(|r| r.index).collect();
    evaluate(ground_truth, &detected, total_items)
}
