//! Evaluation result type

use std::fmt;

/// Outcome of matching detected drift points against ground truth
///
/// Derived on demand, never persisted; recompute from the change-point and
/// ground-truth lists whenever needed.
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationResult {
    true_positives: usize,
    false_positives: usize,
    false_negatives: usize,
    true_negatives: usize,
    /// Detection delays of the true positives, in stream items
    delays: Vec<u64>,
    /// Ground-truth points that were matched, ascending
    matched_ground_truth: Vec<u64>,
}

impl EvaluationResult {
    pub(crate) fn new(
        true_positives: usize,
        false_positives: usize,
        false_negatives: usize,
        true_negatives: usize,
        delays: Vec<u64>,
        matched_ground_truth: Vec<u64>,
    ) -> Self {
        Self {
            true_positives,
            false_positives,
            false_negatives,
            true_negatives,
            delays,
            matched_ground_truth,
        }
    }

    pub fn true_positives(&self) -> usize {
        self.true_positives
    }

    pub fn false_positives(&self) -> usize {
        self.false_positives
    }

    pub fn false_negatives(&self) -> usize {
        self.false_negatives
    }

    pub fn true_negatives(&self) -> usize {
        self.true_negatives
    }

    pub fn delays(&self) -> &[u64] {
        &self.delays
    }

    pub fn matched_ground_truth(&self) -> &[u64] {
        &self.matched_ground_truth
    }

    /// TP / (TP + FP), 0 when the denominator is 0
    pub fn precision(&self) -> f64 {
        ratio(self.true_positives, self.true_positives + self.false_positives)
    }

    /// TP / (TP + FN), 0 when the denominator is 0
    pub fn recall(&self) -> f64 {
        ratio(self.true_positives, self.true_positives + self.false_negatives)
    }

    /// Harmonic mean of precision and recall, 0 when both are 0
    pub fn f_score(&self) -> f64 {
        let p = self.precision();
        let r = self.recall();
        if p + r == 0.0 {
            0.0
        } else {
            2.0 * p * r / (p + r)
        }
    }

    /// FP / (FP + TN), 0 when the denominator is 0
    pub fn false_positive_rate(&self) -> f64 {
        ratio(self.false_positives, self.false_positives + self.true_negatives)
    }

    /// Mean detection delay over the true positives, 0 when there are none
    pub fn mean_delay(&self) -> f64 {
        if self.delays.is_empty() {
            0.0
        } else {
            self.delays.iter().sum::<u64>() as f64 / self.delays.len() as f64
        }
    }
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

impl fmt::Display for EvaluationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Evaluation Result:")?;
        writeln!(
            f,
            "  TP: {}, FP: {}, FN: {}, TN: {}",
            self.true_positives, self.false_positives, self.false_negatives, self.true_negatives
        )?;
        writeln!(f, "  F-score: {:.4}", self.f_score())?;
        writeln!(f, "  FPR: {:.4}", self.false_positive_rate())?;
        writeln!(f, "  Mean delay: {:.2}", self.mean_delay())?;
        Ok(())
    }
}
