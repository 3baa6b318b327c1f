//! Training metrics and evaluation

use std::fmt;

use crate::predict::ScorePrediction;

/// Squared error of one example: Σ ½ (expected − output)²
pub fn total_error(output: &[f64], expected: &[f64]) -> f64 {
    output
        .iter()
        .zip(expected.iter())
        .map(|(o, e)| 0.5 * (e - o).powi(2))
        .sum()
}

/// Accumulates per-example errors; the mean is undefined when nothing was added
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ErrorAccumulator {
    sum: f64,
    count: usize,
}

impl ErrorAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, output: &[f64], expected: &[f64]) {
        self.sum += total_error(output, expected);
        self.count += 1;
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn mean(&self) -> Option<f64> {
        if self.count == 0 {
            None
        } else {
            Some(self.sum / self.count as f64)
        }
    }
}

/// Training history for tracking progress
#[derive(Debug, Clone, Default)]
pub struct TrainingHistory {
    pub train_errors: Vec<Option<f64>>,
    pub val_errors: Vec<Option<f64>>,
    pub best_val_error: Option<f64>,
    pub best_epoch: Option<usize>,
    /// Error over the held-out test partition after the last epoch
    pub test_error: Option<f64>,
}

impl TrainingHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record metrics for an epoch
    pub fn record_epoch(&mut self, epoch: usize, train: Option<f64>, val: Option<f64>) {
        self.train_errors.push(train);
        self.val_errors.push(val);

        if let Some(val) = val {
            if self.best_val_error.map_or(true, |best| val < best) {
                self.best_val_error = Some(val);
                self.best_epoch = Some(epoch);
            }
        }
    }

    pub fn epochs(&self) -> usize {
        self.train_errors.len()
    }
}

/// How well integer score predictions match the actual results
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScoreMetrics {
    pub total: usize,
    pub exact_scores: usize,
    pub correct_goal_difference: usize,
    pub correct_outcomes: usize,
}

impl ScoreMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, predicted: ScorePrediction, actual: ScorePrediction) {
        self.total += 1;
        if predicted == actual {
            self.exact_scores += 1;
        }
        if predicted.goal_difference() == actual.goal_difference() {
            self.correct_goal_difference += 1;
        }
        if predicted.outcome() == actual.outcome() {
            self.correct_outcomes += 1;
        }
    }

    /// Compare raw network outputs against raw expected vectors
    pub fn from_outputs<'a, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a [f64], &'a [f64])>,
    {
        let mut metrics = Self::new();
        for (output, expected) in pairs {
            metrics.update(
                ScorePrediction::from_outputs(output),
                ScorePrediction::from_outputs(expected),
            );
        }
        metrics
    }

    fn rate(&self, hits: usize) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            hits as f64 / self.total as f64
        }
    }

    pub fn exact_rate(&self) -> f64 {
        self.rate(self.exact_scores)
    }

    pub fn goal_difference_rate(&self) -> f64 {
        self.rate(self.correct_goal_difference)
    }

    pub fn outcome_rate(&self) -> f64 {
        self.rate(self.correct_outcomes)
    }
}

impl fmt::Display for ScoreMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} matches | Exact: {:.2}% | Goal diff: {:.2}% | Tendency: {:.2}%",
            self.total,
            self.exact_rate() * 100.0,
            self.goal_difference_rate() * 100.0,
            self.outcome_rate() * 100.0
        )
    }
}
