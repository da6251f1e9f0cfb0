//! Scoring predicted probabilities of a binary outcome.

use crate::core::TimeSeries;
use crate::error::{ForecastError, Result};
use serde::Serialize;

/// Counts of predicted against actual outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ConfusionMatrix {
    pub true_positive: usize,
    pub false_positive: usize,
    pub true_negative: usize,
    pub false_negative: usize,
}

impl ConfusionMatrix {
    pub fn total(&self) -> usize {
        self.true_positive + self.false_positive + self.true_negative + self.false_negative
    }

    /// Share of correct classifications.
    pub fn accuracy(&self) -> f64 {
        ratio(self.true_positive + self.true_negative, self.total())
    }

    /// True positive rate; NaN without actual positives.
    pub fn sensitivity(&self) -> f64 {
        ratio(self.true_positive, self.true_positive + self.false_negative)
    }

    /// True negative rate; NaN without actual negatives.
    pub fn specificity(&self) -> f64 {
        ratio(self.true_negative, self.true_negative + self.false_positive)
    }

    fn record(&mut self, predicted: bool, actual: bool) {
        match (predicted, actual) {
            (true, true) => self.true_positive += 1,
            (true, false) => self.false_positive += 1,
            (false, false) => self.true_negative += 1,
            (false, true) => self.false_negative += 1,
        }
    }
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        f64::NAN
    } else {
        numerator as f64 / denominator as f64
    }
}

/// Confusion matrix and rates at one cutoff.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassificationReport {
    pub cutoff: f64,
    pub matrix: ConfusionMatrix,
    pub accuracy: f64,
    pub sensitivity: f64,
    pub specificity: f64,
}

/// Classify `probabilities` at `cutoff` and compare with `actual` outcomes.
///
/// A probability at or above the cutoff counts as a predicted 1. Periods
/// with a NaN probability are skipped.
///
/// # Example
/// ```
/// use forecast_harness::core::{Period, TimeSeries};
/// use forecast_harness::evaluation::classify;
///
/// let start = Period::new(2021, 1);
/// let probabilities = TimeSeries::new(start, 12, vec![0.9, 0.2, 0.6, 0.4]).unwrap();
/// let actual = TimeSeries::new(start, 12, vec![1.0, 0.0, 0.0, 1.0]).unwrap();
///
/// let report = classify(&probabilities, &actual, 0.5).unwrap();
/// assert_eq!(report.matrix.true_positive, 1);
/// assert_eq!(report.accuracy, 0.5);
/// ```
pub fn classify(probabilities: &TimeSeries, actual: &TimeSeries, cutoff: f64) -> Result<ClassificationReport> {
    if !(0.0..=1.0).contains(&cutoff) {
        return Err(ForecastError::InvalidParameter(format!(
            "cutoff must lie in [0, 1], got {cutoff}"
        )));
    }
    if !probabilities.is_aligned_with(actual) {
        return Err(ForecastError::misaligned(format!(
            "probabilities cover {} periods from {}, outcomes {} from {}",
            probabilities.len(),
            probabilities.start(),
            actual.len(),
            actual.start()
        )));
    }

    let mut matrix = ConfusionMatrix::default();
    for (index, (&p, &y)) in probabilities.values().iter().zip(actual.values()).enumerate() {
        if p.is_nan() {
            continue;
        }
        if y != 0.0 && y != 1.0 {
            return Err(ForecastError::InvalidParameter(format!(
                "outcome at {} is {y}, expected 0 or 1",
                actual.period_at(index)
            )));
        }
        matrix.record(p >= cutoff, y == 1.0);
    }
    if matrix.total() == 0 {
        return Err(ForecastError::EmptyData);
    }

    Ok(ClassificationReport {
        cutoff,
        accuracy: matrix.accuracy(),
        sensitivity: matrix.sensitivity(),
        specificity: matrix.specificity(),
        matrix,
    })
}
