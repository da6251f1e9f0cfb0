//! Forecast result structure for holding predictions.

use crate::core::{Period, TimeSeries};
use crate::error::{ForecastError, Result};
use serde::Serialize;

/// Lower and upper bounds at one confidence level.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionInterval {
    /// Confidence level in (0, 1), e.g. 0.95.
    pub level: f64,
    /// Lower bound per horizon step.
    pub lower: Vec<f64>,
    /// Upper bound per horizon step.
    pub upper: Vec<f64>,
}

/// A forecast result containing point predictions and optional intervals.
///
/// The periods are implied by `start` and `frequency`, exactly as for a
/// [`TimeSeries`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Forecast {
    method: String,
    start: Period,
    frequency: usize,
    point: Vec<f64>,
    intervals: Vec<PredictionInterval>,
}

impl Forecast {
    /// Create a point forecast starting at `start`.
    pub fn new(
        method: impl Into<String>,
        start: Period,
        frequency: usize,
        point: Vec<f64>,
    ) -> Result<Self> {
        start.validate(frequency)?;
        Ok(Self {
            method: method.into(),
            start,
            frequency,
            point,
            intervals: Vec::new(),
        })
    }

    /// Create a point forecast for the periods right after `train`.
    pub fn following(train: &TimeSeries, method: impl Into<String>, point: Vec<f64>) -> Self {
        Self {
            method: method.into(),
            start: train.next_period(),
            frequency: train.frequency(),
            point,
            intervals: Vec::new(),
        }
    }

    /// Attach an interval; bounds must match the horizon.
    pub fn with_interval(mut self, level: f64, lower: Vec<f64>, upper: Vec<f64>) -> Result<Self> {
        if !(level > 0.0 && level < 1.0) {
            return Err(ForecastError::InvalidParameter(format!(
                "interval level must be in (0, 1), got {level}"
            )));
        }
        if lower.len() != self.horizon() || upper.len() != self.horizon() {
            return Err(ForecastError::misaligned(format!(
                "interval bounds of length {}/{} for horizon {}",
                lower.len(),
                upper.len(),
                self.horizon()
            )));
        }
        self.intervals.push(PredictionInterval {
            level,
            lower,
            upper,
        });
        Ok(self)
    }

    /// Name of the method that produced the forecast.
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Period of the first forecast step.
    pub fn start(&self) -> Period {
        self.start
    }

    /// Number of periods per cycle.
    pub fn frequency(&self) -> usize {
        self.frequency
    }

    /// Get the forecast horizon (number of steps).
    pub fn horizon(&self) -> usize {
        self.point.len()
    }

    /// Check if forecast is empty.
    pub fn is_empty(&self) -> bool {
        self.point.is_empty()
    }

    /// Point predictions.
    pub fn point(&self) -> &[f64] {
        &self.point
    }

    /// All attached intervals.
    pub fn intervals(&self) -> &[PredictionInterval] {
        &self.intervals
    }

    /// Interval at `level`, if one was computed.
    pub fn interval(&self, level: f64) -> Option<&PredictionInterval> {
        self.intervals
            .iter()
            .find(|iv| (iv.level - level).abs() < 1e-9)
    }

    /// Period of forecast step `step` (0-based).
    pub fn period_at(&self, step: usize) -> Period {
        self.start.advance(step as i64, self.frequency)
    }

    /// Period of the last forecast step.
    pub fn last_period(&self) -> Option<Period> {
        if self.is_empty() {
            None
        } else {
            Some(self.period_at(self.horizon() - 1))
        }
    }

    /// Point forecasts as a period-indexed series.
    pub fn as_series(&self) -> Result<TimeSeries> {
        TimeSeries::new(self.start, self.frequency, self.point.clone())
    }

    /// Rename the producing method.
    pub(crate) fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = method.into();
        self
    }
}
