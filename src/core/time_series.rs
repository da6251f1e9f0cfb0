//! TimeSeries data structure for equally spaced, period-indexed data.

use crate::core::Period;
use crate::error::{ForecastError, Result};
use chrono::NaiveDate;
use serde::Serialize;

/// An immutable, equally spaced series of observations.
///
/// Only the start period is stored; observation `i` sits at
/// `start.advance(i, frequency)`, so periods are contiguous by
/// construction. Every transformation returns a new series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeSeries {
    start: Period,
    frequency: usize,
    values: Vec<f64>,
}

impl TimeSeries {
    /// Create a series from a start period, a frequency and its values.
    pub fn new(start: Period, frequency: usize, values: Vec<f64>) -> Result<Self> {
        start.validate(frequency)?;
        Ok(Self {
            start,
            frequency,
            values,
        })
    }

    /// Create a series from `(period, value)` pairs.
    ///
    /// Pairs must be sorted and contiguous.
    pub fn from_pairs(frequency: usize, pairs: &[(Period, f64)]) -> Result<Self> {
        let (first, _) = pairs.first().ok_or(ForecastError::EmptyData)?;
        first.validate(frequency)?;

        let mut expected = *first;
        for &(period, _) in pairs {
            if period != expected {
                return Err(ForecastError::NonContiguous {
                    expected,
                    got: period,
                });
            }
            expected = expected.advance(1, frequency);
        }

        Self::new(*first, frequency, pairs.iter().map(|&(_, v)| v).collect())
    }

    /// Create a series whose first observation falls on `date`.
    pub fn from_date(date: NaiveDate, frequency: usize, values: Vec<f64>) -> Result<Self> {
        Self::new(Period::from_date(date, frequency)?, frequency, values)
    }

    /// Get the number of observations.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if the series is empty.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Number of periods per cycle.
    pub fn frequency(&self) -> usize {
        self.frequency
    }

    /// Period of the first observation.
    pub fn start(&self) -> Period {
        self.start
    }

    /// Period of the last observation.
    pub fn last_period(&self) -> Option<Period> {
        if self.is_empty() {
            None
        } else {
            Some(self.period_at(self.len() - 1))
        }
    }

    /// Period immediately after the last observation.
    pub fn next_period(&self) -> Period {
        self.period_at(self.len())
    }

    /// Period of observation `index` (may lie past the end).
    pub fn period_at(&self, index: usize) -> Period {
        self.start.advance(index as i64, self.frequency)
    }

    /// Index of `period` within the series, if present.
    pub fn index_of(&self, period: Period) -> Option<usize> {
        let steps = self.start.steps_until(period, self.frequency);
        if steps < 0 || steps as usize >= self.len() {
            None
        } else {
            Some(steps as usize)
        }
    }

    /// Value observed at `period`, if present.
    pub fn value_at(&self, period: Period) -> Option<f64> {
        self.index_of(period).map(|i| self.values[i])
    }

    /// Observed values in period order.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Iterate over periods.
    pub fn periods(&self) -> impl Iterator<Item = Period> + '_ {
        (0..self.len()).map(|i| self.period_at(i))
    }

    /// Iterate over `(period, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (Period, f64)> + '_ {
        self.values
            .iter()
            .enumerate()
            .map(|(i, &v)| (self.period_at(i), v))
    }

    /// Last observed value.
    pub fn last_value(&self) -> Option<f64> {
        self.values.last().copied()
    }

    /// Check if the series has NaN or infinite values.
    pub fn has_missing_values(&self) -> bool {
        self.values.iter().any(|v| !v.is_finite())
    }

    /// Same frequency, same start and same length.
    pub fn is_aligned_with(&self, other: &TimeSeries) -> bool {
        self.frequency == other.frequency && self.start == other.start && self.len() == other.len()
    }

    /// A series with the same periods but different values.
    pub fn with_values(&self, values: Vec<f64>) -> Result<TimeSeries> {
        if values.len() != self.len() {
            return Err(ForecastError::misaligned(format!(
                "expected {} values, got {}",
                self.len(),
                values.len()
            )));
        }
        Ok(TimeSeries {
            start: self.start,
            frequency: self.frequency,
            values,
        })
    }

    /// Apply `f` to every value, keeping the periods.
    pub fn map<F>(&self, f: F) -> TimeSeries
    where
        F: Fn(f64) -> f64,
    {
        TimeSeries {
            start: self.start,
            frequency: self.frequency,
            values: self.values.iter().map(|&v| f(v)).collect(),
        }
    }

    /// Extract observations `start..end`.
    pub fn slice(&self, start: usize, end: usize) -> Result<TimeSeries> {
        if start > end {
            return Err(ForecastError::InvalidParameter(
                "start must be <= end".to_string(),
            ));
        }
        if end > self.len() {
            return Err(ForecastError::InsufficientData {
                needed: end,
                got: self.len(),
            });
        }

        Ok(TimeSeries {
            start: self.period_at(start),
            frequency: self.frequency,
            values: self.values[start..end].to_vec(),
        })
    }

    /// First `n` observations.
    pub fn head(&self, n: usize) -> Result<TimeSeries> {
        self.slice(0, n)
    }

    /// Last `n` observations.
    pub fn tail(&self, n: usize) -> Result<TimeSeries> {
        if n > self.len() {
            return Err(ForecastError::InsufficientData {
                needed: n,
                got: self.len(),
            });
        }
        self.slice(self.len() - n, self.len())
    }

    /// Observations from `from` to `to`, both inclusive.
    pub fn window(&self, from: Period, to: Period) -> Result<TimeSeries> {
        from.validate(self.frequency)?;
        to.validate(self.frequency)?;
        let start = self.index_of(from).ok_or_else(|| {
            ForecastError::InvalidParameter(format!("period {from} is outside the series"))
        })?;
        let end = self.index_of(to).ok_or_else(|| {
            ForecastError::InvalidParameter(format!("period {to} is outside the series"))
        })?;
        self.slice(start, end + 1)
    }

    /// Append `other`, which must start right after this series ends.
    pub fn concat(&self, other: &TimeSeries) -> Result<TimeSeries> {
        if self.frequency != other.frequency {
            return Err(ForecastError::misaligned(format!(
                "frequency {} vs {}",
                self.frequency, other.frequency
            )));
        }
        if other.start != self.next_period() {
            return Err(ForecastError::NonContiguous {
                expected: self.next_period(),
                got: other.start,
            });
        }
        let mut values = self.values.clone();
        values.extend_from_slice(&other.values);
        Ok(TimeSeries {
            start: self.start,
            frequency: self.frequency,
            values,
        })
    }

    /// Lag-`lag` differences, `y[t] - y[t - lag]`.
    ///
    /// The result starts `lag` periods later than the input.
    pub fn difference(&self, lag: usize) -> Result<TimeSeries> {
        if lag == 0 {
            return Err(ForecastError::InvalidParameter(
                "difference lag must be at least 1".to_string(),
            ));
        }
        if self.len() <= lag {
            return Err(ForecastError::InsufficientData {
                needed: lag + 1,
                got: self.len(),
            });
        }
        let values = self
            .values
            .iter()
            .skip(lag)
            .zip(self.values.iter())
            .map(|(curr, prev)| curr - prev)
            .collect();
        Ok(TimeSeries {
            start: self.period_at(lag),
            frequency: self.frequency,
            values,
        })
    }

    /// Shift the series `k` periods later: the value at `t` becomes `y[t - k]`.
    pub fn lag(&self, k: usize) -> TimeSeries {
        TimeSeries {
            start: self.period_at(k),
            frequency: self.frequency,
            values: self.values.clone(),
        }
    }

    /// Arithmetic mean of the values.
    pub fn mean(&self) -> f64 {
        if self.is_empty() {
            return f64::NAN;
        }
        self.values.iter().sum::<f64>() / self.len() as f64
    }
}
