//! Hold-out partitioning into a training prefix and a validation suffix.

use crate::core::{Period, TimeSeries};
use crate::error::{ForecastError, Result};
use serde::Serialize;

/// A training prefix and the validation window that follows it.
///
/// The validation series starts exactly one period after the training
/// series ends, so no observation is in both.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Partition {
    train: TimeSeries,
    valid: TimeSeries,
}

impl Partition {
    /// Training data.
    pub fn train(&self) -> &TimeSeries {
        &self.train
    }

    /// Held-out validation data.
    pub fn valid(&self) -> &TimeSeries {
        &self.valid
    }

    /// Length of the validation window.
    pub fn horizon(&self) -> usize {
        self.valid.len()
    }

    /// Training and validation data joined back together.
    pub fn rejoin(&self) -> Result<TimeSeries> {
        self.train.concat(&self.valid)
    }

    /// Split into `(train, valid)`.
    pub fn into_parts(self) -> (TimeSeries, TimeSeries) {
        (self.train, self.valid)
    }
}

/// Hold out the last `validation_length` observations.
///
/// Requires `0 < validation_length < series.len()`.
///
/// # Example
/// ```
/// use forecast_harness::core::{Period, TimeSeries};
/// use forecast_harness::evaluation::partition;
///
/// let series = TimeSeries::new(Period::new(2005, 3), 12, (1..=24).map(f64::from).collect()).unwrap();
/// let split = partition(&series, 6).unwrap();
///
/// assert_eq!(split.train().len(), 18);
/// assert_eq!(split.valid().start(), Period::new(2006, 9));
/// assert_eq!(split.train().next_period(), split.valid().start());
/// ```
pub fn partition(series: &TimeSeries, validation_length: usize) -> Result<Partition> {
    let n = series.len();
    if validation_length == 0 || validation_length >= n {
        return Err(ForecastError::InvalidHorizon {
            horizon: validation_length,
            length: n,
        });
    }
    let cut = n - validation_length;
    Ok(Partition {
        train: series.slice(0, cut)?,
        valid: series.slice(cut, n)?,
    })
}

/// Hold out everything from `first_valid` onwards.
///
/// The implied validation length must satisfy the same bounds as
/// [`partition`].
pub fn partition_at(series: &TimeSeries, first_valid: Period) -> Result<Partition> {
    first_valid.validate(series.frequency())?;
    let n = series.len() as i64;
    let cut = series.start().steps_until(first_valid, series.frequency());
    let validation_length = (n - cut).clamp(0, n) as usize;
    if cut <= 0 || cut >= n {
        return Err(ForecastError::InvalidHorizon {
            horizon: validation_length,
            length: series.len(),
        });
    }
    partition(series, validation_length)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn monthly(n: usize) -> TimeSeries {
        TimeSeries::new(Period::new(1991, 1), 12, (0..n).map(|i| i as f64).collect()).unwrap()
    }

    #[test]
    fn partition_keeps_periods() {
        let series = monthly(36);
        let split = partition(&series, 12).unwrap();

        assert_eq!(split.train().len(), 24);
        assert_eq!(split.horizon(), 12);
        assert_eq!(split.train().last_period(), Some(Period::new(1992, 12)));
        assert_eq!(split.valid().start(), Period::new(1993, 1));
        assert_eq!(split.rejoin().unwrap(), series);
    }

    #[test]
    fn partition_rejects_boundary_lengths() {
        let series = monthly(10);
        assert!(matches!(
            partition(&series, 0),
            Err(ForecastError::InvalidHorizon { horizon: 0, length: 10 })
        ));
        assert!(matches!(
            partition(&series, 10),
            Err(ForecastError::InvalidHorizon { horizon: 10, length: 10 })
        ));
        assert!(partition(&series, 9).is_ok());
    }

    #[test]
    fn partition_at_calendar_period() {
        let series = monthly(36);
        let split = partition_at(&series, Period::new(1993, 4)).unwrap();
        assert_eq!(split.horizon(), 9);
        assert_eq!(split.train().len(), 27);
        assert_eq!(split.valid().values()[0], 27.0);
    }

    #[test]
    fn partition_at_outside_series() {
        let series = monthly(12);
        assert!(matches!(
            partition_at(&series, Period::new(1991, 1)),
            Err(ForecastError::InvalidHorizon { horizon: 12, length: 12 })
        ));
        assert!(matches!(
            partition_at(&series, Period::new(1992, 1)),
            Err(ForecastError::InvalidHorizon { horizon: 0, length: 12 })
        ));
        assert!(partition_at(&series, Period::new(1991, 13)).is_err());
    }
}
