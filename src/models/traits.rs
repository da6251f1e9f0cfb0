//! Forecaster trait defining the common interface for all models.

use crate::core::{Forecast, TimeSeries};
use crate::error::{ForecastError, Result};

/// Common interface for all forecasting models.
///
/// A forecaster is its configuration: every call fits on `train` from
/// scratch and returns a new [`Forecast`] whose first period immediately
/// follows `train`. Implementations hold no fitted state, so the same value
/// can be shared across threads and reused for any number of partitions.
///
/// This trait is object-safe and can be used with `Box<dyn Forecaster>`.
pub trait Forecaster: Send + Sync {
    /// Get the model name.
    fn name(&self) -> &str;

    /// Fit on `train` and forecast `horizon` periods ahead.
    fn forecast(&self, train: &TimeSeries, horizon: usize) -> Result<Forecast>;

    /// Forecast with prediction intervals at each of `levels`.
    fn forecast_with_intervals(
        &self,
        train: &TimeSeries,
        horizon: usize,
        levels: &[f64],
    ) -> Result<Forecast> {
        // Default implementation just returns point predictions
        let _ = levels;
        self.forecast(train, horizon)
    }

    /// One-step in-sample fitted values, aligned with `train`.
    ///
    /// Periods where the model has no fitted value yet are NaN.
    fn fitted(&self, train: &TimeSeries) -> Result<TimeSeries>;

    /// Forecast with intervals plus the fitted values of the same fit.
    ///
    /// A failure to produce fitted values does not fail the forecast. The
    /// default fits twice; models with an expensive fit override it.
    fn forecast_and_fitted(
        &self,
        train: &TimeSeries,
        horizon: usize,
        levels: &[f64],
    ) -> Result<(Forecast, Result<TimeSeries>)> {
        let forecast = self.forecast_with_intervals(train, horizon, levels)?;
        Ok((forecast, self.fitted(train)))
    }
}

/// Type alias for boxed forecaster trait objects.
///
/// # Example
///
/// ```
/// use forecast_harness::models::{BoxedForecaster, Forecaster};
/// use forecast_harness::models::baseline::Naive;
///
/// let model: BoxedForecaster = Box::new(Naive::new());
/// assert_eq!(model.name(), "Naive");
/// ```
pub type BoxedForecaster = Box<dyn Forecaster>;

/// Reject empty or non-finite training data and a zero horizon.
pub(crate) fn check_train(train: &TimeSeries, horizon: usize) -> Result<()> {
    if train.is_empty() {
        return Err(ForecastError::EmptyData);
    }
    if horizon == 0 {
        return Err(ForecastError::InvalidHorizon {
            horizon,
            length: train.len(),
        });
    }
    if train.has_missing_values() {
        return Err(ForecastError::InvalidParameter(
            "training data contains NaN or infinite values".to_string(),
        ));
    }
    Ok(())
}

/// Seasonal methods need at least two full cycles.
pub(crate) fn require_two_cycles(train: &TimeSeries, period: usize) -> Result<()> {
    if train.len() < 2 * period {
        return Err(ForecastError::InsufficientData {
            needed: 2 * period,
            got: train.len(),
        });
    }
    Ok(())
}

/// Attach normal intervals `point ± z(level) * sd` for every level.
pub(crate) fn with_normal_intervals(
    forecast: Forecast,
    sd: &[f64],
    levels: &[f64],
) -> Result<Forecast> {
    levels.iter().try_fold(forecast, |fc, &level| {
        let z = crate::utils::z_for_level(level)?;
        let (lower, upper) = crate::utils::stats::normal_bounds(fc.point(), sd, z);
        fc.with_interval(level, lower, upper)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Period;
    use crate::models::baseline::{Naive, SeasonalNaive};
    use std::sync::Arc;

    fn series(values: Vec<f64>) -> TimeSeries {
        TimeSeries::new(Period::new(2000, 1), 4, values).unwrap()
    }

    #[test]
    fn forecasters_work_as_trait_objects() {
        let models: Vec<BoxedForecaster> = vec![Box::new(Naive::new()), Box::new(SeasonalNaive::new())];
        let train = series((1..=8).map(|i| i as f64).collect());

        for model in &models {
            let fc = model.forecast(&train, 3).unwrap();
            assert_eq!(fc.horizon(), 3);
            assert_eq!(fc.start(), train.next_period());
        }
    }

    #[test]
    fn forecasters_are_shareable_across_threads() {
        let model: Arc<dyn Forecaster> = Arc::new(Naive::new());
        let train = series(vec![1.0, 2.0, 3.0]);

        let handle = {
            let model = Arc::clone(&model);
            let train = train.clone();
            std::thread::spawn(move || model.forecast(&train, 2))
        };
        let fc = handle.join().unwrap().unwrap();
        assert_eq!(fc.point(), &[3.0, 3.0]);
    }

    #[test]
    fn check_train_rejects_bad_input() {
        let train = series(vec![1.0, 2.0]);
        assert!(matches!(
            check_train(&train, 0),
            Err(ForecastError::InvalidHorizon { horizon: 0, length: 2 })
        ));
        assert!(matches!(
            check_train(&series(vec![]), 1),
            Err(ForecastError::EmptyData)
        ));
        assert!(check_train(&series(vec![1.0, f64::NAN]), 1).is_err());
    }

    #[test]
    fn require_two_cycles_reports_needed_length() {
        let train = series(vec![1.0; 7]);
        assert!(matches!(
            require_two_cycles(&train, 4),
            Err(ForecastError::InsufficientData { needed: 8, got: 7 })
        ));
    }
}
