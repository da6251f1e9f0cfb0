//! Naive forecasting model.
//!
//! The naive method simply forecasts the last observed value for all future periods.

use super::residual_sd;
use crate::core::{Forecast, TimeSeries};
use crate::error::{ForecastError, Result};
use crate::models::traits::{check_train, with_normal_intervals};
use crate::models::Forecaster;
use tracing::debug;

/// Naive forecaster that repeats the last value.
#[derive(Debug, Clone, Copy, Default)]
pub struct Naive;

struct NaiveFit {
    last_value: f64,
    fitted: Vec<f64>,
    sigma: f64,
}

impl Naive {
    pub fn new() -> Self {
        Self
    }

    fn fit(&self, train: &TimeSeries) -> Result<NaiveFit> {
        let values = train.values();
        let last_value = train.last_value().ok_or(ForecastError::EmptyData)?;

        // Fitted values are shifted history (y_hat[t] = y[t-1])
        let mut fitted = Vec::with_capacity(values.len());
        fitted.push(f64::NAN);
        fitted.extend_from_slice(&values[..values.len() - 1]);

        let residuals: Vec<f64> = values.windows(2).map(|w| w[1] - w[0]).collect();
        Ok(NaiveFit {
            last_value,
            fitted,
            sigma: residual_sd(&residuals),
        })
    }
}

impl Forecaster for Naive {
    fn name(&self) -> &str {
        "Naive"
    }

    fn forecast(&self, train: &TimeSeries, horizon: usize) -> Result<Forecast> {
        check_train(train, horizon)?;
        let fit = self.fit(train)?;
        debug!(last_value = fit.last_value, horizon, "naive forecast");
        Ok(Forecast::following(train, self.name(), vec![fit.last_value; horizon]))
    }

    fn forecast_with_intervals(
        &self,
        train: &TimeSeries,
        horizon: usize,
        levels: &[f64],
    ) -> Result<Forecast> {
        check_train(train, horizon)?;
        let fit = self.fit(train)?;
        let point = Forecast::following(train, self.name(), vec![fit.last_value; horizon]);

        // Random-walk variance grows linearly with the horizon
        let sd: Vec<f64> = (1..=horizon)
            .map(|h| fit.sigma * (h as f64).sqrt())
            .collect();
        with_normal_intervals(point, &sd, levels)
    }

    fn fitted(&self, train: &TimeSeries) -> Result<TimeSeries> {
        check_train(train, 1)?;
        train.with_values(self.fit(train)?.fitted)
    }
}
