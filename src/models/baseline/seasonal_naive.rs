//! Seasonal Naive forecasting model.
//!
//! Forecasts by repeating the value from the same season in the previous cycle.

use super::residual_sd;
use crate::core::{Forecast, TimeSeries};
use crate::error::{ForecastError, Result};
use crate::models::traits::{check_train, with_normal_intervals};
use crate::models::Forecaster;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Seasonal Naive forecaster.
///
/// Each forecast is equal to the observation from the same season
/// in the last observed cycle. The seasonal period defaults to the
/// frequency of the training series.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeasonalNaive {
    period: Option<usize>,
}

struct SeasonalNaiveFit {
    last_cycle: Vec<f64>,
    fitted: Vec<f64>,
    sigma: f64,
}

impl SeasonalNaive {
    /// Seasonal naive over the series frequency.
    pub fn new() -> Self {
        Self { period: None }
    }

    /// Seasonal naive over an explicit period.
    pub fn with_period(period: usize) -> Self {
        Self {
            period: Some(period),
        }
    }

    /// Seasonal period used for `train`.
    pub fn period_for(&self, train: &TimeSeries) -> usize {
        self.period.unwrap_or_else(|| train.frequency())
    }

    fn fit(&self, train: &TimeSeries) -> Result<SeasonalNaiveFit> {
        let period = self.period_for(train);
        if period == 0 {
            return Err(ForecastError::InvalidParameter(
                "seasonal period must be at least 1".to_string(),
            ));
        }
        let values = train.values();
        let n = values.len();
        if n < period {
            return Err(ForecastError::InsufficientData {
                needed: period,
                got: n,
            });
        }

        // Fitted values: y_hat[t] = y[t - period]
        let fitted: Vec<f64> = (0..n)
            .map(|i| if i < period { f64::NAN } else { values[i - period] })
            .collect();
        let residuals: Vec<f64> = (period..n).map(|i| values[i] - values[i - period]).collect();

        Ok(SeasonalNaiveFit {
            last_cycle: values[n - period..].to_vec(),
            fitted,
            sigma: residual_sd(&residuals),
        })
    }

    fn project(fit: &SeasonalNaiveFit, horizon: usize) -> Vec<f64> {
        let period = fit.last_cycle.len();
        (0..horizon).map(|i| fit.last_cycle[i % period]).collect()
    }
}

impl Forecaster for SeasonalNaive {
    fn name(&self) -> &str {
        "SeasonalNaive"
    }

    fn forecast(&self, train: &TimeSeries, horizon: usize) -> Result<Forecast> {
        check_train(train, horizon)?;
        let fit = self.fit(train)?;
        debug!(period = fit.last_cycle.len(), horizon, "seasonal naive forecast");
        Ok(Forecast::following(train, self.name(), Self::project(&fit, horizon)))
    }

    fn forecast_with_intervals(
        &self,
        train: &TimeSeries,
        horizon: usize,
        levels: &[f64],
    ) -> Result<Forecast> {
        check_train(train, horizon)?;
        let fit = self.fit(train)?;
        let period = fit.last_cycle.len();
        let point = Forecast::following(train, self.name(), Self::project(&fit, horizon));

        // Variance grows with the number of whole cycles ahead
        let sd: Vec<f64> = (0..horizon)
            .map(|i| fit.sigma * ((i / period + 1) as f64).sqrt())
            .collect();
        with_normal_intervals(point, &sd, levels)
    }

    fn fitted(&self, train: &TimeSeries) -> Result<TimeSeries> {
        check_train(train, 1)?;
        train.with_values(self.fit(train)?.fitted)
    }
}
