//! Random walk with drift.
//!
//! Forecasts based on the last value plus a drift term estimated from historical data.

use super::residual_sd;
use crate::core::{Forecast, TimeSeries};
use crate::error::{ForecastError, Result};
use crate::models::traits::{check_train, with_normal_intervals};
use crate::models::Forecaster;
use tracing::debug;

/// Random walk with drift forecaster.
///
/// The forecast is: y_hat\[n+h\] = y\[n\] + h * drift
/// where drift is the average change over the training data, i.e. the
/// slope of the line joining the first and last observations.
#[derive(Debug, Clone, Copy, Default)]
pub struct Drift;

struct DriftFit {
    last_value: f64,
    drift: f64,
    fitted: Vec<f64>,
    sigma: f64,
    n: usize,
}

impl Drift {
    pub fn new() -> Self {
        Self
    }

    fn fit(&self, train: &TimeSeries) -> Result<DriftFit> {
        let values = train.values();
        let n = values.len();
        if n < 2 {
            return Err(ForecastError::InsufficientData { needed: 2, got: n });
        }

        let drift = (values[n - 1] - values[0]) / (n - 1) as f64;

        // Fitted values: y_hat[t] = y[t-1] + drift
        let mut fitted = Vec::with_capacity(n);
        fitted.push(f64::NAN);
        fitted.extend(values[..n - 1].iter().map(|v| v + drift));

        let residuals: Vec<f64> = values.windows(2).map(|w| w[1] - w[0] - drift).collect();
        Ok(DriftFit {
            last_value: values[n - 1],
            drift,
            fitted,
            sigma: residual_sd(&residuals),
            n,
        })
    }

    fn project(fit: &DriftFit, horizon: usize) -> Vec<f64> {
        (1..=horizon)
            .map(|h| fit.last_value + h as f64 * fit.drift)
            .collect()
    }
}

impl Forecaster for Drift {
    fn name(&self) -> &str {
        "Drift"
    }

    fn forecast(&self, train: &TimeSeries, horizon: usize) -> Result<Forecast> {
        check_train(train, horizon)?;
        let fit = self.fit(train)?;
        debug!(drift = fit.drift, horizon, "drift forecast");
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
        let point = Forecast::following(train, self.name(), Self::project(&fit, horizon));

        // Includes the uncertainty of the estimated drift
        let sd: Vec<f64> = (1..=horizon)
            .map(|h| {
                let h = h as f64;
                fit.sigma * (h * (1.0 + h / (fit.n - 1) as f64)).sqrt()
            })
            .collect();
        with_normal_intervals(point, &sd, levels)
    }

    fn fitted(&self, train: &TimeSeries) -> Result<TimeSeries> {
        check_train(train, 1)?;
        train.with_values(self.fit(train)?.fitted)
    }
}
