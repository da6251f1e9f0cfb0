//! Trailing moving average forecaster.

use super::residual_sd;
use crate::core::{Forecast, TimeSeries};
use crate::error::{ForecastError, Result};
use crate::models::traits::{check_train, with_normal_intervals};
use crate::models::Forecaster;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Forecasts every future period as the mean of the last `window`
/// observations (a flat line).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovingAverage {
    window: usize,
}

struct MovingAverageFit {
    level: f64,
    fitted: Vec<f64>,
    sigma: f64,
}

impl MovingAverage {
    /// Create a moving average over `window` observations.
    pub fn new(window: usize) -> Self {
        Self { window }
    }

    /// Get the window size.
    pub fn window(&self) -> usize {
        self.window
    }

    fn fit(&self, train: &TimeSeries) -> Result<MovingAverageFit> {
        let w = self.window;
        if w == 0 {
            return Err(ForecastError::InvalidParameter(
                "moving average window must be at least 1".to_string(),
            ));
        }
        let values = train.values();
        let n = values.len();
        if n < w {
            return Err(ForecastError::InsufficientData { needed: w, got: n });
        }

        // Fitted value at t is the mean of the w observations before t
        let mut fitted = vec![f64::NAN; n];
        let mut sum: f64 = values[..w].iter().sum();
        for t in w..n {
            fitted[t] = sum / w as f64;
            sum += values[t] - values[t - w];
        }
        let level = sum / w as f64;

        let residuals: Vec<f64> = values
            .iter()
            .zip(fitted.iter())
            .map(|(y, f)| y - f)
            .collect();
        Ok(MovingAverageFit {
            level,
            fitted,
            sigma: residual_sd(&residuals),
        })
    }
}

impl Forecaster for MovingAverage {
    fn name(&self) -> &str {
        "MovingAverage"
    }

    fn forecast(&self, train: &TimeSeries, horizon: usize) -> Result<Forecast> {
        check_train(train, horizon)?;
        let fit = self.fit(train)?;
        debug!(window = self.window, level = fit.level, "moving average forecast");
        Ok(Forecast::following(train, self.name(), vec![fit.level; horizon]))
    }

    fn forecast_with_intervals(
        &self,
        train: &TimeSeries,
        horizon: usize,
        levels: &[f64],
    ) -> Result<Forecast> {
        check_train(train, horizon)?;
        let fit = self.fit(train)?;
        let point = Forecast::following(train, self.name(), vec![fit.level; horizon]);
        let sd = vec![fit.sigma; horizon];
        with_normal_intervals(point, &sd, levels)
    }

    fn fitted(&self, train: &TimeSeries) -> Result<TimeSeries> {
        check_train(train, 1)?;
        train.with_values(self.fit(train)?.fitted)
    }
}
