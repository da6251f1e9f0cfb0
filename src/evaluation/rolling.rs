//! Rolling-origin evaluation (time series cross-validation).

use crate::core::{Period, TimeSeries};
use crate::error::{ForecastError, Result};
use crate::evaluation::accuracy::{AccuracyEvaluator, AccuracyReport};
use crate::evaluation::partition::partition;
use crate::evaluation::runner::ForecastRunner;
use crate::models::Forecaster;
use crate::utils::stats::{mean, std_dev};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// How the training window moves between folds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WindowKind {
    /// Training always starts at the first observation.
    #[default]
    Expanding,
    /// Training keeps `initial_window` observations and slides forward.
    Sliding,
}

/// Configuration for [`rolling_origin`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RollingConfig {
    /// Training length of the first fold.
    pub initial_window: usize,
    /// Validation length of every fold.
    pub horizon: usize,
    /// Periods the origin advances between folds.
    pub step: usize,
    pub window: WindowKind,
    pub evaluator: AccuracyEvaluator,
}

impl Default for RollingConfig {
    fn default() -> Self {
        Self {
            initial_window: 10,
            horizon: 1,
            step: 1,
            window: WindowKind::Expanding,
            evaluator: AccuracyEvaluator::default(),
        }
    }
}

impl RollingConfig {
    /// Expanding training window starting with `initial_window` observations.
    pub fn expanding(initial_window: usize, horizon: usize) -> Self {
        Self {
            initial_window,
            horizon,
            ..Self::default()
        }
    }

    /// Fixed-size training window of `window` observations.
    pub fn sliding(window: usize, horizon: usize) -> Self {
        Self {
            initial_window: window,
            horizon,
            window: WindowKind::Sliding,
            ..Self::default()
        }
    }

    /// Set the step between forecast origins.
    pub fn with_step(mut self, step: usize) -> Self {
        self.step = step;
        self
    }

    pub fn with_evaluator(mut self, evaluator: AccuracyEvaluator) -> Self {
        self.evaluator = evaluator;
        self
    }

    fn validate(&self, n: usize) -> Result<()> {
        if self.horizon == 0 {
            return Err(ForecastError::InvalidHorizon {
                horizon: 0,
                length: n,
            });
        }
        if self.initial_window == 0 || self.step == 0 {
            return Err(ForecastError::InvalidParameter(format!(
                "rolling origin needs a positive initial window and step, got {} and {}",
                self.initial_window, self.step
            )));
        }
        let needed = self.initial_window + self.horizon;
        if n < needed {
            return Err(ForecastError::InsufficientData { needed, got: n });
        }
        Ok(())
    }
}

/// One forecast origin.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RollingFold {
    /// First training period.
    pub train_start: Period,
    /// Number of training observations.
    pub train_len: usize,
    /// First forecast period.
    pub origin: Period,
    pub report: AccuracyReport,
}

/// Per-fold reports and their spread.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RollingSummary {
    pub method: String,
    pub folds: Vec<RollingFold>,
    pub mean_mae: f64,
    pub sd_mae: f64,
    pub mean_rmse: f64,
    pub sd_rmse: f64,
}

/// Evaluate `model` at successive forecast origins.
///
/// The first fold trains on `initial_window` observations; each later fold
/// moves the origin `step` periods on, while a full validation window of
/// `horizon` periods still fits in `series`. The first failing fold aborts
/// the run.
///
/// # Example
/// ```
/// use forecast_harness::core::{Period, TimeSeries};
/// use forecast_harness::evaluation::{rolling_origin, RollingConfig};
/// use forecast_harness::models::baseline::Naive;
///
/// let series = TimeSeries::new(Period::new(2000, 1), 1, (1..=20).map(f64::from).collect()).unwrap();
/// let config = RollingConfig::expanding(10, 2).with_step(2);
/// let summary = rolling_origin(&series, &Naive::new(), &config).unwrap();
///
/// assert_eq!(summary.folds.len(), 5);
/// assert!((summary.mean_mae - 1.5).abs() < 1e-12);
/// ```
pub fn rolling_origin(
    series: &TimeSeries,
    model: &dyn Forecaster,
    config: &RollingConfig,
) -> Result<RollingSummary> {
    let n = series.len();
    config.validate(n)?;
    let runner = ForecastRunner::new()
        .with_levels(&[])
        .with_evaluator(config.evaluator);

    let mut folds = Vec::new();
    let mut origin = config.initial_window;
    while origin + config.horizon <= n {
        let train_start = match config.window {
            WindowKind::Expanding => 0,
            WindowKind::Sliding => origin - config.initial_window,
        };
        let split = partition(&series.slice(train_start, origin + config.horizon)?, config.horizon)?;
        let forecast = runner.run(model, split.train(), config.horizon)?;
        let report = config.evaluator.evaluate(&forecast, split.valid())?;

        folds.push(RollingFold {
            train_start: split.train().start(),
            train_len: split.train().len(),
            origin: split.valid().start(),
            report,
        });
        origin += config.step;
    }

    let mae: Vec<f64> = folds.iter().map(|f| f.report.mae).collect();
    let rmse: Vec<f64> = folds.iter().map(|f| f.report.rmse).collect();
    let spread = |values: &[f64]| if values.len() < 2 { 0.0 } else { std_dev(values) };

    debug!(
        method = model.name(),
        folds = folds.len(),
        mean_mae = mean(&mae),
        "rolling origin evaluation"
    );

    Ok(RollingSummary {
        method: model.name().to_string(),
        mean_mae: mean(&mae),
        sd_mae: spread(&mae),
        mean_rmse: mean(&rmse),
        sd_rmse: spread(&rmse),
        folds,
    })
}
