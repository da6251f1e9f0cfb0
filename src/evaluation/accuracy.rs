//! Accuracy metrics for forecast evaluation.
//!
//! Errors are `e_t = actual_t - forecast_t`. Every report carries the
//! [`EvaluationMode`] it was computed in, so in-sample fit statistics are
//! never mistaken for out-of-sample accuracy.

use crate::core::{Forecast, TimeSeries};
use crate::error::{ForecastError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Whether a report scores fitted values or held-out forecasts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EvaluationMode {
    /// One-step fitted values against the training data.
    InSample,
    /// Forecasts against the validation window.
    OutOfSample,
}

/// How percentage metrics treat a zero actual value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ZeroActualPolicy {
    /// Fail with [`ForecastError::DivisionByZero`].
    #[default]
    Error,
    /// Report MAPE and MPE as NaN.
    Nan,
}

/// Accuracy of one set of predictions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccuracyReport {
    pub mode: EvaluationMode,
    /// Number of scored points.
    pub n: usize,
    /// Mean error.
    pub me: f64,
    /// Mean absolute error.
    pub mae: f64,
    /// Mean absolute percentage error, in percent.
    pub mape: f64,
    /// Root mean squared error.
    pub rmse: f64,
    /// Mean percentage error, in percent.
    pub mpe: f64,
    /// Mean absolute scaled error, when a scale was supplied.
    pub mase: Option<f64>,
}

impl AccuracyReport {
    /// Metrics by name: `ME`, `MAE`, `MAPE`, `RMSE`, `MPE` and `MASE` if known.
    pub fn metrics(&self) -> BTreeMap<&'static str, f64> {
        let mut map = BTreeMap::from([
            ("ME", self.me),
            ("MAE", self.mae),
            ("MAPE", self.mape),
            ("RMSE", self.rmse),
            ("MPE", self.mpe),
        ]);
        if let Some(mase) = self.mase {
            map.insert("MASE", mase);
        }
        map
    }

    /// Look up one metric by name.
    pub fn metric(&self, name: &str) -> Option<f64> {
        self.metrics().get(name).copied()
    }
}

/// Scores predictions against actual values.
///
/// # Example
/// ```
/// use forecast_harness::core::{Forecast, Period, TimeSeries};
/// use forecast_harness::evaluation::{AccuracyEvaluator, EvaluationMode};
///
/// let actual = TimeSeries::new(Period::new(2020, 1), 1, vec![10.0, 20.0, 30.0]).unwrap();
/// let forecast = Forecast::new("manual", Period::new(2020, 1), 1, vec![12.0, 18.0, 33.0]).unwrap();
///
/// let report = AccuracyEvaluator::default().evaluate(&forecast, &actual).unwrap();
/// assert_eq!(report.mode, EvaluationMode::OutOfSample);
/// assert!((report.me + 1.0).abs() < 1e-12);
/// assert!((report.mape - 40.0 / 3.0).abs() < 1e-9);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AccuracyEvaluator {
    pub zero_actuals: ZeroActualPolicy,
}

impl AccuracyEvaluator {
    /// Evaluator with the default zero-actual policy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the zero-actual policy.
    pub fn with_zero_actuals(mut self, policy: ZeroActualPolicy) -> Self {
        self.zero_actuals = policy;
        self
    }

    /// Out-of-sample accuracy of `forecast` against `actual`.
    ///
    /// Both must cover the same periods.
    pub fn evaluate(&self, forecast: &Forecast, actual: &TimeSeries) -> Result<AccuracyReport> {
        if forecast.frequency() != actual.frequency()
            || forecast.start() != actual.start()
            || forecast.horizon() != actual.len()
        {
            return Err(ForecastError::misaligned(format!(
                "forecast covers {} periods from {}, actual covers {} from {}",
                forecast.horizon(),
                forecast.start(),
                actual.len(),
                actual.start()
            )));
        }
        let pairs = actual
            .values()
            .iter()
            .zip(forecast.point())
            .enumerate()
            .map(|(i, (&a, &f))| (i, a, f));
        self.score(pairs, EvaluationMode::OutOfSample)
    }

    /// In-sample accuracy of `fitted` against `train`.
    ///
    /// Periods with a NaN fitted value are skipped.
    pub fn evaluate_fit(&self, fitted: &TimeSeries, train: &TimeSeries) -> Result<AccuracyReport> {
        if !fitted.is_aligned_with(train) {
            return Err(ForecastError::misaligned(format!(
                "fitted values cover {} periods from {}, training data {} from {}",
                fitted.len(),
                fitted.start(),
                train.len(),
                train.start()
            )));
        }
        let pairs = train
            .values()
            .iter()
            .zip(fitted.values())
            .enumerate()
            .filter(|(_, (_, f))| !f.is_nan())
            .map(|(i, (&a, &f))| (i, a, f));
        self.score(pairs, EvaluationMode::InSample)
    }

    /// Out-of-sample accuracy including MASE.
    ///
    /// The scale is the in-sample MAE of the seasonal naive method on
    /// `train` (the naive method for non-seasonal data).
    pub fn evaluate_scaled(
        &self,
        forecast: &Forecast,
        actual: &TimeSeries,
        train: &TimeSeries,
    ) -> Result<AccuracyReport> {
        if train.frequency() != actual.frequency() || train.next_period() != actual.start() {
            return Err(ForecastError::misaligned(format!(
                "training data ending before {} does not precede actual values from {}",
                train.next_period(),
                actual.start()
            )));
        }
        let scale = seasonal_naive_scale(train)?;
        let mut report = self.evaluate(forecast, actual)?;
        report.mase = Some(report.mae / scale);
        Ok(report)
    }

    fn score(
        &self,
        pairs: impl Iterator<Item = (usize, f64, f64)>,
        mode: EvaluationMode,
    ) -> Result<AccuracyReport> {
        let mut n = 0usize;
        let (mut sum_e, mut sum_abs, mut sum_sq) = (0.0, 0.0, 0.0);
        let (mut sum_pe, mut sum_ape) = (0.0, 0.0);
        let mut percentages_defined = true;

        for (index, actual, predicted) in pairs {
            let e = actual - predicted;
            n += 1;
            sum_e += e;
            sum_abs += e.abs();
            sum_sq += e * e;

            if actual == 0.0 {
                match self.zero_actuals {
                    ZeroActualPolicy::Error => return Err(ForecastError::DivisionByZero { index }),
                    ZeroActualPolicy::Nan => percentages_defined = false,
                }
            } else {
                sum_pe += e / actual;
                sum_ape += (e / actual).abs();
            }
        }

        if n == 0 {
            return Err(ForecastError::EmptyData);
        }
        let count = n as f64;
        let (mape, mpe) = if percentages_defined {
            (100.0 * sum_ape / count, 100.0 * sum_pe / count)
        } else {
            (f64::NAN, f64::NAN)
        };

        Ok(AccuracyReport {
            mode,
            n,
            me: sum_e / count,
            mae: sum_abs / count,
            mape,
            rmse: (sum_sq / count).sqrt(),
            mpe,
            mase: None,
        })
    }
}

/// In-sample MAE of the seasonal naive method.
fn seasonal_naive_scale(train: &TimeSeries) -> Result<f64> {
    let m = train.frequency();
    let values = train.values();
    if values.len() <= m {
        return Err(ForecastError::InsufficientData {
            needed: m + 1,
            got: values.len(),
        });
    }
    let scale = values[m..]
        .iter()
        .zip(values)
        .map(|(y, lagged)| (y - lagged).abs())
        .sum::<f64>()
        / (values.len() - m) as f64;
    if !(scale > 0.0) {
        return Err(ForecastError::InvalidParameter(
            "MASE scale is zero: training data repeats exactly at the seasonal lag".to_string(),
        ));
    }
    Ok(scale)
}
