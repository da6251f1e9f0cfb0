//! Logistic regression for binary (0/1) series.
//!
//! Coefficients are estimated by iteratively reweighted least squares
//! (IRLS). Predictors are the typed [`Predictor`]s plus lagged outcomes,
//! so probabilities are produced one step ahead: each validation period
//! uses the outcomes observed before it.

use super::design::{design_rows, require_seasonal_history, validate_predictors, Predictor};
use crate::core::TimeSeries;
use crate::error::{ForecastError, Result};
use crate::utils::ols::weighted_least_squares;
use tracing::debug;

const PROBABILITY_FLOOR: f64 = 1e-10;

/// Fitted logistic regression coefficients.
#[derive(Debug, Clone, PartialEq)]
pub struct LogisticFit {
    /// Intercept, predictor columns, then one coefficient per lag.
    pub coefficients: Vec<f64>,
    /// IRLS iterations used.
    pub iterations: usize,
    /// Residual deviance at the solution.
    pub deviance: f64,
}

impl LogisticFit {
    fn probability(&self, row: &[f64]) -> f64 {
        sigmoid(row.iter().zip(&self.coefficients).map(|(x, b)| x * b).sum())
    }
}

/// Logistic regression on typed predictors and lagged outcomes.
///
/// # Example
/// ```
/// use forecast_harness::core::{Period, TimeSeries};
/// use forecast_harness::models::regression::{LogisticRegression, Predictor};
///
/// let outcomes: Vec<f64> = (0..120).map(|i| if (i * 7) % 10 < 4 { 1.0 } else { 0.0 }).collect();
/// let series = TimeSeries::new(Period::new(1, 1), 1, outcomes).unwrap();
/// let (train, valid) = (series.head(100).unwrap(), series.tail(20).unwrap());
///
/// let model = LogisticRegression::new(vec![Predictor::Trend]).with_lags(vec![1]);
/// let probabilities = model.one_step_probabilities(&train, &valid).unwrap();
/// assert!(probabilities.values().iter().all(|p| *p > 0.0 && *p < 1.0));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct LogisticRegression {
    predictors: Vec<Predictor>,
    lags: Vec<usize>,
    max_iterations: usize,
    tolerance: f64,
}

impl Default for LogisticRegression {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl LogisticRegression {
    /// Regression on an intercept plus `predictors`.
    pub fn new(predictors: Vec<Predictor>) -> Self {
        Self {
            predictors,
            lags: Vec::new(),
            max_iterations: 25,
            tolerance: 1e-8,
        }
    }

    /// Add lagged outcomes as predictors.
    pub fn with_lags(mut self, lags: Vec<usize>) -> Self {
        self.lags = lags;
        self
    }

    /// Set the IRLS iteration budget.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Set the relative deviance change at which IRLS stops.
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    fn max_lag(&self) -> usize {
        self.lags.iter().copied().max().unwrap_or(0)
    }

    fn validate(&self, series: &TimeSeries) -> Result<()> {
        if series.is_empty() {
            return Err(ForecastError::EmptyData);
        }
        if self.lags.contains(&0) {
            return Err(ForecastError::InvalidParameter(
                "outcome lags must be at least 1".to_string(),
            ));
        }
        if self.max_iterations == 0 || !(self.tolerance > 0.0) {
            return Err(ForecastError::InvalidParameter(
                "IRLS needs a positive iteration budget and tolerance".to_string(),
            ));
        }
        check_binary(series)?;
        validate_predictors(&self.predictors, series.frequency())
    }

    /// Design rows for observations `from..to` of `history`, lags included.
    fn rows(&self, history: &TimeSeries, from: usize, to: usize) -> Result<Vec<Vec<f64>>> {
        let mut rows = design_rows(&self.predictors, history, from, to)?;
        let outcomes = history.values();
        for (t, row) in (from..to).zip(rows.iter_mut()) {
            row.extend(self.lags.iter().map(|&lag| outcomes[t - lag]));
        }
        Ok(rows)
    }

    /// Fit on `train`.
    pub fn fit(&self, train: &TimeSeries) -> Result<LogisticFit> {
        self.validate(train)?;
        require_seasonal_history(&self.predictors, train)?;
        let start = self.max_lag();
        if train.len() <= start {
            return Err(ForecastError::InsufficientData {
                needed: start + 1,
                got: train.len(),
            });
        }
        let rows = self.rows(train, start, train.len())?;
        let fit = irls(&rows, &train.values()[start..], self.max_iterations, self.tolerance)?;
        debug!(
            coefficients = ?fit.coefficients,
            iterations = fit.iterations,
            deviance = fit.deviance,
            "fitted logistic regression"
        );
        Ok(fit)
    }

    /// In-sample probabilities aligned with `train`; NaN before the
    /// largest lag.
    pub fn fitted_probabilities(&self, train: &TimeSeries) -> Result<TimeSeries> {
        let fit = self.fit(train)?;
        let start = self.max_lag();
        let rows = self.rows(train, start, train.len())?;
        let mut values = vec![f64::NAN; start];
        values.extend(rows.iter().map(|row| fit.probability(row)));
        train.with_values(values)
    }

    /// Fit on `train` and predict each period of `valid` one step ahead.
    ///
    /// `valid` must immediately follow `train`; lagged outcomes inside the
    /// validation window are the observed ones.
    pub fn one_step_probabilities(&self, train: &TimeSeries, valid: &TimeSeries) -> Result<TimeSeries> {
        check_binary(valid)?;
        let fit = self.fit(train)?;
        let history = train.concat(valid)?;
        let rows = self.rows(&history, train.len(), history.len())?;
        valid.with_values(rows.iter().map(|row| fit.probability(row)).collect())
    }
}

fn check_binary(series: &TimeSeries) -> Result<()> {
    match series.values().iter().position(|&v| v != 0.0 && v != 1.0) {
        Some(index) => Err(ForecastError::InvalidParameter(format!(
            "binary outcome expected, got {} at {}",
            series.values()[index],
            series.period_at(index)
        ))),
        None => Ok(()),
    }
}

fn sigmoid(eta: f64) -> f64 {
    1.0 / (1.0 + (-eta).exp())
}

fn deviance(rows: &[Vec<f64>], y: &[f64], beta: &[f64]) -> f64 {
    -2.0 * rows
        .iter()
        .zip(y)
        .map(|(row, &yi)| {
            let eta: f64 = row.iter().zip(beta).map(|(x, b)| x * b).sum();
            let p = sigmoid(eta).clamp(PROBABILITY_FLOOR, 1.0 - PROBABILITY_FLOOR);
            yi * p.ln() + (1.0 - yi) * (1.0 - p).ln()
        })
        .sum::<f64>()
}

/// Iteratively reweighted least squares for the logit link.
fn irls(rows: &[Vec<f64>], y: &[f64], max_iterations: usize, tolerance: f64) -> Result<LogisticFit> {
    let k = rows.first().map_or(0, |r| r.len());
    let mut beta = vec![0.0; k];
    let mut previous = f64::INFINITY;

    for iteration in 1..=max_iterations {
        let mut z = Vec::with_capacity(y.len());
        let mut w = Vec::with_capacity(y.len());
        for (row, &yi) in rows.iter().zip(y) {
            let eta: f64 = row.iter().zip(&beta).map(|(x, b)| x * b).sum();
            let p = sigmoid(eta).clamp(PROBABILITY_FLOOR, 1.0 - PROBABILITY_FLOOR);
            let weight = p * (1.0 - p);
            z.push(eta + (yi - p) / weight);
            w.push(weight);
        }
        beta = weighted_least_squares(rows, &z, &w)?;

        let current = deviance(rows, y, &beta);
        if (current - previous).abs() / (current.abs() + 0.1) < tolerance {
            return Ok(LogisticFit {
                coefficients: beta,
                iterations: iteration,
                deviance: current,
            });
        }
        previous = current;
    }

    Err(ForecastError::non_convergence("logistic regression", max_iterations))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Period;
    use crate::utils::testing::shocks;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    fn weekly_outcomes(n: usize) -> TimeSeries {
        let u = shocks(n, 17);
        let values = (0..n)
            .map(|i| {
                let t = (i + 1) as f64;
                let p = sigmoid(-1.0 + 2.0 * (2.0 * PI * t / 7.0).sin());
                if u[i] + 0.5 < p {
                    1.0
                } else {
                    0.0
                }
            })
            .collect();
        TimeSeries::new(Period::new(1, 1), 7, values).unwrap()
    }

    #[test]
    fn recovers_seasonal_log_odds() {
        let train = weekly_outcomes(700);
        let fit = LogisticRegression::new(vec![Predictor::fourier(7, 1)])
            .fit(&train)
            .unwrap();
        assert_relative_eq!(fit.coefficients[0], -1.0, epsilon = 0.4);
        assert_relative_eq!(fit.coefficients[1], 2.0, epsilon = 0.6);
        assert!(fit.iterations <= 25);
    }

    #[test]
    fn one_step_probabilities_cover_validation_window() {
        let series = weekly_outcomes(140);
        let train = series.head(112).unwrap();
        let valid = series.tail(28).unwrap();
        let model = LogisticRegression::new(vec![Predictor::fourier(7, 1)]).with_lags(vec![1, 7]);

        let probabilities = model.one_step_probabilities(&train, &valid).unwrap();
        assert!(probabilities.is_aligned_with(&valid));
        assert!(probabilities.values().iter().all(|p| *p > 0.0 && *p < 1.0));
    }

    #[test]
    fn fitted_probabilities_skip_lagged_start() {
        let train = weekly_outcomes(70);
        let fitted = LogisticRegression::default()
            .with_lags(vec![2])
            .fitted_probabilities(&train)
            .unwrap();
        assert!(fitted.values()[..2].iter().all(|p| p.is_nan()));
        assert!(fitted.values()[2..].iter().all(|p| p.is_finite()));
    }

    #[test]
    fn rejects_non_binary_outcomes() {
        let train = TimeSeries::new(Period::new(1, 1), 1, vec![0.0, 1.0, 2.0, 1.0]).unwrap();
        assert!(matches!(
            LogisticRegression::default().fit(&train),
            Err(ForecastError::InvalidParameter(_))
        ));
    }

    #[test]
    fn validation_must_follow_training() {
        let series = weekly_outcomes(60);
        let train = series.head(40).unwrap();
        let gap = series.tail(10).unwrap();
        assert!(matches!(
            LogisticRegression::default().one_step_probabilities(&train, &gap),
            Err(ForecastError::NonContiguous { .. })
        ));
    }

    #[test]
    fn fourier_predictors_need_two_cycles() {
        let train = weekly_outcomes(13);
        assert!(matches!(
            LogisticRegression::new(vec![Predictor::fourier(7, 1)]).fit(&train),
            Err(ForecastError::InsufficientData { needed: 14, got: 13 })
        ));
    }

    #[test]
    fn exhausted_budget_is_reported() {
        let train = weekly_outcomes(70);
        assert!(matches!(
            LogisticRegression::default()
                .with_max_iterations(1)
                .fit(&train),
            Err(ForecastError::NonConvergence { iterations: 1, .. })
        ));
    }
}
