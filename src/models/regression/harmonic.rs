//! Harmonic (Fourier term) regression with optional ARIMA errors.

use super::design::{design_rows, validate_fourier, ExogenousRegressor, Predictor};
use super::linear::fit_regression;
use crate::core::{Forecast, TimeSeries};
use crate::error::Result;
use crate::models::arima::{fit_arima, ArimaFit, ArimaOrder, ArimaSpec};
use crate::models::traits::{check_train, with_normal_intervals};
use crate::models::Forecaster;
use crate::utils::ols::OlsFit;
use crate::utils::optimization::OptimizerConfig;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Options for [`HarmonicRegression`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HarmonicOptions {
    /// Number of harmonics `K` per seasonal period `s`, `1 <= K <= s/2`.
    pub fourier_terms: BTreeMap<usize, usize>,
    /// Add a linear trend.
    pub trend: bool,
    /// Model the regression errors as ARIMA (dynamic regression).
    pub errors: Option<ArimaOrder>,
    /// External regressors; they carry data and are not serialized.
    #[serde(skip)]
    pub exogenous: Vec<ExogenousRegressor>,
    /// Iteration budget for the error model.
    pub optimizer: OptimizerConfig,
}

impl HarmonicOptions {
    /// Add `harmonics` Fourier pairs for `period`.
    pub fn with_fourier(mut self, period: usize, harmonics: usize) -> Self {
        self.fourier_terms.insert(period, harmonics);
        self
    }

    /// Add a linear trend.
    pub fn with_trend(mut self) -> Self {
        self.trend = true;
        self
    }

    /// Model the errors as ARIMA of `order`.
    pub fn with_arima_errors(mut self, order: ArimaOrder) -> Self {
        self.errors = Some(order);
        self
    }

    /// Add an external regressor.
    pub fn with_exogenous(mut self, regressor: ExogenousRegressor) -> Self {
        self.exogenous.push(regressor);
        self
    }

    /// Set the optimizer configuration.
    pub fn with_optimizer(mut self, optimizer: OptimizerConfig) -> Self {
        self.optimizer = optimizer;
        self
    }

    fn predictors(&self) -> Result<Vec<Predictor>> {
        let mut predictors = Vec::new();
        if self.trend {
            predictors.push(Predictor::Trend);
        }
        for (&period, &harmonics) in &self.fourier_terms {
            validate_fourier(period, harmonics)?;
            predictors.push(Predictor::fourier(period, harmonics));
        }
        predictors.extend(self.exogenous.iter().cloned().map(Predictor::Exogenous));
        Ok(predictors)
    }
}

/// Regression on Fourier terms, optionally with ARIMA errors.
///
/// Without `errors` this is plain least squares. With `errors` the
/// regression residuals are modelled as ARIMA and the forecast adds the
/// error model's forecast to the regression forecast; intervals then come
/// from the error model.
///
/// # Example
/// ```
/// use forecast_harness::core::{Period, TimeSeries};
/// use forecast_harness::error::ForecastError;
/// use forecast_harness::models::regression::{HarmonicOptions, HarmonicRegression};
/// use forecast_harness::models::Forecaster;
///
/// let train = TimeSeries::new(Period::new(1, 1), 7, vec![1.0; 28]).unwrap();
/// let model = HarmonicRegression::new(HarmonicOptions::default().with_fourier(7, 4));
/// assert!(matches!(
///     model.forecast(&train, 7),
///     Err(ForecastError::InvalidParameter(_))
/// ));
/// ```
#[derive(Debug, Clone, Default)]
pub struct HarmonicRegression {
    options: HarmonicOptions,
}

struct HarmonicFit {
    predictors: Vec<Predictor>,
    regression: OlsFit,
    errors: Option<ArimaFit>,
}

impl HarmonicRegression {
    /// Create a forecaster from options.
    pub fn new(options: HarmonicOptions) -> Self {
        Self { options }
    }

    /// Get the options.
    pub fn options(&self) -> &HarmonicOptions {
        &self.options
    }

    fn method(&self, fit: &HarmonicFit) -> String {
        match &fit.errors {
            Some(errors) => format!("Harmonic regression with {} errors", errors.spec.name()),
            None => "Harmonic regression".to_string(),
        }
    }

    fn fit(&self, train: &TimeSeries) -> Result<HarmonicFit> {
        let predictors = self.options.predictors()?;
        let regression = fit_regression(&predictors, train)?;

        let errors = match self.options.errors {
            Some(order) => {
                let rows = design_rows(&predictors, train, 0, train.len())?;
                let residuals: Vec<f64> = rows
                    .iter()
                    .zip(train.values())
                    .map(|(row, y)| y - regression.predict_row(row))
                    .collect();
                let spec = ArimaSpec::new(order, None, false);
                Some(fit_arima(spec, &residuals, 0, &self.options.optimizer)?)
            }
            None => None,
        };

        debug!(
            coefficients = ?regression.coefficients,
            errors = ?errors.as_ref().map(|e| e.spec.name()),
            "fitted harmonic regression"
        );
        Ok(HarmonicFit {
            predictors,
            regression,
            errors,
        })
    }

    fn predict(&self, fit: &HarmonicFit, train: &TimeSeries, horizon: usize) -> Result<(Vec<f64>, Vec<f64>)> {
        let rows = design_rows(&fit.predictors, train, train.len(), train.len() + horizon)?;
        let regression: Vec<f64> = rows.iter().map(|r| fit.regression.predict_row(r)).collect();

        Ok(match &fit.errors {
            Some(errors) => {
                let point = regression
                    .iter()
                    .zip(errors.forecast(horizon))
                    .map(|(r, e)| r + e)
                    .collect();
                (point, errors.forecast_sd(horizon))
            }
            None => {
                let sd = rows
                    .iter()
                    .map(|r| fit.regression.prediction_variance(r).sqrt())
                    .collect();
                (regression, sd)
            }
        })
    }
}

impl Forecaster for HarmonicRegression {
    fn name(&self) -> &str {
        "HarmonicRegression"
    }

    fn forecast(&self, train: &TimeSeries, horizon: usize) -> Result<Forecast> {
        check_train(train, horizon)?;
        let fit = self.fit(train)?;
        let (point, _) = self.predict(&fit, train, horizon)?;
        Ok(Forecast::following(train, self.method(&fit), point))
    }

    fn forecast_with_intervals(
        &self,
        train: &TimeSeries,
        horizon: usize,
        levels: &[f64],
    ) -> Result<Forecast> {
        check_train(train, horizon)?;
        let fit = self.fit(train)?;
        let (point, sd) = self.predict(&fit, train, horizon)?;
        let forecast = Forecast::following(train, self.method(&fit), point);
        with_normal_intervals(forecast, &sd, levels)
    }

    fn fitted(&self, train: &TimeSeries) -> Result<TimeSeries> {
        check_train(train, 1)?;
        let fit = self.fit(train)?;
        let rows = design_rows(&fit.predictors, train, 0, train.len())?;
        let values = rows
            .iter()
            .enumerate()
            .map(|(t, row)| {
                let regression = fit.regression.predict_row(row);
                match &fit.errors {
                    // Fitted error plus regression; NaN where the error model has none
                    Some(errors) => regression + errors.fitted[t],
                    None => regression,
                }
            })
            .collect();
        train.with_values(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Period;
    use crate::error::ForecastError;
    use crate::utils::testing::shocks;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    fn daily(n: usize) -> TimeSeries {
        let values = (0..n)
            .map(|i| {
                let t = (i + 1) as f64;
                40.0 + 6.0 * (2.0 * PI * t / 7.0).sin() - 2.0 * (4.0 * PI * t / 7.0).cos()
            })
            .collect();
        TimeSeries::new(Period::new(1, 1), 7, values).unwrap()
    }

    #[test]
    fn fourier_bound_rejects_too_many_harmonics() {
        let model = HarmonicRegression::new(HarmonicOptions::default().with_fourier(7, 4));
        assert!(matches!(
            model.forecast(&daily(28), 7),
            Err(ForecastError::InvalidParameter(_))
        ));
        let zero = HarmonicRegression::new(HarmonicOptions::default().with_fourier(12, 0));
        assert!(zero.forecast(&daily(28), 7).is_err());
    }

    #[test]
    fn exact_harmonics_are_reproduced() {
        let series = daily(49);
        let train = series.head(42).unwrap();
        let model = HarmonicRegression::new(HarmonicOptions::default().with_fourier(7, 2));

        let fc = model.forecast(&train, 7).unwrap();
        assert_eq!(fc.method(), "Harmonic regression");
        for (p, a) in fc.point().iter().zip(&series.values()[42..]) {
            assert_relative_eq!(p, a, epsilon = 1e-6);
        }
    }

    #[test]
    fn arima_errors_are_named_and_aligned() {
        let base = daily(84);
        let noise = shocks(84, 21);
        let train = base
            .with_values(base.values().iter().zip(&noise).map(|(v, e)| v + e).collect())
            .unwrap();
        let model = HarmonicRegression::new(
            HarmonicOptions::default()
                .with_fourier(7, 3)
                .with_trend()
                .with_arima_errors(ArimaOrder::new(1, 0, 0)),
        );

        let fc = model.forecast_with_intervals(&train, 14, &[0.95]).unwrap();
        assert_eq!(fc.method(), "Harmonic regression with ARIMA(1,0,0) errors");
        assert_eq!(fc.start(), train.next_period());
        assert!(fc.interval(0.95).is_some());

        let fitted = model.fitted(&train).unwrap();
        assert!(fitted.values()[0].is_nan());
        assert!(fitted.values()[1..].iter().all(|v| v.is_finite()));
    }

    #[test]
    fn options_round_trip_through_json() {
        let options = HarmonicOptions::default()
            .with_fourier(7, 3)
            .with_fourier(365, 10)
            .with_arima_errors(ArimaOrder::new(2, 0, 1));
        let json = serde_json::to_string(&options).unwrap();
        let back: HarmonicOptions = serde_json::from_str(&json).unwrap();
        assert_eq!(back, options);
    }
}
