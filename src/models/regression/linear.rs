//! Trend and seasonality regression by ordinary least squares.

use super::design::{design_rows, require_seasonal_history, validate_predictors, Predictor};
use crate::core::{Forecast, TimeSeries};
use crate::error::Result;
use crate::models::traits::{check_train, with_normal_intervals};
use crate::models::Forecaster;
use crate::utils::ols::{ols_fit, OlsFit};
use tracing::debug;

/// Least-squares fit of `train` on an intercept plus `predictors`.
pub(crate) fn fit_regression(predictors: &[Predictor], train: &TimeSeries) -> Result<OlsFit> {
    validate_predictors(predictors, train.frequency())?;
    require_seasonal_history(predictors, train)?;
    let rows = design_rows(predictors, train, 0, train.len())?;
    ols_fit(&rows, train.values())
}

/// Linear regression on typed predictors.
///
/// Forecasts extend the predictors into the forecast periods; intervals
/// use the residual variance and the leverage of each future row.
///
/// # Example
/// ```
/// use forecast_harness::core::{Period, TimeSeries};
/// use forecast_harness::models::regression::LinearRegression;
/// use forecast_harness::models::Forecaster;
///
/// let values: Vec<f64> = (0..16).map(|i| 3.0 * i as f64 + [0.0, 5.0, 2.0, 8.0][i % 4]).collect();
/// let train = TimeSeries::new(Period::new(2001, 1), 4, values).unwrap();
///
/// let fc = LinearRegression::trend_season().forecast(&train, 4).unwrap();
/// assert!((fc.point()[0] - 48.0).abs() < 1e-6);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct LinearRegression {
    predictors: Vec<Predictor>,
}

impl LinearRegression {
    /// Regression on an intercept plus `predictors`.
    pub fn new(predictors: Vec<Predictor>) -> Self {
        Self { predictors }
    }

    /// Linear trend plus seasonal dummies.
    pub fn trend_season() -> Self {
        Self::new(vec![Predictor::Trend, Predictor::SeasonalDummies])
    }

    /// Get the predictors.
    pub fn predictors(&self) -> &[Predictor] {
        &self.predictors
    }

    /// Estimated coefficients, intercept first.
    pub fn coefficients(&self, train: &TimeSeries) -> Result<Vec<f64>> {
        check_train(train, 1)?;
        Ok(self.fit(train)?.coefficients)
    }

    fn fit(&self, train: &TimeSeries) -> Result<OlsFit> {
        let fit = fit_regression(&self.predictors, train)?;
        debug!(
            coefficients = ?fit.coefficients,
            residual_variance = fit.residual_variance,
            "fitted linear regression"
        );
        Ok(fit)
    }

    fn predict(&self, fit: &OlsFit, train: &TimeSeries, horizon: usize) -> Result<(Vec<f64>, Vec<f64>)> {
        let rows = design_rows(&self.predictors, train, train.len(), train.len() + horizon)?;
        Ok(rows
            .iter()
            .map(|row| (fit.predict_row(row), fit.prediction_variance(row).sqrt()))
            .unzip())
    }
}

impl Default for LinearRegression {
    fn default() -> Self {
        Self::new(vec![Predictor::Trend])
    }
}

impl Forecaster for LinearRegression {
    fn name(&self) -> &str {
        "LinearRegression"
    }

    fn forecast(&self, train: &TimeSeries, horizon: usize) -> Result<Forecast> {
        check_train(train, horizon)?;
        let fit = self.fit(train)?;
        let (point, _) = self.predict(&fit, train, horizon)?;
        Ok(Forecast::following(train, self.name(), point))
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
        with_normal_intervals(Forecast::following(train, self.name(), point), &sd, levels)
    }

    fn fitted(&self, train: &TimeSeries) -> Result<TimeSeries> {
        check_train(train, 1)?;
        let fit = self.fit(train)?;
        let rows = design_rows(&self.predictors, train, 0, train.len())?;
        train.with_values(rows.iter().map(|row| fit.predict_row(row)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Period;
    use crate::error::ForecastError;
    use crate::models::regression::ExogenousRegressor;
    use approx::assert_relative_eq;

    fn quarterly(values: Vec<f64>) -> TimeSeries {
        TimeSeries::new(Period::new(2001, 1), 4, values).unwrap()
    }

    #[test]
    fn recovers_exact_trend_and_season() {
        let pattern = [0.0, 5.0, 2.0, 8.0];
        let train = quarterly((0..16).map(|i| 10.0 + 3.0 * i as f64 + pattern[i % 4]).collect());
        let model = LinearRegression::trend_season();

        let coef = model.coefficients(&train).unwrap();
        // Intercept absorbs t = 1 being the first index
        assert_relative_eq!(coef[0], 7.0, epsilon = 1e-5);
        assert_relative_eq!(coef[1], 3.0, epsilon = 1e-6);
        assert_relative_eq!(coef[2], 5.0, epsilon = 1e-5);

        let fc = model.forecast(&train, 4).unwrap();
        for (h, p) in fc.point().iter().enumerate() {
            assert_relative_eq!(*p, 10.0 + 3.0 * (16 + h) as f64 + pattern[h], epsilon = 1e-5);
        }
    }

    #[test]
    fn intervals_widen_away_from_the_data() {
        let train = quarterly(
            (0..20)
                .map(|i| 2.0 * i as f64 + if i % 3 == 0 { 1.5 } else { -0.7 })
                .collect(),
        );
        let fc = LinearRegression::default()
            .forecast_with_intervals(&train, 8, &[0.9])
            .unwrap();
        let iv = fc.interval(0.9).unwrap();
        assert!(iv.upper[7] - iv.lower[7] > iv.upper[0] - iv.lower[0]);
    }

    #[test]
    fn fitted_matches_training_periods() {
        let train = quarterly((0..12).map(|i| (i * i) as f64).collect());
        let model = LinearRegression::new(vec![Predictor::Trend, Predictor::Quadratic]);
        let fitted = model.fitted(&train).unwrap();
        assert!(fitted.is_aligned_with(&train));
        for (f, y) in fitted.values().iter().zip(train.values()) {
            assert_relative_eq!(f, y, epsilon = 1e-4);
        }
    }

    #[test]
    fn exogenous_regressor_must_cover_the_horizon() {
        let train = quarterly((0..12).map(|i| 2.0 * i as f64).collect());
        let x = quarterly((0..14).map(|i| i as f64).collect());
        let model = LinearRegression::new(vec![Predictor::Exogenous(ExogenousRegressor::new("x", x))]);

        assert_eq!(model.forecast(&train, 2).unwrap().horizon(), 2);
        assert!(matches!(
            model.forecast(&train, 3),
            Err(ForecastError::MisalignedSeries(_))
        ));
    }

    #[test]
    fn seasonal_dummies_need_two_cycles() {
        let train = quarterly(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0]);
        assert!(matches!(
            LinearRegression::trend_season().forecast(&train, 1),
            Err(ForecastError::InsufficientData { needed: 8, got: 7 })
        ));
    }

    #[test]
    fn too_many_predictors_for_the_data() {
        let train = quarterly(vec![1.0, 4.0, 9.0]);
        let model = LinearRegression::new(vec![Predictor::Trend, Predictor::Quadratic]);
        assert!(matches!(
            model.forecast(&train, 1),
            Err(ForecastError::InsufficientData { .. })
        ));
    }
}
