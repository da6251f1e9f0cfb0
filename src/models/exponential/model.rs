//! The exponential smoothing forecaster.

use super::auto_ets;
use super::ets::{fit_ets, EtsFit, EtsParams, EtsSpec};
use super::options::EtsOptions;
use crate::core::{Forecast, TimeSeries};
use crate::error::Result;
use crate::models::traits::{check_train, require_two_cycles, with_normal_intervals};
use crate::models::Forecaster;
use tracing::debug;

/// Exponential smoothing (ETS) forecaster.
///
/// With `auto_select` the component specification is chosen by AICc;
/// otherwise the components in [`EtsOptions`] are fitted as given.
#[derive(Debug, Clone, Default)]
pub struct ExponentialSmoothing {
    options: EtsOptions,
}

/// Summary of a fitted exponential smoothing model.
#[derive(Debug, Clone, PartialEq)]
pub struct EtsSummary {
    pub spec: EtsSpec,
    pub params: EtsParams,
    pub sigma2: f64,
    pub log_likelihood: f64,
    pub aicc: f64,
}

impl ExponentialSmoothing {
    /// Create a forecaster from options.
    pub fn new(options: EtsOptions) -> Self {
        Self { options }
    }

    /// Automatic component selection.
    pub fn auto() -> Self {
        Self::new(EtsOptions::auto())
    }

    /// Get the options.
    pub fn options(&self) -> &EtsOptions {
        &self.options
    }

    /// Fit on `train` and report the selected model and its parameters.
    pub fn summary(&self, train: &TimeSeries) -> Result<EtsSummary> {
        check_train(train, 1)?;
        let fit = self.fit(train)?;
        Ok(EtsSummary {
            spec: fit.spec,
            params: fit.params,
            sigma2: fit.sigma2,
            log_likelihood: fit.log_likelihood,
            aicc: fit.aicc,
        })
    }

    fn fit(&self, train: &TimeSeries) -> Result<EtsFit> {
        self.options.validate()?;
        let period = self
            .options
            .seasonal_period
            .unwrap_or_else(|| train.frequency());
        let fixed_alpha = self.options.fixed_alpha()?;
        let values = train.values();

        // Every candidate scores the same observations
        let burn_in = if period > 1 && values.len() >= 2 * period {
            period
        } else {
            1
        };

        let fit = if self.options.auto_select {
            auto_ets::select(values, period, fixed_alpha, burn_in, &self.options.optimizer)?
        } else {
            let spec = self.options.spec();
            if spec.has_seasonal() {
                require_two_cycles(train, period)?;
            }
            fit_ets(
                spec,
                values,
                period,
                fixed_alpha,
                burn_in,
                &self.options.optimizer,
            )?
        };

        debug!(
            model = %fit.spec,
            alpha = fit.params.alpha,
            beta = fit.params.beta,
            gamma = fit.params.gamma,
            phi = fit.params.phi,
            aicc = fit.aicc,
            "fitted exponential smoothing"
        );
        Ok(fit)
    }
}

impl ExponentialSmoothing {
    fn project(fit: &EtsFit, train: &TimeSeries, horizon: usize, levels: &[f64]) -> Result<Forecast> {
        let point = fit.forecast(horizon);
        let sd = fit.forecast_sd(&point);
        let forecast = Forecast::following(train, fit.spec.to_string(), point);
        with_normal_intervals(forecast, &sd, levels)
    }
}

impl Forecaster for ExponentialSmoothing {
    fn name(&self) -> &str {
        "ETS"
    }

    fn forecast(&self, train: &TimeSeries, horizon: usize) -> Result<Forecast> {
        check_train(train, horizon)?;
        let fit = self.fit(train)?;
        Ok(Forecast::following(
            train,
            fit.spec.to_string(),
            fit.forecast(horizon),
        ))
    }

    fn forecast_with_intervals(
        &self,
        train: &TimeSeries,
        horizon: usize,
        levels: &[f64],
    ) -> Result<Forecast> {
        check_train(train, horizon)?;
        let fit = self.fit(train)?;
        Self::project(&fit, train, horizon, levels)
    }

    fn fitted(&self, train: &TimeSeries) -> Result<TimeSeries> {
        check_train(train, 1)?;
        train.with_values(self.fit(train)?.fitted)
    }

    fn forecast_and_fitted(
        &self,
        train: &TimeSeries,
        horizon: usize,
        levels: &[f64],
    ) -> Result<(Forecast, Result<TimeSeries>)> {
        check_train(train, horizon)?;
        let fit = self.fit(train)?;
        let forecast = Self::project(&fit, train, horizon, levels)?;
        Ok((forecast, train.with_values(fit.fitted)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Period;
    use crate::error::ForecastError;
    use crate::models::exponential::{SeasonalType, TrendType};
    use crate::utils::optimization::OptimizerConfig;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    fn monthly(n: usize) -> TimeSeries {
        let values = (0..n)
            .map(|i| {
                200.0 + 1.2 * i as f64
                    + 25.0 * (2.0 * PI * i as f64 / 12.0).sin()
                    + ((i * 13) % 7) as f64
            })
            .collect();
        TimeSeries::new(Period::new(1991, 1), 12, values).unwrap()
    }

    #[test]
    fn ets_forecast_is_aligned_after_train() {
        let train = monthly(48);
        let model = ExponentialSmoothing::new(
            EtsOptions::default()
                .with_trend(TrendType::Additive)
                .with_seasonal(SeasonalType::Additive),
        );
        let fc = model.forecast(&train, 12).unwrap();

        assert_eq!(fc.horizon(), 12);
        assert_eq!(fc.start(), Period::new(1995, 1));
        assert_eq!(fc.method(), "ETS(A,A,A)");
    }

    #[test]
    fn ets_fixed_alpha_is_respected() {
        let train = monthly(36);
        let summary = ExponentialSmoothing::new(EtsOptions::default().with_smoothing_level(0.2))
            .summary(&train)
            .unwrap();
        assert_relative_eq!(summary.params.alpha, 0.2);
        assert_eq!(summary.spec, EtsSpec::ann());
    }

    #[test]
    fn ets_seasonal_needs_two_cycles() {
        let train = monthly(20);
        let model =
            ExponentialSmoothing::new(EtsOptions::default().with_seasonal(SeasonalType::Additive));
        assert!(matches!(
            model.forecast(&train, 6),
            Err(ForecastError::InsufficientData { needed: 24, got: 20 })
        ));
    }

    #[test]
    fn ets_auto_select_is_deterministic() {
        let train = monthly(60);
        let model = ExponentialSmoothing::auto();

        let a = model.forecast(&train, 12).unwrap();
        let b = model.forecast(&train, 12).unwrap();
        assert_eq!(a, b);
        assert!(a.method().starts_with("ETS("));
    }

    #[test]
    fn ets_auto_select_finds_seasonality() {
        let summary = ExponentialSmoothing::auto().summary(&monthly(60)).unwrap();
        assert!(summary.spec.has_seasonal());
    }

    #[test]
    fn ets_non_convergence_is_not_masked() {
        let train = monthly(48);
        let model = ExponentialSmoothing::new(
            EtsOptions::default()
                .with_trend(TrendType::Damped)
                .with_optimizer(OptimizerConfig::default().with_max_iterations(2)),
        );
        assert!(matches!(
            model.forecast(&train, 3),
            Err(ForecastError::NonConvergence { .. })
        ));
    }

    #[test]
    fn ets_intervals_contain_point_forecast() {
        let train = monthly(48);
        let fc = ExponentialSmoothing::auto()
            .forecast_with_intervals(&train, 6, &[0.8, 0.95])
            .unwrap();
        let iv = fc.interval(0.95).unwrap();
        for i in 0..6 {
            assert!(iv.lower[i] <= fc.point()[i] && fc.point()[i] <= iv.upper[i]);
        }
    }

    #[test]
    fn ets_fitted_is_aligned_with_train() {
        let train = monthly(36);
        let fitted = ExponentialSmoothing::default().fitted(&train).unwrap();
        assert!(fitted.is_aligned_with(&train));
        assert!(fitted.values()[0].is_nan());
        assert!(fitted.values()[1..].iter().all(|v| v.is_finite()));
    }

    #[test]
    fn zero_seasonal_period_is_an_invalid_parameter() {
        let model = ExponentialSmoothing::new(
            EtsOptions::default()
                .with_seasonal(SeasonalType::Additive)
                .with_seasonal_period(0),
        );
        assert!(matches!(
            model.forecast(&monthly(36), 6),
            Err(ForecastError::InvalidParameter(_))
        ));
    }

    #[test]
    fn combined_forecast_matches_separate_calls() {
        let train = monthly(36);
        let model = ExponentialSmoothing::default();
        let (fc, fitted) = model.forecast_and_fitted(&train, 6, &[0.95]).unwrap();
        let separate = model.forecast_with_intervals(&train, 6, &[0.95]).unwrap();
        assert_eq!(fc.point(), separate.point());
        let fitted = fitted.unwrap();
        let expected = model.fitted(&train).unwrap();
        assert!(fitted.is_aligned_with(&expected));
        assert!(fitted.values()[1..]
            .iter()
            .zip(&expected.values()[1..])
            .all(|(a, b)| (a - b).abs() < 1e-12));
    }
}
