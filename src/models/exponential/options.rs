//! Configuration of the exponential smoothing family.

use super::ets::{ErrorType, EtsSpec, SeasonalType, TrendType};
use crate::error::{ForecastError, Result};
use crate::utils::optimization::OptimizerConfig;
use serde::{Deserialize, Serialize};

/// How the level smoothing parameter is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum SmoothingLevel {
    /// Estimated by maximum likelihood.
    #[default]
    Auto,
    /// Fixed value in (0, 1).
    Fixed(f64),
}

/// Options for [`ExponentialSmoothing`](super::ExponentialSmoothing).
///
/// # Example
/// ```
/// use forecast_harness::models::exponential::{EtsOptions, SeasonalType, TrendType};
///
/// let options = EtsOptions::default()
///     .with_trend(TrendType::Damped)
///     .with_seasonal(SeasonalType::Multiplicative);
/// assert_eq!(options.spec().to_string(), "ETS(A,Ad,M)");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EtsOptions {
    /// Level smoothing parameter.
    pub smoothing_level: SmoothingLevel,
    /// Trend component.
    pub trend: TrendType,
    /// Seasonal component.
    pub seasonal: SeasonalType,
    /// Error component.
    pub error: ErrorType,
    /// Search all component combinations and keep the lowest AICc.
    pub auto_select: bool,
    /// Seasonal period; defaults to the series frequency.
    pub seasonal_period: Option<usize>,
    /// Iteration budget for parameter estimation.
    pub optimizer: OptimizerConfig,
}

impl Default for EtsOptions {
    fn default() -> Self {
        Self {
            smoothing_level: SmoothingLevel::Auto,
            trend: TrendType::None,
            seasonal: SeasonalType::None,
            error: ErrorType::Additive,
            auto_select: false,
            seasonal_period: None,
            optimizer: OptimizerConfig::default(),
        }
    }
}

impl EtsOptions {
    /// Automatic model selection over all components.
    pub fn auto() -> Self {
        Self {
            auto_select: true,
            ..Default::default()
        }
    }

    /// Fix the level smoothing parameter.
    pub fn with_smoothing_level(mut self, alpha: f64) -> Self {
        self.smoothing_level = SmoothingLevel::Fixed(alpha);
        self
    }

    /// Set the trend component.
    pub fn with_trend(mut self, trend: TrendType) -> Self {
        self.trend = trend;
        self
    }

    /// Set the seasonal component.
    pub fn with_seasonal(mut self, seasonal: SeasonalType) -> Self {
        self.seasonal = seasonal;
        self
    }

    /// Set the error component.
    pub fn with_error(mut self, error: ErrorType) -> Self {
        self.error = error;
        self
    }

    /// Override the seasonal period.
    pub fn with_seasonal_period(mut self, period: usize) -> Self {
        self.seasonal_period = Some(period);
        self
    }

    /// Set the optimizer configuration.
    pub fn with_optimizer(mut self, optimizer: OptimizerConfig) -> Self {
        self.optimizer = optimizer;
        self
    }

    /// The component specification these options describe.
    pub fn spec(&self) -> EtsSpec {
        EtsSpec::new(self.error, self.trend, self.seasonal)
    }

    /// Reject a zero seasonal period.
    pub(crate) fn validate(&self) -> Result<()> {
        if self.seasonal_period == Some(0) {
            return Err(ForecastError::InvalidParameter(
                "seasonal period must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Fixed level smoothing parameter, if any.
    pub(crate) fn fixed_alpha(&self) -> Result<Option<f64>> {
        match self.smoothing_level {
            SmoothingLevel::Auto => Ok(None),
            SmoothingLevel::Fixed(alpha) if alpha > 0.0 && alpha < 1.0 => Ok(Some(alpha)),
            SmoothingLevel::Fixed(alpha) => Err(ForecastError::InvalidParameter(format!(
                "smoothing level must be in (0, 1), got {alpha}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_options_describe_simple_exponential_smoothing() {
        let options = EtsOptions::default();
        assert_eq!(options.spec(), EtsSpec::ann());
        assert!(!options.auto_select);
        assert_eq!(options.fixed_alpha().unwrap(), None);
    }

    #[test]
    fn fixed_smoothing_level_is_validated() {
        assert_eq!(
            EtsOptions::default()
                .with_smoothing_level(0.2)
                .fixed_alpha()
                .unwrap(),
            Some(0.2)
        );
        assert!(matches!(
            EtsOptions::default().with_smoothing_level(1.0).fixed_alpha(),
            Err(ForecastError::InvalidParameter(_))
        ));
    }

    #[test]
    fn zero_seasonal_period_is_rejected() {
        let options = EtsOptions::default()
            .with_seasonal(SeasonalType::Additive)
            .with_seasonal_period(0);
        assert!(matches!(
            options.validate(),
            Err(ForecastError::InvalidParameter(_))
        ));
        assert!(EtsOptions::default().with_seasonal_period(12).validate().is_ok());
    }

    #[test]
    fn options_round_trip_through_json() {
        let options = EtsOptions::default()
            .with_trend(TrendType::Additive)
            .with_smoothing_level(0.4);
        let json = serde_json::to_string(&options).unwrap();
        let back: EtsOptions = serde_json::from_str(&json).unwrap();
        assert_eq!(back, options);

        let partial: EtsOptions = serde_json::from_str(r#"{"auto_select":true}"#).unwrap();
        assert!(partial.auto_select);
        assert_eq!(partial.trend, TrendType::None);
    }
}
