//! Configuration of the ARIMA family.

use crate::error::{ForecastError, Result};
use crate::utils::optimization::OptimizerConfig;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Non-seasonal ARIMA order (p, d, q).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArimaOrder {
    /// AR order.
    pub p: usize,
    /// Differencing order.
    pub d: usize,
    /// MA order.
    pub q: usize,
}

impl ArimaOrder {
    /// Create a new order.
    pub fn new(p: usize, d: usize, q: usize) -> Self {
        Self { p, d, q }
    }
}

impl Default for ArimaOrder {
    fn default() -> Self {
        Self::new(1, 1, 1)
    }
}

impl fmt::Display for ArimaOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{},{})", self.p, self.d, self.q)
    }
}

/// Seasonal ARIMA order (P, D, Q) at period `s`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SeasonalOrder {
    /// Seasonal AR order.
    pub p: usize,
    /// Seasonal differencing order.
    pub d: usize,
    /// Seasonal MA order.
    pub q: usize,
    /// Seasonal period.
    pub period: usize,
}

impl SeasonalOrder {
    /// Create a new seasonal order.
    pub fn new(p: usize, d: usize, q: usize, period: usize) -> Self {
        Self { p, d, q, period }
    }

    /// True when the seasonal part adds nothing to the model.
    pub fn is_empty(&self) -> bool {
        self.p == 0 && self.d == 0 && self.q == 0
    }
}

impl fmt::Display for SeasonalOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{},{})[{}]", self.p, self.d, self.q, self.period)
    }
}

/// Upper limits of the automatic order search.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchBounds {
    pub max_p: usize,
    pub max_d: usize,
    pub max_q: usize,
    pub max_seasonal_p: usize,
    pub max_seasonal_d: usize,
    pub max_seasonal_q: usize,
}

impl Default for SearchBounds {
    fn default() -> Self {
        Self {
            max_p: 3,
            max_d: 2,
            max_q: 3,
            max_seasonal_p: 1,
            max_seasonal_d: 1,
            max_seasonal_q: 1,
        }
    }
}

impl SearchBounds {
    /// Set the non-seasonal limits.
    pub fn with_max_orders(mut self, max_p: usize, max_d: usize, max_q: usize) -> Self {
        self.max_p = max_p;
        self.max_d = max_d;
        self.max_q = max_q;
        self
    }

    /// Set the seasonal limits.
    pub fn with_max_seasonal_orders(mut self, max_p: usize, max_d: usize, max_q: usize) -> Self {
        self.max_seasonal_p = max_p;
        self.max_seasonal_d = max_d;
        self.max_seasonal_q = max_q;
        self
    }
}

/// Options for [`ARIMA`](super::ARIMA).
///
/// # Example
/// ```
/// use forecast_harness::models::arima::{ArimaOptions, SeasonalOrder};
///
/// let options = ArimaOptions::new(0, 1, 1).with_seasonal_order(SeasonalOrder::new(0, 1, 1, 12));
/// assert_eq!(options.model_name(), "ARIMA(0,1,1)(0,1,1)[12]");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArimaOptions {
    /// Non-seasonal order, used unless `auto_select` is set.
    pub order: ArimaOrder,
    /// Optional seasonal order, used unless `auto_select` is set.
    pub seasonal_order: Option<SeasonalOrder>,
    /// Search orders within `search` and keep the lowest AICc.
    pub auto_select: bool,
    /// Estimate a mean (d + D = 0) or drift (d + D = 1) term.
    pub include_constant: bool,
    /// Seasonal period searched by `auto_select`; defaults to the series frequency.
    pub seasonal_period: Option<usize>,
    /// Limits of the automatic search.
    pub search: SearchBounds,
    /// Iteration budget for coefficient estimation.
    pub optimizer: OptimizerConfig,
}

impl Default for ArimaOptions {
    fn default() -> Self {
        Self {
            order: ArimaOrder::default(),
            seasonal_order: None,
            auto_select: false,
            include_constant: true,
            seasonal_period: None,
            search: SearchBounds::default(),
            optimizer: OptimizerConfig::default(),
        }
    }
}

impl ArimaOptions {
    /// Fixed non-seasonal order.
    pub fn new(p: usize, d: usize, q: usize) -> Self {
        Self {
            order: ArimaOrder::new(p, d, q),
            ..Default::default()
        }
    }

    /// Automatic order selection.
    pub fn auto() -> Self {
        Self {
            auto_select: true,
            ..Default::default()
        }
    }

    /// Add a seasonal order.
    pub fn with_seasonal_order(mut self, seasonal: SeasonalOrder) -> Self {
        self.seasonal_order = Some(seasonal);
        self
    }

    /// Enable or disable the constant term.
    pub fn with_constant(mut self, include: bool) -> Self {
        self.include_constant = include;
        self
    }

    /// Override the seasonal period used by the automatic search.
    pub fn with_seasonal_period(mut self, period: usize) -> Self {
        self.seasonal_period = Some(period);
        self
    }

    /// Set the search limits.
    pub fn with_search(mut self, search: SearchBounds) -> Self {
        self.search = search;
        self
    }

    /// Set the optimizer configuration.
    pub fn with_optimizer(mut self, optimizer: OptimizerConfig) -> Self {
        self.optimizer = optimizer;
        self
    }

    /// Name of the fixed model these options describe.
    pub fn model_name(&self) -> String {
        model_name(self.order, self.seasonal_order)
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if let Some(seasonal) = self.seasonal_order {
            if seasonal.period < 2 && !seasonal.is_empty() {
                return Err(ForecastError::InvalidParameter(format!(
                    "seasonal period must be at least 2, got {}",
                    seasonal.period
                )));
            }
        }
        if self.seasonal_period == Some(0) {
            return Err(ForecastError::InvalidParameter(
                "seasonal period must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// `ARIMA(p,d,q)` or `ARIMA(p,d,q)(P,D,Q)[s]`.
pub(crate) fn model_name(order: ArimaOrder, seasonal: Option<SeasonalOrder>) -> String {
    match seasonal {
        Some(s) if !s.is_empty() => format!("ARIMA{order}{s}"),
        _ => format!("ARIMA{order}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_names() {
        assert_eq!(ArimaOptions::default().model_name(), "ARIMA(1,1,1)");
        assert_eq!(
            ArimaOptions::new(2, 0, 0)
                .with_seasonal_order(SeasonalOrder::new(1, 0, 0, 4))
                .model_name(),
            "ARIMA(2,0,0)(1,0,0)[4]"
        );
        assert_eq!(
            ArimaOptions::new(2, 0, 0)
                .with_seasonal_order(SeasonalOrder::new(0, 0, 0, 4))
                .model_name(),
            "ARIMA(2,0,0)"
        );
    }

    #[test]
    fn seasonal_period_is_validated() {
        let options = ArimaOptions::new(0, 0, 0).with_seasonal_order(SeasonalOrder::new(1, 0, 0, 1));
        assert!(matches!(
            options.validate(),
            Err(ForecastError::InvalidParameter(_))
        ));
        assert!(ArimaOptions::auto().validate().is_ok());
    }

    #[test]
    fn options_round_trip_through_json() {
        let options = ArimaOptions::new(0, 1, 1)
            .with_seasonal_order(SeasonalOrder::new(0, 1, 1, 12))
            .with_constant(false);
        let json = serde_json::to_string(&options).unwrap();
        let back: ArimaOptions = serde_json::from_str(&json).unwrap();
        assert_eq!(back, options);

        let partial: ArimaOptions =
            serde_json::from_str(r#"{"auto_select":true,"search":{"max_p":1}}"#).unwrap();
        assert!(partial.auto_select);
        assert_eq!(partial.search.max_p, 1);
        assert_eq!(partial.search.max_q, 3);
        assert!(partial.include_constant);
    }
}
