//! Automatic ARIMA and SARIMA order selection.
//!
//! Differencing orders are chosen first by variance reduction; the AR and
//! MA orders are then searched exhaustively in a fixed order and the lowest
//! AICc wins, keeping the earlier candidate on ties.

use super::diff::{seasonal_difference, suggest_differencing, suggest_seasonal_differencing};
use super::model::{fit_arima, ArimaFit, ArimaSpec};
use super::options::{ArimaOptions, ArimaOrder, SearchBounds, SeasonalOrder};
use crate::error::{ForecastError, Result};
use tracing::{debug, warn};

/// Chosen differencing orders `(d, D)`.
pub(crate) fn differencing_orders(
    values: &[f64],
    period: usize,
    seasonal: bool,
    bounds: &SearchBounds,
) -> (usize, usize) {
    let seasonal_d = if seasonal {
        suggest_seasonal_differencing(values, period, bounds.max_seasonal_d)
    } else {
        0
    };
    let base = if seasonal_d > 0 {
        seasonal_difference(values, seasonal_d, period)
    } else {
        values.to_vec()
    };
    (suggest_differencing(&base, bounds.max_d), seasonal_d)
}

/// Candidate models for fixed differencing orders.
pub(crate) fn candidates(
    d: usize,
    seasonal_d: usize,
    period: usize,
    seasonal: bool,
    bounds: &SearchBounds,
    include_constant: bool,
) -> Vec<ArimaSpec> {
    let (max_sp, max_sq) = if seasonal {
        (bounds.max_seasonal_p, bounds.max_seasonal_q)
    } else {
        (0, 0)
    };

    let mut specs = Vec::new();
    for sp in 0..=max_sp {
        for sq in 0..=max_sq {
            for p in 0..=bounds.max_p {
                for q in 0..=bounds.max_q {
                    let seasonal_order =
                        seasonal.then(|| SeasonalOrder::new(sp, seasonal_d, sq, period));
                    specs.push(ArimaSpec::new(
                        ArimaOrder::new(p, d, q),
                        seasonal_order,
                        include_constant,
                    ));
                }
            }
        }
    }
    specs
}

/// Search orders on `values` and return the AICc-minimising fit.
///
/// Candidates that fail to converge are skipped; if none can be fitted
/// the last error is returned.
pub(crate) fn select(values: &[f64], period: usize, options: &ArimaOptions) -> Result<ArimaFit> {
    let bounds = &options.search;
    let seasonal = period > 1 && values.len() >= 2 * period;
    let (d, seasonal_d) = differencing_orders(values, period, seasonal, bounds);

    let lost = d + if seasonal { seasonal_d * period } else { 0 };
    let usable = values.len().saturating_sub(lost);
    let max_seasonal_lag = if seasonal {
        bounds.max_seasonal_p * period
    } else {
        0
    };
    // Shared scoring sample for every candidate
    let burn_in = (bounds.max_p + max_seasonal_lag).min(usable / 2);

    debug!(d, seasonal_d, period, burn_in, "ARIMA differencing orders");

    let mut best: Option<ArimaFit> = None;
    let mut last_error = ForecastError::InsufficientData {
        needed: lost + 3,
        got: values.len(),
    };

    for spec in candidates(d, seasonal_d, period, seasonal, bounds, options.include_constant) {
        match fit_arima(spec, values, burn_in, &options.optimizer) {
            Ok(fit) => {
                debug!(model = %spec.name(), aicc = fit.aicc, "ARIMA candidate");
                let better = best.as_ref().map_or(true, |b| fit.aicc < b.aicc);
                if better {
                    best = Some(fit);
                }
            }
            Err(err @ ForecastError::NonConvergence { .. }) => {
                warn!(model = %spec.name(), error = %err, "skipping ARIMA candidate");
                last_error = err;
            }
            Err(err) => {
                debug!(model = %spec.name(), error = %err, "ARIMA candidate not admissible");
                last_error = err;
            }
        }
    }

    best.ok_or(last_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Period, TimeSeries};
    use crate::utils::testing::shocks;
    use crate::models::arima::ARIMA;
    use crate::models::Forecaster;
    use crate::utils::optimization::OptimizerConfig;

    fn small_search() -> ArimaOptions {
        ArimaOptions::auto().with_search(
            SearchBounds::default()
                .with_max_orders(2, 2, 2)
                .with_max_seasonal_orders(1, 1, 1),
        )
    }

    #[test]
    fn candidate_grid_size() {
        let bounds = SearchBounds::default().with_max_orders(2, 1, 1);
        assert_eq!(candidates(1, 0, 1, false, &bounds, true).len(), 6);
        // Seasonal adds a 2 x 2 grid of (P, Q)
        assert_eq!(candidates(1, 1, 12, true, &bounds, true).len(), 24);
        assert!(candidates(1, 1, 12, true, &bounds, true)
            .iter()
            .all(|s| !s.constant));
    }

    #[test]
    fn trending_series_is_differenced() {
        let e = shocks(60, 3);
        let values: Vec<f64> = (0..60).map(|i| 5.0 + 1.5 * i as f64 + e[i]).collect();
        let (d, seasonal_d) = differencing_orders(&values, 1, false, &SearchBounds::default());
        assert!(d >= 1);
        assert_eq!(seasonal_d, 0);
    }

    #[test]
    fn seasonal_series_is_seasonally_differenced() {
        let pattern = [0.0, 10.0, 25.0, 5.0];
        let e = shocks(48, 5);
        let values: Vec<f64> = (0..48).map(|i| 50.0 + pattern[i % 4] + e[i]).collect();
        let (_, seasonal_d) = differencing_orders(&values, 4, true, &SearchBounds::default());
        assert_eq!(seasonal_d, 1);
    }

    #[test]
    fn auto_select_is_deterministic() {
        let e = shocks(80, 9);
        let values: Vec<f64> = (0..80).map(|i| 20.0 + 0.3 * i as f64 + e[i]).collect();
        let train = TimeSeries::new(Period::new(1950, 1), 1, values).unwrap();
        let model = ARIMA::new(small_search());

        let a = model.forecast(&train, 6).unwrap();
        let b = model.forecast(&train, 6).unwrap();
        assert_eq!(a, b);
        assert!(a.method().starts_with("ARIMA("));
    }

    #[test]
    fn auto_select_handles_quarterly_seasonality() {
        let pattern = [0.0, 10.0, 25.0, 5.0];
        let e = shocks(48, 13);
        let values: Vec<f64> = (0..48)
            .map(|i| 50.0 + 0.5 * i as f64 + pattern[i % 4] + e[i])
            .collect();
        let train = TimeSeries::new(Period::new(2000, 1), 4, values).unwrap();

        let summary = ARIMA::new(small_search()).summary(&train).unwrap();
        let seasonal = summary.seasonal_order.unwrap();
        assert_eq!(seasonal.period, 4);
        assert_eq!(seasonal.d, 1);
    }

    #[test]
    fn auto_select_reports_failure_when_nothing_fits() {
        let e = shocks(40, 1);
        let values: Vec<f64> = (0..40).map(|i| 10.0 + e[i]).collect();
        let options = small_search().with_optimizer(OptimizerConfig::default().with_max_iterations(1));
        assert!(matches!(
            select(&values, 1, &options),
            Err(ForecastError::NonConvergence { .. })
        ));
    }
}
