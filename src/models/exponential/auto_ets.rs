//! Automatic ETS model selection.
//!
//! Fits every admissible component combination and keeps the one with
//! the lowest AICc. Candidates are visited in a fixed order and ties keep
//! the earlier candidate, so the selection is deterministic.

use super::ets::{fit_ets, ErrorType, EtsFit, EtsSpec, SeasonalType, TrendType};
use crate::error::{ForecastError, Result};
use crate::utils::optimization::OptimizerConfig;
use tracing::{debug, warn};

/// Generate candidate model specifications.
pub(crate) fn candidates(seasonal: bool, positive: bool) -> Vec<EtsSpec> {
    let error_types: &[ErrorType] = if positive {
        &[ErrorType::Additive, ErrorType::Multiplicative]
    } else {
        &[ErrorType::Additive]
    };
    let trend_types = [TrendType::None, TrendType::Additive, TrendType::Damped];
    let seasonal_types: &[SeasonalType] = match (seasonal, positive) {
        (false, _) => &[SeasonalType::None],
        (true, false) => &[SeasonalType::None, SeasonalType::Additive],
        (true, true) => &[
            SeasonalType::None,
            SeasonalType::Additive,
            SeasonalType::Multiplicative,
        ],
    };

    let mut specs = Vec::new();
    for &error in error_types {
        for &trend in &trend_types {
            for &seasonal in seasonal_types {
                // M,A,A and M,Ad,A can be unstable
                if error == ErrorType::Multiplicative
                    && trend != TrendType::None
                    && seasonal == SeasonalType::Additive
                {
                    continue;
                }
                specs.push(EtsSpec::new(error, trend, seasonal));
            }
        }
    }
    specs
}

/// Fit all candidates and return the AICc-minimising fit.
///
/// Candidates whose estimation does not converge are skipped; if none
/// can be fitted the last error is returned.
pub(crate) fn select(
    values: &[f64],
    period: usize,
    fixed_alpha: Option<f64>,
    burn_in: usize,
    optimizer: &OptimizerConfig,
) -> Result<EtsFit> {
    let seasonal = period > 1 && values.len() >= 2 * period;
    let positive = values.iter().all(|&v| v > 0.0);

    let mut best: Option<EtsFit> = None;
    let mut last_error = ForecastError::InsufficientData {
        needed: 2,
        got: values.len(),
    };

    for spec in candidates(seasonal, positive) {
        match fit_ets(spec, values, period, fixed_alpha, burn_in, optimizer) {
            Ok(fit) => {
                debug!(model = %spec, aicc = fit.aicc, "ETS candidate");
                let better = best.as_ref().map_or(true, |b| fit.aicc < b.aicc);
                if better {
                    best = Some(fit);
                }
            }
            Err(err @ ForecastError::NonConvergence { .. }) => {
                warn!(model = %spec, error = %err, "skipping ETS candidate");
                last_error = err;
            }
            Err(err) => {
                debug!(model = %spec, error = %err, "ETS candidate not admissible");
                last_error = err;
            }
        }
    }

    best.ok_or(last_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn candidate_grid_respects_data_sign_and_seasonality() {
        assert_eq!(candidates(false, false).len(), 3);
        assert_eq!(candidates(false, true).len(), 6);
        assert_eq!(candidates(true, false).len(), 6);
        // 2 x 3 x 3 minus M,A,A and M,Ad,A
        assert_eq!(candidates(true, true).len(), 16);
        assert!(candidates(true, false)
            .iter()
            .all(|s| s.seasonal != SeasonalType::Multiplicative));
    }

    #[test]
    fn select_picks_trend_for_trending_data() {
        let values: Vec<f64> = (0..40)
            .map(|i| 10.0 + 1.5 * i as f64 + if i % 2 == 0 { 0.3 } else { -0.3 })
            .collect();
        let fit = select(&values, 1, None, 1, &OptimizerConfig::default()).unwrap();
        assert!(fit.spec.has_trend());
    }

    #[test]
    fn select_picks_seasonality_for_seasonal_data() {
        let values: Vec<f64> = (0..48)
            .map(|i| 100.0 + 10.0 * (2.0 * PI * i as f64 / 12.0).sin() + ((i * 7) % 3) as f64 * 0.2)
            .collect();
        let fit = select(&values, 12, None, 12, &OptimizerConfig::default()).unwrap();
        assert!(fit.spec.has_seasonal());
    }

    #[test]
    fn select_reports_non_convergence_when_nothing_fits() {
        let values: Vec<f64> = (0..30).map(|i| 10.0 + ((i * 7) % 5) as f64).collect();
        let config = OptimizerConfig::default().with_max_iterations(1);
        assert!(matches!(
            select(&values, 1, None, 1, &config),
            Err(ForecastError::NonConvergence { .. })
        ));
    }
}
