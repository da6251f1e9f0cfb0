//! Baseline forecasting models.
//!
//! Simple methods that serve as benchmarks for more complex models: any
//! candidate method should beat these on the validation window to earn
//! its complexity.

mod drift;
mod moving_average;
mod naive;
mod seasonal_naive;

pub use drift::Drift;
pub use moving_average::MovingAverage;
pub use naive::Naive;
pub use seasonal_naive::SeasonalNaive;

/// Root mean square of the defined (non-NaN) residuals.
pub(crate) fn residual_sd(residuals: &[f64]) -> f64 {
    let valid: Vec<f64> = residuals.iter().copied().filter(|r| r.is_finite()).collect();
    if valid.is_empty() {
        return 0.0;
    }
    (valid.iter().map(|r| r * r).sum::<f64>() / valid.len() as f64).sqrt()
}
