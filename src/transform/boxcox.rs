//! Box-Cox power transformation.
//!
//! `y = (x^λ - 1) / λ` for `λ != 0` and `y = ln x` for `λ = 0`, defined for
//! positive data only.

use crate::core::{Forecast, TimeSeries};
use crate::error::{ForecastError, Result};

const LAMBDA_MIN: f64 = -1.0;
const LAMBDA_MAX: f64 = 2.0;

/// A transformed series together with the λ that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxCoxResult {
    pub series: TimeSeries,
    pub lambda: f64,
}

impl BoxCoxResult {
    /// Back to the original scale.
    pub fn inverse(&self) -> Result<TimeSeries> {
        inverse_box_cox(&self.series, self.lambda)
    }
}

fn forward(x: f64, lambda: f64) -> f64 {
    if lambda.abs() < 1e-10 {
        x.ln()
    } else {
        (x.powf(lambda) - 1.0) / lambda
    }
}

fn backward(y: f64, lambda: f64) -> Option<f64> {
    if lambda.abs() < 1e-10 {
        return Some(y.exp());
    }
    let base = lambda * y + 1.0;
    (base > 0.0).then(|| base.powf(1.0 / lambda))
}

fn check_positive(series: &TimeSeries) -> Result<()> {
    if series.is_empty() {
        return Err(ForecastError::EmptyData);
    }
    match series.values().iter().position(|&x| !(x > 0.0)) {
        Some(index) => Err(ForecastError::InvalidParameter(format!(
            "Box-Cox needs positive data, got {} at {}",
            series.values()[index],
            series.period_at(index)
        ))),
        None => Ok(()),
    }
}

/// Transform with a fixed λ.
pub fn box_cox(series: &TimeSeries, lambda: f64) -> Result<TimeSeries> {
    if !lambda.is_finite() {
        return Err(ForecastError::InvalidParameter(format!(
            "Box-Cox lambda must be finite, got {lambda}"
        )));
    }
    check_positive(series)?;
    Ok(series.map(|x| forward(x, lambda)))
}

/// Undo [`box_cox`].
///
/// Fails when a value lies outside the range of the forward transform.
pub fn inverse_box_cox(series: &TimeSeries, lambda: f64) -> Result<TimeSeries> {
    let values = inverse_values(series.values(), lambda)?;
    series.with_values(values)
}

fn inverse_values(values: &[f64], lambda: f64) -> Result<Vec<f64>> {
    values
        .iter()
        .enumerate()
        .map(|(i, &y)| {
            backward(y, lambda).ok_or_else(|| {
                ForecastError::InvalidParameter(format!(
                    "value {y} at index {i} is outside the Box-Cox range for lambda {lambda}"
                ))
            })
        })
        .collect()
}

/// Back-transform a forecast made on the Box-Cox scale.
///
/// Point forecasts and interval bounds are inverted one by one; the
/// points become medians on the original scale.
pub fn inverse_forecast(forecast: &Forecast, lambda: f64) -> Result<Forecast> {
    let point = inverse_values(forecast.point(), lambda)?;
    let restored = Forecast::new(
        forecast.method(),
        forecast.start(),
        forecast.frequency(),
        point,
    )?;
    forecast.intervals().iter().try_fold(restored, |fc, iv| {
        fc.with_interval(
            iv.level,
            inverse_values(&iv.lower, lambda)?,
            inverse_values(&iv.upper, lambda)?,
        )
    })
}

/// Maximum-likelihood λ over `[-1, 2]`.
///
/// A 0.01 grid is refined once around its best point.
pub fn box_cox_lambda(series: &TimeSeries) -> Result<f64> {
    check_positive(series)?;
    if series.len() < 2 {
        return Err(ForecastError::InsufficientData {
            needed: 2,
            got: series.len(),
        });
    }
    let values = series.values();
    let log_sum: f64 = values.iter().map(|x| x.ln()).sum();

    let consider = |best: &mut (f64, f64), lambda: f64| {
        let llf = profile_log_likelihood(values, log_sum, lambda);
        if llf > best.1 {
            *best = (lambda, llf);
        }
    };

    let mut best = (1.0, f64::NEG_INFINITY);
    let steps = ((LAMBDA_MAX - LAMBDA_MIN) * 100.0).round() as i32;
    for i in 0..=steps {
        consider(&mut best, LAMBDA_MIN + i as f64 / 100.0);
    }
    let centre = best.0;
    for i in 0..=100 {
        let lambda = (centre - 0.01 + 0.0002 * i as f64).clamp(LAMBDA_MIN, LAMBDA_MAX);
        consider(&mut best, lambda);
    }

    Ok(best.0)
}

/// Transform with the maximum-likelihood λ.
pub fn box_cox_auto(series: &TimeSeries) -> Result<BoxCoxResult> {
    let lambda = box_cox_lambda(series)?;
    Ok(BoxCoxResult {
        series: box_cox(series, lambda)?,
        lambda,
    })
}

/// Normal log-likelihood of the transformed data, constants dropped.
fn profile_log_likelihood(values: &[f64], log_sum: f64, lambda: f64) -> f64 {
    let n = values.len() as f64;
    let transformed: Vec<f64> = values.iter().map(|&x| forward(x, lambda)).collect();
    let mean = transformed.iter().sum::<f64>() / n;
    let variance = transformed.iter().map(|y| (y - mean).powi(2)).sum::<f64>() / n;
    if !(variance > 0.0) || !variance.is_finite() {
        return f64::NEG_INFINITY;
    }
    -0.5 * n * variance.ln() + (lambda - 1.0) * log_sum
}
