//! Differencing utilities for ARIMA models.
//!
//! Differencing is represented by its lag polynomial
//! `Δ(B) = (1 - B)^d (1 - B^s)^D`, stored as coefficients `[1, δ1, δ2, ...]`,
//! so that differencing, undifferencing and the psi weights of the
//! integrated model all share one representation.

use crate::utils::stats::variance;

/// Apply regular differencing `d` times.
pub fn difference(series: &[f64], d: usize) -> Vec<f64> {
    let mut result = series.to_vec();
    for _ in 0..d {
        if result.len() <= 1 {
            return Vec::new();
        }
        result = result.windows(2).map(|w| w[1] - w[0]).collect();
    }
    result
}

/// Apply seasonal differencing at lag `period`, `d` times.
pub fn seasonal_difference(series: &[f64], d: usize, period: usize) -> Vec<f64> {
    let mut result = series.to_vec();
    for _ in 0..d {
        if period == 0 || result.len() <= period {
            return Vec::new();
        }
        result = result
            .iter()
            .skip(period)
            .zip(result.iter())
            .map(|(curr, prev)| curr - prev)
            .collect();
    }
    result
}

/// Multiply two lag polynomials given by their coefficients.
pub(crate) fn poly_mul(a: &[f64], b: &[f64]) -> Vec<f64> {
    if a.is_empty() || b.is_empty() {
        return Vec::new();
    }
    let mut out = vec![0.0; a.len() + b.len() - 1];
    for (i, &x) in a.iter().enumerate() {
        for (j, &y) in b.iter().enumerate() {
            out[i + j] += x * y;
        }
    }
    out
}

/// Coefficients of `(1 - B)^d (1 - B^s)^D`.
pub(crate) fn differencing_polynomial(d: usize, seasonal_d: usize, period: usize) -> Vec<f64> {
    let mut poly = vec![1.0];
    for _ in 0..d {
        poly = poly_mul(&poly, &[1.0, -1.0]);
    }
    if period > 0 {
        let mut seasonal = vec![0.0; period + 1];
        seasonal[0] = 1.0;
        seasonal[period] = -1.0;
        for _ in 0..seasonal_d {
            poly = poly_mul(&poly, &seasonal);
        }
    }
    poly
}

/// Apply a differencing polynomial: `w[t] = Σ δk y[t-k]`.
///
/// The result is `poly.len() - 1` observations shorter than `series`.
pub(crate) fn apply_polynomial(series: &[f64], poly: &[f64]) -> Vec<f64> {
    let offset = poly.len().saturating_sub(1);
    (offset..series.len())
        .map(|t| poly.iter().enumerate().map(|(k, c)| c * series[t - k]).sum())
        .collect()
}

/// Extend `history` with future differenced values, inverting
/// `w[t] = Σ δk y[t-k]` for `y[t]`.
pub(crate) fn undifference(history: &[f64], future_diffs: &[f64], poly: &[f64]) -> Vec<f64> {
    let mut y = history.to_vec();
    let n = y.len();
    for &w in future_diffs {
        let t = y.len();
        let lagged: f64 = poly
            .iter()
            .enumerate()
            .skip(1)
            .map(|(k, c)| c * y[t - k])
            .sum();
        y.push(w - lagged);
    }
    y.split_off(n)
}

/// Suggest a regular differencing order (0, 1 or 2) by variance reduction.
///
/// A difference is taken while it cuts the variance by at least 10%.
pub fn suggest_differencing(series: &[f64], max_d: usize) -> usize {
    let mut current = series.to_vec();
    let mut d = 0;
    while d < max_d && current.len() >= 3 {
        let next = difference(&current, 1);
        let before = variance(&current);
        let after = variance(&next);
        if !(before > 0.0) || !(after < 0.9 * before) {
            break;
        }
        current = next;
        d += 1;
    }
    d
}

/// Suggest a seasonal differencing order (0 or 1).
///
/// Seasonal differencing is chosen when it removes at least 30% of the
/// variance left after regular differencing.
pub fn suggest_seasonal_differencing(series: &[f64], period: usize, max_d: usize) -> usize {
    if max_d == 0 || period < 2 || series.len() < 2 * period + 2 {
        return 0;
    }
    let base = difference(series, 1);
    let seasonal = seasonal_difference(&base, 1, period);
    let before = variance(&base);
    let after = variance(&seasonal);
    if before > 0.0 && after < 0.7 * before {
        1
    } else {
        0
    }
}
