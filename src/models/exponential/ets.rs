//! ETS (Error-Trend-Seasonal) state-space engine.
//!
//! Holds the component specification, the smoothing recursions, the
//! likelihood used for estimation and model selection, and the h-step
//! forecast and variance formulas.

use crate::error::{ForecastError, Result};
use crate::utils::optimization::{nelder_mead, OptimizerConfig};
use crate::utils::stats::aicc;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt;

const SMOOTHING_BOUNDS: (f64, f64) = (0.0001, 0.9999);
const DAMPING_BOUNDS: (f64, f64) = (0.8, 0.98);

/// Error component type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ErrorType {
    /// Additive errors
    #[default]
    Additive,
    /// Multiplicative errors
    Multiplicative,
}

/// Trend component type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TrendType {
    /// No trend
    #[default]
    None,
    /// Additive trend
    Additive,
    /// Additive damped trend
    Damped,
}

/// Seasonal component type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SeasonalType {
    /// No seasonality
    #[default]
    None,
    /// Additive seasonality
    Additive,
    /// Multiplicative seasonality
    Multiplicative,
}

/// ETS model specification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EtsSpec {
    pub error: ErrorType,
    pub trend: TrendType,
    pub seasonal: SeasonalType,
}

impl EtsSpec {
    /// Create a new ETS specification.
    pub fn new(error: ErrorType, trend: TrendType, seasonal: SeasonalType) -> Self {
        Self {
            error,
            trend,
            seasonal,
        }
    }

    /// ETS(A,N,N) - Simple exponential smoothing with additive errors.
    pub fn ann() -> Self {
        Self::new(ErrorType::Additive, TrendType::None, SeasonalType::None)
    }

    /// ETS(A,A,N) - Holt's linear method with additive errors.
    pub fn aan() -> Self {
        Self::new(ErrorType::Additive, TrendType::Additive, SeasonalType::None)
    }

    /// ETS(A,A,A) - Holt-Winters additive.
    pub fn aaa() -> Self {
        Self::new(ErrorType::Additive, TrendType::Additive, SeasonalType::Additive)
    }

    /// Check if this model has a trend component.
    pub fn has_trend(&self) -> bool {
        !matches!(self.trend, TrendType::None)
    }

    /// Check if this model has a seasonal component.
    pub fn has_seasonal(&self) -> bool {
        !matches!(self.seasonal, SeasonalType::None)
    }

    /// Check if this model has damping.
    pub fn is_damped(&self) -> bool {
        matches!(self.trend, TrendType::Damped)
    }

    /// Multiplicative components need strictly positive data.
    pub fn is_multiplicative(&self) -> bool {
        self.error == ErrorType::Multiplicative || self.seasonal == SeasonalType::Multiplicative
    }
}

impl fmt::Display for EtsSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let e = match self.error {
            ErrorType::Additive => "A",
            ErrorType::Multiplicative => "M",
        };
        let t = match self.trend {
            TrendType::None => "N",
            TrendType::Additive => "A",
            TrendType::Damped => "Ad",
        };
        let s = match self.seasonal {
            SeasonalType::None => "N",
            SeasonalType::Additive => "A",
            SeasonalType::Multiplicative => "M",
        };
        write!(f, "ETS({e},{t},{s})")
    }
}

/// Smoothing parameters of a fitted model. Unused components are zero
/// (`phi` is one for undamped models).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EtsParams {
    pub alpha: f64,
    pub beta: f64,
    pub gamma: f64,
    pub phi: f64,
}

/// A fitted ETS model.
#[derive(Debug, Clone)]
pub(crate) struct EtsFit {
    pub spec: EtsSpec,
    pub params: EtsParams,
    pub fitted: Vec<f64>,
    pub sigma2: f64,
    pub log_likelihood: f64,
    pub aicc: f64,
    period: usize,
    level: f64,
    trend: f64,
    seasonals: Vec<f64>,
    n: usize,
}

/// Output of one pass of the smoothing recursions.
struct Filtered {
    fitted: Vec<f64>,
    sum_sq: f64,
    sum_log_forecast: f64,
    count: usize,
    valid: bool,
    level: f64,
    trend: f64,
    seasonals: Vec<f64>,
}

/// Estimate the free smoothing parameters of `spec` and run the final filter.
///
/// `fixed_alpha` pins the level smoothing parameter. The log-likelihood is
/// accumulated from `burn_in` onwards so that candidates fitted with the same
/// burn-in are comparable.
pub(crate) fn fit_ets(
    spec: EtsSpec,
    values: &[f64],
    period: usize,
    fixed_alpha: Option<f64>,
    burn_in: usize,
    optimizer: &OptimizerConfig,
) -> Result<EtsFit> {
    let period = if spec.has_seasonal() { period } else { 1 };
    let min_len = if spec.has_seasonal() {
        2 * period
    } else if spec.has_trend() {
        3
    } else {
        2
    };
    if values.len() < min_len {
        return Err(ForecastError::InsufficientData {
            needed: min_len,
            got: values.len(),
        });
    }
    if spec.is_multiplicative() && values.iter().any(|&v| v <= 0.0) {
        return Err(ForecastError::InvalidParameter(format!(
            "{spec} requires strictly positive data"
        )));
    }
    let burn_in = burn_in.max(if spec.has_seasonal() { period } else { 1 });
    if burn_in >= values.len() {
        return Err(ForecastError::InsufficientData {
            needed: burn_in + 1,
            got: values.len(),
        });
    }

    let (initial, bounds) = free_parameters(spec, fixed_alpha);
    let method = spec.to_string();
    let objective = |p: &[f64]| {
        let params = unpack(spec, fixed_alpha, p);
        let out = filter(spec, period, values, &params, burn_in);
        negative_log_likelihood(spec, &out)
    };
    let minimum = nelder_mead(&method, objective, &initial, &bounds, optimizer)?;

    let params = unpack(spec, fixed_alpha, &minimum.point);
    let out = filter(spec, period, values, &params, burn_in);
    if !out.valid {
        return Err(ForecastError::InvalidParameter(format!(
            "{spec} produced non-positive forecasts"
        )));
    }
    let log_likelihood = -negative_log_likelihood(spec, &out);
    let sigma2 = out.sum_sq / out.count as f64;
    // Smoothing parameters plus the innovation variance
    let k = initial.len() + 1;

    Ok(EtsFit {
        spec,
        params,
        fitted: out.fitted,
        sigma2,
        log_likelihood,
        aicc: aicc(log_likelihood, k, out.count),
        period,
        level: out.level,
        trend: out.trend,
        seasonals: out.seasonals,
        n: values.len(),
    })
}

impl EtsFit {
    /// Point forecasts for steps `1..=horizon`.
    pub fn forecast(&self, horizon: usize) -> Vec<f64> {
        (1..=horizon)
            .map(|h| {
                let trend = match self.spec.trend {
                    TrendType::None => 0.0,
                    TrendType::Additive => h as f64 * self.trend,
                    TrendType::Damped => damped_sum(self.params.phi, h) * self.trend,
                };
                let s = self.seasonal_at(self.n + h - 1);
                match self.spec.seasonal {
                    SeasonalType::None => self.level + trend,
                    SeasonalType::Additive => self.level + trend + s,
                    SeasonalType::Multiplicative => (self.level + trend) * s,
                }
            })
            .collect()
    }

    /// Forecast standard deviations for steps `1..=horizon`.
    ///
    /// Uses the closed-form variance of the linear (additive) models;
    /// for multiplicative errors the relative variance is scaled by the
    /// point forecast.
    pub fn forecast_sd(&self, point: &[f64]) -> Vec<f64> {
        let EtsParams {
            alpha,
            beta,
            gamma,
            phi,
        } = self.params;
        let mut cumulative = 0.0;
        point
            .iter()
            .enumerate()
            .map(|(i, p)| {
                let h = i + 1;
                if h > 1 {
                    let j = h - 1;
                    let trend_part = match self.spec.trend {
                        TrendType::None => 0.0,
                        TrendType::Additive => alpha * beta * j as f64,
                        TrendType::Damped => alpha * beta * damped_sum(phi, j),
                    };
                    let seasonal_part = if self.spec.has_seasonal() && j % self.period == 0 {
                        gamma
                    } else {
                        0.0
                    };
                    cumulative += (alpha + trend_part + seasonal_part).powi(2);
                }
                let sd = (self.sigma2 * (1.0 + cumulative)).sqrt();
                match self.spec.error {
                    ErrorType::Additive => sd,
                    ErrorType::Multiplicative => sd * p.abs(),
                }
            })
            .collect()
    }

    fn seasonal_at(&self, t: usize) -> f64 {
        match self.spec.seasonal {
            SeasonalType::None => 0.0,
            _ => self.seasonals[t % self.period],
        }
    }
}

fn free_parameters(spec: EtsSpec, fixed_alpha: Option<f64>) -> (Vec<f64>, Vec<(f64, f64)>) {
    let mut initial = Vec::with_capacity(4);
    let mut bounds = Vec::with_capacity(4);
    if fixed_alpha.is_none() {
        initial.push(0.3);
        bounds.push(SMOOTHING_BOUNDS);
    }
    if spec.has_trend() {
        initial.push(0.1);
        bounds.push(SMOOTHING_BOUNDS);
    }
    if spec.has_seasonal() {
        initial.push(0.1);
        bounds.push(SMOOTHING_BOUNDS);
    }
    if spec.is_damped() {
        initial.push(0.95);
        bounds.push(DAMPING_BOUNDS);
    }
    (initial, bounds)
}

fn unpack(spec: EtsSpec, fixed_alpha: Option<f64>, p: &[f64]) -> EtsParams {
    let mut it = p.iter().copied();
    let alpha = fixed_alpha.or_else(|| it.next()).unwrap_or(0.3);
    let beta = if spec.has_trend() { it.next().unwrap_or(0.1) } else { 0.0 };
    let gamma = if spec.has_seasonal() { it.next().unwrap_or(0.1) } else { 0.0 };
    let phi = if spec.is_damped() { it.next().unwrap_or(0.95) } else { 1.0 };
    EtsParams {
        alpha,
        beta,
        gamma,
        phi,
    }
}

/// Heuristic initial states from the first one or two cycles.
fn initialize_state(spec: EtsSpec, period: usize, values: &[f64]) -> (f64, f64, Vec<f64>) {
    let level = if spec.has_seasonal() {
        values.iter().take(period).sum::<f64>() / period as f64
    } else {
        values[0]
    };

    let trend = if !spec.has_trend() {
        0.0
    } else if spec.has_seasonal() {
        (0..period)
            .map(|i| (values[period + i] - values[i]) / period as f64)
            .sum::<f64>()
            / period as f64
    } else {
        values[1] - values[0]
    };

    let seasonals = match spec.seasonal {
        SeasonalType::None => Vec::new(),
        SeasonalType::Additive => values.iter().take(period).map(|y| y - level).collect(),
        SeasonalType::Multiplicative => values
            .iter()
            .take(period)
            .map(|y| if level.abs() > 1e-10 { y / level } else { 1.0 })
            .collect(),
    };

    (level, trend, seasonals)
}

fn filter(
    spec: EtsSpec,
    period: usize,
    values: &[f64],
    params: &EtsParams,
    burn_in: usize,
) -> Filtered {
    let EtsParams {
        alpha,
        beta,
        gamma,
        phi,
    } = *params;
    let (mut level, mut trend, mut seasonals) = initialize_state(spec, period, values);
    let start = if spec.has_seasonal() { period } else { 1 };

    let mut fitted = vec![f64::NAN; values.len()];
    let mut sum_sq = 0.0;
    let mut sum_log_forecast = 0.0;
    let mut count = 0;
    let mut valid = true;

    for (t, &y) in values.iter().enumerate().skip(start) {
        let idx = t % period;
        let s = match spec.seasonal {
            SeasonalType::None => 0.0,
            _ => seasonals[idx],
        };
        let damped_trend = match spec.trend {
            TrendType::None => 0.0,
            TrendType::Additive => trend,
            TrendType::Damped => phi * trend,
        };
        let base = level + damped_trend;

        // One-step forecast
        let forecast = match spec.seasonal {
            SeasonalType::None => base,
            SeasonalType::Additive => base + s,
            SeasonalType::Multiplicative => base * s,
        };
        fitted[t] = forecast;

        if t >= burn_in {
            let error = y - forecast;
            match spec.error {
                ErrorType::Additive => sum_sq += error * error,
                ErrorType::Multiplicative => {
                    if forecast <= 0.0 {
                        valid = false;
                    } else {
                        sum_sq += (error / forecast).powi(2);
                        sum_log_forecast += forecast.ln();
                    }
                }
            }
            count += 1;
        }

        // Update state
        let level_prev = level;
        let deseasonalized = match spec.seasonal {
            SeasonalType::None => y,
            SeasonalType::Additive => y - s,
            SeasonalType::Multiplicative => {
                if s.abs() > 1e-10 {
                    y / s
                } else {
                    y
                }
            }
        };
        level = alpha * deseasonalized + (1.0 - alpha) * base;
        trend = match spec.trend {
            TrendType::None => 0.0,
            TrendType::Additive | TrendType::Damped => {
                beta * (level - level_prev) + (1.0 - beta) * damped_trend
            }
        };
        match spec.seasonal {
            SeasonalType::None => {}
            SeasonalType::Additive => {
                seasonals[idx] = gamma * (y - level) + (1.0 - gamma) * s;
            }
            SeasonalType::Multiplicative => {
                if level.abs() > 1e-10 {
                    seasonals[idx] = gamma * (y / level) + (1.0 - gamma) * s;
                }
            }
        }
    }

    Filtered {
        fitted,
        sum_sq,
        sum_log_forecast,
        count,
        valid,
        level,
        trend,
        seasonals,
    }
}

fn negative_log_likelihood(spec: EtsSpec, out: &Filtered) -> f64 {
    if !out.valid || out.count == 0 {
        return f64::INFINITY;
    }
    let n = out.count as f64;
    let sigma2 = (out.sum_sq / n).max(f64::MIN_POSITIVE);
    let gaussian = 0.5 * n * (1.0 + (2.0 * PI).ln() + sigma2.ln());
    match spec.error {
        ErrorType::Additive => gaussian,
        ErrorType::Multiplicative => gaussian + out.sum_log_forecast,
    }
}

/// `phi + phi^2 + ... + phi^h`.
fn damped_sum(phi: f64, h: usize) -> f64 {
    if (phi - 1.0).abs() < 1e-10 {
        h as f64
    } else {
        phi * (1.0 - phi.powi(h as i32)) / (1.0 - phi)
    }
}
