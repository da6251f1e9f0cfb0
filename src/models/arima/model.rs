//! ARIMA (Autoregressive Integrated Moving Average) model.
//!
//! Coefficients are estimated by conditional sum of squares (CSS) on the
//! differenced series. Seasonal and non-seasonal polynomials are multiplied
//! out, so `ARIMA(p,d,q)(P,D,Q)[s]` is filtered as one long AR/MA recursion.

use super::auto_arima;
use super::diff::{apply_polynomial, differencing_polynomial, poly_mul, undifference};
use super::options::{model_name, ArimaOptions, ArimaOrder, SeasonalOrder};
use crate::core::{Forecast, TimeSeries};
use crate::error::{ForecastError, Result};
use crate::models::traits::{check_train, require_two_cycles, with_normal_intervals};
use crate::models::Forecaster;
use crate::utils::optimization::{nelder_mead, OptimizerConfig};
use crate::utils::stats::{aicc, mean};
use std::f64::consts::PI;
use tracing::debug;

const COEFFICIENT_BOUND: f64 = 0.99;

/// A fully specified model: orders plus whether a constant is estimated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ArimaSpec {
    pub order: ArimaOrder,
    pub seasonal: Option<SeasonalOrder>,
    pub constant: bool,
}

impl ArimaSpec {
    /// The constant is dropped once the model is differenced twice or more.
    pub fn new(order: ArimaOrder, seasonal: Option<SeasonalOrder>, include_constant: bool) -> Self {
        let seasonal = seasonal.filter(|s| !s.is_empty());
        let total_d = order.d + seasonal.map_or(0, |s| s.d);
        Self {
            order,
            seasonal,
            constant: include_constant && total_d < 2,
        }
    }

    pub fn name(&self) -> String {
        model_name(self.order, self.seasonal)
    }

    fn period(&self) -> usize {
        self.seasonal.map_or(0, |s| s.period)
    }

    fn n_coefficients(&self) -> usize {
        let (sp, sq) = self.seasonal.map_or((0, 0), |s| (s.p, s.q));
        self.order.p + self.order.q + sp + sq
    }

    fn n_params(&self) -> usize {
        self.n_coefficients() + usize::from(self.constant)
    }

    /// Largest lag of the expanded AR polynomial.
    fn ar_lags(&self) -> usize {
        self.order.p + self.seasonal.map_or(0, |s| s.p * s.period)
    }

    fn differencing(&self) -> Vec<f64> {
        let (sd, period) = self.seasonal.map_or((0, 0), |s| (s.d, s.period));
        differencing_polynomial(self.order.d, sd, period)
    }

    /// Split an optimizer vector into named coefficients.
    fn unpack(&self, x: &[f64]) -> ArimaCoefficients {
        let (sp, sq) = self.seasonal.map_or((0, 0), |s| (s.p, s.q));
        let mut rest = x;
        let mut take = |k: usize| {
            let (head, tail) = rest.split_at(k);
            rest = tail;
            head.to_vec()
        };
        let ar = take(self.order.p);
        let ma = take(self.order.q);
        let seasonal_ar = take(sp);
        let seasonal_ma = take(sq);
        let constant = self.constant.then(|| take(1)[0]);
        ArimaCoefficients {
            ar,
            ma,
            seasonal_ar,
            seasonal_ma,
            constant,
        }
    }
}

/// Estimated coefficients of an ARIMA model.
///
/// Sign conventions: `y'[t] = c + Σ ar[i] y'[t-i] + e[t] + Σ ma[j] e[t-j]`
/// on the differenced series `y'`, with the seasonal terms multiplying in.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ArimaCoefficients {
    pub ar: Vec<f64>,
    pub ma: Vec<f64>,
    pub seasonal_ar: Vec<f64>,
    pub seasonal_ma: Vec<f64>,
    /// Mean of the differenced series, if estimated.
    pub constant: Option<f64>,
}

impl ArimaCoefficients {
    /// Expanded AR weights `a[k]` for lags `1..`, so `y'[t] = Σ a[k] y'[t-k] + ...`.
    fn ar_weights(&self, period: usize) -> Vec<f64> {
        let poly = expand(&self.ar, &self.seasonal_ar, period, -1.0);
        poly.iter().skip(1).map(|c| -c).collect()
    }

    /// Expanded MA weights for lags `1..`.
    fn ma_weights(&self, period: usize) -> Vec<f64> {
        expand(&self.ma, &self.seasonal_ma, period, 1.0)
            .into_iter()
            .skip(1)
            .collect()
    }
}

/// `(1 + sign Σ a[i] B^i)(1 + sign Σ A[i] B^(i s))` as lag coefficients.
fn expand(nonseasonal: &[f64], seasonal: &[f64], period: usize, sign: f64) -> Vec<f64> {
    let mut short = vec![1.0];
    short.extend(nonseasonal.iter().map(|c| sign * c));
    let mut long = vec![0.0; seasonal.len() * period + 1];
    long[0] = 1.0;
    for (i, c) in seasonal.iter().enumerate() {
        long[(i + 1) * period] = sign * c;
    }
    poly_mul(&short, &long)
}

/// CSS residuals of the differenced series; zero before `start`.
fn css_residuals(w: &[f64], mean: f64, ar: &[f64], ma: &[f64], start: usize) -> Vec<f64> {
    let mut e = vec![0.0; w.len()];
    for t in start..w.len() {
        let mut pred = mean;
        for (i, a) in ar.iter().enumerate() {
            pred += a * (w[t - i - 1] - mean);
        }
        for (j, m) in ma.iter().enumerate().take(t) {
            pred += m * e[t - j - 1];
        }
        e[t] = w[t] - pred;
    }
    e
}

/// A fitted ARIMA model on one training sample.
#[derive(Debug, Clone)]
pub(crate) struct ArimaFit {
    pub spec: ArimaSpec,
    pub coefficients: ArimaCoefficients,
    pub sigma2: f64,
    pub log_likelihood: f64,
    pub aicc: f64,
    /// One-step fitted values on the original scale, NaN where undefined.
    pub fitted: Vec<f64>,
    history: Vec<f64>,
    differenced: Vec<f64>,
    residuals: Vec<f64>,
    differencing: Vec<f64>,
    ar: Vec<f64>,
    ma: Vec<f64>,
}

/// Estimate `spec` on `values` by conditional sum of squares.
///
/// Residuals are scored from `burn_in` (or the largest AR lag, if later)
/// so that candidates with the same differencing share one sample.
pub(crate) fn fit_arima(
    spec: ArimaSpec,
    values: &[f64],
    burn_in: usize,
    optimizer: &OptimizerConfig,
) -> Result<ArimaFit> {
    let period = spec.period();
    if period > 0 && values.len() < 2 * period {
        return Err(ForecastError::InsufficientData {
            needed: 2 * period,
            got: values.len(),
        });
    }

    let differencing = spec.differencing();
    let lost = differencing.len() - 1;
    let start = burn_in.max(spec.ar_lags());
    let k = spec.n_params();
    // AICc needs n_eff > (k + 1) + 1
    let needed = lost + start + k + 3;
    if values.len() < needed {
        return Err(ForecastError::InsufficientData {
            needed,
            got: values.len(),
        });
    }

    let w = apply_polynomial(values, &differencing);
    let n_eff = (w.len() - start) as f64;

    let mut initial = vec![0.0; spec.n_coefficients()];
    let mut bounds = vec![(-COEFFICIENT_BOUND, COEFFICIENT_BOUND); initial.len()];
    if spec.constant {
        initial.push(mean(&w));
        bounds.push((f64::NEG_INFINITY, f64::INFINITY));
    }

    let mean_square = |x: &[f64]| {
        let c = spec.unpack(x);
        let e = css_residuals(
            &w,
            c.constant.unwrap_or(0.0),
            &c.ar_weights(period),
            &c.ma_weights(period),
            start,
        );
        e[start..].iter().map(|v| v * v).sum::<f64>() / n_eff
    };

    let name = spec.name();
    let min = nelder_mead(&name, mean_square, &initial, &bounds, optimizer)?;

    let coefficients = spec.unpack(&min.point);
    let ar = coefficients.ar_weights(period);
    let ma = coefficients.ma_weights(period);
    let mu = coefficients.constant.unwrap_or(0.0);
    let residuals = css_residuals(&w, mu, &ar, &ma, start);

    let sigma2 = (residuals[start..].iter().map(|v| v * v).sum::<f64>() / n_eff)
        .max(f64::MIN_POSITIVE);
    let log_likelihood = -0.5 * n_eff * (1.0 + (2.0 * PI).ln() + sigma2.ln());
    let criterion = aicc(log_likelihood, k + 1, n_eff as usize);

    let mut fitted = vec![f64::NAN; values.len()];
    for t in start..w.len() {
        fitted[t + lost] = values[t + lost] - residuals[t];
    }

    Ok(ArimaFit {
        spec,
        coefficients,
        sigma2,
        log_likelihood,
        aicc: criterion,
        fitted,
        history: values.to_vec(),
        differenced: w,
        residuals,
        differencing,
        ar,
        ma,
    })
}

impl ArimaFit {
    /// Point forecasts with future shocks set to zero.
    pub fn forecast(&self, horizon: usize) -> Vec<f64> {
        let mu = self.coefficients.constant.unwrap_or(0.0);
        let mut w = self.differenced.clone();
        let mut e = self.residuals.clone();
        let observed = w.len();
        for _ in 0..horizon {
            let t = w.len();
            let mut pred = mu;
            for (i, a) in self.ar.iter().enumerate() {
                pred += a * (w[t - i - 1] - mu);
            }
            for (j, m) in self.ma.iter().enumerate().take(t) {
                pred += m * e[t - j - 1];
            }
            w.push(pred);
            e.push(0.0);
        }
        undifference(&self.history, &w[observed..], &self.differencing)
    }

    /// Forecast standard deviations from the psi weights of the
    /// integrated model.
    pub fn forecast_sd(&self, horizon: usize) -> Vec<f64> {
        let mut ar_poly = vec![1.0];
        ar_poly.extend(self.ar.iter().map(|a| -a));
        let g: Vec<f64> = poly_mul(&ar_poly, &self.differencing)
            .iter()
            .skip(1)
            .map(|c| -c)
            .collect();

        let mut psi = vec![1.0];
        for j in 1..horizon {
            let mut value = self.ma.get(j - 1).copied().unwrap_or(0.0);
            for (i, gi) in g.iter().enumerate().take(j) {
                value += gi * psi[j - i - 1];
            }
            psi.push(value);
        }

        let mut cumulative = 0.0;
        psi.iter()
            .map(|p| {
                cumulative += p * p;
                (self.sigma2 * cumulative).sqrt()
            })
            .collect()
    }
}

/// ARIMA forecaster.
///
/// Fits the order in [`ArimaOptions`] or, with `auto_select`, searches
/// orders and keeps the lowest AICc.
///
/// # Example
/// ```
/// use forecast_harness::core::{Period, TimeSeries};
/// use forecast_harness::models::arima::{ArimaOptions, ARIMA};
/// use forecast_harness::models::Forecaster;
///
/// let values: Vec<f64> = (0..40).map(|i| 10.0 + 0.5 * i as f64 + (i % 3) as f64).collect();
/// let train = TimeSeries::new(Period::new(2000, 1), 1, values).unwrap();
///
/// let forecast = ARIMA::new(ArimaOptions::new(0, 1, 1)).forecast(&train, 5).unwrap();
/// assert_eq!(forecast.horizon(), 5);
/// assert_eq!(forecast.method(), "ARIMA(0,1,1)");
/// ```
#[derive(Debug, Clone, Default)]
pub struct ARIMA {
    options: ArimaOptions,
}

/// Summary of a fitted ARIMA model.
#[derive(Debug, Clone, PartialEq)]
pub struct ArimaSummary {
    pub model: String,
    pub order: ArimaOrder,
    pub seasonal_order: Option<SeasonalOrder>,
    pub coefficients: ArimaCoefficients,
    pub sigma2: f64,
    pub log_likelihood: f64,
    pub aicc: f64,
}

impl ARIMA {
    /// Create a forecaster from options.
    pub fn new(options: ArimaOptions) -> Self {
        Self { options }
    }

    /// Automatic order selection.
    pub fn auto() -> Self {
        Self::new(ArimaOptions::auto())
    }

    /// Get the options.
    pub fn options(&self) -> &ArimaOptions {
        &self.options
    }

    /// Fit on `train` and report the selected model and its coefficients.
    pub fn summary(&self, train: &TimeSeries) -> Result<ArimaSummary> {
        check_train(train, 1)?;
        let fit = self.fit(train)?;
        Ok(ArimaSummary {
            model: fit.spec.name(),
            order: fit.spec.order,
            seasonal_order: fit.spec.seasonal,
            coefficients: fit.coefficients,
            sigma2: fit.sigma2,
            log_likelihood: fit.log_likelihood,
            aicc: fit.aicc,
        })
    }

    fn fit(&self, train: &TimeSeries) -> Result<ArimaFit> {
        self.options.validate()?;
        let values = train.values();

        let fit = if self.options.auto_select {
            let period = self
                .options
                .seasonal_period
                .unwrap_or_else(|| train.frequency());
            auto_arima::select(values, period, &self.options)?
        } else {
            let spec = ArimaSpec::new(
                self.options.order,
                self.options.seasonal_order,
                self.options.include_constant,
            );
            if spec.period() > 0 {
                require_two_cycles(train, spec.period())?;
            }
            fit_arima(spec, values, 0, &self.options.optimizer)?
        };

        debug!(
            model = %fit.spec.name(),
            constant = ?fit.coefficients.constant,
            sigma2 = fit.sigma2,
            aicc = fit.aicc,
            "fitted ARIMA"
        );
        Ok(fit)
    }
}

impl ARIMA {
    fn project(fit: &ArimaFit, train: &TimeSeries, horizon: usize, levels: &[f64]) -> Result<Forecast> {
        let sd = fit.forecast_sd(horizon);
        let forecast = Forecast::following(train, fit.spec.name(), fit.forecast(horizon));
        with_normal_intervals(forecast, &sd, levels)
    }
}

impl Forecaster for ARIMA {
    fn name(&self) -> &str {
        "ARIMA"
    }

    fn forecast(&self, train: &TimeSeries, horizon: usize) -> Result<Forecast> {
        check_train(train, horizon)?;
        let fit = self.fit(train)?;
        Ok(Forecast::following(
            train,
            fit.spec.name(),
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
