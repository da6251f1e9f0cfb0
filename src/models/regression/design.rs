//! Typed predictors and the design matrices built from them.

use crate::core::{Period, TimeSeries};
use crate::error::{ForecastError, Result};
use crate::models::traits::require_two_cycles;
use std::f64::consts::PI;

/// An external regressor, looked up by period.
///
/// The series must cover every training period and every forecast period.
#[derive(Debug, Clone, PartialEq)]
pub struct ExogenousRegressor {
    pub name: String,
    pub series: TimeSeries,
}

impl ExogenousRegressor {
    /// Create a named regressor.
    pub fn new(name: impl Into<String>, series: TimeSeries) -> Self {
        Self {
            name: name.into(),
            series,
        }
    }

    fn value_at(&self, period: Period) -> Result<f64> {
        self.series.value_at(period).ok_or_else(|| {
            ForecastError::misaligned(format!(
                "exogenous regressor '{}' has no value for {}",
                self.name, period
            ))
        })
    }
}

/// Role of one group of design columns.
#[derive(Debug, Clone, PartialEq)]
pub enum Predictor {
    /// Linear time index `t = 1, 2, ...`.
    Trend,
    /// Squared time index.
    Quadratic,
    /// One indicator per season except the first.
    SeasonalDummies,
    /// `harmonics` sine/cosine pairs of the given period.
    Fourier { period: usize, harmonics: usize },
    /// External regressor.
    Exogenous(ExogenousRegressor),
}

impl Predictor {
    /// Shorthand for [`Predictor::Fourier`].
    pub fn fourier(period: usize, harmonics: usize) -> Self {
        Predictor::Fourier { period, harmonics }
    }

    pub(crate) fn validate(&self, frequency: usize) -> Result<()> {
        match self {
            Predictor::SeasonalDummies if frequency < 2 => Err(ForecastError::InvalidParameter(
                "seasonal dummies need a frequency of at least 2".to_string(),
            )),
            Predictor::Fourier { period, harmonics } => validate_fourier(*period, *harmonics),
            Predictor::Exogenous(x) if x.series.frequency() != frequency => {
                Err(ForecastError::misaligned(format!(
                    "exogenous regressor '{}' has frequency {}, series has {}",
                    x.name,
                    x.series.frequency(),
                    frequency
                )))
            }
            Predictor::Exogenous(x) if x.series.has_missing_values() => {
                Err(ForecastError::InvalidParameter(format!(
                    "exogenous regressor '{}' contains NaN or infinite values",
                    x.name
                )))
            }
            _ => Ok(()),
        }
    }

    fn push_columns(&self, t: usize, period: Period, frequency: usize, row: &mut Vec<f64>) -> Result<()> {
        let time = (t + 1) as f64;
        match self {
            Predictor::Trend => row.push(time),
            Predictor::Quadratic => row.push(time * time),
            Predictor::SeasonalDummies => {
                let season = period.season() as usize;
                row.extend((2..=frequency).map(|s| if s == season { 1.0 } else { 0.0 }));
            }
            Predictor::Fourier { period: s, harmonics } => {
                for k in 1..=*harmonics {
                    let angle = 2.0 * PI * k as f64 * time / *s as f64;
                    // At the Nyquist harmonic the sine column is identically zero
                    if 2 * k != *s {
                        row.push(angle.sin());
                    }
                    row.push(angle.cos());
                }
            }
            Predictor::Exogenous(x) => row.push(x.value_at(period)?),
        }
        Ok(())
    }
}

/// `1 ≤ K ≤ floor(s/2)`.
pub(crate) fn validate_fourier(period: usize, harmonics: usize) -> Result<()> {
    if harmonics == 0 || harmonics > period / 2 {
        return Err(ForecastError::InvalidParameter(format!(
            "Fourier terms for period {period} need 1 <= K <= {}, got K = {harmonics}",
            period / 2
        )));
    }
    Ok(())
}

/// Design rows (intercept first) for observations `from..to` of `train`'s
/// time axis; indices past the end of `train` address forecast periods.
pub(crate) fn design_rows(
    predictors: &[Predictor],
    train: &TimeSeries,
    from: usize,
    to: usize,
) -> Result<Vec<Vec<f64>>> {
    let frequency = train.frequency();
    (from..to)
        .map(|t| {
            let period = train.period_at(t);
            let mut row = vec![1.0];
            for predictor in predictors {
                predictor.push_columns(t, period, frequency, &mut row)?;
            }
            Ok(row)
        })
        .collect()
}

/// Validate every predictor against the series frequency.
pub(crate) fn validate_predictors(predictors: &[Predictor], frequency: usize) -> Result<()> {
    predictors.iter().try_for_each(|p| p.validate(frequency))
}

/// Seasonal predictors need two full cycles of `train` per period.
pub(crate) fn require_seasonal_history(predictors: &[Predictor], train: &TimeSeries) -> Result<()> {
    predictors.iter().try_for_each(|p| match p {
        Predictor::SeasonalDummies => require_two_cycles(train, train.frequency()),
        Predictor::Fourier { period, .. } => require_two_cycles(train, *period),
        _ => Ok(()),
    })
}
