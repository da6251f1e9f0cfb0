//! ARIMA and SARIMA (Autoregressive Integrated Moving Average) models.
//!
//! This module provides:
//! - [`ARIMA`], fitting a fixed `(p,d,q)(P,D,Q)[s]` order or searching
//!   orders automatically by AICc
//! - differencing helpers shared with the regression models

mod auto_arima;
mod diff;
mod model;
mod options;

pub use diff::{difference, seasonal_difference, suggest_differencing, suggest_seasonal_differencing};
pub use model::{ArimaCoefficients, ArimaSummary, ARIMA};
pub use options::{ArimaOptions, ArimaOrder, SearchBounds, SeasonalOrder};

pub(crate) use model::{fit_arima, ArimaFit, ArimaSpec};
