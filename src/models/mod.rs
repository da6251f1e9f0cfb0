//! Forecasting models.
//!
//! Every model implements [`Forecaster`]; configuration lives in the
//! model value and fitting happens inside each call.

mod traits;

pub mod arima;
pub mod baseline;
pub mod exponential;
pub mod regression;

pub use traits::{BoxedForecaster, Forecaster};
