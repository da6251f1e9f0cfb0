//! Regression forecasters on typed predictors.
//!
//! Predictor roles are explicit values ([`Predictor`]) rather than model
//! formulas:
//! - [`LinearRegression`]: trend and seasonality regression by least squares
//! - [`HarmonicRegression`]: Fourier terms with optional ARIMA errors
//! - [`LogisticRegression`]: binary outcomes, fitted by IRLS

mod design;
mod harmonic;
mod linear;
pub mod logistic;

pub use design::{ExogenousRegressor, Predictor};
pub use harmonic::{HarmonicOptions, HarmonicRegression};
pub use linear::LinearRegression;
pub use logistic::{LogisticFit, LogisticRegression};
