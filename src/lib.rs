//! # forecast-harness
//!
//! Hold-out evaluation of time series forecasting methods.
//!
//! A period-indexed [`TimeSeries`](core::TimeSeries) is split into a
//! training prefix and a validation suffix, a [`Forecaster`](models::Forecaster)
//! is fitted on the training part, and its forecasts are scored against
//! the held-out values. Every accuracy report says whether it is
//! in-sample or out-of-sample.
//!
//! Forecasters include the baseline methods, exponential smoothing (ETS),
//! ARIMA with automatic order selection, and linear, harmonic and
//! logistic regression.
//!
//! ```
//! use forecast_harness::prelude::*;
//! use forecast_harness::models::baseline::SeasonalNaive;
//!
//! let values: Vec<f64> = (0..36).map(|i| 100.0 + 10.0 * ((i % 12) as f64).sin()).collect();
//! let series = TimeSeries::new(Period::new(2019, 1), 12, values).unwrap();
//!
//! let split = partition(&series, 12).unwrap();
//! let forecast = SeasonalNaive::new().forecast(split.train(), split.horizon()).unwrap();
//! let report = AccuracyEvaluator::default().evaluate(&forecast, split.valid()).unwrap();
//!
//! assert_eq!(report.mode, EvaluationMode::OutOfSample);
//! assert!(report.rmse < 1e-9);
//! ```

#![allow(clippy::upper_case_acronyms)]
#![allow(clippy::too_many_arguments)]
#![allow(clippy::needless_range_loop)]

pub mod core;
pub mod error;
pub mod evaluation;
pub mod models;
pub mod transform;
pub mod utils;

pub use error::{ForecastError, Result};

pub mod prelude {
    pub use crate::core::{Forecast, Period, PredictionInterval, TimeSeries};
    pub use crate::error::{ForecastError, Result};
    pub use crate::evaluation::{
        partition, partition_at, AccuracyEvaluator, AccuracyReport, EvaluationMode, ForecastRunner,
        Partition,
    };
    pub use crate::models::{BoxedForecaster, Forecaster};
}
