//! Core data structures for period-indexed series and forecasts.

mod forecast;
mod period;
mod time_series;

pub use forecast::{Forecast, PredictionInterval};
pub use period::Period;
pub use time_series::TimeSeries;
