//! Series transformations.
//!
//! Every transform takes a [`TimeSeries`](crate::core::TimeSeries) and
//! returns a new one with its periods carried over.
//!
//! # Example
//!
//! ```
//! use forecast_harness::core::{Period, TimeSeries};
//! use forecast_harness::transform::{box_cox_auto, centred_moving_average};
//!
//! let series = TimeSeries::new(Period::new(2000, 1), 4, vec![2.0, 4.0, 3.0, 5.0, 6.0, 8.0, 7.0, 9.0]).unwrap();
//!
//! let trend = centred_moving_average(&series, 4).unwrap();
//! assert_eq!(trend.start(), Period::new(2000, 3));
//!
//! let bc = box_cox_auto(&series).unwrap();
//! assert!(bc.lambda >= -1.0 && bc.lambda <= 2.0);
//! ```

pub mod boxcox;
pub mod window;

pub use boxcox::{
    box_cox, box_cox_auto, box_cox_lambda, inverse_box_cox, inverse_forecast, BoxCoxResult,
};
pub use window::{centred_moving_average, trailing_moving_average};
