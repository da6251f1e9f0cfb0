//! Exponential smoothing models.
//!
//! ETS (Error-Trend-Seasonal) state-space models covering simple
//! exponential smoothing, Holt's linear and damped trend methods and
//! Holt-Winters seasonal methods, with optional AICc-based automatic
//! selection of the components.

mod auto_ets;
mod ets;
mod model;
mod options;

pub use ets::{ErrorType, EtsParams, EtsSpec, SeasonalType, TrendType};
pub use model::{EtsSummary, ExponentialSmoothing};
pub use options::{EtsOptions, SmoothingLevel};
