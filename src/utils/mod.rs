//! Utility functions for forecasting models.

pub mod ols;
pub mod optimization;
pub mod stats;

#[cfg(test)]
pub(crate) mod testing;

pub use ols::{ols_fit, OlsFit};
pub use optimization::{nelder_mead, Minimum, OptimizerConfig};
pub use stats::{quantile_normal, z_for_level};
