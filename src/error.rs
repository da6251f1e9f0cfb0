//! Error types for the forecast-harness library.

use crate::core::Period;
use thiserror::Error;

/// Result type alias for forecasting and evaluation operations.
pub type Result<T> = std::result::Result<T, ForecastError>;

/// Errors that can occur while partitioning, forecasting or scoring a series.
///
/// None of these are transient: a failed call returns no partial result and
/// the caller decides whether to abort or fall back to a baseline.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ForecastError {
    /// Input data is empty.
    #[error("empty input data")]
    EmptyData,

    /// Requested horizon or validation length is outside `1..length`.
    #[error("invalid horizon {horizon} for series of length {length}")]
    InvalidHorizon { horizon: usize, length: usize },

    /// Insufficient data points for the operation.
    #[error("insufficient data: need at least {needed}, got {got}")]
    InsufficientData { needed: usize, got: usize },

    /// Invalid parameter value.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// A numerical optimisation exhausted its iteration budget.
    #[error("{method} did not converge within {iterations} iterations")]
    NonConvergence { method: String, iterations: usize },

    /// Forecast and actual values differ in length or period alignment.
    #[error("misaligned series: {0}")]
    MisalignedSeries(String),

    /// A percentage metric hit a zero actual value.
    #[error("division by zero: actual value at index {index} is zero")]
    DivisionByZero { index: usize },

    /// Observed periods are not contiguous.
    #[error("non-contiguous periods: expected {expected}, got {got}")]
    NonContiguous { expected: Period, got: Period },
}

impl ForecastError {
    pub(crate) fn misaligned(reason: impl Into<String>) -> Self {
        Self::MisalignedSeries(reason.into())
    }

    pub(crate) fn non_convergence(method: impl Into<String>, iterations: usize) -> Self {
        Self::NonConvergence {
            method: method.into(),
            iterations,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages_are_descriptive() {
        let err = ForecastError::InvalidHorizon {
            horizon: 0,
            length: 24,
        };
        assert_eq!(err.to_string(), "invalid horizon 0 for series of length 24");

        let err = ForecastError::InsufficientData { needed: 24, got: 13 };
        assert_eq!(err.to_string(), "insufficient data: need at least 24, got 13");

        let err = ForecastError::non_convergence("ETS(A,N,N)", 50);
        assert_eq!(
            err.to_string(),
            "ETS(A,N,N) did not converge within 50 iterations"
        );

        let err = ForecastError::DivisionByZero { index: 3 };
        assert_eq!(
            err.to_string(),
            "division by zero: actual value at index 3 is zero"
        );

        let err = ForecastError::NonContiguous {
            expected: Period::new(2001, 3),
            got: Period::new(2001, 5),
        };
        assert_eq!(
            err.to_string(),
            "non-contiguous periods: expected 2001:3, got 2001:5"
        );
    }

    #[test]
    fn errors_are_clonable_and_comparable() {
        let err1 = ForecastError::misaligned("lengths differ");
        let err2 = err1.clone();
        assert_eq!(err1, err2);
    }
}
