//! Trailing and centred moving averages.
//!
//! Both return a shorter series whose periods are those of the window
//! position the average is reported at; no NaN padding.

use crate::core::TimeSeries;
use crate::error::{ForecastError, Result};

fn check_window(series: &TimeSeries, window: usize, needed: usize) -> Result<()> {
    if window == 0 {
        return Err(ForecastError::InvalidParameter(
            "moving average window must be at least 1".to_string(),
        ));
    }
    if series.len() < needed {
        return Err(ForecastError::InsufficientData {
            needed,
            got: series.len(),
        });
    }
    Ok(())
}

/// Mean of the last `window` observations, reported at the window's end.
///
/// The result starts `window - 1` periods after `series`.
///
/// # Example
/// ```
/// use forecast_harness::core::{Period, TimeSeries};
/// use forecast_harness::transform::trailing_moving_average;
///
/// let series = TimeSeries::new(Period::new(2020, 1), 4, vec![1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
/// let ma = trailing_moving_average(&series, 3).unwrap();
/// assert_eq!(ma.values(), &[2.0, 3.0, 4.0]);
/// assert_eq!(ma.start(), Period::new(2020, 3));
/// ```
pub fn trailing_moving_average(series: &TimeSeries, window: usize) -> Result<TimeSeries> {
    check_window(series, window, window)?;
    let values = series.values();

    let mut sum: f64 = values[..window].iter().sum();
    let mut averages = Vec::with_capacity(values.len() - window + 1);
    averages.push(sum / window as f64);
    for t in window..values.len() {
        sum += values[t] - values[t - window];
        averages.push(sum / window as f64);
    }

    series.slice(window - 1, series.len())?.with_values(averages)
}

/// Centred moving average.
///
/// Odd windows average `window` observations around each point. Even
/// windows use the `2 x window` average (half weight on the two end
/// points), so the result stays centred on a period.
pub fn centred_moving_average(series: &TimeSeries, window: usize) -> Result<TimeSeries> {
    let weights = centred_weights(window);
    check_window(series, window, weights.len())?;
    let values = series.values();
    let half = weights.len() / 2;

    let averages: Vec<f64> = values
        .windows(weights.len())
        .map(|w| w.iter().zip(&weights).map(|(v, k)| v * k).sum())
        .collect();

    series.slice(half, series.len() - half)?.with_values(averages)
}

fn centred_weights(window: usize) -> Vec<f64> {
    if window == 0 {
        return Vec::new();
    }
    let m = window as f64;
    if window % 2 == 1 {
        vec![1.0 / m; window]
    } else {
        let mut weights = vec![1.0 / m; window + 1];
        weights[0] = 0.5 / m;
        weights[window] = 0.5 / m;
        weights
    }
}
