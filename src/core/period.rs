//! Period index for equally spaced series.

use crate::error::{ForecastError, Result};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A position on a regular calendar: a cycle (usually a year) and a
/// 1-based season within that cycle.
///
/// A period only has meaning together with a frequency (seasons per
/// cycle), which is why the arithmetic methods take it as an argument.
///
/// # Example
/// ```
/// use forecast_harness::core::Period;
///
/// let march = Period::new(2005, 3);
/// assert_eq!(march.advance(10, 12), Period::new(2006, 1));
/// assert_eq!(march.steps_until(Period::new(2006, 1), 12), 10);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Period {
    cycle: i32,
    season: u32,
}

impl Period {
    /// Create a period. `season` is 1-based.
    pub fn new(cycle: i32, season: u32) -> Self {
        Self { cycle, season }
    }

    /// The cycle (for monthly or quarterly data, the year).
    pub fn cycle(&self) -> i32 {
        self.cycle
    }

    /// The 1-based season within the cycle.
    pub fn season(&self) -> u32 {
        self.season
    }

    /// Check that the season fits the given frequency.
    pub fn validate(&self, frequency: usize) -> Result<()> {
        if frequency == 0 {
            return Err(ForecastError::InvalidParameter(
                "frequency must be at least 1".to_string(),
            ));
        }
        if self.season == 0 || self.season as usize > frequency {
            return Err(ForecastError::InvalidParameter(format!(
                "season {} is outside 1..={} for period {}",
                self.season, frequency, self
            )));
        }
        Ok(())
    }

    /// Number of steps since cycle 0, season 1.
    pub fn ordinal(&self, frequency: usize) -> i64 {
        self.cycle as i64 * frequency as i64 + (self.season as i64 - 1)
    }

    /// Inverse of [`Period::ordinal`].
    pub fn from_ordinal(ordinal: i64, frequency: usize) -> Self {
        let f = frequency.max(1) as i64;
        Self {
            cycle: ordinal.div_euclid(f) as i32,
            season: (ordinal.rem_euclid(f) + 1) as u32,
        }
    }

    /// Move `steps` periods forward (negative moves backward).
    pub fn advance(&self, steps: i64, frequency: usize) -> Self {
        Self::from_ordinal(self.ordinal(frequency) + steps, frequency)
    }

    /// Signed number of steps from `self` to `other`.
    pub fn steps_until(&self, other: Period, frequency: usize) -> i64 {
        other.ordinal(frequency) - self.ordinal(frequency)
    }

    /// Decimal time, `cycle + (season - 1) / frequency`.
    pub fn decimal_time(&self, frequency: usize) -> f64 {
        self.cycle as f64 + (self.season as f64 - 1.0) / frequency.max(1) as f64
    }

    /// Period containing a calendar date, for yearly, quarterly and monthly data.
    pub fn from_date(date: NaiveDate, frequency: usize) -> Result<Self> {
        let season = match frequency {
            1 => 1,
            4 => (date.month0() / 3) + 1,
            12 => date.month(),
            other => {
                return Err(ForecastError::InvalidParameter(format!(
                    "no calendar mapping for frequency {other}"
                )))
            }
        };
        Ok(Self::new(date.year(), season))
    }

    /// First calendar day of the period, for yearly, quarterly and monthly data.
    pub fn start_date(&self, frequency: usize) -> Result<NaiveDate> {
        self.validate(frequency)?;
        let month = match frequency {
            1 => 1,
            4 => (self.season - 1) * 3 + 1,
            12 => self.season,
            other => {
                return Err(ForecastError::InvalidParameter(format!(
                    "no calendar mapping for frequency {other}"
                )))
            }
        };
        NaiveDate::from_ymd_opt(self.cycle, month, 1).ok_or_else(|| {
            ForecastError::InvalidParameter(format!("period {self} has no calendar date"))
        })
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.cycle, self.season)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn period_advances_across_cycle_boundaries() {
        let p = Period::new(1991, 11);
        assert_eq!(p.advance(1, 12), Period::new(1991, 12));
        assert_eq!(p.advance(2, 12), Period::new(1992, 1));
        assert_eq!(p.advance(-11, 12), Period::new(1990, 12));
        assert_eq!(p.advance(0, 12), p);
    }

    #[test]
    fn period_ordinal_round_trips() {
        for ordinal in [-13_i64, -1, 0, 1, 11, 12, 24_000] {
            let p = Period::from_ordinal(ordinal, 12);
            assert_eq!(p.ordinal(12), ordinal);
        }
        assert_eq!(Period::from_ordinal(-1, 4), Period::new(-1, 4));
    }

    #[test]
    fn period_steps_until_is_signed() {
        let a = Period::new(2000, 2);
        let b = Period::new(2001, 1);
        assert_eq!(a.steps_until(b, 4), 3);
        assert_eq!(b.steps_until(a, 4), -3);
    }

    #[test]
    fn period_decimal_time_matches_fraction_of_cycle() {
        assert_relative_eq!(Period::new(2004, 7).decimal_time(12), 2004.5, epsilon = 1e-12);
        assert_relative_eq!(Period::new(1, 1).decimal_time(7), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn period_validates_season() {
        assert!(Period::new(2000, 12).validate(12).is_ok());
        assert!(Period::new(2000, 13).validate(12).is_err());
        assert!(Period::new(2000, 0).validate(12).is_err());
        assert!(Period::new(2000, 1).validate(0).is_err());
    }

    #[test]
    fn period_maps_to_and_from_calendar_dates() {
        let date = NaiveDate::from_ymd_opt(2012, 8, 17).unwrap();
        assert_eq!(Period::from_date(date, 12).unwrap(), Period::new(2012, 8));
        assert_eq!(Period::from_date(date, 4).unwrap(), Period::new(2012, 3));
        assert_eq!(Period::from_date(date, 1).unwrap(), Period::new(2012, 1));
        assert!(Period::from_date(date, 7).is_err());

        assert_eq!(
            Period::new(2012, 3).start_date(4).unwrap(),
            NaiveDate::from_ymd_opt(2012, 7, 1).unwrap()
        );
    }
}
