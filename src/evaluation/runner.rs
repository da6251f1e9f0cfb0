//! Running a forecaster against a partition.

use crate::core::{Forecast, TimeSeries};
use crate::error::{ForecastError, Result};
use crate::evaluation::accuracy::{AccuracyEvaluator, AccuracyReport};
use crate::evaluation::partition::Partition;
use crate::models::Forecaster;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Forecast, out-of-sample and in-sample accuracy of one method.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Evaluation {
    /// Method name as reported by the forecast.
    pub method: String,
    pub forecast: Forecast,
    pub out_of_sample: AccuracyReport,
    /// In-sample accuracy, or why it could not be computed (a zero in the
    /// training data under MAPE, or no fitted values at all).
    #[serde(serialize_with = "serialize_result")]
    pub in_sample: Result<AccuracyReport>,
}

/// Serialize a result as its value, or as the error message.
pub(crate) fn serialize_result<T: Serialize, S: serde::Serializer>(
    result: &Result<T>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    match result {
        Ok(value) => value.serialize(serializer),
        Err(err) => serializer.serialize_str(&err.to_string()),
    }
}

/// Wraps any [`Forecaster`] and checks what it returns.
///
/// A forecaster that returns the wrong number of points, or points that do
/// not start right after the training data, is reported as
/// [`ForecastError::MisalignedSeries`] rather than scored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastRunner {
    /// Interval levels requested from every forecaster.
    pub levels: Vec<f64>,
    pub evaluator: AccuracyEvaluator,
    /// Also report MASE against the training data.
    pub scaled: bool,
}

impl Default for ForecastRunner {
    fn default() -> Self {
        Self {
            levels: vec![0.8, 0.95],
            evaluator: AccuracyEvaluator::default(),
            scaled: false,
        }
    }
}

impl ForecastRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the interval levels; an empty slice means point forecasts only.
    pub fn with_levels(mut self, levels: &[f64]) -> Self {
        self.levels = levels.to_vec();
        self
    }

    pub fn with_evaluator(mut self, evaluator: AccuracyEvaluator) -> Self {
        self.evaluator = evaluator;
        self
    }

    /// Include MASE in out-of-sample reports.
    pub fn with_mase(mut self, scaled: bool) -> Self {
        self.scaled = scaled;
        self
    }

    /// Forecast `horizon` periods after `train` and verify the result.
    pub fn run(&self, model: &dyn Forecaster, train: &TimeSeries, horizon: usize) -> Result<Forecast> {
        if horizon == 0 {
            return Err(ForecastError::InvalidHorizon {
                horizon,
                length: train.len(),
            });
        }
        let forecast = if self.levels.is_empty() {
            model.forecast(train, horizon)?
        } else {
            model.forecast_with_intervals(train, horizon, &self.levels)?
        };
        Self::verify(model, train, horizon, forecast)
    }

    fn verify(model: &dyn Forecaster, train: &TimeSeries, horizon: usize, forecast: Forecast) -> Result<Forecast> {
        if forecast.horizon() != horizon {
            return Err(ForecastError::misaligned(format!(
                "{} returned {} points for horizon {horizon}",
                model.name(),
                forecast.horizon()
            )));
        }
        if forecast.frequency() != train.frequency() || forecast.start() != train.next_period() {
            return Err(ForecastError::misaligned(format!(
                "{} forecast starts at {} (frequency {}), expected {} (frequency {})",
                model.name(),
                forecast.start(),
                forecast.frequency(),
                train.next_period(),
                train.frequency()
            )));
        }
        Ok(forecast)
    }

    /// Forecast the validation window of `partition` and score both the
    /// forecast and the in-sample fit.
    ///
    /// The forecast and the fitted values come from a single fit. Only the
    /// out-of-sample score decides success; an in-sample failure is kept
    /// in [`Evaluation::in_sample`].
    pub fn evaluate(&self, model: &dyn Forecaster, partition: &Partition) -> Result<Evaluation> {
        let train = partition.train();
        let valid = partition.valid();
        let horizon = partition.horizon();

        let (forecast, fitted) = model.forecast_and_fitted(train, horizon, &self.levels)?;
        let forecast = Self::verify(model, train, horizon, forecast)?;
        let out_of_sample = if self.scaled {
            self.evaluator.evaluate_scaled(&forecast, valid, train)?
        } else {
            self.evaluator.evaluate(&forecast, valid)?
        };
        let in_sample = fitted.and_then(|fitted| self.evaluator.evaluate_fit(&fitted, train));

        match &in_sample {
            Ok(report) => debug!(
                method = forecast.method(),
                rmse = out_of_sample.rmse,
                mae = out_of_sample.mae,
                in_sample_rmse = report.rmse,
                "evaluated forecaster"
            ),
            Err(err) => warn!(
                method = forecast.method(),
                rmse = out_of_sample.rmse,
                error = %err,
                "in-sample accuracy unavailable"
            ),
        }

        Ok(Evaluation {
            method: forecast.method().to_string(),
            forecast,
            out_of_sample,
            in_sample,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Period;
    use crate::evaluation::{partition, EvaluationMode};
    use crate::models::baseline::{Naive, SeasonalNaive};

    /// Returns one point too few, starting a period late.
    struct Broken;

    impl Forecaster for Broken {
        fn name(&self) -> &str {
            "Broken"
        }

        fn forecast(&self, train: &TimeSeries, horizon: usize) -> Result<Forecast> {
            let start = train.next_period().advance(1, train.frequency());
            Forecast::new("Broken", start, train.frequency(), vec![0.0; horizon])
        }

        fn fitted(&self, train: &TimeSeries) -> Result<TimeSeries> {
            Ok(train.clone())
        }
    }

    struct Short;

    /// Fitted values only come out of the combined call.
    struct SingleFit;

    impl Forecaster for SingleFit {
        fn name(&self) -> &str {
            "SingleFit"
        }

        fn forecast(&self, train: &TimeSeries, horizon: usize) -> Result<Forecast> {
            Ok(Forecast::following(train, "SingleFit", vec![0.0; horizon]))
        }

        fn fitted(&self, _train: &TimeSeries) -> Result<TimeSeries> {
            Err(ForecastError::InvalidParameter("fitted called separately".to_string()))
        }

        fn forecast_and_fitted(
            &self,
            train: &TimeSeries,
            horizon: usize,
            levels: &[f64],
        ) -> Result<(Forecast, Result<TimeSeries>)> {
            let forecast = self.forecast_with_intervals(train, horizon, levels)?;
            Ok((forecast, Ok(train.clone())))
        }
    }

    impl Forecaster for Short {
        fn name(&self) -> &str {
            "Short"
        }

        fn forecast(&self, train: &TimeSeries, horizon: usize) -> Result<Forecast> {
            Ok(Forecast::following(train, "Short", vec![0.0; horizon - 1]))
        }

        fn fitted(&self, train: &TimeSeries) -> Result<TimeSeries> {
            Ok(train.clone())
        }
    }

    fn quarterly() -> TimeSeries {
        let pattern = [10.0, 14.0, 8.0, 12.0];
        TimeSeries::new(
            Period::new(2010, 1),
            4,
            (0..20).map(|i| pattern[i % 4] + i as f64).collect(),
        )
        .unwrap()
    }

    #[test]
    fn run_checks_horizon() {
        let runner = ForecastRunner::new();
        let train = quarterly();
        assert!(matches!(
            runner.run(&Naive::new(), &train, 0),
            Err(ForecastError::InvalidHorizon { horizon: 0, length: 20 })
        ));
        let fc = runner.run(&Naive::new(), &train, 5).unwrap();
        assert_eq!(fc.horizon(), 5);
        assert_eq!(fc.intervals().len(), 2);
    }

    #[test]
    fn contract_breaches_are_misaligned() {
        let runner = ForecastRunner::new().with_levels(&[]);
        let train = quarterly();
        assert!(matches!(
            runner.run(&Broken, &train, 3),
            Err(ForecastError::MisalignedSeries(_))
        ));
        assert!(matches!(
            runner.run(&Short, &train, 3),
            Err(ForecastError::MisalignedSeries(_))
        ));
    }

    #[test]
    fn evaluate_tags_both_reports() {
        let split = partition(&quarterly(), 4).unwrap();
        let eval = ForecastRunner::new()
            .with_mase(true)
            .evaluate(&SeasonalNaive::new(), &split)
            .unwrap();

        assert_eq!(eval.method, "SeasonalNaive");
        assert_eq!(eval.out_of_sample.mode, EvaluationMode::OutOfSample);
        let in_sample = eval.in_sample.as_ref().unwrap();
        assert_eq!(in_sample.mode, EvaluationMode::InSample);
        assert_eq!(eval.out_of_sample.n, 4);
        // The seasonal pattern repeats, only the +1 per period trend is missed
        assert!((eval.out_of_sample.mae - 4.0).abs() < 1e-12);
        assert!((in_sample.mae - 4.0).abs() < 1e-12);
        assert!((eval.out_of_sample.mase.unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn runner_config_from_json() {
        let runner: ForecastRunner = serde_json::from_str(r#"{"levels": [0.9], "scaled": true}"#).unwrap();
        assert_eq!(runner.levels, vec![0.9]);
        assert!(runner.scaled);
        assert_eq!(runner.evaluator, AccuracyEvaluator::default());
    }

    #[test]
    fn zero_in_training_data_keeps_the_forecast_score() {
        let series = TimeSeries::new(Period::new(2001, 1), 4, vec![3.0, 0.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0]).unwrap();
        let split = partition(&series, 2).unwrap();
        let eval = ForecastRunner::new().evaluate(&Naive::new(), &split).unwrap();

        assert_eq!(eval.out_of_sample.n, 2);
        assert!((eval.out_of_sample.mae - 1.5).abs() < 1e-12);
        assert!(matches!(eval.in_sample, Err(ForecastError::DivisionByZero { .. })));

        let json = serde_json::to_value(&eval).unwrap();
        assert!(json["in_sample"].is_string());
        assert_eq!(json["out_of_sample"]["mode"], "OutOfSample");
    }

    #[test]
    fn one_season_of_training_data_has_no_in_sample_score() {
        let series = TimeSeries::new(Period::new(2001, 1), 4, vec![10.0, 14.0, 8.0, 12.0, 11.0, 15.0]).unwrap();
        let split = partition(&series, 2).unwrap();
        let eval = ForecastRunner::new().evaluate(&SeasonalNaive::new(), &split).unwrap();

        assert_eq!(eval.forecast.point(), &[10.0, 14.0]);
        assert!((eval.out_of_sample.mae - 1.0).abs() < 1e-12);
        assert!(matches!(eval.in_sample, Err(ForecastError::EmptyData)));
    }

    #[test]
    fn evaluate_fits_once() {
        let split = partition(&quarterly(), 4).unwrap();
        let eval = ForecastRunner::new().evaluate(&SingleFit, &split).unwrap();
        let in_sample = eval.in_sample.unwrap();
        assert_eq!(in_sample.n, 16);
        assert!(in_sample.mae.abs() < 1e-12);
    }
}
