//! Evaluating several methods on the same partition.

use crate::error::Result;
use crate::evaluation::partition::Partition;
use crate::evaluation::runner::{serialize_result, Evaluation, ForecastRunner};
use crate::models::BoxedForecaster;
use rayon::prelude::*;
use serde::Serialize;
use std::cmp::Ordering;
use tracing::warn;

/// Outcome of one method in a [`compare`] run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Comparison {
    /// The forecaster's name.
    pub method: String,
    #[serde(serialize_with = "serialize_result")]
    pub result: Result<Evaluation>,
}

/// Evaluate every model on `partition` in parallel.
///
/// Results come back in the order of `models`; a failing method yields an
/// `Err` in its slot and does not affect the others.
pub fn compare(
    partition: &Partition,
    models: &[BoxedForecaster],
    runner: &ForecastRunner,
) -> Vec<Comparison> {
    models
        .par_iter()
        .map(|model| {
            let result = runner.evaluate(model.as_ref(), partition);
            if let Err(err) = &result {
                warn!(method = model.name(), error = %err, "method failed during comparison");
            }
            Comparison {
                method: model.name().to_string(),
                result,
            }
        })
        .collect()
}

/// The successful comparison with the smallest out-of-sample `metric`.
///
/// Metric names are those of
/// [`AccuracyReport::metrics`](crate::evaluation::AccuracyReport::metrics);
/// NaN values never win.
pub fn best_by<'a>(comparisons: &'a [Comparison], metric: &str) -> Option<&'a Comparison> {
    comparisons
        .iter()
        .filter_map(|c| {
            let value = c.result.as_ref().ok()?.out_of_sample.metric(metric)?;
            (!value.is_nan()).then_some((c, value.abs()))
        })
        .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal))
        .map(|(c, _)| c)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Period, TimeSeries};
    use crate::error::ForecastError;
    use crate::evaluation::partition;
    use crate::models::baseline::{Drift, Naive, SeasonalNaive};

    fn trending_quarterly() -> TimeSeries {
        TimeSeries::new(Period::new(2015, 1), 4, (0..24).map(|i| 50.0 + 2.0 * i as f64).collect())
            .unwrap()
    }

    #[test]
    fn results_keep_input_order() {
        let split = partition(&trending_quarterly(), 4).unwrap();
        let models: Vec<BoxedForecaster> = vec![
            Box::new(SeasonalNaive::new()),
            Box::new(Naive::new()),
            Box::new(Drift::new()),
        ];
        let results = compare(&split, &models, &ForecastRunner::new());

        let names: Vec<&str> = results.iter().map(|c| c.method.as_str()).collect();
        assert_eq!(names, vec!["SeasonalNaive", "Naive", "Drift"]);
        assert!(results.iter().all(|c| c.result.is_ok()));

        let best = best_by(&results, "RMSE").unwrap();
        assert_eq!(best.method, "Drift");
    }

    #[test]
    fn failure_is_isolated() {
        // Three training points, less than one season
        let short = TimeSeries::new(Period::new(2015, 1), 4, vec![1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
        let split = partition(&short, 2).unwrap();
        let models: Vec<BoxedForecaster> = vec![Box::new(Naive::new()), Box::new(SeasonalNaive::new())];
        let results = compare(&split, &models, &ForecastRunner::new());

        assert!(results[0].result.is_ok());
        assert!(matches!(
            results[1].result,
            Err(ForecastError::InsufficientData { needed: 4, got: 3 })
        ));
        assert_eq!(best_by(&results, "MAE").unwrap().method, "Naive");
    }

    #[test]
    fn in_sample_failure_does_not_fail_the_method() {
        let series = TimeSeries::new(Period::new(2015, 1), 4, vec![3.0, 0.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0]).unwrap();
        let split = partition(&series, 2).unwrap();
        let models: Vec<BoxedForecaster> = vec![Box::new(Naive::new())];
        let results = compare(&split, &models, &ForecastRunner::new());

        let eval = results[0].result.as_ref().unwrap();
        assert!(eval.in_sample.is_err());
        assert_eq!(best_by(&results, "MAE").unwrap().method, "Naive");
    }

    #[test]
    fn comparisons_serialize() {
        let short = TimeSeries::new(Period::new(2015, 1), 4, vec![1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
        let split = partition(&short, 2).unwrap();
        let models: Vec<BoxedForecaster> = vec![Box::new(SeasonalNaive::new())];
        let json = serde_json::to_value(compare(&split, &models, &ForecastRunner::new())).unwrap();
        assert_eq!(
            json[0]["result"],
            "insufficient data: need at least 4, got 3"
        );
    }
}
