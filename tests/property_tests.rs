//! Property-based tests for partitioning, forecasting and evaluation.
//!
//! These check invariants that should hold for every valid input, using
//! randomly generated series.

use forecast_harness::core::{Period, TimeSeries};
use forecast_harness::evaluation::{
    compare, partition, rolling_origin, AccuracyEvaluator, EvaluationMode, ForecastRunner,
    RollingConfig,
};
use forecast_harness::models::baseline::{Drift, Naive, SeasonalNaive};
use forecast_harness::models::{BoxedForecaster, Forecaster};
use proptest::prelude::*;

/// Strategy for a start period at the given frequency.
fn period_strategy(frequency: usize) -> impl Strategy<Value = Period> {
    (1950..2030i32, 1..=frequency as u32).prop_map(|(cycle, season)| Period::new(cycle, season))
}

/// Strategy for positive values with a little drift so the variance is non-zero.
fn values_strategy(min_len: usize, max_len: usize) -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(1.0..1000.0_f64, min_len..max_len).prop_map(|mut v| {
        for (i, x) in v.iter_mut().enumerate() {
            *x += i as f64 * 0.001;
        }
        v
    })
}

fn series_strategy(min_len: usize, max_len: usize) -> impl Strategy<Value = TimeSeries> {
    prop_oneof![Just(1usize), Just(4usize), Just(12usize)]
        .prop_flat_map(move |frequency| {
            (Just(frequency), period_strategy(frequency), values_strategy(min_len, max_len))
        })
        .prop_map(|(frequency, start, values)| TimeSeries::new(start, frequency, values).unwrap())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn partition_has_no_overlap_and_no_gap(
        series in series_strategy(2, 80),
        fraction in 0.01..0.99_f64,
    ) {
        let n = series.len();
        let h = ((n as f64 * fraction) as usize).clamp(1, n - 1);
        let split = partition(&series, h).unwrap();

        prop_assert_eq!(split.valid().len(), h);
        prop_assert_eq!(split.train().len() + h, n);
        prop_assert_eq!(split.train().next_period(), split.valid().start());
        prop_assert_eq!(split.rejoin().unwrap(), series);
    }

    #[test]
    fn invalid_validation_lengths_are_rejected(series in series_strategy(1, 40)) {
        prop_assert!(partition(&series, 0).is_err());
        prop_assert!(partition(&series, series.len()).is_err());
        prop_assert!(partition(&series, series.len() + 1).is_err());
    }

    #[test]
    fn forecasts_follow_training_data(
        series in series_strategy(30, 80),
        horizon in 1usize..24,
    ) {
        let models: Vec<BoxedForecaster> = vec![
            Box::new(Naive::new()),
            Box::new(SeasonalNaive::new()),
            Box::new(Drift::new()),
        ];
        for model in &models {
            let fc = model.forecast(&series, horizon).unwrap();
            prop_assert_eq!(fc.horizon(), horizon);
            prop_assert_eq!(fc.start(), series.next_period());
            prop_assert_eq!(fc.frequency(), series.frequency());
        }
    }

    #[test]
    fn naive_repeats_last_value(series in series_strategy(1, 60), horizon in 1usize..30) {
        let last = *series.values().last().unwrap();
        let fc = Naive::new().forecast(&series, horizon).unwrap();
        prop_assert!(fc.point().iter().all(|&x| x == last));
    }

    #[test]
    fn seasonal_naive_repeats_last_cycle(series in series_strategy(12, 60), horizon in 1usize..40) {
        let m = series.frequency();
        let n = series.len();
        let fc = SeasonalNaive::new().forecast(&series, horizon).unwrap();
        for (i, &x) in fc.point().iter().enumerate() {
            prop_assert_eq!(x, series.values()[n - m + i % m]);
        }
    }

    #[test]
    fn perfect_forecast_scores_zero(series in series_strategy(2, 40)) {
        let split = partition(&series, 1).unwrap();
        let forecast = forecast_harness::core::Forecast::new(
            "oracle",
            split.valid().start(),
            split.valid().frequency(),
            split.valid().values().to_vec(),
        ).unwrap();
        let report = AccuracyEvaluator::default().evaluate(&forecast, split.valid()).unwrap();
        prop_assert_eq!(report.mode, EvaluationMode::OutOfSample);
        prop_assert_eq!(report.rmse, 0.0);
        prop_assert_eq!(report.mape, 0.0);
    }

    #[test]
    fn rolling_folds_never_see_their_test_data(
        series in series_strategy(20, 60),
        initial in 5usize..15,
        horizon in 1usize..5,
        step in 1usize..4,
        sliding in any::<bool>(),
    ) {
        let config = if sliding {
            RollingConfig::sliding(initial, horizon)
        } else {
            RollingConfig::expanding(initial, horizon)
        }
        .with_step(step);
        let summary = rolling_origin(&series, &Naive::new(), &config).unwrap();

        prop_assert!(!summary.folds.is_empty());
        for fold in &summary.folds {
            let train_end = fold.train_start.advance(fold.train_len as i64, series.frequency());
            prop_assert_eq!(train_end, fold.origin);
            prop_assert_eq!(fold.report.n, horizon);
        }
    }

    #[test]
    fn comparison_preserves_order(series in series_strategy(30, 60), reversed in any::<bool>()) {
        let split = partition(&series, 6).unwrap();
        let mut models: Vec<BoxedForecaster> = vec![
            Box::new(Naive::new()),
            Box::new(Drift::new()),
            Box::new(SeasonalNaive::new()),
        ];
        if reversed {
            models.reverse();
        }
        let expected: Vec<String> = models.iter().map(|m| m.name().to_string()).collect();
        let results = compare(&split, &models, &ForecastRunner::new());
        let names: Vec<String> = results.into_iter().map(|c| c.method).collect();
        prop_assert_eq!(names, expected);
    }
}
