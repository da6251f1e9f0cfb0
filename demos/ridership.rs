//! Hold-out comparison of forecasting methods on a monthly ridership-style series.
//!
//! Run with: cargo run --example ridership
//! Set `RUST_LOG=forecast_harness=debug` to see the fitted models.

use forecast_harness::core::{Period, TimeSeries};
use forecast_harness::evaluation::{best_by, compare, partition_at, rolling_origin, ForecastRunner, RollingConfig};
use forecast_harness::models::arima::{ArimaOrder, ARIMA};
use forecast_harness::models::baseline::{Drift, MovingAverage, Naive, SeasonalNaive};
use forecast_harness::models::exponential::ExponentialSmoothing;
use forecast_harness::models::regression::{HarmonicOptions, HarmonicRegression, LinearRegression};
use forecast_harness::models::BoxedForecaster;
use forecast_harness::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Thirteen years of monthly data: a slow U-shaped trend, an annual
/// cycle and a little irregular variation.
fn ridership() -> Result<TimeSeries> {
    let season = [-60.0, -90.0, 20.0, 15.0, 40.0, 10.0, 60.0, 80.0, -20.0, 30.0, -15.0, -70.0];
    let values = (0..159)
        .map(|i| {
            let t = i as f64 / 159.0;
            1800.0 - 400.0 * t + 450.0 * t * t + season[i % 12] + 25.0 * ((i * 37 % 17) as f64 / 17.0 - 0.5)
        })
        .collect();
    TimeSeries::new(Period::new(1991, 1), 12, values)
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "forecast_harness=info".into()),
        )
        .init();

    let series = ridership()?;
    let split = partition_at(&series, Period::new(2001, 4))?;
    println!(
        "training from {}, validation from {} ({} training obs, {} held out)",
        split.train().start(),
        split.valid().start(),
        split.train().len(),
        split.horizon()
    );

    let models: Vec<BoxedForecaster> = vec![
        Box::new(Naive::new()),
        Box::new(SeasonalNaive::new()),
        Box::new(Drift::new()),
        Box::new(MovingAverage::new(12)),
        Box::new(LinearRegression::trend_season()),
        Box::new(ExponentialSmoothing::auto()),
        Box::new(ARIMA::auto()),
        Box::new(HarmonicRegression::new(
            HarmonicOptions::default()
                .with_fourier(12, 4)
                .with_trend()
                .with_arima_errors(ArimaOrder::new(1, 0, 0)),
        )),
    ];

    let runner = ForecastRunner::new().with_mase(true);
    let results = compare(&split, &models, &runner);

    println!("\n{:<48} {:>10} {:>10} {:>8} {:>8}", "method", "RMSE", "MAE", "MAPE", "MASE");
    for comparison in &results {
        match &comparison.result {
            Ok(eval) => {
                let oos = &eval.out_of_sample;
                println!(
                    "{:<48} {:>10.2} {:>10.2} {:>8.2} {:>8.3}",
                    eval.method,
                    oos.rmse,
                    oos.mae,
                    oos.mape,
                    oos.mase.unwrap_or(f64::NAN)
                );
            }
            Err(err) => println!("{:<48} failed: {err}", comparison.method),
        }
    }

    if let Some(best) = best_by(&results, "RMSE") {
        println!("\nlowest validation RMSE: {}", best.method);
    }

    let config = RollingConfig::expanding(96, 12).with_step(12);
    let summary = rolling_origin(&series, &SeasonalNaive::new(), &config)?;
    println!(
        "\nseasonal naive over {} rolling origins: MAE {:.2} (sd {:.2}), RMSE {:.2} (sd {:.2})",
        summary.folds.len(),
        summary.mean_mae,
        summary.sd_mae,
        summary.mean_rmse,
        summary.sd_rmse
    );

    Ok(())
}
