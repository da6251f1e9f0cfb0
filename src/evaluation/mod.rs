//! Hold-out evaluation: partitioning, running forecasters and scoring them.
//!
//! ```
//! use forecast_harness::core::{Period, TimeSeries};
//! use forecast_harness::evaluation::{partition, EvaluationMode, ForecastRunner};
//! use forecast_harness::models::baseline::Naive;
//!
//! let series = TimeSeries::new(Period::new(2010, 1), 4, (1..=16).map(f64::from).collect()).unwrap();
//! let split = partition(&series, 4).unwrap();
//!
//! let eval = ForecastRunner::new().evaluate(&Naive::new(), &split).unwrap();
//! assert_eq!(eval.out_of_sample.mode, EvaluationMode::OutOfSample);
//! assert_eq!(eval.out_of_sample.n, 4);
//! ```

pub mod accuracy;
pub mod classification;
pub mod compare;
pub mod partition;
pub mod rolling;
pub mod runner;

pub use accuracy::{AccuracyEvaluator, AccuracyReport, EvaluationMode, ZeroActualPolicy};
pub use classification::{classify, ClassificationReport, ConfusionMatrix};
pub use compare::{best_by, compare, Comparison};
pub use partition::{partition, partition_at, Partition};
pub use rolling::{rolling_origin, RollingConfig, RollingFold, RollingSummary, WindowKind};
pub use runner::{Evaluation, ForecastRunner};
