//! Pipeline module - load, classify, join, test and model

pub mod analysis;
pub mod attribute;
pub mod chapters;
pub mod classifier;
pub mod columns;
pub mod dataset;
pub mod density;
pub mod distributions;
pub mod loader;
pub mod logistic;
pub mod significance;
pub mod stats;
pub mod target;

pub use analysis::*;
pub use attribute::Attribute;
pub use chapters::*;
pub use classifier::*;
pub use columns::*;
pub use dataset::*;
pub use loader::*;
pub use logistic::{fit_logistic, probability_curve, FitError, LogisticConfig, LogisticFit};
pub use significance::{run_test, PValueMethod, SignificanceTest, TestOutcome};
pub use stats::{describe, describe_by_category, CategoryStats, DescriptiveStats};
pub use target::*;
