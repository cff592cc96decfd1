//! Per-attribute analysis: descriptive statistics, significance test and
//! logistic model for each requested attribute

use serde::Serialize;

use super::attribute::Attribute;
use super::classifier::Category;
use super::dataset::AnalysisTable;
use super::logistic::{
    fit_logistic, probability_curve, CurvePoint, FitError, LogisticConfig, LogisticFit,
    DEFAULT_CURVE_POINTS,
};
use super::significance::{run_test, SignificanceTest, TestOutcome};
use super::stats::{describe_by_category, CategoryStats};
use super::target::TargetMapping;

/// Analysis settings shared by every attribute
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisOptions {
    pub test: SignificanceTest,
    pub model: LogisticConfig,
    pub curve_points: usize,
    pub target: TargetMapping,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            test: SignificanceTest::default(),
            model: LogisticConfig::default(),
            curve_points: DEFAULT_CURVE_POINTS,
            target: TargetMapping::default(),
        }
    }
}

/// Logistic model result for one attribute
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ModelOutcome {
    Fitted {
        fit: LogisticFit,
        #[serde(skip)]
        curve: Vec<CurvePoint>,
        /// Observed (predictor, 0/1 outcome) pairs the model was fitted on
        #[serde(skip)]
        observations: Vec<(f64, u8)>,
    },
    InsufficientData { error: FitError },
}

impl ModelOutcome {
    pub fn fit(&self) -> Option<&LogisticFit> {
        match self {
            ModelOutcome::Fitted { fit, .. } => Some(fit),
            ModelOutcome::InsufficientData { .. } => None,
        }
    }
}

/// Everything computed for one attribute
#[derive(Debug, Clone, Serialize)]
pub struct AttributeResult {
    pub attribute: Attribute,
    pub by_category: Vec<CategoryStats>,
    pub test: TestOutcome,
    pub model: ModelOutcome,
}

impl AttributeResult {
    /// Sum of per-category counts; equals the retained record count
    pub fn described_count(&self) -> usize {
        self.by_category
            .iter()
            .filter_map(|c| c.stats.as_ref().map(|s| s.count))
            .sum()
    }

    pub fn stats_for(&self, category: Category) -> Option<&CategoryStats> {
        self.by_category.iter().find(|c| c.category == category)
    }
}

/// Analyze one attribute of the table
pub fn analyze_attribute(
    table: &AnalysisTable,
    attribute: Attribute,
    options: &AnalysisOptions,
) -> AttributeResult {
    let by_category = describe_by_category(table, attribute);

    let left = table
        .values_for(attribute, Category::Left)
        .unwrap_or_default();
    let moderate = table
        .values_for(attribute, Category::Moderate)
        .unwrap_or_default();
    let test = run_test(options.test, &left, &moderate);

    let (x, y) = table
        .binary_target(attribute, &options.target)
        .unwrap_or_default();
    let model = match fit_logistic(&x, &y, &options.model) {
        Ok(fit) => {
            let curve = probability_curve(&fit, fit.x_min, fit.x_max, options.curve_points);
            ModelOutcome::Fitted {
                fit,
                curve,
                observations: x.into_iter().zip(y).collect(),
            }
        }
        Err(error) => ModelOutcome::InsufficientData { error },
    };

    AttributeResult {
        attribute,
        by_category,
        test,
        model,
    }
}

/// Analyze every attribute the table carries, in table order
pub fn run_analysis(table: &AnalysisTable, options: &AnalysisOptions) -> Vec<AttributeResult> {
    table
        .attributes
        .iter()
        .map(|&attribute| analyze_attribute(table, attribute, options))
        .collect()
}
