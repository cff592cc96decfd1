//! Descriptive statistics per slate category

use serde::Serialize;

use super::attribute::Attribute;
use super::classifier::Category;
use super::dataset::AnalysisTable;

/// Count, moments and quartiles of a numeric sample
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DescriptiveStats {
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation (n - 1); undefined for a single value
    pub std: Option<f64>,
    pub min: f64,
    pub q25: f64,
    pub median: f64,
    pub q75: f64,
    pub max: f64,
}

/// Statistics of one attribute within one category
#[derive(Debug, Clone, Serialize)]
pub struct CategoryStats {
    pub category: Category,
    /// `None` when the category has no records
    pub stats: Option<DescriptiveStats>,
}

/// Summarize a sample. Returns `None` for an empty slice.
pub fn describe(values: &[f64]) -> Option<DescriptiveStats> {
    if values.is_empty() {
        return None;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let n = sorted.len();
    let mean = mean(&sorted);
    let std = sample_variance(&sorted).map(f64::sqrt);

    Some(DescriptiveStats {
        count: n,
        mean,
        std,
        min: sorted[0],
        q25: quantile_sorted(&sorted, 0.25),
        median: quantile_sorted(&sorted, 0.5),
        q75: quantile_sorted(&sorted, 0.75),
        max: sorted[n - 1],
    })
}

/// Per-category statistics of one attribute, in reporting order
pub fn describe_by_category(table: &AnalysisTable, attribute: Attribute) -> Vec<CategoryStats> {
    Category::ANALYZED
        .iter()
        .map(|&category| CategoryStats {
            category,
            stats: table
                .values_for(attribute, category)
                .and_then(|values| describe(&values)),
        })
        .collect()
}

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Unbiased sample variance; `None` with fewer than two values
pub fn sample_variance(values: &[f64]) -> Option<f64> {
    let n = values.len();
    if n < 2 {
        return None;
    }
    let m = mean(values);
    let ss: f64 = values.iter().map(|x| (x - m) * (x - m)).sum();
    Some(ss / (n - 1) as f64)
}

/// Quantile with linear interpolation between closest ranks.
///
/// `sorted` must be ascending and non-empty.
pub fn quantile_sorted(sorted: &[f64], q: f64) -> f64 {
    let n = sorted.len();
    if n == 1 {
        return sorted[0];
    }
    let pos = q.clamp(0.0, 1.0) * (n - 1) as f64;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    let frac = pos - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * frac
}
