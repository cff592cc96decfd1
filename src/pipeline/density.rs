//! Chapter-size distribution estimates: Gaussian KDE, empirical CDF and
//! density histograms

use std::f64::consts::PI;

use super::logistic::linspace;
use super::stats::{quantile_sorted, sample_variance};

/// Bandwidth factor of the smoothed CDF
pub const SMOOTHED_CDF_FACTOR: f64 = 0.15;

/// Grid resolution of the smoothed CDF
pub const SMOOTHED_CDF_POINTS: usize = 1000;

/// Grid resolution of the KDE density line
pub const DENSITY_POINTS: usize = 200;

/// How the kernel bandwidth factor is chosen
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Bandwidth {
    /// `n^(-1/5)`
    Scott,
    /// Fixed multiple of the sample standard deviation
    Factor(f64),
}

/// One-dimensional Gaussian kernel density estimate
#[derive(Debug, Clone)]
pub struct Kde {
    data: Vec<f64>,
    bandwidth: f64,
}

impl Kde {
    /// Returns `None` for fewer than two points or a zero-spread sample.
    pub fn new(data: &[f64], method: Bandwidth) -> Option<Self> {
        let std = sample_variance(data)?.sqrt();
        if !(std.is_finite() && std > 0.0) {
            return None;
        }
        let factor = match method {
            Bandwidth::Scott => (data.len() as f64).powf(-0.2),
            Bandwidth::Factor(f) => f,
        };
        Some(Self {
            data: data.to_vec(),
            bandwidth: factor * std,
        })
    }

    pub fn bandwidth(&self) -> f64 {
        self.bandwidth
    }

    pub fn evaluate(&self, x: f64) -> f64 {
        let h = self.bandwidth;
        let norm = 1.0 / (self.data.len() as f64 * h * (2.0 * PI).sqrt());
        let sum: f64 = self
            .data
            .iter()
            .map(|xi| {
                let u = (x - xi) / h;
                (-0.5 * u * u).exp()
            })
            .sum();
        sum * norm
    }

    /// Density on `points` evenly spaced values over `[min, max]`
    pub fn curve(&self, min: f64, max: f64, points: usize) -> Vec<(f64, f64)> {
        linspace(min, max, points)
            .into_iter()
            .map(|x| (x, self.evaluate(x)))
            .collect()
    }
}

/// Empirical CDF: sorted values paired with `i / n`
pub fn ecdf(values: &[f64]) -> Vec<(f64, f64)> {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let n = sorted.len() as f64;
    sorted
        .into_iter()
        .enumerate()
        .map(|(i, v)| (v, (i + 1) as f64 / n))
        .collect()
}

/// KDE-smoothed CDF over the data range: cumulative sum of the density on
/// an even grid, normalized so the last point is 1.
pub fn smoothed_cdf(values: &[f64], factor: f64, points: usize) -> Option<Vec<(f64, f64)>> {
    let kde = Kde::new(values, Bandwidth::Factor(factor))?;
    let (min, max) = range(values)?;

    let mut total = 0.0;
    let mut cumulative: Vec<(f64, f64)> = kde
        .curve(min, max, points)
        .into_iter()
        .map(|(x, d)| {
            total += d;
            (x, total)
        })
        .collect();

    if !(total > 0.0) {
        return None;
    }
    for point in &mut cumulative {
        point.1 /= total;
    }
    Some(cumulative)
}

/// Histogram bin normalized to a density
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistogramBin {
    pub start: f64,
    pub end: f64,
    pub density: f64,
}

/// Density histogram with automatically chosen bins: the narrower of the
/// Freedman-Diaconis and Sturges widths, Sturges alone when the IQR is zero.
pub fn histogram_density(values: &[f64]) -> Vec<HistogramBin> {
    let Some((min, max)) = range(values) else {
        return Vec::new();
    };
    let n = values.len();

    if max <= min {
        return vec![HistogramBin {
            start: min - 0.5,
            end: max + 0.5,
            density: 1.0,
        }];
    }

    let bins = auto_bin_count(values, min, max);
    let width = (max - min) / bins as f64;
    let mut counts = vec![0usize; bins];
    for &v in values {
        // The last bin is closed on the right
        let idx = (((v - min) / width) as usize).min(bins - 1);
        counts[idx] += 1;
    }

    counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| HistogramBin {
            start: min + width * i as f64,
            end: if i == bins - 1 { max } else { min + width * (i + 1) as f64 },
            density: count as f64 / (n as f64 * width),
        })
        .collect()
}

fn auto_bin_count(values: &[f64], min: f64, max: f64) -> usize {
    let n = values.len() as f64;
    let span = max - min;

    let sturges = span / (n.log2() + 1.0);

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let iqr = quantile_sorted(&sorted, 0.75) - quantile_sorted(&sorted, 0.25);
    let fd = 2.0 * iqr * n.powf(-1.0 / 3.0);

    let width = if fd > 0.0 { fd.min(sturges) } else { sturges };
    ((span / width).ceil() as usize).max(1)
}

fn range(values: &[f64]) -> Option<(f64, f64)> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
        (lo.min(v), hi.max(v))
    }))
}
