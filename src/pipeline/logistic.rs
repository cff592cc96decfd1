//! Binary logistic regression of slate category on a single chapter attribute
//!
//! Fits `P(left | x) = sigmoid(b + w1 x + ... + wd x^d)` for degree `d` in
//! {1, 2}. The objective is the L2-penalized log-loss with inverse
//! regularization strength `C` (intercept not penalized), or the plain
//! likelihood when no penalty is configured.
//!
//! Newton-Raphson runs on standardized features. The penalty is rescaled to
//! match, so the optimum is the one of the raw-feature problem; coefficients
//! are mapped back to raw units before they are reported.

use faer::prelude::*;
use faer::Mat;
use serde::Serialize;
use thiserror::Error;

/// Fewest observations a model is fitted on
pub const MIN_OBSERVATIONS: usize = 10;

/// Largest supported polynomial degree
pub const MAX_DEGREE: usize = 2;

/// Default number of points on the predicted probability curve
pub const DEFAULT_CURVE_POINTS: usize = 300;

/// Largest step-halving depth per Newton iteration
const MAX_STEP_HALVINGS: usize = 40;

/// Fitted log-odds beyond this magnitude mean a probability within 1e-13 of
/// 0 or 1, which an unpenalized fit only reaches on separated classes
const MAX_LINEAR_PREDICTOR: f64 = 30.0;

/// Reasons a model could not be fitted
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum FitError {
    #[error("Too few observations: {n} (at least {min} required)")]
    TooFewObservations { n: usize, min: usize },

    #[error("Only one class present ({events} left, {non_events} moderate)")]
    SingleClass { events: usize, non_events: usize },

    #[error("Predictor is constant")]
    ConstantPredictor,

    #[error("Predictor contains non-finite values")]
    NonFinite,

    #[error("Predictor and target lengths differ ({x} vs {y})")]
    LengthMismatch { x: usize, y: usize },

    #[error("Unsupported polynomial degree {degree} (use 1 to {max})", max = MAX_DEGREE)]
    UnsupportedDegree { degree: usize },

    #[error("Invalid regularization strength {c} (must be positive and finite)")]
    InvalidPenalty { c: f64 },

    #[error("Hessian is singular; the model is not identifiable")]
    Singular,

    #[error("Classes are perfectly separated; the unpenalized estimate diverges")]
    Separation,
}

/// Fitting options
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LogisticConfig {
    /// Polynomial degree of the single predictor (1 = linear, 2 adds x^2)
    pub degree: usize,
    /// Inverse L2 regularization strength; `None` fits the plain likelihood
    pub penalty_c: Option<f64>,
    pub max_iterations: usize,
    pub tolerance: f64,
}

impl Default for LogisticConfig {
    fn default() -> Self {
        Self {
            degree: 1,
            penalty_c: Some(1.0),
            max_iterations: 100,
            tolerance: 1e-10,
        }
    }
}

/// Estimate for one polynomial term
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TermEstimate {
    /// Power of the predictor this term multiplies
    pub power: usize,
    pub coefficient: f64,
    /// `exp(coefficient)`: multiplicative change in the odds of `left`
    pub odds_ratio: f64,
}

/// A fitted model
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogisticFit {
    pub intercept: f64,
    pub terms: Vec<TermEstimate>,
    pub degree: usize,
    pub penalty_c: Option<f64>,
    pub observations: usize,
    pub events: usize,
    pub non_events: usize,
    pub iterations: usize,
    pub converged: bool,
    /// Unpenalized log-likelihood at the estimate
    pub log_likelihood: f64,
    /// Observed predictor range, used for the probability curve
    pub x_min: f64,
    pub x_max: f64,
}

/// Point on the predicted probability curve
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CurvePoint {
    pub x: f64,
    pub probability: f64,
}

impl LogisticFit {
    /// Linear predictor `b + sum(w_k x^k)`
    pub fn linear_predictor(&self, x: f64) -> f64 {
        self.terms
            .iter()
            .fold(self.intercept, |acc, t| acc + t.coefficient * x.powi(t.power as i32))
    }

    /// Predicted probability of the event category
    pub fn predict_probability(&self, x: f64) -> f64 {
        sigmoid(self.linear_predictor(x))
    }

    /// Coefficient of the linear term
    pub fn slope(&self) -> f64 {
        self.terms.first().map(|t| t.coefficient).unwrap_or(0.0)
    }
}

/// Evenly spaced `points` over `[min, max]` with predicted probabilities
pub fn probability_curve(fit: &LogisticFit, min: f64, max: f64, points: usize) -> Vec<CurvePoint> {
    linspace(min, max, points)
        .into_iter()
        .map(|x| CurvePoint {
            x,
            probability: fit.predict_probability(x),
        })
        .collect()
}

/// `points` evenly spaced values from `start` to `end`, both inclusive
pub fn linspace(start: f64, end: f64, points: usize) -> Vec<f64> {
    match points {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (points - 1) as f64;
            (0..points)
                .map(|i| if i == points - 1 { end } else { start + step * i as f64 })
                .collect()
        }
    }
}

/// Polynomial feature columns `x, x^2, ..., x^degree`
pub fn expand_polynomial(x: &[f64], degree: usize) -> Vec<Vec<f64>> {
    (1..=degree)
        .map(|power| x.iter().map(|v| v.powi(power as i32)).collect())
        .collect()
}

#[inline]
pub fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

/// `ln(1 + e^z)` without overflow
#[inline]
fn softplus(z: f64) -> f64 {
    if z > 0.0 {
        z + (-z).exp().ln_1p()
    } else {
        z.exp().ln_1p()
    }
}

/// Fit the model on predictor `x` and binary target `y` (1 = event).
pub fn fit_logistic(x: &[f64], y: &[u8], config: &LogisticConfig) -> Result<LogisticFit, FitError> {
    if x.len() != y.len() {
        return Err(FitError::LengthMismatch {
            x: x.len(),
            y: y.len(),
        });
    }
    if config.degree == 0 || config.degree > MAX_DEGREE {
        return Err(FitError::UnsupportedDegree {
            degree: config.degree,
        });
    }
    if let Some(c) = config.penalty_c {
        if !(c.is_finite() && c > 0.0) {
            return Err(FitError::InvalidPenalty { c });
        }
    }

    let n = x.len();
    if n < MIN_OBSERVATIONS {
        return Err(FitError::TooFewObservations {
            n,
            min: MIN_OBSERVATIONS,
        });
    }
    if x.iter().any(|v| !v.is_finite()) {
        return Err(FitError::NonFinite);
    }

    let events = y.iter().filter(|&&v| v == 1).count();
    let non_events = n - events;
    if events == 0 || non_events == 0 {
        return Err(FitError::SingleClass { events, non_events });
    }

    // A degree-d polynomial needs more than d distinct predictor values
    let mut distinct = x.to_vec();
    distinct.sort_by(|a, b| a.total_cmp(b));
    distinct.dedup();
    if distinct.len() == 1 {
        return Err(FitError::ConstantPredictor);
    }
    if distinct.len() <= config.degree {
        return Err(FitError::Singular);
    }

    let features = expand_polynomial(x, config.degree);

    // Standardize each feature column
    let mut centers = Vec::with_capacity(features.len());
    let mut scales = Vec::with_capacity(features.len());
    for column in &features {
        let mean = column.iter().sum::<f64>() / n as f64;
        let var = column.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n as f64;
        let scale = var.sqrt();
        if !(scale.is_finite() && scale > 0.0) {
            return Err(FitError::ConstantPredictor);
        }
        centers.push(mean);
        scales.push(scale);
    }

    let k = features.len() + 1;
    let design = Mat::<f64>::from_fn(n, k, |i, j| match j {
        0 => 1.0,
        _ => (features[j - 1][i] - centers[j - 1]) / scales[j - 1],
    });
    let target = Mat::<f64>::from_fn(n, 1, |i, _| f64::from(y[i]));

    // Penalty on raw coefficient w_j = beta_j / s_j becomes beta_j^2 / (C s_j^2)
    let mut penalty = vec![0.0; k];
    if let Some(c) = config.penalty_c {
        for j in 1..k {
            penalty[j] = 1.0 / (c * scales[j - 1] * scales[j - 1]);
        }
    }

    let mut beta = Mat::<f64>::zeros(k, 1);
    let mut objective = penalized_loss(&design, &target, &beta, &penalty);
    let mut iterations = 0;
    let mut converged = false;

    while iterations < config.max_iterations {
        iterations += 1;

        let eta = &design * &beta;
        let mu = Mat::<f64>::from_fn(n, 1, |i, _| sigmoid(eta[(i, 0)]));

        // Gradient: Z^T (mu - y) + P beta
        let residual = &mu - &target;
        let mut gradient = design.transpose() * &residual;

        // Hessian: Z^T S Z + P
        let weighted = Mat::<f64>::from_fn(n, k, |i, j| {
            mu[(i, 0)] * (1.0 - mu[(i, 0)]) * design[(i, j)]
        });
        let mut hessian = design.transpose() * &weighted;

        for j in 0..k {
            gradient[(j, 0)] += penalty[j] * beta[(j, 0)];
            hessian[(j, j)] += penalty[j];
        }

        let step = hessian.partial_piv_lu().solve(&gradient);
        if (0..k).any(|j| !step[(j, 0)].is_finite()) {
            if config.penalty_c.is_none() && diverged(&design, &beta) {
                return Err(FitError::Separation);
            }
            return Err(FitError::Singular);
        }

        // Step halving keeps every iteration a descent step
        let mut scale = 1.0;
        let mut candidate = beta.clone();
        let mut candidate_objective = objective;
        let mut improved = false;
        for _ in 0..MAX_STEP_HALVINGS {
            candidate = Mat::<f64>::from_fn(k, 1, |j, _| beta[(j, 0)] - scale * step[(j, 0)]);
            candidate_objective = penalized_loss(&design, &target, &candidate, &penalty);
            if candidate_objective <= objective {
                improved = true;
                break;
            }
            scale *= 0.5;
        }

        let max_change = (0..k)
            .map(|j| (step[(j, 0)] * scale).abs())
            .fold(0.0, f64::max);
        if improved {
            let decrease = objective - candidate_objective;
            beta = candidate;
            objective = candidate_objective;
            if max_change < config.tolerance || decrease <= config.tolerance * (1.0 + objective.abs())
            {
                converged = true;
                break;
            }
        } else {
            // No descent direction left at machine precision
            converged = max_change < config.tolerance.sqrt();
            break;
        }
    }

    // Without a penalty, separated classes push the estimate towards infinity
    if config.penalty_c.is_none() && diverged(&design, &beta) {
        return Err(FitError::Separation);
    }

    // Back to raw units
    let mut intercept = beta[(0, 0)];
    let mut terms = Vec::with_capacity(k - 1);
    for j in 1..k {
        let coefficient = beta[(j, 0)] / scales[j - 1];
        intercept -= coefficient * centers[j - 1];
        terms.push(TermEstimate {
            power: j,
            coefficient,
            odds_ratio: coefficient.exp(),
        });
    }

    let log_likelihood = -penalized_loss(&design, &target, &beta, &vec![0.0; k]);
    let (x_min, x_max) = (distinct[0], distinct[distinct.len() - 1]);

    Ok(LogisticFit {
        intercept,
        terms,
        degree: config.degree,
        penalty_c: config.penalty_c,
        observations: n,
        events,
        non_events,
        iterations,
        converged,
        log_likelihood,
        x_min,
        x_max,
    })
}

fn diverged(design: &Mat<f64>, beta: &Mat<f64>) -> bool {
    let eta = design * beta;
    (0..eta.nrows()).any(|i| eta[(i, 0)].abs() > MAX_LINEAR_PREDICTOR)
}

/// Negative log-likelihood plus `0.5 * sum(p_j beta_j^2)`
fn penalized_loss(design: &Mat<f64>, target: &Mat<f64>, beta: &Mat<f64>, penalty: &[f64]) -> f64 {
    let eta = design * beta;
    let loss: f64 = (0..eta.nrows())
        .map(|i| softplus(eta[(i, 0)]) - target[(i, 0)] * eta[(i, 0)])
        .sum();
    let ridge: f64 = penalty
        .iter()
        .enumerate()
        .map(|(j, p)| 0.5 * p * beta[(j, 0)] * beta[(j, 0)])
        .sum();
    loss + ridge
}
