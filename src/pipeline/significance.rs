//! Two-sample significance tests between the left and moderate groups
//!
//! Two strategies are available: Welch's unequal-variance t-test and the
//! rank-based Mann-Whitney U test. Degenerate samples are reported as
//! outcomes instead of producing a numerical error.

use serde::Serialize;

use super::distributions::{normal_sf, students_t_two_sided};
use super::stats::{mean, sample_variance};

/// Minimum observations per group for either test
pub const MIN_GROUP_SIZE: usize = 2;

/// Largest sample size (of the smaller group) for the exact U distribution
const EXACT_U_MAX_SIZE: usize = 8;

/// Two-sample test strategy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SignificanceTest {
    /// Welch's t-test, does not assume equal variances (default)
    #[default]
    Welch,
    /// Mann-Whitney U test, rank based and robust to non-normal data
    MannWhitney,
}

impl SignificanceTest {
    pub fn statistic_name(self) -> &'static str {
        match self {
            SignificanceTest::Welch => "t-statistic",
            SignificanceTest::MannWhitney => "U-statistic",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            SignificanceTest::Welch => "Welch's t-test",
            SignificanceTest::MannWhitney => "Mann-Whitney U test",
        }
    }
}

impl std::fmt::Display for SignificanceTest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SignificanceTest::Welch => write!(f, "welch"),
            SignificanceTest::MannWhitney => write!(f, "mann-whitney"),
        }
    }
}

impl std::str::FromStr for SignificanceTest {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "welch" | "t-test" | "ttest" => Ok(SignificanceTest::Welch),
            "mann-whitney" | "mannwhitney" | "u-test" | "mwu" => Ok(SignificanceTest::MannWhitney),
            _ => Err(format!(
                "Unknown significance test: '{}'. Use 'welch' or 'mann-whitney'.",
                s
            )),
        }
    }
}

/// How a p-value was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PValueMethod {
    /// Student-t with Welch-Satterthwaite degrees of freedom
    StudentT,
    /// Exact null distribution of U
    Exact,
    /// Normal approximation with tie and continuity correction
    Asymptotic,
}

/// Result of a two-sample comparison
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum TestOutcome {
    Computed {
        statistic: f64,
        p_value: f64,
        /// Degrees of freedom (t-test only)
        #[serde(skip_serializing_if = "Option::is_none")]
        df: Option<f64>,
        method: PValueMethod,
    },
    /// A group has fewer than [`MIN_GROUP_SIZE`] observations
    InsufficientSample { left: usize, moderate: usize },
    /// Both groups are constant, so the statistic is undefined
    ZeroVariance,
}

impl TestOutcome {
    pub fn p_value(&self) -> Option<f64> {
        match self {
            TestOutcome::Computed { p_value, .. } => Some(*p_value),
            _ => None,
        }
    }

    pub fn is_significant(&self, alpha: f64) -> bool {
        self.p_value().is_some_and(|p| p < alpha)
    }
}

/// Run the selected test on the two groups
pub fn run_test(test: SignificanceTest, left: &[f64], moderate: &[f64]) -> TestOutcome {
    match test {
        SignificanceTest::Welch => welch_t_test(left, moderate),
        SignificanceTest::MannWhitney => mann_whitney_u(left, moderate),
    }
}

/// Welch's unequal-variance two-sample t-test (two-sided)
pub fn welch_t_test(a: &[f64], b: &[f64]) -> TestOutcome {
    let (Some(var_a), Some(var_b)) = (sample_variance(a), sample_variance(b)) else {
        return TestOutcome::InsufficientSample {
            left: a.len(),
            moderate: b.len(),
        };
    };

    let n_a = a.len() as f64;
    let n_b = b.len() as f64;
    let se_a = var_a / n_a;
    let se_b = var_b / n_b;
    let se = se_a + se_b;

    if se <= 0.0 {
        return TestOutcome::ZeroVariance;
    }

    let t = (mean(a) - mean(b)) / se.sqrt();
    let df = se * se / (se_a * se_a / (n_a - 1.0) + se_b * se_b / (n_b - 1.0));

    TestOutcome::Computed {
        statistic: t,
        p_value: students_t_two_sided(t, df),
        df: Some(df),
        method: PValueMethod::StudentT,
    }
}

/// Mann-Whitney U test (two-sided).
///
/// The reported statistic is U of the first sample. The exact null
/// distribution is used when the smaller sample has at most 8 observations
/// and there are no ties; otherwise the normal approximation with tie and
/// continuity correction.
pub fn mann_whitney_u(a: &[f64], b: &[f64]) -> TestOutcome {
    if a.len() < MIN_GROUP_SIZE || b.len() < MIN_GROUP_SIZE {
        return TestOutcome::InsufficientSample {
            left: a.len(),
            moderate: b.len(),
        };
    }

    let n1 = a.len();
    let n2 = b.len();
    let n = n1 + n2;

    let pooled: Vec<f64> = a.iter().chain(b.iter()).copied().collect();
    let (ranks, tie_term) = average_ranks(&pooled);

    let rank_sum_a: f64 = ranks[..n1].iter().sum();
    let u1 = rank_sum_a - (n1 * (n1 + 1)) as f64 / 2.0;
    let u2 = (n1 * n2) as f64 - u1;
    let u_max = u1.max(u2);

    let has_ties = tie_term > 0.0;

    if !has_ties && n1.min(n2) <= EXACT_U_MAX_SIZE {
        let p = 2.0 * exact_u_sf(u_max.round() as usize, n1, n2);
        return TestOutcome::Computed {
            statistic: u1,
            p_value: p.clamp(0.0, 1.0),
            df: None,
            method: PValueMethod::Exact,
        };
    }

    let nf = n as f64;
    let mu = (n1 * n2) as f64 / 2.0;
    let variance = (n1 * n2) as f64 / 12.0 * ((nf + 1.0) - tie_term / (nf * (nf - 1.0)));
    if variance <= 0.0 {
        return TestOutcome::ZeroVariance;
    }

    let z = (u_max - mu - 0.5) / variance.sqrt();
    let p = (2.0 * normal_sf(z)).clamp(0.0, 1.0);

    TestOutcome::Computed {
        statistic: u1,
        p_value: p,
        df: None,
        method: PValueMethod::Asymptotic,
    }
}

/// Average (mid) ranks starting at 1, plus the tie term `sum(t^3 - t)`
fn average_ranks(values: &[f64]) -> (Vec<f64>, f64) {
    let n = values.len();
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&i, &j| values[i].total_cmp(&values[j]));

    let mut ranks = vec![0.0; n];
    let mut tie_term = 0.0;
    let mut start = 0;

    while start < n {
        let mut end = start + 1;
        while end < n && values[order[end]] == values[order[start]] {
            end += 1;
        }
        // Positions start..end share the average of ranks start+1..=end
        let avg = (start + end + 1) as f64 / 2.0;
        for &idx in &order[start..end] {
            ranks[idx] = avg;
        }
        let t = (end - start) as f64;
        tie_term += t * t * t - t;
        start = end;
    }

    (ranks, tie_term)
}

/// `P(U >= u)` under the null hypothesis for sample sizes `n1`, `n2`.
///
/// Frequencies come from the generating function
/// `prod_{i=1..m} (1 - q^(n+i)) / (1 - q^i)` with `m = min(n1, n2)`.
fn exact_u_sf(u: usize, n1: usize, n2: usize) -> f64 {
    let m = n1.min(n2);
    let n = n1.max(n2);
    let max_u = m * n;
    if u > max_u {
        return 0.0;
    }

    let mut freq = vec![0.0f64; max_u + 1];
    freq[0] = 1.0;

    for i in 1..=m {
        // Multiply by (1 - q^(n+i)), highest degree first
        let shift = n + i;
        for k in (shift..=max_u).rev() {
            freq[k] -= freq[k - shift];
        }
        // Divide by (1 - q^i), a running sum with stride i
        for k in i..=max_u {
            freq[k] += freq[k - i];
        }
    }

    let total: f64 = freq.iter().sum();
    let upper: f64 = freq[u..].iter().sum();
    upper / total
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() < tol
    }

    #[test]
    fn test_welch_known_result() {
        let a = [1.0, 2.0, 3.0, 4.0, 5.0];
        let b = [2.0, 4.0, 6.0, 8.0, 10.0];

        match welch_t_test(&a, &b) {
            TestOutcome::Computed {
                statistic, df, p_value, ..
            } => {
                assert!(close(statistic, -1.8973665961010275, 1e-10));
                assert!(close(df.unwrap(), 5.882352941176471, 1e-10));
                assert!(close(p_value, 0.107_531_194_930_627, 1e-9));
            }
            other => panic!("Expected computed outcome, got {:?}", other),
        }
    }

    #[test]
    fn test_welch_insufficient_sample() {
        let outcome = welch_t_test(&[1.0], &[1.0, 2.0, 3.0]);
        assert_eq!(
            outcome,
            TestOutcome::InsufficientSample {
                left: 1,
                moderate: 3
            }
        );
    }

    #[test]
    fn test_welch_zero_variance() {
        let outcome = welch_t_test(&[2.0, 2.0], &[5.0, 5.0, 5.0]);
        assert_eq!(outcome, TestOutcome::ZeroVariance);
    }

    #[test]
    fn test_mann_whitney_exact_small_samples() {
        // Complete separation of 3 vs 3: P(U >= 9) = 1/20, two-sided 0.1
        match mann_whitney_u(&[1.0, 2.0, 3.0], &[4.0, 5.0, 6.0]) {
            TestOutcome::Computed {
                statistic,
                p_value,
                method,
                ..
            } => {
                assert_eq!(statistic, 0.0);
                assert!(close(p_value, 0.1, 1e-12));
                assert_eq!(method, PValueMethod::Exact);
            }
            other => panic!("Expected computed outcome, got {:?}", other),
        }
    }

    #[test]
    fn test_mann_whitney_exact_p_value_is_a_probability() {
        // Fully separated groups give the smallest exact tail for each size pair
        for n1 in MIN_GROUP_SIZE..=EXACT_U_MAX_SIZE {
            for n2 in MIN_GROUP_SIZE..=12 {
                let a: Vec<f64> = (0..n1).map(|i| i as f64).collect();
                let b: Vec<f64> = (0..n2).map(|i| (100 + i) as f64).collect();
                match mann_whitney_u(&a, &b) {
                    TestOutcome::Computed {
                        p_value, method, ..
                    } => {
                        assert_eq!(method, PValueMethod::Exact);
                        assert!(p_value > 0.0 && p_value <= 1.0, "{} vs {}: {}", n1, n2, p_value);
                    }
                    other => panic!("Expected computed outcome, got {:?}", other),
                }
            }
        }
    }

    #[test]
    fn test_mann_whitney_asymptotic_with_ties() {
        let a = [1.0, 2.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0];
        let b = [3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0, 11.0, 12.0];

        match mann_whitney_u(&a, &b) {
            TestOutcome::Computed {
                statistic,
                p_value,
                method,
                ..
            } => {
                assert_eq!(method, PValueMethod::Asymptotic);
                assert_eq!(statistic, 24.5);
                assert!(close(p_value, 0.058_021_981_428_215_5, 1e-9));
            }
            other => panic!("Expected computed outcome, got {:?}", other),
        }
    }

    #[test]
    fn test_mann_whitney_identical_values() {
        let outcome = mann_whitney_u(&[3.0; 10], &[3.0; 12]);
        assert_eq!(outcome, TestOutcome::ZeroVariance);
    }

    #[test]
    fn test_mann_whitney_insufficient_sample() {
        let outcome = mann_whitney_u(&[1.0, 2.0, 3.0], &[4.0]);
        assert!(matches!(outcome, TestOutcome::InsufficientSample { .. }));
        assert_eq!(outcome.p_value(), None);
    }

    #[test]
    fn test_average_ranks_with_ties() {
        let (ranks, tie_term) = average_ranks(&[10.0, 20.0, 10.0, 30.0]);
        assert_eq!(ranks, vec![1.5, 3.0, 1.5, 4.0]);
        assert_eq!(tie_term, 6.0);
    }

    #[test]
    fn test_exact_distribution_is_symmetric() {
        let lower_tail = 1.0 - exact_u_sf(5, 4, 5);
        let upper_tail = exact_u_sf(16, 4, 5);
        assert!(close(lower_tail, upper_tail, 1e-12));
        assert!(close(exact_u_sf(0, 4, 5), 1.0, 1e-12));
    }

    #[test]
    fn test_strategy_from_str() {
        assert_eq!("welch".parse::<SignificanceTest>().unwrap(), SignificanceTest::Welch);
        assert_eq!(
            "Mann_Whitney".parse::<SignificanceTest>().unwrap(),
            SignificanceTest::MannWhitney
        );
        assert!("anova".parse::<SignificanceTest>().is_err());
    }
}
