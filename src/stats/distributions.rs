//! Probability distributions and exact tests.
//!
//! Special functions are computed in log space where the arguments get
//! large (the association table spans a population of one million), so the
//! tail sums stay finite until they legitimately underflow to zero.

use crate::error::{FncError, FncResult};

const EPS: f64 = 1e-14;
const FPMIN: f64 = 1e-300;
const MAX_ITER: usize = 500;

/// Relative tolerance used when collecting "as or more extreme" outcomes
/// for two-sided exact tests.
const RELATIVE_TOLERANCE: f64 = 1e-7;

const LANCZOS_G: f64 = 7.0;
const LANCZOS_COEFFICIENTS: [f64; 9] = [
    0.999_999_999_999_809_93,
    676.520_368_121_885_1,
    -1_259.139_216_722_402_8,
    771.323_428_777_653_13,
    -176.615_029_162_140_59,
    12.507_343_278_686_905,
    -0.138_571_095_265_720_12,
    9.984_369_578_019_571_6e-6,
    1.505_632_735_149_311_6e-7,
];

/// Natural log of the gamma function for `x > 0` (Lanczos approximation).
pub fn ln_gamma(x: f64) -> f64 {
    if x < 0.5 {
        // Reflection formula
        let pi = std::f64::consts::PI;
        return (pi / (pi * x).sin().abs()).ln() - ln_gamma(1.0 - x);
    }

    let x = x - 1.0;
    let mut a = LANCZOS_COEFFICIENTS[0];
    for (i, &c) in LANCZOS_COEFFICIENTS.iter().enumerate().skip(1) {
        a += c / (x + i as f64);
    }
    let t = x + LANCZOS_G + 0.5;

    0.5 * (2.0 * std::f64::consts::PI).ln() + (x + 0.5) * t.ln() - t + a.ln()
}

/// Natural log of the binomial coefficient `n choose k`.
pub fn ln_choose(n: u64, k: u64) -> f64 {
    if k > n {
        return f64::NEG_INFINITY;
    }
    ln_gamma(n as f64 + 1.0) - ln_gamma(k as f64 + 1.0) - ln_gamma((n - k) as f64 + 1.0)
}

/// Quantile function of the standard normal distribution.
///
/// Acklam's rational approximation, relative error below 1.2e-9.
pub fn normal_quantile(p: f64) -> FncResult<f64> {
    if !(p > 0.0 && p < 1.0) {
        return Err(FncError::InvalidParameter(format!(
            "normal quantile requires 0 < p < 1, got {}",
            p
        )));
    }

    const A: [f64; 6] = [
        -3.969_683_028_665_376e1,
        2.209_460_984_245_205e2,
        -2.759_285_104_469_687e2,
        1.383_577_518_672_69e2,
        -3.066_479_806_614_716e1,
        2.506_628_277_459_239,
    ];
    const B: [f64; 5] = [
        -5.447_609_879_822_406e1,
        1.615_858_368_580_409e2,
        -1.556_989_798_598_866e2,
        6.680_131_188_771_972e1,
        -1.328_068_155_288_572e1,
    ];
    const C: [f64; 6] = [
        -7.784_894_002_430_293e-3,
        -3.223_964_580_411_365e-1,
        -2.400_758_277_161_838,
        -2.549_732_539_343_734,
        4.374_664_141_464_968,
        2.938_163_982_698_783,
    ];
    const D: [f64; 4] = [
        7.784_695_709_041_462e-3,
        3.224_671_290_700_398e-1,
        2.445_134_137_142_996,
        3.754_408_661_907_416,
    ];
    const P_LOW: f64 = 0.02425;

    let tail = |q: f64| {
        (((((C[0] * q + C[1]) * q + C[2]) * q + C[3]) * q + C[4]) * q + C[5])
            / ((((D[0] * q + D[1]) * q + D[2]) * q + D[3]) * q + 1.0)
    };

    let x = if p < P_LOW {
        tail((-2.0 * p.ln()).sqrt())
    } else if p <= 1.0 - P_LOW {
        let q = p - 0.5;
        let r = q * q;
        (((((A[0] * r + A[1]) * r + A[2]) * r + A[3]) * r + A[4]) * r + A[5]) * q
            / (((((B[0] * r + B[1]) * r + B[2]) * r + B[3]) * r + B[4]) * r + 1.0)
    } else {
        -tail((-2.0 * (1.0 - p).ln()).sqrt())
    };

    Ok(x)
}

/// Two-sided critical z value for a confidence level, e.g. 1.96 for 0.95.
pub fn z_critical(confidence: f64) -> FncResult<f64> {
    if !(confidence > 0.0 && confidence < 1.0) {
        return Err(FncError::InvalidParameter(format!(
            "confidence must be in (0, 1), got {}",
            confidence
        )));
    }
    normal_quantile(1.0 - (1.0 - confidence) / 2.0)
}

/// Regularized lower incomplete gamma by its series expansion.
fn gamma_p_series(a: f64, x: f64) -> f64 {
    let mut ap = a;
    let mut del = 1.0 / a;
    let mut sum = del;
    for _ in 0..MAX_ITER {
        ap += 1.0;
        del *= x / ap;
        sum += del;
        if del.abs() < sum.abs() * EPS {
            break;
        }
    }
    sum * (-x + a * x.ln() - ln_gamma(a)).exp()
}

/// Regularized upper incomplete gamma by continued fraction (modified Lentz).
fn gamma_q_continued_fraction(a: f64, x: f64) -> f64 {
    let mut b = x + 1.0 - a;
    let mut c = 1.0 / FPMIN;
    let mut d = 1.0 / b;
    let mut h = d;
    for i in 1..=MAX_ITER {
        let an = -(i as f64) * (i as f64 - a);
        b += 2.0;
        d = an * d + b;
        if d.abs() < FPMIN {
            d = FPMIN;
        }
        c = b + an / c;
        if c.abs() < FPMIN {
            c = FPMIN;
        }
        d = 1.0 / d;
        let del = d * c;
        h *= del;
        if (del - 1.0).abs() < EPS {
            break;
        }
    }
    (-x + a * x.ln() - ln_gamma(a)).exp() * h
}

/// Regularized upper incomplete gamma `Q(a, x)`.
pub fn gamma_q(a: f64, x: f64) -> f64 {
    if x <= 0.0 {
        return 1.0;
    }
    if x < a + 1.0 {
        1.0 - gamma_p_series(a, x)
    } else {
        gamma_q_continued_fraction(a, x)
    }
}

/// Survival function of the chi-square distribution.
pub fn chi_square_sf(x: f64, df: usize) -> FncResult<f64> {
    if df == 0 {
        return Err(FncError::InvalidParameter(
            "chi-square requires at least one degree of freedom".to_string(),
        ));
    }
    Ok(gamma_q(df as f64 / 2.0, x / 2.0).clamp(0.0, 1.0))
}

fn beta_continued_fraction(a: f64, b: f64, x: f64) -> f64 {
    let qab = a + b;
    let qap = a + 1.0;
    let qam = a - 1.0;
    let mut c = 1.0;
    let mut d = 1.0 - qab * x / qap;
    if d.abs() < FPMIN {
        d = FPMIN;
    }
    d = 1.0 / d;
    let mut h = d;

    for m in 1..=MAX_ITER {
        let m = m as f64;
        let m2 = 2.0 * m;

        let aa = m * (b - m) * x / ((qam + m2) * (a + m2));
        d = 1.0 + aa * d;
        if d.abs() < FPMIN {
            d = FPMIN;
        }
        c = 1.0 + aa / c;
        if c.abs() < FPMIN {
            c = FPMIN;
        }
        d = 1.0 / d;
        h *= d * c;

        let aa = -(a + m) * (qab + m) * x / ((a + m2) * (qap + m2));
        d = 1.0 + aa * d;
        if d.abs() < FPMIN {
            d = FPMIN;
        }
        c = 1.0 + aa / c;
        if c.abs() < FPMIN {
            c = FPMIN;
        }
        d = 1.0 / d;
        let del = d * c;
        h *= del;
        if (del - 1.0).abs() < EPS {
            break;
        }
    }
    h
}

/// Regularized incomplete beta function `I_x(a, b)`.
pub fn incomplete_beta(a: f64, b: f64, x: f64) -> f64 {
    if x <= 0.0 {
        return 0.0;
    }
    if x >= 1.0 {
        return 1.0;
    }
    let front = (ln_gamma(a + b) - ln_gamma(a) - ln_gamma(b) + a * x.ln() + b * (1.0 - x).ln())
        .exp();
    if x < (a + 1.0) / (a + b + 2.0) {
        front * beta_continued_fraction(a, b, x) / a
    } else {
        1.0 - front * beta_continued_fraction(b, a, 1.0 - x) / b
    }
}

/// Two-sided p-value of Student's t statistic.
pub fn student_t_two_sided_p(t: f64, df: f64) -> f64 {
    if t.is_infinite() {
        return 0.0;
    }
    incomplete_beta(df / 2.0, 0.5, df / (df + t * t)).clamp(0.0, 1.0)
}

/// Log probability mass of the hypergeometric distribution.
///
/// `population` items of which `successes` are marked; `draws` are taken
/// without replacement and `k` of them are marked.
pub fn hypergeom_ln_pmf(k: u64, population: u64, successes: u64, draws: u64) -> f64 {
    if successes > population || draws > population {
        return f64::NEG_INFINITY;
    }
    let (low, high) = hypergeom_support(population, successes, draws);
    if k < low || k > high {
        return f64::NEG_INFINITY;
    }
    ln_choose(successes, k) + ln_choose(population - successes, draws - k)
        - ln_choose(population, draws)
}

pub fn hypergeom_pmf(k: u64, population: u64, successes: u64, draws: u64) -> f64 {
    hypergeom_ln_pmf(k, population, successes, draws).exp()
}

fn hypergeom_support(population: u64, successes: u64, draws: u64) -> (u64, u64) {
    let low = draws.saturating_sub(population - successes);
    let high = successes.min(draws);
    (low, high)
}

/// Upper tail `P(X >= k)` of the hypergeometric distribution.
pub fn hypergeom_sf_at_least(k: u64, population: u64, successes: u64, draws: u64) -> FncResult<f64> {
    if successes > population || draws > population {
        return Err(FncError::InvalidParameter(format!(
            "hypergeometric parameters out of range: M={}, n={}, N={}",
            population, successes, draws
        )));
    }
    let (low, high) = hypergeom_support(population, successes, draws);
    if k <= low {
        return Ok(1.0);
    }
    if k > high {
        return Ok(0.0);
    }
    let p: f64 = (k..=high)
        .map(|i| hypergeom_pmf(i, population, successes, draws))
        .sum();
    Ok(p.clamp(0.0, 1.0))
}

/// Result of Fisher's exact test on a 2x2 table.
#[derive(Debug, Clone, Copy)]
pub struct FisherExact {
    /// Sample odds ratio `a*d / (b*c)`; infinite when `b*c == 0`.
    pub odds_ratio: f64,
    /// Two-sided p-value.
    pub p_value: f64,
}

/// Fisher's exact test for the table `[[a, b], [c, d]]`.
pub fn fisher_exact(a: u64, b: u64, c: u64, d: u64) -> FisherExact {
    let odds_ratio = if b == 0 || c == 0 {
        if a == 0 || d == 0 {
            f64::NAN
        } else {
            f64::INFINITY
        }
    } else {
        (a as f64 * d as f64) / (b as f64 * c as f64)
    };

    let population = a + b + c + d;
    let row = a + b;
    let col = a + c;
    let (low, high) = hypergeom_support(population, row, col);

    let observed = hypergeom_ln_pmf(a, population, row, col);
    let cutoff = observed + RELATIVE_TOLERANCE.ln_1p();

    let p_value: f64 = (low..=high)
        .map(|x| hypergeom_ln_pmf(x, population, row, col))
        .filter(|&lp| lp <= cutoff)
        .map(f64::exp)
        .sum();

    FisherExact {
        odds_ratio,
        p_value: p_value.clamp(0.0, 1.0),
    }
}

/// Exact two-sided binomial test of `k` successes in `n` trials.
pub fn binomial_test_two_sided(k: u64, n: u64, p: f64) -> FncResult<f64> {
    if k > n {
        return Err(FncError::InvalidParameter(format!(
            "successes ({}) exceed trials ({})",
            k, n
        )));
    }
    if !(p > 0.0 && p < 1.0) {
        return Err(FncError::InvalidParameter(format!(
            "success probability must be in (0, 1), got {}",
            p
        )));
    }

    let ln_pmf = |i: u64| ln_choose(n, i) + i as f64 * p.ln() + (n - i) as f64 * (1.0 - p).ln();
    let cutoff = ln_pmf(k) + RELATIVE_TOLERANCE.ln_1p();

    let total: f64 = (0..=n)
        .map(ln_pmf)
        .filter(|&lp| lp <= cutoff)
        .map(f64::exp)
        .sum();

    Ok(total.clamp(0.0, 1.0))
}

/// Ranks with ties replaced by their average rank (1-based).
pub fn average_ranks(values: &[f64]) -> Vec<f64> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&i, &j| values[i].total_cmp(&values[j]));

    let mut ranks = vec![0.0; values.len()];
    let mut start = 0;
    while start < order.len() {
        let mut end = start;
        while end + 1 < order.len() && values[order[end + 1]] == values[order[start]] {
            end += 1;
        }
        let rank = (start + end) as f64 / 2.0 + 1.0;
        for &idx in &order[start..=end] {
            ranks[idx] = rank;
        }
        start = end + 1;
    }
    ranks
}

fn pearson(x: &[f64], y: &[f64]) -> Option<f64> {
    let n = x.len() as f64;
    let mean_x = x.iter().sum::<f64>() / n;
    let mean_y = y.iter().sum::<f64>() / n;

    let mut sxy = 0.0;
    let mut sxx = 0.0;
    let mut syy = 0.0;
    for (&xi, &yi) in x.iter().zip(y) {
        sxy += (xi - mean_x) * (yi - mean_y);
        sxx += (xi - mean_x).powi(2);
        syy += (yi - mean_y).powi(2);
    }

    if sxx == 0.0 || syy == 0.0 {
        return None;
    }
    Some((sxy / (sxx * syy).sqrt()).clamp(-1.0, 1.0))
}

/// Spearman rank correlation.
#[derive(Debug, Clone, Copy)]
pub struct Spearman {
    pub rho: f64,
    /// Two-sided p-value from the t approximation.
    pub p_value: f64,
}

pub fn spearman(x: &[f64], y: &[f64]) -> FncResult<Spearman> {
    if x.len() != y.len() {
        return Err(FncError::InvalidParameter(format!(
            "spearman inputs differ in length: {} vs {}",
            x.len(),
            y.len()
        )));
    }
    if x.len() < 3 {
        return Err(FncError::InvalidParameter(
            "spearman correlation needs at least 3 observations".to_string(),
        ));
    }

    let rho = pearson(&average_ranks(x), &average_ranks(y)).ok_or_else(|| {
        FncError::InvalidParameter("spearman correlation of a constant input".to_string())
    })?;

    let df = (x.len() - 2) as f64;
    let p_value = if (1.0 - rho.abs()) < 1e-12 {
        0.0
    } else {
        let t = rho * (df / (1.0 - rho * rho)).sqrt();
        student_t_two_sided_p(t, df)
    };

    Ok(Spearman { rho, p_value })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() <= tol
    }

    #[test]
    fn test_ln_gamma_known_values() {
        assert!(close(ln_gamma(1.0), 0.0, 1e-12));
        assert!(close(ln_gamma(5.0), 24.0_f64.ln(), 1e-12));
        assert!(close(
            ln_gamma(0.5),
            std::f64::consts::PI.sqrt().ln(),
            1e-12
        ));
        assert!(close(ln_choose(10, 3), 120.0_f64.ln(), 1e-10));
    }

    #[test]
    fn test_normal_quantile() {
        assert!(close(normal_quantile(0.975).unwrap(), 1.959_964, 1e-6));
        assert!(close(normal_quantile(0.5).unwrap(), 0.0, 1e-12));
        assert!(close(normal_quantile(0.01).unwrap(), -2.326_348, 1e-6));
        assert!(normal_quantile(0.0).is_err());
        assert!(close(z_critical(0.95).unwrap(), 1.959_964, 1e-6));
        assert!(z_critical(1.5).is_err());
    }

    #[test]
    fn test_chi_square_sf() {
        assert!(close(chi_square_sf(3.841_458_820_694_124, 1).unwrap(), 0.05, 1e-9));
        // df = 2 has the closed form exp(-x/2)
        assert!(close(chi_square_sf(5.0, 2).unwrap(), (-2.5_f64).exp(), 1e-12));
        assert_eq!(chi_square_sf(0.0, 3).unwrap(), 1.0);
        assert!(chi_square_sf(426.8, 5).unwrap() < 1e-80);
        assert!(chi_square_sf(1.0, 0).is_err());
    }

    #[test]
    fn test_student_t() {
        assert!(close(student_t_two_sided_p(2.228_138_851_986_274, 10.0), 0.05, 1e-8));
        assert!(close(student_t_two_sided_p(0.0, 4.0), 1.0, 1e-12));
        assert_eq!(student_t_two_sided_p(f64::INFINITY, 1.0), 0.0);
    }

    #[test]
    fn test_hypergeom_pmf_sums_to_one() {
        let total: f64 = (0..=7).map(|k| hypergeom_pmf(k, 50, 12, 7)).sum();
        assert!(close(total, 1.0, 1e-10));
        assert_eq!(hypergeom_sf_at_least(0, 50, 12, 7).unwrap(), 1.0);
        assert_eq!(hypergeom_sf_at_least(8, 50, 12, 7).unwrap(), 0.0);
        assert!(hypergeom_sf_at_least(1, 10, 20, 5).is_err());
    }

    #[test]
    fn test_hypergeom_tail_single_overlap() {
        // P(X >= 1) = 1 - P(X = 0)
        let p = hypergeom_sf_at_least(1, 20_000, 100, 7).unwrap();
        let p0 = hypergeom_pmf(0, 20_000, 100, 7);
        assert!(close(p, 1.0 - p0, 1e-9));
        assert!(close(p, 0.0345, 2e-4));
    }

    #[test]
    fn test_fisher_exact_tea_tasting() {
        let result = fisher_exact(3, 1, 1, 3);
        assert!(close(result.odds_ratio, 9.0, 1e-12));
        assert!(close(result.p_value, 0.485_714_285_7, 1e-8));
    }

    #[test]
    fn test_fisher_exact_extreme_table() {
        let result = fisher_exact(1500, 13_500, 1, 984_999);
        assert!(result.odds_ratio > 100_000.0);
        assert!(result.p_value < 1e-10);
    }

    #[test]
    fn test_binomial_test() {
        // Tails {0,1,2,28,29,30}: 932 / 2^30
        let p = binomial_test_two_sided(28, 30, 0.5).unwrap();
        assert!(close(p, 932.0 / 1_073_741_824.0, 1e-12));

        let p = binomial_test_two_sided(5, 10, 0.5).unwrap();
        assert!(close(p, 1.0, 1e-12));

        assert!(binomial_test_two_sided(11, 10, 0.5).is_err());
        assert!(binomial_test_two_sided(1, 10, 1.0).is_err());
    }

    #[test]
    fn test_average_ranks_with_ties() {
        let ranks = average_ranks(&[10.0, 20.0, 20.0, 5.0]);
        assert_eq!(ranks, vec![2.0, 3.5, 3.5, 1.0]);
    }

    #[test]
    fn test_spearman() {
        let result = spearman(&[3.0, 2.0, 1.0], &[0.15, 0.10, 0.05]).unwrap();
        assert!(close(result.rho, 1.0, 1e-12));
        assert_eq!(result.p_value, 0.0);

        let result = spearman(&[1.0, 2.0, 3.0, 4.0, 5.0], &[2.0, 1.0, 4.0, 3.0, 5.0]).unwrap();
        assert!(close(result.rho, 0.8, 1e-12));
        assert!(close(result.p_value, 0.104, 1e-3));

        assert!(spearman(&[1.0, 2.0], &[1.0, 2.0]).is_err());
        assert!(spearman(&[1.0, 2.0, 3.0], &[1.0, 2.0]).is_err());
        assert!(spearman(&[1.0, 1.0, 1.0], &[1.0, 2.0, 3.0]).is_err());
    }
}
