//! Prevalence analysis.
//!
//! Autism-savant association, domain specificity, prevalence intervals and
//! the autism severity gradient. All inputs are literature estimates.

use crate::domains::SavantDomain;
use crate::error::{FncError, FncResult};
use crate::stats::distributions::{chi_square_sf, fisher_exact, spearman, z_critical};
use serde::Serialize;
use std::fmt;
use tracing::debug;

/// A savant prevalence estimate for one population.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct PrevalenceEstimate {
    pub population: &'static str,
    pub savant_rate: f64,
    /// Rate for prodigious savants only, where reported.
    pub savant_rate_strict: Option<f64>,
    /// Rate including splinter skills, where reported.
    pub savant_rate_broad: Option<f64>,
    pub source: &'static str,
}

pub const PREVALENCE_DATA: [PrevalenceEstimate; 3] = [
    PrevalenceEstimate {
        population: "general_population",
        savant_rate: 1.0 / 1_000_000.0,
        savant_rate_strict: None,
        savant_rate_broad: None,
        source: "Treffert (2009)",
    },
    PrevalenceEstimate {
        population: "autism_population",
        savant_rate: 0.10,
        savant_rate_strict: Some(0.01),
        savant_rate_broad: Some(0.37),
        source: "Howlin et al. (2009)",
    },
    PrevalenceEstimate {
        population: "intellectual_disability",
        savant_rate: 0.01,
        savant_rate_strict: None,
        savant_rate_broad: None,
        source: "Hill (1977)",
    },
];

const ASSOCIATION_POPULATION: u64 = 1_000_000;
const AUTISM_PREVALENCE: f64 = 0.015;
const SAVANT_RATE_AUTISM: f64 = 0.10;
const SAVANT_RATE_GENERAL: f64 = 0.000_001;
const DOMAIN_SAMPLE_SIZE: f64 = 1000.0;
const RESIDUAL_THRESHOLD: f64 = 1.96;
/// Two-sided 95% normal quantile for the odds-ratio interval.
const Z_95: f64 = 1.96;

/// Cell counts of the autism x savant table.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ContingencyTable {
    pub autism_savant: u64,
    pub autism_non_savant: u64,
    pub non_autism_savant: u64,
    pub non_autism_non_savant: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct AssociationResult {
    pub test: String,
    pub odds_ratio: f64,
    pub ci_95: (f64, f64),
    pub p_value: f64,
    pub contingency_table: ContingencyTable,
    pub interpretation: String,
    pub fnc_implication: String,
}

/// Build the estimated population table and test autism-savant association.
pub fn autism_savant_association() -> AssociationResult {
    let n_autism = (ASSOCIATION_POPULATION as f64 * AUTISM_PREVALENCE) as u64;
    let n_non_autism = ASSOCIATION_POPULATION - n_autism;

    let savant_in_autism = (n_autism as f64 * SAVANT_RATE_AUTISM) as u64;
    let savant_in_non_autism = ((n_non_autism as f64 * SAVANT_RATE_GENERAL) as u64).max(1);

    // Savant cells are floored at one so the odds ratio stays finite.
    let a = savant_in_autism.max(1);
    let b = n_autism - a;
    let c = savant_in_non_autism.max(1);
    let d = n_non_autism - c;
    debug!("Association table: a={} b={} c={} d={}", a, b, c, d);

    let fisher = fisher_exact(a, b, c, d);
    let odds_ratio = fisher.odds_ratio;

    let log_or = if odds_ratio > 0.0 { odds_ratio.ln() } else { 0.0 };
    let se_log_or =
        (1.0 / a as f64 + 1.0 / b as f64 + 1.0 / c as f64 + 1.0 / d as f64).sqrt();
    let ci_95 = (
        (log_or - Z_95 * se_log_or).exp(),
        (log_or + Z_95 * se_log_or).exp(),
    );

    AssociationResult {
        test: "Fisher's Exact Test".to_string(),
        odds_ratio,
        ci_95,
        p_value: fisher.p_value,
        contingency_table: ContingencyTable {
            autism_savant: a,
            autism_non_savant: b,
            non_autism_savant: c,
            non_autism_non_savant: d,
        },
        interpretation: format!(
            "Autism is associated with {:.0}x higher odds of savant syndrome. \
             This strongly supports the FNC hypothesis that both conditions involve \
             similar Node modifications affecting Field access filtering.",
            odds_ratio
        ),
        fnc_implication: "The autism-savant co-occurrence suggests shared underlying mechanisms: \
                          reduced social/executive filtering enables enhanced domain-specific access."
            .to_string(),
    }
}

/// Representation of a domain relative to a uniform distribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Representation {
    #[serde(rename = "Over-represented")]
    Over,
    #[serde(rename = "Under-represented")]
    Under,
    #[serde(rename = "Expected range")]
    Expected,
}

impl fmt::Display for Representation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Representation::Over => write!(f, "Over-represented"),
            Representation::Under => write!(f, "Under-represented"),
            Representation::Expected => write!(f, "Expected range"),
        }
    }
}

impl Representation {
    fn from_residual(residual: f64) -> Self {
        if residual > RESIDUAL_THRESHOLD {
            Representation::Over
        } else if residual < -RESIDUAL_THRESHOLD {
            Representation::Under
        } else {
            Representation::Expected
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DomainAnalysis {
    pub domain: SavantDomain,
    pub observed: f64,
    pub expected: f64,
    pub std_residual: f64,
    pub status: Representation,
}

#[derive(Debug, Clone, Serialize)]
pub struct DomainSpecificityResult {
    pub test: String,
    pub chi_square: f64,
    pub df: usize,
    pub p_value: f64,
    pub effect_size_cramers_v: f64,
    pub domain_analysis: Vec<DomainAnalysis>,
    pub interpretation: String,
    pub fnc_implication: String,
}

impl DomainSpecificityResult {
    /// Domains flagged with the given representation, in table order.
    pub fn domains_with(&self, status: Representation) -> Vec<SavantDomain> {
        self.domain_analysis
            .iter()
            .filter(|d| d.status == status)
            .map(|d| d.domain)
            .collect()
    }
}

/// Chi-square goodness of fit of the domain distribution against uniform.
pub fn domain_specificity_test() -> FncResult<DomainSpecificityResult> {
    let k = SavantDomain::ALL.len();
    let expected_share = 1.0 / k as f64;
    let expected_count = expected_share * DOMAIN_SAMPLE_SIZE;

    let mut chi_square = 0.0;
    let mut domain_analysis = Vec::with_capacity(k);
    for domain in SavantDomain::ALL {
        let observed_count = domain.prevalence() * DOMAIN_SAMPLE_SIZE;
        let diff = observed_count - expected_count;
        chi_square += diff * diff / expected_count;

        let std_residual = diff / expected_count.sqrt();
        domain_analysis.push(DomainAnalysis {
            domain,
            observed: domain.prevalence(),
            expected: expected_share,
            std_residual,
            status: Representation::from_residual(std_residual),
        });
    }

    let df = k - 1;
    let p_value = chi_square_sf(chi_square, df)?;
    let cramers_v = (chi_square / (DOMAIN_SAMPLE_SIZE * df as f64)).sqrt();

    let mut result = DomainSpecificityResult {
        test: "Chi-Square Goodness of Fit".to_string(),
        chi_square,
        df,
        p_value,
        effect_size_cramers_v: cramers_v,
        domain_analysis,
        interpretation: String::new(),
        fnc_implication: "The clustering of abilities in specific domains supports the FNC hypothesis \
                          that the Field has structured information channels. Music (harmonic ratios) \
                          and Art (geometric invariants) may be 'louder' or more accessible channels."
            .to_string(),
    };

    let over: Vec<&str> = result
        .domains_with(Representation::Over)
        .iter()
        .map(|d| d.name())
        .collect();
    let over_text = match over.len() {
        0 => "No domain is significantly over-represented.".to_string(),
        1 => format!("{} is significantly over-represented.", over[0]),
        _ => format!("{} are significantly over-represented.", join_names(&over)),
    };
    let distribution = if p_value < 0.05 { "non-uniformly" } else { "not detectably non-uniformly" };
    result.interpretation = format!(
        "Savant abilities are {} distributed across domains (χ² = {:.1}, {}, V = {:.2}). {}",
        distribution,
        chi_square,
        format_p(p_value),
        cramers_v,
        over_text
    );

    Ok(result)
}

/// Join names as "A", "A and B" or "A, B and C".
fn join_names(names: &[&str]) -> String {
    match names {
        [] => String::new(),
        [only] => only.to_string(),
        [init @ .., last] => format!("{} and {}", init.join(", "), last),
    }
}

/// APA-style p-value text.
pub fn format_p(p: f64) -> String {
    if p < 0.001 {
        "p < .001".to_string()
    } else {
        format!("p = {:.3}", p)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PrevalenceInterval {
    pub method: String,
    pub point_estimate: f64,
    pub ci_level: f64,
    pub ci_lower: f64,
    pub ci_upper: f64,
    pub sample_size: u64,
    pub n_savants: u64,
}

/// Wilson score interval for an observed savant proportion.
pub fn prevalence_confidence_intervals(
    n_savants: u64,
    n_total: u64,
    confidence: f64,
) -> FncResult<PrevalenceInterval> {
    if n_total == 0 {
        return Err(FncError::InvalidParameter(
            "total sample size must be positive".to_string(),
        ));
    }
    if n_savants > n_total {
        return Err(FncError::InvalidParameter(format!(
            "savant count {} exceeds sample size {}",
            n_savants, n_total
        )));
    }

    let z = z_critical(confidence)?;
    let n = n_total as f64;
    let p_hat = n_savants as f64 / n;
    let z2 = z * z;

    let denominator = 1.0 + z2 / n;
    let center = (p_hat + z2 / (2.0 * n)) / denominator;
    let margin = z * ((p_hat * (1.0 - p_hat) + z2 / (4.0 * n)) / n).sqrt() / denominator;

    Ok(PrevalenceInterval {
        method: "Wilson Score Interval".to_string(),
        point_estimate: p_hat,
        ci_level: confidence,
        ci_lower: (center - margin).max(0.0),
        ci_upper: (center + margin).min(1.0),
        sample_size: n_total,
        n_savants,
    })
}

/// One autism support level in the severity gradient.
#[derive(Debug, Clone, Serialize)]
pub struct GradientLevel {
    pub label: &'static str,
    pub support_level: u8,
    pub savant_prevalence: f64,
    pub typical_domains: Vec<&'static str>,
    pub fnc_interpretation: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct TrendTest {
    pub method: String,
    pub rho: f64,
    pub p_value: f64,
    pub direction: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct GradientResult {
    pub gradient_data: Vec<GradientLevel>,
    pub trend_test: TrendTest,
    pub significant: bool,
    pub interpretation: String,
    pub fnc_implication: String,
}

fn gradient_levels() -> Vec<GradientLevel> {
    vec![
        GradientLevel {
            label: "High Support Needs (Level 3)",
            support_level: 3,
            savant_prevalence: 0.15,
            typical_domains: vec!["Calendar", "Music"],
            fnc_interpretation: "Maximal filtering reduction → deep but narrow access",
        },
        GradientLevel {
            label: "Moderate Support (Level 2)",
            support_level: 2,
            savant_prevalence: 0.10,
            typical_domains: vec!["Art", "Music", "Mathematics"],
            fnc_interpretation: "Moderate filtering → balanced access profile",
        },
        GradientLevel {
            label: "Low Support (Level 1)",
            support_level: 1,
            savant_prevalence: 0.05,
            typical_domains: vec!["Mathematics", "Language", "Memory"],
            fnc_interpretation: "Mild filtering change → broader but shallower access",
        },
    ]
}

/// Trend test of savant prevalence across autism support levels.
pub fn autism_savant_gradient() -> FncResult<GradientResult> {
    let levels = gradient_levels();
    let support: Vec<f64> = levels.iter().map(|l| l.support_level as f64).collect();
    let prevalence: Vec<f64> = levels.iter().map(|l| l.savant_prevalence).collect();

    let trend = spearman(&support, &prevalence)?;
    let significant = trend.p_value < 0.05;

    Ok(GradientResult {
        gradient_data: levels,
        trend_test: TrendTest {
            method: "Spearman Correlation".to_string(),
            rho: trend.rho,
            p_value: trend.p_value,
            direction: if trend.rho > 0.0 { "positive" } else { "negative" }.to_string(),
        },
        significant,
        interpretation: format!(
            "There is a {} trend (ρ = {:.2}) between autism severity and savant prevalence.",
            if significant { "significant" } else { "non-significant" },
            trend.rho
        ),
        fnc_implication: "The gradient supports FNC: more pronounced Node modifications \
                          (higher support needs) correlate with higher savant rates, \
                          suggesting a dose-response relationship in Field access alterations."
            .to_string(),
    })
}

/// Every prevalence analysis in one bundle.
#[derive(Debug, Clone, Serialize)]
pub struct PrevalenceAnalyses {
    pub autism_savant_association: AssociationResult,
    pub domain_specificity: DomainSpecificityResult,
    pub prevalence_interval: PrevalenceInterval,
    pub autism_gradient: GradientResult,
    pub meta_interpretation: String,
}

pub fn run_all_analyses() -> FncResult<PrevalenceAnalyses> {
    Ok(PrevalenceAnalyses {
        autism_savant_association: autism_savant_association(),
        domain_specificity: domain_specificity_test()?,
        prevalence_interval: prevalence_confidence_intervals(100, 1000, 0.95)?,
        autism_gradient: autism_savant_gradient()?,
        meta_interpretation: "All statistical analyses support the FNC framework:\n\
                              1. Strong autism-savant association → shared Node mechanisms\n\
                              2. Non-random domain distribution → structured Field channels\n\
                              3. Severity gradient → dose-response in tuning modification"
            .to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_association_table() {
        let result = autism_savant_association();
        let table = result.contingency_table;
        assert_eq!(table.autism_savant, 1500);
        assert_eq!(table.autism_non_savant, 13_500);
        assert_eq!(table.non_autism_savant, 1);
        assert_eq!(table.non_autism_non_savant, 984_999);

        assert!((result.odds_ratio - 109_444.33).abs() < 0.01);
        assert!(result.p_value < 1e-10);
        assert!(result.ci_95.0 < result.odds_ratio && result.odds_ratio < result.ci_95.1);
        assert!(result.interpretation.starts_with("Autism is associated with 109444x"));
    }

    #[test]
    fn test_odds_ratio_interval_uses_normal_quantile() {
        let result = autism_savant_association();
        let t = result.contingency_table;
        let se = (1.0 / t.autism_savant as f64
            + 1.0 / t.autism_non_savant as f64
            + 1.0 / t.non_autism_savant as f64
            + 1.0 / t.non_autism_non_savant as f64)
            .sqrt();
        let log_or = result.odds_ratio.ln();
        assert!((result.ci_95.1.ln() - log_or - Z_95 * se).abs() < 1e-9);
        assert!((log_or - result.ci_95.0.ln() - Z_95 * se).abs() < 1e-9);
        assert!((Z_95 - crate::stats::distributions::z_critical(0.95).unwrap()).abs() < 1e-3);
    }

    #[test]
    fn test_domain_specificity() {
        let result = domain_specificity_test().unwrap();
        assert_eq!(result.df, 5);
        assert!((result.chi_square - 426.8).abs() < 0.01);
        assert!((result.effect_size_cramers_v - 0.2922).abs() < 1e-3);
        assert!(result.p_value < 0.001);

        assert_eq!(
            result.domains_with(Representation::Over),
            vec![SavantDomain::Music, SavantDomain::Art]
        );
        assert_eq!(
            result.domains_with(Representation::Under),
            vec![
                SavantDomain::Mathematics,
                SavantDomain::Mechanical,
                SavantDomain::Language
            ]
        );
        assert_eq!(
            result.domains_with(Representation::Expected),
            vec![SavantDomain::Calendar]
        );
        assert!(result
            .interpretation
            .contains("Music and Art are significantly over-represented."));
        assert!(result.interpretation.contains("p < .001"));
    }

    #[test]
    fn test_wilson_interval() {
        let ci = prevalence_confidence_intervals(100, 1000, 0.95).unwrap();
        assert!((ci.point_estimate - 0.1).abs() < 1e-12);
        assert!((ci.ci_lower - 0.0829).abs() < 1e-3);
        assert!((ci.ci_upper - 0.1202).abs() < 1e-3);

        let ci = prevalence_confidence_intervals(0, 50, 0.95).unwrap();
        assert_eq!(ci.ci_lower, 0.0);
        assert!(ci.ci_upper > 0.0);
    }

    #[test]
    fn test_wilson_invalid_inputs() {
        assert!(prevalence_confidence_intervals(1, 0, 0.95).is_err());
        assert!(prevalence_confidence_intervals(11, 10, 0.95).is_err());
        assert!(prevalence_confidence_intervals(1, 10, 1.0).is_err());
    }

    #[test]
    fn test_gradient_trend() {
        let result = autism_savant_gradient().unwrap();
        assert!((result.trend_test.rho - 1.0).abs() < 1e-12);
        assert_eq!(result.trend_test.p_value, 0.0);
        assert_eq!(result.trend_test.direction, "positive");
        assert!(result.significant);
        assert!(result.interpretation.contains("significant trend (ρ = 1.00)"));
        assert_eq!(result.gradient_data.len(), 3);
    }

    #[test]
    fn test_join_names() {
        assert_eq!(join_names(&["Music"]), "Music");
        assert_eq!(join_names(&["Music", "Art"]), "Music and Art");
        assert_eq!(join_names(&["A", "B", "C"]), "A, B and C");
    }

    #[test]
    fn test_run_all_analyses() {
        let all = run_all_analyses().unwrap();
        assert!(all.meta_interpretation.contains("structured Field channels"));
        assert_eq!(all.prevalence_interval.n_savants, 100);
    }
}
