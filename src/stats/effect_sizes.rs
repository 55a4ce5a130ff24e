//! Effect size analysis.
//!
//! Cohen's d for the TMS/tDCS enhancement studies, a sample-size weighted
//! meta-analysis, and the lateralization of acquired savant lesions.

use crate::domains::SavantDomain;
use crate::error::{FncError, FncResult};
use crate::stats::distributions::binomial_test_two_sided;
use serde::Serialize;
use std::fmt;

/// A published brain stimulation study with pre/post task scores.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct TmsStudy {
    pub name: &'static str,
    pub domain: &'static str,
    pub n: u32,
    pub pre_mean: f64,
    pub pre_sd: f64,
    pub post_mean: f64,
    pub post_sd: f64,
    pub paradigm: &'static str,
    pub duration_minutes: u32,
}

pub const TMS_STUDIES: [TmsStudy; 5] = [
    TmsStudy {
        name: "Snyder & Mitchell (1999)",
        domain: "Drawing",
        n: 12,
        pre_mean: 2.5,
        pre_sd: 1.2,
        post_mean: 5.8,
        post_sd: 1.5,
        paradigm: "rTMS left frontotemporal",
        duration_minutes: 15,
    },
    TmsStudy {
        name: "Snyder et al. (2003)",
        domain: "Numerosity",
        n: 12,
        pre_mean: 45.0,
        pre_sd: 12.0,
        post_mean: 65.0,
        post_sd: 15.0,
        paradigm: "rTMS left anterior temporal",
        duration_minutes: 15,
    },
    TmsStudy {
        name: "Young et al. (2004)",
        domain: "Proofreading",
        n: 8,
        pre_mean: 62.0,
        pre_sd: 18.0,
        post_mean: 78.0,
        post_sd: 14.0,
        paradigm: "rTMS left temporal",
        duration_minutes: 15,
    },
    TmsStudy {
        name: "Chi & Snyder (2011)",
        domain: "Insight problems",
        n: 33,
        pre_mean: 20.0,
        pre_sd: 25.0,
        post_mean: 60.0,
        post_sd: 30.0,
        paradigm: "tDCS (cathodal left, anodal right ATL)",
        duration_minutes: 10,
    },
    TmsStudy {
        name: "Chi & Snyder (2012)",
        domain: "Matchstick arithmetic",
        n: 22,
        pre_mean: 5.0,
        pre_sd: 10.0,
        post_mean: 40.0,
        post_sd: 25.0,
        paradigm: "tDCS (cathodal left, anodal right ATL)",
        duration_minutes: 10,
    },
];

/// Default pre/post correlation assumed for repeated measures.
pub const DEFAULT_PRE_POST_CORRELATION: f64 = 0.5;

/// Cohen's conventional effect size bands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Magnitude {
    Negligible,
    Small,
    Medium,
    Large,
}

impl fmt::Display for Magnitude {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Magnitude::Negligible => write!(f, "negligible"),
            Magnitude::Small => write!(f, "small"),
            Magnitude::Medium => write!(f, "medium"),
            Magnitude::Large => write!(f, "large"),
        }
    }
}

impl Magnitude {
    pub fn from_d(d: f64) -> Self {
        let d = d.abs();
        if d < 0.2 {
            Magnitude::Negligible
        } else if d < 0.5 {
            Magnitude::Small
        } else if d < 0.8 {
            Magnitude::Medium
        } else {
            Magnitude::Large
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct EffectSize {
    pub cohens_d: f64,
    pub ci_lower: f64,
    pub ci_upper: f64,
    pub magnitude: Magnitude,
    pub interpretation: String,
}

/// Cohen's d for a paired pre/post design.
///
/// The standard error follows Hedges & Olkin (1985) with the given
/// pre/post correlation.
pub fn cohens_d_paired(
    pre_mean: f64,
    post_mean: f64,
    pre_sd: f64,
    post_sd: f64,
    n: u32,
    correlation: f64,
) -> FncResult<EffectSize> {
    if n == 0 {
        return Err(FncError::InvalidParameter(
            "sample size must be positive".to_string(),
        ));
    }

    let sd_pooled = ((pre_sd * pre_sd + post_sd * post_sd) / 2.0).sqrt();
    if sd_pooled == 0.0 || !sd_pooled.is_finite() {
        return Err(FncError::InvalidParameter(
            "pooled standard deviation must be positive".to_string(),
        ));
    }

    let n = n as f64;
    let d = (post_mean - pre_mean) / sd_pooled;
    let se_d = (2.0 * (1.0 - correlation) / n + d * d / (2.0 * n)).sqrt();
    let magnitude = Magnitude::from_d(d);

    Ok(EffectSize {
        cohens_d: d,
        ci_lower: d - 1.96 * se_d,
        ci_upper: d + 1.96 * se_d,
        magnitude,
        interpretation: format!(
            "d = {:.2} ({} effect). The intervention produced a {:.1} SD change.",
            d,
            magnitude,
            d.abs()
        ),
    })
}

#[derive(Debug, Clone, Serialize)]
pub struct StudyEffect {
    pub study: &'static str,
    pub domain: &'static str,
    pub paradigm: &'static str,
    pub n: u32,
    pub effect: EffectSize,
}

#[derive(Debug, Clone, Serialize)]
pub struct MetaAnalysis {
    pub weighted_mean_d: f64,
    pub q_statistic: f64,
    pub k_studies: usize,
    pub total_n: u32,
    pub interpretation: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TmsImplications {
    pub key_finding: String,
    pub temporary_effects: String,
    pub domain_specificity: String,
    pub testable_prediction: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TmsEffects {
    pub studies: Vec<StudyEffect>,
    pub meta_analysis: MetaAnalysis,
    pub fnc_implications: TmsImplications,
}

/// Sample-size weighted mean effect with Cochran's Q.
pub fn meta_analyze(effects: &[(f64, u32)]) -> FncResult<MetaAnalysis> {
    let total_n: u32 = effects.iter().map(|&(_, n)| n).sum();
    if effects.is_empty() || total_n == 0 {
        return Err(FncError::EmptyInput(
            "meta-analysis needs at least one weighted study".to_string(),
        ));
    }

    let weighted_mean_d = effects.iter().map(|&(d, n)| d * n as f64).sum::<f64>() / total_n as f64;
    let q_statistic = effects
        .iter()
        .map(|&(d, n)| n as f64 * (d - weighted_mean_d).powi(2))
        .sum();
    let k = effects.len();

    Ok(MetaAnalysis {
        weighted_mean_d,
        q_statistic,
        k_studies: k,
        total_n,
        interpretation: format!(
            "Across {} studies (N={}), TMS/tDCS produced a weighted mean effect of d = {:.2}. \
             This is a {} effect, strongly supporting the FNC hypothesis that Node modification \
             can temporarily enhance Field access.",
            k,
            total_n,
            weighted_mean_d,
            if weighted_mean_d >= 0.8 { "large" } else { "medium" }
        ),
    })
}

pub fn tms_enhancement_effects() -> FncResult<TmsEffects> {
    let studies = TMS_STUDIES
        .iter()
        .map(|s| {
            let effect = cohens_d_paired(
                s.pre_mean,
                s.post_mean,
                s.pre_sd,
                s.post_sd,
                s.n,
                DEFAULT_PRE_POST_CORRELATION,
            )?;
            Ok(StudyEffect {
                study: s.name,
                domain: s.domain,
                paradigm: s.paradigm,
                n: s.n,
                effect,
            })
        })
        .collect::<FncResult<Vec<_>>>()?;

    let pairs: Vec<(f64, u32)> = studies.iter().map(|s| (s.effect.cohens_d, s.n)).collect();
    let meta_analysis = meta_analyze(&pairs)?;

    Ok(TmsEffects {
        studies,
        meta_analysis,
        fnc_implications: TmsImplications {
            key_finding: "All studies show substantial effects (d > 0.5) from left hemisphere \
                          inhibition, consistent with FNC prediction that reducing analytical \
                          filtering broadens Field access."
                .to_string(),
            temporary_effects: "Effects are temporary (minutes to hours), suggesting Node tuning \
                                is dynamic and can be modulated without permanent change."
                .to_string(),
            domain_specificity: "Enhanced abilities span multiple domains (drawing, numerosity, \
                                 insight), suggesting Field contains multiple accessible channels."
                .to_string(),
            testable_prediction: "FNC predicts that individual differences in TMS response correlate \
                                  with baseline autistic traits (stronger response in higher-trait individuals)."
                .to_string(),
        },
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Hemisphere {
    Left,
    Right,
}

/// Aggregated acquired savant cases for one lesion site.
#[derive(Debug, Clone, Serialize)]
pub struct LesionSite {
    pub location: &'static str,
    pub hemisphere: Hemisphere,
    pub n_cases: u32,
    pub primary_domains: Vec<SavantDomain>,
    pub mean_onset_days: u32,
    pub fnc_interpretation: &'static str,
    pub proportion: f64,
}

fn lesion_sites() -> Vec<LesionSite> {
    use SavantDomain::*;

    let raw = [
        ("left_temporal", Hemisphere::Left, 15, vec![Music, Art], 7, "Auditory/visual processing release"),
        ("left_frontotemporal", Hemisphere::Left, 8, vec![Art, Mechanical], 14, "Executive filter reduction"),
        ("left_parietal", Hemisphere::Left, 5, vec![Mathematics, Calendar], 3, "Spatial-numerical access"),
        ("right_hemisphere", Hemisphere::Right, 2, vec![Language], 30, "Unusual pattern - needs investigation"),
    ];

    let total: u32 = raw.iter().map(|r| r.2).sum();
    raw.into_iter()
        .map(
            |(location, hemisphere, n_cases, primary_domains, mean_onset_days, fnc_interpretation)| {
                LesionSite {
                    location,
                    hemisphere,
                    n_cases,
                    primary_domains,
                    mean_onset_days,
                    fnc_interpretation,
                    proportion: n_cases as f64 / total as f64,
                }
            },
        )
        .collect()
}

#[derive(Debug, Clone, Serialize)]
pub struct Lateralization {
    pub left_hemisphere: u32,
    pub right_hemisphere: u32,
    pub left_proportion: f64,
    pub binomial_p: f64,
    pub significant: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct LesionImplications {
    pub hemisphere_specialization: String,
    pub location_specificity: String,
    pub onset_timing: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LesionEffects {
    pub lesion_data: Vec<LesionSite>,
    pub lateralization: Lateralization,
    pub interpretation: String,
    pub fnc_implications: LesionImplications,
}

pub fn lesion_effect_analysis() -> FncResult<LesionEffects> {
    let lesion_data = lesion_sites();

    let count = |side: Hemisphere| -> u32 {
        lesion_data
            .iter()
            .filter(|s| s.hemisphere == side)
            .map(|s| s.n_cases)
            .sum()
    };
    let left = count(Hemisphere::Left);
    let right = count(Hemisphere::Right);
    let total: u32 = lesion_data.iter().map(|s| s.n_cases).sum();

    let binomial_p = binomial_test_two_sided(left as u64, (left + right) as u64, 0.5)?;
    let left_proportion = left as f64 / total as f64;

    Ok(LesionEffects {
        interpretation: format!(
            "Left hemisphere lesions account for {}/{} ({:.0}%) of acquired savant cases. \
             This lateralization is {} (p = {:.4}).",
            left,
            total,
            100.0 * left_proportion,
            if binomial_p < 0.05 {
                "statistically significant"
            } else {
                "not statistically significant"
            },
            binomial_p
        ),
        lesion_data,
        lateralization: Lateralization {
            left_hemisphere: left,
            right_hemisphere: right,
            left_proportion,
            binomial_p,
            significant: binomial_p < 0.05,
        },
        fnc_implications: LesionImplications {
            hemisphere_specialization: "Left hemisphere appears to provide primary filtering/inhibition. \
                                        Damage releases right hemisphere's direct Field access."
                .to_string(),
            location_specificity: "Different lesion locations correlate with different emerging domains, \
                                   supporting FNC's channel-specific access model."
                .to_string(),
            onset_timing: "Faster onset (parietal) vs slower (frontotemporal) may reflect \
                           different reconfiguration requirements for Node stabilization."
                .to_string(),
        },
    })
}

#[derive(Debug, Clone, Serialize)]
pub struct EffectSummary {
    pub key_findings: Vec<String>,
    pub implications_for_fnc: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AllEffects {
    pub tms_effects: TmsEffects,
    pub lesion_effects: LesionEffects,
    pub summary: EffectSummary,
}

pub fn calculate_all_effects() -> FncResult<AllEffects> {
    let tms_effects = tms_enhancement_effects()?;
    let lesion_effects = lesion_effect_analysis()?;

    let mean_d = tms_effects.meta_analysis.weighted_mean_d;
    let key_findings = vec![
        format!(
            "TMS/tDCS produces {} effects (d ≈ {:.2}) in enhancing savant-like abilities",
            Magnitude::from_d(mean_d),
            mean_d
        ),
        format!(
            "Left hemisphere lesions dominate acquired savant cases (~{:.0}%)",
            100.0 * lesion_effects.lateralization.left_proportion
        ),
        "Effect sizes support FNC's Node modification hypothesis".to_string(),
        "Both temporary (TMS) and permanent (lesion) modifications alter Field access".to_string(),
    ];

    Ok(AllEffects {
        tms_effects,
        lesion_effects,
        summary: EffectSummary {
            key_findings,
            implications_for_fnc: "The consistency of large effect sizes across multiple paradigms \
                                   (TMS, tDCS, lesions) strongly supports the FNC framework. \
                                   The brain's 'tuning' can be modified to alter Field access, \
                                   producing savant-like abilities in neurotypical individuals."
                .to_string(),
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cohens_d_paired() {
        let effect = cohens_d_paired(2.5, 5.8, 1.2, 1.5, 12, 0.5).unwrap();
        assert!((effect.cohens_d - 2.4295).abs() < 1e-3);
        assert_eq!(effect.magnitude, Magnitude::Large);
        assert!(effect.ci_lower < effect.cohens_d && effect.cohens_d < effect.ci_upper);
        assert!(effect.interpretation.starts_with("d = 2.43 (large effect)"));
    }

    #[test]
    fn test_cohens_d_invalid() {
        assert!(cohens_d_paired(1.0, 2.0, 1.0, 1.0, 0, 0.5).is_err());
        assert!(cohens_d_paired(1.0, 2.0, 0.0, 0.0, 10, 0.5).is_err());
    }

    #[test]
    fn test_magnitude_bands() {
        assert_eq!(Magnitude::from_d(0.1), Magnitude::Negligible);
        assert_eq!(Magnitude::from_d(-0.3), Magnitude::Small);
        assert_eq!(Magnitude::from_d(0.5), Magnitude::Medium);
        assert_eq!(Magnitude::from_d(0.8), Magnitude::Large);
    }

    #[test]
    fn test_tms_meta_analysis() {
        let tms = tms_enhancement_effects().unwrap();
        let expected = [2.4295, 1.4724, 0.9923, 1.4486, 1.8383];
        for (study, d) in tms.studies.iter().zip(expected) {
            assert!((study.effect.cohens_d - d).abs() < 1e-3, "{}", study.study);
            assert!(study.effect.cohens_d > 0.5);
        }

        let meta = &tms.meta_analysis;
        assert_eq!(meta.k_studies, 5);
        assert_eq!(meta.total_n, 87);
        assert!((meta.weighted_mean_d - 1.644).abs() < 1e-3);
        assert!(meta.q_statistic > 0.0);
        assert!(meta.interpretation.contains("This is a large effect"));
    }

    #[test]
    fn test_meta_analyze_empty() {
        assert!(meta_analyze(&[]).is_err());
    }

    #[test]
    fn test_lesion_lateralization() {
        let lesion = lesion_effect_analysis().unwrap();
        let lat = &lesion.lateralization;
        assert_eq!(lat.left_hemisphere, 28);
        assert_eq!(lat.right_hemisphere, 2);
        assert!((lat.left_proportion - 28.0 / 30.0).abs() < 1e-12);
        assert!((lat.binomial_p - 8.68e-7).abs() < 1e-9);
        assert!(lat.significant);

        let total: f64 = lesion.lesion_data.iter().map(|s| s.proportion).sum();
        assert!((total - 1.0).abs() < 1e-12);
        assert!(lesion.interpretation.contains("28/30 (93%)"));
    }

    #[test]
    fn test_key_findings_use_data() {
        let all = calculate_all_effects().unwrap();
        assert!(all.summary.key_findings[0].contains("large effects (d ≈ 1.64)"));
        assert!(all.summary.key_findings[1].contains("~93%"));
    }
}
