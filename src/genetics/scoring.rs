//! FNC gene scoring.
//!
//! Translates variant-affected genes into scores on five Node tuning
//! dimensions, then predicts the savant domain the profile fits best.

use crate::domains::SavantDomain;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the five Node tuning dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TuningDimension {
    Frequency,
    Filtering,
    Integration,
    Bandwidth,
    Pattern,
}

impl fmt::Display for TuningDimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

impl TuningDimension {
    pub const ALL: [TuningDimension; 5] = [
        TuningDimension::Frequency,
        TuningDimension::Filtering,
        TuningDimension::Integration,
        TuningDimension::Bandwidth,
        TuningDimension::Pattern,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            TuningDimension::Frequency => "frequency",
            TuningDimension::Filtering => "filtering",
            TuningDimension::Integration => "integration",
            TuningDimension::Bandwidth => "bandwidth",
            TuningDimension::Pattern => "pattern",
        }
    }

    /// Weight of the dimension in the overall score.
    pub fn overall_weight(&self) -> f64 {
        match self {
            TuningDimension::Frequency => 0.20,
            TuningDimension::Filtering => 0.25,
            TuningDimension::Integration => 0.25,
            TuningDimension::Bandwidth => 0.15,
            TuningDimension::Pattern => 0.15,
        }
    }

    /// What the dimension means for information processing.
    pub fn description(&self) -> &'static str {
        match self {
            TuningDimension::Frequency => "oscillation/timing processing",
            TuningDimension::Filtering => "information gating",
            TuningDimension::Integration => "signal combination",
            TuningDimension::Bandwidth => "information throughput",
            TuningDimension::Pattern => "structure recognition",
        }
    }
}

/// A gene that contributes to one tuning dimension.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct TuningGene {
    pub symbol: &'static str,
    pub weight: f64,
    pub direction: &'static str,
}

const fn gene(symbol: &'static str, weight: f64, direction: &'static str) -> TuningGene {
    TuningGene {
        symbol,
        weight,
        direction,
    }
}

const FREQUENCY_GENES: [TuningGene; 8] = [
    gene("CACNA1C", 0.9, "frequency_shift"),
    gene("CACNA1D", 0.7, "frequency_shift"),
    gene("SCN1A", 0.85, "frequency_shift"),
    gene("SCN2A", 0.85, "frequency_shift"),
    gene("SCN8A", 0.75, "frequency_shift"),
    gene("KCNQ2", 0.6, "frequency_modulation"),
    gene("KCNQ3", 0.6, "frequency_modulation"),
    gene("HCN1", 0.7, "pacemaking"),
];

const FILTERING_GENES: [TuningGene; 7] = [
    gene("GABRA1", 0.9, "inhibition"),
    gene("GABRB2", 0.8, "inhibition"),
    gene("GABRG2", 0.75, "inhibition"),
    gene("GRIN2A", 0.85, "excitation"),
    gene("GRIN2B", 0.85, "excitation"),
    gene("GRIA1", 0.7, "excitation"),
    gene("SLC6A1", 0.8, "gaba_transport"),
];

const INTEGRATION_GENES: [TuningGene; 7] = [
    gene("SHANK3", 0.95, "scaffolding"),
    gene("SHANK2", 0.8, "scaffolding"),
    gene("NRXN1", 0.9, "adhesion"),
    gene("NRXN2", 0.7, "adhesion"),
    gene("NLGN3", 0.75, "postsynaptic"),
    gene("NLGN4X", 0.7, "postsynaptic"),
    gene("SYNGAP1", 0.85, "plasticity"),
];

const BANDWIDTH_GENES: [TuningGene; 6] = [
    gene("MBP", 0.9, "myelin_structure"),
    gene("PLP1", 0.85, "myelin_structure"),
    gene("CNP", 0.7, "myelin_maintenance"),
    gene("CNTNAP2", 0.95, "node_ranvier"),
    gene("CNTN1", 0.6, "axon_guidance"),
    gene("MAG", 0.7, "myelin_axon"),
];

const PATTERN_GENES: [TuningGene; 4] = [
    gene("FOXP2", 0.8, "language_pattern"),
    gene("CNTNAP2", 0.85, "language_circuit"),
    gene("ATP2C2", 0.5, "language_associated"),
    gene("CMIP", 0.5, "language_associated"),
];

/// Genes for a tuning dimension.
pub fn genes_for(dimension: TuningDimension) -> &'static [TuningGene] {
    match dimension {
        TuningDimension::Frequency => &FREQUENCY_GENES,
        TuningDimension::Filtering => &FILTERING_GENES,
        TuningDimension::Integration => &INTEGRATION_GENES,
        TuningDimension::Bandwidth => &BANDWIDTH_GENES,
        TuningDimension::Pattern => &PATTERN_GENES,
    }
}

/// The complete Node tuning gene table, by dimension.
pub fn node_tuning_genes() -> Vec<(TuningDimension, &'static [TuningGene])> {
    TuningDimension::ALL
        .iter()
        .map(|&d| (d, genes_for(d)))
        .collect()
}

fn find_gene(dimension: TuningDimension, symbol: &str) -> Option<&'static TuningGene> {
    genes_for(dimension)
        .iter()
        .find(|g| g.symbol.eq_ignore_ascii_case(symbol.trim()))
}

/// Functional impact of a variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VariantImpact {
    High,
    #[default]
    Moderate,
    Low,
    /// Any impact label outside the three known levels.
    #[serde(other)]
    Unknown,
}

impl VariantImpact {
    pub fn multiplier(&self) -> f64 {
        match self {
            VariantImpact::High => 1.0,
            VariantImpact::Moderate => 0.6,
            VariantImpact::Low => 0.3,
            VariantImpact::Unknown => 0.5,
        }
    }
}

impl From<&str> for VariantImpact {
    fn from(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "high" => VariantImpact::High,
            "moderate" => VariantImpact::Moderate,
            "low" => VariantImpact::Low,
            _ => VariantImpact::Unknown,
        }
    }
}

impl fmt::Display for VariantImpact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VariantImpact::High => write!(f, "high"),
            VariantImpact::Moderate => write!(f, "moderate"),
            VariantImpact::Low => write!(f, "low"),
            VariantImpact::Unknown => write!(f, "unknown"),
        }
    }
}

/// A gene hit by a variant, with the variant's impact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariantGene {
    pub gene: String,
    #[serde(default)]
    pub impact: VariantImpact,
}

impl VariantGene {
    pub fn new(gene: &str, impact: VariantImpact) -> Self {
        Self {
            gene: gene.to_string(),
            impact,
        }
    }
}

/// A gene's contribution to each dimension it belongs to.
pub fn calculate_gene_contribution(
    gene: &str,
    impact: VariantImpact,
) -> Vec<(TuningDimension, f64)> {
    TuningDimension::ALL
        .iter()
        .filter_map(|&d| find_gene(d, gene).map(|g| (d, g.weight * impact.multiplier())))
        .collect()
}

/// Scores on the five tuning dimensions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct TuningProfile {
    pub frequency: f64,
    pub filtering: f64,
    pub integration: f64,
    pub bandwidth: f64,
    pub pattern: f64,
}

impl TuningProfile {
    pub fn get(&self, dimension: TuningDimension) -> f64 {
        match dimension {
            TuningDimension::Frequency => self.frequency,
            TuningDimension::Filtering => self.filtering,
            TuningDimension::Integration => self.integration,
            TuningDimension::Bandwidth => self.bandwidth,
            TuningDimension::Pattern => self.pattern,
        }
    }

    fn get_mut(&mut self, dimension: TuningDimension) -> &mut f64 {
        match dimension {
            TuningDimension::Frequency => &mut self.frequency,
            TuningDimension::Filtering => &mut self.filtering,
            TuningDimension::Integration => &mut self.integration,
            TuningDimension::Bandwidth => &mut self.bandwidth,
            TuningDimension::Pattern => &mut self.pattern,
        }
    }

    pub fn max(&self) -> f64 {
        TuningDimension::ALL
            .iter()
            .map(|&d| self.get(d))
            .fold(f64::NEG_INFINITY, f64::max)
    }

    /// Weighted overall score.
    pub fn overall(&self) -> f64 {
        TuningDimension::ALL
            .iter()
            .map(|&d| self.get(d) * d.overall_weight())
            .sum()
    }

    /// Dimensions sorted by descending score, ties in table order.
    pub fn ranked(&self) -> Vec<(TuningDimension, f64)> {
        let mut dims: Vec<(TuningDimension, f64)> =
            TuningDimension::ALL.iter().map(|&d| (d, self.get(d))).collect();
        dims.sort_by(|a, b| b.1.total_cmp(&a.1));
        dims
    }
}

/// Domain predicted from a tuning profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PredictedDomain {
    Music,
    Mathematics,
    Art,
    Calendar,
    Undetermined,
}

impl fmt::Display for PredictedDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PredictedDomain::Music => write!(f, "Music"),
            PredictedDomain::Mathematics => write!(f, "Mathematics"),
            PredictedDomain::Art => write!(f, "Art"),
            PredictedDomain::Calendar => write!(f, "Calendar"),
            PredictedDomain::Undetermined => write!(f, "Undetermined"),
        }
    }
}

/// First matching rule wins.
pub fn predict_domain(profile: &TuningProfile) -> PredictedDomain {
    if profile.frequency > 0.7 && profile.pattern > 0.5 {
        PredictedDomain::Music
    } else if profile.integration > 0.7 && profile.frequency > 0.5 {
        PredictedDomain::Mathematics
    } else if profile.bandwidth > 0.7 {
        PredictedDomain::Art
    } else if profile.integration > 0.6 && profile.pattern > 0.6 {
        PredictedDomain::Calendar
    } else {
        PredictedDomain::Undetermined
    }
}

pub fn generate_interpretation(profile: &TuningProfile, domain: PredictedDomain) -> String {
    let ranked = profile.ranked();
    let dominant = ranked[0].0;
    let weakest = ranked[ranked.len() - 1].0;

    format!(
        "FNC Profile: Strong {}, reduced {}. \
         This pattern is consistent with {} domain access, \
         suggesting Node tuning that prioritizes {} over {}.",
        dominant.description(),
        weakest.description(),
        domain,
        dominant,
        weakest
    )
}

#[derive(Debug, Clone, Serialize)]
pub struct FncTuningScore {
    pub profile: TuningProfile,
    pub overall_score: f64,
    pub predicted_domain: PredictedDomain,
    pub interpretation: String,
}

/// Accumulate variant contributions into a tuning profile.
///
/// With `normalize`, scores are divided by the largest dimension score
/// unless every score is zero.
pub fn calculate_fnc_scores(variants: &[VariantGene], normalize: bool) -> FncTuningScore {
    let mut profile = TuningProfile::default();
    for variant in variants {
        for (dimension, score) in calculate_gene_contribution(&variant.gene, variant.impact) {
            *profile.get_mut(dimension) += score;
        }
    }

    if normalize {
        let max = profile.max();
        if max > 0.0 {
            for d in TuningDimension::ALL {
                *profile.get_mut(d) /= max;
            }
        }
    }

    let predicted_domain = predict_domain(&profile);
    FncTuningScore {
        profile,
        overall_score: profile.overall(),
        predicted_domain,
        interpretation: generate_interpretation(&profile, predicted_domain),
    }
}

/// Genes expected to drive a savant domain.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct DomainGeneProfile {
    pub domain: SavantDomain,
    pub priority_genes: [&'static str; 3],
    pub expected_pattern: &'static str,
}

pub const DOMAIN_GENE_PROFILES: [DomainGeneProfile; 4] = [
    DomainGeneProfile {
        domain: SavantDomain::Music,
        priority_genes: ["CACNA1C", "SCN2A", "GABRA1"],
        expected_pattern: "High frequency tuning, moderate filtering",
    },
    DomainGeneProfile {
        domain: SavantDomain::Mathematics,
        priority_genes: ["GRIN2B", "SHANK3", "CACNA1C"],
        expected_pattern: "High integration, enhanced pattern access",
    },
    DomainGeneProfile {
        domain: SavantDomain::Art,
        priority_genes: ["CNTNAP2", "NRXN1", "MBP"],
        expected_pattern: "High bandwidth, spatial processing",
    },
    DomainGeneProfile {
        domain: SavantDomain::Calendar,
        priority_genes: ["SHANK3", "SYNGAP1", "GRIN2B"],
        expected_pattern: "Strong integration, temporal patterns",
    },
];

/// Variant genes that belong to one dimension.
#[derive(Debug, Clone, Serialize)]
pub struct DimensionGenes {
    pub dimension: TuningDimension,
    pub genes: Vec<String>,
}

/// Priority genes of a domain profile found among the sample's variants.
#[derive(Debug, Clone, Serialize)]
pub struct DomainMatch {
    pub domain: SavantDomain,
    pub matched_genes: Vec<String>,
    pub expected_pattern: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct SampleReport {
    pub sample_id: String,
    pub n_variants: usize,
    pub fnc_tuning_profile: TuningProfile,
    pub overall_score: f64,
    pub predicted_domain: PredictedDomain,
    pub interpretation: String,
    pub gene_summary: Vec<DimensionGenes>,
    pub domain_matches: Vec<DomainMatch>,
}

pub fn generate_sample_report(sample_id: &str, variants: &[VariantGene]) -> SampleReport {
    let scores = calculate_fnc_scores(variants, true);

    let gene_summary = TuningDimension::ALL
        .iter()
        .map(|&dimension| DimensionGenes {
            dimension,
            genes: variants
                .iter()
                .filter(|v| find_gene(dimension, &v.gene).is_some())
                .map(|v| v.gene.clone())
                .collect(),
        })
        .collect();

    let domain_matches = DOMAIN_GENE_PROFILES
        .iter()
        .filter_map(|profile| {
            let matched_genes: Vec<String> = variants
                .iter()
                .filter(|v| {
                    profile
                        .priority_genes
                        .iter()
                        .any(|g| g.eq_ignore_ascii_case(v.gene.trim()))
                })
                .map(|v| v.gene.clone())
                .collect();
            if matched_genes.is_empty() {
                None
            } else {
                Some(DomainMatch {
                    domain: profile.domain,
                    matched_genes,
                    expected_pattern: profile.expected_pattern,
                })
            }
        })
        .collect();

    SampleReport {
        sample_id: sample_id.to_string(),
        n_variants: variants.len(),
        fnc_tuning_profile: scores.profile,
        overall_score: scores.overall_score,
        predicted_domain: scores.predicted_domain,
        interpretation: scores.interpretation,
        gene_summary,
        domain_matches,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn demo_variants() -> Vec<VariantGene> {
        vec![
            VariantGene::new("CACNA1C", VariantImpact::High),
            VariantGene::new("SHANK3", VariantImpact::Moderate),
            VariantGene::new("GABRA1", VariantImpact::Moderate),
        ]
    }

    #[test]
    fn test_gene_contribution() {
        let c = calculate_gene_contribution("cacna1c", VariantImpact::High);
        assert_eq!(c, vec![(TuningDimension::Frequency, 0.9)]);

        // CNTNAP2 sits in two dimensions
        let c = calculate_gene_contribution("CNTNAP2", VariantImpact::Low);
        assert_eq!(c.len(), 2);
        assert!((c[0].1 - 0.285).abs() < 1e-12);
        assert!((c[1].1 - 0.255).abs() < 1e-12);

        assert!(calculate_gene_contribution("TP53", VariantImpact::High).is_empty());
    }

    #[test]
    fn test_impact_parsing() {
        assert_eq!(VariantImpact::from("HIGH"), VariantImpact::High);
        assert_eq!(VariantImpact::from("modifier"), VariantImpact::Unknown);
        assert_eq!(VariantImpact::Unknown.multiplier(), 0.5);

        let v: VariantGene = serde_json::from_str(r#"{"gene": "MBP"}"#).unwrap();
        assert_eq!(v.impact, VariantImpact::Moderate);
        let v: VariantGene =
            serde_json::from_str(r#"{"gene": "MBP", "impact": "severe"}"#).unwrap();
        assert_eq!(v.impact, VariantImpact::Unknown);
    }

    #[test]
    fn test_demo_scores() {
        let scores = calculate_fnc_scores(&demo_variants(), true);
        let p = scores.profile;
        assert!((p.frequency - 1.0).abs() < 1e-12);
        assert!((p.filtering - 0.6).abs() < 1e-12);
        assert!((p.integration - 0.6333).abs() < 1e-4);
        assert_eq!(p.bandwidth, 0.0);
        assert_eq!(p.pattern, 0.0);
        assert!((scores.overall_score - 0.5083).abs() < 1e-4);
        assert_eq!(scores.predicted_domain, PredictedDomain::Undetermined);
        assert!(scores
            .interpretation
            .starts_with("FNC Profile: Strong oscillation/timing processing, reduced structure recognition."));
        assert!(scores.interpretation.contains("prioritizes frequency over pattern"));
    }

    #[test]
    fn test_scores_without_normalization() {
        let scores = calculate_fnc_scores(&demo_variants(), false);
        assert!((scores.profile.frequency - 0.9).abs() < 1e-12);
        assert!((scores.profile.integration - 0.57).abs() < 1e-12);
    }

    #[test]
    fn test_empty_variants_stay_zero() {
        let scores = calculate_fnc_scores(&[], true);
        assert_eq!(scores.profile, TuningProfile::default());
        assert_eq!(scores.overall_score, 0.0);
        assert_eq!(scores.predicted_domain, PredictedDomain::Undetermined);
    }

    #[test]
    fn test_scores_within_unit_interval() {
        let variants: Vec<VariantGene> = ["CACNA1C", "SCN2A", "SHANK3", "NRXN1", "MBP", "CNTNAP2", "FOXP2"]
            .iter()
            .map(|g| VariantGene::new(g, VariantImpact::High))
            .collect();
        let scores = calculate_fnc_scores(&variants, true);
        for d in TuningDimension::ALL {
            let s = scores.profile.get(d);
            assert!((0.0..=1.0).contains(&s), "{} = {}", d, s);
        }
        assert!((0.0..=1.0).contains(&scores.overall_score));
    }

    #[test]
    fn test_predict_domain_rules() {
        let music = TuningProfile {
            frequency: 0.8,
            pattern: 0.6,
            ..TuningProfile::default()
        };
        assert_eq!(predict_domain(&music), PredictedDomain::Music);

        let math = TuningProfile {
            frequency: 0.6,
            integration: 0.8,
            ..TuningProfile::default()
        };
        assert_eq!(predict_domain(&math), PredictedDomain::Mathematics);

        let art = TuningProfile {
            bandwidth: 0.9,
            ..TuningProfile::default()
        };
        assert_eq!(predict_domain(&art), PredictedDomain::Art);

        let calendar = TuningProfile {
            integration: 0.65,
            pattern: 0.65,
            ..TuningProfile::default()
        };
        assert_eq!(predict_domain(&calendar), PredictedDomain::Calendar);
    }

    #[test]
    fn test_sample_report() {
        let report = generate_sample_report("DEMO_001", &demo_variants());
        assert_eq!(report.n_variants, 3);
        assert_eq!(report.gene_summary.len(), 5);
        assert_eq!(report.gene_summary[0].genes, vec!["CACNA1C"]);
        assert_eq!(report.gene_summary[1].genes, vec!["GABRA1"]);
        assert_eq!(report.gene_summary[2].genes, vec!["SHANK3"]);
        assert!(report.gene_summary[3].genes.is_empty());

        let music = report
            .domain_matches
            .iter()
            .find(|m| m.domain == SavantDomain::Music)
            .unwrap();
        assert_eq!(music.matched_genes, vec!["CACNA1C", "GABRA1"]);
        assert!(report
            .domain_matches
            .iter()
            .all(|m| m.domain != SavantDomain::Art));
    }

    #[test]
    fn test_node_tuning_genes_table() {
        let table = node_tuning_genes();
        assert_eq!(table.len(), 5);
        let total: usize = table.iter().map(|(_, genes)| genes.len()).sum();
        assert_eq!(total, 32);
    }
}
