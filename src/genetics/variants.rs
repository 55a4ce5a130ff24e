//! Variant annotation.
//!
//! Parses VCF records, assigns each variant to the FNC category of its
//! gene and summarizes the categories found.

use crate::error::{FncError, FncResult};
use crate::genetics::scoring::{VariantGene, VariantImpact};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use tracing::{debug, warn};

/// FNC category a variant's gene belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VariantCategory {
    TuningFrequency,
    FilterStrength,
    SignalIntegration,
    Bandwidth,
    PatternRecognition,
}

impl fmt::Display for VariantCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.info().key)
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct CategoryInfo {
    pub key: &'static str,
    pub genes: &'static [&'static str],
    pub mechanism: &'static str,
    pub fnc_effect: &'static str,
}

pub const FNC_VARIANT_CATEGORIES: [(VariantCategory, CategoryInfo); 5] = [
    (
        VariantCategory::TuningFrequency,
        CategoryInfo {
            key: "tuning_frequency",
            genes: &["CACNA1C", "CACNA1D", "SCN1A", "SCN2A", "SCN8A", "KCNQ2", "KCNQ3"],
            mechanism: "Ion channel variants alter neuronal firing patterns",
            fnc_effect: "Modified Node oscillation frequency",
        },
    ),
    (
        VariantCategory::FilterStrength,
        CategoryInfo {
            key: "filter_strength",
            genes: &["GABRA1", "GABRB2", "GABRG2", "GRIN2A", "GRIN2B"],
            mechanism: "Neurotransmitter receptor variants alter E/I balance",
            fnc_effect: "Changed filtering threshold at Node",
        },
    ),
    (
        VariantCategory::SignalIntegration,
        CategoryInfo {
            key: "signal_integration",
            genes: &["SHANK3", "SHANK2", "NRXN1", "NLGN3", "NLGN4"],
            mechanism: "Synaptic scaffold variants alter signal processing",
            fnc_effect: "Modified integration of Field signals",
        },
    ),
    (
        VariantCategory::Bandwidth,
        CategoryInfo {
            key: "bandwidth",
            genes: &["MBP", "PLP1", "CNP", "CNTNAP2", "CNTN1"],
            mechanism: "Myelination variants alter signal conduction",
            fnc_effect: "Changed Node bandwidth/capacity",
        },
    ),
    (
        VariantCategory::PatternRecognition,
        CategoryInfo {
            key: "pattern_recognition",
            genes: &["CNTNAP2", "FOXP2", "ATP2C2", "CMIP"],
            mechanism: "Language/pattern processing variants",
            fnc_effect: "Altered Field pattern extraction",
        },
    ),
];

impl VariantCategory {
    pub fn info(&self) -> &'static CategoryInfo {
        let idx = match self {
            VariantCategory::TuningFrequency => 0,
            VariantCategory::FilterStrength => 1,
            VariantCategory::SignalIntegration => 2,
            VariantCategory::Bandwidth => 3,
            VariantCategory::PatternRecognition => 4,
        };
        &FNC_VARIANT_CATEGORIES[idx].1
    }

    /// Category of a gene; the first listed category wins.
    pub fn for_gene(gene: &str) -> Option<Self> {
        let gene = gene.trim();
        FNC_VARIANT_CATEGORIES
            .iter()
            .find(|(_, info)| info.genes.iter().any(|g| g.eq_ignore_ascii_case(gene)))
            .map(|(category, _)| *category)
    }
}

/// A variant as read from a VCF line or supplied directly.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawVariant {
    pub chrom: String,
    pub pos: u64,
    #[serde(rename = "ref")]
    pub ref_allele: String,
    pub alt: String,
    #[serde(default)]
    pub gene: Option<String>,
    #[serde(default)]
    pub consequence: Option<String>,
    #[serde(default)]
    pub impact: Option<String>,
    #[serde(default)]
    pub gnomad_af: Option<f64>,
    #[serde(default)]
    pub cadd_score: Option<f64>,
    /// Raw INFO column, when parsed from VCF.
    #[serde(default)]
    pub info: String,
}

fn info_value<'a>(info: &'a str, keys: &[&str]) -> Option<&'a str> {
    keys.iter().find_map(|key| {
        info.split(';').find_map(|entry| {
            let (k, v) = entry.split_once('=')?;
            (k == *key).then_some(v)
        })
    })
}

fn info_float(info: &str, keys: &[&str]) -> Option<f64> {
    info_value(info, keys).and_then(|v| v.split(',').next()?.parse().ok())
}

/// Parse one tab-separated VCF line.
///
/// Header lines and lines with fewer than eight columns yield `Ok(None)`.
/// Gene, consequence, impact, CADD and gnomAD frequency are read from INFO
/// when present.
pub fn parse_vcf_line(line: &str) -> FncResult<Option<RawVariant>> {
    if line.starts_with('#') {
        return Ok(None);
    }

    let fields: Vec<&str> = line.trim().split('\t').collect();
    if fields.len() < 8 {
        return Ok(None);
    }

    let pos = fields[1]
        .parse::<u64>()
        .map_err(|_| FncError::MalformedVcf(format!("invalid position '{}'", fields[1])))?;
    let info = fields[7];

    Ok(Some(RawVariant {
        chrom: fields[0].to_string(),
        pos,
        ref_allele: fields[3].to_string(),
        alt: fields[4].to_string(),
        gene: info_value(info, &["GENE", "SYMBOL", "Gene.refGene"]).map(String::from),
        consequence: info_value(info, &["CONSEQUENCE", "Consequence", "ExonicFunc.refGene"])
            .map(String::from),
        impact: info_value(info, &["IMPACT"]).map(String::from),
        gnomad_af: info_float(info, &["gnomAD_AF", "gnomad_af", "AF"]),
        cadd_score: info_float(info, &["CADD_PHRED", "CADD", "cadd_score"]),
        info: info.to_string(),
    }))
}

/// Read every variant record from a VCF file.
pub fn read_vcf(path: &Path) -> FncResult<Vec<RawVariant>> {
    let content = std::fs::read_to_string(path)?;
    let mut variants = Vec::new();
    for (lineno, line) in content.lines().enumerate() {
        match parse_vcf_line(line) {
            Ok(Some(v)) => variants.push(v),
            Ok(None) => {}
            Err(e) => {
                return Err(FncError::MalformedVcf(format!(
                    "{}:{}: {}",
                    path.display(),
                    lineno + 1,
                    e
                )))
            }
        }
    }
    debug!("Read {} variants from {}", variants.len(), path.display());
    if variants.is_empty() {
        warn!("No variant records found in {}", path.display());
    }
    Ok(variants)
}

#[derive(Debug, Clone, Serialize)]
pub struct AnnotatedVariant {
    pub chrom: String,
    pub pos: u64,
    #[serde(rename = "ref")]
    pub ref_allele: String,
    pub alt: String,
    pub gene: String,
    pub consequence: String,
    pub impact: String,
    pub gnomad_af: Option<f64>,
    pub cadd_score: Option<f64>,
    pub fnc_category: Option<VariantCategory>,
    pub fnc_interpretation: Option<&'static str>,
}

impl AnnotatedVariant {
    /// `chrom:pos ref>alt`
    pub fn locus(&self) -> String {
        format!("{}:{} {}>{}", self.chrom, self.pos, self.ref_allele, self.alt)
    }

    /// Gene and impact for tuning-profile scoring.
    pub fn to_variant_gene(&self) -> VariantGene {
        let impact = if self.impact == "Unknown" {
            VariantImpact::Moderate
        } else {
            VariantImpact::from(self.impact.as_str())
        };
        VariantGene::new(&self.gene, impact)
    }
}

pub fn annotate_variant(variant: &RawVariant) -> AnnotatedVariant {
    let category = variant.gene.as_deref().and_then(VariantCategory::for_gene);

    AnnotatedVariant {
        chrom: variant.chrom.clone(),
        pos: variant.pos,
        ref_allele: variant.ref_allele.clone(),
        alt: variant.alt.clone(),
        gene: variant.gene.clone().unwrap_or_else(|| "Unknown".to_string()),
        consequence: variant
            .consequence
            .clone()
            .unwrap_or_else(|| "Unknown".to_string()),
        impact: variant.impact.clone().unwrap_or_else(|| "Unknown".to_string()),
        gnomad_af: variant.gnomad_af,
        cadd_score: variant.cadd_score,
        fnc_category: category,
        fnc_interpretation: category.map(|c| c.info().fnc_effect),
    }
}

pub fn annotate_variants(variants: &[RawVariant]) -> Vec<AnnotatedVariant> {
    variants.iter().map(annotate_variant).collect()
}

/// Default minimum CADD score (top ~3% most deleterious).
pub const DEFAULT_MIN_CADD: f64 = 15.0;
/// Default maximum gnomAD allele frequency.
pub const DEFAULT_MAX_GNOMAD_AF: f64 = 0.01;

/// Keep categorized variants that pass the CADD and frequency filters.
/// Missing scores do not exclude a variant.
pub fn filter_neural_variants(
    variants: &[AnnotatedVariant],
    min_cadd: f64,
    max_gnomad_af: f64,
) -> Vec<AnnotatedVariant> {
    variants
        .iter()
        .filter(|v| v.fnc_category.is_some())
        .filter(|v| v.cadd_score.map_or(true, |c| c >= min_cadd))
        .filter(|v| v.gnomad_af.map_or(true, |af| af <= max_gnomad_af))
        .cloned()
        .collect()
}

#[derive(Debug, Clone, Serialize)]
pub struct CategorizedVariant {
    pub gene: String,
    pub variant: String,
    pub interpretation: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryGroup {
    pub category: VariantCategory,
    pub count: usize,
    pub variants: Vec<CategorizedVariant>,
}

#[derive(Debug, Clone, Serialize)]
pub struct VariantReport {
    pub total_variants: usize,
    pub fnc_relevant: usize,
    /// Groups in order of first appearance.
    pub categories: Vec<CategoryGroup>,
    pub fnc_predictions: Vec<String>,
    pub dominant_category: Option<VariantCategory>,
    pub interpretation: String,
}

impl VariantReport {
    pub fn count(&self, category: VariantCategory) -> usize {
        self.categories
            .iter()
            .find(|g| g.category == category)
            .map_or(0, |g| g.count)
    }
}

pub fn generate_fnc_variant_report(variants: &[AnnotatedVariant]) -> VariantReport {
    let mut categories: Vec<CategoryGroup> = Vec::new();
    for v in variants {
        let Some(category) = v.fnc_category else {
            continue;
        };
        let entry = CategorizedVariant {
            gene: v.gene.clone(),
            variant: v.locus(),
            interpretation: category.info().fnc_effect,
        };
        match categories.iter_mut().find(|g| g.category == category) {
            Some(group) => {
                group.count += 1;
                group.variants.push(entry);
            }
            None => categories.push(CategoryGroup {
                category,
                count: 1,
                variants: vec![entry],
            }),
        }
    }

    let fnc_relevant: usize = categories.iter().map(|g| g.count).sum();

    // First group wins ties
    let dominant_category = categories
        .iter()
        .fold(None::<&CategoryGroup>, |best, g| match best {
            Some(b) if b.count >= g.count => Some(b),
            _ => Some(g),
        })
        .map(|g| g.category);

    let mut report = VariantReport {
        total_variants: variants.len(),
        fnc_relevant,
        categories,
        fnc_predictions: Vec::new(),
        dominant_category,
        interpretation: format!(
            "Of {} total variants, {} map to FNC-relevant pathways. Dominant category: {}",
            variants.len(),
            fnc_relevant,
            dominant_category.map_or("None".to_string(), |c| c.to_string())
        ),
    };

    let predictions = [
        (
            VariantCategory::TuningFrequency,
            "Ion channel variants",
            "May alter Node oscillation patterns, affecting Field access frequency bands",
        ),
        (
            VariantCategory::FilterStrength,
            "E/I balance variants",
            "May reduce Node filtering, enabling broader Field access",
        ),
        (
            VariantCategory::Bandwidth,
            "Myelination variants",
            "May modify Node bandwidth, affecting information throughput",
        ),
    ];
    for (category, label, effect) in predictions {
        let n = report.count(category);
        if n > 0 {
            report
                .fnc_predictions
                .push(format!("{} ({} found): {}", label, n, effect));
        }
    }

    report
}

/// Demonstration variants used when no VCF is supplied.
pub fn demo_variants() -> Vec<RawVariant> {
    let v = |chrom: &str, pos, ref_allele: &str, alt: &str, gene: &str, consequence: &str, cadd, af| {
        RawVariant {
            chrom: chrom.to_string(),
            pos,
            ref_allele: ref_allele.to_string(),
            alt: alt.to_string(),
            gene: Some(gene.to_string()),
            consequence: Some(consequence.to_string()),
            impact: None,
            gnomad_af: Some(af),
            cadd_score: Some(cadd),
            info: String::new(),
        }
    };

    vec![
        v("1", 12_345, "A", "G", "CACNA1C", "missense", 25.3, 0.0001),
        v("22", 51_135_467, "C", "T", "SHANK3", "frameshift", 35.0, 0.000_01),
        v("5", 88_888, "G", "A", "GABRA1", "missense", 18.5, 0.005),
        v("7", 99_999, "T", "C", "FOXP2", "synonymous", 5.0, 0.10),
    ]
}
