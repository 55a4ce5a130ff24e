//! Data models for the analysis report.
//!
//! Each analysis group contributes one optional section. The report is
//! rendered to Markdown or serialized to JSON as-is.

use crate::experiments::AiExperiments;
use crate::genetics::enrichment::{MniProtocol, PathwayInterpretation};
use crate::genetics::scoring::{FncTuningScore, SampleReport};
use crate::genetics::variants::VariantReport;
use crate::genetics::EnrichmentResult;
use crate::stats::{AllEffects, PrevalenceAnalyses};
use chrono::{DateTime, Utc};
use serde::Serialize;

pub const DOI: &str = "10.5281/zenodo.17789741";

/// Predictions the analyses support, in report order.
pub const TESTABLE_PREDICTIONS: [(&str, &str); 4] = [
    (
        "Ion channel variants",
        "in savants will cluster in frequency-tuning pathways",
    ),
    (
        "E/I balance",
        "(measurable via MRS) will correlate with savant ability breadth",
    ),
    (
        "TMS responders",
        "will show higher baseline autistic traits",
    ),
    (
        "Acquired savants",
        "will show left hemisphere lesion dominance (>90%)",
    ),
];

/// Report metadata.
#[derive(Debug, Clone, Serialize)]
pub struct ReportMetadata {
    pub generated_at: DateTime<Utc>,
    pub version: String,
    pub doi: String,
    /// Analysis groups that ran, e.g. `statistics`.
    pub analyses: Vec<String>,
    pub duration_seconds: f64,
}

impl ReportMetadata {
    pub fn new(analyses: Vec<String>) -> Self {
        Self {
            generated_at: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            doi: DOI.to_string(),
            analyses,
            duration_seconds: 0.0,
        }
    }
}

/// Prevalence and effect size analyses.
#[derive(Debug, Clone, Serialize)]
pub struct StatisticsResults {
    pub prevalence: PrevalenceAnalyses,
    pub effects: AllEffects,
}

/// Pathway enrichment, tuning scores and variant annotation.
#[derive(Debug, Clone, Serialize)]
pub struct GeneticsResults {
    pub input_genes: Vec<String>,
    pub enrichment: Vec<EnrichmentResult>,
    pub interpretation: PathwayInterpretation,
    pub mni_protocol: MniProtocol,
    pub demo_scores: FncTuningScore,
    pub sample_report: SampleReport,
    /// Where the annotated variants came from: a VCF path or `demo`.
    pub variant_source: String,
    pub variant_report: VariantReport,
}

/// The complete analysis report.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub metadata: ReportMetadata,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub statistics: Option<StatisticsResults>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub genetics: Option<GeneticsResults>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_experiments: Option<AiExperiments>,
    /// Chart files written during this run.
    pub charts: Vec<String>,
    pub testable_predictions: Vec<String>,
}

impl Report {
    /// Creates an empty report with the given metadata.
    pub fn new(metadata: ReportMetadata) -> Self {
        Self {
            metadata,
            statistics: None,
            genetics: None,
            ai_experiments: None,
            charts: Vec::new(),
            testable_predictions: TESTABLE_PREDICTIONS
                .iter()
                .map(|(subject, claim)| format!("{} {}", subject, claim))
                .collect(),
        }
    }

    /// Key findings across every section present.
    pub fn key_findings(&self) -> Vec<String> {
        let mut findings = Vec::new();

        if let Some(ref stats) = self.statistics {
            let association = &stats.prevalence.autism_savant_association;
            findings.push(format!(
                "Autism is strongly associated with savant syndrome (OR = {:.1})",
                association.odds_ratio
            ));
            let specificity = &stats.prevalence.domain_specificity;
            findings.push(format!(
                "Savant abilities are not uniformly distributed across domains (χ² = {:.1}, df = {})",
                specificity.chi_square, specificity.df
            ));
            findings.extend(stats.effects.summary.key_findings.iter().cloned());
        }

        if let Some(ref genetics) = self.genetics {
            findings.push(format!(
                "{} pathways enriched among {} candidate genes",
                genetics.enrichment.len(),
                genetics.input_genes.len()
            ));
            findings.push(format!(
                "Demo variant profile predicts {} domain access",
                genetics.demo_scores.predicted_domain
            ));
        }

        if let Some(ref ai) = self.ai_experiments {
            findings.push(format!(
                "{} responses classified as {} ({} savant similarity)",
                ai.model,
                ai.field_access.fnc_profile.access_type,
                ai.field_access.fnc_profile.similarity_level
            ));
        }

        findings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_report_is_empty() {
        let report = Report::new(ReportMetadata::new(vec!["charts".to_string()]));
        assert!(report.statistics.is_none());
        assert!(report.genetics.is_none());
        assert!(report.ai_experiments.is_none());
        assert_eq!(report.testable_predictions.len(), 4);
        assert!(report.key_findings().is_empty());
        assert_eq!(report.metadata.doi, DOI);
    }

    #[test]
    fn test_key_findings_from_statistics() {
        let mut report = Report::new(ReportMetadata::new(vec!["statistics".to_string()]));
        report.statistics = Some(StatisticsResults {
            prevalence: crate::stats::run_all_analyses().unwrap(),
            effects: crate::stats::calculate_all_effects().unwrap(),
        });

        let findings = report.key_findings();
        assert!(findings[0].starts_with("Autism is strongly associated"));
        assert!(findings.iter().any(|f| f.contains("χ²")));
    }

    #[test]
    fn test_json_skips_missing_sections() {
        let report = Report::new(ReportMetadata::new(Vec::new()));
        let json = serde_json::to_string(&report).unwrap();
        assert!(!json.contains("\"statistics\""));
        assert!(json.contains("\"testable_predictions\""));
    }
}
