//! Markdown report generation.
//!
//! This module renders the analysis report as Markdown, embedding
//! structured sub-results as pretty-printed JSON blocks.

use crate::experiments::AiExperiments;
use crate::models::{GeneticsResults, Report, ReportMetadata, StatisticsResults, DOI};
use crate::stats::prevalence::format_p;
use anyhow::Result;
use serde::Serialize;
use std::io::Write;
use std::path::Path;

/// Generate a complete Markdown report.
pub fn generate_markdown_report(report: &Report) -> String {
    let mut output = String::new();

    // Title
    output.push_str("# Savant-FNC Analysis Report\n\n");

    // Metadata section
    output.push_str(&generate_metadata_section(&report.metadata));
    output.push_str("---\n\n");

    // Executive summary
    output.push_str(&generate_summary_section(report));

    if let Some(ref stats) = report.statistics {
        output.push_str(&generate_statistics_section(stats));
    }

    if let Some(ref genetics) = report.genetics {
        output.push_str(&generate_genetics_section(genetics));
    }

    if let Some(ref ai) = report.ai_experiments {
        output.push_str(&generate_ai_section(ai));
    }

    output.push_str(&generate_charts_section(&report.charts));

    if let Some(ref stats) = report.statistics {
        output.push_str(&generate_interpretation_section(stats));
    }

    output.push_str(&generate_predictions_section(&report.testable_predictions));
    output.push_str(&generate_citation_section());

    // Footer
    output.push_str(&generate_footer());

    output
}

/// Pretty JSON in a fenced block.
fn json_block<T: Serialize>(value: &T) -> String {
    let json = serde_json::to_string_pretty(value).unwrap_or_default();
    format!("```json\n{}\n```\n\n", json)
}

/// Generate the metadata section.
fn generate_metadata_section(metadata: &ReportMetadata) -> String {
    let mut section = String::new();

    section.push_str(&format!(
        "**Generated:** {}  \n",
        metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!("**Version:** {}  \n", metadata.version));
    section.push_str(&format!(
        "**DOI:** [{}](https://doi.org/{})  \n",
        metadata.doi, metadata.doi
    ));
    if !metadata.analyses.is_empty() {
        section.push_str(&format!(
            "**Analyses:** {}  \n",
            metadata.analyses.join(", ")
        ));
    }
    section.push_str(&format!(
        "**Duration:** {:.1}s\n\n",
        metadata.duration_seconds
    ));

    section
}

/// Generate the executive summary.
fn generate_summary_section(report: &Report) -> String {
    let mut section = String::new();

    section.push_str("## Executive Summary\n\n");
    section.push_str(
        "This report presents automated analyses from the Savant-FNC research project, \
         applying the Field-Node-Cockpit (FNC) framework to savant syndrome data.\n\n",
    );

    let findings = report.key_findings();
    if !findings.is_empty() {
        section.push_str("**Key findings:**\n\n");
        for finding in findings {
            section.push_str(&format!("- {}\n", finding));
        }
        section.push('\n');
    }

    section.push_str("---\n\n");
    section
}

/// Generate the statistical analyses section.
fn generate_statistics_section(stats: &StatisticsResults) -> String {
    let mut section = String::new();
    let prevalence = &stats.prevalence;

    section.push_str("## 1. Statistical Analyses\n\n");

    // Association
    let association = &prevalence.autism_savant_association;
    section.push_str("### 1.1 Autism-Savant Association\n\n");
    section.push_str(&format!(
        "- **Test:** {}\n- **Odds ratio:** {:.1} (95% CI {:.1}–{:.1})\n- **Significance:** {}\n\n",
        association.test,
        association.odds_ratio,
        association.ci_95.0,
        association.ci_95.1,
        format_p(association.p_value)
    ));
    section.push_str(&json_block(association));

    // Domain specificity
    let specificity = &prevalence.domain_specificity;
    section.push_str("### 1.2 Domain Specificity\n\n");
    section.push_str(&format!("{}\n\n", specificity.interpretation));
    section.push_str("| Domain | Observed | Expected | Std. Residual | Status | Typical Features |\n");
    section.push_str("|:---|:---:|:---:|:---:|:---|:---|\n");
    for d in &specificity.domain_analysis {
        section.push_str(&format!(
            "| {} | {:.1}% | {:.1}% | {:+.2} | {} | {} |\n",
            d.domain.name(),
            d.observed * 100.0,
            d.expected * 100.0,
            d.std_residual,
            d.status,
            d.domain.typical_features().join(", ")
        ));
    }
    section.push('\n');
    section.push_str(&format!("> {}\n\n", specificity.fnc_implication));

    // Prevalence interval
    let interval = &prevalence.prevalence_interval;
    section.push_str("### 1.3 Prevalence Confidence Interval\n\n");
    section.push_str(&format!(
        "{}/{} savants: {:.1}% ({:.0}% {}: {:.1}%–{:.1}%)\n\n",
        interval.n_savants,
        interval.sample_size,
        interval.point_estimate * 100.0,
        interval.ci_level * 100.0,
        interval.method,
        interval.ci_lower * 100.0,
        interval.ci_upper * 100.0
    ));

    // Gradient
    let gradient = &prevalence.autism_gradient;
    section.push_str("### 1.4 Autism Severity Gradient\n\n");
    section.push_str("| Level | Savant Prevalence | Typical Domains |\n");
    section.push_str("|:---|:---:|:---|\n");
    for level in &gradient.gradient_data {
        section.push_str(&format!(
            "| {} | {:.0}% | {} |\n",
            level.label,
            level.savant_prevalence * 100.0,
            level.typical_domains.join(", ")
        ));
    }
    section.push('\n');
    section.push_str(&format!("{}\n\n", gradient.interpretation));

    // TMS
    let tms = &stats.effects.tms_effects;
    section.push_str("### 1.5 TMS Effect Sizes\n\n");
    section.push_str("| Study | Domain | Paradigm | N | Cohen's d | 95% CI | Magnitude |\n");
    section.push_str("|:---|:---|:---|:---:|:---:|:---:|:---:|\n");
    for study in &tms.studies {
        section.push_str(&format!(
            "| {} | {} | {} | {} | {:.2} | [{:.2}, {:.2}] | {} |\n",
            study.study,
            study.domain,
            study.paradigm,
            study.n,
            study.effect.cohens_d,
            study.effect.ci_lower,
            study.effect.ci_upper,
            study.effect.magnitude
        ));
    }
    section.push('\n');

    let meta = &tms.meta_analysis;
    section.push_str("**Meta-Analysis:**\n");
    section.push_str(&format!("- Weighted mean d = {:.2}\n", meta.weighted_mean_d));
    section.push_str(&format!("- Q = {:.2}\n", meta.q_statistic));
    section.push_str(&format!("- k = {} studies\n", meta.k_studies));
    section.push_str(&format!("- Total N = {}\n\n", meta.total_n));

    // Lesions
    let lesions = &stats.effects.lesion_effects;
    section.push_str("### 1.6 Lesion Lateralization\n\n");
    section.push_str("| Location | Cases | Share | Mean Onset (days) | Interpretation |\n");
    section.push_str("|:---|:---:|:---:|:---:|:---|\n");
    for site in &lesions.lesion_data {
        section.push_str(&format!(
            "| {} | {} | {:.0}% | {} | {} |\n",
            site.location,
            site.n_cases,
            site.proportion * 100.0,
            site.mean_onset_days,
            site.fnc_interpretation
        ));
    }
    section.push('\n');
    section.push_str(&format!("{}\n\n", lesions.interpretation));

    section.push_str("---\n\n");
    section
}

/// Generate the genetic analyses section.
fn generate_genetics_section(genetics: &GeneticsResults) -> String {
    let mut section = String::new();

    section.push_str("## 2. Genetic Analyses\n\n");

    section.push_str("### 2.1 Pathway Enrichment\n\n");
    section.push_str(&format!(
        "Input genes: `{}`\n\n",
        genetics.input_genes.join("`, `")
    ));
    if genetics.enrichment.is_empty() {
        section.push_str("No enriched pathways found.\n\n");
    } else {
        section.push_str("| Pathway | Genes | p-value | Fold Enrichment |\n");
        section.push_str("|:---|:---|:---:|:---:|\n");
        for result in &genetics.enrichment {
            section.push_str(&format!(
                "| {} | {} | {:.2e} | {:.1}x |\n",
                result.pathway,
                result.genes_found.join(", "),
                result.p_value,
                result.fold_enrichment
            ));
        }
        section.push('\n');
    }

    section.push_str("### 2.2 FNC Tuning Predictions\n\n");
    section.push_str(&json_block(&genetics.interpretation));

    section.push_str("### 2.3 MNI Dataset Analysis Protocol\n\n");
    section.push_str(&json_block(&genetics.mni_protocol));

    section.push_str("### 2.4 Demo FNC Tuning Scores\n\n");
    let profile = &genetics.demo_scores.profile;
    section.push_str("| Frequency | Filtering | Integration | Bandwidth | Pattern | **Overall** |\n");
    section.push_str("|:---:|:---:|:---:|:---:|:---:|:---:|\n");
    section.push_str(&format!(
        "| {:.2} | {:.2} | {:.2} | {:.2} | {:.2} | **{:.2}** |\n\n",
        profile.frequency,
        profile.filtering,
        profile.integration,
        profile.bandwidth,
        profile.pattern,
        genetics.demo_scores.overall_score
    ));
    section.push_str(&format!(
        "**Predicted domain:** {}\n\n{}\n\n",
        genetics.demo_scores.predicted_domain, genetics.demo_scores.interpretation
    ));
    if !genetics.sample_report.domain_matches.is_empty() {
        section.push_str("**Domain gene matches:**\n\n");
        for m in &genetics.sample_report.domain_matches {
            section.push_str(&format!(
                "- {}: {} ({})\n",
                m.domain.name(),
                m.matched_genes.join(", "),
                m.expected_pattern
            ));
        }
        section.push('\n');
    }

    let variants = &genetics.variant_report;
    section.push_str("### 2.5 Variant Annotation\n\n");
    section.push_str(&format!(
        "Source: `{}`. {} of {} variants are FNC-relevant.\n\n",
        genetics.variant_source, variants.fnc_relevant, variants.total_variants
    ));
    if !variants.categories.is_empty() {
        section.push_str("| Category | Variants | Genes |\n");
        section.push_str("|:---|:---:|:---|\n");
        for group in &variants.categories {
            let genes: Vec<&str> = group.variants.iter().map(|v| v.gene.as_str()).collect();
            section.push_str(&format!(
                "| {} | {} | {} |\n",
                group.category,
                group.count,
                genes.join(", ")
            ));
        }
        section.push('\n');
    }
    section.push_str(&format!("{}\n\n", variants.interpretation));
    for prediction in &variants.fnc_predictions {
        section.push_str(&format!("- {}\n", prediction));
    }
    if !variants.fnc_predictions.is_empty() {
        section.push('\n');
    }

    section.push_str("---\n\n");
    section
}

/// Generate the AI experiments section.
fn generate_ai_section(ai: &AiExperiments) -> String {
    let mut section = String::new();

    section.push_str("## 3. AI Pattern Recognition\n\n");
    section.push_str(&format!("**Model:** `{}`\n\n", ai.model));

    let metrics = &ai.field_access;
    section.push_str("### 3.1 Savant-Likeness of Responses\n\n");
    section.push_str("| Dimension | Mean Score |\n");
    section.push_str("|:---|:---:|\n");
    for (dimension, score) in metrics.dimension_means.entries() {
        section.push_str(&format!("| {} | {:.2} |\n", dimension, score));
    }
    section.push_str(&format!(
        "| **Overall** | **{:.2}** |\n\n",
        metrics.mean_overall
    ));
    section.push_str(&format!(
        "Access type: **{}** ({}). {}\n\n",
        metrics.fnc_profile.access_type,
        metrics.fnc_profile.description,
        metrics.fnc_profile.interpretation
    ));

    let comparison = &ai.benchmark_comparison;
    section.push_str("### 3.2 Comparison with Savant Benchmarks\n\n");
    section.push_str("| Dimension | AI | Savant Average | Difference |\n");
    section.push_str("|:---|:---:|:---:|:---:|\n");
    for (dimension, ai_score) in comparison.ai_profile.entries() {
        section.push_str(&format!(
            "| {} | {:.2} | {:.2} | {:+.2} |\n",
            dimension,
            ai_score,
            comparison.savant_average.get(dimension),
            comparison.differences.get(dimension)
        ));
    }
    section.push('\n');
    section.push_str(&format!(
        "Largest divergence: **{}**. {}\n\n",
        comparison.largest_divergence, comparison.fnc_interpretation
    ));

    let battery = &ai.battery;
    section.push_str("### 3.3 Pattern Test Battery\n\n");
    section.push_str(&format!("*{}*\n\n", battery.hypothesis));
    section.push_str("| Model | Accuracy | Correct | Avg. Response Time |\n");
    section.push_str("|:---|:---:|:---:|:---:|\n");
    for model in &battery.models {
        section.push_str(&format!(
            "| {} | {:.0}% | {}/{} | {:.2}s |\n",
            model.model,
            model.accuracy * 100.0,
            model.correct,
            model.total,
            model.avg_response_time
        ));
    }
    section.push('\n');
    for observation in &battery.observations {
        section.push_str(&format!("- {}\n", observation));
    }
    if !battery.observations.is_empty() {
        section.push('\n');
    }

    section.push_str("### 3.4 Prompt Tuning Experiment\n\n");
    section.push_str(&json_block(&ai.tuning.tuning_effects));
    section.push_str(&format!("{}\n\n", ai.tuning.fnc_interpretation));

    section.push_str("---\n\n");
    section
}

/// Generate the chart listing.
fn generate_charts_section(charts: &[String]) -> String {
    if charts.is_empty() {
        return String::new();
    }

    let mut section = String::new();

    section.push_str("## Figures\n\n");
    for chart in charts {
        section.push_str(&format!("- `{}`\n", chart));
    }
    section.push_str("\n---\n\n");

    section
}

/// Generate the FNC interpretation summary.
fn generate_interpretation_section(stats: &StatisticsResults) -> String {
    let mut section = String::new();

    section.push_str("## FNC Interpretation Summary\n\n");
    section.push_str(&stats.prevalence.meta_interpretation);
    section.push_str("\n\n");
    section.push_str(&stats.effects.summary.implications_for_fnc);
    section.push_str("\n\n---\n\n");

    section
}

/// Generate the testable predictions section.
fn generate_predictions_section(predictions: &[String]) -> String {
    if predictions.is_empty() {
        return String::new();
    }

    let mut section = String::new();

    section.push_str("## Testable Predictions\n\n");
    section.push_str(
        "Based on these analyses, the FNC framework generates the following predictions:\n\n",
    );
    for (i, prediction) in predictions.iter().enumerate() {
        section.push_str(&format!("{}. {}\n", i + 1, prediction));
    }
    section.push_str("\n---\n\n");

    section
}

fn generate_citation_section() -> String {
    format!(
        "## Citation\n\n\
         Wikström, B. (2025). *Savant Syndrome as Differential Access to Relational Information Structures*.\n\
         Zenodo. https://doi.org/{}\n\n---\n\n",
        DOI
    )
}

/// Generate the report footer.
fn generate_footer() -> String {
    "*Report generated automatically by the savant-fnc analysis pipeline.*\n".to_string()
}

/// Write the Markdown report to a file.
pub fn write_report(report: &Report, path: &Path) -> Result<()> {
    let content = generate_markdown_report(report);

    let mut file = std::fs::File::create(path)?;
    file.write_all(content.as_bytes())?;

    Ok(())
}

/// Generate a JSON report.
pub fn generate_json_report(report: &Report) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}

/// Write a JSON report to a file.
pub fn write_json_report(report: &Report, path: &Path) -> Result<()> {
    let content = generate_json_report(report)?;

    let mut file = std::fs::File::create(path)?;
    file.write_all(content.as_bytes())?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genetics::{self, enrichment, variants};
    use crate::stats;

    fn create_test_report() -> Report {
        let genes: Vec<String> = genetics::DEMO_GENES.iter().map(|g| g.to_string()).collect();
        let enrichment_results =
            enrichment::run_pathway_enrichment(&genes, &enrichment::EnrichmentOptions::default())
                .unwrap();
        let demo_variants = genetics::demo_variant_genes();
        let annotated = variants::annotate_variants(&variants::demo_variants());
        let filtered = variants::filter_neural_variants(
            &annotated,
            variants::DEFAULT_MIN_CADD,
            variants::DEFAULT_MAX_GNOMAD_AF,
        );

        let mut report = Report::new(ReportMetadata::new(vec![
            "statistics".to_string(),
            "genetics".to_string(),
        ]));
        report.statistics = Some(StatisticsResults {
            prevalence: stats::run_all_analyses().unwrap(),
            effects: stats::calculate_all_effects().unwrap(),
        });
        report.genetics = Some(GeneticsResults {
            input_genes: genes,
            interpretation: enrichment::fnc_pathway_interpretation(&enrichment_results),
            enrichment: enrichment_results,
            mni_protocol: enrichment::analyze_mni_dataset_predictions(),
            demo_scores: genetics::calculate_fnc_scores(&demo_variants, true),
            sample_report: genetics::generate_sample_report("DEMO_001", &demo_variants),
            variant_source: "demo".to_string(),
            variant_report: variants::generate_fnc_variant_report(&filtered),
        });
        report.charts = vec!["figures/lesion_heatmap.svg".to_string()];
        report
    }

    #[test]
    fn test_generate_markdown_report() {
        let report = create_test_report();
        let markdown = generate_markdown_report(&report);

        assert!(markdown.starts_with("# Savant-FNC Analysis Report"));
        assert!(markdown.contains("## Executive Summary"));
        assert!(markdown.contains("### 1.2 Domain Specificity"));
        assert!(markdown.contains("Perfect pitch, Instant recall, Improvisation"));
        assert!(markdown.contains("### 2.1 Pathway Enrichment"));
        assert!(markdown.contains("ion_channels"));
        assert!(markdown.contains("```json"));
        assert!(markdown.contains("## FNC Interpretation Summary"));
        assert!(markdown.contains("lesion_heatmap.svg"));
        assert!(markdown.contains("Weighted mean d = 1.64"));
        assert!(!markdown.contains("## 3. AI Pattern Recognition"));
    }

    #[test]
    fn test_generate_metadata_section() {
        let mut metadata = ReportMetadata::new(vec!["charts".to_string()]);
        metadata.duration_seconds = 2.5;

        let section = generate_metadata_section(&metadata);

        assert!(section.contains("10.5281/zenodo.17789741"));
        assert!(section.contains("**Analyses:** charts"));
        assert!(section.contains("2.5s"));
    }

    #[test]
    fn test_charts_only_report() {
        let report = Report::new(ReportMetadata::new(vec!["charts".to_string()]));
        let markdown = generate_markdown_report(&report);

        assert!(!markdown.contains("## 1. Statistical Analyses"));
        assert!(!markdown.contains("## Figures"));
        assert!(markdown.contains("## Testable Predictions"));
        assert!(markdown.contains("## Citation"));
    }

    #[test]
    fn test_ai_section() {
        let client = crate::experiments::SimulatedClient::default();
        let responses = crate::experiments::scoring::demo_responses();
        let ai = tokio_test::block_on(crate::experiments::run_ai_experiments(&client, &responses))
            .unwrap();

        let section = generate_ai_section(&ai);
        assert!(section.contains("**Model:** `simulated`"));
        assert!(section.contains("| pattern_awareness |"));
        assert!(section.contains("Largest divergence: **pattern_awareness**"));
    }

    #[test]
    fn test_generate_json_report() {
        let report = create_test_report();
        let json = generate_json_report(&report).unwrap();

        assert!(json.contains("\"metadata\""));
        assert!(json.contains("\"statistics\""));
        assert!(json.contains("\"variant_report\""));
        assert!(!json.contains("\"ai_experiments\""));
    }

    #[test]
    fn test_write_reports() {
        let dir = tempfile::TempDir::new().unwrap();
        let report = Report::new(ReportMetadata::new(Vec::new()));

        let md = dir.path().join("analysis_report.md");
        write_report(&report, &md).unwrap();
        assert!(std::fs::read_to_string(&md).unwrap().contains("## Citation"));

        let json = dir.path().join("analysis_report.json");
        write_json_report(&report, &json).unwrap();
        assert!(std::fs::read_to_string(&json).unwrap().contains("\"doi\""));
    }
}
