//! savant-fnc - Field-Node-Cockpit analysis pipeline
//!
//! Runs the selected analysis groups in sequence and writes the charts
//! and the combined report to the output directory.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Any error (config, I/O, model server, etc.)

mod cli;
mod config;

use anyhow::{Context, Result};
use cli::{Args, Mode, OutputFormat};
use config::{Config, DEFAULT_CONFIG_FILE};
use savant_fnc::charts;
use savant_fnc::experiments::scoring::demo_responses;
use savant_fnc::experiments::{
    run_ai_experiments, AiExperiments, OllamaClient, OllamaConfig, ResponseRecord,
    SimulatedClient,
};
use savant_fnc::genetics::enrichment::{analyze_mni_dataset_predictions, fnc_pathway_interpretation};
use savant_fnc::genetics::variants::{demo_variants, read_vcf};
use savant_fnc::genetics::{
    annotate_variants, calculate_fnc_scores, demo_variant_genes, filter_neural_variants,
    generate_fnc_variant_report, generate_sample_report, run_pathway_enrichment,
    EnrichmentOptions, VariantGene, DEMO_GENES,
};
use savant_fnc::models::{GeneticsResults, Report, ReportMetadata, StatisticsResults};
use savant_fnc::report;
use savant_fnc::stats::{calculate_all_effects, run_all_analyses};
use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    init_logging(&args);

    info!("savant-fnc v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    match run_analysis(args).await {
        Ok(exit_code) => {
            std::process::exit(exit_code);
        }
        Err(e) => {
            error!("Analysis failed: {:#}", e);
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .savant-fnc.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(DEFAULT_CONFIG_FILE);

    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            DEFAULT_CONFIG_FILE
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", DEFAULT_CONFIG_FILE))?;

    println!("✅ Created {} with default settings.", DEFAULT_CONFIG_FILE);
    println!("   Edit it to customize enrichment, variant filters and the model.");
    Ok(())
}

/// Initialize logging. `RUST_LOG` overrides the verbosity flags.
fn init_logging(args: &Args) {
    let level = args.log_level();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.to_string()));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

fn analysis_names(mode: Mode) -> Vec<String> {
    [
        ("charts", mode.charts()),
        ("statistics", mode.statistics()),
        ("genetics", mode.genetics()),
        ("ai", mode.ai()),
    ]
    .into_iter()
    .filter(|(_, enabled)| *enabled)
    .map(|(name, _)| name.to_string())
    .collect()
}

/// Step and summary output on stdout. `--quiet` silences it.
#[derive(Debug, Clone, Copy)]
struct Console {
    quiet: bool,
}

impl Console {
    fn from_args(args: &Args) -> Self {
        Self { quiet: args.quiet }
    }

    fn write_line(&self, writer: &mut impl Write, line: fmt::Arguments<'_>) {
        if !self.quiet {
            let _ = writeln!(writer, "{}", line);
        }
    }

    fn println(&self, line: fmt::Arguments<'_>) {
        self.write_line(&mut std::io::stdout().lock(), line);
    }
}

/// Run the selected analyses. Returns the exit code.
async fn run_analysis(args: Args) -> Result<i32> {
    let start_time = Instant::now();

    // Load configuration
    let mut config = load_config(&args)?;
    config.merge_with_args(&args);

    let mode = args.mode();
    let out = Console::from_args(&args);
    let output_dir = PathBuf::from(&config.general.output_dir);
    std::fs::create_dir_all(&output_dir).with_context(|| {
        format!("Failed to create output directory: {}", output_dir.display())
    })?;

    out.println(format_args!("🧬 Savant-FNC analysis pipeline"));
    out.println(format_args!("   Output: {}", output_dir.display()));

    let mut report = Report::new(ReportMetadata::new(analysis_names(mode)));

    if mode.charts() {
        out.println(format_args!("\n📊 Generating charts..."));
        let written = charts::generate_all_charts(&output_dir, !args.quiet)?;
        out.println(format_args!(
            "   {} charts saved to {}",
            written.len(),
            output_dir.display()
        ));
        report.charts = written.iter().map(|p| p.display().to_string()).collect();
    }

    if mode.statistics() {
        out.println(format_args!("\n📈 Running statistical analyses..."));
        let stats = run_statistics(out)?;
        print_statistics_summary(out, &stats);
        report.statistics = Some(stats);
    }

    if mode.genetics() {
        out.println(format_args!("\n🔬 Running genetic analyses..."));
        let genetics = run_genetics(out, &config, args.vcf.as_deref())?;
        print_genetics_summary(out, &genetics);
        report.genetics = Some(genetics);
    }

    if mode.ai() {
        out.println(format_args!("\n🤖 Running AI pattern recognition experiments..."));
        let ai = run_ai(out, &config, args.responses.as_deref()).await?;
        print_ai_summary(out, &ai);
        report.ai_experiments = Some(ai);
    }

    report.metadata.duration_seconds = start_time.elapsed().as_secs_f64();

    if mode.writes_report() {
        out.println(format_args!("\n📝 Generating report..."));
        let format = OutputFormat::from_config(&config.general.report_format);
        let path = output_dir.join(format.report_file_name());
        let written = match format {
            OutputFormat::Json => report::write_json_report(&report, &path),
            OutputFormat::Markdown => report::write_report(&report, &path),
        };
        written.with_context(|| format!("Failed to write report to {}", path.display()))?;
        out.println(format_args!("   Report saved to: {}", path.display()));
    }

    out.println(format_args!(
        "\n✅ Analysis complete in {:.1}s",
        report.metadata.duration_seconds
    ));
    Ok(0)
}

fn run_statistics(out: Console) -> Result<StatisticsResults> {
    out.println(format_args!("   → Prevalence analyses"));
    let prevalence = run_all_analyses().context("Prevalence analysis failed")?;
    out.println(format_args!("   → Effect size analyses"));
    let effects = calculate_all_effects().context("Effect size analysis failed")?;
    Ok(StatisticsResults {
        prevalence,
        effects,
    })
}

fn print_statistics_summary(out: Console, stats: &StatisticsResults) {
    let association = &stats.prevalence.autism_savant_association;
    let specificity = &stats.prevalence.domain_specificity;
    let meta = &stats.effects.tms_effects.meta_analysis;
    let lateralization = &stats.effects.lesion_effects.lateralization;

    out.println(format_args!(
        "\n   Autism-savant odds ratio: {:.1}",
        association.odds_ratio
    ));
    out.println(format_args!(
        "   Domain specificity: χ² = {:.1} (df = {}), V = {:.2}",
        specificity.chi_square, specificity.df, specificity.effect_size_cramers_v
    ));
    out.println(format_args!(
        "   TMS meta-analysis: d = {:.2} (k = {}, N = {})",
        meta.weighted_mean_d, meta.k_studies, meta.total_n
    ));
    out.println(format_args!(
        "   Left hemisphere lesions: {}/{} (p = {:.4})",
        lateralization.left_hemisphere,
        lateralization.left_hemisphere + lateralization.right_hemisphere,
        lateralization.binomial_p
    ));
}

fn run_genetics(out: Console, config: &Config, vcf: Option<&Path>) -> Result<GeneticsResults> {
    let input_genes: Vec<String> = DEMO_GENES.iter().map(|g| g.to_string()).collect();

    out.println(format_args!("   → Pathway enrichment on {} genes", input_genes.len()));
    let options = EnrichmentOptions::from(&config.enrichment);
    let enrichment = run_pathway_enrichment(&input_genes, &options)?;
    let interpretation = fnc_pathway_interpretation(&enrichment);
    if enrichment.is_empty() {
        warn!("No enriched pathways found");
    }

    out.println(format_args!("   → MNI dataset protocol"));
    let mni_protocol = analyze_mni_dataset_predictions();

    out.println(format_args!("   → Demo FNC tuning scores"));
    let demo = demo_variant_genes();
    let demo_scores = calculate_fnc_scores(&demo, config.scoring.normalize);

    let (variant_source, raw_variants) = match vcf {
        Some(path) => {
            out.println(format_args!("   → Annotating variants from {}", path.display()));
            let variants = read_vcf(path)
                .with_context(|| format!("Failed to read VCF: {}", path.display()))?;
            (path.display().to_string(), variants)
        }
        None => {
            out.println(format_args!("   → Annotating demo variants"));
            ("demo".to_string(), demo_variants())
        }
    };
    let annotated = annotate_variants(&raw_variants);
    let filtered = filter_neural_variants(
        &annotated,
        config.scoring.min_cadd,
        config.scoring.max_gnomad_af,
    );
    info!(
        "{} of {} variants passed the neural filter",
        filtered.len(),
        annotated.len()
    );
    let variant_report = generate_fnc_variant_report(&filtered);

    let sample_report = match vcf {
        Some(path) => {
            let sample_id = path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| "SAMPLE".to_string());
            let genes: Vec<VariantGene> = filtered.iter().map(|v| v.to_variant_gene()).collect();
            generate_sample_report(&sample_id, &genes)
        }
        None => generate_sample_report("DEMO_001", &demo),
    };

    Ok(GeneticsResults {
        input_genes,
        enrichment,
        interpretation,
        mni_protocol,
        demo_scores,
        sample_report,
        variant_source,
        variant_report,
    })
}

fn print_genetics_summary(out: Console, genetics: &GeneticsResults) {
    out.println(format_args!("\n   Enriched pathways: {}", genetics.enrichment.len()));
    for result in &genetics.enrichment {
        out.println(format_args!(
            "     - {} ({}) p = {:.2e}",
            result.pathway,
            result.genes_found.join(", "),
            result.p_value
        ));
    }
    out.println(format_args!(
        "   Demo profile: {} (overall {:.2})",
        genetics.demo_scores.predicted_domain, genetics.demo_scores.overall_score
    ));
    out.println(format_args!(
        "   FNC-relevant variants: {}/{}",
        genetics.variant_report.fnc_relevant, genetics.variant_report.total_variants
    ));
}

/// Read a JSON array of response records.
fn load_responses(path: &Path) -> Result<Vec<ResponseRecord>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read responses file: {}", path.display()))?;
    let records: Vec<ResponseRecord> = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse responses file: {}", path.display()))?;
    Ok(records)
}

async fn run_ai(out: Console, config: &Config, responses: Option<&Path>) -> Result<AiExperiments> {
    let records = match responses {
        Some(path) => load_responses(path)?,
        None => demo_responses(),
    };
    out.println(format_args!("   Responses to score: {}", records.len()));

    let results = if config.model.live {
        out.println(format_args!("   Model: {}", config.model.name));
        out.println(format_args!("   Ollama: {}", config.model.ollama_url));
        out.println(format_args!("   Timeout: {}s", config.model.timeout_seconds));
        let client = OllamaClient::new(OllamaConfig::from(&config.model))?;
        run_ai_experiments(&client, &records).await?
    } else {
        out.println(format_args!(
            "   Model: offline placeholder (use --live to query Ollama)"
        ));
        let client = SimulatedClient::default();
        run_ai_experiments(&client, &records).await?
    };

    Ok(results)
}

fn print_ai_summary(out: Console, ai: &AiExperiments) {
    let profile = &ai.field_access.fnc_profile;
    out.println(format_args!(
        "\n   Mean savant-likeness: {:.2} ({})",
        ai.field_access.mean_overall, profile.access_type
    ));
    out.println(format_args!(
        "   Savant similarity: {:.2} ({})",
        profile.savant_similarity, profile.similarity_level
    ));
    for model in &ai.battery.models {
        out.println(format_args!(
            "   Battery accuracy: {:.0}% ({}/{})",
            model.accuracy * 100.0,
            model.correct,
            model.total
        ));
    }
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from {}", DEFAULT_CONFIG_FILE);
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {}", e);
            Ok(Config::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn render(console: Console, line: fmt::Arguments<'_>) -> String {
        let mut buffer = Vec::new();
        console.write_line(&mut buffer, line);
        String::from_utf8(buffer).unwrap()
    }

    #[test]
    fn test_quiet_silences_step_output() {
        let args = Args::try_parse_from(["savant-fnc", "--stats", "--quiet"]).unwrap();
        let console = Console::from_args(&args);
        assert_eq!(render(console, format_args!("📈 Running {}", "stats")), "");
    }

    #[test]
    fn test_step_output_by_default() {
        let args = Args::try_parse_from(["savant-fnc", "--stats"]).unwrap();
        let console = Console::from_args(&args);
        assert_eq!(
            render(console, format_args!("   → {} analyses", "Prevalence")),
            "   → Prevalence analyses\n"
        );
    }

    #[test]
    fn test_analysis_names_follow_mode() {
        assert_eq!(analysis_names(Mode::Report), vec!["statistics", "genetics"]);
        assert_eq!(analysis_names(Mode::All).len(), 4);
    }
}
