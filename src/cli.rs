//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::{ArgGroup, Parser};
use std::path::PathBuf;

/// savant-fnc - Field-Node-Cockpit analyses of savant syndrome
///
/// Prevalence statistics, effect sizes, gene scoring, pathway enrichment,
/// AI pattern tests and SVG charts, collected into one report.
///
/// Examples:
///   savant-fnc --all
///   savant-fnc --stats --format json
///   savant-fnc --genetics --vcf sample.vcf
///   savant-fnc --ai --live --model llama3.2:latest
///   savant-fnc --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
#[command(group(ArgGroup::new("mode").multiple(false)))]
pub struct Args {
    /// Run every analysis and write the report (default)
    #[arg(long, group = "mode")]
    pub all: bool,

    /// Generate charts only
    #[arg(long, group = "mode")]
    pub viz: bool,

    /// Run statistical analyses only
    #[arg(long, group = "mode")]
    pub stats: bool,

    /// Run genetic analyses only
    #[arg(long, group = "mode")]
    pub genetics: bool,

    /// Run AI pattern recognition experiments only
    #[arg(long, group = "mode")]
    pub ai: bool,

    /// Run statistics and genetics, then write the report
    #[arg(long, group = "mode")]
    pub report: bool,

    /// Output directory for charts and the report
    ///
    /// Default: from config or `figures`.
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// Report format (markdown, json)
    #[arg(long, value_name = "FORMAT")]
    pub format: Option<OutputFormat>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .savant-fnc.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// VCF file to annotate instead of the demo variants
    #[arg(long, value_name = "FILE")]
    pub vcf: Option<PathBuf>,

    /// JSON array of {question, response, correct_answer} records to score
    #[arg(long, value_name = "FILE")]
    pub responses: Option<PathBuf>,

    /// Query an Ollama server instead of the offline placeholder client
    #[arg(long)]
    pub live: bool,

    /// Ollama model to use with --live
    #[arg(short, long, env = "SAVANT_FNC_MODEL")]
    pub model: Option<String>,

    /// Ollama API endpoint URL
    #[arg(long, env = "OLLAMA_URL")]
    pub ollama_url: Option<String>,

    /// Background gene count for pathway enrichment
    #[arg(long, value_name = "GENES")]
    pub background_size: Option<u64>,

    /// Generate a default .savant-fnc.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Markdown => "markdown",
            OutputFormat::Json => "json",
        }
    }

    /// Parse a config value, falling back to Markdown.
    pub fn from_config(value: &str) -> Self {
        if value.eq_ignore_ascii_case("json") {
            OutputFormat::Json
        } else {
            OutputFormat::Markdown
        }
    }

    pub fn report_file_name(&self) -> &'static str {
        match self {
            OutputFormat::Markdown => "analysis_report.md",
            OutputFormat::Json => "analysis_report.json",
        }
    }
}

/// Which analysis groups to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    All,
    Viz,
    Stats,
    Genetics,
    Ai,
    Report,
}

impl Mode {
    pub fn charts(&self) -> bool {
        matches!(self, Mode::All | Mode::Viz)
    }

    pub fn statistics(&self) -> bool {
        matches!(self, Mode::All | Mode::Stats | Mode::Report)
    }

    pub fn genetics(&self) -> bool {
        matches!(self, Mode::All | Mode::Genetics | Mode::Report)
    }

    pub fn ai(&self) -> bool {
        matches!(self, Mode::All | Mode::Ai)
    }

    pub fn writes_report(&self) -> bool {
        matches!(self, Mode::All | Mode::Report)
    }
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// The selected mode; no flag means `--all`.
    pub fn mode(&self) -> Mode {
        if self.viz {
            Mode::Viz
        } else if self.stats {
            Mode::Stats
        } else if self.genetics {
            Mode::Genetics
        } else if self.ai {
            Mode::Ai
        } else if self.report {
            Mode::Report
        } else {
            Mode::All
        }
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        // Validate Ollama URL format
        if let Some(ref url) = self.ollama_url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err("Ollama URL must start with 'http://' or 'https://'".to_string());
            }
        }

        if self.background_size == Some(0) {
            return Err("Background size must be at least 1".to_string());
        }

        for (flag, path) in [("--vcf", &self.vcf), ("--responses", &self.responses)] {
            if let Some(path) = path {
                if !path.is_file() {
                    return Err(format!("{} file does not exist: {}", flag, path.display()));
                }
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_args() -> Args {
        Args {
            all: false,
            viz: false,
            stats: false,
            genetics: false,
            ai: false,
            report: false,
            output: None,
            format: None,
            config: None,
            verbose: false,
            quiet: false,
            vcf: None,
            responses: None,
            live: false,
            model: None,
            ollama_url: None,
            background_size: None,
            init_config: false,
        }
    }

    #[test]
    fn test_default_mode_is_all() {
        let args = make_args();
        assert_eq!(args.mode(), Mode::All);
        assert!(args.mode().charts());
        assert!(args.mode().ai());
        assert!(args.mode().writes_report());
    }

    #[test]
    fn test_report_mode() {
        let mut args = make_args();
        args.report = true;
        let mode = args.mode();
        assert!(mode.statistics() && mode.genetics() && mode.writes_report());
        assert!(!mode.charts());
        assert!(!mode.ai());
    }

    #[test]
    fn test_modes_are_exclusive() {
        assert!(Args::try_parse_from(["savant-fnc", "--viz", "--stats"]).is_err());
        let args = Args::try_parse_from(["savant-fnc", "--genetics", "--vcf", "x.vcf"]).unwrap();
        assert_eq!(args.mode(), Mode::Genetics);
    }

    #[test]
    fn test_validation_conflicting_options() {
        let mut args = make_args();
        args.verbose = true;
        args.quiet = true;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_invalid_url() {
        let mut args = make_args();
        args.ollama_url = Some("localhost:11434".to_string());
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_missing_vcf() {
        let mut args = make_args();
        args.vcf = Some(PathBuf::from("/nonexistent/sample.vcf"));
        assert!(args.validate().unwrap_err().contains("--vcf"));
    }

    #[test]
    fn test_output_format() {
        assert_eq!(OutputFormat::from_config("JSON"), OutputFormat::Json);
        assert_eq!(OutputFormat::from_config("md"), OutputFormat::Markdown);
        assert_eq!(OutputFormat::Json.report_file_name(), "analysis_report.json");
    }

    #[test]
    fn test_log_level() {
        let mut args = make_args();
        assert_eq!(args.log_level(), tracing::Level::INFO);

        args.verbose = true;
        assert_eq!(args.log_level(), tracing::Level::DEBUG);

        args.verbose = false;
        args.quiet = true;
        assert_eq!(args.log_level(), tracing::Level::ERROR);
    }
}
