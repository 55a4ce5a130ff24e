//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.savant-fnc.toml` files.

use anyhow::{Context, Result};
use savant_fnc::experiments::OllamaConfig;
use savant_fnc::genetics::variants::{DEFAULT_MAX_GNOMAD_AF, DEFAULT_MIN_CADD};
use savant_fnc::genetics::EnrichmentOptions;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_CONFIG_FILE: &str = ".savant-fnc.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Pathway enrichment settings.
    #[serde(default)]
    pub enrichment: EnrichmentConfig,

    /// Gene scoring and variant filter settings.
    #[serde(default)]
    pub scoring: ScoringConfig,

    /// Model settings.
    #[serde(default)]
    pub model: ModelConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Directory for charts and the report.
    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    /// `markdown` or `json`.
    #[serde(default = "default_report_format")]
    pub report_format: String,

    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            report_format: default_report_format(),
            verbose: false,
        }
    }
}

fn default_output_dir() -> String {
    "figures".to_string()
}

fn default_report_format() -> String {
    "markdown".to_string()
}

/// Hypergeometric enrichment settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichmentConfig {
    /// Genes in the background set.
    #[serde(default = "default_background_size")]
    pub background_size: u64,

    #[serde(default = "default_significance_threshold")]
    pub significance_threshold: f64,

    /// Estimated pathway size per candidate gene.
    #[serde(default = "default_pathway_size_multiplier")]
    pub pathway_size_multiplier: u64,
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            background_size: default_background_size(),
            significance_threshold: default_significance_threshold(),
            pathway_size_multiplier: default_pathway_size_multiplier(),
        }
    }
}

fn default_background_size() -> u64 {
    20_000
}

fn default_significance_threshold() -> f64 {
    0.05
}

fn default_pathway_size_multiplier() -> u64 {
    100
}

impl From<&EnrichmentConfig> for EnrichmentOptions {
    fn from(config: &EnrichmentConfig) -> Self {
        Self {
            background_size: config.background_size,
            pathway_size_multiplier: config.pathway_size_multiplier,
            significance_threshold: config.significance_threshold,
        }
    }
}

/// Tuning score and variant filter settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Divide tuning scores by the largest dimension.
    #[serde(default = "default_true")]
    pub normalize: bool,

    /// Minimum CADD score kept by the neural variant filter.
    #[serde(default = "default_min_cadd")]
    pub min_cadd: f64,

    /// Maximum gnomAD allele frequency kept by the filter.
    #[serde(default = "default_max_gnomad_af")]
    pub max_gnomad_af: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            normalize: true,
            min_cadd: default_min_cadd(),
            max_gnomad_af: default_max_gnomad_af(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_min_cadd() -> f64 {
    DEFAULT_MIN_CADD
}

fn default_max_gnomad_af() -> f64 {
    DEFAULT_MAX_GNOMAD_AF
}

/// Chat model settings for the AI experiments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Ollama model name.
    #[serde(default = "default_model")]
    pub name: String,

    /// Ollama API URL.
    #[serde(default = "default_ollama_url")]
    pub ollama_url: String,

    /// Temperature for generation.
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// Query the model server instead of the offline placeholder.
    #[serde(default)]
    pub live: bool,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            name: default_model(),
            ollama_url: default_ollama_url(),
            temperature: default_temperature(),
            timeout_seconds: default_timeout(),
            live: false,
        }
    }
}

fn default_model() -> String {
    "llama3.2:latest".to_string()
}

fn default_ollama_url() -> String {
    "http://localhost:11434".to_string()
}

fn default_temperature() -> f32 {
    0.1
}

fn default_timeout() -> u64 {
    120
}

impl From<&ModelConfig> for OllamaConfig {
    fn from(config: &ModelConfig) -> Self {
        Self {
            ollama_url: config.ollama_url.clone(),
            model_name: config.name.clone(),
            temperature: config.temperature,
            timeout_seconds: config.timeout_seconds,
        }
    }
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(DEFAULT_CONFIG_FILE);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// Only values the user passed on the command line override the file.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref output) = args.output {
            self.general.output_dir = output.display().to_string();
        }
        if let Some(format) = args.format {
            self.general.report_format = format.as_str().to_string();
        }
        if args.verbose {
            self.general.verbose = true;
        }

        if let Some(background_size) = args.background_size {
            self.enrichment.background_size = background_size;
        }

        if let Some(ref model) = args.model {
            self.model.name = model.clone();
        }
        if let Some(ref url) = args.ollama_url {
            self.model.ollama_url = url.clone();
        }
        if args.live {
            self.model.live = true;
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.general.output_dir, "figures");
        assert_eq!(config.enrichment.background_size, 20_000);
        assert_eq!(config.scoring.min_cadd, 15.0);
        assert_eq!(config.model.name, "llama3.2:latest");
        assert!(!config.model.live);
    }

    #[test]
    fn test_parse_config() {
        let toml_content = r#"
[general]
output_dir = "out"
report_format = "json"

[enrichment]
background_size = 18000

[model]
name = "qwen2.5:7b"
live = true
"#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert_eq!(config.general.output_dir, "out");
        assert_eq!(config.general.report_format, "json");
        assert_eq!(config.enrichment.background_size, 18_000);
        assert_eq!(config.enrichment.pathway_size_multiplier, 100);
        assert!(config.scoring.normalize);
        assert_eq!(config.model.name, "qwen2.5:7b");
        assert!(config.model.live);
        assert_eq!(config.model.timeout_seconds, 120);
    }

    #[test]
    fn test_default_toml_generation() {
        let toml_str = Config::default_toml();
        assert!(toml_str.contains("[general]"));
        assert!(toml_str.contains("[enrichment]"));
        assert!(toml_str.contains("[scoring]"));
        assert!(toml_str.contains("[model]"));

        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.scoring.max_gnomad_af, 0.01);
    }

    #[test]
    fn test_conversions() {
        let config = Config::default();
        let options = EnrichmentOptions::from(&config.enrichment);
        assert_eq!(options.background_size, 20_000);
        assert_eq!(options.significance_threshold, 0.05);

        let ollama = OllamaConfig::from(&config.model);
        assert_eq!(ollama.model_name, "llama3.2:latest");
        assert_eq!(ollama.timeout_seconds, 120);
    }

    #[test]
    fn test_load_missing_file() {
        assert!(Config::load(Path::new("/nonexistent/.savant-fnc.toml")).is_err());
    }
}
