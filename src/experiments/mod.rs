//! AI pattern recognition experiments.
//!
//! A test battery run against a chat model, lexical savant-likeness scoring
//! of responses, and comparison with savant benchmarks.

pub mod battery;
pub mod client;
pub mod scoring;

use crate::error::FncResult;
use serde::Serialize;
use tracing::info;

pub use battery::{
    compare_model_responses, run_pattern_test, run_tuning_experiment, ModelComparison,
    TuningExperiment, PATTERN_TESTS,
};
pub use client::{ModelClient, OllamaClient, OllamaConfig, SimulatedClient};
pub use scoring::{
    calculate_field_access_metrics, compare_human_ai_patterns, FieldAccessMetrics,
    PatternComparison, ResponseRecord,
};

/// Everything the AI experiment step produces.
#[derive(Debug, Clone, Serialize)]
pub struct AiExperiments {
    pub model: String,
    pub field_access: FieldAccessMetrics,
    pub benchmark_comparison: PatternComparison,
    pub battery: ModelComparison,
    pub tuning: TuningExperiment,
}

/// Score `responses`, then run the full battery and tuning experiment
/// against `client`.
pub async fn run_ai_experiments<C: ModelClient>(
    client: &C,
    responses: &[ResponseRecord],
) -> FncResult<AiExperiments> {
    info!("Scoring {} responses", responses.len());
    let field_access = calculate_field_access_metrics(responses)?;
    let benchmark_comparison = compare_human_ai_patterns(responses, None)?;

    let mut results = Vec::new();
    for test in &PATTERN_TESTS {
        results.extend(run_pattern_test(client, test.key, None).await?);
    }
    let battery = compare_model_responses(&[(client.name().to_string(), results)]);

    let tuning = run_tuning_experiment(client).await?;

    Ok(AiExperiments {
        model: client.name().to_string(),
        field_access,
        benchmark_comparison,
        battery,
        tuning,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_ai_experiments_offline() {
        let client = SimulatedClient::default();
        let responses = scoring::demo_responses();
        let results = tokio_test::block_on(run_ai_experiments(&client, &responses)).unwrap();

        assert_eq!(results.model, "simulated");
        assert_eq!(results.field_access.n_responses, 3);
        assert_eq!(results.battery.models.len(), 1);
        assert_eq!(results.battery.models[0].total, 12);
        assert_eq!(results.battery.domain_performance.len(), 4);
        assert_eq!(results.tuning.results.len(), 5);
    }

    #[test]
    fn test_run_ai_experiments_requires_responses() {
        let client = SimulatedClient::default();
        assert!(tokio_test::block_on(run_ai_experiments(&client, &[])).is_err());
    }
}
