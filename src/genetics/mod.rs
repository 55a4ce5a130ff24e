//! Genetic analyses: pathway enrichment, tuning-dimension scoring and
//! variant annotation.

pub mod enrichment;
pub mod scoring;
pub mod variants;

pub use enrichment::{run_pathway_enrichment, EnrichmentOptions, EnrichmentResult};
pub use scoring::{calculate_fnc_scores, generate_sample_report, VariantGene, VariantImpact};
pub use variants::{annotate_variants, filter_neural_variants, generate_fnc_variant_report};

/// Genes used for the demonstration enrichment run.
pub const DEMO_GENES: [&str; 7] = [
    "CACNA1C", "SHANK3", "GABRA1", "SCN2A", "CNTNAP2", "MBP", "GRIN2B",
];

/// Variant genes used for the demonstration tuning profile.
pub fn demo_variant_genes() -> Vec<VariantGene> {
    vec![
        VariantGene::new("CACNA1C", VariantImpact::High),
        VariantGene::new("SHANK3", VariantImpact::Moderate),
        VariantGene::new("GABRA1", VariantImpact::Moderate),
    ]
}
