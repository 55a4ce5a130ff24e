//! Statistical analyses.
//!
//! Prevalence and effect size analyses over literature estimates, built on
//! the distribution functions in [`distributions`].

pub mod distributions;
pub mod effect_sizes;
pub mod prevalence;

pub use effect_sizes::{calculate_all_effects, AllEffects};
pub use prevalence::{run_all_analyses, PrevalenceAnalyses};
