//! Analyses for the Field-Node-Cockpit (FNC) model of savant syndrome.
//!
//! Each module is an independent analysis over literal literature tables:
//! prevalence statistics and effect sizes ([`stats`]), gene scoring,
//! pathway enrichment and variant annotation ([`genetics`]), savant-likeness
//! scoring of model responses ([`experiments`]) and SVG charts ([`charts`]).
//! [`report`] renders their results as Markdown or JSON.

pub mod charts;
pub mod domains;
pub mod error;
pub mod experiments;
pub mod genetics;
pub mod models;
pub mod report;
pub mod stats;

pub use error::{FncError, FncResult};
