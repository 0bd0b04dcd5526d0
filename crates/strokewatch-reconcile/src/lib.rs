//! Outcome reconciliation: truth lookup, scenario tables, prompt rendering
//! and the sequential counter fold.

mod engine;
mod prompt;
mod scenarios;
mod truth;

pub use engine::{PatientOutcomeEntry, Reconciliation, reconcile, reconcile_with};
pub use prompt::{PromptContext, patient_narrative, render_prompt};
pub use scenarios::{SCENARIO_CONFIGS, ScenarioConfig, scenario_config};
pub use truth::{TruthLookup, TruthSummary};
