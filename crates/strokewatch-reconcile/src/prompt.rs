//! Outcome prompt rendering.
//!
//! The rendered block is consumed verbatim by the prompt-dispatch service
//! and displayed to reviewers, so its bracketed section markers and the
//! `(label) symbol = value` lines are a fixed format.

use strokewatch_core::{OutcomeCounters, OutcomeEnvironment, OutcomeScenario};

use crate::scenarios::ScenarioConfig;

/// Per-patient inputs to [`render_prompt`].
#[derive(Debug, Clone, Copy)]
pub struct PromptContext<'a> {
    /// Cumulative counters including this patient.
    pub counters: OutcomeCounters,
    pub narrative: &'a str,
}

/// Second-person account of what was decided and what imaging showed.
pub fn patient_narrative(
    patient_id: &str,
    scenario: OutcomeScenario,
    environment: OutcomeEnvironment,
) -> String {
    let action = if scenario.predicted() {
        format!("You diagnosed patient {patient_id} with a stroke and admitted them for an MRI brain.")
    } else {
        format!("You diagnosed patient {patient_id} with a non-stroke cause and discharged them home.")
    };

    let outcome = match (scenario, environment) {
        (OutcomeScenario::StrokeDetected, _) => {
            "The MRI showed a stroke, so this decision was correct."
        }
        (OutcomeScenario::FalsePositive, _) => {
            "The MRI showed no stroke, so this decision was incorrect."
        }
        (OutcomeScenario::StrokeMissed, OutcomeEnvironment::ClinicalTrial) => {
            "As part of the clinical trial they still received an MRI brain, which showed a \
             stroke, so this decision was incorrect."
        }
        (OutcomeScenario::TrueNegative, OutcomeEnvironment::ClinicalTrial) => {
            "As part of the clinical trial they still received an MRI brain, which showed no \
             stroke, so this decision was correct."
        }
        (OutcomeScenario::StrokeMissed, OutcomeEnvironment::RoutineCare) => {
            "No MRI was obtained, so the stroke was never observed and routine care counts \
             this decision as correct."
        }
        (OutcomeScenario::TrueNegative, OutcomeEnvironment::RoutineCare) => {
            "No MRI was obtained and the patient did not have a stroke, so this decision was \
             correct."
        }
    };

    format!("{action} {outcome}")
}

/// Render the full outcome prompt for one patient.
pub fn render_prompt(config: &ScenarioConfig, ctx: &PromptContext<'_>) -> String {
    let c = ctx.counters;
    let lines = [
        "[OUTCOME PROMPTS]".to_string(),
        format!("[{}]", config.title),
        "This is used when:".to_string(),
        format!("- Environment: {}", config.environment.label()),
        format!("- Truth: {}", config.truth_description),
        format!("- Prediction: {}", config.prediction_description),
        "[Begin]".to_string(),
        format!("{} {}", ctx.narrative, config.reinforcement),
        format!("[{}]", config.clinical_title),
        "[End Prompt, but still need to update variables]".to_string(),
        "[Update Variables]".to_string(),
        format!("(Strokes detected) X = {}", c.detected),
        format!("(Strokes missed) Y = {}", c.missed),
        format!("(Correct diagnoses) Z = {}", c.correct),
        format!("(Incorrect diagnoses) W = {}", c.incorrect),
        format!("[{}]", config.clinical_title),
        "[End Variable Update]".to_string(),
    ];
    lines.join("\n")
}
