//! The reconciliation pass.
//!
//! A strict left-to-right fold over agent results in the order they were
//! received. Each entry's prompt reports the cumulative counters through
//! that patient, so reordering the input changes the output; callers pass
//! an explicit ordered slice and the pass never re-sorts it.

use serde::Serialize;
use strokewatch_core::{
    AgentPatientResult, CounterDelta, OutcomeCounters, OutcomeEnvironment, OutcomeScenario,
};

use crate::prompt::{PromptContext, patient_narrative, render_prompt};
use crate::scenarios::{SCENARIO_CONFIGS, ScenarioConfig, find_config};
use crate::truth::TruthLookup;

/// The reconciled outcome for one patient.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PatientOutcomeEntry {
    pub patient_id: String,
    pub scenario: OutcomeScenario,
    pub predicted_stroke: bool,
    pub truth_stroke: bool,
    pub narrative: String,
    pub prompt: String,
    pub diagnosis: Option<String>,
    pub stroke_probability: Option<f64>,
    /// Cumulative counters after this patient.
    pub counters: OutcomeCounters,
}

/// Output of one pass: ordered entries plus the final counters.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Reconciliation {
    pub entries: Vec<PatientOutcomeEntry>,
    pub summary: OutcomeCounters,
}

/// Reconcile `results` against ground truth using the default scenario table.
pub fn reconcile(
    results: &[AgentPatientResult],
    truth: &TruthLookup,
    environment: OutcomeEnvironment,
) -> Reconciliation {
    reconcile_with(results, truth, environment, &SCENARIO_CONFIGS)
}

/// Reconcile against an explicit scenario table.
///
/// A pair missing from `table` contributes a zero delta and its prompt is
/// the bare narrative.
pub fn reconcile_with(
    results: &[AgentPatientResult],
    truth: &TruthLookup,
    environment: OutcomeEnvironment,
    table: &[ScenarioConfig],
) -> Reconciliation {
    let mut counters = OutcomeCounters::default();
    let mut entries = Vec::with_capacity(results.len());

    for (index, result) in results.iter().enumerate() {
        let patient_id = result
            .patient_id
            .clone()
            .unwrap_or_else(|| (index + 1).to_string());

        let truth_stroke = truth.truth_flag(&patient_id);
        let predicted_stroke = result.predicts_stroke();
        let scenario = OutcomeScenario::classify(predicted_stroke, truth_stroke);

        let config = find_config(table, environment, scenario);
        let delta = config.map_or(CounterDelta::ZERO, |c| c.delta);
        counters = counters.apply(delta);

        let narrative = patient_narrative(&patient_id, scenario, environment);
        let prompt = match config {
            Some(config) => render_prompt(
                config,
                &PromptContext {
                    counters,
                    narrative: &narrative,
                },
            ),
            None => narrative.clone(),
        };

        entries.push(PatientOutcomeEntry {
            patient_id,
            scenario,
            predicted_stroke,
            truth_stroke,
            narrative,
            prompt,
            diagnosis: result.diagnosis.clone(),
            stroke_probability: result.stroke_probability,
            counters,
        });
    }

    Reconciliation {
        entries,
        summary: counters,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strokewatch_core::{FieldValue, GroundTruthRow};

    fn result(id: &str, diagnosis: &str) -> AgentPatientResult {
        AgentPatientResult {
            patient_id: Some(id.to_string()),
            diagnosis: Some(diagnosis.to_string()),
            ..Default::default()
        }
    }

    fn truth(rows: &[(&str, &str)]) -> TruthLookup {
        let rows: Vec<GroundTruthRow> = rows
            .iter()
            .map(|(id, flag)| {
                GroundTruthRow::from_pairs([
                    ("Patient#", FieldValue::from(*id)),
                    ("True Stroke?", FieldValue::from(*flag)),
                ])
            })
            .collect();
        TruthLookup::from_rows(&rows)
    }

    #[test]
    fn counters_accumulate_in_order() {
        let results = vec![
            result("1", "Posterior circulation stroke"),
            result("2", "Non-stroke cause"),
            result("3", "Cerebellar stroke"),
        ];
        let lookup = truth(&[("1", "Yes"), ("2", "Yes"), ("3", "Yes")]);

        let out = reconcile(&results, &lookup, OutcomeEnvironment::ClinicalTrial);

        let scenarios: Vec<_> = out.entries.iter().map(|e| e.scenario).collect();
        assert_eq!(
            scenarios,
            vec![
                OutcomeScenario::StrokeDetected,
                OutcomeScenario::StrokeMissed,
                OutcomeScenario::StrokeDetected,
            ]
        );
        assert_eq!(out.summary, OutcomeCounters::new(2, 1, 2, 1));

        // The second prompt reports state as of that patient, not the totals.
        let second = &out.entries[1];
        assert_eq!(second.counters, OutcomeCounters::new(1, 1, 1, 1));
        assert!(second.prompt.contains("(Strokes detected) X = 1\n"));
        assert!(second.prompt.contains("(Strokes missed) Y = 1\n"));
    }

    #[test]
    fn order_changes_intermediate_prompts_not_summary() {
        let a = result("1", "stroke");
        let b = result("2", "Non-stroke cause");
        let lookup = truth(&[("1", "Yes"), ("2", "Yes")]);

        let forward = reconcile(&[a.clone(), b.clone()], &lookup, OutcomeEnvironment::ClinicalTrial);
        let reverse = reconcile(&[b, a], &lookup, OutcomeEnvironment::ClinicalTrial);

        assert_eq!(forward.summary, reverse.summary);
        assert_eq!(forward.entries[0].counters, OutcomeCounters::new(1, 0, 1, 0));
        assert_eq!(reverse.entries[0].counters, OutcomeCounters::new(0, 1, 0, 1));
    }

    #[test]
    fn rerun_is_identical() {
        let results = vec![
            result("1", "stroke"),
            AgentPatientResult {
                patient_id: Some("2".into()),
                stroke_probability: Some(0.3),
                ..Default::default()
            },
        ];
        let lookup = truth(&[("1", "No"), ("2", "No")]);

        let first = reconcile(&results, &lookup, OutcomeEnvironment::RoutineCare);
        let second = reconcile(&results, &lookup, OutcomeEnvironment::RoutineCare);
        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[test]
    fn missing_truth_row_counts_as_no_stroke() {
        let results = vec![result("8", "stroke")];
        let out = reconcile(&results, &TruthLookup::default(), OutcomeEnvironment::ClinicalTrial);
        assert!(!out.entries[0].truth_stroke);
        assert_eq!(out.entries[0].scenario, OutcomeScenario::FalsePositive);
        assert_eq!(out.summary, OutcomeCounters::new(0, 0, 0, 1));
    }

    #[test]
    fn missing_identifier_uses_one_based_position() {
        let results = vec![
            result("5", "Non-stroke cause"),
            AgentPatientResult {
                stroke_probability: Some(0.9),
                ..Default::default()
            },
        ];
        // Position 2 matches a ground-truth row keyed "2".
        let lookup = truth(&[("2", "yes")]);
        let out = reconcile(&results, &lookup, OutcomeEnvironment::ClinicalTrial);
        assert_eq!(out.entries[1].patient_id, "2");
        assert_eq!(out.entries[1].scenario, OutcomeScenario::StrokeDetected);
    }

    #[test]
    fn routine_care_miss_scores_as_correct() {
        let results = vec![result("1", "Non-stroke cause")];
        let lookup = truth(&[("1", "Yes")]);
        let out = reconcile(&results, &lookup, OutcomeEnvironment::RoutineCare);
        assert_eq!(out.entries[0].scenario, OutcomeScenario::StrokeMissed);
        assert_eq!(out.summary, OutcomeCounters::new(0, 0, 1, 0));
    }

    #[test]
    fn unconfigured_pair_falls_back_to_narrative() {
        let results = vec![result("1", "stroke"), result("2", "stroke")];
        let lookup = truth(&[("1", "Yes"), ("2", "No")]);
        let out = reconcile_with(&results, &lookup, OutcomeEnvironment::ClinicalTrial, &[]);

        assert_eq!(out.summary, OutcomeCounters::default());
        for entry in &out.entries {
            assert_eq!(entry.prompt, entry.narrative);
            assert!(!entry.prompt.contains("[Update Variables]"));
        }
    }

    #[test]
    fn entry_carries_raw_fields() {
        let results = vec![AgentPatientResult {
            patient_id: Some("4".into()),
            diagnosis: Some("Vestibular neuritis".into()),
            stroke_probability: Some(0.12),
            reasoning: Some("Positive head impulse".into()),
            recommendation: None,
        }];
        let out = reconcile(&results, &truth(&[("4", "no")]), OutcomeEnvironment::ClinicalTrial);
        let e = &out.entries[0];
        assert_eq!(e.diagnosis.as_deref(), Some("Vestibular neuritis"));
        assert_eq!(e.stroke_probability, Some(0.12));
        assert!(!e.predicted_stroke);
        assert_eq!(e.scenario, OutcomeScenario::TrueNegative);
    }

    #[test]
    fn empty_input_yields_zero_summary() {
        let out = reconcile(&[], &TruthLookup::default(), OutcomeEnvironment::ClinicalTrial);
        assert!(out.entries.is_empty());
        assert_eq!(out.summary, OutcomeCounters::default());
    }
}
