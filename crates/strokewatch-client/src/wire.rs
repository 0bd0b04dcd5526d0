//! Request and response bodies exchanged with the service.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use strokewatch_core::{GroundTruthRow, OutcomeEnvironment, OutcomeScenario, PatientRecord};

/// Patient records and ground truth, as served by `GET /api/sample-data` and
/// `POST /api/patient-data`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workbook {
    #[serde(default)]
    pub patients: Vec<PatientRecord>,
    #[serde(default)]
    pub ground_truth: Vec<GroundTruthRow>,
}

/// Body of `POST /api/run-agent`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunAgentRequest {
    pub patients: Vec<PatientRecord>,
    pub ground_truth: Vec<GroundTruthRow>,
    pub instructions: String,
    pub limit: u32,
}

impl RunAgentRequest {
    /// A single-patient request, as the orchestrator sends one per task.
    pub fn single(
        patient: PatientRecord,
        ground_truth: Vec<GroundTruthRow>,
        instructions: &str,
    ) -> Self {
        Self {
            patients: vec![patient],
            ground_truth,
            instructions: instructions.trim().to_string(),
            limit: 1,
        }
    }
}

/// Body of `POST /api/outcome-prompt`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutcomePromptRequest {
    pub patient_id: String,
    pub prompt: String,
    pub environment: OutcomeEnvironment,
    pub scenario: OutcomeScenario,
    pub diagnosis: Option<String>,
    pub predicted_stroke: bool,
    pub truth_stroke: bool,
}

/// Acknowledgement from `POST /api/outcome-prompt`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutcomePromptAck {
    pub status: String,
    #[serde(default)]
    pub agent_response: Option<Value>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct HealthResponse {
    pub status: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use strokewatch_core::FieldValue;

    #[test]
    fn run_agent_request_shape() {
        let patient = PatientRecord::from_pairs([
            ("Patient#", FieldValue::from("12")),
            ("Age", FieldValue::Number(67.0)),
        ]);
        let truth = GroundTruthRow::from_pairs([("Patient#", "12"), ("True Stroke?", "Yes")]);
        let req = RunAgentRequest::single(patient, vec![truth], "  be concise \n");

        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(
            value,
            json!({
                "patients": [{"Age": 67.0, "Patient#": "12"}],
                "groundTruth": [{"Patient#": "12", "True Stroke?": "Yes"}],
                "instructions": "be concise",
                "limit": 1
            })
        );
    }

    #[test]
    fn outcome_prompt_request_shape() {
        let req = OutcomePromptRequest {
            patient_id: "3".into(),
            prompt: "[OUTCOME PROMPTS]".into(),
            environment: OutcomeEnvironment::RoutineCare,
            scenario: OutcomeScenario::StrokeMissed,
            diagnosis: None,
            predicted_stroke: false,
            truth_stroke: true,
        };
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(value["patientId"], "3");
        assert_eq!(value["environment"], "routine-care");
        assert_eq!(value["scenario"], "stroke-missed");
        assert_eq!(value["diagnosis"], Value::Null);
        assert_eq!(value["predictedStroke"], false);
        assert_eq!(value["truthStroke"], true);
    }

    #[test]
    fn workbook_reads_both_sheets() {
        let wb: Workbook = serde_json::from_value(json!({
            "patients": [{"Patient#": 1, "Age": 72, "Symptoms": "vertigo"}],
            "groundTruth": [{"Patient#": 1, "True Stroke?": "Yes", "Stroke Risk": 0.4}]
        }))
        .unwrap();
        assert_eq!(wb.patients.len(), 1);
        assert_eq!(wb.patients[0].identifier().as_deref(), Some("1"));
        assert_eq!(wb.ground_truth[0].identifier().as_deref(), Some("1"));
    }

    #[test]
    fn workbook_ground_truth_optional() {
        let wb: Workbook = serde_json::from_str(r#"{"patients": []}"#).unwrap();
        assert!(wb.ground_truth.is_empty());
        let value = serde_json::to_value(&wb).unwrap();
        assert_eq!(value, json!({"patients": [], "groundTruth": []}));
    }

    #[test]
    fn ack_without_agent_response() {
        let ack: OutcomePromptAck = serde_json::from_str(r#"{"status": "sent"}"#).unwrap();
        assert_eq!(ack.status, "sent");
        assert!(ack.agent_response.is_none());
    }
}
