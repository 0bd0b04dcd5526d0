//! Per-patient results returned by the remote classification agent.
//!
//! The agent's output is untrusted: it is whatever the model produced,
//! passed through the service as JSON. [`parse_agent_output`] accepts the
//! shapes the service has been seen to return and drops anything it cannot
//! make sense of at the field level rather than failing the whole payload.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::outcome::predicted_stroke;
use crate::record::{FieldValue, IDENTIFIER_FIELDS};

const PROBABILITY_FIELDS: &[&str] = &["stroke_probability", "strokeProbability", "probability"];

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AgentOutputError {
    #[error("agent reported an error: {0}")]
    Reported(String),
    #[error("unrecognised agent output: {0}")]
    Unrecognised(String),
}

/// One patient's classification as returned by the agent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentPatientResult {
    pub patient_id: Option<String>,
    pub diagnosis: Option<String>,
    /// Probability of stroke in `[0, 1]`.
    pub stroke_probability: Option<f64>,
    pub reasoning: Option<String>,
    pub recommendation: Option<String>,
}

impl AgentPatientResult {
    /// Read a single result object, keeping whichever fields are usable.
    pub fn from_json(obj: &Map<String, Value>) -> Self {
        Self {
            patient_id: IDENTIFIER_FIELDS
                .iter()
                .find_map(|name| obj.get(*name).and_then(json_identifier)),
            diagnosis: json_text(obj.get("diagnosis")),
            stroke_probability: PROBABILITY_FIELDS
                .iter()
                .find_map(|name| obj.get(*name).and_then(json_probability)),
            reasoning: json_text(obj.get("reasoning")),
            recommendation: json_text(obj.get("recommendation")),
        }
    }

    /// Whether this result amounts to a stroke diagnosis.
    pub fn predicts_stroke(&self) -> bool {
        predicted_stroke(self.diagnosis.as_deref(), self.stroke_probability)
    }

    /// Whether the result names or scores a patient at all.
    pub fn is_informative(&self) -> bool {
        self.patient_id.is_some() || self.diagnosis.is_some() || self.stroke_probability.is_some()
    }
}

/// Extract patient results from a raw agent output value.
///
/// Accepts `{"patients": [...]}`, a bare array, a single patient object, or a
/// JSON string encoding any of those. An object carrying an `error` field is
/// reported as [`AgentOutputError::Reported`]. Array items that are not
/// objects, or carry no identifier, diagnosis or probability, are skipped; a
/// lone object like that is [`AgentOutputError::Unrecognised`].
pub fn parse_agent_output(output: &Value) -> Result<Vec<AgentPatientResult>, AgentOutputError> {
    match output {
        Value::Null => Ok(Vec::new()),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return Ok(Vec::new());
            }
            let nested: Value = serde_json::from_str(trimmed).map_err(|_| {
                AgentOutputError::Unrecognised(preview(trimmed))
            })?;
            if nested.is_string() {
                return Err(AgentOutputError::Unrecognised(preview(trimmed)));
            }
            parse_agent_output(&nested)
        }
        Value::Array(items) => Ok(items
            .iter()
            .filter_map(Value::as_object)
            .map(AgentPatientResult::from_json)
            .filter(|r| r.is_informative())
            .collect()),
        Value::Object(obj) => {
            if let Some(err) = obj.get("error").filter(|v| !v.is_null()) {
                let message = match err {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                return Err(AgentOutputError::Reported(message));
            }
            match obj.get("patients") {
                Some(patients) => parse_agent_output(patients),
                None => {
                    let result = AgentPatientResult::from_json(obj);
                    if result.is_informative() {
                        Ok(vec![result])
                    } else {
                        Err(AgentOutputError::Unrecognised(preview(&output.to_string())))
                    }
                }
            }
        }
        other => Err(AgentOutputError::Unrecognised(preview(&other.to_string()))),
    }
}

fn json_identifier(v: &Value) -> Option<String> {
    let field: FieldValue = serde_json::from_value(v.clone()).ok()?;
    field.as_identifier()
}

fn json_text(v: Option<&Value>) -> Option<String> {
    match v? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        _ => None,
    }
}

fn json_probability(v: &Value) -> Option<f64> {
    let p = match v {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    (p.is_finite() && (0.0..=1.0).contains(&p)).then_some(p)
}

fn preview(s: &str) -> String {
    s.chars().take(120).collect()
}
