//! HTTP client for the classification agent and outcome-prompt endpoints.

use std::path::Path;

use reqwest::multipart::{Form, Part};
use serde_json::Value;
use strokewatch_core::{AgentOutputError, AgentPatientResult, parse_agent_output};
use thiserror::Error;
use tracing::{debug, info};

use crate::wire::{
    HealthResponse, OutcomePromptAck, OutcomePromptRequest, RunAgentRequest, Workbook,
};

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server returned {status}: {message}")]
    Server { status: u16, message: String },
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Agent(#[from] AgentOutputError),
    #[error("outcome prompt must not be empty")]
    EmptyPrompt,
    #[error("failed to read upload: {0}")]
    Io(#[from] std::io::Error),
}

/// Parsed reply to a classification request.
#[derive(Debug, Clone)]
pub struct AgentResponse {
    /// Response body exactly as received.
    pub raw: String,
    pub results: Vec<AgentPatientResult>,
}

/// HTTP client for the agent service.
pub struct ServiceClient {
    client: reqwest::Client,
    base_url: String,
}

impl ServiceClient {
    /// Create a new client for the given service base URL.
    ///
    /// `base_url` should be like `http://localhost:8000` (a trailing slash is
    /// trimmed).
    pub fn new(base_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Check `GET /health`. Returns whether the service reported `ok`.
    pub async fn health(&self) -> Result<bool, ClientError> {
        let url = format!("{}/health", self.base_url);
        debug!(url = %url, "checking service health");
        let resp = self.client.get(&url).send().await?;
        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            return Err(ClientError::Server {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }
        let health: HealthResponse = serde_json::from_str(&body)?;
        Ok(health.status == "ok")
    }

    /// Fetch the curated demo workbook from `GET /api/sample-data`.
    pub async fn sample_data(&self) -> Result<Workbook, ClientError> {
        let url = format!("{}/api/sample-data", self.base_url);

        info!(url = %url, "fetching sample workbook");
        let resp = self.client.get(&url).send().await?;
        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            return Err(ClientError::Server {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }
        parse_workbook_body(&body)
    }

    /// Upload a CSV or XLSX workbook to `POST /api/patient-data` and return
    /// the records the service extracted from it.
    pub async fn upload_workbook(&self, path: &Path) -> Result<Workbook, ClientError> {
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("workbook.csv")
            .to_string();
        let url = format!("{}/api/patient-data", self.base_url);

        info!(url = %url, file = %file_name, bytes = bytes.len(), "uploading workbook");
        let form = Form::new().part("file", Part::bytes(bytes).file_name(file_name));
        let resp = self.client.post(&url).multipart(form).send().await?;
        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            return Err(ClientError::Server {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }
        parse_workbook_body(&body)
    }

    /// Run the classification agent on one request.
    pub async fn run_agent(&self, request: &RunAgentRequest) -> Result<AgentResponse, ClientError> {
        let url = format!("{}/api/run-agent", self.base_url);

        info!(url = %url, patients = request.patients.len(), "requesting classification");
        let resp = self.client.post(&url).json(request).send().await?;
        let status = resp.status();
        let raw = resp.text().await?;
        if !status.is_success() {
            return Err(ClientError::Server {
                status: status.as_u16(),
                message: error_message(&raw),
            });
        }

        let results = parse_run_agent_body(&raw)?;
        info!(count = results.len(), "classification received");
        Ok(AgentResponse { raw, results })
    }

    /// Send a rendered outcome prompt to the dispatch endpoint.
    ///
    /// Whitespace-only prompts are rejected without contacting the service.
    pub async fn send_outcome_prompt(
        &self,
        request: &OutcomePromptRequest,
    ) -> Result<OutcomePromptAck, ClientError> {
        if request.prompt.trim().is_empty() {
            return Err(ClientError::EmptyPrompt);
        }
        let url = format!("{}/api/outcome-prompt", self.base_url);

        info!(url = %url, patient_id = %request.patient_id, scenario = %request.scenario, "sending outcome prompt");
        let resp = self.client.post(&url).json(request).send().await?;
        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            return Err(ClientError::Server {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }

        let ack: OutcomePromptAck = serde_json::from_str(&body)?;
        info!(status = %ack.status, "outcome prompt acknowledged");
        Ok(ack)
    }
}

/// Extract agent results from a successful `run-agent` body.
///
/// The service wraps the agent output as `{"output": ...}`; a body without
/// that key is treated as the output itself.
pub fn parse_run_agent_body(body: &str) -> Result<Vec<AgentPatientResult>, ClientError> {
    let value: Value = serde_json::from_str(body)?;
    let output = match &value {
        Value::Object(obj) if obj.contains_key("output") => &obj["output"],
        _ => &value,
    };
    Ok(parse_agent_output(output)?)
}

/// Read a `{patients, groundTruth}` body.
pub fn parse_workbook_body(body: &str) -> Result<Workbook, ClientError> {
    let workbook: Workbook = serde_json::from_str(body)?;
    info!(
        patients = workbook.patients.len(),
        ground_truth = workbook.ground_truth.len(),
        "workbook received"
    );
    Ok(workbook)
}

/// Best-effort human message from an error body.
fn error_message(body: &str) -> String {
    if let Ok(Value::Object(obj)) = serde_json::from_str::<Value>(body) {
        for key in ["detail", "error", "message"] {
            match obj.get(key) {
                Some(Value::String(s)) => return s.clone(),
                Some(v) if !v.is_null() => return v.to_string(),
                _ => {}
            }
        }
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        "empty response body".to_string()
    } else {
        trimmed.chars().take(200).collect()
    }
}
