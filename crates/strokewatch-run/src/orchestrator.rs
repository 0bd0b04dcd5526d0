//! Concurrent per-patient classification.
//!
//! One request per patient is issued and all of them are driven together
//! from a single task. Each settles independently; the run finishes only
//! when every request has settled.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::StreamExt;
use futures::stream::FuturesUnordered;
use serde::Serialize;
use strokewatch_client::{AgentResponse, ClientError, RunAgentRequest, ServiceClient};
use strokewatch_core::GroundTruthRow;
use thiserror::Error;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, warn};

use crate::batch::{Batch, filter_ground_truth};
use crate::merge::MergedResults;
use crate::progress::{ProgressEntry, ProgressMap};

#[derive(Error, Debug)]
pub enum RunError {
    #[error("no patients in range starting at {start} ({available} available)")]
    EmptyBatch { start: usize, available: usize },
}

/// Anything that can classify a single-patient request.
#[async_trait]
pub trait Classifier: Send + Sync {
    async fn classify(&self, request: &RunAgentRequest) -> Result<AgentResponse, ClientError>;
}

#[async_trait]
impl Classifier for ServiceClient {
    async fn classify(&self, request: &RunAgentRequest) -> Result<AgentResponse, ClientError> {
        self.run_agent(request).await
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseOutcome {
    Success,
    Failure,
}

/// One entry of the raw response log.
#[derive(Debug, Clone, Serialize)]
pub struct RawResponse {
    pub patient_id: String,
    pub received_at: DateTime<Utc>,
    pub outcome: ResponseOutcome,
    /// Response body on success, error message on failure.
    pub body: String,
}

/// Progress notifications published while a run is in flight.
#[derive(Debug, Clone, PartialEq)]
pub enum RunEvent {
    Started { patient_ids: Vec<String> },
    Settled { patient_id: String, entry: ProgressEntry },
    Finished { succeeded: usize, failed: usize },
}

/// Everything a finished run leaves behind besides the merged results.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub offset: usize,
    pub progress: ProgressMap,
    /// Raw responses in the order they arrived.
    pub log: Vec<RawResponse>,
    /// Message of the most recent failure, if any task failed.
    pub last_error: Option<String>,
}

impl RunReport {
    pub fn succeeded(&self) -> usize {
        self.progress.counts().success
    }

    pub fn failed(&self) -> usize {
        self.progress.counts().error
    }

    pub fn has_errors(&self) -> bool {
        self.last_error.is_some()
    }
}

pub struct Orchestrator<C> {
    classifier: C,
    events: Option<UnboundedSender<RunEvent>>,
}

impl<C: Classifier> Orchestrator<C> {
    pub fn new(classifier: C) -> Self {
        Self {
            classifier,
            events: None,
        }
    }

    /// Publish [`RunEvent`]s on `tx` during each run.
    pub fn with_events(mut self, tx: UnboundedSender<RunEvent>) -> Self {
        self.events = Some(tx);
        self
    }

    pub fn classifier(&self) -> &C {
        &self.classifier
    }

    /// Classify every patient of `batch` and merge the results into `results`.
    ///
    /// Results are merged in completion order. A failed request marks only
    /// its own patient as `error`; the others run to completion regardless.
    pub async fn run(
        &self,
        batch: &Batch,
        ground_truth: &[GroundTruthRow],
        instructions: &str,
        results: &mut MergedResults,
    ) -> RunReport {
        let mut progress = ProgressMap::pending(batch.patient_ids());
        let mut log = Vec::with_capacity(batch.len());
        let mut last_error = None;

        info!(
            patients = batch.len(),
            offset = batch.offset,
            "starting classification run"
        );
        self.emit(RunEvent::Started {
            patient_ids: batch.patient_ids().map(str::to_string).collect(),
        });

        let batch_truth = filter_ground_truth(ground_truth, batch.patient_ids());
        let mut in_flight = FuturesUnordered::new();
        for patient in &batch.patients {
            let truth = filter_ground_truth(&batch_truth, [patient.patient_id.as_str()]);
            let request = RunAgentRequest::single(patient.record.clone(), truth, instructions);
            let classifier = &self.classifier;
            let patient_id = patient.patient_id.clone();
            in_flight.push(async move {
                let response = classifier.classify(&request).await;
                (patient_id, response)
            });
        }

        while let Some((patient_id, response)) = in_flight.next().await {
            let entry = match response {
                Ok(AgentResponse { raw, results: found }) => {
                    info!(patient_id = %patient_id, results = found.len(), "classification settled");
                    for result in found {
                        let key = results.merge(result);
                        debug!(patient_id = %patient_id, key = %key, "merged result");
                    }
                    log.push(RawResponse {
                        patient_id: patient_id.clone(),
                        received_at: Utc::now(),
                        outcome: ResponseOutcome::Success,
                        body: raw,
                    });
                    ProgressEntry::Success
                }
                Err(e) => {
                    let message = e.to_string();
                    warn!(patient_id = %patient_id, error = %message, "classification failed");
                    log.push(RawResponse {
                        patient_id: patient_id.clone(),
                        received_at: Utc::now(),
                        outcome: ResponseOutcome::Failure,
                        body: message.clone(),
                    });
                    last_error = Some(format!("patient {patient_id}: {message}"));
                    ProgressEntry::Error(message)
                }
            };

            progress.settle(&patient_id, entry.clone());
            self.emit(RunEvent::Settled { patient_id, entry });
        }

        let counts = progress.counts();
        info!(
            succeeded = counts.success,
            failed = counts.error,
            merged = results.len(),
            "classification run finished"
        );
        self.emit(RunEvent::Finished {
            succeeded: counts.success,
            failed: counts.error,
        });

        RunReport {
            offset: batch.offset,
            progress,
            log,
            last_error,
        }
    }

    fn emit(&self, event: RunEvent) {
        if let Some(tx) = &self.events
            && let Err(e) = tx.send(event)
        {
            debug!("run event dropped: {e}");
        }
    }
}
