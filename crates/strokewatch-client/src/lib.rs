//! Client side of the remote services: workbook loading, the per-patient
//! classification agent and the outcome-prompt dispatch endpoint.

pub mod http;
pub mod wire;

pub use http::{AgentResponse, ClientError, ServiceClient};
pub use wire::{OutcomePromptAck, OutcomePromptRequest, RunAgentRequest, Workbook};
