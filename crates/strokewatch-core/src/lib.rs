pub mod agent;
pub mod counters;
pub mod outcome;
pub mod record;

pub use agent::{AgentOutputError, AgentPatientResult, parse_agent_output};
pub use counters::{CounterDelta, OutcomeCounters};
pub use outcome::{OutcomeEnvironment, OutcomeScenario, parse_truth_flag, predicted_stroke};
pub use record::{FieldValue, GroundTruthRow, IDENTIFIER_FIELDS, PatientRecord};
