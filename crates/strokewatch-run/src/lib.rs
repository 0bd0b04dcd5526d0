//! Run orchestrator: fans a bounded batch of patients out to the remote
//! classifier, one independent request per patient, and gathers the results.

mod batch;
mod merge;
mod orchestrator;
mod progress;

pub use batch::{Batch, BatchPatient, MAX_BATCH, filter_ground_truth, select_batch};
pub use merge::MergedResults;
pub use orchestrator::{
    Classifier, Orchestrator, RawResponse, ResponseOutcome, RunError, RunEvent, RunReport,
};
pub use progress::{ProgressCounts, ProgressEntry, ProgressMap};
