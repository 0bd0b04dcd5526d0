//! Ground-truth outcomes keyed by patient identifier.
//!
//! Built from the ground-truth rows ingestion extracted alongside the patient
//! records. Rows without a resolvable identifier cannot be matched to a
//! result and are skipped.

use std::collections::HashMap;

use strokewatch_core::{GroundTruthRow, parse_truth_flag};
use tracing::debug;

/// Ground-truth rows indexed by identifier.
#[derive(Debug, Clone, Default)]
pub struct TruthLookup {
    rows: HashMap<String, GroundTruthRow>,
}

/// Summary statistics for a [`TruthLookup`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TruthSummary {
    pub patients: usize,
    pub with_truth: usize,
    pub strokes: usize,
    pub with_risk: usize,
}

impl TruthLookup {
    /// Index rows by identifier. A later row for the same identifier
    /// replaces an earlier one.
    pub fn from_rows<'a>(rows: impl IntoIterator<Item = &'a GroundTruthRow>) -> Self {
        let mut index = HashMap::new();
        for row in rows {
            let Some(id) = row.identifier() else {
                debug!("skipping ground-truth row without identifier");
                continue;
            };
            if index.insert(id.clone(), row.clone()).is_some() {
                debug!(patient_id = %id, "duplicate ground-truth row, keeping the later one");
            }
        }
        Self { rows: index }
    }

    pub fn get(&self, patient_id: &str) -> Option<&GroundTruthRow> {
        self.rows.get(patient_id)
    }

    /// Resolved truth flag. A missing row or unparseable cell is `false`.
    pub fn truth_flag(&self, patient_id: &str) -> bool {
        parse_truth_flag(self.get(patient_id).and_then(GroundTruthRow::truth_value))
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn summary(&self) -> TruthSummary {
        let with_truth = self
            .rows
            .values()
            .filter(|r| r.truth_value().is_some())
            .count();
        let strokes = self
            .rows
            .values()
            .filter(|r| parse_truth_flag(r.truth_value()))
            .count();
        let with_risk = self.rows.values().filter(|r| r.risk().is_some()).count();

        TruthSummary {
            patients: self.rows.len(),
            with_truth,
            strokes,
            with_risk,
        }
    }
}
