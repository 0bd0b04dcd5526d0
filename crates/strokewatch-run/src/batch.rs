//! Batch selection: which patients a run dispatches and under which keys.

use std::collections::HashSet;

use strokewatch_core::{GroundTruthRow, PatientRecord};
use tracing::warn;

use crate::orchestrator::RunError;

/// Most patients dispatched in a single run.
pub const MAX_BATCH: usize = 5;

/// A patient selected for a run, with its resolved identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchPatient {
    pub patient_id: String,
    pub record: PatientRecord,
}

/// The patients of one run, in submission order.
#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    /// Index of the first selected record in the source list.
    pub offset: usize,
    pub patients: Vec<BatchPatient>,
}

impl Batch {
    pub fn len(&self) -> usize {
        self.patients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patients.is_empty()
    }

    pub fn patient_ids(&self) -> impl Iterator<Item = &str> {
        self.patients.iter().map(|p| p.patient_id.as_str())
    }
}

/// Select up to [`MAX_BATCH`] records starting at `start`.
///
/// `count` beyond the cap is truncated, not rejected. Records without an
/// identifier are labelled `row-<start + index>`, a label no real identifier
/// in the batch uses. Identifiers must be distinct within a run, so a record
/// repeating an earlier record's own identifier is skipped.
pub fn select_batch(
    records: &[PatientRecord],
    start: usize,
    count: usize,
) -> Result<Batch, RunError> {
    let end = start
        .saturating_add(count.min(MAX_BATCH))
        .min(records.len());
    if start >= end {
        return Err(RunError::EmptyBatch {
            start,
            available: records.len(),
        });
    }

    let selected = &records[start..end];
    let real_ids: HashSet<String> = selected
        .iter()
        .filter_map(PatientRecord::identifier)
        .collect();

    let mut seen = HashSet::new();
    let mut patients = Vec::with_capacity(selected.len());
    for (index, record) in selected.iter().enumerate() {
        let patient_id = record
            .identifier()
            .unwrap_or_else(|| positional_label(start + index, &real_ids));
        if !seen.insert(patient_id.clone()) {
            warn!(patient_id = %patient_id, "duplicate patient identifier in batch, skipping");
            continue;
        }
        patients.push(BatchPatient {
            patient_id,
            record: record.clone(),
        });
    }

    Ok(Batch {
        offset: start,
        patients,
    })
}

fn positional_label(position: usize, taken: &HashSet<String>) -> String {
    let label = format!("row-{position}");
    if !taken.contains(&label) {
        return label;
    }
    (2..)
        .map(|n| format!("row-{position}-{n}"))
        .find(|candidate| !taken.contains(candidate))
        .unwrap_or(label)
}

/// Ground-truth rows whose identifier is one of `patient_ids`.
pub fn filter_ground_truth<'a>(
    rows: &[GroundTruthRow],
    patient_ids: impl IntoIterator<Item = &'a str>,
) -> Vec<GroundTruthRow> {
    let wanted: HashSet<&str> = patient_ids.into_iter().collect();
    rows.iter()
        .filter(|row| {
            row.identifier()
                .is_some_and(|id| wanted.contains(id.as_str()))
        })
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use strokewatch_core::FieldValue;

    fn records(n: usize) -> Vec<PatientRecord> {
        (1..=n)
            .map(|i| PatientRecord::from_pairs([("Patient#", FieldValue::Text(i.to_string()))]))
            .collect()
    }

    #[test]
    fn truncates_to_cap() {
        let batch = select_batch(&records(8), 0, 8).unwrap();
        assert_eq!(batch.len(), MAX_BATCH);
        let ids: Vec<_> = batch.patient_ids().collect();
        assert_eq!(ids, vec!["1", "2", "3", "4", "5"]);
    }

    #[test]
    fn respects_start_offset() {
        let batch = select_batch(&records(8), 5, 5).unwrap();
        assert_eq!(batch.offset, 5);
        let ids: Vec<_> = batch.patient_ids().collect();
        assert_eq!(ids, vec!["6", "7", "8"]);
    }

    #[test]
    fn empty_range_is_an_error() {
        assert!(matches!(
            select_batch(&records(3), 3, 5),
            Err(RunError::EmptyBatch { start: 3, available: 3 })
        ));
        assert!(select_batch(&records(3), 0, 0).is_err());
    }

    #[test]
    fn missing_identifier_uses_offset_label() {
        let recs = vec![
            PatientRecord::from_pairs([("Patient#", "10")]),
            PatientRecord::from_pairs([("Patient#", "11")]),
            PatientRecord::from_pairs([("Age", 70.0)]),
            PatientRecord::from_pairs([("Patient#", "13")]),
        ];
        let batch = select_batch(&recs, 1, 5).unwrap();
        let ids: Vec<_> = batch.patient_ids().collect();
        assert_eq!(ids, vec!["11", "row-2", "13"]);
    }

    #[test]
    fn positional_label_never_displaces_real_patient() {
        let recs = vec![
            PatientRecord::from_pairs([("Patient#", "1")]),
            PatientRecord::from_pairs([("Age", 70.0)]),
            PatientRecord::from_pairs([("Patient#", "row-2")]),
            PatientRecord::from_pairs([("Age", 58.0)]),
        ];
        let batch = select_batch(&recs, 0, 5).unwrap();
        let ids: Vec<_> = batch.patient_ids().collect();
        assert_eq!(ids, vec!["1", "row-1", "row-2", "row-3"]);
    }

    #[test]
    fn positional_label_steps_around_taken_identifier() {
        let recs = vec![
            PatientRecord::from_pairs([("Age", 70.0)]),
            PatientRecord::from_pairs([("Patient#", "row-0")]),
        ];
        let batch = select_batch(&recs, 0, 5).unwrap();
        let ids: Vec<_> = batch.patient_ids().collect();
        assert_eq!(ids, vec!["row-0-2", "row-0"]);
        assert_eq!(batch.len(), 2);
    }

    #[test]
    fn duplicate_identifier_skipped() {
        let mut recs = records(3);
        recs[2] = PatientRecord::from_pairs([("Patient#", "1")]);
        let batch = select_batch(&recs, 0, 5).unwrap();
        let ids: Vec<_> = batch.patient_ids().collect();
        assert_eq!(ids, vec!["1", "2"]);
    }

    #[test]
    fn filters_ground_truth_to_batch() {
        let rows: Vec<GroundTruthRow> = ["1", "2", "7"]
            .iter()
            .map(|id| GroundTruthRow::from_pairs([("Patient#", *id), ("True Stroke?", "Yes")]))
            .collect();
        let kept = filter_ground_truth(&rows, ["2", "7", "9"]);
        let ids: Vec<_> = kept.iter().filter_map(|r| r.identifier()).collect();
        assert_eq!(ids, vec!["2", "7"]);
    }
}
