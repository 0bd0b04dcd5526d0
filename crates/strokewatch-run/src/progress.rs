//! Per-patient progress within a run.

use serde::Serialize;

/// State of one patient's classification task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "message", rename_all = "lowercase")]
pub enum ProgressEntry {
    Pending,
    Success,
    Error(String),
}

impl ProgressEntry {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Success => "success",
            Self::Error(_) => "error",
        }
    }
}

/// Tally of progress states.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ProgressCounts {
    pub pending: usize,
    pub success: usize,
    pub error: usize,
}

/// One entry per patient of a run, in submission order.
///
/// Entries start `Pending` and move exactly once to a terminal state; a
/// settled entry never changes again.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProgressMap {
    entries: Vec<(String, ProgressEntry)>,
}

impl ProgressMap {
    /// A map with every identifier `Pending`.
    pub fn pending<I, S>(patient_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            entries: patient_ids
                .into_iter()
                .map(|id| (id.into(), ProgressEntry::Pending))
                .collect(),
        }
    }

    pub fn get(&self, patient_id: &str) -> Option<&ProgressEntry> {
        self.entries
            .iter()
            .find(|(id, _)| id == patient_id)
            .map(|(_, entry)| entry)
    }

    /// Move a pending entry to `entry`.
    ///
    /// Returns `false` (and changes nothing) for unknown identifiers, entries
    /// already settled, or a `Pending` target.
    pub fn settle(&mut self, patient_id: &str, entry: ProgressEntry) -> bool {
        if !entry.is_terminal() {
            return false;
        }
        match self.entries.iter_mut().find(|(id, _)| id == patient_id) {
            Some((_, current)) if !current.is_terminal() => {
                *current = entry;
                true
            }
            _ => false,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ProgressEntry)> {
        self.entries.iter().map(|(id, entry)| (id.as_str(), entry))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn counts(&self) -> ProgressCounts {
        let mut counts = ProgressCounts::default();
        for (_, entry) in &self.entries {
            match entry {
                ProgressEntry::Pending => counts.pending += 1,
                ProgressEntry::Success => counts.success += 1,
                ProgressEntry::Error(_) => counts.error += 1,
            }
        }
        counts
    }

    /// Whether every entry has settled.
    pub fn is_complete(&self) -> bool {
        self.entries.iter().all(|(_, entry)| entry.is_terminal())
    }
}
