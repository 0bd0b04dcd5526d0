//! Identity-keyed accumulation of agent results.

use strokewatch_core::AgentPatientResult;

/// Agent results keyed by patient identifier, in first-arrival order.
///
/// A result for an identifier already present replaces the earlier one in
/// place (last write wins). Results without an identifier are kept under a
/// synthetic `unidentified-N` key.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MergedResults {
    entries: Vec<(String, AgentPatientResult)>,
    next_synthetic: usize,
}

impl MergedResults {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge one result. Returns the key it was stored under.
    pub fn merge(&mut self, result: AgentPatientResult) -> String {
        let key = match &result.patient_id {
            Some(id) => id.clone(),
            None => self.synthetic_key(),
        };

        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = result,
            None => self.entries.push((key.clone(), result)),
        }
        key
    }

    pub fn extend(&mut self, results: impl IntoIterator<Item = AgentPatientResult>) {
        for result in results {
            self.merge(result);
        }
    }

    pub fn get(&self, key: &str) -> Option<&AgentPatientResult> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, r)| r)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Results in merge order, ready for a reconciliation pass.
    pub fn ordered(&self) -> Vec<AgentPatientResult> {
        self.entries.iter().map(|(_, r)| r.clone()).collect()
    }

    fn synthetic_key(&mut self) -> String {
        loop {
            self.next_synthetic += 1;
            let key = format!("unidentified-{}", self.next_synthetic);
            if self.get(&key).is_none() {
                return key;
            }
        }
    }
}
