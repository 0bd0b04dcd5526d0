//! Patient records and ground-truth rows as produced by workbook ingestion.
//!
//! Both are loose field maps: ingestion keeps whatever columns the workbook
//! carried, so the only structure we rely on is the identifier (resolved by
//! [`IDENTIFIER_FIELDS`] priority) and, for ground truth, the truth and risk
//! columns.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Candidate identifier fields, tried in order.
pub const IDENTIFIER_FIELDS: &[&str] = &["patient_id", "Patient#", "PatientID", "patientId", "id"];

/// Ground-truth columns carrying the stroke outcome.
pub const TRUTH_FIELDS: &[&str] = &["True Stroke?", "truth", "true_stroke"];

/// Ground-truth columns carrying the clinician's risk estimate.
pub const RISK_FIELDS: &[&str] = &["Stroke Risk", "Percent Chance"];

/// A single scalar cell from a workbook row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
}

impl FieldValue {
    /// Render the value as an identifier, if it can act as one.
    ///
    /// Empty strings and nulls are not identifiers. Integral numbers render
    /// without a fractional part so `12` and `12.0` both become `"12"`.
    pub fn as_identifier(&self) -> Option<String> {
        match self {
            Self::Null => None,
            Self::Bool(b) => Some(b.to_string()),
            Self::Number(n) if !n.is_finite() => None,
            Self::Number(n) => Some(format_number(*n)),
            Self::Text(s) => {
                let s = s.trim();
                if s.is_empty() {
                    None
                } else {
                    Some(s.to_string())
                }
            }
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Number(n) => f.write_str(&format_number(*n)),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<f64> for FieldValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

fn first_identifier(fields: &BTreeMap<String, FieldValue>) -> Option<String> {
    IDENTIFIER_FIELDS
        .iter()
        .find_map(|name| fields.get(*name).and_then(FieldValue::as_identifier))
}

fn first_present<'a>(
    fields: &'a BTreeMap<String, FieldValue>,
    names: &[&str],
) -> Option<&'a FieldValue> {
    names
        .iter()
        .filter_map(|name| fields.get(*name))
        .find(|v| !v.is_null())
}

/// One row of clinical data. Immutable once ingested.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PatientRecord {
    fields: BTreeMap<String, FieldValue>,
}

impl PatientRecord {
    /// Build a record from `(name, value)` pairs.
    pub fn from_pairs<K, V, I>(pairs: I) -> Self
    where
        K: Into<String>,
        V: Into<FieldValue>,
        I: IntoIterator<Item = (K, V)>,
    {
        Self {
            fields: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// The record's identifier per [`IDENTIFIER_FIELDS`] priority, if any.
    pub fn identifier(&self) -> Option<String> {
        first_identifier(&self.fields)
    }
}

/// Reference outcome for one patient. Read-only for a reconciliation pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroundTruthRow {
    fields: BTreeMap<String, FieldValue>,
}

impl GroundTruthRow {
    pub fn from_pairs<K, V, I>(pairs: I) -> Self
    where
        K: Into<String>,
        V: Into<FieldValue>,
        I: IntoIterator<Item = (K, V)>,
    {
        Self {
            fields: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn identifier(&self) -> Option<String> {
        first_identifier(&self.fields)
    }

    /// Raw truth cell, in whatever representation the workbook used.
    pub fn truth_value(&self) -> Option<&FieldValue> {
        first_present(&self.fields, TRUTH_FIELDS)
    }

    /// Optional risk annotation (free text such as `"12%"`).
    pub fn risk(&self) -> Option<&FieldValue> {
        first_present(&self.fields, RISK_FIELDS)
    }
}
