//! Outcome scenarios, reconciliation environments and the flag parsers that
//! feed scenario classification.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::record::FieldValue;

/// Strings accepted as an affirmative ground-truth flag (case-insensitive).
pub const AFFIRMATIVE_KEYWORDS: &[&str] = &["yes", "true", "stroke", "positive", "detected"];

/// Probability at or above which an agent result counts as a stroke call.
pub const STROKE_PROBABILITY_THRESHOLD: f64 = 0.5;

/// Cross of predicted stroke × actual stroke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutcomeScenario {
    StrokeDetected,
    StrokeMissed,
    FalsePositive,
    TrueNegative,
}

impl OutcomeScenario {
    pub const ALL: [Self; 4] = [
        Self::StrokeDetected,
        Self::StrokeMissed,
        Self::FalsePositive,
        Self::TrueNegative,
    ];

    /// Classify a `(predicted, truth)` pair. Total over all four inputs.
    pub fn classify(predicted: bool, truth: bool) -> Self {
        match (predicted, truth) {
            (true, true) => Self::StrokeDetected,
            (false, true) => Self::StrokeMissed,
            (true, false) => Self::FalsePositive,
            (false, false) => Self::TrueNegative,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::StrokeDetected => "stroke-detected",
            Self::StrokeMissed => "stroke-missed",
            Self::FalsePositive => "false-positive",
            Self::TrueNegative => "true-negative",
        }
    }

    pub fn predicted(&self) -> bool {
        matches!(self, Self::StrokeDetected | Self::FalsePositive)
    }

    pub fn truth(&self) -> bool {
        matches!(self, Self::StrokeDetected | Self::StrokeMissed)
    }

    /// Whether the diagnosis matched the actual outcome.
    pub fn is_correct(&self) -> bool {
        self.predicted() == self.truth()
    }
}

impl fmt::Display for OutcomeScenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Setting in which outcomes are observed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutcomeEnvironment {
    /// Every patient is imaged, so every outcome is observed.
    #[default]
    ClinicalTrial,
    /// Only admitted patients are imaged.
    RoutineCare,
}

impl OutcomeEnvironment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ClinicalTrial => "clinical-trial",
            Self::RoutineCare => "routine-care",
        }
    }

    /// Human-readable label used in prompt text.
    pub fn label(&self) -> &'static str {
        match self {
            Self::ClinicalTrial => "Clinical trial",
            Self::RoutineCare => "Routine clinical care",
        }
    }
}

impl fmt::Display for OutcomeEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutcomeEnvironment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "clinical-trial" | "trial" => Ok(Self::ClinicalTrial),
            "routine-care" | "routine" => Ok(Self::RoutineCare),
            other => Err(format!("unknown outcome environment: {other}")),
        }
    }
}

/// Permissive truth-flag parser for ground-truth cells.
///
/// Booleans pass through, numbers are truthy when `> 0`, strings match
/// [`AFFIRMATIVE_KEYWORDS`] or parse as a positive number. Anything else,
/// including a missing cell, is `false`.
pub fn parse_truth_flag(value: Option<&FieldValue>) -> bool {
    match value {
        None | Some(FieldValue::Null) => false,
        Some(FieldValue::Bool(b)) => *b,
        Some(FieldValue::Number(n)) => *n > 0.0,
        Some(FieldValue::Text(s)) => {
            let s = s.trim().to_lowercase();
            if AFFIRMATIVE_KEYWORDS.contains(&s.as_str()) {
                return true;
            }
            s.parse::<f64>().map(|n| n > 0.0).unwrap_or(false)
        }
    }
}

/// Whether an agent result amounts to a stroke diagnosis.
///
/// The diagnosis text wins when it mentions stroke either way ("non-stroke"
/// is checked first, since it contains "stroke"). Otherwise the probability
/// decides, and with neither the call is "no stroke".
pub fn predicted_stroke(diagnosis: Option<&str>, probability: Option<f64>) -> bool {
    if let Some(diagnosis) = diagnosis {
        let lower = diagnosis.to_lowercase();
        if lower.contains("non-stroke") {
            return false;
        }
        if lower.contains("stroke") {
            return true;
        }
    }
    probability.is_some_and(|p| p >= STROKE_PROBABILITY_THRESHOLD)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_covers_all_pairs() {
        assert_eq!(OutcomeScenario::classify(true, true), OutcomeScenario::StrokeDetected);
        assert_eq!(OutcomeScenario::classify(false, true), OutcomeScenario::StrokeMissed);
        assert_eq!(OutcomeScenario::classify(true, false), OutcomeScenario::FalsePositive);
        assert_eq!(OutcomeScenario::classify(false, false), OutcomeScenario::TrueNegative);
    }

    #[test]
    fn classify_round_trips_through_flags() {
        for scenario in OutcomeScenario::ALL {
            assert_eq!(
                OutcomeScenario::classify(scenario.predicted(), scenario.truth()),
                scenario
            );
        }
    }

    #[test]
    fn correctness_follows_agreement() {
        assert!(OutcomeScenario::StrokeDetected.is_correct());
        assert!(OutcomeScenario::TrueNegative.is_correct());
        assert!(!OutcomeScenario::StrokeMissed.is_correct());
        assert!(!OutcomeScenario::FalsePositive.is_correct());
    }

    #[test]
    fn truth_flag_affirmatives() {
        for v in [
            FieldValue::from("Yes"),
            FieldValue::from("TRUE"),
            FieldValue::from("stroke"),
            FieldValue::from(" Positive "),
            FieldValue::from("detected"),
            FieldValue::from("1"),
            FieldValue::Number(2.0),
            FieldValue::Bool(true),
        ] {
            assert!(parse_truth_flag(Some(&v)), "{v:?} should be true");
        }
    }

    #[test]
    fn truth_flag_negatives() {
        for v in [
            FieldValue::from(""),
            FieldValue::from("no"),
            FieldValue::from("non-stroke"),
            FieldValue::from("0"),
            FieldValue::from("-3"),
            FieldValue::Number(0.0),
            FieldValue::Bool(false),
            FieldValue::Null,
        ] {
            assert!(!parse_truth_flag(Some(&v)), "{v:?} should be false");
        }
        assert!(!parse_truth_flag(None));
    }

    #[test]
    fn predicted_non_stroke_wins_over_probability() {
        assert!(!predicted_stroke(Some("Non-stroke cause"), Some(0.95)));
    }

    #[test]
    fn predicted_stroke_from_diagnosis() {
        assert!(predicted_stroke(Some("Posterior circulation stroke"), None));
        assert!(predicted_stroke(Some("STROKE"), Some(0.1)));
    }

    #[test]
    fn predicted_from_probability() {
        assert!(predicted_stroke(None, Some(0.73)));
        assert!(predicted_stroke(None, Some(0.5)));
        assert!(!predicted_stroke(None, Some(0.2)));
        // Diagnosis without a stroke keyword defers to probability.
        assert!(predicted_stroke(Some("Vestibular neuritis?"), Some(0.6)));
    }

    #[test]
    fn predicted_defaults_to_false() {
        assert!(!predicted_stroke(None, None));
        assert!(!predicted_stroke(Some("BPPV"), None));
    }

    #[test]
    fn environment_parses_tags() {
        assert_eq!(
            "clinical-trial".parse::<OutcomeEnvironment>(),
            Ok(OutcomeEnvironment::ClinicalTrial)
        );
        assert_eq!(
            "Routine_Care".parse::<OutcomeEnvironment>(),
            Ok(OutcomeEnvironment::RoutineCare)
        );
        assert!("icu".parse::<OutcomeEnvironment>().is_err());
    }

    #[test]
    fn tags_serialize_kebab_case() {
        let json = serde_json::to_string(&OutcomeScenario::FalsePositive).unwrap();
        assert_eq!(json, "\"false-positive\"");
        let json = serde_json::to_string(&OutcomeEnvironment::RoutineCare).unwrap();
        assert_eq!(json, "\"routine-care\"");
    }
}
