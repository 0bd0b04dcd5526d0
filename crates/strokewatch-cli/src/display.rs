//! Terminal rendering for runs and reconciliation passes.
//!
//! Formatting lives in `format_*` functions returning strings; the `print_*`
//! wrappers only write them out.

use std::fmt::Write as _;

use strokewatch_core::{OutcomeCounters, OutcomeEnvironment};
use strokewatch_reconcile::{PatientOutcomeEntry, Reconciliation, TruthSummary};
use strokewatch_run::{ProgressEntry, RunEvent, RunReport};

const MAX_DIAGNOSIS_CHARS: usize = 36;
const MAX_BODY_CHARS: usize = 160;

// ── Run progress ──

/// One stderr line per run event.
pub fn format_event(event: &RunEvent) -> String {
    match event {
        RunEvent::Started { patient_ids } => {
            format!(
                "  Classifying {} patient(s): {}",
                patient_ids.len(),
                patient_ids.join(", ")
            )
        }
        RunEvent::Settled { patient_id, entry } => match entry {
            ProgressEntry::Error(message) => format!("  [error]   {patient_id}: {message}"),
            other => format!("  [{}] {patient_id}", other.as_str()),
        },
        RunEvent::Finished { succeeded, failed } => {
            format!("  Run finished: {succeeded} succeeded, {failed} failed")
        }
    }
}

pub fn format_run_summary(report: &RunReport) -> String {
    let mut out = String::new();
    let counts = report.progress.counts();
    let _ = writeln!(out, "=== Run (offset {}) ===", report.offset);
    for (patient_id, entry) in report.progress.iter() {
        match entry {
            ProgressEntry::Error(message) => {
                let _ = writeln!(out, "  {:<12} error: {}", patient_id, message);
            }
            other => {
                let _ = writeln!(out, "  {:<12} {}", patient_id, other.as_str());
            }
        }
    }
    let _ = writeln!(
        out,
        "  {} succeeded, {} failed, {} pending",
        counts.success, counts.error, counts.pending
    );
    if let Some(err) = &report.last_error {
        let _ = writeln!(out, "  Last error: {err}");
    }
    out
}

pub fn format_response_log(report: &RunReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "=== Raw responses ({}) ===", report.log.len());
    for raw in &report.log {
        let _ = writeln!(
            out,
            "  {} {:<12} {:?}",
            raw.received_at.format("%H:%M:%S%.3f"),
            raw.patient_id,
            raw.outcome
        );
        let _ = writeln!(out, "    {}", truncate(raw.body.trim(), MAX_BODY_CHARS));
    }
    out
}

// ── Reconciliation ──

pub fn format_truth_summary(summary: &TruthSummary) -> String {
    format!(
        "  Ground truth: {} patient(s), {} with a truth flag, {} stroke(s), {} with risk",
        summary.patients, summary.with_truth, summary.strokes, summary.with_risk
    )
}

/// Outcome entries as a fixed-width table, in reconciliation order.
pub fn format_outcome_table(entries: &[PatientOutcomeEntry]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "  {:<12} {:<16} {:<9} {:<6} {:>6}  {}",
        "Patient", "Scenario", "Predicted", "Truth", "Prob", "Diagnosis"
    );
    for entry in entries {
        let _ = writeln!(
            out,
            "  {:<12} {:<16} {:<9} {:<6} {:>6}  {}",
            entry.patient_id,
            entry.scenario.as_str(),
            yes_no(entry.predicted_stroke),
            yes_no(entry.truth_stroke),
            format_probability(entry.stroke_probability),
            truncate(entry.diagnosis.as_deref().unwrap_or("-"), MAX_DIAGNOSIS_CHARS),
        );
    }
    out
}

pub fn format_counters_card(counters: &OutcomeCounters, environment: OutcomeEnvironment) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "=== Outcome counters ({}) ===", environment.label());
    let _ = writeln!(out, "  {:<26} {}", "Strokes detected (X)", counters.detected);
    let _ = writeln!(out, "  {:<26} {}", "Strokes missed (Y)", counters.missed);
    let _ = writeln!(out, "  {:<26} {}", "Correct diagnoses (Z)", counters.correct);
    let _ = writeln!(out, "  {:<26} {}", "Incorrect diagnoses (W)", counters.incorrect);
    let _ = writeln!(out, "  {:<26} {}", "Patients scored", counters.scored());
    out
}

pub fn print_reconciliation(
    reconciliation: &Reconciliation,
    truth: &TruthSummary,
    environment: OutcomeEnvironment,
    show_prompts: bool,
) {
    println!("=== Outcomes ({} patient(s)) ===", reconciliation.entries.len());
    println!("{}", format_truth_summary(truth));
    println!();
    print!("{}", format_outcome_table(&reconciliation.entries));
    println!();
    print!("{}", format_counters_card(&reconciliation.summary, environment));

    if show_prompts {
        for entry in &reconciliation.entries {
            println!();
            println!("--- Prompt for patient {} ({}) ---", entry.patient_id, entry.scenario);
            println!("{}", entry.prompt);
        }
    }
}

// ── Helpers ──

fn yes_no(flag: bool) -> &'static str {
    if flag { "yes" } else { "no" }
}

fn format_probability(p: Option<f64>) -> String {
    match p {
        Some(p) => format!("{:.0}%", p * 100.0),
        None => "-".to_string(),
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let mut cut: String = s.chars().take(max.saturating_sub(3)).collect();
        cut.push_str("...");
        cut
    }
}
