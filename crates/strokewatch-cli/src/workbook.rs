//! Local input files: workbook JSON and saved agent results.

use std::path::Path;

use anyhow::Context;
use serde_json::Value;
use strokewatch_client::Workbook;
use strokewatch_core::{AgentPatientResult, parse_agent_output};

/// Load a workbook saved as `{patients, groundTruth}` JSON.
pub fn load_workbook(path: &Path) -> anyhow::Result<Workbook> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading workbook {}", path.display()))?;
    let workbook: Workbook = serde_json::from_str(&text)
        .with_context(|| format!("parsing workbook {}", path.display()))?;
    Ok(workbook)
}

/// Load agent results saved by `run --save`, or any raw agent output.
pub fn load_results(path: &Path) -> anyhow::Result<Vec<AgentPatientResult>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading results {}", path.display()))?;
    parse_results(&text).with_context(|| format!("parsing results {}", path.display()))
}

pub fn parse_results(text: &str) -> anyhow::Result<Vec<AgentPatientResult>> {
    let value: Value = serde_json::from_str(text)?;
    Ok(parse_agent_output(&value)?)
}

/// Write results in merge order so a later `reconcile` sees the same sequence.
pub fn save_results(path: &Path, results: &[AgentPatientResult]) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(results)?;
    std::fs::write(path, json).with_context(|| format!("writing results {}", path.display()))
}
