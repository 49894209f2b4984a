//! Working set persistence between CLI invocations.

use anyhow::{Context, Result};
use parlay_core::WorkingSet;
use std::path::Path;

/// Reads the saved working set. A missing file is an empty set.
///
/// # Errors
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_working_set(path: &Path) -> Result<WorkingSet> {
    if !path.exists() {
        tracing::debug!("no saved working set at {}", path.display());
        return Ok(WorkingSet::default());
    }

    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read working set from {}", path.display()))?;
    let working_set = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse working set in {}", path.display()))?;
    Ok(working_set)
}

/// Writes the working set, creating parent directories as needed.
///
/// # Errors
/// Returns an error if the file cannot be written.
pub fn save_working_set(path: &Path, working_set: &WorkingSet) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
    }

    let json = serde_json::to_string_pretty(working_set)?;
    std::fs::write(path, json)
        .with_context(|| format!("failed to write working set to {}", path.display()))?;
    tracing::debug!(events = working_set.len(), "saved working set to {}", path.display());
    Ok(())
}
