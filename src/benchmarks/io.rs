//! I/O Utilities for Benchmark Reports
//!
//! Reads and writes [`BenchmarkResult`] records as pretty-printed JSON.

use super::BenchmarkResult;
use crate::{Error, Result};

use std::fs;
use std::path::Path;

/// Write a report record, creating parent directories as needed.
pub fn write_report(result: &BenchmarkResult, path: &Path) -> Result<()> {
    let origin = path.display().to_string();

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| Error::write(&origin, e))?;
    }

    let json = serde_json::to_string_pretty(result)?;
    fs::write(path, json).map_err(|e| Error::write(&origin, e))?;

    tracing::info!(run_id = %result.run_id, "Wrote report to {}", origin);
    Ok(())
}

/// Read a report record. Returns `None` if the file does not exist.
pub fn read_report(path: &Path) -> Result<Option<BenchmarkResult>> {
    if !path.exists() {
        return Ok(None);
    }

    let origin = path.display().to_string();
    let json = fs::read_to_string(path).map_err(|e| Error::read(&origin, e))?;
    let result = serde_json::from_str(&json).map_err(|e| Error::malformed_data(origin, e))?;

    Ok(Some(result))
}
