use super::table::ResultTable;
use crate::utils::fs::atomic_write;
use anyhow::{Context, Result};
use std::path::Path;

pub fn write_tsv(table: &ResultTable, path: &Path) -> Result<()> {
    atomic_write(path, table.to_tsv().as_bytes())
        .with_context(|| format!("Failed to write results table: {:?}", path))?;
    tracing::info!("Wrote {} rows to {:?}", table.records().len(), path);
    Ok(())
}

pub fn write_json(table: &ResultTable, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(table).context("Failed to serialize results")?;
    atomic_write(path, json.as_bytes())
        .with_context(|| format!("Failed to write JSON results: {:?}", path))?;
    tracing::info!("Wrote JSON results to {:?}", path);
    Ok(())
}
