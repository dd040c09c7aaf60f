//! CLI command implementations

pub mod check;
pub mod run;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use morphline_core::Document;

/// Read override documents in the order given.
pub fn load_overrides(paths: &[PathBuf]) -> Result<Vec<Document>> {
    paths
        .iter()
        .map(|path| {
            let source = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read override {}", path.display()))?;
            Document::parse(&source)
                .with_context(|| format!("Failed to parse override {}", path.display()))
        })
        .collect()
}

/// Human-readable document name for diagnostics
pub fn display_name(path: &Path) -> String {
    path.display().to_string()
}
