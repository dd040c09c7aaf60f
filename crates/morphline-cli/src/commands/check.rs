//! Check a morphline document

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use morphline_core::{Compiler, MorphlineContext};

use crate::commands::{display_name, load_overrides};
use crate::stdout_loader::StdoutLoader;

/// Run the check command
pub fn run(file: &Path, id: Option<&str>, overrides: &[PathBuf]) -> Result<()> {
    tracing::info!("Checking morphline document: {}", file.display());

    let overrides = load_overrides(overrides)?;
    let mut compiler = Compiler::new();
    let document = compiler
        .parse_file(file, &overrides)
        .context("Failed to load morphline document")?;

    let config = compiler
        .find(id, &document, &display_name(file))
        .context("Failed to select morphline")?;

    let context = MorphlineContext::builder()
        .loader_factory(StdoutLoader::factory)
        .build();
    compiler
        .compile(&config, &context)
        .context("Failed to compile morphline")?;

    tracing::info!("✓ Commands: {}", config.commands().len());
    println!(
        "✓ Morphline '{}' is valid",
        config.id().unwrap_or("<unnamed>")
    );
    Ok(())
}
