//! Run a morphline over local files

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use morphline_core::fields;
use morphline_core::{Compiler, FaultTolerance, Morphline, MorphlineContext, Record};
use walkdir::WalkDir;

use crate::commands::{display_name, load_overrides};
use crate::stdout_loader::StdoutLoader;

/// Options of the run command
#[derive(Debug, Default)]
pub struct RunOptions {
    /// Morphline to select
    pub id: Option<String>,
    /// Override documents
    pub overrides: Vec<PathBuf>,
    /// MIME type attached to every input
    pub mime_type: Option<String>,
    /// Charset attached to every input
    pub charset: Option<String>,
    /// Swallow non-recoverable failures
    pub production: bool,
    /// Swallow recoverable failures too
    pub ignore_recoverable: bool,
}

/// Run the run command
pub fn run(file: &Path, inputs: &[PathBuf], options: &RunOptions) -> Result<()> {
    tracing::info!("Loading morphline document: {}", file.display());

    let overrides = load_overrides(&options.overrides)?;
    let mut compiler = Compiler::new();
    let document = compiler
        .parse_file(file, &overrides)
        .context("Failed to load morphline document")?;
    let config = compiler
        .find(options.id.as_deref(), &document, &display_name(file))
        .context("Failed to select morphline")?;

    let context = MorphlineContext::builder()
        .exception_handler(FaultTolerance::new(
            options.production,
            options.ignore_recoverable,
        ))
        .loader_factory(StdoutLoader::factory)
        .build();
    let mut morphline = compiler
        .compile(&config, &context)
        .context("Failed to compile morphline")?;

    let files = collect_inputs(inputs)?;
    tracing::info!("Processing {} input file(s)", files.len());

    morphline.start_session()?;
    let mut accepted = 0usize;
    let mut rejected = 0usize;
    for path in &files {
        if process_file(&mut morphline, path, options)? {
            accepted += 1;
        } else {
            rejected += 1;
        }
    }
    morphline.shutdown()?;

    tracing::info!(accepted, rejected, "✓ Run complete");
    Ok(())
}

fn process_file(morphline: &mut Morphline, path: &Path, options: &RunOptions) -> Result<bool> {
    let body = std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;

    let mut record = Record::new();
    record.put(fields::ATTACHMENT_BODY, body);
    record.put(fields::ATTACHMENT_NAME, display_name(path));
    if let Some(mime_type) = &options.mime_type {
        record.put(fields::ATTACHMENT_MIME_TYPE, mime_type.as_str());
    }
    if let Some(charset) = &options.charset {
        record.put(fields::ATTACHMENT_CHARSET, charset.as_str());
    }

    morphline.begin_transaction()?;
    match morphline.process(&mut record) {
        Ok(accepted) => {
            morphline.commit_transaction()?;
            if !accepted {
                tracing::debug!("Record for {} did not make it through", path.display());
            }
            Ok(accepted)
        }
        Err(e) => {
            if let Err(rollback) = morphline.rollback_transaction() {
                tracing::error!(error = %rollback, "Rollback failed for {}", path.display());
            }
            Err(e).with_context(|| format!("Failed to process {}", path.display()))
        }
    }
}

/// Expand directories into the files below them, in file name order.
fn collect_inputs(inputs: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for input in inputs {
        if input.is_dir() {
            for entry in WalkDir::new(input).sort_by_file_name() {
                let entry = entry?;
                if entry.file_type().is_file() {
                    files.push(entry.into_path());
                }
            }
        } else if input.is_file() {
            files.push(input.clone());
        } else {
            anyhow::bail!("Input not found: {}", input.display());
        }
    }
    Ok(files)
}
