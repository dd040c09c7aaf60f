//! Morphline compiler
//!
//! Turns a document into a running command tree in three steps:
//!
//! 1. [`Compiler::parse_file`] / [`Compiler::parse_str`]: load, layer
//!    override documents on top and validate
//! 2. [`Compiler::find`]: select one morphline by id
//! 3. [`Compiler::compile`]: build the tree right to left, ending in the
//!    terminal `dropRecord` stage
//!
//! Parsed documents are cached per compiler instance, keyed by a hash of the
//! source text and the overrides.

use std::collections::HashMap;
use std::path::Path;

use sha2::{Digest, Sha256};

use crate::command::{CommandBuilder, CommandPath};
use crate::config::{Document, PipelineConfig};
use crate::context::MorphlineContext;
use crate::error::{Error, Result};
use crate::morphline::Morphline;
use crate::stdlib::drop::DropRecord;
use crate::stdlib::pipe::PipeBuilder;

/// Name used in diagnostics for documents parsed from memory
const INLINE_DOCUMENT: &str = "<inline>";

/// Path segment of a root pipe whose morphline declares no id
const DEFAULT_ROOT: &str = "pipe";

/// Parses, selects and compiles morphlines
#[derive(Debug, Default)]
pub struct Compiler {
    cache: HashMap<String, Document>,
}

impl Compiler {
    /// Create a compiler with an empty parse cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Load and validate a document from disk.
    pub fn parse_file(&mut self, path: impl AsRef<Path>, overrides: &[Document]) -> Result<Document> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(Error::DocumentNotFound {
                path: path.display().to_string(),
            });
        }
        let source = std::fs::read_to_string(path)?;
        self.parse_str(&source, overrides)
    }

    /// Parse and validate a document from text. Later overrides take
    /// precedence over earlier ones, and all of them over `source`.
    pub fn parse_str(&mut self, source: &str, overrides: &[Document]) -> Result<Document> {
        let key = cache_key(source, overrides);
        if let Some(document) = self.cache.get(&key) {
            tracing::debug!(key = %&key[..12], "Using cached morphline document");
            return Ok(document.clone());
        }

        let mut document = Document::parse(source)?;
        for layer in overrides {
            document = layer.clone().with_fallback(document);
        }
        document.validate()?;

        self.cache.insert(key, document.clone());
        Ok(document)
    }

    /// Select a morphline by id. A missing or blank id selects the first
    /// morphline; `document_name` is used in error messages.
    pub fn find(
        &self,
        id: Option<&str>,
        document: &Document,
        document_name: &str,
    ) -> Result<PipelineConfig> {
        let morphlines = document.morphlines()?;
        if morphlines.is_empty() {
            return Err(Error::compilation(
                format!(
                    "Morphline file must contain at least one morphline: {}",
                    document_name
                ),
                Some(document.root()),
            ));
        }

        let id = id.map(str::trim).filter(|id| !id.is_empty());
        let selected = match id {
            None => morphlines.into_iter().next(),
            Some(id) => morphlines.into_iter().find(|m| m.id() == Some(id)),
        };
        selected.ok_or_else(|| {
            Error::compilation(
                format!(
                    "Morphline id '{}' not found in morphline file: {}",
                    id.unwrap_or_default(),
                    document_name
                ),
                None,
            )
        })
    }

    /// Build the command tree of a morphline.
    pub fn compile(&self, config: &PipelineConfig, context: &MorphlineContext) -> Result<Morphline> {
        let sentinel = Box::new(terminal(config));
        let root = PipeBuilder.build(config.raw(), None, sentinel, context)?;
        tracing::info!(
            id = config.id().unwrap_or_default(),
            commands = config.commands().len(),
            "Compiled morphline"
        );
        Ok(Morphline::new(
            config.id().map(str::to_string),
            root,
            context.exception_handler().clone(),
        ))
    }

    /// Parse, find and compile a morphline stored on disk.
    pub fn compile_file(
        &mut self,
        path: impl AsRef<Path>,
        id: Option<&str>,
        context: &MorphlineContext,
        overrides: &[Document],
    ) -> Result<Morphline> {
        let path = path.as_ref();
        let document = self.parse_file(path, overrides)?;
        let config = self.find(id, &document, &path.display().to_string())?;
        self.compile(&config, context)
    }

    /// Parse, find and compile a morphline given as text.
    pub fn compile_str(
        &mut self,
        source: &str,
        id: Option<&str>,
        context: &MorphlineContext,
    ) -> Result<Morphline> {
        let document = self.parse_str(source, &[])?;
        let config = self.find(id, &document, INLINE_DOCUMENT)?;
        self.compile(&config, context)
    }
}

/// The `dropRecord` sentinel ending a morphline, placed under the root pipe.
fn terminal(config: &PipelineConfig) -> DropRecord {
    let pipe = CommandPath::root(config.id().unwrap_or(DEFAULT_ROOT));
    DropRecord::new(Some(&pipe))
}

fn cache_key(source: &str, overrides: &[Document]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(source.as_bytes());
    for layer in overrides {
        hasher.update([0u8]);
        hasher.update(serde_yaml::to_string(layer.root()).unwrap_or_default().as_bytes());
    }
    hex::encode(hasher.finalize())
}
