//! Command builder registry
//!
//! Maps command names to builders. The builtin registry is created once per
//! process on first use and never changes afterwards; embedders that add
//! their own commands start from [`CommandRegistry::with_builtins`] and hand
//! the finished registry to a [`MorphlineContext`](crate::MorphlineContext).

use std::collections::HashMap;
use std::sync::Arc;

use once_cell::sync::Lazy;

use crate::command::CommandBuilder;
use crate::parser::read_line::ReadLineBuilder;
use crate::parser::read_multi_line::ReadMultiLineBuilder;
use crate::stdlib::drop::DropRecordBuilder;
use crate::stdlib::generate_uuid::GenerateUuidBuilder;
use crate::stdlib::load_documents::LoadDocumentsBuilder;
use crate::stdlib::log::{LogBuilder, LogLevel};
use crate::stdlib::not::NotBuilder;
use crate::stdlib::pipe::PipeBuilder;

static BUILTINS: Lazy<Arc<CommandRegistry>> =
    Lazy::new(|| Arc::new(CommandRegistry::with_builtins()));

/// Name → builder lookup table
#[derive(Clone, Default)]
pub struct CommandRegistry {
    builders: HashMap<&'static str, Arc<dyn CommandBuilder>>,
}

impl CommandRegistry {
    /// A registry with no commands at all
    pub fn empty() -> Self {
        Self::default()
    }

    /// The shared, process-wide registry of builtin commands
    pub fn builtin() -> Arc<CommandRegistry> {
        Arc::clone(&BUILTINS)
    }

    /// A fresh registry pre-populated with the builtin commands
    pub fn with_builtins() -> Self {
        Self::empty()
            .register(PipeBuilder)
            .register(DropRecordBuilder)
            .register(NotBuilder)
            .register(GenerateUuidBuilder)
            .register(LogBuilder::new("logTrace", LogLevel::Trace))
            .register(LogBuilder::new("logDebug", LogLevel::Debug))
            .register(LogBuilder::new("logInfo", LogLevel::Info))
            .register(LogBuilder::new("logWarn", LogLevel::Warn))
            .register(LogBuilder::new("logError", LogLevel::Error))
            .register(ReadLineBuilder)
            .register(ReadMultiLineBuilder)
            .register(LoadDocumentsBuilder)
    }

    /// Register a builder under all of its names. A later registration for
    /// the same name replaces the earlier one.
    pub fn register<B: CommandBuilder + 'static>(mut self, builder: B) -> Self {
        let builder: Arc<dyn CommandBuilder> = Arc::new(builder);
        for &name in builder.names() {
            if self.builders.insert(name, Arc::clone(&builder)).is_some() {
                tracing::debug!(name, "Replacing command builder");
            }
        }
        self
    }

    /// Look up a builder by exact, case-sensitive name
    pub fn get(&self, name: &str) -> Option<&Arc<dyn CommandBuilder>> {
        self.builders.get(name)
    }

    /// Registered names in sorted order
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self.builders.keys().copied().collect();
        names.sort_unstable();
        names
    }
}

impl std::fmt::Debug for CommandRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandRegistry")
            .field("names", &self.names())
            .finish()
    }
}
