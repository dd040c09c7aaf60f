//! Collaborators shared by all commands of a compilation

use std::sync::Arc;

use crate::error::Result;
use crate::fault::{ExceptionHandler, FaultTolerance};
use crate::loader::{DocumentLoader, SinkLocator};
use crate::registry::CommandRegistry;

/// Creates a document loader for a sink locator
pub type LoaderFactory =
    Arc<dyn Fn(&SinkLocator) -> Result<Box<dyn DocumentLoader>> + Send + Sync>;

/// Everything a command builder may need besides its own parameters
#[derive(Clone)]
pub struct MorphlineContext {
    registry: Arc<CommandRegistry>,
    exception_handler: Arc<dyn ExceptionHandler>,
    loader_factory: Option<LoaderFactory>,
}

impl MorphlineContext {
    /// Start building a context
    pub fn builder() -> MorphlineContextBuilder {
        MorphlineContextBuilder::default()
    }

    /// Command builders available to the compiler
    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    /// Policy applied to faults raised while processing records
    pub fn exception_handler(&self) -> &Arc<dyn ExceptionHandler> {
        &self.exception_handler
    }

    /// Factory for sink stages, if the embedder supplied one
    pub fn loader_factory(&self) -> Option<&LoaderFactory> {
        self.loader_factory.as_ref()
    }
}

impl Default for MorphlineContext {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl std::fmt::Debug for MorphlineContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MorphlineContext")
            .field("registry", &self.registry)
            .field("loader_factory", &self.loader_factory.is_some())
            .finish()
    }
}

/// Builder for [`MorphlineContext`]
#[derive(Default)]
pub struct MorphlineContextBuilder {
    registry: Option<Arc<CommandRegistry>>,
    exception_handler: Option<Arc<dyn ExceptionHandler>>,
    loader_factory: Option<LoaderFactory>,
}

impl MorphlineContextBuilder {
    /// Use a custom registry instead of the builtin one
    pub fn registry(mut self, registry: CommandRegistry) -> Self {
        self.registry = Some(Arc::new(registry));
        self
    }

    /// Use a custom fault policy; defaults to non-production fault tolerance
    pub fn exception_handler(mut self, handler: impl ExceptionHandler + 'static) -> Self {
        self.exception_handler = Some(Arc::new(handler));
        self
    }

    /// Supply document loaders to sink stages
    pub fn loader_factory<F>(mut self, factory: F) -> Self
    where
        F: Fn(&SinkLocator) -> Result<Box<dyn DocumentLoader>> + Send + Sync + 'static,
    {
        self.loader_factory = Some(Arc::new(factory));
        self
    }

    /// Finish building
    pub fn build(self) -> MorphlineContext {
        MorphlineContext {
            registry: self.registry.unwrap_or_else(CommandRegistry::builtin),
            exception_handler: self
                .exception_handler
                .unwrap_or_else(|| Arc::new(FaultTolerance::new(false, false))),
            loader_factory: self.loader_factory,
        }
    }
}
