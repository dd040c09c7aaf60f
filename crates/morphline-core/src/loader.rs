//! Document sink collaborator
//!
//! Terminal sink stages hand records to a [`DocumentLoader`] obtained from
//! the embedding application. The core never opens connections itself; it
//! only describes where documents should go with a [`SinkLocator`].

use serde_yaml::Value;

use crate::config::Configs;
use crate::context::MorphlineContext;
use crate::error::{Error, Result};
use crate::record::Record;
use crate::validator::Validator;

/// Default number of documents per batch
pub const DEFAULT_BATCH_SIZE: usize = 100;

/// Largest accepted batch size
pub const MAX_BATCH_SIZE: usize = 1_000_000;

/// Receives records at the end of a pipeline
pub trait DocumentLoader: Send {
    /// Start a unit of work.
    fn begin_transaction(&mut self) -> Result<()>;

    /// Load one document.
    fn load(&mut self, document: &Record) -> Result<()>;

    /// Make the current unit of work durable.
    fn commit_transaction(&mut self) -> Result<()>;

    /// Discard the current unit of work.
    fn rollback_transaction(&mut self) -> Result<()>;

    /// Release resources; no other call follows.
    fn shutdown(&mut self) -> Result<()>;
}

/// Where and how a sink stage delivers documents
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SinkLocator {
    collection: Option<String>,
    url: Option<String>,
    batch_size: usize,
}

impl SinkLocator {
    /// Create a locator with the default batch size.
    pub fn new(collection: Option<String>, url: Option<String>) -> Self {
        Self {
            collection,
            url,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    /// Read `collection`, `url` and `batchSize` from stage parameters.
    pub fn from_configs(configs: &mut Configs<'_>) -> Result<Self> {
        let collection = configs.get_opt_string("collection")?;
        let url = configs.get_opt_string("url")?;
        let batch_size = configs.get_i64_or("batchSize", DEFAULT_BATCH_SIZE as i64)?;
        let batch_size =
            Validator::validate_range(configs.config(), batch_size, 1, MAX_BATCH_SIZE as i64)?;
        Ok(Self {
            collection,
            url,
            batch_size: batch_size as usize,
        })
    }

    /// Target collection, if any
    pub fn collection(&self) -> Option<&str> {
        self.collection.as_deref()
    }

    /// Connection locator, if any
    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    /// Documents per batch
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Ask the context's loader factory for a loader. `config` is reported
    /// if no factory is available.
    pub fn loader(
        &self,
        context: &MorphlineContext,
        config: &Value,
    ) -> Result<Box<dyn DocumentLoader>> {
        let factory = context.loader_factory().ok_or_else(|| {
            Error::compilation(
                "No document loader factory configured for sink stage",
                Some(config),
            )
        })?;
        factory(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn yaml(text: &str) -> Value {
        serde_yaml::from_str(text).unwrap()
    }

    #[test]
    fn test_defaults() {
        let params = yaml("{}");
        let locator = SinkLocator::from_configs(&mut Configs::new(&params)).unwrap();
        assert_eq!(locator.batch_size(), DEFAULT_BATCH_SIZE);
        assert_eq!(locator.collection(), None);
        assert_eq!(locator.url(), None);
    }

    #[test]
    fn test_explicit_values() {
        let params = yaml("collection: logs\nurl: http://localhost:8983\nbatchSize: 500\n");
        let locator = SinkLocator::from_configs(&mut Configs::new(&params)).unwrap();
        assert_eq!(locator.collection(), Some("logs"));
        assert_eq!(locator.url(), Some("http://localhost:8983"));
        assert_eq!(locator.batch_size(), 500);
    }

    #[test]
    fn test_batch_size_out_of_range() {
        let params = yaml("batchSize: 0\n");
        let err = SinkLocator::from_configs(&mut Configs::new(&params)).unwrap_err();
        assert!(err.to_string().contains("choose from {1..1000000}"));
    }

    #[test]
    fn test_loader_requires_factory() {
        let locator = SinkLocator::new(None, None);
        let result = locator.loader(&MorphlineContext::default(), &Value::Null);
        assert!(matches!(result, Err(Error::Compilation { .. })));
    }
}
