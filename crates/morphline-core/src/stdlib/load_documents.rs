//! Terminal sink stage

use serde_yaml::Value;

use crate::command::{Command, CommandBuilder, CommandCore, CommandPath};
use crate::config::Configs;
use crate::context::MorphlineContext;
use crate::error::{Error, Result};
use crate::loader::{DocumentLoader, SinkLocator};
use crate::notifications::{self, LifecycleEvent};
use crate::record::Record;

/// Builder for `loadDocuments`
pub struct LoadDocumentsBuilder;

impl CommandBuilder for LoadDocumentsBuilder {
    fn names(&self) -> &[&'static str] {
        &["loadDocuments"]
    }

    fn build(
        &self,
        config: &Value,
        parent: Option<&CommandPath>,
        child: Box<dyn Command>,
        context: &MorphlineContext,
    ) -> Result<Box<dyn Command>> {
        let mut configs = Configs::new(config);
        let locator = SinkLocator::from_configs(&mut configs)?;
        configs.validate_arguments()?;
        let loader = locator.loader(context, config)?;
        tracing::debug!(
            collection = locator.collection().unwrap_or_default(),
            batch_size = locator.batch_size(),
            "Built document sink"
        );
        Ok(Box::new(LoadDocuments {
            core: CommandCore::new("loadDocuments", parent, child),
            loader,
        }))
    }
}

/// Loads every record into the document loader, then continues.
/// Lifecycle notifications drive the loader's transactions.
pub struct LoadDocuments {
    core: CommandCore,
    loader: Box<dyn DocumentLoader>,
}

impl Command for LoadDocuments {
    fn name(&self) -> &str {
        self.core.name()
    }

    fn parent(&self) -> Option<&CommandPath> {
        self.core.parent()
    }

    fn process(&mut self, record: &mut Record) -> Result<bool> {
        self.loader.load(record).map_err(Error::runtime)?;
        self.core.forward(record)
    }

    fn notify(&mut self, notification: &Record) -> Result<()> {
        for event in notifications::lifecycle_events(notification) {
            let result = match event {
                LifecycleEvent::BeginTransaction => self.loader.begin_transaction(),
                LifecycleEvent::CommitTransaction => self.loader.commit_transaction(),
                LifecycleEvent::RollbackTransaction => self.loader.rollback_transaction(),
                LifecycleEvent::Shutdown => self.loader.shutdown(),
                LifecycleEvent::StartSession => Ok(()),
            };
            result.map_err(Error::runtime)?;
        }
        self.core.forward_notify(notification)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use crate::stdlib::drop::DropRecord;

    #[derive(Clone, Default)]
    struct Journal(Arc<Mutex<Vec<String>>>);

    impl Journal {
        fn entries(&self) -> Vec<String> {
            self.0.lock().unwrap().clone()
        }

        fn push(&self, entry: impl Into<String>) {
            self.0.lock().unwrap().push(entry.into());
        }
    }

    struct JournalLoader(Journal);

    impl DocumentLoader for JournalLoader {
        fn begin_transaction(&mut self) -> Result<()> {
            self.0.push("begin");
            Ok(())
        }

        fn load(&mut self, document: &Record) -> Result<()> {
            if document.contains("poison") {
                return Err(Error::runtime_message("rejected by sink"));
            }
            self.0.push(format!("load {}", document));
            Ok(())
        }

        fn commit_transaction(&mut self) -> Result<()> {
            self.0.push("commit");
            Ok(())
        }

        fn rollback_transaction(&mut self) -> Result<()> {
            self.0.push("rollback");
            Ok(())
        }

        fn shutdown(&mut self) -> Result<()> {
            self.0.push("shutdown");
            Ok(())
        }
    }

    fn sink(journal: &Journal) -> Box<dyn Command> {
        let journal = journal.clone();
        let context = MorphlineContext::builder()
            .loader_factory(move |locator| {
                journal.push(format!("open batch={}", locator.batch_size()));
                Ok(Box::new(JournalLoader(journal.clone())) as Box<dyn DocumentLoader>)
            })
            .build();
        let config: Value = serde_yaml::from_str("batchSize: 10").unwrap();
        LoadDocumentsBuilder
            .build(&config, None, Box::new(DropRecord::new(None)), &context)
            .unwrap()
    }

    #[test]
    fn test_lifecycle_drives_loader() {
        let journal = Journal::default();
        let mut sink = sink(&journal);
        sink.notify(&notifications::notification(LifecycleEvent::StartSession))
            .unwrap();
        sink.notify(&notifications::notification(LifecycleEvent::BeginTransaction))
            .unwrap();
        let mut record = Record::new();
        record.put("id", "1");
        assert!(sink.process(&mut record).unwrap());
        sink.notify(&notifications::notification(LifecycleEvent::CommitTransaction))
            .unwrap();
        sink.notify(&notifications::notification(LifecycleEvent::RollbackTransaction))
            .unwrap();
        sink.notify(&notifications::notification(LifecycleEvent::Shutdown))
            .unwrap();
        assert_eq!(
            journal.entries(),
            vec![
                "open batch=10",
                "begin",
                "load {id=[1]}",
                "commit",
                "rollback",
                "shutdown"
            ]
        );
    }

    #[test]
    fn test_loader_fault_is_runtime_error() {
        let journal = Journal::default();
        let mut sink = sink(&journal);
        let mut record = Record::new();
        record.put("poison", true);
        let err = sink.process(&mut record).unwrap_err();
        assert!(matches!(err, Error::Runtime { .. }));
    }

    #[test]
    fn test_requires_loader_factory() {
        let result = LoadDocumentsBuilder.build(
            &Value::Null,
            None,
            Box::new(DropRecord::new(None)),
            &MorphlineContext::default(),
        );
        assert!(matches!(result, Err(Error::Compilation { .. })));
    }
}
