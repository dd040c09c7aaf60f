//! Terminal sentinel stage

use serde_yaml::Value;

use crate::command::{Command, CommandBuilder, CommandPath};
use crate::config::Configs;
use crate::context::MorphlineContext;
use crate::error::Result;
use crate::record::Record;

/// Builder for `drop` / `dropRecord`
pub struct DropRecordBuilder;

impl CommandBuilder for DropRecordBuilder {
    fn names(&self) -> &[&'static str] {
        &["drop", "dropRecord"]
    }

    fn build(
        &self,
        config: &Value,
        parent: Option<&CommandPath>,
        _child: Box<dyn Command>,
        _context: &MorphlineContext,
    ) -> Result<Box<dyn Command>> {
        Configs::new(config).validate_arguments()?;
        Ok(Box::new(DropRecord::new(parent)))
    }
}

/// Accepts every record and forwards nothing. Ends every compiled tree.
#[derive(Debug, Clone)]
pub struct DropRecord {
    parent: Option<CommandPath>,
}

impl DropRecord {
    /// Create the stage under `parent`
    pub fn new(parent: Option<&CommandPath>) -> Self {
        Self {
            parent: parent.cloned(),
        }
    }
}

impl Command for DropRecord {
    fn name(&self) -> &str {
        "dropRecord"
    }

    fn parent(&self) -> Option<&CommandPath> {
        self.parent.as_ref()
    }

    fn process(&mut self, _record: &mut Record) -> Result<bool> {
        Ok(true)
    }

    fn notify(&mut self, _notification: &Record) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stdlib::testing::Collector;

    #[test]
    fn test_drop_accepts_and_discards() {
        let collector = Collector::default();
        let mut drop = DropRecordBuilder
            .build(
                &Value::Null,
                None,
                Box::new(collector.clone()),
                &MorphlineContext::default(),
            )
            .unwrap();
        let mut record = Record::new();
        record.put("message", "hello");
        assert!(drop.process(&mut record).unwrap());
        assert!(collector.records().is_empty());
        assert_eq!(record.first_str("message"), Some("hello"));
    }

    #[test]
    fn test_drop_rejects_parameters() {
        let config: Value = serde_yaml::from_str("unexpected: 1").unwrap();
        let result = DropRecordBuilder.build(
            &config,
            None,
            Box::new(DropRecord::new(None)),
            &MorphlineContext::default(),
        );
        assert!(result.is_err());
    }
}
