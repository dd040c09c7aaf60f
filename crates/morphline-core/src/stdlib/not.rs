//! Boolean negation of a nested command

use serde_yaml::Value;

use crate::command::{build_command, Command, CommandBuilder, CommandCore, CommandPath};
use crate::context::MorphlineContext;
use crate::error::Result;
use crate::record::Record;

/// Builder for `not`. Its parameters are a single command descriptor, e.g.
/// `not: { readLine: {} }`.
pub struct NotBuilder;

impl CommandBuilder for NotBuilder {
    fn names(&self) -> &[&'static str] {
        &["not"]
    }

    fn build(
        &self,
        config: &Value,
        parent: Option<&CommandPath>,
        child: Box<dyn Command>,
        context: &MorphlineContext,
    ) -> Result<Box<dyn Command>> {
        let path = CommandPath::under(parent, "not");
        let nested = build_command(config, Some(&path), child, context)?;
        Ok(Box::new(Not {
            core: CommandCore::new("not", parent, nested),
        }))
    }
}

/// Runs the nested command (which continues into this stage's child) and
/// returns the opposite of its result.
pub struct Not {
    core: CommandCore,
}

impl Command for Not {
    fn name(&self) -> &str {
        self.core.name()
    }

    fn parent(&self) -> Option<&CommandPath> {
        self.core.parent()
    }

    fn process(&mut self, record: &mut Record) -> Result<bool> {
        Ok(!self.core.forward(record)?)
    }

    fn notify(&mut self, notification: &Record) -> Result<()> {
        self.core.forward_notify(notification)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stdlib::drop::DropRecord;
    use crate::stdlib::testing::Collector;

    fn build(yaml: &str, child: Box<dyn Command>) -> Result<Box<dyn Command>> {
        let config: Value = serde_yaml::from_str(yaml).unwrap();
        NotBuilder.build(&config, None, child, &MorphlineContext::default())
    }

    #[test]
    fn test_not_inverts_acceptance() {
        let mut not = build("dropRecord: {}", Box::new(DropRecord::new(None))).unwrap();
        assert!(!not.process(&mut Record::new()).unwrap());
    }

    #[test]
    fn test_not_inverts_backtracking() {
        let mut not = build("generateUUID: {}", Box::new(Collector::rejecting())).unwrap();
        assert!(not.process(&mut Record::new()).unwrap());
    }

    #[test]
    fn test_not_is_top_level_without_parent() {
        let not = build("dropRecord: {}", Box::new(DropRecord::new(None))).unwrap();
        assert_eq!(not.name(), "not");
        assert!(not.parent().is_none());
    }

    #[test]
    fn test_not_requires_descriptor() {
        assert!(build("{}", Box::new(DropRecord::new(None))).is_err());
    }
}
