//! Nested command chains

use serde_yaml::Value;

use crate::command::{build_commands, Command, CommandBuilder, CommandCore, CommandPath};
use crate::config::{self, Configs};
use crate::context::MorphlineContext;
use crate::error::{Error, Result};
use crate::record::Record;

/// Builder for `pipe`
pub struct PipeBuilder;

impl CommandBuilder for PipeBuilder {
    fn names(&self) -> &[&'static str] {
        &["pipe"]
    }

    fn build(
        &self,
        config: &Value,
        parent: Option<&CommandPath>,
        child: Box<dyn Command>,
        context: &MorphlineContext,
    ) -> Result<Box<dyn Command>> {
        let mut configs = Configs::new(config);
        let id = configs.get_opt_string(config::ID)?;
        configs.get_string_list(config::IMPORT_COMMANDS)?;
        let commands = match configs.get_value(config::COMMANDS) {
            None => Vec::new(),
            Some(Value::Sequence(list)) => list.clone(),
            Some(other) => {
                return Err(Error::compilation(
                    format!("'{}' must be a list", config::COMMANDS),
                    Some(other),
                ));
            }
        };
        configs.validate_arguments()?;

        let path = CommandPath::under(parent, id.as_deref().unwrap_or("pipe"));
        let head = build_commands(&commands, Some(&path), child, context)?;
        Ok(Box::new(Pipe {
            core: CommandCore::new(path.name(), parent, head),
        }))
    }
}

/// Runs records through its nested chain; the chain ends in the pipe's own
/// child.
pub struct Pipe {
    core: CommandCore,
}

impl Command for Pipe {
    fn name(&self) -> &str {
        self.core.name()
    }

    fn parent(&self) -> Option<&CommandPath> {
        self.core.parent()
    }

    fn process(&mut self, record: &mut Record) -> Result<bool> {
        self.core.forward(record)
    }

    fn notify(&mut self, notification: &Record) -> Result<()> {
        self.core.forward_notify(notification)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stdlib::testing::Collector;

    fn build(yaml: &str, child: Collector) -> Result<Box<dyn Command>> {
        let config: Value = serde_yaml::from_str(yaml).unwrap();
        PipeBuilder.build(&config, None, Box::new(child), &MorphlineContext::default())
    }

    #[test]
    fn test_empty_pipe_forwards_to_child() {
        let collector = Collector::default();
        let mut pipe = build("commands: []", collector.clone()).unwrap();
        let mut record = Record::new();
        record.put("a", 1);
        assert!(pipe.process(&mut record).unwrap());
        assert_eq!(collector.records(), vec![record]);
    }

    #[test]
    fn test_pipe_named_after_id() {
        let pipe = build("id: p1\ncommands: []", Collector::default()).unwrap();
        assert_eq!(pipe.name(), "p1");
        assert!(pipe.parent().is_none());
    }

    #[test]
    fn test_pipe_runs_commands_in_order() {
        let collector = Collector::default();
        let mut pipe = build(
            r#"
commands:
  - generateUUID:
      headerName: first
      prefix: "a-"
  - generateUUID:
      headerName: second
      prefix: "b-"
"#,
            collector.clone(),
        )
        .unwrap();
        assert!(pipe.process(&mut Record::new()).unwrap());
        let out = &collector.records()[0];
        assert!(out.first_str("first").unwrap().starts_with("a-"));
        assert!(out.first_str("second").unwrap().starts_with("b-"));
    }

    #[test]
    fn test_backtracking_propagates() {
        let mut pipe = build("commands: []", Collector::rejecting()).unwrap();
        assert!(!pipe.process(&mut Record::new()).unwrap());
    }

    #[test]
    fn test_notify_reaches_child() {
        let collector = Collector::default();
        let mut pipe = build(
            "commands:\n  - generateUUID: {}\n",
            collector.clone(),
        )
        .unwrap();
        pipe.notify(&Record::new()).unwrap();
        assert_eq!(collector.notifications.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_commands_must_be_list() {
        assert!(build("commands: nope", Collector::default()).is_err());
    }
}
