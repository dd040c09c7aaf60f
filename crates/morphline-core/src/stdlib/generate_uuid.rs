//! Random identifier assignment

use serde_yaml::Value;
use uuid::Uuid;

use crate::command::{Command, CommandBuilder, CommandCore, CommandPath};
use crate::config::Configs;
use crate::context::MorphlineContext;
use crate::error::Result;
use crate::fields;
use crate::record::Record;

/// Builder for `generateUUID`
pub struct GenerateUuidBuilder;

impl CommandBuilder for GenerateUuidBuilder {
    fn names(&self) -> &[&'static str] {
        &["generateUUID"]
    }

    fn build(
        &self,
        config: &Value,
        parent: Option<&CommandPath>,
        child: Box<dyn Command>,
        _context: &MorphlineContext,
    ) -> Result<Box<dyn Command>> {
        let mut configs = Configs::new(config);
        let header_name = configs.get_string_or("headerName", fields::ID)?;
        let preserve_existing = configs.get_bool_or("preserveExisting", true)?;
        let prefix = configs.get_string_or("prefix", "")?;
        configs.validate_arguments()?;
        Ok(Box::new(GenerateUuid {
            core: CommandCore::new("generateUUID", parent, child),
            header_name,
            preserve_existing,
            prefix,
        }))
    }
}

/// Sets a field to a random version 4 UUID, optionally prefixed.
pub struct GenerateUuid {
    core: CommandCore,
    header_name: String,
    preserve_existing: bool,
    prefix: String,
}

impl Command for GenerateUuid {
    fn name(&self) -> &str {
        self.core.name()
    }

    fn parent(&self) -> Option<&CommandPath> {
        self.core.parent()
    }

    fn process(&mut self, record: &mut Record) -> Result<bool> {
        if !(self.preserve_existing && record.contains(&self.header_name)) {
            let id = format!("{}{}", self.prefix, Uuid::new_v4());
            record.replace_values(self.header_name.as_str(), id);
        }
        self.core.forward(record)
    }

    fn notify(&mut self, notification: &Record) -> Result<()> {
        self.core.forward_notify(notification)
    }
}
