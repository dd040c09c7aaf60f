//! Logging commands
//!
//! `logTrace`, `logDebug`, `logInfo`, `logWarn` and `logError` format a
//! message from `format` and the per-record values of `args`, emit it as a
//! `tracing` event at their level and pass the record on unchanged.
//!
//! Each `{}` in `format` is replaced by the next argument. Surplus arguments
//! are ignored and surplus placeholders are kept literally. Arguments are
//! not evaluated when the level is disabled.

use serde_yaml::Value;
use tracing::Level;

use crate::command::{Command, CommandBuilder, CommandCore, CommandPath};
use crate::config::Configs;
use crate::context::MorphlineContext;
use crate::error::Result;
use crate::expression::FieldExpression;
use crate::record::Record;

const PLACEHOLDER: &str = "{}";

/// Severity of a logging command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Finest-grained events
    Trace,
    /// Diagnostic events
    Debug,
    /// Informational events
    Info,
    /// Potential problems
    Warn,
    /// Failures
    Error,
}

impl LogLevel {
    fn enabled(self) -> bool {
        match self {
            LogLevel::Trace => tracing::enabled!(Level::TRACE),
            LogLevel::Debug => tracing::enabled!(Level::DEBUG),
            LogLevel::Info => tracing::enabled!(Level::INFO),
            LogLevel::Warn => tracing::enabled!(Level::WARN),
            LogLevel::Error => tracing::enabled!(Level::ERROR),
        }
    }

    fn emit(self, command: &str, message: &str) {
        match self {
            LogLevel::Trace => tracing::trace!(command, "{}", message),
            LogLevel::Debug => tracing::debug!(command, "{}", message),
            LogLevel::Info => tracing::info!(command, "{}", message),
            LogLevel::Warn => tracing::warn!(command, "{}", message),
            LogLevel::Error => tracing::error!(command, "{}", message),
        }
    }
}

/// Builder for one logging command name
pub struct LogBuilder {
    names: [&'static str; 1],
    level: LogLevel,
}

impl LogBuilder {
    /// A builder registered as `name` logging at `level`
    pub fn new(name: &'static str, level: LogLevel) -> Self {
        Self {
            names: [name],
            level,
        }
    }
}

impl CommandBuilder for LogBuilder {
    fn names(&self) -> &[&'static str] {
        &self.names
    }

    fn build(
        &self,
        config: &Value,
        parent: Option<&CommandPath>,
        child: Box<dyn Command>,
        _context: &MorphlineContext,
    ) -> Result<Box<dyn Command>> {
        let mut configs = Configs::new(config);
        let format = configs.get_string("format")?;
        let args = configs
            .get_string_list("args")?
            .iter()
            .map(|arg| FieldExpression::new(arg, config))
            .collect::<Result<Vec<_>>>()?;
        configs.validate_arguments()?;

        let core = CommandCore::new(self.names[0], parent, child);
        Ok(Box::new(Log {
            path: core.path().to_string(),
            core,
            level: self.level,
            format,
            args,
        }))
    }
}

/// Emits one formatted event per record.
pub struct Log {
    core: CommandCore,
    path: String,
    level: LogLevel,
    format: String,
    args: Vec<FieldExpression>,
}

impl Command for Log {
    fn name(&self) -> &str {
        self.core.name()
    }

    fn parent(&self) -> Option<&CommandPath> {
        self.core.parent()
    }

    fn process(&mut self, record: &mut Record) -> Result<bool> {
        if self.level.enabled() {
            let args: Vec<String> = self
                .args
                .iter()
                .map(|arg| arg.evaluate_to_string(record))
                .collect();
            self.level.emit(&self.path, &format_message(&self.format, &args));
        }
        self.core.forward(record)
    }

    fn notify(&mut self, notification: &Record) -> Result<()> {
        self.core.forward_notify(notification)
    }
}

/// Substitute `{}` placeholders left to right.
pub fn format_message(format: &str, args: &[String]) -> String {
    let mut out = String::with_capacity(format.len());
    let mut rest = format;
    let mut args = args.iter();
    while let Some(pos) = rest.find(PLACEHOLDER) {
        out.push_str(&rest[..pos]);
        match args.next() {
            Some(arg) => out.push_str(arg),
            None => out.push_str(PLACEHOLDER),
        }
        rest = &rest[pos + PLACEHOLDER.len()..];
    }
    out.push_str(rest);
    out
}
