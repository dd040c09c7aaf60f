//! The command execution contract
//!
//! A command transforms a record into zero or more records and hands them to
//! its child. Commands form a tree built right to left: a command's child
//! exists before the command itself is constructed, so a builder may inspect
//! or wrap it.
//!
//! Two planes run through the tree:
//!
//! - **data plane**: [`Command::process`] returns `Ok(true)` to continue
//!   normal flow and `Ok(false)` to backtrack. Backtracking is not an error;
//!   an ancestor returns `false` in turn unless it is designed to interpret
//!   the result (e.g. `not`).
//! - **control plane**: [`Command::notify`] broadcasts a lifecycle
//!   notification to every command of the subtree.

use std::fmt;

use serde_yaml::Value;

use crate::config::command_name;
use crate::context::MorphlineContext;
use crate::error::{Error, Result};
use crate::record::Record;

/// A node of a compiled morphline
pub trait Command: Send {
    /// The name this command was built under
    fn name(&self) -> &str;

    /// Location of the enclosing command, if any. Lookup only; parents are
    /// never owned by their children.
    fn parent(&self) -> Option<&CommandPath>;

    /// Process one record; `Ok(false)` requests backtracking.
    fn process(&mut self, record: &mut Record) -> Result<bool>;

    /// Forward a control-plane notification through the subtree.
    fn notify(&mut self, notification: &Record) -> Result<()>;
}

/// Factory for one or more command names
pub trait CommandBuilder: Send + Sync {
    /// Names under which the builder is registered
    fn names(&self) -> &[&'static str];

    /// Build a command from its parameters, its enclosing command's path and
    /// its already-built child.
    fn build(
        &self,
        config: &Value,
        parent: Option<&CommandPath>,
        child: Box<dyn Command>,
        context: &MorphlineContext,
    ) -> Result<Box<dyn Command>>;
}

/// Slash-separated location of a command within its morphline, e.g.
/// `p1/not/readLine`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CommandPath {
    segments: Vec<String>,
}

impl CommandPath {
    /// Path of a top-level command
    pub fn root(name: impl Into<String>) -> Self {
        Self {
            segments: vec![name.into()],
        }
    }

    /// Path of a command nested under this one
    pub fn join(&self, name: impl Into<String>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(name.into());
        Self { segments }
    }

    /// Path for a command built under `parent`
    pub fn under(parent: Option<&CommandPath>, name: impl Into<String>) -> Self {
        match parent {
            Some(parent) => parent.join(name),
            None => Self::root(name),
        }
    }

    /// Last segment
    pub fn name(&self) -> &str {
        self.segments.last().map(String::as_str).unwrap_or_default()
    }

    /// Number of segments
    pub fn depth(&self) -> usize {
        self.segments.len()
    }
}

impl fmt::Display for CommandPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("/"))
    }
}

/// State shared by commands with exactly one child: name, parent and child.
pub struct CommandCore {
    name: String,
    parent: Option<CommandPath>,
    child: Box<dyn Command>,
}

impl CommandCore {
    /// Create the core for a command named `name`.
    pub fn new(
        name: impl Into<String>,
        parent: Option<&CommandPath>,
        child: Box<dyn Command>,
    ) -> Self {
        let name = name.into();
        tracing::trace!(
            command = %CommandPath::under(parent, name.as_str()),
            child = child.name(),
            "Constructed command"
        );
        Self {
            name,
            parent: parent.cloned(),
            child,
        }
    }

    /// Command name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Enclosing command path
    pub fn parent(&self) -> Option<&CommandPath> {
        self.parent.as_ref()
    }

    /// This command's own path
    pub fn path(&self) -> CommandPath {
        CommandPath::under(self.parent.as_ref(), self.name.as_str())
    }

    /// The child command
    pub fn child(&mut self) -> &mut dyn Command {
        self.child.as_mut()
    }

    /// Pass a record to the child.
    pub fn forward(&mut self, record: &mut Record) -> Result<bool> {
        self.child.process(record)
    }

    /// Pass a notification to the child.
    pub fn forward_notify(&mut self, notification: &Record) -> Result<()> {
        self.child.notify(notification)
    }
}

/// Build one command from its descriptor (`{name: {params}}`).
pub fn build_command(
    descriptor: &Value,
    parent: Option<&CommandPath>,
    child: Box<dyn Command>,
    context: &MorphlineContext,
) -> Result<Box<dyn Command>> {
    let (name, params) = command_name(descriptor)?;
    let builder = context.registry().get(name).ok_or_else(|| {
        Error::compilation(
            format!("No command builder registered for name: {}", name),
            Some(descriptor),
        )
    })?;
    builder.build(params, parent, child, context)
}

/// Build a chain of commands right to left; the last descriptor gets
/// `final_child` as its child. Returns the head of the chain, or
/// `final_child` itself when `descriptors` is empty.
pub fn build_commands(
    descriptors: &[Value],
    parent: Option<&CommandPath>,
    final_child: Box<dyn Command>,
    context: &MorphlineContext,
) -> Result<Box<dyn Command>> {
    let mut child = final_child;
    for descriptor in descriptors.iter().rev() {
        child = build_command(descriptor, parent, child, context)?;
    }
    Ok(child)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stdlib::drop::DropRecord;

    #[test]
    fn test_command_path_display() {
        let root = CommandPath::root("p1");
        let nested = root.join("not").join("readLine");
        assert_eq!(nested.to_string(), "p1/not/readLine");
        assert_eq!(nested.name(), "readLine");
        assert_eq!(nested.depth(), 3);
        assert_eq!(CommandPath::under(None, "x"), CommandPath::root("x"));
    }

    #[test]
    fn test_unknown_command_name_fails() {
        let descriptor: Value = serde_yaml::from_str("noSuchCommand: {}").unwrap();
        let err = build_command(
            &descriptor,
            None,
            Box::new(DropRecord::new(None)),
            &MorphlineContext::default(),
        )
        .err()
        .unwrap();
        assert!(matches!(err, Error::Compilation { .. }));
        assert!(err.to_string().contains("noSuchCommand"));
    }

    #[test]
    fn test_command_names_are_case_sensitive() {
        let descriptor: Value = serde_yaml::from_str("DROPRECORD: {}").unwrap();
        let result = build_command(
            &descriptor,
            None,
            Box::new(DropRecord::new(None)),
            &MorphlineContext::default(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_empty_chain_returns_final_child() {
        let head = build_commands(
            &[],
            None,
            Box::new(DropRecord::new(None)),
            &MorphlineContext::default(),
        )
        .unwrap();
        assert_eq!(head.name(), "dropRecord");
    }
}
