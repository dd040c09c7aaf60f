//! Morphline documents and command parameters
//!
//! A document declares a list of named morphlines, each an ordered list of
//! command descriptors:
//!
//! ```yaml
//! morphlines:
//!   - id: p1
//!     importCommands: ["*"]
//!     commands:
//!       - generateUUID:
//!           headerName: id
//!       - logInfo:
//!           format: "got {}"
//!           args: ["@{id}"]
//! ```
//!
//! Override documents are layered on top of a base document before it is
//! validated; see [`Document::with_fallback`].

use std::collections::BTreeSet;

use serde_yaml::{Mapping, Value};

use crate::error::{Error, Result};

/// Key holding the list of morphlines
pub const MORPHLINES: &str = "morphlines";

/// Key holding a morphline's identifier
pub const ID: &str = "id";

/// Key holding a morphline's command descriptors
pub const COMMANDS: &str = "commands";

/// Key accepted for compatibility with classpath-scanning documents
pub const IMPORT_COMMANDS: &str = "importCommands";

/// A parsed morphline document
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    root: Value,
}

impl Document {
    /// Parse YAML text. Empty documents are compilation errors; syntax
    /// errors are parsing errors carrying the location.
    pub fn parse(source: &str) -> Result<Self> {
        let blank = source
            .lines()
            .map(str::trim)
            .all(|line| line.is_empty() || line.starts_with('#'));
        if blank {
            return Err(Error::compilation("Morphline document is empty", None));
        }
        let root: Value = serde_yaml::from_str(source)?;
        if root.is_null() {
            return Err(Error::compilation("Morphline document is empty", None));
        }
        Ok(Self { root })
    }

    /// Wrap an already-built YAML value
    pub fn from_value(root: Value) -> Self {
        Self { root }
    }

    /// The document root
    pub fn root(&self) -> &Value {
        &self.root
    }

    /// Layer this document over `fallback`: mappings merge key by key with
    /// this document winning, every other value is replaced wholesale.
    pub fn with_fallback(self, fallback: Document) -> Document {
        Document {
            root: merge(self.root, fallback.root),
        }
    }

    /// Check the overall shape of the document.
    pub fn validate(&self) -> Result<()> {
        self.morphlines().map(|_| ())
    }

    /// All morphlines declared by the document, in declaration order.
    pub fn morphlines(&self) -> Result<Vec<PipelineConfig>> {
        let root = self.root.as_mapping().ok_or_else(|| {
            Error::compilation(
                format!("Morphline document must be a mapping with a '{}' list", MORPHLINES),
                Some(&self.root),
            )
        })?;
        let list = match root.get(MORPHLINES) {
            Some(Value::Sequence(list)) => list,
            Some(other) => {
                return Err(Error::compilation(
                    format!("'{}' must be a list", MORPHLINES),
                    Some(other),
                ));
            }
            None => {
                return Err(Error::compilation(
                    format!("Missing '{}' list in morphline document", MORPHLINES),
                    Some(&self.root),
                ));
            }
        };
        list.iter().map(PipelineConfig::from_value).collect()
    }
}

fn merge(over: Value, base: Value) -> Value {
    match (over, base) {
        (Value::Mapping(over), Value::Mapping(mut base)) => {
            for (key, value) in over {
                let merged = match base.remove(&key) {
                    Some(existing) => merge(value, existing),
                    None => value,
                };
                base.insert(key, merged);
            }
            Value::Mapping(base)
        }
        (over, _) => over,
    }
}

/// One morphline selected from a document
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    id: Option<String>,
    commands: Vec<Value>,
    raw: Value,
}

impl PipelineConfig {
    fn from_value(value: &Value) -> Result<Self> {
        let mapping = value
            .as_mapping()
            .ok_or_else(|| Error::compilation("Morphline must be a mapping", Some(value)))?;

        let id = match mapping.get(ID) {
            None | Some(Value::Null) => None,
            Some(id) => Some(scalar_to_string(id).ok_or_else(|| {
                Error::compilation("Morphline 'id' must be a scalar", Some(value))
            })?),
        };

        let commands = match mapping.get(COMMANDS) {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Sequence(list)) => list.clone(),
            Some(_) => {
                return Err(Error::compilation(
                    format!("Morphline '{}' must be a list", COMMANDS),
                    Some(value),
                ));
            }
        };
        for descriptor in &commands {
            command_name(descriptor)?;
        }

        Ok(Self {
            id,
            commands,
            raw: value.clone(),
        })
    }

    /// Morphline identifier, if declared
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Command descriptors in declaration order
    pub fn commands(&self) -> &[Value] {
        &self.commands
    }

    /// The morphline's configuration as written
    pub fn raw(&self) -> &Value {
        &self.raw
    }
}

/// Split a command descriptor (`{name: {params}}`) into its name and
/// parameters. Missing parameters are `null`, which every getter treats as
/// an empty mapping.
pub fn command_name(descriptor: &Value) -> Result<(&str, &Value)> {
    let invalid = || {
        Error::compilation(
            "Command descriptor must be a mapping with exactly one command name",
            Some(descriptor),
        )
    };
    let mapping = descriptor.as_mapping().ok_or_else(invalid)?;
    if mapping.len() != 1 {
        return Err(invalid());
    }
    let (name, params) = mapping.iter().next().ok_or_else(invalid)?;
    let name = name.as_str().ok_or_else(invalid)?;
    Ok((name, params))
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Typed access to a command's parameters.
///
/// Every getter records the key it was asked for, so that builders can call
/// [`Configs::validate_arguments`] at the end and reject unknown parameters.
#[derive(Debug)]
pub struct Configs<'a> {
    config: &'a Value,
    recognized: BTreeSet<String>,
}

impl<'a> Configs<'a> {
    /// Wrap a command's parameter mapping
    pub fn new(config: &'a Value) -> Self {
        Self {
            config,
            recognized: BTreeSet::new(),
        }
    }

    /// The raw parameters, for error reporting
    pub fn config(&self) -> &'a Value {
        self.config
    }

    fn mapping(&self) -> Option<&'a Mapping> {
        self.config.as_mapping()
    }

    /// Look up a parameter and mark it as recognized.
    pub fn get_value(&mut self, key: &str) -> Option<&'a Value> {
        self.recognized.insert(key.to_string());
        self.mapping()
            .and_then(|m| m.get(key))
            .filter(|v| !v.is_null())
    }

    /// Whether the parameter is present (does not mark it as recognized).
    pub fn contains(&self, key: &str) -> bool {
        self.mapping()
            .and_then(|m| m.get(key))
            .is_some_and(|v| !v.is_null())
    }

    fn invalid(&self, key: &str, expected: &str) -> Error {
        Error::compilation(
            format!("Invalid value for parameter '{}': expected {}", key, expected),
            Some(self.config),
        )
    }

    /// Required string parameter.
    pub fn get_string(&mut self, key: &str) -> Result<String> {
        self.get_opt_string(key)?.ok_or_else(|| {
            Error::compilation(format!("Missing parameter '{}'", key), Some(self.config))
        })
    }

    /// Optional string parameter; scalars are converted to text.
    pub fn get_opt_string(&mut self, key: &str) -> Result<Option<String>> {
        match self.get_value(key) {
            None => Ok(None),
            Some(value) => scalar_to_string(value)
                .map(Some)
                .ok_or_else(|| self.invalid(key, "a string")),
        }
    }

    /// String parameter with a default.
    pub fn get_string_or(&mut self, key: &str, default: &str) -> Result<String> {
        Ok(self
            .get_opt_string(key)?
            .unwrap_or_else(|| default.to_string()))
    }

    /// Optional boolean parameter; accepts `true`/`false` strings as well.
    pub fn get_opt_bool(&mut self, key: &str) -> Result<Option<bool>> {
        match self.get_value(key) {
            None => Ok(None),
            Some(Value::Bool(b)) => Ok(Some(*b)),
            Some(Value::String(s)) if s.eq_ignore_ascii_case("true") => Ok(Some(true)),
            Some(Value::String(s)) if s.eq_ignore_ascii_case("false") => Ok(Some(false)),
            Some(_) => Err(self.invalid(key, "a boolean")),
        }
    }

    /// Boolean parameter with a default.
    pub fn get_bool_or(&mut self, key: &str, default: bool) -> Result<bool> {
        Ok(self.get_opt_bool(key)?.unwrap_or(default))
    }

    /// Integer parameter with a default.
    pub fn get_i64_or(&mut self, key: &str, default: i64) -> Result<i64> {
        match self.get_value(key) {
            None => Ok(default),
            Some(Value::Number(n)) => n.as_i64().ok_or_else(|| self.invalid(key, "an integer")),
            Some(Value::String(s)) => s
                .trim()
                .parse()
                .map_err(|_| self.invalid(key, "an integer")),
            Some(_) => Err(self.invalid(key, "an integer")),
        }
    }

    /// List of strings; a single scalar is treated as a one-element list and
    /// an absent parameter as an empty list.
    pub fn get_string_list(&mut self, key: &str) -> Result<Vec<String>> {
        match self.get_value(key) {
            None => Ok(Vec::new()),
            Some(Value::Sequence(items)) => items
                .iter()
                .map(|item| scalar_to_string(item).ok_or_else(|| self.invalid(key, "a list of strings")))
                .collect(),
            Some(value) => scalar_to_string(value)
                .map(|s| vec![s])
                .ok_or_else(|| self.invalid(key, "a list of strings")),
        }
    }

    /// Reject parameters that no getter asked for.
    pub fn validate_arguments(&self) -> Result<()> {
        let mapping = match self.config {
            Value::Null => return Ok(()),
            Value::Mapping(mapping) => mapping,
            _ => {
                return Err(Error::compilation(
                    "Command parameters must be a mapping",
                    Some(self.config),
                ));
            }
        };
        for key in mapping.keys() {
            let name = key.as_str().unwrap_or_default();
            if !self.recognized.contains(name) {
                let accepted: Vec<&str> = self.recognized.iter().map(String::as_str).collect();
                return Err(Error::compilation(
                    format!(
                        "Unrecognized command parameter '{}' (accepted: {})",
                        serde_yaml::to_string(key).unwrap_or_default().trim(),
                        accepted.join(", ")
                    ),
                    Some(self.config),
                ));
            }
        }
        Ok(())
    }
}
