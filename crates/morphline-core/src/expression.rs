//! Field expressions
//!
//! A field expression is a template such as `"host=@{host} pid=@{pid}"` that
//! is resolved against a record whenever a command needs a per-record
//! argument.
//!
//! Resolution rules:
//!
//! - Text without any `@{...}` reference is a literal and resolves to itself.
//! - An expression consisting of exactly one reference (`"@{tags}"`) resolves
//!   to all values of that field, in order.
//! - Any other expression resolves to a single text value in which each
//!   reference is replaced by the first value of its field.
//!
//! An unresolved reference is never an error: a lone reference resolves to
//! an empty list and a reference inside a template resolves to an empty
//! string. Evaluation never mutates the record.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{Error, Result};
use crate::record::Record;
use crate::value::Value;

static REFERENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"@\{([^}]*)\}").expect("Invalid field reference pattern"));

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Field(String),
}

/// A parsed template that resolves field references against a record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldExpression {
    source: String,
    segments: Vec<Segment>,
}

impl FieldExpression {
    /// Parse an expression; `config` is the fragment reported on error.
    pub fn new(expression: &str, config: &serde_yaml::Value) -> Result<Self> {
        let mut segments = Vec::new();
        let mut last = 0;
        for caps in REFERENCE.captures_iter(expression) {
            let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            let name = name.as_str().trim();
            if name.is_empty() {
                return Err(Error::compilation(
                    format!("Empty field reference in expression: {}", expression),
                    Some(config),
                ));
            }
            if whole.start() > last {
                segments.push(Segment::Literal(expression[last..whole.start()].to_string()));
            }
            segments.push(Segment::Field(name.to_string()));
            last = whole.end();
        }
        if last < expression.len() || segments.is_empty() {
            segments.push(Segment::Literal(expression[last..].to_string()));
        }
        Ok(Self {
            source: expression.to_string(),
            segments,
        })
    }

    /// The expression text as written in the configuration
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Whether the expression contains no field references
    pub fn is_literal(&self) -> bool {
        self.segments.iter().all(|s| matches!(s, Segment::Literal(_)))
    }

    /// Names of all fields referenced by the expression
    pub fn references(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Field(name) => Some(name.as_str()),
            Segment::Literal(_) => None,
        })
    }

    /// Resolve against a record.
    pub fn evaluate(&self, record: &Record) -> Vec<Value> {
        match self.segments.as_slice() {
            [Segment::Field(name)] => record.get(name).to_vec(),
            _ => vec![Value::Text(self.render(record))],
        }
    }

    /// Resolve against a record and render the result as one string.
    ///
    /// A multi-valued lone reference renders like a list (`[a, b]`).
    pub fn evaluate_to_string(&self, record: &Record) -> String {
        match self.segments.as_slice() {
            [Segment::Field(name)] => match record.get(name) {
                [] => String::new(),
                [single] => single.to_string(),
                many => Value::List(many.to_vec()).to_string(),
            },
            _ => self.render(record),
        }
    }

    fn render(&self, record: &Record) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Field(name) => {
                    if let Some(value) = record.first_value(name) {
                        out.push_str(&value.to_string());
                    }
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expr(text: &str) -> FieldExpression {
        FieldExpression::new(text, &serde_yaml::Value::Null).unwrap()
    }

    fn sample() -> Record {
        let mut record = Record::new();
        record.put("host", "web-1");
        record.put("tags", "a");
        record.put("tags", "b");
        record.put("pid", 42i64);
        record
    }

    #[test]
    fn test_literal_resolves_to_itself() {
        let e = expr("id");
        assert!(e.is_literal());
        assert_eq!(e.evaluate(&sample()), vec![Value::from("id")]);
    }

    #[test]
    fn test_lone_reference_returns_all_values() {
        let e = expr("@{tags}");
        assert_eq!(
            e.evaluate(&sample()),
            vec![Value::from("a"), Value::from("b")]
        );
        assert_eq!(e.evaluate_to_string(&sample()), "[a, b]");
    }

    #[test]
    fn test_template_uses_first_values() {
        let e = expr("host=@{host} pid=@{pid} tag=@{tags}");
        assert_eq!(
            e.evaluate(&sample()),
            vec![Value::from("host=web-1 pid=42 tag=a")]
        );
        assert_eq!(e.references().collect::<Vec<_>>(), ["host", "pid", "tags"]);
    }

    #[test]
    fn test_unresolved_references_are_empty() {
        assert!(expr("@{missing}").evaluate(&sample()).is_empty());
        assert_eq!(expr("@{missing}").evaluate_to_string(&sample()), "");
        assert_eq!(
            expr("[@{missing}]").evaluate(&sample()),
            vec![Value::from("[]")]
        );
    }

    #[test]
    fn test_empty_reference_is_compilation_error() {
        let result = FieldExpression::new("@{ }", &serde_yaml::Value::Null);
        assert!(matches!(result, Err(Error::Compilation { .. })));
    }

    #[test]
    fn test_evaluation_does_not_mutate_record() {
        let record = sample();
        let before = record.clone();
        expr("@{host}-@{nothing}").evaluate(&record);
        assert_eq!(record, before);
    }

    #[test]
    fn test_empty_expression_is_empty_literal() {
        assert_eq!(expr("").evaluate(&sample()), vec![Value::from("")]);
    }
}
