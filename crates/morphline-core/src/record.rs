//! Record: the unit of data flowing through a morphline
//!
//! A record maps case-sensitive field names to ordered lists of values. A
//! field with zero values does not exist; every accessor treats absence as
//! an empty list rather than an error.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Serialize, Serializer};

use crate::fields;
use crate::value::Value;

/// A mutable, multi-valued field container
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: BTreeMap<String, Vec<Value>>,
}

impl Record {
    /// Create an empty record
    pub fn new() -> Self {
        Self::default()
    }

    /// All values of the given field; empty if absent.
    pub fn get(&self, name: &str) -> &[Value] {
        self.fields.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// First value of the given field, if any.
    pub fn first_value(&self, name: &str) -> Option<&Value> {
        self.get(name).first()
    }

    /// First value of the given field as text, if it is a text value.
    pub fn first_str(&self, name: &str) -> Option<&str> {
        self.first_value(name).and_then(Value::as_str)
    }

    /// Whether the field has at least one value.
    pub fn contains(&self, name: &str) -> bool {
        !self.get(name).is_empty()
    }

    /// Append a value to the given field.
    pub fn put(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.fields
            .entry(name.into())
            .or_default()
            .push(value.into());
    }

    /// Append several values to the given field.
    pub fn put_all<I, V>(&mut self, name: impl Into<String>, values: I)
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let name = name.into();
        let mut added: Vec<Value> = values.into_iter().map(Into::into).collect();
        if added.is_empty() {
            return;
        }
        self.fields.entry(name).or_default().append(&mut added);
    }

    /// Replace all values of the given field with a single value.
    pub fn replace_values(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(name.into(), vec![value.into()]);
    }

    /// Remove the field and all of its values.
    pub fn remove_all(&mut self, name: &str) -> Vec<Value> {
        self.fields.remove(name).unwrap_or_default()
    }

    /// Remove the attachment body, MIME type, charset and name.
    pub fn remove_attachments(&mut self) {
        for name in fields::ATTACHMENT_FIELDS {
            self.fields.remove(name);
        }
    }

    /// Iterate over non-empty fields in name order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &[Value])> {
        self.fields
            .iter()
            .map(|(name, values)| (name.as_str(), values.as_slice()))
    }

    /// Number of non-empty fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the record has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// JSON object mapping each field name to its array of values.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Object(
            self.fields
                .iter()
                .map(|(name, values)| {
                    (
                        name.clone(),
                        serde_json::Value::Array(values.iter().map(Value::to_json).collect()),
                    )
                })
                .collect(),
        )
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(&self.fields)
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (name, values)) in self.fields.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}=[", name)?;
            for (j, value) in values.iter().enumerate() {
                if j > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}", value)?;
            }
            write!(f, "]")?;
        }
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_absent_field_is_empty() {
        let record = Record::new();
        assert!(record.get("missing").is_empty());
        assert!(record.first_value("missing").is_none());
        assert!(!record.contains("missing"));
    }

    #[test]
    fn test_put_appends_in_order() {
        let mut record = Record::new();
        record.put("tags", "a");
        record.put("tags", "b");
        assert_eq!(record.get("tags"), &[Value::from("a"), Value::from("b")]);
        assert_eq!(record.first_str("tags"), Some("a"));
    }

    #[test]
    fn test_field_names_are_case_sensitive() {
        let mut record = Record::new();
        record.put("Name", "upper");
        assert!(record.get("name").is_empty());
        assert_eq!(record.first_str("Name"), Some("upper"));
    }

    #[test]
    fn test_put_all_with_no_values_keeps_field_absent() {
        let mut record = Record::new();
        record.put_all("empty", Vec::<String>::new());
        assert!(!record.contains("empty"));
        assert!(record.is_empty());
    }

    #[test]
    fn test_replace_values() {
        let mut record = Record::new();
        record.put_all("id", ["1", "2"]);
        record.replace_values("id", "3");
        assert_eq!(record.get("id"), &[Value::from("3")]);
    }

    #[test]
    fn test_remove_attachments_keeps_other_fields() {
        let mut record = Record::new();
        record.put(fields::ATTACHMENT_BODY, b"data".to_vec());
        record.put(fields::ATTACHMENT_MIME_TYPE, "text/plain");
        record.put(fields::ATTACHMENT_CHARSET, "UTF-8");
        record.put(fields::ATTACHMENT_NAME, "in.txt");
        record.put("host", "web-1");
        record.remove_attachments();
        assert_eq!(record.len(), 1);
        assert_eq!(record.first_str("host"), Some("web-1"));
    }

    #[test]
    fn test_to_json_and_display() {
        let mut record = Record::new();
        record.put("a", 1i64);
        record.put("b", "x");
        record.put("b", "y");
        assert_eq!(record.to_json(), json!({"a": [1], "b": ["x", "y"]}));
        assert_eq!(record.to_string(), "{a=[1], b=[x, y]}");
        assert_eq!(serde_json::to_value(&record).unwrap(), record.to_json());
    }
}
