//! Compile-time validation of user configurable parameters
//!
//! Commands call these checks from their builders so that bad values surface
//! as compilation errors before any record is processed.

use std::fmt::Display;

use crate::error::{Error, Result};

/// A closed set of symbolic choices, e.g. a configuration enum.
pub trait Choice: Copy + PartialEq + 'static {
    /// Every legal symbol, in declaration order
    const ALL: &'static [Self];

    /// The symbol as written in configuration
    fn name(self) -> &'static str;
}

/// Range and enum-membership checks
pub struct Validator;

impl Validator {
    /// Validate that `min <= value <= max`.
    pub fn validate_range<T>(config: &serde_yaml::Value, value: T, min: T, max: T) -> Result<T>
    where
        T: PartialOrd + Display,
    {
        if min <= value && value <= max {
            Ok(value)
        } else {
            Err(Error::compilation(
                format!("Invalid choice: '{}' (choose from {{{}..{}}})", value, min, max),
                Some(config),
            ))
        }
    }

    /// Validate that `value` names one of `choices`; an empty `choices`
    /// slice permits every symbol of `T`.
    pub fn validate_enum<T: Choice>(
        config: &serde_yaml::Value,
        value: &str,
        choices: &[T],
    ) -> Result<T> {
        let choices = if choices.is_empty() { T::ALL } else { choices };
        choices
            .iter()
            .copied()
            .find(|choice| choice.name() == value)
            .ok_or_else(|| {
                let names: Vec<&str> = choices.iter().map(|c| c.name()).collect();
                Error::compilation(
                    format!(
                        "Invalid choice: '{}' (choose from {{{}}})",
                        value,
                        names.join(",")
                    ),
                    Some(config),
                )
            })
    }
}
