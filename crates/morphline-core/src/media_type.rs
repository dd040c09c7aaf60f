//! MIME media types with wildcard matching

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

const WILDCARD: &str = "*";

/// A `type/subtype` pair; parameters such as `charset` are discarded.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MediaType {
    type_: String,
    subtype: String,
}

impl MediaType {
    /// Build from its two halves; both are lower-cased and trimmed.
    pub fn new(type_: &str, subtype: &str) -> Result<Self> {
        let type_ = type_.trim().to_ascii_lowercase();
        let subtype = subtype.trim().to_ascii_lowercase();
        if type_.is_empty() || subtype.is_empty() {
            return Err(Error::runtime_message(format!(
                "Invalid media type: {}/{}",
                type_, subtype
            )));
        }
        if type_ == WILDCARD && subtype != WILDCARD {
            return Err(Error::runtime_message(format!(
                "Invalid media type: wildcard type requires wildcard subtype: {}/{}",
                type_, subtype
            )));
        }
        Ok(Self { type_, subtype })
    }

    /// Parse `type/subtype[; params]`.
    pub fn parse(text: &str) -> Result<Self> {
        let base = text.split(';').next().unwrap_or_default();
        let (type_, subtype) = base
            .split_once('/')
            .ok_or_else(|| Error::runtime_message(format!("Invalid media type: {}", text)))?;
        if subtype.contains('/') {
            return Err(Error::runtime_message(format!("Invalid media type: {}", text)));
        }
        Self::new(type_, subtype)
    }

    /// Primary type, e.g. `text`
    pub fn type_(&self) -> &str {
        &self.type_
    }

    /// Subtype, e.g. `plain`
    pub fn subtype(&self) -> &str {
        &self.subtype
    }

    /// `type/subtype` without parameters
    pub fn base_type(&self) -> String {
        format!("{}/{}", self.type_, self.subtype)
    }

    /// Whether either half is a wildcard
    pub fn has_wildcard(&self) -> bool {
        self.type_ == WILDCARD || self.subtype == WILDCARD
    }

    /// Whether this concrete type falls within `range`, e.g. `text/plain`
    /// within `text/*` or `*/*`.
    pub fn matches(&self, range: &MediaType) -> bool {
        (range.type_ == WILDCARD || range.type_ == self.type_)
            && (range.subtype == WILDCARD || range.subtype == self.subtype)
    }
}

impl FromStr for MediaType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.type_, self.subtype)
    }
}
