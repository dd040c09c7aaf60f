//! `readLine`: one record per line

use std::io::BufRead;

use serde_yaml::Value;

use crate::command::{Command, CommandBuilder, CommandPath};
use crate::config::Configs;
use crate::context::MorphlineContext;
use crate::error::{Error, Result};
use crate::parser::{derive_record, next_line, AttachmentParser, Parser, ParserSettings};
use crate::record::Record;

/// Builder for `readLine`
pub struct ReadLineBuilder;

impl CommandBuilder for ReadLineBuilder {
    fn names(&self) -> &[&'static str] {
        &["readLine"]
    }

    fn build(
        &self,
        config: &Value,
        parent: Option<&CommandPath>,
        child: Box<dyn Command>,
        _context: &MorphlineContext,
    ) -> Result<Box<dyn Command>> {
        let mut configs = Configs::new(config);
        let settings = ParserSettings::from_configs(&mut configs)?;
        let ignore_first_line = configs.get_bool_or("ignoreFirstLine", false)?;
        let comment_prefix = configs.get_string_or("commentPrefix", "")?;
        if comment_prefix.chars().count() > 1 {
            return Err(Error::compilation(
                format!(
                    "commentPrefix must be at most one character long: {}",
                    comment_prefix
                ),
                Some(config),
            ));
        }
        configs.validate_arguments()?;

        let reader = ReadLine {
            ignore_first_line,
            comment_prefix: comment_prefix.chars().next(),
        };
        Ok(Box::new(Parser::new("readLine", settings, parent, child, reader)))
    }
}

/// Emits each non-blank, non-comment line as the `message` of a derived
/// record. The first line is skipped, if requested, before blank and
/// comment lines are filtered.
#[derive(Debug, Clone)]
pub struct ReadLine {
    ignore_first_line: bool,
    comment_prefix: Option<char>,
}

impl AttachmentParser for ReadLine {
    fn parse(
        &mut self,
        input: &Record,
        text: &mut dyn BufRead,
        child: &mut dyn Command,
    ) -> Result<bool> {
        let mut line = String::new();
        let mut is_first = true;
        while next_line(text, &mut line)? {
            if is_first {
                is_first = false;
                if self.ignore_first_line {
                    continue;
                }
            }
            if line.is_empty() {
                continue;
            }
            if self.comment_prefix.is_some_and(|prefix| line.starts_with(prefix)) {
                continue;
            }
            let mut output = derive_record(input, line.clone());
            if !child.process(&mut output)? {
                return Ok(false);
            }
        }
        Ok(true)
    }
}
