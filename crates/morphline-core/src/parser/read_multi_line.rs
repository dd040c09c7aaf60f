//! `readMultiLine`: one record per group of related lines
//!
//! Useful for log files where a logical entry spans several lines, such as a
//! Java stack trace:
//!
//! ```yaml
//! - readMultiLine:
//!     regex: '(^.+Exception: .+)|(^\s+at .+)|(^\s+\.\.\. \d+ more)|(^\s*Caused by:.+)'
//!     what: previous
//!     charset: UTF-8
//! ```
//!
//! `regex` must match the whole line. The anchor direction is required,
//! given either as `what` or as the boolean `previous`. A matching line
//! (or, with `negate`, a non-matching one) belongs to the group on the side
//! named by `what`:
//!
//! | match | what | action |
//! |---|---|---|
//! | yes | previous | append to the current group |
//! | yes | next | flush the current group, start a new one |
//! | no | previous | flush the current group, start a new one |
//! | no | next | append to the current group |
//!
//! The first line always starts a group and the last group is flushed at
//! end of input.

use std::io::BufRead;

use regex::Regex;
use serde_yaml::Value;

use crate::command::{Command, CommandBuilder, CommandPath};
use crate::config::Configs;
use crate::context::MorphlineContext;
use crate::error::{Error, Result};
use crate::parser::{derive_record, next_line, AttachmentParser, Parser, ParserSettings};
use crate::record::Record;
use crate::validator::{Choice, Validator};

/// Which neighbour a matching line attaches to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum What {
    /// Matching lines continue the preceding lines
    Previous,
    /// Matching lines begin a new group
    Next,
}

impl Choice for What {
    const ALL: &'static [Self] = &[What::Previous, What::Next];

    fn name(self) -> &'static str {
        match self {
            What::Previous => "previous",
            What::Next => "next",
        }
    }
}

/// Builder for `readMultiLine`
pub struct ReadMultiLineBuilder;

impl CommandBuilder for ReadMultiLineBuilder {
    fn names(&self) -> &[&'static str] {
        &["readMultiLine"]
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
        let pattern = configs.get_string("regex")?;
        let negate = configs.get_bool_or("negate", false)?;
        let what = configs.get_opt_string("what")?;
        let previous = configs.get_opt_bool("previous")?;
        configs.validate_arguments()?;

        let previous = match (what, previous) {
            (Some(_), Some(_)) => {
                return Err(Error::compilation(
                    "Parameters 'what' and 'previous' are mutually exclusive",
                    Some(config),
                ));
            }
            (Some(what), None) => Validator::validate_enum(config, &what, What::ALL)? == What::Previous,
            (None, Some(previous)) => previous,
            (None, None) => {
                return Err(Error::compilation(
                    "Missing parameter 'what' or 'previous'",
                    Some(config),
                ));
            }
        };

        let regex = Regex::new(&format!("^(?:{})$", pattern)).map_err(|e| {
            Error::compilation(format!("Invalid regex '{}': {}", pattern, e), Some(config))
        })?;

        let reader = ReadMultiLine {
            regex,
            negate,
            previous,
        };
        Ok(Box::new(Parser::new("readMultiLine", settings, parent, child, reader)))
    }
}

/// Groups lines according to a continuation pattern.
#[derive(Debug, Clone)]
pub struct ReadMultiLine {
    regex: Regex,
    negate: bool,
    previous: bool,
}

impl ReadMultiLine {
    fn is_match(&self, line: &str) -> bool {
        self.regex.is_match(line) != self.negate
    }
}

/// Whether a line extends the current group: `previous XOR !is_match`.
pub fn should_append(is_match: bool, previous: bool) -> bool {
    previous == is_match
}

fn flush(input: &Record, group: &str, child: &mut dyn Command) -> Result<bool> {
    let mut output = derive_record(input, group.to_string());
    child.process(&mut output)
}

impl AttachmentParser for ReadMultiLine {
    fn parse(
        &mut self,
        input: &Record,
        text: &mut dyn BufRead,
        child: &mut dyn Command,
    ) -> Result<bool> {
        let mut line = String::new();
        let mut group = String::new();
        let mut started = false;
        while next_line(text, &mut line)? {
            if !started {
                started = true;
                group.push_str(&line);
                continue;
            }
            if should_append(self.is_match(&line), self.previous) {
                group.push('\n');
                group.push_str(&line);
                continue;
            }
            if !group.is_empty() && !flush(input, &group, child)? {
                return Ok(false);
            }
            group.clear();
            group.push_str(&line);
        }
        if group.is_empty() {
            return Ok(true);
        }
        flush(input, &group, child)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields;
    use crate::stdlib::testing::Collector;
    use rstest::rstest;

    const STACK_TRACE: &str = r"(^.+Exception: .+)|(^\s+at .+)|(^\s+\.\.\. \d+ more)|(^\s*Caused by:.+)";

    fn build(yaml: &str, child: Collector) -> Result<Box<dyn Command>> {
        let config: Value = serde_yaml::from_str(yaml).unwrap();
        ReadMultiLineBuilder.build(&config, None, Box::new(child), &MorphlineContext::default())
    }

    fn read(yaml: &str, body: &str) -> Vec<String> {
        let collector = Collector::default();
        let mut command = build(yaml, collector.clone()).unwrap();
        let mut record = Record::new();
        record.put(fields::ATTACHMENT_BODY, body.as_bytes());
        record.put(fields::ATTACHMENT_CHARSET, "utf-8");
        assert!(command.process(&mut record).unwrap());
        collector.messages()
    }

    #[rstest]
    #[case(true, true, true)]
    #[case(true, false, false)]
    #[case(false, true, false)]
    #[case(false, false, true)]
    fn test_truth_table(#[case] is_match: bool, #[case] previous: bool, #[case] append: bool) {
        assert_eq!(should_append(is_match, previous), append);
        assert_eq!(should_append(is_match, previous), previous ^ !is_match);
    }

    #[test]
    fn test_stack_traces_grouped_with_previous() {
        let body = "2013-01-01 INFO start\n\
                    java.io.IOException: disk full\n\
                    \tat Foo.bar(Foo.java:1)\n\
                    \tat Foo.main(Foo.java:2)\n\
                    2013-01-01 INFO next";
        let yaml = format!("regex: '{}'\nwhat: previous", STACK_TRACE);
        let groups = read(&yaml, body);
        assert_eq!(
            groups,
            vec![
                "2013-01-01 INFO start\njava.io.IOException: disk full\n\tat Foo.bar(Foo.java:1)\n\tat Foo.main(Foo.java:2)",
                "2013-01-01 INFO next",
            ]
        );
    }

    #[test]
    fn test_negate_with_previous_groups_by_header() {
        let body = "[1] a\ncont\ncont\n[2] b\n[3] c\ncont";
        let groups = read("regex: '\\[\\d+\\].*'\nnegate: true\nprevious: true", body);
        assert_eq!(groups, vec!["[1] a\ncont\ncont", "[2] b", "[3] c\ncont"]);
    }

    #[test]
    fn test_regex_must_match_whole_line() {
        let groups = read("regex: 'at'\nwhat: previous", "x\nat\nflat\n");
        assert_eq!(groups, vec!["x\nat", "flat"]);
    }

    #[rstest]
    #[case("regex: 'a.*'\nwhat: previous")]
    #[case("regex: 'a.*'\nwhat: next")]
    #[case("regex: 'a.*'\nwhat: previous\nnegate: true")]
    #[case("regex: 'a.*'\nwhat: next\nnegate: true")]
    fn test_rejoining_groups_reproduces_input(#[case] yaml: &str) {
        let body = "a1\nb1\na2\na3\nb2\nb3\na4";
        assert_eq!(read(yaml, body).join("\n"), body);
    }

    #[test]
    fn test_single_line_and_empty_input() {
        assert_eq!(read("regex: 'x'\nwhat: previous", "only"), vec!["only"]);
        assert!(read("regex: 'x'\nwhat: next", "").is_empty());
    }

    #[test]
    fn test_child_rejection_aborts_scan() {
        let collector = Collector::rejecting();
        let mut command = build("regex: 'x'\nprevious: true", collector.clone()).unwrap();
        let mut record = Record::new();
        record.put(fields::ATTACHMENT_BODY, "a\nb\nc".as_bytes());
        record.put(fields::ATTACHMENT_CHARSET, "utf-8");
        assert!(!command.process(&mut record).unwrap());
        assert_eq!(collector.messages(), vec!["a"]);
    }

    #[rstest]
    #[case("what: previous")]
    #[case("regex: 'x'")]
    #[case("regex: 'x'\nwhat: sideways")]
    #[case("regex: 'x'\nwhat: next\nprevious: true")]
    #[case("regex: '('\nwhat: next")]
    fn test_invalid_configuration(#[case] yaml: &str) {
        let result = build(yaml, Collector::default());
        assert!(matches!(result, Err(Error::Compilation { .. })));
    }

    #[test]
    fn test_missing_anchor_direction_names_both_parameters() {
        let err = build("regex: 'x'", Collector::default()).err().unwrap();
        assert!(err.to_string().contains("Missing parameter 'what' or 'previous'"));
    }

    #[test]
    fn test_invalid_choice_lists_choices() {
        let err = build("regex: 'x'\nwhat: sideways", Collector::default())
            .err()
            .unwrap();
        assert!(err.to_string().contains("choose from {previous,next}"));
    }
}
