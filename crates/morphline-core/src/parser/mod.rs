//! Attachment parsers
//!
//! A parsing stage turns the attachment carried by a record into zero or
//! more derived records. [`Parser`] implements the shared contract and
//! delegates the format-specific part to an [`AttachmentParser`]:
//!
//! 1. reject the record if it carries no attachment body
//! 2. reject it if `supportedMimeTypes` is configured and the attachment's
//!    MIME type matches none of the patterns
//! 3. resolve the charset (configured value first, then the record's
//!    `_attachment_charset`); fail if neither is present
//! 4. open and decode the attachment and hand it to the format parser
//!
//! The attachment stream is owned by the `process` call that opened it and
//! is dropped before that call returns.

pub mod read_line;
pub mod read_multi_line;

use std::collections::HashSet;
use std::io::{BufRead, BufReader, Cursor, Read};

use encoding_rs::Encoding;
use encoding_rs_io::DecodeReaderBytesBuilder;

use crate::command::{Command, CommandCore, CommandPath};
use crate::config::Configs;
use crate::error::{Error, Result};
use crate::fields;
use crate::media_type::MediaType;
use crate::record::Record;
use crate::value::Value;

/// Parameter restricting the accepted MIME types
pub const SUPPORTED_MIME_TYPES: &str = "supportedMimeTypes";

/// Parameter naming the attachment charset
pub const CHARSET: &str = "charset";

/// Format-specific half of a parsing stage
pub trait AttachmentParser: Send {
    /// Parse the decoded attachment of `input`, pushing derived records to
    /// `child`. Return `Ok(false)` as soon as the child rejects a record.
    fn parse(
        &mut self,
        input: &Record,
        text: &mut dyn BufRead,
        child: &mut dyn Command,
    ) -> Result<bool>;
}

/// Parameters shared by every parsing stage
#[derive(Debug, Clone, Default)]
pub struct ParserSettings {
    charset: Option<String>,
    supported_mime_types: Option<HashSet<MediaType>>,
}

impl ParserSettings {
    /// Read `charset` and `supportedMimeTypes`.
    pub fn from_configs(configs: &mut Configs<'_>) -> Result<Self> {
        let charset = configs.get_opt_string(CHARSET)?;
        let patterns = configs.get_string_list(SUPPORTED_MIME_TYPES)?;
        let supported_mime_types = if !patterns.is_empty() {
            let mut set = HashSet::with_capacity(patterns.len());
            for pattern in patterns {
                let media = MediaType::parse(&pattern)
                    .map_err(|e| Error::compilation(e.to_string(), Some(configs.config())))?;
                set.insert(media);
            }
            Some(set)
        } else {
            None
        };
        Ok(Self {
            charset,
            supported_mime_types,
        })
    }

    /// Configured charset, if any
    pub fn charset(&self) -> Option<&str> {
        self.charset.as_deref()
    }

    /// Whether the record's MIME type passes the configured patterns. No
    /// patterns, or an empty pattern list, means every type is accepted.
    pub fn is_mime_type_supported(&self, record: &Record) -> bool {
        let Some(supported) = &self.supported_mime_types else {
            return true;
        };
        let Some(raw) = record.first_str(fields::ATTACHMENT_MIME_TYPE) else {
            tracing::debug!(record = %record, "Missing MIME type for record");
            return false;
        };
        let media = match MediaType::parse(raw) {
            Ok(media) => media,
            Err(e) => {
                tracing::debug!(error = %e, "Unparseable MIME type");
                return false;
            }
        };
        if supported.contains(&media) || supported.iter().any(|range| media.matches(range)) {
            return true;
        }
        tracing::debug!(
            "No supported MIME type found for {}={}",
            fields::ATTACHMENT_MIME_TYPE,
            raw
        );
        false
    }

    /// Configured charset, else the record's charset.
    pub fn detect_charset<'r>(&'r self, record: &'r Record) -> Result<&'r str> {
        self.charset
            .as_deref()
            .or_else(|| record.first_str(fields::ATTACHMENT_CHARSET))
            .ok_or_else(|| Error::runtime_message(format!("Missing charset for record: {}", record)))
    }
}

/// A parsing stage: the shared contract around an [`AttachmentParser`]
pub struct Parser<P> {
    core: CommandCore,
    settings: ParserSettings,
    parser: P,
}

impl<P: AttachmentParser> Parser<P> {
    /// Create a stage named `name`.
    pub fn new(
        name: &str,
        settings: ParserSettings,
        parent: Option<&CommandPath>,
        child: Box<dyn Command>,
        parser: P,
    ) -> Self {
        Self {
            core: CommandCore::new(name, parent, child),
            settings,
            parser,
        }
    }
}

impl<P: AttachmentParser> Command for Parser<P> {
    fn name(&self) -> &str {
        self.core.name()
    }

    fn parent(&self) -> Option<&CommandPath> {
        self.core.parent()
    }

    fn process(&mut self, record: &mut Record) -> Result<bool> {
        let Some(body) = record.first_value(fields::ATTACHMENT_BODY) else {
            tracing::debug!(record = %record, "Missing attachment for record");
            return Ok(false);
        };
        if !self.settings.is_mime_type_supported(record) {
            return Ok(false);
        }
        let charset = self.settings.detect_charset(record)?;
        let stream = open_attachment(body)?;
        let mut text = decode(stream, charset)?;
        self.parser.parse(record, &mut text, self.core.child())
    }

    fn notify(&mut self, notification: &Record) -> Result<()> {
        self.core.forward_notify(notification)
    }
}

/// Open an attachment body as a byte stream. One-shot streams can only be
/// opened once.
pub fn open_attachment(body: &Value) -> Result<Box<dyn Read + Send>> {
    match body {
        Value::Bytes(bytes) => Ok(Box::new(Cursor::new(bytes.clone()))),
        Value::Text(text) => Ok(Box::new(Cursor::new(text.clone().into_bytes()))),
        Value::Stream(stream) => stream
            .take()
            .ok_or_else(|| Error::runtime_message("Attachment stream has already been consumed")),
        other => Err(Error::runtime_message(format!(
            "Unsupported attachment body: {}",
            other
        ))),
    }
}

/// Wrap a byte stream in a line-oriented decoder for `charset`, a WHATWG
/// encoding label such as `utf-8` or `iso-8859-1`.
pub fn decode(stream: Box<dyn Read + Send>, charset: &str) -> Result<Box<dyn BufRead + Send>> {
    let encoding = Encoding::for_label(charset.trim().as_bytes())
        .ok_or_else(|| Error::runtime_message(format!("Unsupported charset: {}", charset)))?;
    let decoder = DecodeReaderBytesBuilder::new()
        .encoding(Some(encoding))
        .build(stream);
    Ok(Box::new(BufReader::new(decoder)))
}

/// Copy of `input` without attachment fields, carrying `message`.
pub fn derive_record(input: &Record, message: String) -> Record {
    let mut output = input.clone();
    output.remove_attachments();
    output.replace_values(fields::MESSAGE, message);
    output
}

/// Read the next line without its terminator. I/O faults become runtime
/// errors.
pub(crate) fn next_line(text: &mut dyn BufRead, line: &mut String) -> Result<bool> {
    line.clear();
    let read = text.read_line(line).map_err(Error::runtime)?;
    if read == 0 {
        return Ok(false);
    }
    if line.ends_with('\n') {
        line.pop();
        if line.ends_with('\r') {
            line.pop();
        }
    }
    Ok(true)
}
