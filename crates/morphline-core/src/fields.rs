//! Reserved record field names

/// Unique record identifier
pub const ID: &str = "id";

/// Textual payload produced by parsers
pub const MESSAGE: &str = "message";

/// Raw attachment payload: bytes, text or a one-shot stream
pub const ATTACHMENT_BODY: &str = "_attachment_body";

/// MIME type of the attachment, e.g. `text/plain`
pub const ATTACHMENT_MIME_TYPE: &str = "_attachment_mimetype";

/// Charset of the attachment, e.g. `UTF-8`
pub const ATTACHMENT_CHARSET: &str = "_attachment_charset";

/// Name of the attachment, typically a file name
pub const ATTACHMENT_NAME: &str = "_attachment_name";

/// All attachment fields; cleared whenever a stage materialises a new message
pub const ATTACHMENT_FIELDS: [&str; 4] = [
    ATTACHMENT_BODY,
    ATTACHMENT_MIME_TYPE,
    ATTACHMENT_CHARSET,
    ATTACHMENT_NAME,
];
