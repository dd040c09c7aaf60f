//! Builtin general-purpose commands
//!
//! - `pipe`: runs a nested list of commands; every compiled morphline root
//! - `drop` / `dropRecord`: terminal stage that accepts and discards
//! - `not`: inverts the result of one nested command
//! - `generateUUID`: assigns a random identifier
//! - `logTrace` .. `logError`: formatted logging of field expressions
//! - `loadDocuments`: hands records to the embedder's document loader

pub mod drop;
pub mod generate_uuid;
pub mod load_documents;
pub mod log;
pub mod not;
pub mod pipe;
