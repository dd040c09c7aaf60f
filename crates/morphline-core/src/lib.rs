//! Morphline Core Library
//!
//! An embeddable, configuration-driven ETL interpreter. A morphline document
//! declares one or more pipelines; the compiler turns one of them into a tree
//! of [`Command`]s, and the embedding application streams records through it:
//!
//! - Record model with multi-valued fields and attachment payloads
//! - Field expressions for per-record argument resolution
//! - Command tree compiler with an explicit builder registry
//! - Attachment parsers (`readLine`, `readMultiLine`)
//! - Fault tolerance policy for production mode
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌──────────────────────────┐
//! │  Document   │────▶│  Compiler   │────▶│ pipe → cmd → … → drop    │
//! │   (YAML)    │     │ (registry)  │     │   process() / notify()   │
//! └─────────────┘     └─────────────┘     └──────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use morphline_core::{Compiler, MorphlineContext, Record};
//!
//! let context = MorphlineContext::default();
//! let mut morphline = Compiler::new().compile_file("morphline.yaml", None, &context, &[])?;
//!
//! let mut record = Record::new();
//! record.put("message", "hello");
//! assert!(morphline.process(&mut record)?);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod command;
pub mod compiler;
pub mod config;
pub mod context;
pub mod error;
pub mod expression;
pub mod fault;
pub mod fields;
pub mod loader;
pub mod media_type;
pub mod morphline;
pub mod notifications;
pub mod parser;
pub mod record;
pub mod registry;
pub mod stdlib;
pub mod validator;
pub mod value;

pub use command::{Command, CommandBuilder, CommandCore, CommandPath};
pub use compiler::Compiler;
pub use config::{Configs, Document, PipelineConfig};
pub use context::MorphlineContext;
pub use error::{Error, Result};
pub use expression::FieldExpression;
pub use fault::{ExceptionHandler, FaultTolerance, RecoverableSignature};
pub use loader::{DocumentLoader, SinkLocator};
pub use media_type::MediaType;
pub use morphline::Morphline;
pub use notifications::LifecycleEvent;
pub use record::Record;
pub use registry::CommandRegistry;
pub use validator::{Choice, Validator};
pub use value::{SharedStream, Value};
