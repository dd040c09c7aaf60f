//! Error types for morphline-core

use thiserror::Error;

/// Result type alias for morphline-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Boxed cause carried by runtime faults
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can occur while compiling or running a morphline
#[derive(Error, Debug)]
pub enum Error {
    /// Structural or configuration problem found while building the command tree
    #[error("{message}{}", near(.config))]
    Compilation {
        /// Description of the problem
        message: String,
        /// Offending configuration fragment, rendered as YAML
        config: Option<String>,
    },

    /// Malformed document syntax
    #[error("failed to parse morphline document: {0}")]
    Parsing(#[from] serde_yaml::Error),

    /// Morphline document could not be found
    #[error("morphline document not found: {path}")]
    DocumentNotFound {
        /// Path that was searched
        path: String,
    },

    /// IO error while reading a document
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Fault raised while processing a record
    #[error("{message}")]
    Runtime {
        /// Description of the fault
        message: String,
        /// Underlying cause, if any
        #[source]
        source: Option<BoxError>,
    },

    /// Unrecoverable fault; never swallowed by fault tolerance
    #[error("fatal: {message}")]
    Fatal {
        /// Description of the fault
        message: String,
    },
}

fn near(config: &Option<String>) -> String {
    match config {
        Some(fragment) => format!(" near: {}", fragment.trim_end()),
        None => String::new(),
    }
}

impl Error {
    /// Compilation error with the offending configuration fragment attached.
    pub fn compilation(message: impl Into<String>, config: Option<&serde_yaml::Value>) -> Self {
        Error::Compilation {
            message: message.into(),
            config: config.and_then(|c| serde_yaml::to_string(c).ok()),
        }
    }

    /// Runtime fault without an underlying cause.
    pub fn runtime_message(message: impl Into<String>) -> Self {
        Error::Runtime {
            message: message.into(),
            source: None,
        }
    }

    /// Wraps any error into the runtime fault kind, unless it already is one.
    pub fn runtime<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        let boxed: BoxError = Box::new(error);
        match boxed.downcast::<Error>() {
            Ok(error) => (*error).into_runtime(),
            Err(other) => Error::Runtime {
                message: other.to_string(),
                source: Some(other),
            },
        }
    }

    /// Converts this error into the runtime kind; fatal faults stay fatal.
    pub fn into_runtime(self) -> Self {
        match self {
            Error::Runtime { .. } | Error::Fatal { .. } => self,
            other => Error::Runtime {
                message: other.to_string(),
                source: Some(Box::new(other)),
            },
        }
    }

    /// Whether this is an unrecoverable fault.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::Fatal { .. })
    }
}
