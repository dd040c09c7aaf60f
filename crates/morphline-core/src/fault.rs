//! Fault tolerance for production pipelines
//!
//! Large-scale online ingestion needs to keep making progress despite bad
//! records. Some faults are transient (network resets, timeouts at the
//! downstream sink) and the work can be retried; these are *recoverable*.
//! Everything else caused by one record should not stop the next one.
//!
//! [`FaultTolerance`] decides per fault:
//!
//! | fault | not production | production | production + ignore recoverable |
//! |---|---|---|---|
//! | fatal | raise | raise | raise |
//! | recoverable | raise | raise | log and continue |
//! | other | raise | log and continue | log and continue |
//!
//! Ignoring recoverable faults should only be enabled once a
//! misclassification has been identified.

use std::error::Error as StdError;

use crate::error::{Error, Result};
use crate::record::Record;

/// Policy deciding whether a processing fault stops the pipeline
pub trait ExceptionHandler: Send + Sync {
    /// Return `Ok(())` to swallow the fault, or an error to propagate it.
    fn handle_exception(&self, error: Error, record: &Record) -> Result<()>;
}

type Matcher = Box<dyn Fn(&(dyn StdError + 'static)) -> bool + Send + Sync>;

/// Identifies a recoverable fault anywhere in a cause chain
pub struct RecoverableSignature {
    name: String,
    matcher: Matcher,
}

impl RecoverableSignature {
    /// Match errors of concrete type `E`.
    pub fn of<E: StdError + 'static>() -> Self {
        Self {
            name: std::any::type_name::<E>().to_string(),
            matcher: Box::new(|e: &(dyn StdError + 'static)| e.is::<E>()),
        }
    }

    /// Match with an arbitrary predicate.
    pub fn new<F>(name: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&(dyn StdError + 'static)) -> bool + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            matcher: Box::new(predicate),
        }
    }

    /// Descriptive name
    pub fn name(&self) -> &str {
        &self.name
    }

    fn matches(&self, error: &(dyn StdError + 'static)) -> bool {
        (self.matcher)(error)
    }
}

impl std::fmt::Debug for RecoverableSignature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("RecoverableSignature").field(&self.name).finish()
    }
}

/// The default [`ExceptionHandler`]
#[derive(Debug)]
pub struct FaultTolerance {
    production_mode: bool,
    ignoring_recoverable: bool,
    signatures: Vec<RecoverableSignature>,
}

impl FaultTolerance {
    /// Configuration key for production mode
    pub const IS_PRODUCTION_MODE: &'static str = "isProductionMode";

    /// Configuration key for ignoring recoverable faults
    pub const IS_IGNORING_RECOVERABLE_EXCEPTIONS: &'static str = "isIgnoringRecoverableExceptions";

    /// Create a policy without any recoverable signatures.
    pub fn new(production_mode: bool, ignoring_recoverable: bool) -> Self {
        Self {
            production_mode,
            ignoring_recoverable,
            signatures: Vec::new(),
        }
    }

    /// Register a recoverable fault signature.
    pub fn with_recoverable(mut self, signature: RecoverableSignature) -> Self {
        self.signatures.push(signature);
        self
    }

    /// Whether production mode is on
    pub fn is_production_mode(&self) -> bool {
        self.production_mode
    }

    /// Whether recoverable faults are swallowed in production mode
    pub fn is_ignoring_recoverable(&self) -> bool {
        self.ignoring_recoverable
    }

    /// Whether any error in the cause chain matches a registered signature.
    pub fn is_recoverable(&self, error: &(dyn StdError + 'static)) -> bool {
        let mut current = Some(error);
        while let Some(e) = current {
            if self.signatures.iter().any(|s| s.matches(e)) {
                return true;
            }
            current = e.source();
        }
        false
    }
}

impl ExceptionHandler for FaultTolerance {
    fn handle_exception(&self, error: Error, record: &Record) -> Result<()> {
        if error.is_fatal() {
            return Err(error);
        }
        if self.production_mode {
            if !self.is_recoverable(&error) {
                tracing::warn!(
                    error = %error,
                    record = %record,
                    "Ignoring unrecoverable fault in production mode"
                );
                return Ok(());
            } else if self.ignoring_recoverable {
                tracing::warn!(
                    error = %error,
                    record = %record,
                    "Ignoring recoverable fault in production mode"
                );
                return Ok(());
            }
        }
        Err(error.into_runtime())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[derive(Debug, thiserror::Error)]
    #[error("sink unavailable")]
    struct SinkUnavailable;

    #[derive(Debug, thiserror::Error)]
    #[error("batch rejected")]
    struct BatchRejected(#[source] SinkUnavailable);

    fn policy(production: bool, ignore: bool) -> FaultTolerance {
        FaultTolerance::new(production, ignore)
            .with_recoverable(RecoverableSignature::of::<SinkUnavailable>())
    }

    fn recoverable_fault() -> Error {
        Error::runtime(BatchRejected(SinkUnavailable))
    }

    fn plain_fault() -> Error {
        Error::runtime_message("field 'x' is malformed")
    }

    #[test]
    fn test_cause_chain_is_walked() {
        let p = policy(true, false);
        assert!(p.is_recoverable(&recoverable_fault()));
        assert!(!p.is_recoverable(&plain_fault()));
    }

    #[rstest]
    // production, ignore, recoverable fault?, swallowed?
    #[case(false, false, false, false)]
    #[case(false, false, true, false)]
    #[case(false, true, false, false)]
    #[case(false, true, true, false)]
    #[case(true, false, false, true)]
    #[case(true, false, true, false)]
    #[case(true, true, false, true)]
    #[case(true, true, true, true)]
    fn test_classification(
        #[case] production: bool,
        #[case] ignore: bool,
        #[case] recoverable: bool,
        #[case] swallowed: bool,
    ) {
        let fault = if recoverable {
            recoverable_fault()
        } else {
            plain_fault()
        };
        let result = policy(production, ignore).handle_exception(fault, &Record::new());
        assert_eq!(result.is_ok(), swallowed);
    }

    #[rstest]
    #[case(false, false)]
    #[case(true, false)]
    #[case(true, true)]
    fn test_fatal_is_always_raised(#[case] production: bool, #[case] ignore: bool) {
        let fatal = Error::Fatal {
            message: "allocation failed".to_string(),
        };
        let err = policy(production, ignore)
            .handle_exception(fatal, &Record::new())
            .unwrap_err();
        assert!(err.is_fatal());
    }

    #[test]
    fn test_propagated_fault_is_runtime_kind() {
        let err = FaultTolerance::new(false, false)
            .handle_exception(
                Error::compilation("late configuration problem", None),
                &Record::new(),
            )
            .unwrap_err();
        assert!(matches!(err, Error::Runtime { .. }));
    }

    #[test]
    fn test_predicate_signature() {
        let p = FaultTolerance::new(true, false).with_recoverable(RecoverableSignature::new(
            "timeouts",
            |e| e.to_string().contains("timed out"),
        ));
        assert!(p.is_recoverable(&Error::runtime_message("request timed out")));
        assert_eq!(format!("{:?}", p.signatures[0]), "RecoverableSignature(\"timeouts\")");
    }
}
