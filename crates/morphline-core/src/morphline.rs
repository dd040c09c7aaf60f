//! The compiled morphline handle

use std::sync::Arc;

use crate::command::Command;
use crate::error::Result;
use crate::fault::ExceptionHandler;
use crate::notifications::{self, LifecycleEvent};
use crate::record::Record;

/// A compiled command tree plus the fault policy that guards it.
///
/// A handle owns its private tree and is meant to be driven by a single
/// worker; compile once per worker to scale out.
pub struct Morphline {
    id: Option<String>,
    root: Box<dyn Command>,
    exception_handler: Arc<dyn ExceptionHandler>,
}

impl Morphline {
    /// Wrap a root command.
    pub fn new(
        id: Option<String>,
        root: Box<dyn Command>,
        exception_handler: Arc<dyn ExceptionHandler>,
    ) -> Self {
        Self {
            id,
            root,
            exception_handler,
        }
    }

    /// Identifier of the selected morphline, if it declared one
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// The root command
    pub fn root(&mut self) -> &mut dyn Command {
        self.root.as_mut()
    }

    /// Process one record.
    ///
    /// Faults are handed to the exception handler; a swallowed fault yields
    /// `Ok(false)` since the record did not make it through.
    pub fn process(&mut self, record: &mut Record) -> Result<bool> {
        match self.root.process(record) {
            Ok(accepted) => Ok(accepted),
            Err(error) => {
                self.exception_handler.handle_exception(error, record)?;
                Ok(false)
            }
        }
    }

    /// Broadcast a notification to the whole tree.
    pub fn notify(&mut self, notification: &Record) -> Result<()> {
        self.root.notify(notification)
    }

    fn notify_event(&mut self, event: LifecycleEvent) -> Result<()> {
        notifications::notify_event(self.root.as_mut(), event)
    }

    /// Send `START_SESSION`.
    pub fn start_session(&mut self) -> Result<()> {
        self.notify_event(LifecycleEvent::StartSession)
    }

    /// Send `BEGIN_TRANSACTION`.
    pub fn begin_transaction(&mut self) -> Result<()> {
        self.notify_event(LifecycleEvent::BeginTransaction)
    }

    /// Send `COMMIT_TRANSACTION`.
    pub fn commit_transaction(&mut self) -> Result<()> {
        self.notify_event(LifecycleEvent::CommitTransaction)
    }

    /// Send `ROLLBACK_TRANSACTION`.
    pub fn rollback_transaction(&mut self) -> Result<()> {
        self.notify_event(LifecycleEvent::RollbackTransaction)
    }

    /// Send `SHUTDOWN`.
    pub fn shutdown(&mut self) -> Result<()> {
        self.notify_event(LifecycleEvent::Shutdown)
    }
}

impl std::fmt::Debug for Morphline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Morphline")
            .field("id", &self.id)
            .field("root", &self.root.name())
            .finish()
    }
}
