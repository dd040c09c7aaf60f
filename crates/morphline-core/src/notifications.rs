//! Control-plane lifecycle notifications
//!
//! A notification is an ordinary [`Record`] whose `lifecycle` field carries
//! one or more [`LifecycleEvent`]s. It travels through [`Command::notify`],
//! never through `process`.

use std::fmt;
use std::str::FromStr;

use crate::command::Command;
use crate::error::{Error, Result};
use crate::record::Record;
use crate::value::Value;

/// Field carrying lifecycle events on a notification record
pub const LIFECYCLE: &str = "lifecycle";

/// Lifecycle signals broadcast to a command tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleEvent {
    /// A new processing session starts
    StartSession,
    /// A unit of work starts
    BeginTransaction,
    /// The current unit of work succeeded
    CommitTransaction,
    /// The current unit of work failed
    RollbackTransaction,
    /// The tree is about to be discarded
    Shutdown,
}

impl LifecycleEvent {
    /// Wire name of the event
    pub fn as_str(self) -> &'static str {
        match self {
            LifecycleEvent::StartSession => "START_SESSION",
            LifecycleEvent::BeginTransaction => "BEGIN_TRANSACTION",
            LifecycleEvent::CommitTransaction => "COMMIT_TRANSACTION",
            LifecycleEvent::RollbackTransaction => "ROLLBACK_TRANSACTION",
            LifecycleEvent::Shutdown => "SHUTDOWN",
        }
    }
}

impl fmt::Display for LifecycleEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LifecycleEvent {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "START_SESSION" => Ok(LifecycleEvent::StartSession),
            "BEGIN_TRANSACTION" => Ok(LifecycleEvent::BeginTransaction),
            "COMMIT_TRANSACTION" => Ok(LifecycleEvent::CommitTransaction),
            "ROLLBACK_TRANSACTION" => Ok(LifecycleEvent::RollbackTransaction),
            "SHUTDOWN" => Ok(LifecycleEvent::Shutdown),
            other => Err(Error::runtime_message(format!(
                "Unknown lifecycle event: {}",
                other
            ))),
        }
    }
}

/// Build a notification record carrying a single event.
pub fn notification(event: LifecycleEvent) -> Record {
    let mut record = Record::new();
    record.put(LIFECYCLE, event.as_str());
    record
}

/// Events carried by a notification, in order. Unknown values are skipped.
pub fn lifecycle_events(notification: &Record) -> Vec<LifecycleEvent> {
    notification
        .get(LIFECYCLE)
        .iter()
        .filter_map(Value::as_str)
        .filter_map(|s| s.parse().ok())
        .collect()
}

/// Whether the notification carries the given event.
pub fn contains_lifecycle_event(notification: &Record, event: LifecycleEvent) -> bool {
    lifecycle_events(notification).contains(&event)
}

/// Send a single-event notification to a command.
pub fn notify_event(command: &mut dyn Command, event: LifecycleEvent) -> Result<()> {
    command.notify(&notification(event))
}

/// Send `START_SESSION`.
pub fn notify_start_session(command: &mut dyn Command) -> Result<()> {
    notify_event(command, LifecycleEvent::StartSession)
}

/// Send `BEGIN_TRANSACTION`.
pub fn notify_begin_transaction(command: &mut dyn Command) -> Result<()> {
    notify_event(command, LifecycleEvent::BeginTransaction)
}

/// Send `COMMIT_TRANSACTION`.
pub fn notify_commit_transaction(command: &mut dyn Command) -> Result<()> {
    notify_event(command, LifecycleEvent::CommitTransaction)
}

/// Send `ROLLBACK_TRANSACTION`.
pub fn notify_rollback_transaction(command: &mut dyn Command) -> Result<()> {
    notify_event(command, LifecycleEvent::RollbackTransaction)
}

/// Send `SHUTDOWN`.
pub fn notify_shutdown(command: &mut dyn Command) -> Result<()> {
    notify_event(command, LifecycleEvent::Shutdown)
}
