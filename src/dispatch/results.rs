//! Dispatch result types

use std::path::PathBuf;

use crate::error::{ResolveError, TransferError};
use crate::paths::CanonicalPath;
use crate::transfer::TransferOutcome;
use crate::watcher::EventKind;

/// What the dispatcher did with one item of the watch stream
#[derive(Debug)]
pub enum DispatchResult {
    /// The watcher reported an error; nothing was dispatched
    WatcherError,
    /// Not a create event
    Ignored(EventKind),
    /// The directory of the created file could not be resolved
    Unresolved(ResolveError),
    /// No rule is registered for this directory
    NoRule(CanonicalPath),
    /// The rule's pattern does not select this file
    PatternMismatch(PathBuf),
    Transferred(TransferOutcome),
    Failed(TransferError),
}

impl DispatchResult {
    pub fn is_transferred(&self) -> bool {
        matches!(self, DispatchResult::Transferred(_))
    }
}
