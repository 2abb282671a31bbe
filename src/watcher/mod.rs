//! Filesystem watching
//!
//! Turns OS change notifications for the configured source directories into
//! a stream of typed watch events.

pub mod directory;
pub mod events;
pub mod results;

pub use directory::{DirectoryWatcher, WatchItem, WatchStream};
pub use events::{EventKind, WatchEvent};
pub use results::SubscribeResult;
