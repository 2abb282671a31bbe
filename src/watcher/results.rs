//! Watcher result types

use std::path::PathBuf;

use crate::error::WatchError;

/// Outcome of registering a set of directories
#[derive(Debug, Default)]
pub struct SubscribeResult {
    pub watched: Vec<PathBuf>,
    pub failed: Vec<(PathBuf, WatchError)>,
}

impl SubscribeResult {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}
