//! Directory watcher
//!
//! Bridges `notify` callbacks, which run on the watcher's own thread, into a
//! tokio channel drained by the dispatcher. The stream stays open for as long
//! as the `DirectoryWatcher` is alive.

use log::{error, info};
use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;

use crate::error::WatchError;
use crate::watcher::events::WatchEvent;
use crate::watcher::results::SubscribeResult;

/// Items delivered to the dispatcher
pub type WatchItem = Result<WatchEvent, WatchError>;

pub type WatchStream = mpsc::UnboundedReceiver<WatchItem>;

pub struct DirectoryWatcher {
    inner: RecommendedWatcher,
}

impl DirectoryWatcher {
    /// Creates the OS watcher and the stream its notifications feed.
    pub fn new() -> Result<(Self, WatchStream), WatchError> {
        let (tx, rx) = mpsc::unbounded_channel();

        let inner = notify::recommended_watcher(move |res: notify::Result<notify::Event>| {
            match res {
                Ok(event) => {
                    for watch_event in WatchEvent::from_notify(event) {
                        // Receiver gone means shutdown
                        if tx.send(Ok(watch_event)).is_err() {
                            return;
                        }
                    }
                }
                Err(e) => {
                    let _ = tx.send(Err(WatchError::Notify(e)));
                }
            }
        })
        .map_err(WatchError::Init)?;

        Ok((Self { inner }, rx))
    }

    /// Registers one directory, non-recursively.
    pub fn watch(&mut self, dir: &Path) -> Result<(), WatchError> {
        self.inner
            .watch(dir, RecursiveMode::NonRecursive)
            .map_err(|source| WatchError::Subscribe {
                path: dir.to_path_buf(),
                source,
            })
    }

    /// Registers every directory. A failure is logged and recorded, and the
    /// remaining directories are still registered.
    pub fn subscribe<I, P>(&mut self, dirs: I) -> SubscribeResult
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut result = SubscribeResult::default();

        for dir in dirs {
            let dir = dir.as_ref();
            match self.watch(dir) {
                Ok(()) => {
                    info!("Watching {}", dir.display());
                    result.watched.push(PathBuf::from(dir));
                }
                Err(e) => {
                    error!(
                        "Failed to initialize directory watcher on '{}': {}",
                        dir.display(),
                        e
                    );
                    result.failed.push((PathBuf::from(dir), e));
                }
            }
        }

        result
    }
}
