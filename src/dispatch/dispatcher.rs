//! Transfer dispatcher
//!
//! Drains the watch stream and turns create events into transfers. Each
//! event is handled on its own: nothing is remembered between events and a
//! failed transfer never stops the loop.

use log::{debug, error, info};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;

use crate::dispatch::results::DispatchResult;
use crate::dispatch::settle::wait_until_settled;
use crate::error::TransferError;
use crate::paths::resolve_parent;
use crate::registry::TransferRegistry;
use crate::transfer::TransferHandler;
use crate::watcher::{WatchItem, WatchStream};

/// Largest worker pool the dispatcher will run. The drain at shutdown
/// acquires every permit at once, which tokio counts in `u32`.
pub const MAX_WORKERS: usize = if Semaphore::MAX_PERMITS < u32::MAX as usize {
    Semaphore::MAX_PERMITS
} else {
    u32::MAX as usize
};

/// How many transfers may run at once
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchMode {
    /// One transfer at a time, in event order
    Serial,
    /// Up to `workers` transfers in flight
    Concurrent { workers: usize },
}

impl DispatchMode {
    /// Pools larger than `MAX_WORKERS` are clamped.
    pub fn from_workers(workers: usize) -> Self {
        if workers <= 1 {
            DispatchMode::Serial
        } else {
            DispatchMode::Concurrent {
                workers: workers.min(MAX_WORKERS),
            }
        }
    }
}

#[derive(Clone)]
pub struct TransferDispatcher {
    registry: Arc<TransferRegistry>,
    handler: Arc<dyn TransferHandler>,
    mode: DispatchMode,
    settle_window: Duration,
}

impl TransferDispatcher {
    pub fn new(registry: Arc<TransferRegistry>, handler: Arc<dyn TransferHandler>) -> Self {
        Self {
            registry,
            handler,
            mode: DispatchMode::Serial,
            settle_window: Duration::ZERO,
        }
    }

    pub fn with_mode(mut self, mode: DispatchMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_settle_window(mut self, window: Duration) -> Self {
        self.settle_window = window;
        self
    }

    pub fn mode(&self) -> DispatchMode {
        self.mode
    }

    pub fn registry(&self) -> &TransferRegistry {
        &self.registry
    }

    /// Handles one item of the watch stream.
    pub async fn dispatch(&self, item: WatchItem) -> DispatchResult {
        let event = match item {
            Ok(event) => event,
            Err(e) => {
                error!("Watcher error: {}", e);
                return DispatchResult::WatcherError;
            }
        };

        if !event.is_create() {
            debug!("Ignoring {:?} on {}", event.kind, event.path.display());
            return DispatchResult::Ignored(event.kind);
        }

        let dir = match resolve_parent(&event.path) {
            Ok(dir) => dir,
            Err(e) => {
                error!("Could not get config for '{}': {}", event.path.display(), e);
                return DispatchResult::Unresolved(e);
            }
        };

        let Some(rule) = self.registry.lookup(&dir) else {
            error!("Could not get config for '{}': no rule for {}", event.path.display(), dir);
            return DispatchResult::NoRule(dir);
        };

        if let Some(name) = event.path.file_name() {
            if !rule.matches(name) {
                debug!(
                    "Skipping {}: does not match '{}'",
                    event.path.display(),
                    rule.config().pattern
                );
                return DispatchResult::PatternMismatch(event.path);
            }
        }

        let config = rule.config().clone();

        if !self.settle_window.is_zero() {
            if let Err(source) = wait_until_settled(&event.path, self.settle_window).await {
                let err = TransferError::Settle {
                    path: event.path.clone(),
                    source,
                };
                error!("Transfer of '{}' failed: {}", event.path.display(), err);
                return DispatchResult::Failed(err);
            }
        }

        info!(
            "Start transfer of {} to {}:{}",
            event.path.display(),
            config.host,
            config.dst
        );

        let handler = Arc::clone(&self.handler);
        let path = event.path.clone();
        let result = tokio::task::spawn_blocking(move || handler.transfer(&config, &path))
            .await
            .unwrap_or_else(|e| Err(TransferError::Aborted(e.to_string())));

        match result {
            Ok(outcome) => {
                log_success(&event.path, outcome.source_removed);
                DispatchResult::Transferred(outcome)
            }
            Err(e) => {
                error!("Transfer of '{}' failed: {}", event.path.display(), e);
                DispatchResult::Failed(e)
            }
        }
    }

    /// Drains `events` until the stream closes.
    pub async fn run(self, mut events: WatchStream) {
        match self.mode {
            DispatchMode::Serial => {
                while let Some(item) = events.recv().await {
                    self.dispatch(item).await;
                }
            }
            DispatchMode::Concurrent { workers } => {
                let workers = workers.min(MAX_WORKERS);
                let permits = Arc::new(Semaphore::new(workers));
                while let Some(item) = events.recv().await {
                    let Ok(permit) = Arc::clone(&permits).acquire_owned().await else {
                        break;
                    };
                    let dispatcher = self.clone();
                    tokio::spawn(async move {
                        dispatcher.dispatch(item).await;
                        drop(permit);
                    });
                }
                // Wait for transfers still in flight
                let all = u32::try_from(workers).unwrap_or(u32::MAX);
                let _ = permits.acquire_many(all).await;
            }
        }
        info!("Watch stream closed");
    }
}

fn log_success(path: &Path, source_removed: bool) {
    if source_removed {
        info!("Transfer of '{}' complete", path.display());
    } else {
        info!(
            "Transfer of '{}' complete, local file left in place",
            path.display()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DuplicatePolicy, TransferConfig};
    use crate::error::WatchError;
    use crate::transfer::TransferOutcome;
    use crate::watcher::{EventKind, WatchEvent};
    use std::fs;
    use std::path::PathBuf;
    use std::sync::Mutex;
    use tempfile::{TempDir, tempdir};
    use tokio::sync::mpsc;

    /// Records every invocation instead of talking to a server
    #[derive(Default)]
    struct RecordingHandler {
        calls: Mutex<Vec<(String, PathBuf)>>,
        fail: bool,
    }

    impl RecordingHandler {
        fn calls(&self) -> Vec<(String, PathBuf)> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl TransferHandler for RecordingHandler {
        fn transfer(
            &self,
            config: &TransferConfig,
            file: &Path,
        ) -> Result<TransferOutcome, TransferError> {
            self.calls
                .lock()
                .unwrap()
                .push((config.dst.clone(), file.to_path_buf()));
            if self.fail {
                return Err(TransferError::Connect {
                    host: config.host.clone(),
                    source: std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "down"),
                });
            }
            Ok(TransferOutcome {
                bytes: 0,
                remote_path: format!("{}/x", config.dst),
                source_removed: true,
            })
        }
    }

    struct Fixture {
        _dir: TempDir,
        watched: PathBuf,
        unwatched: PathBuf,
        handler: Arc<RecordingHandler>,
        dispatcher: TransferDispatcher,
    }

    fn fixture(pattern: &str, fail: bool) -> Fixture {
        let dir = tempdir().unwrap();
        let watched = dir.path().join("in");
        let unwatched = dir.path().join("elsewhere");
        fs::create_dir(&watched).unwrap();
        fs::create_dir(&unwatched).unwrap();

        let config = TransferConfig {
            src: watched.clone(),
            dst: "/remote/out".into(),
            pattern: pattern.into(),
            host: "h:22".into(),
            user: "u".into(),
            password: "p".into(),
            copy_limit: None,
            timeout_secs: 0,
        };
        let registry = TransferRegistry::build(&[config], DuplicatePolicy::Reject).unwrap();
        let handler = Arc::new(RecordingHandler {
            fail,
            ..Default::default()
        });
        let dispatcher = TransferDispatcher::new(Arc::new(registry), handler.clone());

        Fixture {
            _dir: dir,
            watched,
            unwatched,
            handler,
            dispatcher,
        }
    }

    #[tokio::test]
    async fn test_create_event_triggers_transfer() {
        let f = fixture("", false);
        let file = f.watched.join("a.txt");

        let result = f.dispatcher.dispatch(Ok(WatchEvent::created(&file))).await;

        assert!(result.is_transferred());
        assert_eq!(f.handler.calls(), vec![("/remote/out".to_string(), file)]);
    }

    #[tokio::test]
    async fn test_write_event_is_ignored() {
        let f = fixture("", false);
        let result = f
            .dispatcher
            .dispatch(Ok(WatchEvent::written(f.watched.join("a.txt"))))
            .await;

        assert!(matches!(result, DispatchResult::Ignored(EventKind::Write)));
        assert!(f.handler.calls().is_empty());
    }

    #[tokio::test]
    async fn test_unwatched_directory_is_discarded() {
        let f = fixture("", false);
        let result = f
            .dispatcher
            .dispatch(Ok(WatchEvent::created(f.unwatched.join("a.txt"))))
            .await;

        assert!(matches!(result, DispatchResult::NoRule(_)));
        assert!(f.handler.calls().is_empty());
        assert_eq!(f.dispatcher.registry().len(), 1);
    }

    #[tokio::test]
    async fn test_unresolvable_directory_is_discarded() {
        let f = fixture("", false);
        let result = f
            .dispatcher
            .dispatch(Ok(WatchEvent::created(f.watched.join("gone").join("a.txt"))))
            .await;

        assert!(matches!(result, DispatchResult::Unresolved(_)));
        assert!(f.handler.calls().is_empty());
    }

    #[tokio::test]
    async fn test_pattern_filters_file_names() {
        let f = fixture("*.csv", false);

        let skipped = f
            .dispatcher
            .dispatch(Ok(WatchEvent::created(f.watched.join("a.txt"))))
            .await;
        let sent = f
            .dispatcher
            .dispatch(Ok(WatchEvent::created(f.watched.join("b.csv"))))
            .await;

        assert!(matches!(skipped, DispatchResult::PatternMismatch(_)));
        assert!(sent.is_transferred());
        assert_eq!(f.handler.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_watcher_error_is_reported() {
        let f = fixture("", false);
        let result = f
            .dispatcher
            .dispatch(Err(WatchError::Notify(notify::Error::generic("overflow"))))
            .await;
        assert!(matches!(result, DispatchResult::WatcherError));
    }

    #[tokio::test]
    async fn test_failure_does_not_stop_the_loop() {
        let f = fixture("", true);
        let (tx, rx) = mpsc::unbounded_channel();
        tx.send(Ok(WatchEvent::created(f.watched.join("a.txt")))).unwrap();
        tx.send(Err(WatchError::Notify(notify::Error::generic("hiccup"))))
            .unwrap();
        tx.send(Ok(WatchEvent::created(f.watched.join("b.txt")))).unwrap();
        drop(tx);

        f.dispatcher.clone().run(rx).await;

        let calls = f.handler.calls();
        assert_eq!(calls.len(), 2);
        assert!(calls[0].1.ends_with("a.txt"));
        assert!(calls[1].1.ends_with("b.txt"));
    }

    #[tokio::test]
    async fn test_concurrent_mode_handles_every_event() {
        let f = fixture("", false);
        let dispatcher = f
            .dispatcher
            .clone()
            .with_mode(DispatchMode::from_workers(3));
        assert_eq!(dispatcher.mode(), DispatchMode::Concurrent { workers: 3 });

        let (tx, rx) = mpsc::unbounded_channel();
        for i in 0..5 {
            tx.send(Ok(WatchEvent::created(f.watched.join(format!("{i}.txt")))))
                .unwrap();
        }
        tx.send(Ok(WatchEvent::written(f.watched.join("0.txt"))))
            .unwrap();
        drop(tx);

        dispatcher.run(rx).await;

        assert_eq!(f.handler.calls().len(), 5);
    }

    #[tokio::test]
    async fn test_settle_window() {
        let f = fixture("", false);
        let dispatcher = f
            .dispatcher
            .clone()
            .with_settle_window(Duration::from_millis(10));

        let present = f.watched.join("present.txt");
        fs::write(&present, b"done").unwrap();
        let sent = dispatcher.dispatch(Ok(WatchEvent::created(&present))).await;
        assert!(sent.is_transferred());

        let vanished = dispatcher
            .dispatch(Ok(WatchEvent::created(f.watched.join("vanished.txt"))))
            .await;
        assert!(matches!(
            vanished,
            DispatchResult::Failed(TransferError::Settle { .. })
        ));
        assert_eq!(f.handler.calls().len(), 1);
    }

    #[test]
    fn test_mode_from_workers() {
        assert_eq!(DispatchMode::from_workers(0), DispatchMode::Serial);
        assert_eq!(DispatchMode::from_workers(1), DispatchMode::Serial);
        assert_eq!(
            DispatchMode::from_workers(8),
            DispatchMode::Concurrent { workers: 8 }
        );
        assert_eq!(
            DispatchMode::from_workers(usize::MAX),
            DispatchMode::Concurrent {
                workers: MAX_WORKERS
            }
        );
        assert!(u32::try_from(MAX_WORKERS).is_ok());
    }

    #[tokio::test]
    async fn test_oversized_pool_still_drains() {
        let f = fixture("", false);
        let dispatcher = f.dispatcher.clone().with_mode(DispatchMode::Concurrent {
            workers: usize::MAX,
        });
        let (tx, rx) = mpsc::unbounded_channel();
        for name in ["a.txt", "b.txt"] {
            tx.send(Ok(WatchEvent::created(f.watched.join(name)))).unwrap();
        }
        drop(tx);

        dispatcher.run(rx).await;
        assert_eq!(f.handler.calls().len(), 2);
    }
}
