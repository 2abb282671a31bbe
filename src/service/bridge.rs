//! Service bridge
//!
//! Builds the registry, watcher and dispatcher from the loaded configuration
//! and runs them until shutdown.

use log::{error, info, warn};
use std::future::Future;
use std::sync::Arc;

use crate::config::AppConfig;
use crate::dispatch::{DispatchMode, TransferDispatcher};
use crate::error::AppError;
use crate::registry::TransferRegistry;
use crate::transfer::{SshConnector, TransferExecutor, TransferHandler};
use crate::watcher::{DirectoryWatcher, SubscribeResult, WatchStream};

/// Owns the watcher, its event stream and the dispatcher for the lifetime of
/// the process.
pub struct Service {
    watcher: DirectoryWatcher,
    events: WatchStream,
    dispatcher: TransferDispatcher,
    subscriptions: SubscribeResult,
}

impl Service {
    /// Builds the service with the SFTP executor.
    pub fn new(config: &AppConfig) -> Result<Self, AppError> {
        Self::with_handler(config, Arc::new(TransferExecutor::new(SshConnector)))
    }

    /// Builds the registry, starts watching every source directory and wires
    /// the dispatcher to `handler`.
    ///
    /// Registry and watcher initialisation failures are fatal. A directory
    /// that cannot be watched is only logged.
    pub fn with_handler(
        config: &AppConfig,
        handler: Arc<dyn TransferHandler>,
    ) -> Result<Self, AppError> {
        let registry = Arc::new(TransferRegistry::build(
            &config.transfers,
            config.dispatch.on_duplicate_source,
        )?);

        if registry.is_empty() {
            warn!("No transfers configured, nothing will be sent");
        }

        let (mut watcher, events) = DirectoryWatcher::new()?;
        let subscriptions = watcher.subscribe(registry.sources());

        let dispatcher = TransferDispatcher::new(registry, handler)
            .with_mode(DispatchMode::from_workers(config.dispatch.workers))
            .with_settle_window(config.dispatch.settle_window());

        Ok(Self {
            watcher,
            events,
            dispatcher,
            subscriptions,
        })
    }

    pub fn subscriptions(&self) -> &SubscribeResult {
        &self.subscriptions
    }

    /// Runs until ctrl-c is received or the watch stream ends.
    pub async fn run(self) {
        self.run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("Failed to listen for shutdown signal: {}", e);
                std::future::pending::<()>().await;
            }
        })
        .await;
    }

    /// Runs until `shutdown` completes or the watch stream ends.
    pub async fn run_until<F>(self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        let Service {
            watcher,
            events,
            dispatcher,
            subscriptions,
        } = self;

        info!(
            "Watching {} of {} directories ({:?})",
            subscriptions.watched.len(),
            subscriptions.watched.len() + subscriptions.failed.len(),
            dispatcher.mode()
        );

        tokio::select! {
            _ = dispatcher.run(events) => warn!("Watcher stopped delivering events"),
            _ = shutdown => info!("Shutdown requested"),
        }

        drop(watcher);
        info!("Stopping fmufer");
    }
}
