//! Configuration management for fmufer
//!
//! Transfer rules come from a YAML file (other formats by extension) with
//! environment overrides for the dispatch settings.

use config::{Config, Environment, File};
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::dispatch::MAX_WORKERS;

/// Default configuration file, relative to the working directory
pub const DEFAULT_CONFIG_FILE: &str = "fmufer.yml";

/// Byte cap applied to a copy when a rule sets none. `None` copies the
/// whole file.
pub const DEFAULT_COPY_LIMIT: Option<u64> = None;

/// Complete application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    /// Watch-to-destination rules, in file order
    #[serde(default)]
    pub transfers: Vec<TransferConfig>,

    #[serde(default)]
    pub dispatch: DispatchConfig,
}

/// One watch-to-destination rule. Immutable after loading.
#[derive(Deserialize, Clone, PartialEq, Eq)]
pub struct TransferConfig {
    /// Local directory to watch
    pub src: PathBuf,

    /// Remote directory receiving the files
    pub dst: String,

    /// Glob matched against the created file's name; empty matches everything
    #[serde(default)]
    pub pattern: String,

    /// Remote SSH endpoint as `host:port` (port 22 when omitted)
    pub host: String,

    pub user: String,

    pub password: String,

    /// Maximum number of bytes copied per file
    #[serde(default = "default_copy_limit")]
    pub copy_limit: Option<u64>,

    /// Timeout for blocking SSH operations, 0 disables it
    #[serde(default)]
    pub timeout_secs: u64,
}

// Credentials stay out of logs.
impl fmt::Debug for TransferConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransferConfig")
            .field("src", &self.src)
            .field("dst", &self.dst)
            .field("pattern", &self.pattern)
            .field("host", &self.host)
            .field("user", &self.user)
            .field("password", &"********")
            .field("copy_limit", &self.copy_limit)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// How watch events are turned into transfers
#[derive(Debug, Deserialize, Clone)]
pub struct DispatchConfig {
    /// Transfers allowed in flight; 1 keeps dispatch serial
    /// Environment: FMUFER_DISPATCH__WORKERS
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Time a file's size must stay unchanged before it is sent, 0 sends on create
    /// Environment: FMUFER_DISPATCH__SETTLE_MS
    #[serde(default)]
    pub settle_ms: u64,

    #[serde(default)]
    pub on_duplicate_source: DuplicatePolicy,
}

/// What to do when two rules resolve to the same source directory
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum DuplicatePolicy {
    /// Refuse to start
    #[default]
    Reject,
    /// Keep the rule listed last
    Overwrite,
}

fn default_copy_limit() -> Option<u64> {
    DEFAULT_COPY_LIMIT
}

fn default_workers() -> usize {
    1
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            settle_ms: 0,
            on_duplicate_source: DuplicatePolicy::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from `path` with environment overrides
    pub fn load(path: &Path) -> Result<Self, config::ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path))
            .add_source(
                Environment::with_prefix("FMUFER")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        let config: AppConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validation for all configuration values
    pub fn validate(&self) -> Result<(), config::ConfigError> {
        for (index, transfer) in self.transfers.iter().enumerate() {
            transfer.validate().map_err(|msg| {
                config::ConfigError::Message(format!("transfers[{index}]: {msg}"))
            })?;
        }

        if self.dispatch.workers == 0 {
            return Err(config::ConfigError::Message(
                "dispatch.workers must be greater than 0".into(),
            ));
        }

        if self.dispatch.workers > MAX_WORKERS {
            return Err(config::ConfigError::Message(format!(
                "dispatch.workers must be at most {MAX_WORKERS}"
            )));
        }

        Ok(())
    }
}

impl TransferConfig {
    fn validate(&self) -> Result<(), String> {
        if self.src.as_os_str().is_empty() {
            return Err("src cannot be empty".into());
        }

        if self.dst.is_empty() {
            return Err("dst cannot be empty".into());
        }

        if self.host.is_empty() {
            return Err("host cannot be empty".into());
        }

        if self.user.is_empty() {
            return Err("user cannot be empty".into());
        }

        if self.copy_limit == Some(0) {
            return Err("copy_limit must be greater than 0".into());
        }

        if !self.pattern.is_empty() {
            glob::Pattern::new(&self.pattern)
                .map_err(|e| format!("invalid pattern '{}': {}", self.pattern, e))?;
        }

        Ok(())
    }

    /// SSH operation timeout, if any
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }
}

impl DispatchConfig {
    pub fn settle_window(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }
}
