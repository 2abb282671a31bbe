//! Error types
//!
//! Defines domain-specific error types for each module of the bridge.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Path resolution errors
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("Cannot make {path:?} absolute: {source}")]
    Absolute {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Cannot resolve {path:?}: {source}")]
    Canonicalize {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Path {0:?} has no parent directory")]
    NoParent(PathBuf),
}

/// Transfer registry errors
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Unresolvable source directory: {0}")]
    Resolve(#[from] ResolveError),
    #[error("Source directory {path:?} is configured twice (rules {first} and {second})")]
    DuplicateSource {
        path: PathBuf,
        first: usize,
        second: usize,
    },
    #[error("Invalid file pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },
}

/// Directory watcher errors
#[derive(Debug, Error)]
pub enum WatchError {
    #[error("Failed to initialize directory watcher: {0}")]
    Init(#[source] notify::Error),
    #[error("Failed to watch {path:?}: {source}")]
    Subscribe {
        path: PathBuf,
        #[source]
        source: notify::Error,
    },
    #[error("Watcher error: {0}")]
    Notify(#[from] notify::Error),
}

/// Transfer errors, one variant per step of a single upload
#[derive(Debug, Error)]
pub enum TransferError {
    #[error("Source {0:?} has no file name")]
    InvalidSource(PathBuf),
    #[error("Connection to {host} failed: {source}")]
    Connect {
        host: String,
        #[source]
        source: io::Error,
    },
    #[error("Authentication as {user}@{host} failed: {source}")]
    Auth {
        user: String,
        host: String,
        #[source]
        source: io::Error,
    },
    #[error("Failed to open SFTP session on {host}: {source}")]
    Session {
        host: String,
        #[source]
        source: io::Error,
    },
    #[error("Failed to create remote file {path}: {source}")]
    RemoteCreate {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("Failed to open source file {path:?}: {source}")]
    LocalOpen {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Copy of {path:?} failed: {source}")]
    Copy {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Source file {path:?} did not settle: {source}")]
    Settle {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Transfer worker aborted: {0}")]
    Aborted(String),
}

/// Top-level error that encompasses all fatal startup errors
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),
    #[error("Watcher error: {0}")]
    Watch(#[from] WatchError),
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}
