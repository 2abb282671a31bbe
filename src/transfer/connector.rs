//! Remote endpoint abstraction
//!
//! The executor only needs to open an authenticated session and create a
//! writable remote file. Dropping a session or a file releases it.

use std::io::Write;

use crate::config::TransferConfig;
use crate::error::TransferError;

pub trait Connector: Send + Sync {
    type Session: RemoteSession;

    /// Connects and authenticates against `config.host` as `config.user`,
    /// returning a ready file-transfer session.
    fn connect(&self, config: &TransferConfig) -> Result<Self::Session, TransferError>;
}

pub trait RemoteSession {
    type File: Write;

    /// Creates (or truncates) the remote file at `path` for writing.
    fn create(&mut self, path: &str) -> Result<Self::File, TransferError>;
}
