//! Transfer executor
//!
//! Performs one outbound transfer: connect, create the remote file, copy the
//! local bytes, then delete the local file. Every step that fails aborts the
//! rest; handles acquired so far are released when they go out of scope.

use log::{info, warn};
use std::ffi::OsStr;
use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::Path;

use crate::config::TransferConfig;
use crate::error::TransferError;
use crate::transfer::connector::{Connector, RemoteSession};
use crate::transfer::results::TransferOutcome;

/// What the dispatcher invokes for each matched file. Implementations block.
pub trait TransferHandler: Send + Sync {
    fn transfer(
        &self,
        config: &TransferConfig,
        file: &Path,
    ) -> Result<TransferOutcome, TransferError>;
}

pub struct TransferExecutor<C> {
    connector: C,
}

impl<C: Connector> TransferExecutor<C> {
    pub fn new(connector: C) -> Self {
        Self { connector }
    }
}

impl<C: Connector> TransferHandler for TransferExecutor<C> {
    fn transfer(
        &self,
        config: &TransferConfig,
        file: &Path,
    ) -> Result<TransferOutcome, TransferError> {
        let name = file
            .file_name()
            .ok_or_else(|| TransferError::InvalidSource(file.to_path_buf()))?;

        let mut session = self.connector.connect(config)?;

        let remote_path = remote_path(&config.dst, name);
        let mut remote = session.create(&remote_path)?;

        let local = File::open(file).map_err(|source| TransferError::LocalOpen {
            path: file.to_path_buf(),
            source,
        })?;

        let copy_err = |source: io::Error| TransferError::Copy {
            path: file.to_path_buf(),
            source,
        };
        // `local` is consumed and closed by the copy
        let bytes = copy_limited(local, &mut remote, config.copy_limit).map_err(copy_err)?;
        remote.flush().map_err(copy_err)?;
        drop(remote);
        drop(session);

        info!(
            "Successfully written {} bytes from {} to {}:{}",
            bytes,
            file.display(),
            config.host,
            remote_path
        );

        let source_removed = match fs::remove_file(file) {
            Ok(()) => true,
            Err(e) => {
                warn!("Could not delete {}: {}", file.display(), e);
                false
            }
        };

        Ok(TransferOutcome {
            bytes,
            remote_path,
            source_removed,
        })
    }
}

/// Joins the remote directory and a file name with POSIX separators.
pub fn remote_path(dst: &str, name: &OsStr) -> String {
    let name = name.to_string_lossy();
    if dst.is_empty() {
        return name.into_owned();
    }
    format!("{}/{}", dst.trim_end_matches('/'), name)
}

fn copy_limited<W: Write>(local: File, remote: &mut W, limit: Option<u64>) -> io::Result<u64> {
    match limit {
        Some(limit) => io::copy(&mut local.take(limit), remote),
        None => io::copy(&mut io::BufReader::new(local), remote),
    }
}
