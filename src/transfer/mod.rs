//! Transfer module
//!
//! Executes single SFTP uploads and defines the seams the dispatcher and the
//! executor are tested through.

pub mod connector;
pub mod executor;
pub mod results;
pub mod ssh;

pub use connector::{Connector, RemoteSession};
pub use executor::{TransferExecutor, TransferHandler, remote_path};
pub use results::TransferOutcome;
pub use ssh::{SftpSession, SshConnector};
