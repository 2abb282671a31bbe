//! SFTP over ssh2
//!
//! `SshConnector` is the production `Connector`. The transport guard sends an
//! SSH disconnect when dropped, after the SFTP channel has been closed.

use log::{debug, info};
use ssh2::{Session, Sftp};
use std::io;
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::path::Path;
use std::time::Duration;

use crate::config::TransferConfig;
use crate::error::TransferError;
use crate::transfer::connector::{Connector, RemoteSession};

const DEFAULT_SSH_PORT: u16 = 22;

#[derive(Debug, Default, Clone, Copy)]
pub struct SshConnector;

/// SSH connection past the handshake
struct SshTransport {
    session: Session,
    host: String,
}

impl Drop for SshTransport {
    fn drop(&mut self) {
        if let Err(e) = self.session.disconnect(None, "transfer finished", None) {
            debug!("Disconnect from {} failed: {}", self.host, e);
        }
    }
}

/// SFTP channel on top of an SSH transport. Fields drop in declaration
/// order, so the channel closes before the transport.
pub struct SftpSession {
    sftp: Sftp,
    _transport: SshTransport,
}

/// Transport that completed the SSH handshake. Dropping it ends the
/// connection.
trait Handshaken {
    type Channel;

    fn authenticate(&self, user: &str, password: &str) -> io::Result<()>;
    fn is_authenticated(&self) -> bool;
    fn open_channel(&self) -> io::Result<Self::Channel>;
}

impl Handshaken for SshTransport {
    type Channel = Sftp;

    fn authenticate(&self, user: &str, password: &str) -> io::Result<()> {
        self.session
            .userauth_password(user, password)
            .map_err(io::Error::from)
    }

    fn is_authenticated(&self) -> bool {
        self.session.authenticated()
    }

    fn open_channel(&self) -> io::Result<Sftp> {
        self.session.sftp().map_err(io::Error::from)
    }
}

/// Authenticates `transport` and opens a channel on it. When either step
/// fails the transport is dropped before returning.
fn establish<T: Handshaken>(
    transport: T,
    host: &str,
    config: &TransferConfig,
) -> Result<(T::Channel, T), TransferError> {
    let auth_err = |source: io::Error| TransferError::Auth {
        user: config.user.clone(),
        host: host.to_string(),
        source,
    };
    transport
        .authenticate(&config.user, &config.password)
        .map_err(auth_err)?;
    if !transport.is_authenticated() {
        return Err(auth_err(io::Error::new(
            io::ErrorKind::PermissionDenied,
            "not authenticated after password exchange",
        )));
    }
    info!("Authenticated to {} as {}", host, config.user);

    let channel = transport
        .open_channel()
        .map_err(|source| TransferError::Session {
            host: host.to_string(),
            source,
        })?;

    Ok((channel, transport))
}

impl Connector for SshConnector {
    type Session = SftpSession;

    fn connect(&self, config: &TransferConfig) -> Result<SftpSession, TransferError> {
        let host = socket_target(&config.host);
        let connect_err = |source: io::Error| TransferError::Connect {
            host: host.clone(),
            source,
        };

        let tcp = open_tcp(&host, config.timeout()).map_err(connect_err)?;

        let mut session = Session::new().map_err(|e| connect_err(e.into()))?;
        if let Some(timeout) = config.timeout() {
            session.set_timeout(timeout.as_millis().min(u32::MAX as u128) as u32);
        }
        session.set_tcp_stream(tcp);
        session.handshake().map_err(|e| connect_err(e.into()))?;

        let transport = SshTransport {
            session,
            host: host.clone(),
        };
        let (sftp, transport) = establish(transport, &host, config)?;

        Ok(SftpSession {
            sftp,
            _transport: transport,
        })
    }
}

impl RemoteSession for SftpSession {
    type File = ssh2::File;

    fn create(&mut self, path: &str) -> Result<ssh2::File, TransferError> {
        self.sftp
            .create(Path::new(path))
            .map_err(|e| TransferError::RemoteCreate {
                path: path.to_string(),
                source: e.into(),
            })
    }
}

/// Appends the default SSH port when `host` carries none.
/// IPv6 literals with a port must be bracketed (`[::1]:22`).
pub fn socket_target(host: &str) -> String {
    if host.starts_with('[') {
        return if host.contains("]:") {
            host.to_string()
        } else {
            format!("{host}:{DEFAULT_SSH_PORT}")
        };
    }

    match host.rsplit_once(':') {
        Some((name, port)) if !name.contains(':') && port.parse::<u16>().is_ok() => {
            host.to_string()
        }
        Some(_) => format!("[{host}]:{DEFAULT_SSH_PORT}"),
        None => format!("{host}:{DEFAULT_SSH_PORT}"),
    }
}

fn open_tcp(target: &str, timeout: Option<Duration>) -> io::Result<TcpStream> {
    let Some(timeout) = timeout else {
        return TcpStream::connect(target);
    };

    let addrs: Vec<SocketAddr> = target.to_socket_addrs()?.collect();
    let mut last_error = None;
    for addr in addrs {
        match TcpStream::connect_timeout(&addr, timeout) {
            Ok(stream) => return Ok(stream),
            Err(e) => last_error = Some(e),
        }
    }

    Err(last_error.unwrap_or_else(|| {
        io::Error::new(
            io::ErrorKind::AddrNotAvailable,
            format!("{target} resolved to no addresses"),
        )
    }))
}
