//! Contains code pertaining to the FTP *data* channel.
//!
//! A session holds at most one [`DataConnector`]. PORT and EPRT install an [`ActiveConnector`]
//! that dials out to the client, PASV and EPSV install a [`PassiveConnector`] that waits for the
//! client to dial in. Transfer commands then wait for the connection through the shared
//! interface and end the connector when done.

mod active;
mod passive;
mod readiness;

pub(crate) use active::ActiveConnector;
pub(crate) use passive::{PassiveConnector, PassiveSetup};

use super::{controlchan::ReplyCode, io::DataStream, port_allocator::PortAllocationError};
use async_trait::async_trait;
use derive_more::Display;
use std::{fmt::Debug, net::IpAddr, time::Duration};
use thiserror::Error;

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ConnectorKind {
    #[display("active")]
    Active,
    #[display("passive")]
    Passive,
}

#[derive(Error, Debug)]
pub(crate) enum ConnectorError {
    #[error("no data connection was set up, use PORT, EPRT, PASV or EPSV first")]
    NotSetUp,
    #[error("timed out waiting for the data connection")]
    Timeout,
    #[error("the address {requested} does not belong to the client")]
    AddressMismatch { requested: IpAddr },
    #[error("could not allocate a passive port: {0}")]
    PortAllocation(#[from] PortAllocationError),
    #[error("data connection failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("TLS handshake on the data connection failed: {0}")]
    Tls(String),
    #[error("data connection closed: {0}")]
    Closed(String),
}

impl ConnectorError {
    pub(crate) fn reply_code(&self) -> ReplyCode {
        match self {
            ConnectorError::AddressMismatch { .. } => ReplyCode::CommandSyntaxError,
            _ => ReplyCode::CantOpenDataConnection,
        }
    }
}

/// The data connection of a session, however it gets established.
#[async_trait]
pub(crate) trait DataConnector: Send + Sync + Debug {
    fn kind(&self) -> ConnectorKind;

    /// True once the data connection is up and nobody took it yet.
    fn is_connected(&self) -> bool;

    /// Waits for the data connection, see [`ConnectorError::Timeout`].
    async fn wait_for_connection(&mut self, timeout: Duration, poll: Duration) -> Result<DataStream, ConnectorError>;

    /// Tears the connector down: stops any pending connect or accept and releases its port.
    fn end(&mut self);
}
