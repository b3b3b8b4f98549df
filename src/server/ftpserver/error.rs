//! Contains the error types used by `Server`

use crate::{
    BoxError,
    server::{port_allocator::PortAllocationError, tls::ConfigError},
};

use std::net::AddrParseError;
use thiserror::Error;

/// Error returned by [`ServerBuilder::build`](crate::ServerBuilder::build) and
/// [`Server::listen`](crate::Server::listen).
#[derive(Error, Debug)]
#[error("server error: {msg}")]
pub struct ServerError {
    msg: String,
    #[source]
    source: BoxError,
}

impl ServerError {
    fn new<E: std::error::Error + Send + Sync + 'static>(msg: impl Into<String>, source: E) -> ServerError {
        ServerError {
            msg: msg.into(),
            source: Box::new(source),
        }
    }
}

impl From<AddrParseError> for ServerError {
    fn from(e: AddrParseError) -> Self {
        ServerError::new("could not parse address", e)
    }
}

impl From<std::io::Error> for ServerError {
    fn from(e: std::io::Error) -> Self {
        ServerError::new("io error", e)
    }
}

impl From<ConfigError> for ServerError {
    fn from(e: ConfigError) -> Self {
        ServerError::new(format!("error with TLS configuration: {}", e), e)
    }
}

impl From<PortAllocationError> for ServerError {
    fn from(e: PortAllocationError) -> Self {
        ServerError::new(format!("bad passive port configuration: {}", e), e)
    }
}

/// The sessions did not finish within the shutdown grace period.
#[derive(Error, Debug)]
#[error("shutdown error: {msg}")]
pub struct ShutdownError {
    /// What went wrong
    pub msg: String,
}

impl From<ShutdownError> for ServerError {
    fn from(e: ShutdownError) -> Self {
        ServerError::new("shutdown error", e)
    }
}
