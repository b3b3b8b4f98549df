use super::{ConnectorError, ConnectorKind, DataConnector, readiness::ReadyCell};
use crate::{
    notification::{ConnectorErrorContext, ServerEvent, emitter::EventEmitter},
    options::PASSIVE_IDLE_TIMEOUT,
    server::{
        ControlChanMsg,
        io::{DataStream, same_host},
        port_allocator::PortAllocator,
    },
};
use async_trait::async_trait;
use std::{
    net::{IpAddr, SocketAddr},
    sync::Arc,
    time::Duration,
};
use tokio::{net::TcpStream, sync::mpsc::Sender, task::JoinHandle};
use tokio_rustls::TlsAcceptor;

/// Passive mode: the server listens on a port from the passive range and the client connects.
#[derive(Debug)]
pub(crate) struct PassiveConnector {
    cell: Arc<ReadyCell>,
    task: JoinHandle<()>,
    port: u16,
}

/// Everything the accepting task needs besides the listener.
pub(crate) struct PassiveSetup {
    pub control_peer: SocketAddr,
    pub tls: Option<TlsAcceptor>,
    pub emitter: Arc<EventEmitter>,
    pub tx_control_chan: Sender<ControlChanMsg>,
    pub logger: slog::Logger,
}

impl PassiveConnector {
    /// Reserves a port on `host` and starts accepting exactly one connection on it. The listener
    /// and the port are given up after that connection or after [`PASSIVE_IDLE_TIMEOUT`],
    /// whichever comes first.
    ///
    /// A connection from any host other than the control connection's peer is dropped, after
    /// which the control loop is told to end the session: the port was already advertised, so
    /// somebody is trying to hijack the transfer.
    pub(crate) fn listen(allocator: &PortAllocator, host: IpAddr, setup: PassiveSetup) -> Result<PassiveConnector, ConnectorError> {
        let (reservation, listener) = allocator.reserve(host)?;
        let port = reservation.port();
        let cell = ReadyCell::new();
        let task_cell = cell.clone();
        let PassiveSetup {
            control_peer,
            tls,
            emitter,
            tx_control_chan,
            logger,
        } = setup;

        let task = tokio::spawn(async move {
            let accepted = tokio::time::timeout(PASSIVE_IDLE_TIMEOUT, listener.accept()).await;
            drop(listener);
            drop(reservation);

            let (socket, peer) = match accepted {
                Err(_) => {
                    slog::info!(logger, "Client did not connect to passive port {} in time", port);
                    task_cell.close("the client did not connect in time");
                    return;
                }
                Ok(Err(err)) => {
                    slog::warn!(logger, "Accepting on passive port {} failed: {}", port, err);
                    task_cell.close(&err.to_string());
                    emitter
                        .emit(ServerEvent::ConnectorError {
                            context: ConnectorErrorContext::DataServer,
                            error: err.to_string(),
                        })
                        .await;
                    return;
                }
                Ok(Ok(accepted)) => accepted,
            };

            if !same_host(peer.ip(), control_peer.ip()) {
                slog::warn!(logger, "Passive data connection from {} does not match control connection from {}", peer, control_peer);
                drop(socket);
                task_cell.close("the data connection came from a foreign address");
                emitter
                    .emit(ServerEvent::ConnectorError {
                        context: ConnectorErrorContext::DataSocket,
                        error: format!("data connection from foreign address {}", peer),
                    })
                    .await;
                if let Err(err) = tx_control_chan.send(ControlChanMsg::PassiveAddressMismatch { peer }).await {
                    slog::warn!(logger, "Could not notify the control loop of the address mismatch: {}", err);
                }
                return;
            }

            match secure(socket, tls).await {
                Ok(stream) => {
                    slog::debug!(logger, "Passive data connection from {} established", peer);
                    task_cell.connected(stream)
                }
                Err(err) => {
                    slog::warn!(logger, "Passive data connection from {} failed: {}", peer, err);
                    task_cell.close(&err.to_string());
                    emitter
                        .emit(ServerEvent::ConnectorError {
                            context: ConnectorErrorContext::DataSocket,
                            error: err.to_string(),
                        })
                        .await;
                }
            }
        });

        Ok(PassiveConnector { cell, task, port })
    }

    /// The port the client should connect to.
    pub(crate) fn port(&self) -> u16 {
        self.port
    }
}

async fn secure(socket: TcpStream, tls: Option<TlsAcceptor>) -> Result<DataStream, ConnectorError> {
    match tls {
        Some(acceptor) => {
            let stream = acceptor.accept(socket).await.map_err(|e| ConnectorError::Tls(e.to_string()))?;
            Ok(Box::new(stream))
        }
        None => Ok(Box::new(socket)),
    }
}

#[async_trait]
impl DataConnector for PassiveConnector {
    fn kind(&self) -> ConnectorKind {
        ConnectorKind::Passive
    }

    fn is_connected(&self) -> bool {
        self.cell.is_connected()
    }

    async fn wait_for_connection(&mut self, timeout: Duration, poll: Duration) -> Result<DataStream, ConnectorError> {
        self.cell.wait_ready(timeout, poll).await
    }

    fn end(&mut self) {
        self.task.abort();
        self.cell.close("the data connection was ended");
    }
}

impl Drop for PassiveConnector {
    fn drop(&mut self) {
        self.task.abort();
    }
}
