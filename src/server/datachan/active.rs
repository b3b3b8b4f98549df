use super::{ConnectorError, ConnectorKind, DataConnector, readiness::ReadyCell};
use crate::{
    notification::{ConnectorErrorContext, ServerEvent, emitter::EventEmitter},
    server::io::{DataStream, same_host},
};
use async_trait::async_trait;
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tokio::{net::TcpStream, task::JoinHandle};
use tokio_rustls::TlsAcceptor;

/// Active mode: the server connects to the address the client gave with PORT or EPRT.
#[derive(Debug)]
pub(crate) struct ActiveConnector {
    cell: Arc<ReadyCell>,
    task: JoinHandle<()>,
}

impl ActiveConnector {
    /// Starts connecting to `target`. Only the client's own host may be targeted, anything else
    /// fails before a socket is opened. With a `tls` acceptor the connection is wrapped in TLS,
    /// in the server role, before it counts as ready.
    pub(crate) fn connect(
        target: SocketAddr,
        control_peer: SocketAddr,
        tls: Option<TlsAcceptor>,
        emitter: Arc<EventEmitter>,
        logger: slog::Logger,
    ) -> Result<ActiveConnector, ConnectorError> {
        if !same_host(target.ip(), control_peer.ip()) {
            slog::warn!(logger, "Refusing active connection to {} for client {}", target, control_peer);
            return Err(ConnectorError::AddressMismatch { requested: target.ip() });
        }

        let cell = ReadyCell::new();
        let task_cell = cell.clone();
        let task = tokio::spawn(async move {
            match establish(target, tls).await {
                Ok(stream) => {
                    slog::debug!(logger, "Active data connection to {} established", target);
                    task_cell.connected(stream)
                }
                Err(err) => {
                    slog::warn!(logger, "Active data connection to {} failed: {}", target, err);
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
        Ok(ActiveConnector { cell, task })
    }
}

async fn establish(target: SocketAddr, tls: Option<TlsAcceptor>) -> Result<DataStream, ConnectorError> {
    let socket = TcpStream::connect(target).await?;
    match tls {
        Some(acceptor) => {
            let stream = acceptor.accept(socket).await.map_err(|e| ConnectorError::Tls(e.to_string()))?;
            Ok(Box::new(stream))
        }
        None => Ok(Box::new(socket)),
    }
}

#[async_trait]
impl DataConnector for ActiveConnector {
    fn kind(&self) -> ConnectorKind {
        ConnectorKind::Active
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

impl Drop for ActiveConnector {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notification::nop::NopListener;
    use pretty_assertions::assert_eq;
    use tokio::{io::AsyncReadExt, net::TcpListener};

    fn emitter() -> Arc<EventEmitter> {
        Arc::new(EventEmitter::new(Arc::new(NopListener {}), "test".to_string()))
    }

    fn logger() -> slog::Logger {
        slog::Logger::root(slog::Discard, slog::o!())
    }

    #[tokio::test]
    async fn foreign_host_is_refused_without_connecting() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let target = listener.local_addr().unwrap();
        let control_peer: SocketAddr = "127.0.0.2:40000".parse().unwrap();

        let err = ActiveConnector::connect(target, control_peer, None, emitter(), logger()).unwrap_err();
        assert_eq!(err.reply_code() as u32, 500);

        let accepted = tokio::time::timeout(Duration::from_millis(200), listener.accept()).await;
        assert!(accepted.is_err(), "no connection may be attempted");
    }

    #[tokio::test]
    async fn connects_to_the_client() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let target = listener.local_addr().unwrap();
        let control_peer: SocketAddr = "127.0.0.1:40000".parse().unwrap();

        let mut connector = ActiveConnector::connect(target, control_peer, None, emitter(), logger()).unwrap();
        assert_eq!(connector.kind(), ConnectorKind::Active);
        assert_eq!(connector.kind().to_string(), "active");
        let (mut client_side, _) = listener.accept().await.unwrap();

        let mut stream = connector
            .wait_for_connection(Duration::from_secs(5), Duration::from_millis(250))
            .await
            .unwrap();
        tokio::io::AsyncWriteExt::write_all(&mut stream, b"hi").await.unwrap();
        drop(stream);
        let mut buf = Vec::new();
        client_side.read_to_end(&mut buf).await.unwrap();
        assert_eq!(buf, b"hi");
        connector.end();
    }

    #[tokio::test]
    async fn ended_connector_fails_waiters() {
        let control_peer: SocketAddr = "127.0.0.1:40000".parse().unwrap();
        // Nothing listens on port 9 of localhost in a test environment, but the connector is ended
        // before that matters.
        let mut connector = ActiveConnector::connect("127.0.0.1:9".parse().unwrap(), control_peer, None, emitter(), logger()).unwrap();
        connector.end();
        let result = connector.wait_for_connection(Duration::from_secs(1), Duration::from_millis(50)).await;
        assert!(matches!(result, Err(ConnectorError::Closed(_))));
    }
}
