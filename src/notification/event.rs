use async_trait::async_trait;
use std::fmt::Debug;
use std::net::SocketAddr;
use std::sync::Arc;

/// Where a data connection failure happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectorErrorContext {
    /// The data socket itself: connecting out, the TLS handshake or an accepted connection.
    DataSocket,
    /// The passive mode listener.
    DataServer,
}

/// Something that happened on the server. To identify the corresponding user or session see the
/// [`EventMeta`](crate::notification::EventMeta) struct.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerEvent {
    /// A client connected to the control port
    Connected {
        /// The client's address
        peer: SocketAddr,
    },
    /// The user logged in successfully
    LoggedIn,
    /// The control connection went away
    Disconnected {
        /// The client's address
        peer: SocketAddr,
    },
    /// The server stopped accepting connections
    Closed,
    /// Setting up or using a data connection failed
    ConnectorError {
        /// Which part failed
        context: ConnectorErrorContext,
        /// What went wrong
        error: String,
    },
    /// A file changing or file moving command finished, successfully or not.
    Transfer {
        /// The command, for example `STOR`, `RETR` or `RNTO`
        command: String,
        /// The error text if the command failed
        error: Option<String>,
        /// The path as the storage back-end knows it, if the command got that far
        server_path: Option<String>,
    },
}

/// Metadata relating to an event that can be used to to identify the user and session. A sequence
/// number is also included to allow ordering in systems where event ordering is not guaranteed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventMeta {
    /// The user this event pertains to, empty before login.
    pub username: String,
    /// Identifies a single session pertaining to a connected client.
    pub trace_id: String,
    /// The event sequence number as incremented per session.
    pub sequence_number: u64,
}

/// A listener for [`ServerEvent`](crate::notification::ServerEvent)s. Implementations can be
/// passed to [`Server::notify`](crate::Server::notify) in order to receive notifications.
#[async_trait]
pub trait EventListener: Sync + Send + Debug {
    /// Called after the event happened. Event metadata is also passed to allow pinpointing the user
    /// session for which it happened.
    async fn receive_event(&self, e: ServerEvent, m: EventMeta);
}

#[async_trait]
impl EventListener for Box<dyn EventListener> {
    async fn receive_event(&self, e: ServerEvent, m: EventMeta) {
        self.as_ref().receive_event(e, m).await
    }
}

#[async_trait]
impl EventListener for Arc<dyn EventListener> {
    async fn receive_event(&self, e: ServerEvent, m: EventMeta) {
        self.as_ref().receive_event(e, m).await
    }
}
