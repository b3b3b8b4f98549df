//! The state the server keeps per connected client.

use super::{controlchan::Command, datachan::DataConnector};
use crate::storage::StorageBackend;
use std::{net::SocketAddr, sync::Arc};

// TraceId is an identifier used to correlate logs statements together.
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub(crate) struct TraceId(u64);

impl TraceId {
    pub(crate) fn new() -> Self {
        TraceId(uuid::Uuid::new_v4().as_u64_pair().0)
    }
}

impl std::fmt::Display for TraceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub(crate) enum SessionState {
    New,
    WaitPass,
    WaitCmd,
}

/// How command lines from the client are decoded.
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub(crate) enum Encoding {
    Utf8,
    Ascii,
}

impl Encoding {
    /// Decodes a line. Strict UTF-8 fails on invalid bytes, ASCII mode maps every byte to the
    /// character with the same code point.
    pub(crate) fn decode(self, line: &[u8]) -> Result<String, std::str::Utf8Error> {
        match self {
            Encoding::Utf8 => std::str::from_utf8(line).map(str::to_string),
            Encoding::Ascii => Ok(line.iter().map(|b| char::from(*b)).collect()),
        }
    }
}

// This is where we keep the state for a ftp session.
#[derive(Debug)]
pub(crate) struct Session<Storage>
where
    Storage: StorageBackend,
{
    pub trace_id: TraceId,
    // The client's address
    pub source: SocketAddr,
    pub state: SessionState,
    pub username: Option<String>,
    // Created once the user logged in.
    pub storage: Option<Storage>,
    pub encoding: Encoding,
    // The offset the next transfer starts at, set by REST.
    pub rest_byte_count: u64,
    pub rename_from: Option<String>,
    // True once the control channel runs over TLS.
    pub secure: bool,
    pub protection_buffer_size: Option<u32>,
    pub connector: Option<Box<dyn DataConnector>>,
    pub previous_command: Option<Command>,
}

impl<Storage> Session<Storage>
where
    Storage: StorageBackend,
{
    pub(crate) fn new(source: SocketAddr) -> Self {
        Session {
            trace_id: TraceId::new(),
            source,
            state: SessionState::New,
            username: None,
            storage: None,
            encoding: Encoding::Utf8,
            rest_byte_count: 0,
            rename_from: None,
            secure: false,
            protection_buffer_size: None,
            connector: None,
            previous_command: None,
        }
    }

    pub(crate) fn is_authenticated(&self) -> bool {
        self.state == SessionState::WaitCmd
    }

    /// Tears down the data connector, if any.
    pub(crate) fn end_connector(&mut self) {
        if let Some(mut connector) = self.connector.take() {
            connector.end();
        }
    }

    /// Returns the pending REST offset, resetting it to zero.
    pub(crate) fn take_rest_byte_count(&mut self) -> u64 {
        std::mem::take(&mut self.rest_byte_count)
    }
}

pub(crate) type SharedSession<S> = Arc<tokio::sync::Mutex<Session<S>>>;

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn ascii_decoding_never_fails() {
        assert_eq!(Encoding::Ascii.decode(b"CWD caf\xe9").unwrap(), "CWD caf\u{e9}");
        assert!(Encoding::Utf8.decode(b"CWD caf\xe9").is_err());
        assert_eq!(Encoding::Utf8.decode("CWD café".as_bytes()).unwrap(), "CWD café");
    }
}
