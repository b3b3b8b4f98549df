//! Contains the `ControlChanError` struct that that defines the control channel error type.

use super::line_parser::ParseError;

use thiserror::Error;

/// The error type returned by the control channel.
#[derive(Debug, Error)]
#[error("control channel error: {kind}")]
pub(crate) struct ControlChanError {
    kind: ControlChanErrorKind,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
}

/// A list specifying categories of control channel errors.
#[derive(Eq, PartialEq, Debug, Clone)]
pub(crate) enum ControlChanErrorKind {
    /// We encountered a system IO error.
    IoError,
    /// Something went wrong parsing the client's command.
    ParseError,
    /// We encountered a non-UTF8 character in the command.
    Utf8Error,
    /// The client sent more than the maximum line length without a line ending.
    LineTooLong,
    /// Upgrading the control channel to TLS failed.
    TlsError,
    /// The control channel is out of sync, for instance AUTH TLS succeeded without TLS being
    /// configured.
    IllegalState,
}

impl std::fmt::Display for ControlChanErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ControlChanErrorKind::IoError => "failed to perform IO",
            ControlChanErrorKind::ParseError => "failed to parse command",
            ControlChanErrorKind::Utf8Error => "non-UTF8 character in command",
            ControlChanErrorKind::LineTooLong => "command line too long",
            ControlChanErrorKind::TlsError => "the TLS handshake on the control channel failed",
            ControlChanErrorKind::IllegalState => "control channel in illegal state",
        };
        f.write_str(s)
    }
}

impl ControlChanError {
    /// Creates a new control channel error with the specific kind
    pub(crate) fn new(kind: ControlChanErrorKind) -> Self {
        ControlChanError { kind, source: None }
    }

    /// Return the inner error kind of this error.
    pub(crate) fn kind(&self) -> &ControlChanErrorKind {
        &self.kind
    }
}

impl From<ControlChanErrorKind> for ControlChanError {
    fn from(kind: ControlChanErrorKind) -> ControlChanError {
        ControlChanError::new(kind)
    }
}

impl From<std::io::Error> for ControlChanError {
    fn from(err: std::io::Error) -> ControlChanError {
        ControlChanError {
            kind: ControlChanErrorKind::IoError,
            source: Some(Box::new(err)),
        }
    }
}

impl From<std::str::Utf8Error> for ControlChanError {
    fn from(err: std::str::Utf8Error) -> ControlChanError {
        ControlChanError {
            kind: ControlChanErrorKind::Utf8Error,
            source: Some(Box::new(err)),
        }
    }
}

impl From<ParseError> for ControlChanError {
    fn from(err: ParseError) -> ControlChanError {
        ControlChanError {
            kind: ControlChanErrorKind::ParseError,
            source: Some(Box::new(err)),
        }
    }
}
