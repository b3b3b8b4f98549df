use crate::BoxError;
use derive_more::Display;
use thiserror::Error;

/// The Error returned by storage back-ends. The [`ErrorKind`] determines what the client gets to
/// see when no command specific reply code applies.
#[derive(Debug, Error)]
#[error("storage error: {kind}")]
pub struct Error {
    kind: ErrorKind,
    #[source]
    source: Option<BoxError>,
}

impl Error {
    /// Creates a new storage error
    pub fn new<E>(kind: ErrorKind, error: E) -> Error
    where
        E: Into<BoxError>,
    {
        Error {
            kind,
            source: Some(error.into()),
        }
    }

    /// Detailed information about what the FTP server should do with the failure
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// The text sent to the client: the inner error's message if there is one, otherwise the
    /// description of the kind.
    pub fn message(&self) -> String {
        match &self.source {
            Some(source) => source.to_string(),
            None => self.kind.description().to_string(),
        }
    }

    /// Attempts to get a reference to the inner `std::io::Error` if there is one.
    pub fn get_io_error(&self) -> Option<&std::io::Error> {
        self.source.as_ref()?.downcast_ref::<std::io::Error>()
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Error {
        Error { kind, source: None }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Error {
        let kind = match err.kind() {
            std::io::ErrorKind::NotFound => ErrorKind::PermanentFileNotAvailable,
            std::io::ErrorKind::PermissionDenied => ErrorKind::PermissionDenied,
            std::io::ErrorKind::AlreadyExists => ErrorKind::FileNameNotAllowedError,
            std::io::ErrorKind::BrokenPipe | std::io::ErrorKind::ConnectionReset | std::io::ErrorKind::ConnectionAborted => {
                ErrorKind::ConnectionClosed
            }
            _ => ErrorKind::LocalError,
        };
        Error::new(kind, err)
    }
}

/// The `ErrorKind` variants that can be produced by the [`StorageBackend`] implementations.
///
/// [`StorageBackend`]: trait.StorageBackend.html
#[derive(Copy, Clone, Eq, PartialEq, Debug, Display)]
pub enum ErrorKind {
    /// 450: an error that may go away when retried, for example a busy file.
    #[display("450 Transient file not available")]
    TransientFileNotAvailable,
    /// 550: the file does not exist or cannot be reached.
    #[display("550 Permanent file not available")]
    PermanentFileNotAvailable,
    /// 550: the directory does not exist.
    #[display("550 Permanent directory not available")]
    PermanentDirectoryNotAvailable,
    /// 550: a directory could not be removed because it still has entries.
    #[display("550 The directory is not empty")]
    PermanentDirectoryNotEmpty,
    /// 550: access denied.
    #[display("550 Permission denied")]
    PermissionDenied,
    /// 426: the transfer was aborted, possibly by the client or because of a network issue.
    #[display("426 Connection closed transfer aborted")]
    ConnectionClosed,
    /// 451: an internal error in the storage back-end.
    #[display("451 Local error")]
    LocalError,
    /// 551: requested action aborted.
    #[display("551 Page type unknown")]
    PageTypeUnknown,
    /// 452: insufficient storage space in system.
    #[display("452 Insufficient storage space error")]
    InsufficientStorageSpaceError,
    /// 552: exceeded storage allocation.
    #[display("552 Exceeded storage allocation error")]
    ExceededStorageAllocationError,
    /// 553: illegal file name.
    #[display("553 File name not allowed error")]
    FileNameNotAllowedError,
    /// 402: the back-end does not offer this capability at all.
    #[display("402 Not supported by file system")]
    CommandNotImplemented,
}

impl ErrorKind {
    /// The reply code that goes with this kind of error.
    pub fn reply_code(self) -> u32 {
        self.to_string().split_once(' ').and_then(|(code, _)| code.parse().ok()).unwrap_or(550)
    }

    /// The description without the reply code.
    pub fn description(self) -> &'static str {
        match self {
            ErrorKind::TransientFileNotAvailable => "Transient file not available",
            ErrorKind::PermanentFileNotAvailable => "Permanent file not available",
            ErrorKind::PermanentDirectoryNotAvailable => "Permanent directory not available",
            ErrorKind::PermanentDirectoryNotEmpty => "The directory is not empty",
            ErrorKind::PermissionDenied => "Permission denied",
            ErrorKind::ConnectionClosed => "Connection closed transfer aborted",
            ErrorKind::LocalError => "Local error",
            ErrorKind::PageTypeUnknown => "Page type unknown",
            ErrorKind::InsufficientStorageSpaceError => "Insufficient storage space error",
            ErrorKind::ExceededStorageAllocationError => "Exceeded storage allocation error",
            ErrorKind::FileNameNotAllowedError => "File name not allowed error",
            ErrorKind::CommandNotImplemented => "Not supported by file system",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn kinds_map_to_their_reply_code() {
        assert_eq!(ErrorKind::TransientFileNotAvailable.reply_code(), 450);
        assert_eq!(ErrorKind::CommandNotImplemented.reply_code(), 402);
        assert_eq!(ErrorKind::LocalError.reply_code(), 451);
    }

    #[test]
    fn io_errors_are_classified() {
        let err = Error::from(std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"));
        assert_eq!(err.kind(), ErrorKind::PermanentFileNotAvailable);
        assert_eq!(err.message(), "no such file");
        assert!(err.get_io_error().is_some());
    }

    #[test]
    fn message_falls_back_to_kind_description() {
        assert_eq!(Error::from(ErrorKind::CommandNotImplemented).message(), "Not supported by file system");
    }
}
