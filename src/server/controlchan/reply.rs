/// A reply to the FTP client
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Reply {
    None,
    CodeAndMsg { code: ReplyCode, msg: String },
    MultiLine { code: ReplyCode, lines: Vec<ReplyLine> },
}

/// One line of a multi-line reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ReplyLine {
    /// Gets the reply code prepended.
    Text(String),
    /// Goes out verbatim, for example directory entries or FEAT lines whose leading space matters.
    Raw(String),
}

/// The reply codes according to RFC 959.
//
// From: https://cr.yp.to/ftp/request.html#response
//
// The three digits form a code. Codes between 100 and 199 indicate marks; codes between 200
// and 399 indicate acceptance; codes between 400 and 599 indicate rejection.
//
// The server can reject any request with code
// - 421 if the server is about to close the connection;
// - 500, 501, 502, or 504 for unacceptable syntax; or
// - 530 if permission is denied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub(crate) enum ReplyCode {
    FileStatusOkay = 150,

    CommandOkay = 200,
    CommandOkayNotImplemented = 202,
    SystemStatus = 211,
    DirectoryStatus = 212,
    FileStatus = 213,
    HelpMessage = 214,
    SystemType = 215,
    ServiceReady = 220,
    ClosingControlConnection = 221,
    DataConnectionOpen = 225,
    ClosingDataConnection = 226,
    EnteringPassiveMode = 227,
    EnteringExtendedPassiveMode = 229,
    UserLoggedIn = 230,
    AuthOkayNoDataNeeded = 234,
    FileActionOkay = 250,
    DirCreated = 257,

    NeedPassword = 331,
    FileActionPending = 350,

    NotSupportedByStorage = 402,
    ServiceNotAvailable = 421,
    CantOpenDataConnection = 425,
    ConnectionClosed = 426,
    TransientFileError = 450,
    LocalError = 451,
    OutOfSpace = 452,

    CommandSyntaxError = 500,
    ParameterSyntaxError = 501,
    CommandNotImplemented = 502,
    BadCommandSequence = 503,
    CommandNotImplementedForParameter = 504,
    NotLoggedIn = 530,
    ProtectionLevelNotSupported = 536,
    FileError = 550,
    PageTypeUnknown = 551,
    ExceededStorageAllocation = 552,
    BadFileName = 553,
}

impl ReplyCode {
    /// The text sent when a reply carries no message of its own.
    pub(crate) fn default_message(self) -> &'static str {
        match self {
            ReplyCode::FileStatusOkay => "File status okay; about to open data connection.",
            ReplyCode::CommandOkay => "Command okay.",
            ReplyCode::CommandOkayNotImplemented => "Command not implemented, superfluous at this site.",
            ReplyCode::SystemStatus => "System status, or system help reply.",
            ReplyCode::DirectoryStatus => "Directory status.",
            ReplyCode::FileStatus => "File status.",
            ReplyCode::HelpMessage => "Help message.",
            ReplyCode::SystemType => "NAME system type.",
            ReplyCode::ServiceReady => "Service ready for new user.",
            ReplyCode::ClosingControlConnection => "Service closing control connection.",
            ReplyCode::DataConnectionOpen => "Data connection open; no transfer in progress.",
            ReplyCode::ClosingDataConnection => "Closing data connection. Requested file action successful.",
            ReplyCode::EnteringPassiveMode => "Entering Passive Mode.",
            ReplyCode::EnteringExtendedPassiveMode => "Entering Extended Passive Mode.",
            ReplyCode::UserLoggedIn => "User logged in, proceed.",
            ReplyCode::AuthOkayNoDataNeeded => "AUTH command OK.",
            ReplyCode::FileActionOkay => "Requested file action okay, completed.",
            ReplyCode::DirCreated => "\"PATHNAME\" created.",
            ReplyCode::NeedPassword => "User name okay, need password.",
            ReplyCode::FileActionPending => "Requested file action pending further information.",
            ReplyCode::NotSupportedByStorage => "Not supported by file system.",
            ReplyCode::ServiceNotAvailable => "Service not available, closing control connection.",
            ReplyCode::CantOpenDataConnection => "Can't open data connection.",
            ReplyCode::ConnectionClosed => "Connection closed; transfer aborted.",
            ReplyCode::TransientFileError => "Requested file action not taken.",
            ReplyCode::LocalError => "Requested action aborted. Local error in processing.",
            ReplyCode::OutOfSpace => "Requested action not taken. Insufficient storage space in system.",
            ReplyCode::CommandSyntaxError => "Syntax error, command unrecognized.",
            ReplyCode::ParameterSyntaxError => "Syntax error in parameters or arguments.",
            ReplyCode::CommandNotImplemented => "Command not implemented.",
            ReplyCode::BadCommandSequence => "Bad sequence of commands.",
            ReplyCode::CommandNotImplementedForParameter => "Command not implemented for that parameter.",
            ReplyCode::NotLoggedIn => "Not logged in.",
            ReplyCode::ProtectionLevelNotSupported => "Requested PROT level not supported by mechanism.",
            ReplyCode::FileError => "Requested action not taken. File unavailable.",
            ReplyCode::PageTypeUnknown => "Requested action aborted. Page type unknown.",
            ReplyCode::ExceededStorageAllocation => "Requested file action aborted. Exceeded storage allocation.",
            ReplyCode::BadFileName => "Requested action not taken. File name not allowed.",
        }
    }

    /// True for 1xx, 2xx and 3xx codes.
    pub(crate) fn is_positive(self) -> bool {
        (self as u32) < 400
    }

    const ALL: [ReplyCode; 38] = [
        ReplyCode::FileStatusOkay,
        ReplyCode::CommandOkay,
        ReplyCode::CommandOkayNotImplemented,
        ReplyCode::SystemStatus,
        ReplyCode::DirectoryStatus,
        ReplyCode::FileStatus,
        ReplyCode::HelpMessage,
        ReplyCode::SystemType,
        ReplyCode::ServiceReady,
        ReplyCode::ClosingControlConnection,
        ReplyCode::DataConnectionOpen,
        ReplyCode::ClosingDataConnection,
        ReplyCode::EnteringPassiveMode,
        ReplyCode::EnteringExtendedPassiveMode,
        ReplyCode::UserLoggedIn,
        ReplyCode::AuthOkayNoDataNeeded,
        ReplyCode::FileActionOkay,
        ReplyCode::DirCreated,
        ReplyCode::NeedPassword,
        ReplyCode::FileActionPending,
        ReplyCode::NotSupportedByStorage,
        ReplyCode::ServiceNotAvailable,
        ReplyCode::CantOpenDataConnection,
        ReplyCode::ConnectionClosed,
        ReplyCode::TransientFileError,
        ReplyCode::LocalError,
        ReplyCode::OutOfSpace,
        ReplyCode::CommandSyntaxError,
        ReplyCode::ParameterSyntaxError,
        ReplyCode::CommandNotImplemented,
        ReplyCode::BadCommandSequence,
        ReplyCode::CommandNotImplementedForParameter,
        ReplyCode::NotLoggedIn,
        ReplyCode::ProtectionLevelNotSupported,
        ReplyCode::FileError,
        ReplyCode::PageTypeUnknown,
        ReplyCode::ExceededStorageAllocation,
        ReplyCode::BadFileName,
    ];

    /// The reply code with the given number, if the server knows it.
    pub(crate) fn from_code(code: u32) -> Option<ReplyCode> {
        ReplyCode::ALL.iter().copied().find(|c| *c as u32 == code)
    }
}

impl Reply {
    pub(crate) fn new(code: ReplyCode, message: &str) -> Self {
        Reply::CodeAndMsg {
            code,
            msg: message.to_string(),
        }
    }

    pub(crate) fn new_with_string(code: ReplyCode, msg: String) -> Self {
        Reply::CodeAndMsg { code, msg }
    }

    /// A reply carrying only the code's default message.
    pub(crate) fn code(code: ReplyCode) -> Self {
        Reply::CodeAndMsg { code, msg: String::new() }
    }

    pub(crate) fn new_multiline<I>(code: ReplyCode, lines: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<ReplyLine>,
    {
        Reply::MultiLine {
            code,
            lines: lines.into_iter().map(Into::into).collect(),
        }
    }

    // A no-reply
    pub(crate) fn none() -> Self {
        Reply::None
    }
}

impl From<&str> for ReplyLine {
    fn from(s: &str) -> Self {
        ReplyLine::Text(s.to_string())
    }
}

impl From<String> for ReplyLine {
    fn from(s: String) -> Self {
        ReplyLine::Text(s)
    }
}
