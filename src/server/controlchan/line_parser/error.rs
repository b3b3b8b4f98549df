use derive_more::Display;
use std::result;
use thiserror::Error;

/// The error type returned by the [parse](super::parse) function.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("parse error: {kind}")]
pub(crate) struct ParseError {
    kind: ParseErrorKind,
}

/// A list specifying categories of Parse errors. It is meant to be used with the [ParseError]
/// type.
#[derive(Clone, Eq, PartialEq, Debug, Display)]
pub(crate) enum ParseErrorKind {
    /// The line holds no command at all.
    #[display("Empty command line")]
    EmptyLine,
}

impl ParseError {
    /// Returns the corresponding `ParseErrorKind` for this error.
    pub(crate) fn kind(&self) -> &ParseErrorKind {
        &self.kind
    }
}

impl From<ParseErrorKind> for ParseError {
    fn from(kind: ParseErrorKind) -> ParseError {
        ParseError { kind }
    }
}

/// The Result type used in this module.
pub(crate) type Result<T> = result::Result<T, ParseError>;
