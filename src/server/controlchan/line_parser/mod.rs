//! This modules implements a line parser for FTP control channel commands
//!
//! Use the parse method. It takes a decoded FTP line and returns a [`Command`](super::Command).
//!
mod error;
mod parser;
#[cfg(test)]
mod tests;

pub(crate) use error::{ParseError, ParseErrorKind};
pub(crate) use parser::parse;
