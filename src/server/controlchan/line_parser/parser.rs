use super::error::{ParseErrorKind, Result};
use crate::server::controlchan::command::Command;

// These take file names as their argument, and file names may look like flags.
const NO_FLAG_DIRECTIVES: [&str; 3] = ["RETR", "SIZE", "STOR"];

// A flag is a dash followed by exactly one word character, like `-a` or `-l`.
fn is_flag(token: &str) -> bool {
    let bytes = token.as_bytes();
    bytes.len() == 2 && bytes[0] == b'-' && (bytes[1].is_ascii_alphanumeric() || bytes[1] == b'_')
}

/// Parse the given line into a [`Command`].
///
/// Quote characters are removed and the rest is split on whitespace. The first token, upper
/// cased, becomes the directive. Flag tokens are collected separately, except for directives
/// that take a bare file name, and the remaining tokens joined by single spaces form the
/// argument.
pub(crate) fn parse(line: &str) -> Result<Command> {
    let stripped = line.replace('"', "");
    let mut tokens = stripped.split_whitespace();
    let directive = match tokens.next() {
        Some(token) => token.to_uppercase(),
        None => return Err(ParseErrorKind::EmptyLine.into()),
    };

    let parse_flags = !NO_FLAG_DIRECTIVES.contains(&directive.as_str());
    let mut flags = Vec::new();
    let mut args = Vec::new();
    for token in tokens {
        if parse_flags && is_flag(token) {
            flags.push(token.to_string());
        } else {
            args.push(token);
        }
    }

    Ok(Command {
        directive,
        argument: if args.is_empty() { None } else { Some(args.join(" ")) },
        flags,
        raw: line.to_string(),
    })
}
