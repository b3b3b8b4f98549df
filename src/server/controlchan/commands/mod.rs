//! This module contains the implementations for the FTP commands defined in
//!
//! - [RFC 959 - FTP](https://tools.ietf.org/html/rfc959)
//! - [RFC 2389 - Feature negotiation mechanism for FTP](https://tools.ietf.org/html/rfc2389)
//! - [RFC 2428 - FTP Extensions for IPv6 and NATs](https://tools.ietf.org/html/rfc2428)
//! - [RFC 3659 - Extensions to FTP](https://tools.ietf.org/html/rfc3659)
//! - [RFC 2228 - FTP Security Extensions](https://tools.ietf.org/html/rfc2228)

mod abor;
mod allo;
mod auth;
mod cdup;
mod cwd;
mod dele;
mod eprt;
mod epsv;
mod feat;
mod help;
mod list;
mod mdtm;
mod mkd;
mod mode;
mod noop;
mod opts;
mod pass;
mod passive_common;
mod pasv;
mod pbsz;
mod port;
mod prot;
mod pwd;
mod quit;
mod rest;
mod retr;
mod rmd;
mod rnfr;
mod rnto;
mod site;
mod size;
mod stat;
mod stor;
mod stou;
mod stru;
mod syst;
mod transfer;
mod type_;
mod user;

pub use abor::Abor;
pub use allo::Allo;
pub use auth::Auth;
pub use cdup::Cdup;
pub use cwd::Cwd;
pub use dele::Dele;
pub use eprt::Eprt;
pub use epsv::Epsv;
pub use feat::Feat;
pub use help::Help;
pub use list::List;
pub use mdtm::Mdtm;
pub use mkd::Mkd;
pub use mode::Mode;
pub use noop::Noop;
pub use opts::Opts;
pub use pass::Pass;
pub use pasv::Pasv;
pub use pbsz::Pbsz;
pub use port::Port;
pub use prot::Prot;
pub use pwd::Pwd;
pub use quit::Quit;
pub use rest::Rest;
pub use retr::Retr;
pub use rmd::Rmd;
pub use rnfr::Rnfr;
pub use rnto::Rnto;
pub use site::Site;
pub use size::Size;
pub use stat::Stat;
pub use stor::Stor;
pub use stou::Stou;
pub use stru::Stru;
pub use syst::Syst;
pub use type_::Type;
pub use user::User;

use super::{Reply, ReplyCode};
use crate::storage::{self, ErrorKind};

/// The reply for storage commands issued while the session has no back-end.
pub(crate) fn no_storage() -> Reply {
    Reply::new(ReplyCode::FileError, "File system not instantiated")
}

/// The reply for a failed storage call: 402 if the back-end lacks the capability, otherwise
/// `code` with the error's message.
pub(crate) fn storage_failure(err: &storage::Error, code: ReplyCode) -> Reply {
    match err.kind() {
        ErrorKind::CommandNotImplemented => Reply::new(ReplyCode::NotSupportedByStorage, "Not supported by file system"),
        _ => Reply::new_with_string(code, err.message()),
    }
}

/// Quotes a path for a 257 style reply, doubling embedded quotes.
pub(crate) fn quote_path(path: &str) -> String {
    if path.is_empty() {
        return String::new();
    }
    format!("\"{}\"", path.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn paths_are_quoted_with_embedded_quotes_doubled() {
        assert_eq!(quote_path("/a \"b\""), "\"/a \"\"b\"\"\"");
        assert_eq!(quote_path(""), "");
    }

    #[test]
    fn unsupported_operations_get_402() {
        let err = storage::Error::from(ErrorKind::CommandNotImplemented);
        assert_eq!(
            storage_failure(&err, ReplyCode::FileError),
            Reply::new(ReplyCode::NotSupportedByStorage, "Not supported by file system")
        );
        let err = storage::Error::new(ErrorKind::PermanentFileNotAvailable, "gone");
        assert_eq!(storage_failure(&err, ReplyCode::FileError), Reply::new(ReplyCode::FileError, "gone"));
    }
}
