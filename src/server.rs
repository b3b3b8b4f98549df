//! Contains the `Server` struct and everything a session runs on.

mod chancomms;
pub(crate) mod controlchan;
mod datachan;
pub(crate) mod ftpserver;
mod io;
mod listing;
mod port_allocator;
mod session;
mod shutdown;
mod tls;

pub(crate) use chancomms::ControlChanMsg;
