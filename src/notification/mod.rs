//! Allows users to listen to events emitted by libftpsrv.
//!
//! Implement the [`EventListener`] trait and register it with
//! [`Server::notify`](crate::Server::notify) to learn about connects, disconnects, transfers and
//! data connection failures.

pub(crate) mod emitter;
pub(crate) mod event;
pub(crate) mod nop;

pub use event::{ConnectorErrorContext, EventListener, EventMeta, ServerEvent};
