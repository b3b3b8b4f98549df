//! Contains code pertaining to the FTP *control* channel

mod acl;
mod auth;
mod codecs;
mod command;
mod commands;
mod control_loop;
mod error;
mod event;
mod handler;
mod line_parser;
mod log;
mod middleware;
mod registry;
mod reply;
mod writer;

pub(crate) use acl::Acl;
pub(crate) use command::Command;
pub(crate) use control_loop::{Config as LoopConfig, spawn as spawn_loop};
pub(crate) use event::Event;
pub(crate) use handler::StorageFactory;
pub(crate) use reply::{Reply, ReplyCode, ReplyLine};
