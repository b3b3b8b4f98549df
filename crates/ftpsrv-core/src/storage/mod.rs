//! Contains the [`StorageBackend`] trait that a libftpsrv server reads files from and writes
//! files to.
//!
//! Paths handed to a back-end are the paths the client sent: relative to the back-end's current
//! working directory or absolute with respect to its root. Keeping the client inside that root is
//! the back-end's job.
//!
//! Every capability except [`StorageBackend::current_directory`] has a default implementation
//! that fails with [`ErrorKind::CommandNotImplemented`], so a read-only or listing-only back-end
//! only implements what it supports. The server answers unsupported operations with a 402 reply.

mod error;
pub use error::{Error, ErrorKind};

mod storage_backend;
pub use storage_backend::{Fileinfo, Metadata, Opened, ReadStream, Result, StorageBackend, WriteOptions, WriteSink, WriteStream};
