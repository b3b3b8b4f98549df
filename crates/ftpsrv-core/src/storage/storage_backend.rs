use super::error::{Error, ErrorKind};
use crate::auth::Principal;
use async_trait::async_trait;
use futures::future::BoxFuture;
use std::{fmt::Debug, time::SystemTime};
use tokio::io::{AsyncRead, AsyncWrite};

/// Result type used by traits in this module
pub type Result<T> = std::result::Result<T, Error>;

/// The stream a back-end hands out for downloads.
pub type ReadStream = Box<dyn AsyncRead + Send + Sync + Unpin>;

/// The stream a back-end hands out for uploads.
pub type WriteStream = Box<dyn WriteSink>;

/// A destination for uploaded bytes.
///
/// On success the server shuts the sink down with [`tokio::io::AsyncWriteExt::shutdown`]. When
/// the transfer fails the server calls [`WriteSink::abort`] instead, after which no partially
/// written file may remain visible.
pub trait WriteSink: AsyncWrite + Send + Unpin {
    /// Discards whatever was written so far.
    fn abort(self: Box<Self>) -> BoxFuture<'static, Result<()>>;
}

/// Represents the metadata of a _FTP File_
pub trait Metadata: Send + Sync {
    /// Returns the length (size) of the file in bytes.
    fn len(&self) -> u64;

    /// Returns `self.len() == 0`.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns true if the path is a directory.
    fn is_dir(&self) -> bool;

    /// Returns true if the path is a file.
    fn is_file(&self) -> bool;

    /// Returns true if the path is a symbolic link.
    fn is_symlink(&self) -> bool {
        false
    }

    /// Returns the last modified time of the path.
    fn modified(&self) -> Result<SystemTime>;

    /// Returns the `gid` of the file.
    fn gid(&self) -> u32;

    /// Returns the `uid` of the file.
    fn uid(&self) -> u32;

    /// Returns the number of links to the file. The default implementation always returns `1`
    fn links(&self) -> u64 {
        1
    }

    /// Returns the unix mode bits (type and permissions) if the back-end knows them.
    fn mode(&self) -> Option<u32> {
        None
    }

    /// Returns the device and inode numbers if the back-end knows them. Used by the EPLF listing
    /// format to build a unique identifier.
    fn device_and_inode(&self) -> Option<(u64, u64)> {
        None
    }
}

/// Fileinfo contains the name of a directory entry and its metadata.
#[derive(Clone, Debug)]
pub struct Fileinfo<M>
where
    M: Metadata,
{
    /// The entry name, without any leading directories
    pub name: String,
    /// The file's metadata
    pub metadata: M,
}

/// Where and how an upload is written.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WriteOptions {
    /// Keep the existing content instead of truncating it
    pub append: bool,
    /// Byte offset at which to start writing. Anything beyond it is discarded first.
    pub start: u64,
}

/// A stream opened by the back-end together with the paths it refers to.
pub struct Opened<S> {
    /// The byte stream itself
    pub stream: S,
    /// The path as the client should see it, used in the reply
    pub client_path: String,
    /// The path as the back-end knows it, reported to event listeners
    pub server_path: String,
}

impl<S> Debug for Opened<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Opened")
            .field("client_path", &self.client_path)
            .field("server_path", &self.server_path)
            .finish()
    }
}

fn unsupported<T>() -> Result<T> {
    Err(Error::from(ErrorKind::CommandNotImplemented))
}

/// The `StorageBackend` trait can be implemented to create custom FTP virtual file systems. A
/// server creates one instance per session and the instance keeps that session's current
/// working directory.
#[async_trait]
pub trait StorageBackend: Send + Sync + Debug {
    /// The concrete type of the metadata used by this storage backend.
    type Metadata: Metadata + 'static;

    /// Called once the user logged in. Implementations restrict themselves to the principal's
    /// root here.
    fn enter(&mut self, _principal: &Principal) -> std::io::Result<()> {
        Ok(())
    }

    /// The current working directory as the client sees it.
    async fn current_directory(&self) -> Result<String>;

    /// Changes the working directory and returns the new one.
    async fn chdir(&mut self, _path: &str) -> Result<String> {
        unsupported()
    }

    /// Returns the entries of a directory.
    async fn list(&self, _path: &str) -> Result<Vec<Fileinfo<Self::Metadata>>> {
        unsupported()
    }

    /// Returns information about a single file or directory.
    async fn get(&self, _path: &str) -> Result<Fileinfo<Self::Metadata>> {
        unsupported()
    }

    /// Opens a file for writing.
    async fn write(&self, _path: &str, _options: WriteOptions) -> Result<Opened<WriteStream>> {
        unsupported()
    }

    /// Opens a file for reading, starting at the given byte offset. Directories cannot be read.
    async fn read(&self, _path: &str, _start: u64) -> Result<Opened<ReadStream>> {
        unsupported()
    }

    /// Deletes a file or an empty directory.
    async fn delete(&self, _path: &str) -> Result<()> {
        unsupported()
    }

    /// Creates a directory, including missing parents, and returns its path.
    async fn mkdir(&self, _path: &str) -> Result<String> {
        unsupported()
    }

    /// Renames a file or directory.
    async fn rename(&self, _from: &str, _to: &str) -> Result<()> {
        unsupported()
    }

    /// Changes the unix permission bits of a file.
    async fn chmod(&self, _path: &str, _mode: u32) -> Result<()> {
        unsupported()
    }

    /// Returns a name, derived from the hint, that does not exist yet.
    async fn unique_name(&self, _hint: &str) -> Result<String> {
        unsupported()
    }
}
