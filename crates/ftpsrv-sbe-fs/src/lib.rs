//! A libftpsrv [`StorageBackend`] that uses a local filesystem, like a traditional FTP server.
//!
//! Every session gets its own `Filesystem` with its own working directory:
//!
//! ```no_run
//! use ftpsrv_core::storage::StorageBackend;
//! use ftpsrv_sbe_fs::Filesystem;
//!
//! #[tokio::main]
//! pub async fn main() {
//!     let mut fs = Filesystem::new(std::env::temp_dir()).unwrap();
//!     fs.chdir("/").await.unwrap();
//!     for entry in fs.list(".").await.unwrap() {
//!         println!("{}", entry.name);
//!     }
//! }
//! ```

mod sink;
use sink::{FileSink, Rollback};

use async_trait::async_trait;
use cfg_if::cfg_if;
use ftpsrv_core::auth::Principal;
use ftpsrv_core::storage::{Error, ErrorKind, Fileinfo, Metadata, Opened, ReadStream, Result, StorageBackend, WriteOptions, WriteStream};
use lazy_static::lazy_static;
use std::{
    fmt::Debug,
    io,
    path::{Component, Path, PathBuf},
    time::SystemTime,
};
use tokio::io::AsyncSeekExt;

#[cfg(unix)]
use std::os::unix::fs::{MetadataExt, PermissionsExt};

/// The Filesystem struct is an implementation of the StorageBackend trait that keeps its files
/// inside a specific root directory on local disk.
#[derive(Debug)]
pub struct Filesystem {
    root: PathBuf,
    // Always absolute and normalised, as the client sees it.
    cwd: PathBuf,
}

/// Metadata for the storage back-end
#[derive(Debug)]
pub struct Meta {
    inner: std::fs::Metadata,
}

/// Strip the "/" prefix, if any, from a path.
fn strip_prefixes(path: &Path) -> &Path {
    lazy_static! {
        static ref DOT: PathBuf = PathBuf::from(".");
        static ref SLASH: PathBuf = PathBuf::from("/");
    }
    if path == SLASH.as_path() {
        DOT.as_path()
    } else {
        path.strip_prefix("/").unwrap_or(path)
    }
}

/// Resolves `path` against `cwd` without touching the disk. `..` never climbs above `/`.
fn normalize(cwd: &Path, path: &str) -> PathBuf {
    let mut resolved = PathBuf::from("/");
    let joined = if path.starts_with('/') { PathBuf::from(path) } else { cwd.join(path) };
    for component in joined.components() {
        match component {
            Component::Normal(part) => resolved.push(part),
            Component::ParentDir => {
                resolved.pop();
            }
            Component::RootDir | Component::CurDir | Component::Prefix(_) => {}
        }
    }
    resolved
}

fn to_base36(mut value: u128) -> String {
    const DIGITS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    let mut out = Vec::new();
    loop {
        out.push(DIGITS[(value % 36) as usize]);
        value /= 36;
        if value == 0 {
            break;
        }
    }
    out.reverse();
    String::from_utf8_lossy(&out).into_owned()
}

impl Filesystem {
    /// Create a new Filesystem backend, with the given root. No operations can take place outside
    /// of the root. For example, when the `Filesystem` root is set to `/srv/ftp`, and a client
    /// asks for `hello.txt`, the server will send it `/srv/ftp/hello.txt`.
    pub fn new<P: Into<PathBuf>>(root: P) -> io::Result<Self> {
        let root = root.into();
        if !std::fs::metadata(&root)?.is_dir() {
            return Err(io::Error::new(io::ErrorKind::NotADirectory, "root is not a directory"));
        }
        Ok(Filesystem { root, cwd: PathBuf::from("/") })
    }

    /// Maps a client path to its client-visible absolute form and to the path on disk.
    fn resolve(&self, path: &str) -> (PathBuf, PathBuf) {
        let client_path = normalize(&self.cwd, path);
        let fs_path = self.root.join(strip_prefixes(&client_path));
        (client_path, fs_path)
    }

    fn display(path: &Path) -> String {
        path.to_string_lossy().into_owned()
    }
}

#[async_trait]
impl StorageBackend for Filesystem {
    type Metadata = Meta;

    fn enter(&mut self, principal: &Principal) -> io::Result<()> {
        if let Some(home) = &principal.root {
            let (_, fs_path) = self.resolve(&home.to_string_lossy());
            if !std::fs::metadata(&fs_path)?.is_dir() {
                return Err(io::Error::new(io::ErrorKind::NotADirectory, "home is not a directory"));
            }
            self.root = fs_path;
            self.cwd = PathBuf::from("/");
        }
        Ok(())
    }

    async fn current_directory(&self) -> Result<String> {
        Ok(Self::display(&self.cwd))
    }

    #[tracing_attributes::instrument]
    async fn chdir(&mut self, path: &str) -> Result<String> {
        let (client_path, fs_path) = self.resolve(path);
        let meta = tokio::fs::metadata(&fs_path)
            .await
            .map_err(|e| Error::new(ErrorKind::PermanentDirectoryNotAvailable, e))?;
        if !meta.is_dir() {
            return Err(Error::new(ErrorKind::PermanentDirectoryNotAvailable, "Not a directory"));
        }
        self.cwd = client_path;
        Ok(Self::display(&self.cwd))
    }

    #[tracing_attributes::instrument]
    async fn list(&self, path: &str) -> Result<Vec<Fileinfo<Self::Metadata>>> {
        let (_, fs_path) = self.resolve(path);
        let mut entries = tokio::fs::read_dir(&fs_path).await?;
        let mut fis = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let inner = tokio::fs::symlink_metadata(entry.path()).await?;
            fis.push(Fileinfo {
                name: entry.file_name().to_string_lossy().into_owned(),
                metadata: Meta { inner },
            });
        }
        fis.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(fis)
    }

    #[tracing_attributes::instrument]
    async fn get(&self, path: &str) -> Result<Fileinfo<Self::Metadata>> {
        let (client_path, fs_path) = self.resolve(path);
        let inner = tokio::fs::metadata(&fs_path).await?;
        let name = client_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| String::from("."));
        Ok(Fileinfo { name, metadata: Meta { inner } })
    }

    #[tracing_attributes::instrument]
    async fn write(&self, path: &str, options: WriteOptions) -> Result<Opened<WriteStream>> {
        let (client_path, fs_path) = self.resolve(path);
        let existed = tokio::fs::try_exists(&fs_path).await.unwrap_or(false);
        let mut file = tokio::fs::OpenOptions::new().write(true).create(true).truncate(false).open(&fs_path).await?;
        let kept = if options.append && options.start == 0 {
            file.seek(std::io::SeekFrom::End(0)).await?
        } else {
            file.set_len(options.start).await?;
            file.seek(std::io::SeekFrom::Start(options.start)).await?
        };
        let rollback = if existed && kept > 0 { Rollback::Truncate(kept) } else { Rollback::Remove };
        Ok(Opened {
            stream: Box::new(FileSink::new(file, fs_path.clone(), rollback)),
            client_path: Self::display(&client_path),
            server_path: Self::display(&fs_path),
        })
    }

    #[tracing_attributes::instrument]
    async fn read(&self, path: &str, start: u64) -> Result<Opened<ReadStream>> {
        let (client_path, fs_path) = self.resolve(path);
        if tokio::fs::metadata(&fs_path).await?.is_dir() {
            return Err(Error::new(ErrorKind::PermanentFileNotAvailable, "Cannot read a directory"));
        }
        let mut file = tokio::fs::File::open(&fs_path).await?;
        if start > 0 {
            file.seek(std::io::SeekFrom::Start(start)).await?;
        }
        Ok(Opened {
            stream: Box::new(tokio::io::BufReader::with_capacity(4096, file)),
            client_path: Self::display(&client_path),
            server_path: Self::display(&fs_path),
        })
    }

    #[tracing_attributes::instrument]
    async fn delete(&self, path: &str) -> Result<()> {
        let (_, fs_path) = self.resolve(path);
        if fs_path == self.root {
            return Err(Error::new(ErrorKind::PermissionDenied, "Cannot delete the root directory"));
        }
        if tokio::fs::symlink_metadata(&fs_path).await?.is_dir() {
            tokio::fs::remove_dir(&fs_path).await.map_err(|e| match e.kind() {
                io::ErrorKind::DirectoryNotEmpty => Error::new(ErrorKind::PermanentDirectoryNotEmpty, e),
                _ => Error::from(e),
            })
        } else {
            tokio::fs::remove_file(&fs_path).await.map_err(Error::from)
        }
    }

    #[tracing_attributes::instrument]
    async fn mkdir(&self, path: &str) -> Result<String> {
        let (client_path, fs_path) = self.resolve(path);
        tokio::fs::create_dir_all(&fs_path).await?;
        Ok(Self::display(&client_path))
    }

    #[tracing_attributes::instrument]
    async fn rename(&self, from: &str, to: &str) -> Result<()> {
        let (_, from) = self.resolve(from);
        let (_, to) = self.resolve(to);
        tokio::fs::rename(&from, &to)
            .await
            .map_err(|e| Error::new(ErrorKind::PermanentFileNotAvailable, e))
    }

    #[tracing_attributes::instrument]
    async fn chmod(&self, path: &str, mode: u32) -> Result<()> {
        let (_, fs_path) = self.resolve(path);
        cfg_if! {
            if #[cfg(unix)] {
                tokio::fs::set_permissions(&fs_path, std::fs::Permissions::from_mode(mode)).await.map_err(Error::from)
            } else {
                let _ = (fs_path, mode);
                Err(Error::from(ErrorKind::CommandNotImplemented))
            }
        }
    }

    #[tracing_attributes::instrument]
    async fn unique_name(&self, hint: &str) -> Result<String> {
        let millis = SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or_default();
        let mut suffix = [0u8; 4];
        getrandom::fill(&mut suffix).map_err(|e| Error::new(ErrorKind::LocalError, e.to_string()))?;
        let suffix: String = suffix.iter().map(|b| format!("{:02x}", b)).collect();
        let name = format!("{}{}", to_base36(millis), suffix);
        let parent = Path::new(hint).parent().filter(|p| !p.as_os_str().is_empty());
        Ok(match parent {
            Some(parent) => Self::display(&parent.join(name)),
            None => name,
        })
    }
}

impl Metadata for Meta {
    fn len(&self) -> u64 {
        self.inner.len()
    }

    fn is_dir(&self) -> bool {
        self.inner.is_dir()
    }

    fn is_file(&self) -> bool {
        self.inner.is_file()
    }

    fn is_symlink(&self) -> bool {
        self.inner.file_type().is_symlink()
    }

    fn modified(&self) -> Result<SystemTime> {
        self.inner.modified().map_err(|e| e.into())
    }

    fn gid(&self) -> u32 {
        cfg_if! {
            if #[cfg(unix)] {
                self.inner.gid()
            } else {
                0
            }
        }
    }

    fn uid(&self) -> u32 {
        cfg_if! {
            if #[cfg(unix)] {
                self.inner.uid()
            } else {
                0
            }
        }
    }

    fn links(&self) -> u64 {
        cfg_if! {
            if #[cfg(unix)] {
                self.inner.nlink()
            } else {
                1
            }
        }
    }

    fn mode(&self) -> Option<u32> {
        cfg_if! {
            if #[cfg(unix)] {
                Some(self.inner.permissions().mode())
            } else {
                None
            }
        }
    }

    fn device_and_inode(&self) -> Option<(u64, u64)> {
        cfg_if! {
            if #[cfg(unix)] {
                Some((self.inner.dev(), self.inner.ino()))
            } else {
                None
            }
        }
    }
}

#[cfg(test)]
mod tests;
