use ftpsrv_core::storage::{Error, Result, WriteSink};
use futures::future::BoxFuture;
use std::{
    io,
    path::PathBuf,
    pin::Pin,
    task::{Context, Poll},
};
use tokio::io::{AsyncWrite, BufWriter};

/// What to do with the file when an upload fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Rollback {
    /// The upload created the file, so remove it.
    Remove,
    /// The upload resumed or appended to existing content, so cut it back to this length.
    Truncate(u64),
}

/// Upload destination on local disk.
pub(crate) struct FileSink {
    file: BufWriter<tokio::fs::File>,
    path: PathBuf,
    rollback: Rollback,
}

impl FileSink {
    pub(crate) fn new(file: tokio::fs::File, path: PathBuf, rollback: Rollback) -> Self {
        FileSink {
            file: BufWriter::with_capacity(4096, file),
            path,
            rollback,
        }
    }
}

impl AsyncWrite for FileSink {
    fn poll_write(mut self: Pin<&mut Self>, cx: &mut Context<'_>, buf: &[u8]) -> Poll<io::Result<usize>> {
        Pin::new(&mut self.file).poll_write(cx, buf)
    }

    fn poll_flush(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.file).poll_flush(cx)
    }

    fn poll_shutdown(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.file).poll_shutdown(cx)
    }
}

impl WriteSink for FileSink {
    fn abort(self: Box<Self>) -> BoxFuture<'static, Result<()>> {
        Box::pin(async move {
            let FileSink { file, path, rollback } = *self;
            // Buffered bytes are dropped on purpose.
            let file = file.into_inner();
            match rollback {
                Rollback::Truncate(len) => file.set_len(len).await.map_err(Error::from),
                Rollback::Remove => {
                    drop(file);
                    match tokio::fs::remove_file(&path).await {
                        Ok(()) => Ok(()),
                        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
                        Err(e) => Err(Error::from(e)),
                    }
                }
            }
        })
    }
}
