//! Sends replies on the control channel and raw payloads on data connections.

use super::{codecs::FtpCodec, error::ControlChanError, reply::Reply};
use crate::{metrics, server::io::AsyncReadAsyncWriteSendUnpin};
use futures_util::{SinkExt, stream::SplitSink};
use std::sync::Arc;
use tokio::{
    io::{AsyncWrite, AsyncWriteExt},
    sync::Mutex,
};
use tokio_util::codec::Framed;

pub(crate) type ControlStream = Framed<Box<dyn AsyncReadAsyncWriteSendUnpin>, FtpCodec>;
pub(crate) type ReplySink = SplitSink<ControlStream, Reply>;

/// The writing half of the control connection, shared by the control loop and the command
/// handlers. Every send completes before the next one starts, so replies reach the client in the
/// order they were sent.
#[derive(Clone)]
pub(crate) struct ReplyWriter {
    sink: Arc<Mutex<Option<ReplySink>>>,
    collect_metrics: bool,
}

impl std::fmt::Debug for ReplyWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReplyWriter").finish_non_exhaustive()
    }
}

impl ReplyWriter {
    pub(crate) fn new(sink: ReplySink, collect_metrics: bool) -> Self {
        ReplyWriter {
            sink: Arc::new(Mutex::new(Some(sink))),
            collect_metrics,
        }
    }

    /// Sends a reply and flushes it out.
    pub(crate) async fn send(&self, reply: Reply) -> Result<(), ControlChanError> {
        if let Reply::None = reply {
            return Ok(());
        }
        if self.collect_metrics {
            metrics::add_reply_metric(&reply);
        }
        let mut guard = self.sink.lock().await;
        match guard.as_mut() {
            Some(sink) => sink.send(reply).await,
            // Only while the control channel is being upgraded to TLS.
            None => Err(super::error::ControlChanErrorKind::IllegalState.into()),
        }
    }

    /// Takes the sink out, for instance to reunite it with its stream for the TLS upgrade.
    pub(crate) async fn take(&self) -> Option<ReplySink> {
        self.sink.lock().await.take()
    }

    /// Puts a (new) sink in place.
    pub(crate) async fn replace(&self, sink: ReplySink) {
        *self.sink.lock().await = Some(sink);
    }
}

/// Writes a payload verbatim to a data connection, without any reply code.
pub(crate) async fn write_raw<W>(socket: &mut W, payload: &[u8]) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin + ?Sized,
{
    socket.write_all(payload).await?;
    socket.flush().await
}
