//! The RFC 959 Delete (`DELE`) command
//
// This command causes the file specified in the pathname to be
// deleted at the server site.

use super::{no_storage, storage_failure};
use crate::{
    server::controlchan::{
        Reply, ReplyCode,
        error::ControlChanError,
        handler::{CommandContext, CommandHandler},
    },
    storage::StorageBackend,
};
use async_trait::async_trait;

#[derive(Debug)]
pub struct Dele;

#[async_trait]
impl<Storage> CommandHandler<Storage> for Dele
where
    Storage: StorageBackend + 'static,
{
    #[tracing_attributes::instrument]
    async fn handle(&self, args: CommandContext<Storage>) -> Result<Reply, ControlChanError> {
        delete(&args).await
    }
}

/// Deletes the path given as argument. Shared with RMD, the back-end decides what a path may be.
pub(super) async fn delete<Storage>(args: &CommandContext<Storage>) -> Result<Reply, ControlChanError>
where
    Storage: StorageBackend + 'static,
{
    let session = args.session.lock().await;
    let Some(storage) = session.storage.as_ref() else {
        return Ok(no_storage());
    };
    match storage.delete(args.cmd.arg()).await {
        Ok(()) => Ok(Reply::code(ReplyCode::FileActionOkay)),
        Err(err) => {
            slog::warn!(args.logger, "{} {} failed: {}", args.cmd.directive, args.cmd.arg(), err);
            Ok(storage_failure(&err, ReplyCode::FileError))
        }
    }
}
