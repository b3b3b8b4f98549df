//! The RFC 3659 File Size (`SIZE`) command
//
// The FTP command, SIZE OF FILE (SIZE), is used to obtain the transfer
// size of a file from the server-FTP process.

use super::{no_storage, storage_failure};
use crate::{
    server::controlchan::{
        Reply, ReplyCode,
        error::ControlChanError,
        handler::{CommandContext, CommandHandler},
    },
    storage::{Metadata, StorageBackend},
};
use async_trait::async_trait;

#[derive(Debug)]
pub struct Size;

#[async_trait]
impl<Storage> CommandHandler<Storage> for Size
where
    Storage: StorageBackend + 'static,
{
    #[tracing_attributes::instrument]
    async fn handle(&self, args: CommandContext<Storage>) -> Result<Reply, ControlChanError> {
        let session = args.session.lock().await;
        let Some(storage) = session.storage.as_ref() else {
            return Ok(no_storage());
        };
        match storage.get(args.cmd.arg()).await {
            Ok(info) => Ok(Reply::new_with_string(ReplyCode::FileStatus, info.metadata.len().to_string())),
            Err(err) => Ok(storage_failure(&err, ReplyCode::FileError)),
        }
    }
}
