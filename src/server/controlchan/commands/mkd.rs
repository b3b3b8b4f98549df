//! The RFC 959 Make Directory (`MKD`) command
//
// This command causes the directory specified in the pathname
// to be created as a directory (if the pathname is absolute)
// or as a subdirectory of the current working directory (if
// the pathname is relative). Missing parents are created too.

use super::{no_storage, quote_path, storage_failure};
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
pub struct Mkd;

#[async_trait]
impl<Storage> CommandHandler<Storage> for Mkd
where
    Storage: StorageBackend + 'static,
{
    #[tracing_attributes::instrument]
    async fn handle(&self, args: CommandContext<Storage>) -> Result<Reply, ControlChanError> {
        let session = args.session.lock().await;
        let Some(storage) = session.storage.as_ref() else {
            return Ok(no_storage());
        };
        match storage.mkdir(args.cmd.arg()).await {
            Ok(dir) => Ok(Reply::new_with_string(ReplyCode::DirCreated, quote_path(&dir))),
            Err(err) => {
                slog::warn!(args.logger, "MKD {} failed: {}", args.cmd.arg(), err);
                Ok(storage_failure(&err, ReplyCode::FileError))
            }
        }
    }
}
