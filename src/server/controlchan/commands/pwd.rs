//! The RFC 959 Print Working Directory (`PWD`) command
//
// This command causes the name of the current working
// directory to be returned in the reply.

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
pub struct Pwd;

#[async_trait]
impl<Storage> CommandHandler<Storage> for Pwd
where
    Storage: StorageBackend + 'static,
{
    async fn handle(&self, args: CommandContext<Storage>) -> Result<Reply, ControlChanError> {
        let session = args.session.lock().await;
        let Some(storage) = session.storage.as_ref() else {
            return Ok(no_storage());
        };
        match storage.current_directory().await {
            Ok(cwd) => Ok(Reply::new_with_string(
                ReplyCode::DirCreated,
                format!("{} is your current location", quote_path(&cwd)),
            )),
            Err(err) => Ok(storage_failure(&err, ReplyCode::FileError)),
        }
    }
}
