//! The RFC 959 Change Working Directory (`CWD`) command
//
// This command allows the user to work with a different
// directory or dataset for file storage or retrieval without
// altering his login or accounting information.

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
pub struct Cwd;

#[async_trait]
impl<Storage> CommandHandler<Storage> for Cwd
where
    Storage: StorageBackend + 'static,
{
    #[tracing_attributes::instrument]
    async fn handle(&self, args: CommandContext<Storage>) -> Result<Reply, ControlChanError> {
        let path = args.cmd.arg().to_string();
        change_dir(&args, &path).await
    }
}

/// Changes directory and replies with the new one. Shared with CDUP.
pub(super) async fn change_dir<Storage>(args: &CommandContext<Storage>, path: &str) -> Result<Reply, ControlChanError>
where
    Storage: StorageBackend + 'static,
{
    let mut session = args.session.lock().await;
    let Some(storage) = session.storage.as_mut() else {
        return Ok(no_storage());
    };
    match storage.chdir(path).await {
        Ok(cwd) => Ok(Reply::new_with_string(
            ReplyCode::FileActionOkay,
            format!("OK. Current directory is {}", quote_path(&cwd)),
        )),
        Err(err) => {
            slog::warn!(args.logger, "CWD to {} failed: {}", path, err);
            Ok(storage_failure(&err, ReplyCode::FileError))
        }
    }
}
