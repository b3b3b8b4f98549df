//! The RFC 959 Rename From (`RNFR`) command

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
pub struct Rnfr;

#[async_trait]
impl<Storage> CommandHandler<Storage> for Rnfr
where
    Storage: StorageBackend + 'static,
{
    #[tracing_attributes::instrument]
    async fn handle(&self, args: CommandContext<Storage>) -> Result<Reply, ControlChanError> {
        let mut session = args.session.lock().await;
        let Some(storage) = session.storage.as_ref() else {
            return Ok(no_storage());
        };
        let from = args.cmd.arg().to_string();
        let exists = storage.get(&from).await.map(|_| ());
        match exists {
            Ok(()) => {
                session.rename_from = Some(from);
                Ok(Reply::code(ReplyCode::FileActionPending))
            }
            Err(err) => {
                slog::warn!(args.logger, "RNFR {} failed: {}", from, err);
                Ok(storage_failure(&err, ReplyCode::FileError))
            }
        }
    }
}
