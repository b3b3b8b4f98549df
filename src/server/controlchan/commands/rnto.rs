//! The RFC 959 Rename To (`RNTO`) command
//
// This command specifies the new pathname of the file
// specified in the immediately preceding "rename from"
// command.  Together the two commands cause a file to be
// renamed.

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
pub struct Rnto;

#[async_trait]
impl<Storage> CommandHandler<Storage> for Rnto
where
    Storage: StorageBackend + 'static,
{
    #[tracing_attributes::instrument]
    async fn handle(&self, args: CommandContext<Storage>) -> Result<Reply, ControlChanError> {
        let mut session = args.session.lock().await;
        // Whatever happens next, the pending rename is used up.
        let Some(from) = session.rename_from.take() else {
            return Ok(Reply::code(ReplyCode::BadCommandSequence));
        };
        let Some(storage) = session.storage.as_ref() else {
            return Ok(no_storage());
        };
        let to = args.cmd.arg();
        match storage.rename(&from, to).await {
            Ok(()) => {
                args.emitter.transfer("RNTO", None, Some(to.to_string())).await;
                Ok(Reply::code(ReplyCode::FileActionOkay))
            }
            Err(err) => {
                slog::warn!(args.logger, "RNTO {} to {} failed: {}", from, to, err);
                args.emitter.transfer("RNTO", Some(err.message()), None).await;
                Ok(storage_failure(&err, ReplyCode::FileError))
            }
        }
    }
}
