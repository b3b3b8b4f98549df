//! The RFC 3659 Restart (`REST`) command
//
// The argument field represents the server marker at which
// file transfer is to be restarted. The next STOR, APPE or RETR starts at this byte offset,
// after which the offset goes back to zero.

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
pub struct Rest;

#[async_trait]
impl<Storage> CommandHandler<Storage> for Rest
where
    Storage: StorageBackend + 'static,
{
    #[tracing_attributes::instrument]
    async fn handle(&self, args: CommandContext<Storage>) -> Result<Reply, ControlChanError> {
        match args.cmd.arg().parse::<u64>() {
            Ok(offset) => {
                args.session.lock().await.rest_byte_count = offset;
                Ok(Reply::new_with_string(
                    ReplyCode::FileActionPending,
                    format!("Restarting next transfer at {}", offset),
                ))
            }
            Err(_) => Ok(Reply::new(ReplyCode::ParameterSyntaxError, "Byte count must be 0 or greater")),
        }
    }
}
