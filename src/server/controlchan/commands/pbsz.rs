//! The RFC 2228 Protection Buffer Size (`PBSZ`) command
//
// The argument is a decimal integer representing the maximum size, in bytes, of the encoded data
// blocks to be sent or received during file transfer. For TLS it must be 0.

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
pub struct Pbsz;

#[async_trait]
impl<Storage> CommandHandler<Storage> for Pbsz
where
    Storage: StorageBackend + 'static,
{
    async fn handle(&self, args: CommandContext<Storage>) -> Result<Reply, ControlChanError> {
        let mut session = args.session.lock().await;
        if !session.secure {
            return Ok(Reply::new(ReplyCode::CommandOkayNotImplemented, "Not supported"));
        }
        let size = match args.cmd.arg().parse::<u32>() {
            Ok(size) => size,
            Err(_) => return Ok(Reply::code(ReplyCode::ParameterSyntaxError)),
        };
        session.protection_buffer_size = Some(size);
        if size == 0 {
            Ok(Reply::new(ReplyCode::CommandOkay, "OK"))
        } else {
            Ok(Reply::new(ReplyCode::CommandOkay, "Buffer too large: PBSZ=0"))
        }
    }
}
