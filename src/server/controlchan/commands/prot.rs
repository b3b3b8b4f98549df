//! The RFC 2228 Data Channel Protection Level (`PROT`) command
//
// The argument is a single Telnet character code specifying the data channel protection level:
// C - Clear, S - Safe, E - Confidential, P - Private. With TLS only Private makes sense.

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
pub struct Prot;

#[async_trait]
impl<Storage> CommandHandler<Storage> for Prot
where
    Storage: StorageBackend + 'static,
{
    async fn handle(&self, args: CommandContext<Storage>) -> Result<Reply, ControlChanError> {
        let session = args.session.lock().await;
        if !session.secure {
            return Ok(Reply::new(ReplyCode::CommandOkayNotImplemented, "Not supported"));
        }
        if session.protection_buffer_size.is_none() {
            return Ok(Reply::code(ReplyCode::BadCommandSequence));
        }
        let reply = match args.cmd.arg().to_uppercase().as_str() {
            "P" => Reply::new(ReplyCode::CommandOkay, "OK"),
            "C" | "S" | "E" => Reply::new(ReplyCode::ProtectionLevelNotSupported, "Not supported"),
            _ => Reply::code(ReplyCode::CommandNotImplementedForParameter),
        };
        Ok(reply)
    }
}
