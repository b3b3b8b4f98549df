//! The RFC 959 Representation Type (`TYPE`) command
//
// The argument specifies the representation type as described
// in the Section on Data Representation and Storage.
//
// A - ASCII, I - Image, L <byte size> - Local byte Byte size
//
// Bytes are always moved as they are; the type is only validated.

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
pub struct Type;

#[async_trait]
impl<Storage> CommandHandler<Storage> for Type
where
    Storage: StorageBackend + 'static,
{
    #[tracing_attributes::instrument]
    async fn handle(&self, args: CommandContext<Storage>) -> Result<Reply, ControlChanError> {
        let reply = match args.cmd.arg().to_uppercase().as_str() {
            "A" | "A N" => Reply::new(ReplyCode::CommandOkay, "Switch to \"ascii\" transfer mode."),
            "I" | "L" | "L 8" => Reply::new(ReplyCode::CommandOkay, "Switch to \"binary\" transfer mode."),
            _ => Reply::code(ReplyCode::ParameterSyntaxError),
        };
        Ok(reply)
    }
}
