//! The RFC 959 Transfer Mode (`MODE`) command
//
// The argument is a single Telnet character code specifying
// the data transfer modes: S - Stream, B - Block, C -
// Compressed. Only stream mode is supported.

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
pub struct Mode;

#[async_trait]
impl<Storage> CommandHandler<Storage> for Mode
where
    Storage: StorageBackend + 'static,
{
    async fn handle(&self, args: CommandContext<Storage>) -> Result<Reply, ControlChanError> {
        if args.cmd.arg().eq_ignore_ascii_case("S") {
            Ok(Reply::code(ReplyCode::CommandOkay))
        } else {
            Ok(Reply::code(ReplyCode::CommandNotImplementedForParameter))
        }
    }
}
