//! The RFC 959 File Structure (`STRU`) command
//
// The argument is a single Telnet character code specifying
// file structure: F - File (no record structure), R - Record
// structure, P - Page structure. Only F is supported.

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
pub struct Stru;

#[async_trait]
impl<Storage> CommandHandler<Storage> for Stru
where
    Storage: StorageBackend + 'static,
{
    async fn handle(&self, args: CommandContext<Storage>) -> Result<Reply, ControlChanError> {
        if args.cmd.arg().eq_ignore_ascii_case("F") {
            Ok(Reply::code(ReplyCode::CommandOkay))
        } else {
            Ok(Reply::code(ReplyCode::CommandNotImplementedForParameter))
        }
    }
}
