//! The RFC 959 Allocate (`ALLO`) command
//
// Storage is allocated on demand by the back-end, so there is nothing to reserve up front.

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
pub struct Allo;

#[async_trait]
impl<Storage> CommandHandler<Storage> for Allo
where
    Storage: StorageBackend + 'static,
{
    async fn handle(&self, _args: CommandContext<Storage>) -> Result<Reply, ControlChanError> {
        Ok(Reply::code(ReplyCode::CommandOkayNotImplemented))
    }
}
