//! The RFC 2389 Feature (`FEAT`) command

use crate::{
    server::controlchan::{
        Reply, ReplyCode, ReplyLine,
        error::ControlChanError,
        handler::{CommandContext, CommandHandler},
        registry,
    },
    storage::StorageBackend,
};
use async_trait::async_trait;

#[derive(Debug)]
pub struct Feat;

#[async_trait]
impl<Storage> CommandHandler<Storage> for Feat
where
    Storage: StorageBackend + 'static,
{
    async fn handle(&self, _args: CommandContext<Storage>) -> Result<Reply, ControlChanError> {
        let mut lines = vec![ReplyLine::from("Extensions supported")];
        // Feature lines start with a space and carry no reply code.
        lines.extend(registry::features().into_iter().map(|feat| ReplyLine::Raw(format!(" {}", feat))));
        lines.push(ReplyLine::from("End"));
        Ok(Reply::new_multiline(ReplyCode::SystemStatus, lines))
    }
}
