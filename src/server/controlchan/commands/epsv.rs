//! The RFC 2428 Extended Passive Mode (`EPSV`) command
//
// The EPSV command requests that a server listen on a data port and
// wait for a connection.  The response to this command includes only
// the TCP port number of the listening connection, the client connects to the host it already
// talks to.

use super::passive_common;
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
pub struct Epsv;

#[async_trait]
impl<Storage> CommandHandler<Storage> for Epsv
where
    Storage: StorageBackend + 'static,
{
    #[tracing_attributes::instrument]
    async fn handle(&self, args: CommandContext<Storage>) -> Result<Reply, ControlChanError> {
        match passive_common::listen(&args).await {
            Ok(port) => Ok(Reply::new_with_string(
                ReplyCode::EnteringExtendedPassiveMode,
                format!("EPSV OK (|||{}|)", port),
            )),
            Err(reply) => Ok(reply),
        }
    }
}
