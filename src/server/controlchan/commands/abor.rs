//! The RFC 959 Abort (`ABOR`) command
//
// This command tells the server to abort the previous FTP
// service command and any associated transfer of data.
//
// Transfers run to completion before the next command is read, so by the time ABOR arrives the
// most there can be is a data connection that was opened but not used yet.

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
pub struct Abor;

#[async_trait]
impl<Storage> CommandHandler<Storage> for Abor
where
    Storage: StorageBackend + 'static,
{
    #[tracing_attributes::instrument]
    async fn handle(&self, args: CommandContext<Storage>) -> Result<Reply, ControlChanError> {
        let mut session = args.session.lock().await;
        let was_connected = session.connector.as_ref().map(|c| c.is_connected()).unwrap_or(false);
        session.end_connector();
        drop(session);

        if was_connected {
            args.reply_writer.send(Reply::code(ReplyCode::ConnectionClosed)).await?;
            Ok(Reply::code(ReplyCode::ClosingDataConnection))
        } else {
            Ok(Reply::code(ReplyCode::DataConnectionOpen))
        }
    }
}
