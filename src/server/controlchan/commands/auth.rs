//! The RFC 2228 Authentication/Security Mechanism (`AUTH`) command
//
// The argument field is a Telnet string identifying a supported
// mechanism. Only TLS is supported, and only when the server has a certificate configured.

use crate::{
    server::{
        ControlChanMsg,
        controlchan::{
            Reply, ReplyCode,
            error::ControlChanError,
            handler::{CommandContext, CommandHandler},
        },
    },
    storage::StorageBackend,
};
use async_trait::async_trait;

#[derive(Debug)]
pub struct Auth;

#[async_trait]
impl<Storage> CommandHandler<Storage> for Auth
where
    Storage: StorageBackend + 'static,
{
    #[tracing_attributes::instrument]
    async fn handle(&self, args: CommandContext<Storage>) -> Result<Reply, ControlChanError> {
        if !args.cmd.arg().eq_ignore_ascii_case("TLS") {
            return Ok(Reply::code(ReplyCode::CommandNotImplementedForParameter));
        }
        if args.ftps_config.acceptor().is_none() {
            return Ok(Reply::code(ReplyCode::CommandNotImplemented));
        }
        if args.session.lock().await.secure {
            return Ok(Reply::code(ReplyCode::CommandOkayNotImplemented));
        }
        // The upgrade happens after this reply went out in plain text.
        if let Err(err) = args.tx_control_chan.send(ControlChanMsg::SecureControlChannel).await {
            slog::warn!(args.logger, "AUTH: Could not send internal message to upgrade the control channel: {}", err);
            return Ok(Reply::code(ReplyCode::LocalError));
        }
        Ok(Reply::code(ReplyCode::AuthOkayNoDataNeeded))
    }
}
