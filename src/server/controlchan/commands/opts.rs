//! The RFC 2389 Options (`OPTS`) command
//
// The OPTS (options) command allows a user-PI to specify the
// desired behavior of a server-FTP process when another FTP
// command (the target command) is later issued. The only option supported is `UTF8 ON|OFF`
// which switches how command lines are decoded.

use crate::{
    server::{
        controlchan::{
            Reply, ReplyCode,
            error::ControlChanError,
            handler::{CommandContext, CommandHandler},
        },
        session::Encoding,
    },
    storage::StorageBackend,
};
use async_trait::async_trait;

#[derive(Debug)]
pub struct Opts;

#[async_trait]
impl<Storage> CommandHandler<Storage> for Opts
where
    Storage: StorageBackend + 'static,
{
    #[tracing_attributes::instrument]
    async fn handle(&self, args: CommandContext<Storage>) -> Result<Reply, ControlChanError> {
        let Some(argument) = args.cmd.argument.as_deref() else {
            return Ok(Reply::code(ReplyCode::ParameterSyntaxError));
        };
        let mut words = argument.split(' ');
        let option = words.next().unwrap_or("").to_uppercase();
        if option != "UTF8" && option != "UTF-8" {
            return Ok(Reply::new(ReplyCode::ParameterSyntaxError, "Unknown option command"));
        }

        let setting = words.next().unwrap_or("");
        let encoding = match setting.to_uppercase().as_str() {
            "ON" => Encoding::Utf8,
            "OFF" => Encoding::Ascii,
            _ => return Ok(Reply::new(ReplyCode::ParameterSyntaxError, "Unknown setting for option")),
        };
        args.session.lock().await.encoding = encoding;
        Ok(Reply::new_with_string(
            ReplyCode::CommandOkay,
            format!("UTF8 encoding {}", setting.to_lowercase()),
        ))
    }
}
