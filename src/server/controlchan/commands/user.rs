//! The RFC 959 User Name (`USER`) command
//
// The argument field is a Telnet string identifying the user.
// The user identification is that which is required by the
// server for access to its file system.  This command will
// normally be the first command transmitted by the user after
// the control connections are made.

use super::pass::login;
use crate::{
    server::{
        controlchan::{
            Reply, ReplyCode,
            error::ControlChanError,
            handler::{CommandContext, CommandHandler},
        },
        session::SessionState,
    },
    storage::StorageBackend,
};
use async_trait::async_trait;

const ANONYMOUS: &str = "anonymous";

#[derive(Debug)]
pub struct User;

#[async_trait]
impl<Storage> CommandHandler<Storage> for User
where
    Storage: StorageBackend + 'static,
{
    #[tracing_attributes::instrument]
    async fn handle(&self, args: CommandContext<Storage>) -> Result<Reply, ControlChanError> {
        let mut session = args.session.lock().await;
        if session.username.is_some() {
            return Ok(Reply::new(ReplyCode::NotLoggedIn, "Username already set"));
        }
        if session.is_authenticated() {
            return Ok(Reply::code(ReplyCode::UserLoggedIn));
        }
        let username = match args.cmd.argument.as_deref() {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => return Ok(Reply::new(ReplyCode::ParameterSyntaxError, "Must provide username")),
        };
        session.username = Some(username.clone());

        if args.anonymous && username == ANONYMOUS {
            return Ok(login(&args, &mut session, &username, "@anonymous").await);
        }
        session.state = SessionState::WaitPass;
        Ok(Reply::code(ReplyCode::NeedPassword))
    }
}
