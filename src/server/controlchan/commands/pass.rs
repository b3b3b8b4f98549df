//! The RFC 959 Password (`PASS`) command
//
// The argument field is a Telnet string specifying the user's
// password.  This command must be immediately preceded by the
// user name command, and, for some sites, completes the user's
// identification for access control.

use crate::{
    auth::{AuthenticationError, Credentials},
    notification::ServerEvent,
    server::{
        controlchan::{
            Reply, ReplyCode,
            error::ControlChanError,
            handler::{CommandContext, CommandHandler},
        },
        session::{Session, SessionState},
    },
    storage::StorageBackend,
};
use async_trait::async_trait;

#[derive(Debug)]
pub struct Pass;

#[async_trait]
impl<Storage> CommandHandler<Storage> for Pass
where
    Storage: StorageBackend + 'static,
{
    #[tracing_attributes::instrument]
    async fn handle(&self, args: CommandContext<Storage>) -> Result<Reply, ControlChanError> {
        let mut session = args.session.lock().await;
        let Some(username) = session.username.clone() else {
            return Ok(Reply::code(ReplyCode::BadCommandSequence));
        };
        if session.is_authenticated() {
            return Ok(Reply::code(ReplyCode::CommandOkayNotImplemented));
        }
        let Some(password) = args.cmd.argument.as_deref() else {
            return Ok(Reply::new(ReplyCode::ParameterSyntaxError, "Must provide password"));
        };
        Ok(login(&args, &mut session, &username, password).await)
    }
}

/// Authenticates the user and sets up its storage back-end. Returns 230 on success.
pub(super) async fn login<Storage>(args: &CommandContext<Storage>, session: &mut Session<Storage>, username: &str, password: &str) -> Reply
where
    Storage: StorageBackend + 'static,
{
    let creds = Credentials::new(username, password);
    let principal = match args.authenticator.authenticate(&creds).await {
        Ok(principal) => principal,
        Err(err) => {
            slog::warn!(args.logger, "Login failed for user {}: {}", username, err);
            let code = ReplyCode::from_code(err.reply_code())
                .filter(|code| !code.is_positive())
                .unwrap_or(ReplyCode::NotLoggedIn);
            return match err {
                AuthenticationError::Rejected { message, .. } => Reply::new_with_string(code, message),
                _ => Reply::new(code, "Authentication failed"),
            };
        }
    };

    let storage = (args.storage_factory)().and_then(|mut storage| {
        storage.enter(&principal)?;
        Ok(storage)
    });
    let storage = match storage {
        Ok(storage) => storage,
        Err(err) => {
            slog::warn!(args.logger, "Could not set up the file system for user {}: {}", username, err);
            return Reply::new(ReplyCode::NotLoggedIn, "Could not set up the file system");
        }
    };

    slog::info!(args.logger, "User {} logged in", username);
    session.storage = Some(storage);
    session.state = SessionState::WaitCmd;
    args.emitter.set_username(username);
    args.emitter.emit(ServerEvent::LoggedIn).await;
    Reply::code(ReplyCode::UserLoggedIn)
}
