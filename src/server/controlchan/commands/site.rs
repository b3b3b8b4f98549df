//! The RFC 959 Site Parameters (`SITE`) command
//
// This command is used by the server to provide services
// specific to his system that are essential to file transfer
// but not sufficiently universal to be included as commands in
// the protocol. The argument is parsed as a command of its own: `SITE CHMOD 644 file.txt`.

use super::{no_storage, storage_failure};
use crate::{
    server::controlchan::{
        Command, Reply, ReplyCode, ReplyLine,
        error::ControlChanError,
        handler::{CommandContext, CommandHandler},
        line_parser, registry,
    },
    storage::StorageBackend,
};
use async_trait::async_trait;

#[derive(Debug)]
pub struct Site;

#[async_trait]
impl<Storage> CommandHandler<Storage> for Site
where
    Storage: StorageBackend + 'static,
{
    #[tracing_attributes::instrument]
    async fn handle(&self, args: CommandContext<Storage>) -> Result<Reply, ControlChanError> {
        let sub = match line_parser::parse(args.cmd.arg()) {
            Ok(sub) => sub,
            Err(_) => return Ok(Reply::code(ReplyCode::CommandNotImplemented)),
        };
        let Some(spec) = registry::lookup_site(&sub.directive) else {
            return Ok(Reply::code(ReplyCode::CommandNotImplemented));
        };
        if let Some(refusal) = args.acl.check(&format!("SITE {}", sub.directive)) {
            return Ok(refusal);
        }
        slog::debug!(args.logger, "SITE subcommand {}", sub);
        match spec.names.first().copied() {
            Some("CHMOD") => chmod(&args, &sub).await,
            _ => Ok(help()),
        }
    }
}

async fn chmod<Storage>(args: &CommandContext<Storage>, sub: &Command) -> Result<Reply, ControlChanError>
where
    Storage: StorageBackend + 'static,
{
    let Some((mode, path)) = sub.arg().split_once(' ') else {
        return Ok(Reply::code(ReplyCode::CommandSyntaxError));
    };
    let Ok(mode) = u32::from_str_radix(mode, 8) else {
        return Ok(Reply::code(ReplyCode::CommandSyntaxError));
    };
    let session = args.session.lock().await;
    let Some(storage) = session.storage.as_ref() else {
        return Ok(no_storage());
    };
    match storage.chmod(path, mode).await {
        Ok(()) => Ok(Reply::code(ReplyCode::CommandOkay)),
        Err(err) => {
            slog::warn!(args.logger, "SITE CHMOD {:o} {} failed: {}", mode, path, err);
            Ok(storage_failure(&err, ReplyCode::CommandSyntaxError))
        }
    }
}

fn help() -> Reply {
    let mut lines = vec![ReplyLine::from("Supported SITE commands:")];
    lines.extend(
        registry::site_names()
            .filter_map(|name| registry::lookup_site(name).map(|spec| ReplyLine::from(spec.usage(name)))),
    );
    lines.push(ReplyLine::from("End"));
    Reply::new_multiline(ReplyCode::HelpMessage, lines)
}
