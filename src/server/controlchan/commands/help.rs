//! The RFC 959 Help (`HELP`) command
//
// This command shall cause the server to send helpful
// information regarding its implementation status over the
// control connection to the user.  The command may take an
// argument (e.g., any command name) and return more specific
// information as a response.

use crate::{
    server::controlchan::{
        Reply, ReplyCode,
        error::ControlChanError,
        handler::{CommandContext, CommandHandler},
        registry,
    },
    storage::StorageBackend,
};
use async_trait::async_trait;

const NAMES_PER_LINE: usize = 5;

#[derive(Debug)]
pub struct Help;

#[async_trait]
impl<Storage> CommandHandler<Storage> for Help
where
    Storage: StorageBackend + 'static,
{
    #[tracing_attributes::instrument]
    async fn handle(&self, args: CommandContext<Storage>) -> Result<Reply, ControlChanError> {
        let directive = args.cmd.arg().to_uppercase();
        if directive.is_empty() {
            return Ok(overview(registry::names()));
        }
        match registry::lookup(&directive) {
            Some(spec) => Ok(Reply::new_multiline(
                ReplyCode::HelpMessage,
                vec![spec.usage(&directive), spec.description.to_string()],
            )),
            None => Ok(Reply::new_with_string(
                ReplyCode::CommandNotImplemented,
                format!("Unknown command {}.", directive),
            )),
        }
    }
}

/// Lists the given command names, a few per line.
pub(super) fn overview<'a>(names: impl Iterator<Item = &'a str>) -> Reply {
    let names: Vec<&str> = names.collect();
    let mut lines = vec!["Supported commands:".to_string()];
    lines.extend(names.chunks(NAMES_PER_LINE).map(|chunk| chunk.join("\t")));
    lines.push("Use \"HELP [command]\" for syntax help.".to_string());
    Reply::new_multiline(ReplyCode::SystemStatus, lines)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::controlchan::ReplyLine;
    use pretty_assertions::assert_eq;

    #[test]
    fn overview_groups_names() {
        let reply = overview(["A", "B", "C", "D", "E", "F"].into_iter());
        assert_eq!(
            reply,
            Reply::MultiLine {
                code: ReplyCode::SystemStatus,
                lines: vec![
                    ReplyLine::from("Supported commands:"),
                    ReplyLine::from("A\tB\tC\tD\tE"),
                    ReplyLine::from("F"),
                    ReplyLine::from("Use \"HELP [command]\" for syntax help."),
                ],
            }
        );
    }
}
