//! The RFC 959 Status (`STAT`) command
//
// This command shall cause a status response to be sent over
// the control connection in the form of a reply. If an argument is given, the status of that
// file or directory is returned: one formatted entry for a file, the entries of a directory.

use super::{no_storage, storage_failure};
use crate::{
    server::{
        controlchan::{
            Reply, ReplyCode, ReplyLine,
            error::ControlChanError,
            handler::{CommandContext, CommandHandler},
        },
        listing::format_entry,
    },
    storage::{self, Fileinfo, Metadata, StorageBackend},
};
use async_trait::async_trait;

#[derive(Debug)]
pub struct Stat;

#[async_trait]
impl<Storage> CommandHandler<Storage> for Stat
where
    Storage: StorageBackend + 'static,
{
    #[tracing_attributes::instrument]
    async fn handle(&self, args: CommandContext<Storage>) -> Result<Reply, ControlChanError> {
        let Some(path) = args.cmd.argument.as_deref() else {
            return Ok(Reply::new(ReplyCode::SystemStatus, "Status OK"));
        };
        let session = args.session.lock().await;
        let Some(storage) = session.storage.as_ref() else {
            return Ok(no_storage());
        };

        match status(storage, path).await {
            Ok((code, entries)) => {
                let mut lines = vec![ReplyLine::from("Status begin")];
                lines.extend(
                    entries
                        .iter()
                        .map(|entry| ReplyLine::Raw(format_entry(&args.list_format, &entry.name, &entry.metadata as &dyn Metadata))),
                );
                lines.push(ReplyLine::from("Status end"));
                Ok(Reply::new_multiline(code, lines))
            }
            Err(err) => {
                slog::warn!(args.logger, "STAT of {} failed: {}", path, err);
                Ok(storage_failure(&err, ReplyCode::TransientFileError))
            }
        }
    }
}

// Directories get 213 with their entries, anything else 212 with itself.
async fn status<Storage>(storage: &Storage, path: &str) -> storage::Result<(ReplyCode, Vec<Fileinfo<Storage::Metadata>>)>
where
    Storage: StorageBackend + 'static,
{
    let info = storage.get(path).await?;
    if info.metadata.is_dir() {
        Ok((ReplyCode::FileStatus, storage.list(path).await?))
    } else {
        Ok((ReplyCode::DirectoryStatus, vec![info]))
    }
}
