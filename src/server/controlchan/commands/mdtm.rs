//! The RFC 3659 Modification Time (`MDTM`) command
//
// The FTP command, MODIFICATION TIME (MDTM), can be used to determine
// when a file in the server NVFS was last modified. The time is given in UTC as
// `YYYYMMDDHHMMSS.sss`.

use super::{no_storage, storage_failure};
use crate::{
    server::controlchan::{
        Reply, ReplyCode,
        error::ControlChanError,
        handler::{CommandContext, CommandHandler},
    },
    storage::{Metadata, StorageBackend},
};
use chrono::{DateTime, Utc};
use std::time::SystemTime;

const RFC3659_TIME: &str = "%Y%m%d%H%M%S%.3f";
use async_trait::async_trait;

#[derive(Debug)]
pub struct Mdtm;

#[async_trait]
impl<Storage> CommandHandler<Storage> for Mdtm
where
    Storage: StorageBackend + 'static,
{
    #[tracing_attributes::instrument]
    async fn handle(&self, args: CommandContext<Storage>) -> Result<Reply, ControlChanError> {
        let session = args.session.lock().await;
        let Some(storage) = session.storage.as_ref() else {
            return Ok(no_storage());
        };
        let modified = match storage.get(args.cmd.arg()).await {
            Ok(info) => info.metadata.modified(),
            Err(err) => Err(err),
        };
        match modified {
            Ok(mtime) => Ok(Reply::new_with_string(ReplyCode::FileStatus, format_mdtm(mtime))),
            Err(err) => Ok(storage_failure(&err, ReplyCode::FileError)),
        }
    }
}

fn format_mdtm(mtime: SystemTime) -> String {
    DateTime::<Utc>::from(mtime).format(RFC3659_TIME).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::time::Duration;

    #[test]
    fn formats_with_milliseconds_in_utc() {
        let mtime = SystemTime::UNIX_EPOCH + Duration::from_millis(1_600_000_000_123);
        assert_eq!(format_mdtm(mtime), "20200913122640.123");
    }
}
