//! The RFC 959 Store (`STOR`) and Append (`APPE`) commands
//
// STOR causes the server-DTP to accept the data transferred via the data connection and to store
// the data as a file at the server site. If the file specified in the pathname exists at the
// server site, then its contents shall be replaced by the data being transferred.
//
// APPE is the same except that, when the file exists, the data is appended to it.
//
// A preceding REST moves the write position for either of them.

use super::transfer::upload;
use crate::{
    server::controlchan::{
        Reply,
        error::ControlChanError,
        handler::{CommandContext, CommandHandler},
    },
    storage::StorageBackend,
};
use async_trait::async_trait;

#[derive(Debug)]
pub struct Stor {
    append: bool,
}

impl Stor {
    /// STOR
    pub fn overwrite() -> Self {
        Stor { append: false }
    }

    /// APPE
    pub fn append() -> Self {
        Stor { append: true }
    }
}

#[async_trait]
impl<Storage> CommandHandler<Storage> for Stor
where
    Storage: StorageBackend + 'static,
{
    #[tracing_attributes::instrument]
    async fn handle(&self, args: CommandContext<Storage>) -> Result<Reply, ControlChanError> {
        let path = args.cmd.arg().to_string();
        upload(&args, &path, self.append).await
    }
}
