//! The RFC 959 List (`LIST`) and Name List (`NLST`) commands
//
// LIST causes a list to be sent from the server to the passive DTP. If the pathname specifies a
// directory or other group of files, the server should transfer a list of files in the specified
// directory. If the pathname specifies a file then the server should send current information
// on the file. A null argument implies the user's current working or default directory.
//
// NLST sends only the names, one per line.

use super::transfer::send_listing;
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
pub struct List {
    names_only: bool,
}

impl List {
    /// LIST
    pub fn long() -> Self {
        List { names_only: false }
    }

    /// NLST
    pub fn names_only() -> Self {
        List { names_only: true }
    }
}

#[async_trait]
impl<Storage> CommandHandler<Storage> for List
where
    Storage: StorageBackend + 'static,
{
    #[tracing_attributes::instrument]
    async fn handle(&self, args: CommandContext<Storage>) -> Result<Reply, ControlChanError> {
        send_listing(&args, self.names_only).await
    }
}
