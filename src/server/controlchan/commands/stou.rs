//! The RFC 959 Store Unique (`STOU`) command
//
// This command behaves like STOR except that the resultant
// file is to be created in the current directory under a name
// unique to that directory. The 226 reply carries the name
// that was chosen.

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
pub struct Stou;

#[async_trait]
impl<Storage> CommandHandler<Storage> for Stou
where
    Storage: StorageBackend + 'static,
{
    #[tracing_attributes::instrument]
    async fn handle(&self, args: CommandContext<Storage>) -> Result<Reply, ControlChanError> {
        let hint = args.cmd.arg().to_string();
        let path = {
            let session = args.session.lock().await;
            match session.storage.as_ref() {
                Some(storage) => unique_path(storage, hint, &args.logger).await,
                None => hint,
            }
        };
        upload(&args, &path, false).await
    }
}

// The hint is only replaced when something already lives there.
async fn unique_path<Storage>(storage: &Storage, hint: String, logger: &slog::Logger) -> String
where
    Storage: StorageBackend + 'static,
{
    if storage.get(&hint).await.is_err() {
        return hint;
    }
    match storage.unique_name(&hint).await {
        Ok(name) => name,
        Err(err) => {
            slog::warn!(logger, "STOU: no unique name for {:?}, using it as is: {}", hint, err);
            hint
        }
    }
}
