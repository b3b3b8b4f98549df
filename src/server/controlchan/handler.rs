use super::{Command, Reply, acl::Acl, error::ControlChanError, writer::ReplyWriter};
use crate::{
    auth::Authenticator,
    notification::emitter::EventEmitter,
    options::{ListFormat, PassiveHost},
    server::{ControlChanMsg, port_allocator::PortAllocator, session::SharedSession, tls::FtpsConfig},
    storage::StorageBackend,
};
use async_trait::async_trait;
use std::{net::SocketAddr, result::Result, sync::Arc};
use tokio::sync::mpsc::Sender;

/// Creates the storage back-end of a session once its user logged in.
pub(crate) type StorageFactory<S> = Arc<dyn Fn() -> std::io::Result<S> + Send + Sync>;

#[async_trait]
pub(crate) trait CommandHandler<Storage>: Send + Sync + std::fmt::Debug
where
    Storage: StorageBackend + 'static,
{
    async fn handle(&self, args: CommandContext<Storage>) -> Result<Reply, ControlChanError>;
}

/// Convenience struct to group command args
pub(crate) struct CommandContext<Storage>
where
    Storage: StorageBackend + 'static,
{
    pub cmd: Command,
    pub previous_command: Option<Command>,
    pub session: SharedSession<Storage>,
    pub authenticator: Arc<dyn Authenticator>,
    pub storage_factory: StorageFactory<Storage>,
    pub anonymous: bool,
    pub ftps_config: FtpsConfig,
    pub passive_ports: PortAllocator,
    pub passive_host: PassiveHost,
    pub acl: Arc<Acl>,
    pub tx_control_chan: Sender<ControlChanMsg>,
    pub reply_writer: ReplyWriter,
    pub local_addr: SocketAddr,
    pub list_format: ListFormat,
    pub emitter: Arc<EventEmitter>,
    pub collect_metrics: bool,
    pub logger: slog::Logger,
}

impl<Storage> std::fmt::Debug for CommandContext<Storage>
where
    Storage: StorageBackend + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandContext")
            .field("cmd", &self.cmd)
            .field("previous_command", &self.previous_command)
            .field("anonymous", &self.anonymous)
            .field("ftps_config", &self.ftps_config)
            .field("passive_host", &self.passive_host)
            .field("local_addr", &self.local_addr)
            .field("list_format", &self.list_format)
            .finish_non_exhaustive()
    }
}
