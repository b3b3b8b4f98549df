//! Represents the chosen options that the libftpsrv user opted for.

use super::options::{ListFormat, PassiveHost};
use crate::{
    auth::Authenticator,
    notification::EventListener,
    server::{
        controlchan::{self, Acl, StorageFactory},
        port_allocator::PortAllocator,
        tls::FtpsConfig,
    },
    storage::StorageBackend,
};
use std::{
    fmt::{self, Debug, Formatter},
    sync::Arc,
    time::Duration,
};

// Holds the options the libftpsrv user opted for, validated.
pub(crate) struct OptionsHolder<Storage>
where
    Storage: StorageBackend,
{
    pub storage: StorageFactory<Storage>,
    pub greeting: &'static str,
    pub authenticator: Arc<dyn Authenticator>,
    pub anonymous: bool,
    pub passive_ports: PortAllocator,
    pub passive_host: PassiveHost,
    pub acl: Arc<Acl>,
    pub ftps_config: FtpsConfig,
    pub collect_metrics: bool,
    pub idle_session_timeout: Duration,
    pub list_format: ListFormat,
    pub listener: Arc<dyn EventListener>,
    pub logger: slog::Logger,
}

impl<Storage> From<&OptionsHolder<Storage>> for controlchan::LoopConfig<Storage>
where
    Storage: StorageBackend + 'static,
{
    fn from(server: &OptionsHolder<Storage>) -> Self {
        controlchan::LoopConfig {
            storage_factory: server.storage.clone(),
            greeting: server.greeting,
            authenticator: server.authenticator.clone(),
            anonymous: server.anonymous,
            passive_ports: server.passive_ports.clone(),
            passive_host: server.passive_host.clone(),
            acl: server.acl.clone(),
            ftps_config: server.ftps_config.clone(),
            collect_metrics: server.collect_metrics,
            idle_session_timeout: server.idle_session_timeout,
            list_format: server.list_format.clone(),
            listener: server.listener.clone(),
            logger: server.logger.new(slog::o!()),
        }
    }
}

impl<Storage> Debug for OptionsHolder<Storage>
where
    Storage: StorageBackend,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("OptionsHolder")
            .field("greeting", &self.greeting)
            .field("authenticator", &self.authenticator)
            .field("anonymous", &self.anonymous)
            .field("passive_ports", &self.passive_ports)
            .field("passive_host", &self.passive_host)
            .field("acl", &self.acl)
            .field("ftps_config", &self.ftps_config)
            .field("collect_metrics", &self.collect_metrics)
            .field("idle_session_timeout", &self.idle_session_timeout)
            .field("list_format", &self.list_format)
            .finish_non_exhaustive()
    }
}
