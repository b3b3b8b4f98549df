pub(crate) mod chosen;
pub mod error;
mod listen;
pub mod options;

use super::{
    controlchan::{Acl, StorageFactory},
    port_allocator::PortAllocator,
    shutdown,
    tls::{self, FtpsConfig},
};
use crate::{
    auth::{AnonymousAuthenticator, Authenticator},
    notification::{EventListener, EventMeta, ServerEvent, nop::NopListener},
    storage::StorageBackend,
};
use chosen::OptionsHolder;
use error::{ServerError, ShutdownError};
use futures_util::future::BoxFuture;
use options::{ListFormat, PassiveHost, Shutdown, TlsFlags};
use slog::Drain;
use std::{
    fmt::{self, Debug, Formatter},
    future::Future,
    net::SocketAddr,
    ops::RangeInclusive,
    path::PathBuf,
    sync::Arc,
    time::Duration,
};

/// An instance of an FTP(S) server. It aggregates an [`Authenticator`] implementation that will be
/// used for authentication, and a [`StorageBackend`] implementation that will be used as the
/// virtual file system.
///
/// The server can be started with the [`listen`](Server::listen) method.
///
/// # Example
///
/// ```rust
/// use ftpsrv_sbe_fs::Filesystem;
/// use libftpsrv::Server;
/// use tokio::runtime::Runtime;
///
/// let rt = Runtime::new().unwrap();
/// let server = Server::new(Box::new(|| Filesystem::new("/srv/ftp"))).build().unwrap();
/// rt.spawn(server.listen("127.0.0.1:2121"));
/// // ...
/// drop(rt);
/// ```
///
/// [`Authenticator`]: crate::auth::Authenticator
/// [`StorageBackend`]: crate::storage::StorageBackend
pub struct Server<Storage>
where
    Storage: StorageBackend,
{
    options: OptionsHolder<Storage>,
    shutdown: BoxFuture<'static, Shutdown>,
    logger: slog::Logger,
}

/// Used to create [`Server`]s. Obtained from [`Server::new`].
pub struct ServerBuilder<Storage>
where
    Storage: StorageBackend,
{
    storage: StorageFactory<Storage>,
    greeting: &'static str,
    authenticator: Arc<dyn Authenticator>,
    anonymous: bool,
    passive_ports: RangeInclusive<u16>,
    passive_host: PassiveHost,
    blacklist: Vec<String>,
    whitelist: Vec<String>,
    ftps_mode: FtpsConfig,
    ftps_tls_flags: TlsFlags,
    collect_metrics: bool,
    idle_session_timeout: Duration,
    list_format: ListFormat,
    listener: Arc<dyn EventListener>,
    logger: slog::Logger,
    shutdown: BoxFuture<'static, Shutdown>,
}

impl<Storage> Server<Storage>
where
    Storage: StorageBackend + 'static,
{
    /// Starts building a [`Server`] around the given storage back-end factory. The factory is
    /// called once per session, when its user logged in. The other options are set to defaults.
    pub fn new(storage: Box<dyn Fn() -> std::io::Result<Storage> + Send + Sync>) -> ServerBuilder<Storage> {
        ServerBuilder::new(storage)
    }

    /// Runs the main FTP process asynchronously. Should be started in an async runtime context.
    ///
    /// Returns when the shutdown indicator fires and the sessions finished, or with an error if
    /// the address cannot be bound to.
    ///
    /// # Example
    ///
    /// ```rust
    /// use ftpsrv_sbe_fs::Filesystem;
    /// use libftpsrv::Server;
    /// use tokio::runtime::Runtime;
    ///
    /// let rt = Runtime::new().unwrap();
    /// let server = Server::new(Box::new(|| Filesystem::new("/srv/ftp"))).build().unwrap();
    /// rt.spawn(server.listen("127.0.0.1:2121"));
    /// // ...
    /// drop(rt);
    /// ```
    #[tracing_attributes::instrument(skip(self, bind_address))]
    pub async fn listen<T: Into<String>>(self, bind_address: T) -> Result<(), ServerError> {
        let bind_address: SocketAddr = bind_address.into().parse()?;
        let Server { options, shutdown, logger } = self;
        let event_listener = options.listener.clone();
        let shutdown_notifier = Arc::new(shutdown::Notifier::new());

        let listener = listen::Listener {
            bind_address,
            logger: logger.clone(),
            options,
            shutdown_topic: shutdown_notifier.clone(),
        };

        tokio::select! {
            result = listener.listen() => result,
            opts = shutdown => {
                slog::debug!(logger, "Shutting down within {:?}", opts.grace_period);
                shutdown_notifier.notify().await;
                event_listener.receive_event(ServerEvent::Closed, EventMeta { username: String::new(), trace_id: String::new(), sequence_number: 0 }).await;
                match tokio::time::timeout(opts.grace_period, shutdown_notifier.linger()).await {
                    Ok(_) => {
                        slog::info!(logger, "Graceful shutdown complete");
                        Ok(())
                    }
                    Err(_) => Err(ShutdownError { msg: "shutdown grace period expired".to_string() }.into()),
                }
            }
        }
    }
}

impl<Storage> ServerBuilder<Storage>
where
    Storage: StorageBackend + 'static,
{
    fn new(storage: Box<dyn Fn() -> std::io::Result<Storage> + Send + Sync>) -> Self {
        ServerBuilder {
            storage: Arc::from(storage),
            greeting: options::DEFAULT_GREETING,
            authenticator: Arc::new(AnonymousAuthenticator),
            anonymous: false,
            passive_ports: options::DEFAULT_PASSIVE_PORTS,
            passive_host: options::DEFAULT_PASSIVE_HOST,
            blacklist: vec![],
            whitelist: vec![],
            ftps_mode: FtpsConfig::Off,
            ftps_tls_flags: TlsFlags::default(),
            collect_metrics: false,
            idle_session_timeout: Duration::from_secs(options::DEFAULT_IDLE_SESSION_TIMEOUT_SECS),
            list_format: ListFormat::default(),
            listener: Arc::new(NopListener {}),
            logger: slog::Logger::root(slog_stdlog::StdLog {}.fuse(), slog::o!()),
            shutdown: Box::pin(futures_util::future::pending()),
        }
    }

    /// Set the greeting that will be sent to the client after connecting. Every line of it goes
    /// out in the 220 reply, followed by a final `Ready` line.
    ///
    /// # Example
    ///
    /// ```rust
    /// use ftpsrv_sbe_fs::Filesystem;
    /// use libftpsrv::Server;
    ///
    /// let server = Server::new(Box::new(|| Filesystem::new("/tmp")))
    ///     .greeting("Welcome to my FTP Server")
    ///     .build();
    /// ```
    pub fn greeting(mut self, greeting: &'static str) -> Self {
        self.greeting = greeting;
        self
    }

    /// Set the [`Authenticator`] that will be used for authentication.
    ///
    /// # Example
    ///
    /// ```rust
    /// use ftpsrv_sbe_fs::Filesystem;
    /// use libftpsrv::{Server, auth::AnonymousAuthenticator};
    /// use std::sync::Arc;
    ///
    /// let server = Server::new(Box::new(|| Filesystem::new("/tmp")))
    ///     .authenticator(Arc::new(AnonymousAuthenticator))
    ///     .build();
    /// ```
    ///
    /// [`Authenticator`]: crate::auth::Authenticator
    pub fn authenticator(mut self, authenticator: Arc<dyn Authenticator>) -> Self {
        self.authenticator = authenticator;
        self
    }

    /// Lets `USER anonymous` in without asking for a password.
    pub fn anonymous(mut self, allow: bool) -> Self {
        self.anonymous = allow;
        self
    }

    /// Set the range of passive ports that we'll use for passive connections.
    ///
    /// # Example
    ///
    /// ```rust
    /// use ftpsrv_sbe_fs::Filesystem;
    /// use libftpsrv::Server;
    ///
    /// let server = Server::new(Box::new(|| Filesystem::new("/tmp")))
    ///     .passive_ports(49152..=65535)
    ///     .build();
    /// ```
    pub fn passive_ports(mut self, range: RangeInclusive<u16>) -> Self {
        self.passive_ports = range;
        self
    }

    /// Specifies how the IP address that the server advertises in response to the PASV command
    /// is determined.
    ///
    /// # Example
    ///
    /// ```rust
    /// use ftpsrv_sbe_fs::Filesystem;
    /// use libftpsrv::{Server, options::PassiveHost};
    ///
    /// let server = Server::new(Box::new(|| Filesystem::new("/tmp")))
    ///     .passive_host([127, 0, 0, 1])
    ///     .build();
    /// let server = Server::new(Box::new(|| Filesystem::new("/tmp")))
    ///     .passive_host("ftp.myserver.org")
    ///     .build();
    /// let server = Server::new(Box::new(|| Filesystem::new("/tmp")))
    ///     .passive_host(PassiveHost::FromConnection)
    ///     .build();
    /// ```
    pub fn passive_host<H: Into<PassiveHost>>(mut self, host_option: H) -> Self {
        self.passive_host = host_option.into();
        self
    }

    /// Refuses the given commands with 502. Names are case insensitive, SITE subcommands can be
    /// given as `"site_chmod"` or `"SITE CHMOD"`.
    pub fn blacklist<I, T>(mut self, commands: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.blacklist = commands.into_iter().map(Into::into).collect();
        self
    }

    /// Allows only the given commands, all others are refused with 502. An empty list allows
    /// everything.
    pub fn whitelist<I, T>(mut self, commands: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.whitelist = commands.into_iter().map(Into::into).collect();
        self
    }

    /// Configures the path to the certificates file (PEM format) and the associated private key
    /// file in order to enable explicit FTPS (AUTH TLS).
    ///
    /// # Example
    ///
    /// ```rust
    /// use ftpsrv_sbe_fs::Filesystem;
    /// use libftpsrv::Server;
    ///
    /// let builder = Server::new(Box::new(|| Filesystem::new("/tmp")))
    ///     .ftps("/srv/ftp/server.certs", "/srv/ftp/server.key");
    /// ```
    pub fn ftps<P: Into<PathBuf>>(mut self, certs_file: P, key_file: P) -> Self {
        self.ftps_mode = FtpsConfig::Building {
            certs_file: certs_file.into(),
            key_file: key_file.into(),
        };
        self
    }

    /// Sets the TLS versions and session resumption options used for FTPS.
    pub fn ftps_tls_flags(mut self, flags: TlsFlags) -> Self {
        self.ftps_tls_flags = flags;
        self
    }

    /// Enable the collection of prometheus metrics.
    pub fn metrics(mut self) -> Self {
        self.collect_metrics = true;
        self
    }

    /// Set the idle session timeout in seconds. The default is 600 seconds, 0 disables it.
    pub fn idle_session_timeout(mut self, secs: u64) -> Self {
        self.idle_session_timeout = Duration::from_secs(secs);
        self
    }

    /// Selects how LIST and STAT render directory entries.
    pub fn list_format(mut self, format: ListFormat) -> Self {
        self.list_format = format;
        self
    }

    /// Sets a structured logger for this server.
    pub fn logger<L: Into<Option<slog::Logger>>>(mut self, logger: L) -> Self {
        self.logger = logger.into().unwrap_or_else(|| slog::Logger::root(slog_stdlog::StdLog {}.fuse(), slog::o!()));
        self
    }

    /// Registers a listener that receives the server's [events](crate::notification::ServerEvent).
    pub fn notify(mut self, listener: Arc<dyn EventListener>) -> Self {
        self.listener = listener;
        self
    }

    /// Allows telling the server when and how to shutdown gracefully.
    ///
    /// The passed argument is a future that resolves when the shutdown should commence. The
    /// server stops accepting connections, tells every session to end and waits at most the
    /// [grace period](Shutdown::grace_period) for them.
    ///
    /// # Example
    ///
    /// ```rust
    /// use ftpsrv_sbe_fs::Filesystem;
    /// use libftpsrv::{Server, options::Shutdown};
    /// use std::time::Duration;
    ///
    /// let server = Server::new(Box::new(|| Filesystem::new("/tmp")))
    ///     .shutdown_indicator(async {
    ///         tokio::time::sleep(Duration::from_secs(10)).await;
    ///         Shutdown::new().grace_period(Duration::from_secs(5))
    ///     })
    ///     .build();
    /// ```
    pub fn shutdown_indicator<I>(mut self, indicator: I) -> Self
    where
        I: Future<Output = Shutdown> + Send + 'static,
    {
        self.shutdown = Box::pin(indicator);
        self
    }

    /// Validates the options and creates the [`Server`]. Fails on an unusable passive port range
    /// or TLS material that cannot be loaded.
    pub fn build(self) -> Result<Server<Storage>, ServerError> {
        let passive_ports = PortAllocator::new(self.passive_ports)?;
        let ftps_config = match self.ftps_mode {
            FtpsConfig::Building { certs_file, key_file } => FtpsConfig::On {
                tls_config: tls::new_config(certs_file, key_file, self.ftps_tls_flags)?,
            },
            other => other,
        };
        Ok(Server {
            options: OptionsHolder {
                storage: self.storage,
                greeting: self.greeting,
                authenticator: self.authenticator,
                anonymous: self.anonymous,
                passive_ports,
                passive_host: self.passive_host,
                acl: Arc::new(Acl::new(self.blacklist, self.whitelist)),
                ftps_config,
                collect_metrics: self.collect_metrics,
                idle_session_timeout: self.idle_session_timeout,
                list_format: self.list_format,
                listener: self.listener,
                logger: self.logger.clone(),
            },
            shutdown: self.shutdown,
            logger: self.logger,
        })
    }
}

impl<Storage> Debug for Server<Storage>
where
    Storage: StorageBackend,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Server").field("options", &self.options).finish_non_exhaustive()
    }
}

impl<Storage> Debug for ServerBuilder<Storage>
where
    Storage: StorageBackend,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerBuilder")
            .field("greeting", &self.greeting)
            .field("authenticator", &self.authenticator)
            .field("anonymous", &self.anonymous)
            .field("passive_ports", &self.passive_ports)
            .field("passive_host", &self.passive_host)
            .field("blacklist", &self.blacklist)
            .field("whitelist", &self.whitelist)
            .field("ftps_mode", &self.ftps_mode)
            .field("ftps_tls_flags", &self.ftps_tls_flags)
            .field("collect_metrics", &self.collect_metrics)
            .field("idle_session_timeout", &self.idle_session_timeout)
            .field("list_format", &self.list_format)
            .finish_non_exhaustive()
    }
}
