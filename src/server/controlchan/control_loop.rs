use super::{
    Event, Reply, ReplyCode,
    acl::{Acl, AclMiddleware},
    auth::AuthMiddleware,
    codecs::FtpCodec,
    command::Command,
    error::{ControlChanError, ControlChanErrorKind},
    handler::{CommandContext, StorageFactory},
    line_parser,
    log::LoggingMiddleware,
    middleware::ControlChanMiddleware,
    registry,
    writer::{ControlStream, ReplyWriter},
};
use crate::{
    auth::Authenticator,
    metrics,
    notification::{EventListener, ServerEvent, emitter::EventEmitter},
    options::{ListFormat, PassiveHost},
    server::{
        ControlChanMsg,
        io::AsyncReadAsyncWriteSendUnpin,
        port_allocator::PortAllocator,
        session::{Session, SharedSession},
        shutdown,
        tls::FtpsConfig,
    },
    storage::StorageBackend,
};
use async_trait::async_trait;
use bytes::BytesMut;
use futures_util::StreamExt;
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tokio::{
    net::TcpStream,
    sync::{
        Mutex,
        mpsc::{self, Receiver, Sender},
    },
};
use tokio_util::codec::Decoder;

// Internal messages queue up here while a command is being handled.
const CONTROL_MSG_CAPACITY: usize = 8;

// Everything a control loop needs to know from the server's configuration.
pub(crate) struct Config<Storage>
where
    Storage: StorageBackend,
{
    pub storage_factory: StorageFactory<Storage>,
    pub greeting: &'static str,
    pub authenticator: Arc<dyn Authenticator>,
    pub anonymous: bool,
    pub passive_ports: PortAllocator,
    pub passive_host: PassiveHost,
    pub acl: Arc<Acl>,
    pub ftps_config: FtpsConfig,
    pub collect_metrics: bool,
    // Zero disables the idle timeout.
    pub idle_session_timeout: Duration,
    pub list_format: ListFormat,
    pub listener: Arc<dyn EventListener>,
    pub logger: slog::Logger,
}

// What the loop does after an event was handled.
#[derive(Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    Exit,
}

/// Greets the client and starts the task that runs its session.
#[tracing_attributes::instrument(skip(config, shutdown))]
pub(crate) async fn spawn<Storage>(config: Config<Storage>, tcp_stream: TcpStream, mut shutdown: shutdown::Listener) -> Result<(), ControlChanError>
where
    Storage: StorageBackend + 'static,
{
    let Config {
        storage_factory,
        greeting,
        authenticator,
        anonymous,
        passive_ports,
        passive_host,
        acl,
        ftps_config,
        collect_metrics,
        idle_session_timeout,
        list_format,
        listener,
        logger,
    } = config;

    let source = tcp_stream.peer_addr()?;
    let local_addr = tcp_stream.local_addr()?;
    let session: Session<Storage> = Session::new(source);
    let trace_id = session.trace_id.to_string();
    let logger = logger.new(slog::o!("trace-id" => trace_id.clone(), "source" => source.to_string()));
    let emitter = Arc::new(EventEmitter::new(listener, trace_id));
    let shared_session: SharedSession<Storage> = Arc::new(Mutex::new(session));
    let (tx, rx): (Sender<ControlChanMsg>, Receiver<ControlChanMsg>) = mpsc::channel(CONTROL_MSG_CAPACITY);

    let framed: ControlStream = FtpCodec::new().framed(Box::new(tcp_stream) as Box<dyn AsyncReadAsyncWriteSendUnpin>);
    let (reply_sink, command_source) = framed.split();
    let reply_writer = ReplyWriter::new(reply_sink, collect_metrics);

    if collect_metrics {
        metrics::inc_session();
    }
    emitter.emit(ServerEvent::Connected { peer: source }).await;

    let mut banner: Vec<&str> = greeting.lines().collect();
    banner.push("Ready");
    if let Err(err) = reply_writer.send(Reply::new_multiline(ReplyCode::ServiceReady, banner)).await {
        emitter.emit(ServerEvent::Disconnected { peer: source }).await;
        return Err(err);
    }

    let primary = PrimaryEventHandler {
        session: shared_session.clone(),
        authenticator,
        storage_factory,
        anonymous,
        ftps_config: ftps_config.clone(),
        passive_ports,
        passive_host,
        acl: acl.clone(),
        tx_control_chan: tx,
        reply_writer: reply_writer.clone(),
        local_addr,
        list_format,
        emitter: emitter.clone(),
        collect_metrics,
        logger: logger.clone(),
    };
    let chain = LoggingMiddleware {
        logger: logger.clone(),
        sequence_nr: 0,
        next: AclMiddleware {
            acl,
            next: AuthMiddleware {
                session: shared_session.clone(),
                next: primary,
            },
        },
    };

    let control_loop = ControlLoop {
        session: shared_session,
        chain,
        command_source,
        reply_writer,
        rx,
        ftps_config,
        idle_session_timeout,
        collect_metrics,
        logger,
    };

    tokio::spawn(async move {
        let ControlLoop { session, logger, .. } = control_loop.run(&mut shutdown).await;
        session.lock().await.end_connector();
        slog::info!(logger, "Control loop ended");
        emitter.emit(ServerEvent::Disconnected { peer: source }).await;
    });

    Ok(())
}

type CommandSource = futures_util::stream::SplitStream<ControlStream>;

struct ControlLoop<Storage, Chain>
where
    Storage: StorageBackend + 'static,
    Chain: ControlChanMiddleware,
{
    session: SharedSession<Storage>,
    chain: Chain,
    command_source: CommandSource,
    reply_writer: ReplyWriter,
    rx: Receiver<ControlChanMsg>,
    ftps_config: FtpsConfig,
    idle_session_timeout: Duration,
    collect_metrics: bool,
    logger: slog::Logger,
}

impl<Storage, Chain> ControlLoop<Storage, Chain>
where
    Storage: StorageBackend + 'static,
    Chain: ControlChanMiddleware,
{
    // Runs until the client leaves, the session ends or the server shuts down. Gives itself back
    // so the caller can clean up.
    async fn run(mut self, shutdown: &mut shutdown::Listener) -> Self {
        slog::info!(self.logger, "Starting control loop");
        loop {
            let idle_timeout = self.idle_session_timeout;
            let flow = tokio::select! {
                line = self.command_source.next() => match line {
                    Some(Ok(line)) => self.handle_line(line).await,
                    Some(Err(err)) if *err.kind() == ControlChanErrorKind::LineTooLong => {
                        slog::warn!(self.logger, "Closing the control connection: {}", err);
                        self.send(Reply::new(ReplyCode::CommandSyntaxError, "Command line too long")).await;
                        Flow::Exit
                    }
                    Some(Err(err)) => {
                        slog::warn!(self.logger, "Could not read from the control channel: {}", err);
                        Flow::Exit
                    }
                    None => {
                        slog::info!(self.logger, "Client closed the control connection");
                        Flow::Exit
                    }
                },
                Some(msg) = self.rx.recv() => self.handle_internal_msg(msg).await,
                _ = tokio::time::sleep(idle_timeout), if !idle_timeout.is_zero() => {
                    slog::info!(self.logger, "Control connection timed out");
                    self.send(Reply::new(ReplyCode::ServiceNotAvailable, "Session timed out. Closing control connection")).await;
                    Flow::Exit
                },
                _ = shutdown.listen() => {
                    slog::info!(self.logger, "Closing the control connection because the server shuts down");
                    self.send(Reply::new(ReplyCode::ServiceNotAvailable, "Server is shutting down. Closing control connection")).await;
                    Flow::Exit
                },
            };
            if flow == Flow::Exit {
                return self;
            }
        }
    }

    async fn handle_line(&mut self, line: BytesMut) -> Flow {
        let encoding = self.session.lock().await.encoding;
        let text = match encoding.decode(&line) {
            Ok(text) => text,
            Err(err) => {
                slog::warn!(self.logger, "Received a command that isn't valid UTF-8: {}", err);
                return self.send(Reply::new(ReplyCode::CommandSyntaxError, "Invalid UTF8 in command")).await;
            }
        };
        let cmd: Command = match line_parser::parse(&text) {
            Ok(cmd) => cmd,
            Err(err) => {
                slog::warn!(self.logger, "Could not parse command: {}", err);
                return self.send(Reply::new_with_string(ReplyCode::CommandSyntaxError, err.kind().to_string())).await;
            }
        };
        if self.collect_metrics {
            metrics::add_command_metric(&cmd);
        }

        let reply = match self.chain.handle(Event::Command(cmd)).await {
            Ok(reply) => reply,
            Err(err) => {
                slog::warn!(self.logger, "Event handler chain error: {}", err);
                if *err.kind() == ControlChanErrorKind::IoError || *err.kind() == ControlChanErrorKind::IllegalState {
                    return Flow::Exit;
                }
                Reply::new(ReplyCode::LocalError, "Unknown internal server error, please try again later")
            }
        };
        if self.send(reply).await == Flow::Exit {
            return Flow::Exit;
        }

        // Handlers leave messages for us, for instance QUIT and AUTH TLS. They apply after the
        // handler's reply went out.
        while let Ok(msg) = self.rx.try_recv() {
            if self.handle_internal_msg(msg).await == Flow::Exit {
                return Flow::Exit;
            }
        }
        Flow::Continue
    }

    async fn handle_internal_msg(&mut self, msg: ControlChanMsg) -> Flow {
        let flow = match msg {
            ControlChanMsg::ExitControlLoop => Flow::Exit,
            ControlChanMsg::PassiveAddressMismatch { .. } => Flow::Exit,
            ControlChanMsg::SecureControlChannel => match self.secure_control_channel().await {
                Ok(()) => Flow::Continue,
                Err(err) => {
                    slog::warn!(self.logger, "Could not upgrade the control channel to TLS: {}", err);
                    return Flow::Exit;
                }
            },
        };
        match self.chain.handle(Event::InternalMsg(msg)).await {
            Ok(reply) => {
                if self.send(reply).await == Flow::Exit {
                    return Flow::Exit;
                }
            }
            Err(err) => slog::warn!(self.logger, "Event handler chain error: {}", err),
        }
        flow
    }

    // Wraps the control socket in TLS. The 234 reply already went out in plain text.
    async fn secure_control_channel(&mut self) -> Result<(), ControlChanError> {
        slog::info!(self.logger, "Upgrading control channel to TLS");
        let acceptor = self.ftps_config.acceptor().ok_or(ControlChanErrorKind::IllegalState)?;
        let sink = self.reply_writer.take().await.ok_or(ControlChanErrorKind::IllegalState)?;
        let placeholder = Self::closed_source();
        let source = std::mem::replace(&mut self.command_source, placeholder);
        let framed = sink.reunite(source).map_err(|_| ControlChanErrorKind::IllegalState)?;
        let io = framed.into_inner();
        let tls_stream = acceptor.accept(io).await.map_err(|err| {
            slog::warn!(self.logger, "TLS handshake on the control channel failed: {}", err);
            ControlChanError::from(ControlChanErrorKind::TlsError)
        })?;
        let framed: ControlStream = FtpCodec::new().framed(Box::new(tls_stream) as Box<dyn AsyncReadAsyncWriteSendUnpin>);
        let (sink, source) = framed.split();
        self.command_source = source;
        self.reply_writer.replace(sink).await;
        Ok(())
    }

    // A source that yields nothing, holding the place of the real one during the TLS upgrade.
    fn closed_source() -> CommandSource {
        let (a, _) = tokio::io::duplex(1);
        let framed: ControlStream = FtpCodec::new().framed(Box::new(a) as Box<dyn AsyncReadAsyncWriteSendUnpin>);
        framed.split().1
    }

    async fn send(&self, reply: Reply) -> Flow {
        match self.reply_writer.send(reply).await {
            Ok(()) => Flow::Continue,
            Err(err) => {
                slog::warn!(self.logger, "Could not send reply to client: {}", err);
                Flow::Exit
            }
        }
    }
}

// The end of the middleware chain: runs the command handlers and turns internal messages into
// replies.
struct PrimaryEventHandler<Storage>
where
    Storage: StorageBackend + 'static,
{
    session: SharedSession<Storage>,
    authenticator: Arc<dyn Authenticator>,
    storage_factory: StorageFactory<Storage>,
    anonymous: bool,
    ftps_config: FtpsConfig,
    passive_ports: PortAllocator,
    passive_host: PassiveHost,
    acl: Arc<Acl>,
    tx_control_chan: Sender<ControlChanMsg>,
    reply_writer: ReplyWriter,
    local_addr: SocketAddr,
    list_format: ListFormat,
    emitter: Arc<EventEmitter>,
    collect_metrics: bool,
    logger: slog::Logger,
}

impl<Storage> PrimaryEventHandler<Storage>
where
    Storage: StorageBackend + 'static,
{
    async fn handle_command(&self, cmd: Command) -> Result<Reply, ControlChanError> {
        let Some(spec) = registry::lookup(&cmd.directive) else {
            return Ok(Reply::new_with_string(
                ReplyCode::CommandNotImplemented,
                format!("Command not allowed: {}", cmd.directive),
            ));
        };
        let Some(handler) = spec.directive.handler::<Storage>() else {
            return Ok(Reply::new_with_string(
                ReplyCode::CommandNotImplemented,
                format!("Handler not set on command: {}", cmd.directive),
            ));
        };

        let previous_command = self.session.lock().await.previous_command.clone();
        let args = CommandContext {
            cmd: cmd.clone(),
            previous_command,
            session: self.session.clone(),
            authenticator: self.authenticator.clone(),
            storage_factory: self.storage_factory.clone(),
            anonymous: self.anonymous,
            ftps_config: self.ftps_config.clone(),
            passive_ports: self.passive_ports.clone(),
            passive_host: self.passive_host.clone(),
            acl: self.acl.clone(),
            tx_control_chan: self.tx_control_chan.clone(),
            reply_writer: self.reply_writer.clone(),
            local_addr: self.local_addr,
            list_format: self.list_format.clone(),
            emitter: self.emitter.clone(),
            collect_metrics: self.collect_metrics,
            logger: self.logger.clone(),
        };

        let result = handler.handle(args).await;
        self.session.lock().await.previous_command = Some(cmd);
        result
    }

    async fn handle_internal_msg(&self, msg: ControlChanMsg) -> Result<Reply, ControlChanError> {
        match msg {
            ControlChanMsg::SecureControlChannel => {
                self.session.lock().await.secure = true;
                Ok(Reply::none())
            }
            ControlChanMsg::PassiveAddressMismatch { peer } => {
                slog::warn!(self.logger, "Closing the session after a data connection from foreign address {}", peer);
                Ok(Reply::new(ReplyCode::FileError, "Remote addresses do not match"))
            }
            ControlChanMsg::ExitControlLoop => Ok(Reply::none()),
        }
    }
}

#[async_trait]
impl<Storage> ControlChanMiddleware for PrimaryEventHandler<Storage>
where
    Storage: StorageBackend + 'static,
{
    async fn handle(&mut self, event: Event) -> Result<Reply, ControlChanError> {
        match event {
            Event::Command(cmd) => self.handle_command(cmd).await,
            Event::InternalMsg(msg) => self.handle_internal_msg(msg).await,
        }
    }
}
