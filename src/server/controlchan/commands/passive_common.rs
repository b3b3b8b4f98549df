//! Contains shared code for the PASV and EPSV commands.

use crate::{
    server::{
        controlchan::{Reply, handler::CommandContext},
        datachan::{DataConnector, PassiveConnector, PassiveSetup},
    },
    storage::StorageBackend,
};

/// Tears down the session's current connector and starts listening on a fresh passive port.
/// Returns the port the client should connect to.
pub(super) async fn listen<Storage>(args: &CommandContext<Storage>) -> Result<u16, Reply>
where
    Storage: StorageBackend + 'static,
{
    let mut session = args.session.lock().await;
    session.end_connector();

    let setup = PassiveSetup {
        control_peer: session.source,
        tls: if session.secure { args.ftps_config.acceptor() } else { None },
        emitter: args.emitter.clone(),
        tx_control_chan: args.tx_control_chan.clone(),
        logger: args.logger.clone(),
    };
    match PassiveConnector::listen(&args.passive_ports, args.local_addr.ip(), setup) {
        Ok(connector) => {
            let port = connector.port();
            slog::debug!(args.logger, "Set up {} data connection on port {}", connector.kind(), port);
            session.connector = Some(Box::new(connector) as Box<dyn DataConnector>);
            Ok(port)
        }
        Err(err) => {
            slog::warn!(args.logger, "Could not set up a passive listener: {}", err);
            Err(Reply::new_with_string(err.reply_code(), err.to_string()))
        }
    }
}
