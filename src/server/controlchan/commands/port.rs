//! The RFC 959 Data Port (`PORT`) command
//
// The argument is a HOST-PORT specification for the data port
// to be used in data connection.
//
//      PORT h1,h2,h3,h4,p1,p2
//
// where h1 is the high order 8 bits of the internet host
// address.

use crate::{
    server::{
        controlchan::{
            Reply, ReplyCode,
            error::ControlChanError,
            handler::{CommandContext, CommandHandler},
        },
        datachan::{ActiveConnector, DataConnector},
    },
    storage::StorageBackend,
};
use async_trait::async_trait;
use std::net::{Ipv4Addr, SocketAddr};

#[derive(Debug)]
pub struct Port;

#[async_trait]
impl<Storage> CommandHandler<Storage> for Port
where
    Storage: StorageBackend + 'static,
{
    #[tracing_attributes::instrument]
    async fn handle(&self, args: CommandContext<Storage>) -> Result<Reply, ControlChanError> {
        match parse_host_port(args.cmd.arg()) {
            Some(target) => Ok(connect_active(&args, target).await),
            None => Ok(Reply::code(ReplyCode::CantOpenDataConnection)),
        }
    }
}

fn parse_host_port(arg: &str) -> Option<SocketAddr> {
    let bytes: Vec<u8> = arg.split(',').map(|b| b.trim().parse::<u8>()).collect::<Result<_, _>>().ok()?;
    match bytes.as_slice() {
        [h1, h2, h3, h4, p1, p2] => Some(SocketAddr::new(
            Ipv4Addr::new(*h1, *h2, *h3, *h4).into(),
            u16::from_be_bytes([*p1, *p2]),
        )),
        _ => None,
    }
}

/// Tears down the session's current connector and starts connecting to `target`. Shared with
/// EPRT.
pub(super) async fn connect_active<Storage>(args: &CommandContext<Storage>, target: SocketAddr) -> Reply
where
    Storage: StorageBackend + 'static,
{
    let mut session = args.session.lock().await;
    session.end_connector();
    let tls = if session.secure { args.ftps_config.acceptor() } else { None };
    match ActiveConnector::connect(target, session.source, tls, args.emitter.clone(), args.logger.clone()) {
        Ok(connector) => {
            slog::debug!(args.logger, "Set up {} data connection to {}", connector.kind(), target);
            session.connector = Some(Box::new(connector) as Box<dyn DataConnector>);
            Reply::code(ReplyCode::CommandOkay)
        }
        Err(err) => Reply::new_with_string(err.reply_code(), err.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn host_port_is_decoded() {
        assert_eq!(parse_host_port("127,0,0,1,195,81"), Some("127.0.0.1:50001".parse().unwrap()));
        assert_eq!(parse_host_port("127,0,0,1,195"), None);
        assert_eq!(parse_host_port("127,0,0,1,300,1"), None);
        assert_eq!(parse_host_port(""), None);
    }
}
