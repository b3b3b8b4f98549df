//! The RFC 959 Passive (`PASV`) command
//
// This command requests the server-DTP to "listen" on a data
// port (which is not its default data port) and to wait for a
// connection rather than initiate one upon receipt of a
// transfer command.  The response to this command includes the
// host and port address this server is listening on.

use super::passive_common;
use crate::{
    options::PassiveHost,
    server::controlchan::{
        Reply, ReplyCode,
        error::ControlChanError,
        handler::{CommandContext, CommandHandler},
    },
    storage::StorageBackend,
};
use async_trait::async_trait;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

#[derive(Debug)]
pub struct Pasv;

#[async_trait]
impl<Storage> CommandHandler<Storage> for Pasv
where
    Storage: StorageBackend + 'static,
{
    #[tracing_attributes::instrument]
    async fn handle(&self, args: CommandContext<Storage>) -> Result<Reply, ControlChanError> {
        let client = args.session.lock().await.source;
        // Decide what to advertise before a port gets tied up.
        let host = match advertised_host(&args.passive_host, args.local_addr, client).await {
            Ok(host) => host,
            Err(reply) => return Ok(reply),
        };
        match passive_common::listen(&args).await {
            Ok(port) => Ok(make_pasv_reply(host, port)),
            Err(reply) => Ok(reply),
        }
    }
}

async fn advertised_host(passive_host: &PassiveHost, local_addr: SocketAddr, client: SocketAddr) -> Result<Ipv4Addr, Reply> {
    match passive_host {
        PassiveHost::FromConnection => match local_addr.ip().to_canonical() {
            IpAddr::V4(ip) => Ok(ip),
            IpAddr::V6(_) => Err(Reply::new(ReplyCode::CommandNotImplemented, "PASV needs an IPv4 address, use EPSV")),
        },
        PassiveHost::Ip(ip) => Ok(*ip),
        PassiveHost::Dns(name) => {
            let resolved = tokio::net::lookup_host((name.as_str(), 0))
                .await
                .map(|mut addrs| addrs.find_map(|addr| match addr.ip() {
                    IpAddr::V4(ip) => Some(ip),
                    IpAddr::V6(_) => None,
                }));
            match resolved {
                Ok(Some(ip)) => Ok(ip),
                Ok(None) => Err(Reply::new_with_string(
                    ReplyCode::CantOpenDataConnection,
                    format!("No IPv4 address found for {}", name),
                )),
                Err(err) => Err(Reply::new_with_string(
                    ReplyCode::CantOpenDataConnection,
                    format!("Could not resolve {}: {}", name, err),
                )),
            }
        }
        PassiveHost::Func(func) => func(client.ip()).ok_or_else(|| Reply::code(ReplyCode::CommandNotImplemented)),
    }
}

fn make_pasv_reply(host: Ipv4Addr, port: u16) -> Reply {
    let [h1, h2, h3, h4] = host.octets();
    let [p1, p2] = port.to_be_bytes();
    Reply::new_with_string(
        ReplyCode::EnteringPassiveMode,
        format!("PASV OK ({},{},{},{},{},{})", h1, h2, h3, h4, p1, p2),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    #[test]
    fn reply_encodes_host_and_port() {
        assert_eq!(
            make_pasv_reply(Ipv4Addr::new(10, 0, 0, 7), 50001),
            Reply::new(ReplyCode::EnteringPassiveMode, "PASV OK (10,0,0,7,195,81)")
        );
    }

    #[tokio::test]
    async fn host_can_be_chosen_per_client() {
        let local: SocketAddr = "127.0.0.1:21".parse().unwrap();
        let client: SocketAddr = "127.0.0.1:40000".parse().unwrap();

        let from_conn = advertised_host(&PassiveHost::FromConnection, local, client).await;
        assert_eq!(from_conn, Ok(Ipv4Addr::LOCALHOST));

        let refuse = PassiveHost::Func(Arc::new(|_| None));
        assert_eq!(
            advertised_host(&refuse, local, client).await,
            Err(Reply::code(ReplyCode::CommandNotImplemented))
        );

        let fixed = PassiveHost::Func(Arc::new(|_| Some(Ipv4Addr::new(192, 0, 2, 1))));
        assert_eq!(advertised_host(&fixed, local, client).await, Ok(Ipv4Addr::new(192, 0, 2, 1)));
    }
}
