//! The RFC 2428 Extended Data Port (`EPRT`) command
//
// The EPRT command allows for the specification of an extended address
// for the data connection.
//
//      EPRT |1|132.235.1.2|6275|
//      EPRT |2|1080::8:800:200C:417A|5282|

use super::port::connect_active;
use crate::{
    server::controlchan::{
        Reply, ReplyCode,
        error::ControlChanError,
        handler::{CommandContext, CommandHandler},
    },
    storage::StorageBackend,
};
use async_trait::async_trait;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};

#[derive(Debug)]
pub struct Eprt;

#[async_trait]
impl<Storage> CommandHandler<Storage> for Eprt
where
    Storage: StorageBackend + 'static,
{
    #[tracing_attributes::instrument]
    async fn handle(&self, args: CommandContext<Storage>) -> Result<Reply, ControlChanError> {
        match parse_extended(args.cmd.arg()) {
            Ok(target) => Ok(connect_active(&args, target).await),
            Err(reply) => Ok(reply),
        }
    }
}

fn parse_extended(arg: &str) -> Result<SocketAddr, Reply> {
    let parts: Vec<&str> = arg.split('|').collect();
    let field = |i: usize| parts.get(i).copied().unwrap_or("");
    let ip: Option<IpAddr> = match field(1) {
        "1" => field(2).parse::<Ipv4Addr>().ok().map(IpAddr::from),
        "2" => field(2).parse::<Ipv6Addr>().ok().map(IpAddr::from),
        _ => return Err(Reply::new(ReplyCode::CommandNotImplementedForParameter, "Unknown network protocol")),
    };
    match (ip, field(3).parse::<u16>()) {
        (Some(ip), Ok(port)) => Ok(SocketAddr::new(ip, port)),
        _ => Err(Reply::code(ReplyCode::ParameterSyntaxError)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn both_families_are_parsed() {
        assert_eq!(parse_extended("|1|132.235.1.2|6275|"), Ok("132.235.1.2:6275".parse().unwrap()));
        assert_eq!(parse_extended("|2|::1|5282|"), Ok("[::1]:5282".parse().unwrap()));
    }

    #[test]
    fn unknown_family_is_refused() {
        assert_eq!(
            parse_extended("|3|132.235.1.2|6275|"),
            Err(Reply::new(ReplyCode::CommandNotImplementedForParameter, "Unknown network protocol"))
        );
        assert_eq!(parse_extended("|1|not-an-ip|6275|"), Err(Reply::code(ReplyCode::ParameterSyntaxError)));
    }
}
