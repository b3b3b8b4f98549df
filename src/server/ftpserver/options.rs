//! Contains code pertaining to the setup options that can be given to the `Server`

use crate::storage::Metadata;
use bitflags::bitflags;
use std::{
    fmt::{self, Debug, Display, Formatter},
    net::{IpAddr, Ipv4Addr},
    ops::RangeInclusive,
    sync::Arc,
    time::Duration,
};

pub(crate) const DEFAULT_GREETING: &str = "Welcome to the libftpsrv FTP server";
pub(crate) const DEFAULT_IDLE_SESSION_TIMEOUT_SECS: u64 = 600;
pub(crate) const DEFAULT_PASSIVE_HOST: PassiveHost = PassiveHost::FromConnection;
pub(crate) const DEFAULT_PASSIVE_PORTS: RangeInclusive<u16> = 49152..=65535;

/// How long a transfer command waits for its data connection.
pub(crate) const DATA_CONNECTION_TIMEOUT: Duration = Duration::from_secs(5);
/// How often a waiting transfer command re-checks its data connection.
pub(crate) const DATA_CONNECTION_POLL: Duration = Duration::from_millis(250);
/// How long a passive listener waits for the client before it tears itself down.
pub(crate) const PASSIVE_IDLE_TIMEOUT: Duration = Duration::from_secs(30);

/// The option to `Server.passive_host`. It allows the user to specify how the IP address
/// communicated in the _PASV_ response is determined.
#[derive(Clone)]
pub enum PassiveHost {
    /// Use the IP address of the control connection
    FromConnection,
    /// Advertise this specific IP address
    Ip(Ipv4Addr),
    /// Resolve this DNS name into an IPv4 address.
    Dns(String),
    /// Decide per client. The function gets the client's address; returning `None` makes PASV
    /// reply 502.
    Func(Arc<dyn Fn(IpAddr) -> Option<Ipv4Addr> + Send + Sync>),
}

impl Debug for PassiveHost {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            PassiveHost::FromConnection => write!(f, "FromConnection"),
            PassiveHost::Ip(ip) => write!(f, "Ip({})", ip),
            PassiveHost::Dns(name) => write!(f, "Dns({})", name),
            PassiveHost::Func(_) => write!(f, "Func"),
        }
    }
}

impl PartialEq for PassiveHost {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (PassiveHost::FromConnection, PassiveHost::FromConnection) => true,
            (PassiveHost::Ip(a), PassiveHost::Ip(b)) => a == b,
            (PassiveHost::Dns(a), PassiveHost::Dns(b)) => a == b,
            (PassiveHost::Func(a), PassiveHost::Func(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl From<Ipv4Addr> for PassiveHost {
    fn from(ip: Ipv4Addr) -> Self {
        PassiveHost::Ip(ip)
    }
}

impl From<[u8; 4]> for PassiveHost {
    fn from(ip: [u8; 4]) -> Self {
        PassiveHost::Ip(ip.into())
    }
}

impl From<&str> for PassiveHost {
    fn from(dns_or_ip: &str) -> Self {
        match dns_or_ip.parse() {
            Ok(IpAddr::V4(ip)) => PassiveHost::Ip(ip),
            _ => PassiveHost::Dns(dns_or_ip.to_string()),
        }
    }
}

/// Formats one directory entry for LIST and STAT. Gets the entry name and its metadata.
pub type ListFormatter = Arc<dyn Fn(&str, &dyn Metadata) -> String + Send + Sync>;

/// The option to `Server.list_format`. Selects how LIST and STAT render directory entries.
#[derive(Clone, Default)]
pub enum ListFormat {
    /// `ls -l` style lines, what most clients expect.
    #[default]
    Ls,
    /// The Extended Path Listing Format, see <https://cr.yp.to/ftp/list/eplf.html>.
    Eplf,
    /// A user supplied formatter.
    Custom(ListFormatter),
}

impl Debug for ListFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ListFormat::Ls => write!(f, "Ls"),
            ListFormat::Eplf => write!(f, "Eplf"),
            ListFormat::Custom(_) => write!(f, "Custom"),
        }
    }
}

impl Display for ListFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                ListFormat::Ls => "ls",
                ListFormat::Eplf => "ep",
                ListFormat::Custom(_) => "custom",
            }
        )
    }
}

/// The option to `Server.shutdown_indicator`. Tells the server how to go about a graceful
/// shutdown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shutdown {
    pub(crate) grace_period: Duration,
}

impl Shutdown {
    /// Shut down with the default grace period of 10 seconds.
    pub fn new() -> Self {
        Shutdown::default()
    }

    /// How long sessions get to finish once the server stopped accepting connections.
    pub fn grace_period(mut self, d: impl Into<Duration>) -> Self {
        self.grace_period = d.into();
        self
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Shutdown {
            grace_period: Duration::from_secs(10),
        }
    }
}

bitflags! {
    /// Used to configure TLS options employed for FTPS
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct TlsFlags: u32 {
        /// Enables TLS version 1.2
        const V1_2               = 0b00000001;
        /// Enables TLS version 1.3
        const V1_3               = 0b00000010;
        /// Enables TLS session resumption via means of sessions IDs.
        const RESUMPTION_SESS_ID = 0b00001000;
        /// Enables TLS session resumption via means tickets ([rfc5077](https://tools.ietf.org/html/rfc5077))
        const RESUMPTION_TICKETS = 0b00010000;
        /// Enables the latest safe TLS versions i.e. 1.2 and 1.3
        const LATEST_VERSIONS = Self::V1_2.bits() | Self::V1_3.bits();
    }
}

impl Default for TlsFlags {
    fn default() -> TlsFlags {
        TlsFlags::V1_2 | TlsFlags::V1_3 | TlsFlags::RESUMPTION_SESS_ID | TlsFlags::RESUMPTION_TICKETS
    }
}

/// Turns a configured command name into the directive it stands for: `_` and `-` become spaces
/// and everything is upper cased, so `"site-chmod"` and `"stor"` map to `"SITE CHMOD"` and
/// `"STOR"`.
pub(crate) fn normalize_directive(name: &str) -> String {
    name.split(['_', '-'])
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
        .to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn passive_host_from_str() {
        assert_eq!(PassiveHost::from("10.0.0.1"), PassiveHost::Ip(Ipv4Addr::new(10, 0, 0, 1)));
        assert_eq!(PassiveHost::from("ftp.example.com"), PassiveHost::Dns("ftp.example.com".to_string()));
    }

    #[test]
    fn directive_names_are_normalized() {
        assert_eq!(normalize_directive("stor"), "STOR");
        assert_eq!(normalize_directive("site_chmod"), "SITE CHMOD");
        assert_eq!(normalize_directive("Site--Chmod"), "SITE CHMOD");
    }
}
