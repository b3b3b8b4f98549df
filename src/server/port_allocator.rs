//! Hands out passive mode ports.
//!
//! Reservations are process wide: two servers in the same process that share a port range never
//! hand out the same port at the same time. A port stays reserved for as long as its
//! [`PortReservation`] lives.

use dashmap::{DashMap, mapref::entry::Entry};
use lazy_static::lazy_static;
use std::{
    net::{IpAddr, SocketAddr},
    ops::RangeInclusive,
};
use thiserror::Error;
use tokio::net::{TcpListener, TcpSocket};

// The maximum number of ports tried for a single reservation.
const BIND_RETRIES: u32 = 100;

lazy_static! {
    static ref RESERVED: DashMap<u16, ()> = DashMap::new();
}

#[derive(Error, Debug, PartialEq, Eq)]
pub(crate) enum PortAllocationError {
    #[error("invalid passive port range {min}..={max}")]
    InvalidRange { min: u16, max: u16 },
    #[error("no free passive port found after {attempts} attempts")]
    Exhausted { attempts: u32 },
}

/// A claimed port, released again on drop.
#[derive(Debug)]
pub(crate) struct PortReservation {
    port: u16,
}

impl PortReservation {
    // Claims the port if nobody else holds it. The entry API makes the check and the claim one
    // atomic step.
    fn try_claim(port: u16) -> Option<PortReservation> {
        match RESERVED.entry(port) {
            Entry::Occupied(_) => None,
            Entry::Vacant(entry) => {
                entry.insert(());
                Some(PortReservation { port })
            }
        }
    }

    pub(crate) fn port(&self) -> u16 {
        self.port
    }
}

impl Drop for PortReservation {
    fn drop(&mut self) {
        RESERVED.remove(&self.port);
    }
}

#[derive(Debug, Clone)]
pub(crate) struct PortAllocator {
    range: RangeInclusive<u16>,
}

impl PortAllocator {
    pub(crate) fn new(range: RangeInclusive<u16>) -> Result<Self, PortAllocationError> {
        let (min, max) = (*range.start(), *range.end());
        if min == 0 || min > max {
            return Err(PortAllocationError::InvalidRange { min, max });
        }
        Ok(PortAllocator { range })
    }

    /// Reserves a port and binds a listener to it on the given host. Ports are tried in order
    /// starting from a random point in the range so that sessions don't all fight over the
    /// lowest port.
    pub(crate) fn reserve(&self, host: IpAddr) -> Result<(PortReservation, TcpListener), PortAllocationError> {
        let min = *self.range.start();
        let size = u32::from(*self.range.end() - min) + 1;
        let offset = random_u32() % size;
        let attempts = size.min(BIND_RETRIES);

        for i in 0..attempts {
            let port = min + ((offset + i) % size) as u16;
            let Some(reservation) = PortReservation::try_claim(port) else {
                continue;
            };
            if let Ok(listener) = bind(SocketAddr::new(host, port)) {
                return Ok((reservation, listener));
            }
        }
        Err(PortAllocationError::Exhausted { attempts })
    }
}

fn bind(addr: SocketAddr) -> std::io::Result<TcpListener> {
    let socket = match addr {
        SocketAddr::V4(_) => TcpSocket::new_v4()?,
        SocketAddr::V6(_) => TcpSocket::new_v6()?,
    };
    socket.set_reuseaddr(true)?;
    socket.bind(addr)?;
    socket.listen(1)
}

fn random_u32() -> u32 {
    let mut bytes = [0u8; 4];
    match getrandom::fill(&mut bytes) {
        Ok(()) => u32::from_ne_bytes(bytes),
        Err(_) => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::{
        net::Ipv4Addr,
        sync::{Arc, Barrier},
    };

    const LOCALHOST: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);

    #[test]
    fn rejects_invalid_ranges() {
        assert_eq!(PortAllocator::new(2000..=1999).unwrap_err(), PortAllocationError::InvalidRange { min: 2000, max: 1999 });
        assert_eq!(PortAllocator::new(0..=10).unwrap_err(), PortAllocationError::InvalidRange { min: 0, max: 10 });
        assert!(PortAllocator::new(1024..=1024).is_ok());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn single_port_range_is_never_handed_out_twice() {
        let allocator = PortAllocator::new(47811..=47811).unwrap();
        let start = Arc::new(Barrier::new(2));

        let racers: Vec<_> = (0..2)
            .map(|_| {
                let allocator = allocator.clone();
                let start = start.clone();
                tokio::task::spawn_blocking(move || {
                    start.wait();
                    allocator.reserve(LOCALHOST)
                })
            })
            .collect();
        let mut results = Vec::new();
        for racer in racers {
            results.push(racer.await.unwrap());
        }
        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(results.iter().any(|r| matches!(r, Err(PortAllocationError::Exhausted { attempts: 1 }))));
    }

    #[tokio::test]
    async fn released_ports_can_be_reserved_again() {
        let allocator = PortAllocator::new(47812..=47812).unwrap();

        let (reservation, listener) = allocator.reserve(LOCALHOST).unwrap();
        assert_eq!(reservation.port(), 47812);
        assert_eq!(listener.local_addr().unwrap().port(), 47812);
        assert!(allocator.reserve(LOCALHOST).is_err());

        drop(listener);
        drop(reservation);
        let (reservation, _listener) = allocator.reserve(LOCALHOST).unwrap();
        assert_eq!(reservation.port(), 47812);
    }

    #[tokio::test]
    async fn ports_stay_in_range() {
        let allocator = PortAllocator::new(47820..=47829).unwrap();
        let mut held = Vec::new();
        for _ in 0..5 {
            let (reservation, listener) = allocator.reserve(LOCALHOST).unwrap();
            assert!((47820..=47829).contains(&reservation.port()));
            held.push((reservation, listener));
        }
        let mut ports: Vec<u16> = held.iter().map(|(r, _)| r.port()).collect();
        ports.sort_unstable();
        ports.dedup();
        assert_eq!(ports.len(), 5);
    }
}
