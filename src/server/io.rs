use std::net::IpAddr;
use tokio::io::{AsyncRead, AsyncWrite};

pub(crate) trait AsyncReadAsyncWriteSendUnpin: AsyncRead + AsyncWrite + Send + Unpin {}

impl<T: AsyncRead + AsyncWrite + Send + Unpin> AsyncReadAsyncWriteSendUnpin for T {}

/// A data channel socket, plain or TLS wrapped.
pub(crate) type DataStream = Box<dyn AsyncReadAsyncWriteSendUnpin>;

/// Compares two addresses as hosts, treating `::ffff:a.b.c.d` the same as `a.b.c.d`.
pub(crate) fn same_host(a: IpAddr, b: IpAddr) -> bool {
    a.to_canonical() == b.to_canonical()
}
