//! The peer address a session believes it is talking to, and the PROXY
//! protocol v1 preamble that can override it for the lifetime of a
//! connection.

use std::net::{IpAddr, SocketAddr};

/// The address a session attributes its peer to.
///
/// Starts as the transport-level peer address and, for listeners behind a
/// `PROXY protocol`-speaking load balancer, is replaced once by the real
/// client address carried in the connection's leading preamble.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Source {
    addr: SocketAddr,
}

impl Source {
    /// Build a `Source` from a transport-level peer address.
    #[must_use]
    pub fn new(addr: SocketAddr) -> Self {
        Self { addr }
    }

    /// The peer's IP address.
    #[must_use]
    pub fn ip(&self) -> IpAddr {
        self.addr.ip()
    }

    /// The peer's port.
    #[must_use]
    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    /// The full socket address.
    #[must_use]
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Replace this `Source` with the address carried in a PROXY preamble.
    #[must_use]
    pub fn with_proxy(self, preamble: &ProxyPreamble) -> Self {
        Self { addr: SocketAddr::new(preamble.ip, preamble.port) }
    }
}

/// The original client address recovered from a `PROXY TCP4 ...` preamble.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProxyPreamble {
    /// The real client's IP address.
    pub ip: IpAddr,
    /// The real client's port.
    pub port: u16,
    /// Bytes consumed from the front of the stream, including the trailing `\r\n`.
    pub consumed: usize,
}

/// Parse a leading `PROXY TCP4 <src-ip> <dst-ip> <src-port> <dst-port>\r\n`
/// preamble.
///
/// Returns `None` if `data` doesn't start with `PROXY`, has no `\r\n`
/// terminator yet (the caller should wait for more bytes), or is malformed
/// once the terminator is found — callers that require proxy protocol
/// should treat a malformed preamble as a framing error.
#[must_use]
pub fn parse_proxy_preamble(data: &[u8]) -> Option<ProxyPreamble> {
    if !data.starts_with(b"PROXY") {
        return None;
    }

    let end = data.windows(2).position(|window| window == b"\r\n")?;
    let line = std::str::from_utf8(&data[..end]).ok()?;
    let mut fields = line.split(' ');

    let _keyword = fields.next()?;
    let _protocol = fields.next()?;
    let src_ip = fields.next()?;
    let _dst_ip = fields.next()?;
    let src_port = fields.next()?;

    let ip: IpAddr = src_ip.parse().ok()?;
    let port: u16 = src_port.parse().ok()?;

    Some(ProxyPreamble { ip, port, consumed: end + 2 })
}
