//! The transport collaborator (§6): `connect`/`read`/`write`/`peer_ip`/
//! `probe_open`/`close`, given a default `TcpStream`-backed implementation
//! so the crate is runnable without a caller supplying its own, while
//! remaining swappable (tests use an in-memory transport).

use std::io::{self, Read, Write};
use std::net::{IpAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

use crate::{NetError, NetResult};

/// A live connection handle: readable, writable, and queryable for the
/// liveness probe the persistent-connection cache performs before reuse.
pub trait Transport: Read + Write + Send {
    /// The peer's IP address, used by the pool's virtual-host fallback
    /// match (`available_for`).
    fn peer_ip(&self) -> NetResult<IpAddr>;

    /// A non-blocking liveness probe: `true` if the socket looks alive
    /// (no pending readable EOF/error), without consuming any bytes.
    fn probe_open(&self) -> bool;

    /// Closes the underlying connection.
    fn close(&mut self) -> NetResult<()>;
}

/// Opens connections to remote hosts. A default `TcpStream`-backed
/// implementation is provided; HTTPS support is out of scope (§1) and
/// `connect` returns `NetError::HttpsNotImplemented` for a `tls` request.
pub trait Connector {
    type Conn: Transport;

    fn connect(&self, host: &str, port: u16, tls: bool) -> NetResult<Self::Conn>;
}

/// The default connector: plain-TCP only.
#[derive(Debug, Default, Clone, Copy)]
pub struct TcpConnector {
    pub timeout: Option<Duration>,
}

impl Connector for TcpConnector {
    type Conn = TcpTransport;

    fn connect(&self, host: &str, port: u16, tls: bool) -> NetResult<Self::Conn> {
        if tls {
            return Err(NetError::HttpsNotImplemented);
        }

        let addr = (host, port)
            .to_socket_addrs()
            .map_err(NetError::from)?
            .next()
            .ok_or(NetError::Transaction(crate::errors::ErrorCode::HostErr))?;

        let stream = if let Some(timeout) = self.timeout {
            TcpStream::connect_timeout(&addr, timeout).map_err(NetError::from)?
        } else {
            TcpStream::connect(addr).map_err(NetError::from)?
        };

        if let Some(timeout) = self.timeout {
            stream.set_read_timeout(Some(timeout)).ok();
            stream.set_write_timeout(Some(timeout)).ok();
        }

        Ok(TcpTransport { stream })
    }
}

/// A `std::net::TcpStream`-backed `Transport`.
#[derive(Debug)]
pub struct TcpTransport {
    stream: TcpStream,
}

impl TcpTransport {
    #[must_use]
    pub const fn from_stream(stream: TcpStream) -> Self {
        Self { stream }
    }

    /// Attempts to clone the underlying socket (used by the pool to hand
    /// out a reusable handle while keeping the registered record).
    pub fn try_clone(&self) -> io::Result<Self> {
        Ok(Self { stream: self.stream.try_clone()? })
    }
}

impl Read for TcpTransport {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.stream.read(buf)
    }
}

impl Write for TcpTransport {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.stream.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.stream.flush()
    }
}

impl Transport for TcpTransport {
    fn peer_ip(&self) -> NetResult<IpAddr> {
        self.stream.peer_addr().map(|a| a.ip()).map_err(NetError::from)
    }

    fn probe_open(&self) -> bool {
        let mut buf = [0u8; 1];
        self.stream.set_nonblocking(true).ok();
        let probe = match self.stream.peek(&mut buf) {
            Ok(0) => false,
            Ok(_) => true,
            Err(e) => e.kind() == io::ErrorKind::WouldBlock,
        };
        self.stream.set_nonblocking(false).ok();
        probe
    }

    fn close(&mut self) -> NetResult<()> {
        self.stream.shutdown(std::net::Shutdown::Both).ok();
        Ok(())
    }
}
