//! The persistent-connection cache (§4.7): tracks at most one reusable
//! connection and governs its reuse and invalidation.

use std::net::IpAddr;

use crate::transport::Transport;

/// A single pooled connection record.
pub struct PooledConnection {
    pub conn: Box<dyn Transport>,
    pub host: String,
    pub port: u16,
    pub tls: bool,
    /// NTLM authenticates the connection itself; once set, the next
    /// request on this connection may omit `Authorization`.
    pub ntlm_authorized: bool,
}

/// Holds at most one reusable connection, process-wide (wrapped in
/// `ClientContext` rather than a global, per the Design Notes).
#[derive(Default)]
pub struct ConnectionPool {
    active: Option<PooledConnection>,
}

impl ConnectionPool {
    #[must_use]
    pub const fn new() -> Self {
        Self { active: None }
    }

    /// Registers a freshly-opened connection, closing and discarding any
    /// prior different record first.
    pub fn register(&mut self, conn: Box<dyn Transport>, host: String, port: u16, tls: bool) {
        self.invalidate();
        self.active = Some(PooledConnection { conn, host, port, tls, ntlm_authorized: false });
    }

    /// Returns whether a pooled connection can be reused for `(host,
    /// port)`. Accepts either an exact (case-insensitive) host match, or a
    /// peer-IP match against `resolved`, the set of addresses `host`
    /// resolves to (the virtual-host fallback for shared-address hosts).
    /// Performs the probe-before-reuse liveness check; a failed probe
    /// invalidates the record and returns `false`.
    pub fn available_for(&mut self, host: &str, port: u16, resolved: &[IpAddr]) -> bool {
        let Some(record) = self.active.as_ref() else { return false };

        if record.port != port {
            return false;
        }

        let host_matches = record.host.eq_ignore_ascii_case(host);
        let ip_matches = record
            .conn
            .peer_ip()
            .map(|ip| resolved.contains(&ip))
            .unwrap_or(false);

        if !host_matches && !ip_matches {
            return false;
        }

        if !record.conn.probe_open() {
            self.invalidate();
            return false;
        }

        true
    }

    /// Borrows the active record mutably, if present (for writing the next
    /// request on a reused connection).
    pub fn active_mut(&mut self) -> Option<&mut PooledConnection> {
        self.active.as_mut()
    }

    /// Takes ownership of the active record, leaving the pool empty (used
    /// when handing a connection to the transaction engine for the
    /// duration of one attempt, then re-registering via `register` or
    /// `return_finished`).
    pub fn take(&mut self) -> Option<PooledConnection> {
        self.active.take()
    }

    /// Returns a finished connection to the pool (`CLOSE_FINISH`
    /// semantics): if `keep_alive` is false the caller should have already
    /// closed it and this is a no-op.
    pub fn return_finished(&mut self, record: PooledConnection, keep_alive: bool) {
        if keep_alive {
            self.active = Some(record);
        }
    }

    /// Closes the active connection and clears the pool, unconditionally
    /// (`CLOSE_INVALIDATE` semantics).
    pub fn invalidate(&mut self) {
        if let Some(mut record) = self.active.take() {
            record.conn.close().ok();
        }
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }
}

/// A scoped guard around a connection borrowed from the pool for one
/// transaction attempt. Its `Drop` impl defaults to invalidating the
/// connection, so "forgetting to finish" is safe; call `finish()` or
/// `invalidate()` explicitly to pick the outcome.
pub struct ConnectionGuard<'a> {
    pool: &'a mut ConnectionPool,
    record: Option<PooledConnection>,
    keep_alive: bool,
}

impl<'a> ConnectionGuard<'a> {
    #[must_use]
    pub fn new(pool: &'a mut ConnectionPool, record: PooledConnection, keep_alive: bool) -> Self {
        Self { pool, record: Some(record), keep_alive }
    }

    pub fn conn_mut(&mut self) -> &mut PooledConnection {
        self.record.as_mut().expect("connection guard used after release")
    }

    /// Returns the connection to the pool if keep-alive, else closes it.
    pub fn finish(mut self) {
        if let Some(mut record) = self.record.take() {
            if self.keep_alive {
                self.pool.return_finished(record, true);
            } else {
                record.conn.close().ok();
            }
        }
    }

    /// Closes the connection unconditionally, regardless of keep-alive.
    pub fn invalidate(mut self) {
        if let Some(mut record) = self.record.take() {
            record.conn.close().ok();
        }
    }
}

impl Drop for ConnectionGuard<'_> {
    fn drop(&mut self) {
        if let Some(mut record) = self.record.take() {
            record.conn.close().ok();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NetResult;
    use std::io::{self, Read, Write};

    struct FakeTransport {
        alive: bool,
        ip: IpAddr,
    }

    impl Read for FakeTransport {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Ok(0)
        }
    }

    impl Write for FakeTransport {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            Ok(buf.len())
        }
        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Transport for FakeTransport {
        fn peer_ip(&self) -> NetResult<IpAddr> {
            Ok(self.ip)
        }

        fn probe_open(&self) -> bool {
            self.alive
        }

        fn close(&mut self) -> NetResult<()> {
            self.alive = false;
            Ok(())
        }
    }

    fn ip(s: &str) -> IpAddr {
        s.parse().unwrap()
    }

    #[test]
    fn exact_host_match_reuses() {
        let mut pool = ConnectionPool::new();
        let t = Box::new(FakeTransport { alive: true, ip: ip("127.0.0.1") });
        pool.register(t, "example.com".to_string(), 80, false);
        assert!(pool.available_for("Example.com", 80, &[]));
    }

    #[test]
    fn different_port_is_not_reusable() {
        let mut pool = ConnectionPool::new();
        let t = Box::new(FakeTransport { alive: true, ip: ip("127.0.0.1") });
        pool.register(t, "example.com".to_string(), 80, false);
        assert!(!pool.available_for("example.com", 443, &[]));
    }

    #[test]
    fn virtual_host_fallback_by_peer_ip() {
        let mut pool = ConnectionPool::new();
        let t = Box::new(FakeTransport { alive: true, ip: ip("10.0.0.5") });
        pool.register(t, "a.example.com".to_string(), 80, false);
        assert!(pool.available_for("b.example.com", 80, &[ip("10.0.0.5")]));
    }

    #[test]
    fn dead_probe_invalidates() {
        let mut pool = ConnectionPool::new();
        let t = Box::new(FakeTransport { alive: false, ip: ip("127.0.0.1") });
        pool.register(t, "example.com".to_string(), 80, false);
        assert!(!pool.available_for("example.com", 80, &[]));
        assert!(!pool.is_active());
    }

    #[test]
    fn register_closes_prior_record() {
        let mut pool = ConnectionPool::new();
        let t1 = Box::new(FakeTransport { alive: true, ip: ip("127.0.0.1") });
        pool.register(t1, "a.example.com".to_string(), 80, false);
        let t2 = Box::new(FakeTransport { alive: true, ip: ip("127.0.0.2") });
        pool.register(t2, "b.example.com".to_string(), 80, false);
        assert!(!pool.available_for("a.example.com", 80, &[]));
        assert!(pool.available_for("b.example.com", 80, &[]));
    }
}
