//! A minimal URL representation (§3, §6): URL parsing itself is out of
//! scope, but the engine needs a concrete type to build requests against
//! and to test the transaction engine without a caller's own parser.

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::net::IpAddr;

/// The two schemes this engine understands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Scheme {
    Http,
    Https,
}

impl Scheme {
    #[must_use]
    pub const fn default_port(self) -> u16 {
        match self {
            Self::Http => 80,
            Self::Https => 443,
        }
    }

    #[must_use]
    pub const fn is_secure(self) -> bool {
        matches!(self, Self::Https)
    }
}

impl Display for Scheme {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(match self {
            Self::Http => "http",
            Self::Https => "https",
        })
    }
}

/// A parsed absolute URL (§3 DATA MODEL): scheme, host, port, optional
/// userinfo, path, query, and the original raw string.
#[derive(Clone, Debug)]
pub struct Url {
    pub scheme: Scheme,
    pub host: String,
    pub port: u16,
    pub user: Option<String>,
    pub passwd: Option<String>,
    pub path: String,
    pub query: Option<String>,
    pub raw: String,
}

impl Url {
    #[must_use]
    pub fn new(scheme: Scheme, host: impl Into<String>, path: impl Into<String>) -> Self {
        let host = host.into();
        let path = path.into();
        let port = scheme.default_port();
        let raw = format!("{scheme}://{host}{path}");
        Self { scheme, host, port, user: None, passwd: None, path, query: None, raw }
    }

    /// Returns `port` if it was explicitly set away from the scheme's
    /// default, else the scheme's default port. Callers that need the
    /// HSTS store's "explicit port, 0 means default" key convention should
    /// use `hsts_port()` instead.
    #[must_use]
    pub const fn scheme_default_port(&self) -> u16 {
        self.scheme.default_port()
    }

    /// The HSTS store's port-key convention: 0 when `port` equals the
    /// scheme default, else the explicit numeric port.
    #[must_use]
    pub const fn hsts_port(&self) -> u16 {
        if self.port == self.scheme.default_port() {
            0
        } else {
            self.port
        }
    }

    /// `path` plus `?query`, the request-target for a non-proxy request.
    #[must_use]
    pub fn full_path(&self) -> String {
        match &self.query {
            Some(q) if !q.is_empty() => format!("{}?{q}", self.path),
            _ => self.path.clone(),
        }
    }

    /// Whether `host` is a literal IP address rather than a DNS name (the
    /// HSTS store must never record an entry for an IP literal).
    #[must_use]
    pub fn is_valid_ip_address(&self) -> bool {
        self.host.parse::<IpAddr>().is_ok()
    }

    #[must_use]
    pub fn is_https(&self) -> bool {
        self.scheme.is_secure()
    }
}

impl Display for Url {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_path_includes_query() {
        let mut url = Url::new(Scheme::Http, "example.com", "/a/b");
        url.query = Some("x=1".to_string());
        assert_eq!(url.full_path(), "/a/b?x=1");
    }

    #[test]
    fn hsts_port_is_zero_at_default() {
        let url = Url::new(Scheme::Https, "example.com", "/");
        assert_eq!(url.hsts_port(), 0);
    }

    #[test]
    fn hsts_port_is_explicit_when_nondefault() {
        let mut url = Url::new(Scheme::Https, "example.com", "/");
        url.port = 8443;
        assert_eq!(url.hsts_port(), 8443);
    }

    #[test]
    fn detects_ip_literal_host() {
        let url = Url::new(Scheme::Http, "127.0.0.1", "/");
        assert!(url.is_valid_ip_address());
        let url = Url::new(Scheme::Http, "example.com", "/");
        assert!(!url.is_valid_ip_address());
    }
}
