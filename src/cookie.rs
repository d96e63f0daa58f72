//! The cookie jar contract (§6) plus a process-memory reference
//! implementation built on the `cookie` crate's parser, so the testable
//! scenarios in §8 are exercisable without a caller plugging in their own
//! jar. The jar is mutated by the transaction engine on `Set-Cookie` and
//! persisted by the caller at shutdown (§5).

use std::collections::HashMap;

use cookie::Cookie as ParsedCookie;

/// `cookie_header`/`handle_set_cookie`, as consumed by the transaction
/// engine.
pub trait CookieJar {
    /// Builds the `Cookie:` request header value for `(host, port, path)`,
    /// or `None` if there is nothing to send.
    fn cookie_header(&self, host: &str, port: u16, path: &str) -> Option<String>;

    /// Records a raw `Set-Cookie` response header value.
    fn handle_set_cookie(&mut self, host: &str, port: u16, path: &str, raw: &str);
}

#[derive(Clone, Debug)]
struct StoredCookie {
    name: String,
    value: String,
    path: String,
}

/// A minimal process-memory cookie jar keyed by lowercased host. Path
/// matching is a simple prefix check; no domain-attribute cross-host
/// sharing is implemented (out of scope per §1: "the cookie jar
/// implementation" is an external collaborator — this is a reference
/// default, not the contract).
#[derive(Default)]
pub struct MemoryCookieJar {
    by_host: HashMap<String, Vec<StoredCookie>>,
}

impl MemoryCookieJar {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl CookieJar for MemoryCookieJar {
    fn cookie_header(&self, host: &str, _port: u16, path: &str) -> Option<String> {
        let cookies = self.by_host.get(&host.to_ascii_lowercase())?;

        let matching: Vec<String> = cookies
            .iter()
            .filter(|c| path.starts_with(&c.path) || c.path == "/")
            .map(|c| format!("{}={}", c.name, c.value))
            .collect();

        if matching.is_empty() {
            None
        } else {
            Some(matching.join("; "))
        }
    }

    fn handle_set_cookie(&mut self, host: &str, _port: u16, path: &str, raw: &str) {
        let Ok(parsed) = ParsedCookie::parse(raw.to_string()) else { return };

        let stored = StoredCookie {
            name: parsed.name().to_string(),
            value: parsed.value().to_string(),
            path: parsed.path().unwrap_or(path).to_string(),
        };

        let entry = self.by_host.entry(host.to_ascii_lowercase()).or_default();
        entry.retain(|c| c.name != stored.name);
        entry.push(stored);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stores_and_returns_cookie_header() {
        let mut jar = MemoryCookieJar::new();
        jar.handle_set_cookie("example.com", 80, "/", "session=abc123; Path=/");
        assert_eq!(
            jar.cookie_header("example.com", 80, "/foo").unwrap(),
            "session=abc123"
        );
    }

    #[test]
    fn is_host_scoped() {
        let mut jar = MemoryCookieJar::new();
        jar.handle_set_cookie("example.com", 80, "/", "a=1; Path=/");
        assert!(jar.cookie_header("other.com", 80, "/").is_none());
    }

    #[test]
    fn updating_same_name_replaces() {
        let mut jar = MemoryCookieJar::new();
        jar.handle_set_cookie("example.com", 80, "/", "a=1; Path=/");
        jar.handle_set_cookie("example.com", 80, "/", "a=2; Path=/");
        assert_eq!(jar.cookie_header("example.com", 80, "/").unwrap(), "a=2");
    }
}
