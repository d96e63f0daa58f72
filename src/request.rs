//! The request builder (§4.6): method, request-target, and an ordered
//! header list with replace-by-name semantics, serialized to wire form.
//!
//! The original's ownership-tagged headers (`rel_none|name|value|both`)
//! collapse under Rust ownership: every `Header` simply owns its `String`
//! data, so there is nothing for callers to release and no destructor
//! sum-type is needed (see DESIGN.md).

use std::io::Write;

use crate::header::header_consts::{CACHE_CONTROL, CONTENT_LENGTH, CONTENT_TYPE, PRAGMA};
use crate::{Header, HeaderName, HeaderValue, Method, NetResult};

/// An outbound HTTP request: method, request-target, and headers in
/// insertion order with at most one entry per case-insensitive name.
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    pub method: Method,
    pub target: String,
    headers: Vec<Header>,
}

impl RequestBuilder {
    #[must_use]
    pub fn new(method: Method, target: impl Into<String>) -> Self {
        Self { method, target: target.into(), headers: Vec::new() }
    }

    /// Sets a header, replacing any existing header of the same
    /// case-insensitive name (§4.6 `set_header`). A value of `""` is
    /// treated as absent and is a no-op rather than inserting an empty
    /// header.
    pub fn set_header(&mut self, name: HeaderName, value: impl Into<HeaderValue>) -> &mut Self {
        let value = value.into();
        if value.as_bytes().is_empty() {
            return self;
        }

        match self.headers.iter_mut().find(|h| h.name == name) {
            Some(h) => h.value = value,
            None => self.headers.push(Header::new(name, value)),
        }
        self
    }

    /// Parses and sets a raw `"Name: value"` line (§4.6 `set_user_header`).
    pub fn set_user_header(&mut self, raw_line: &str) -> NetResult<&mut Self> {
        let header = Header::parse(raw_line)?;
        self.set_header(header.name, header.value);
        Ok(self)
    }

    /// Removes a header by name, if present (§4.6 `remove_header`).
    pub fn remove_header(&mut self, name: &HeaderName) -> &mut Self {
        self.headers.retain(|h| h.name != *name);
        self
    }

    #[must_use]
    pub fn has_header(&self, name: &HeaderName) -> bool {
        self.headers.iter().any(|h| h.name == *name)
    }

    #[must_use]
    pub fn header(&self, name: &HeaderName) -> Option<&HeaderValue> {
        self.headers.iter().find(|h| h.name == *name).map(|h| &h.value)
    }

    pub fn set_content_length(&mut self, len: usize) -> &mut Self {
        self.set_header(CONTENT_LENGTH, len)
    }

    pub fn set_content_type(&mut self, ctype: &str) -> &mut Self {
        self.set_header(CONTENT_TYPE, ctype)
    }

    pub fn set_no_cache(&mut self) -> &mut Self {
        self.set_header(CACHE_CONTROL, "no-cache");
        self.set_header(PRAGMA, "no-cache");
        self
    }

    /// Serializes the request line and headers into wire form (no body).
    #[must_use]
    pub fn head_to_string(&self) -> String {
        let mut out = format!("{} {} HTTP/1.1\r\n", self.method, self.target);
        for h in &self.headers {
            out.push_str(&format!("{h}\r\n"));
        }
        out.push_str("\r\n");
        out
    }

    /// Writes the request head and optional body to `sink`, mirroring the
    /// bytes to `mirror` if present (the WARC collaborator). Per §4.6:
    /// returns on the first failing write, distinguishing a sink failure
    /// from a mirror failure.
    pub fn send<W: Write, M: Write>(
        &self,
        sink: &mut W,
        body: Option<&[u8]>,
        mirror: Option<&mut M>,
    ) -> NetResult<()> {
        let head = self.head_to_string();

        sink.write_all(head.as_bytes()).map_err(crate::NetError::from)?;
        if let Some(b) = body {
            sink.write_all(b).map_err(crate::NetError::from)?;
        }
        sink.flush().map_err(crate::NetError::from)?;

        if let Some(mirror) = mirror {
            mirror.write_all(head.as_bytes()).map_err(crate::NetError::from)?;
            if let Some(b) = body {
                mirror.write_all(b).map_err(crate::NetError::from)?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::header_consts::{ACCEPT, HOST};

    #[test]
    fn replaces_same_name_header() {
        let mut req = RequestBuilder::new(Method::Get, "/");
        req.set_header(HOST, "example.com");
        req.set_header(HOST, "other.example.com");
        assert_eq!(req.header(&HOST).unwrap().to_string(), "other.example.com");
        assert_eq!(req.headers.iter().filter(|h| h.name == HOST).count(), 1);
    }

    #[test]
    fn empty_value_is_a_no_op() {
        let mut req = RequestBuilder::new(Method::Get, "/");
        req.set_header(ACCEPT, "");
        assert!(!req.has_header(&ACCEPT));
    }

    #[test]
    fn serializes_wire_form() {
        let mut req = RequestBuilder::new(Method::Get, "/path");
        req.set_header(HOST, "example.com");
        let s = req.head_to_string();
        assert!(s.starts_with("GET /path HTTP/1.1\r\n"));
        assert!(s.contains("Host: example.com\r\n"));
        assert!(s.ends_with("\r\n\r\n"));
    }

    #[test]
    fn set_user_header_splits_on_first_colon() {
        let mut req = RequestBuilder::new(Method::Get, "/");
        req.set_user_header("X-Custom:   value: with colon").unwrap();
        assert_eq!(
            req.header(&HeaderName::from("x-custom")).unwrap().to_string(),
            "value: with colon"
        );
    }

    #[test]
    fn remove_header_compacts() {
        let mut req = RequestBuilder::new(Method::Get, "/");
        req.set_header(HOST, "example.com");
        req.remove_header(&HOST);
        assert!(!req.has_header(&HOST));
    }
}
