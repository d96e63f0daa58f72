//! `retrievalcore`
//!
//! An HTTP/1.1 client transaction engine for a downloader: the `gethttp`
//! state machine that drives one fetch attempt, the retry/redirect/auth
//! outer loop that wraps it, a persistent-connection cache, an HSTS policy
//! store, and the header/parameter parsing they all sit on.
//!
//! The engine is single-threaded and synchronous: exactly one HTTP
//! transaction is ever in flight. Callers supply a parsed `Url`, a
//! `FetchOptions`, and a sink; the crate does not parse URLs, resolve DNS,
//! speak TLS, or decide file names — those remain the caller's collaborators
//! (see `transport`, `cookie`, and `warc`).

#![deny(clippy::cargo)]
#![deny(clippy::complexity)]
#![deny(clippy::correctness)]
#![deny(clippy::nursery)]
#![deny(clippy::pedantic)]
#![deny(clippy::perf)]
#![deny(clippy::style)]
#![deny(clippy::suspicious)]

#[cfg(test)]
mod tests;

pub mod auth;
pub mod body;
pub mod client;
pub mod cookie;
pub mod date;
pub mod errors;
pub mod header;
pub mod hsts;
pub mod http;
pub mod parse;
pub mod pool;
pub mod request;
pub mod sink;
pub mod transaction;
pub mod transport;
pub mod url;
pub mod util;
pub mod warc;

pub use auth::{BasicAuthedHosts, Challenge, NtlmCodec, NtlmState, Scheme as AuthScheme};
pub use client::{ClientContext, FetchOptions, FetchOutcome, ProxyConfig};
pub use cookie::{CookieJar, MemoryCookieJar};
pub use errors::{NetError, NetResult, ParseErrorKind};
pub use header::{Header, HeaderKind, HeaderName, HeaderValue};
pub use hsts::HstsStore;
pub use http::{Method, Status, Version};
pub use pool::{ConnectionGuard, ConnectionPool, PooledConnection};
pub use request::RequestBuilder;
pub use transaction::{gethttp, TransactionOutcome, TransactionState};
pub use transport::{Connector, TcpConnector, Transport};
pub use url::{Scheme, Url};
pub use util::trim_whitespace_bytes;

pub mod consts {
    pub use crate::body::SKIP_SHORT_BODY_MAX;
    pub use crate::header::header_consts::*;
    pub use crate::header::MAX_HEAD_SIZE;

    #[cfg(test)]
    pub use crate::header::names::TEST_HEADERS;
}
