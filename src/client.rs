//! The client context (§2.1, §3.1) and the retry/redirect/timestamp loop
//! (§4.11 `http_loop`) that wraps the transaction engine. Replaces the
//! Design Notes' four global tables (`pconn`, `basic_authed_hosts`,
//! `wget_cookie_jar`, `hsts_store`) with one explicit struct that every
//! engine operation is a method on.

use std::io::Write;
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use crate::auth::{BasicAuthedHosts, NtlmCodec};
use crate::cookie::{CookieJar, MemoryCookieJar};
use crate::date::{self, rfc1123_of};
use crate::hsts::HstsStore;
use crate::pool::ConnectionPool;
use crate::transaction::{gethttp, TransactionOutcome, TransactionState};
use crate::transport::{Connector, TcpConnector};
use crate::url::Url;
use crate::{Method, NetError, NetResult, Status};

/// Basic-only proxy credentials (§9.1 resolved precedence): encoded when
/// both fields are present, never attempted otherwise; no Digest/NTLM
/// proxy auth is attempted (the source's assignment path for that is the
/// part the spec calls out as missing).
#[derive(Clone, Debug, Default)]
pub struct ProxyConfig {
    pub host: String,
    pub port: u16,
    pub user: Option<String>,
    pub passwd: Option<String>,
}

/// The caller-supplied knob bundle (§3.1), passed by reference rather than
/// read from a global options table.
#[derive(Clone, Debug)]
pub struct FetchOptions {
    /// Maximum attempts; `0` means retry forever.
    pub ntry: u32,
    pub timeout: Duration,
    pub user_agent: String,
    pub proxy: Option<ProxyConfig>,
    pub compression: bool,
    /// Whether intermediate caches may serve this fetch at all; `false`
    /// forces `Cache-Control: no-cache` / `Pragma: no-cache` on every
    /// attempt (§4.11 step 2's "caching disallowed" case `b`).
    pub allow_cache: bool,
    pub timestamping: bool,
    pub noclobber: bool,
    pub content_disposition: bool,
    pub always_rest: bool,
    pub start_pos: Option<u64>,
    pub if_modified_since: bool,
    pub auth_without_challenge: bool,
    pub credentials: Option<(String, String)>,
    pub output_document: Option<PathBuf>,
    pub spider: bool,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            ntry: 20,
            timeout: Duration::from_secs(90),
            user_agent: format!("retrievalcore/{}", env!("CARGO_PKG_VERSION")),
            proxy: None,
            compression: true,
            allow_cache: true,
            timestamping: false,
            noclobber: false,
            content_disposition: false,
            always_rest: false,
            start_pos: None,
            if_modified_since: false,
            auth_without_challenge: false,
            credentials: None,
            output_document: None,
            spider: false,
        }
    }
}

/// The explicit, non-global aggregate (§2.1 item 11, §3.1, Design Notes)
/// every transaction-engine and loop operation is a method on.
pub struct ClientContext<C: Connector> {
    pub pconn: ConnectionPool,
    pub basic_authed_hosts: BasicAuthedHosts,
    pub hsts: HstsStore,
    pub cookies: Box<dyn CookieJar>,
    pub connector: C,
    pub options: FetchOptions,
    /// NTLM message encoding is a pluggable collaborator (§4.9, §9.1): no
    /// codec means NTLM challenges are reported as `NoUsableAuthScheme`
    /// rather than attempted.
    pub ntlm_codec: Option<Box<dyn NtlmCodec>>,
}

impl ClientContext<TcpConnector> {
    /// Builds a context backed by the default plain-TCP connector.
    #[must_use]
    pub fn new(options: FetchOptions) -> Self {
        let connector = TcpConnector { timeout: Some(options.timeout) };
        Self::with_connector(connector, options)
    }
}

impl<C: Connector> ClientContext<C> {
    /// Builds a context around a caller-supplied connector (tests use an
    /// in-memory one; see `transaction::tests`).
    #[must_use]
    pub fn with_connector(connector: C, options: FetchOptions) -> Self {
        Self {
            pconn: ConnectionPool::new(),
            basic_authed_hosts: BasicAuthedHosts::new(),
            hsts: HstsStore::new(),
            cookies: Box::new(MemoryCookieJar::new()),
            connector,
            options,
            ntlm_codec: None,
        }
    }

    /// Attaches an NTLM message codec, enabling NTLM challenge handling.
    #[must_use]
    pub fn with_ntlm_codec(mut self, codec: Box<dyn NtlmCodec>) -> Self {
        self.ntlm_codec = Some(codec);
        self
    }
}

/// The outcome `http_loop` reports once it stops retrying. Following a
/// redirect to a new URL is the recursive-crawler's job (out of scope,
/// §1); this loop hands the location back rather than chasing it.
#[derive(Debug, Clone)]
pub enum FetchOutcome {
    /// The transfer completed (or no body was needed for the status); the
    /// final status code, the transaction state from the last attempt, and
    /// (§4.11 step 7) the parsed `Last-Modified` epoch when
    /// `options.timestamping` is set and the transfer succeeded — applying
    /// it to the destination file's mtime is the caller's job (file
    /// metadata is an external collaborator, §6).
    Done(Status, TransactionState, Option<i64>),
    /// A conditional request determined no transfer was necessary.
    Unneeded,
    /// A redirect the caller should re-issue, preserving the method only
    /// when `keep_post` is set.
    Redirect { location: String, keep_post: bool },
    /// Spider mode's (§4.11 step 6) existence report from a HEAD-only
    /// probe: no body is ever fetched.
    SpiderChecked { status: Status, exists: bool },
}

/// Drives one URL through the attempt loop described in §4.11: computes
/// `restval` each attempt, calls the transaction engine, retries
/// retry-eligible errors with backoff up to `options.ntry` attempts (`0` =
/// unbounded), and evaluates success by comparing bytes received against
/// the declared length.
///
/// `resume_from` is the size of a pre-existing local file when resuming
/// (`-c` semantics); pass `0` for a fresh download. `local_mtime`, if
/// given, drives the conditional `If-Modified-Since` probe when
/// `options.if_modified_since` is set. `destination_exists` reports
/// whether the caller's chosen output file already exists, feeding the
/// `send_head_first` decision (§4.11 initial decisions) — filename
/// selection itself stays the caller's job (§1).
#[allow(clippy::too_many_arguments)]
pub fn http_loop<C: Connector>(
    ctx: &mut ClientContext<C>,
    url: &Url,
    method: Method,
    request_body: Option<&[u8]>,
    resume_from: u64,
    local_mtime: Option<i64>,
    destination_exists: bool,
    referer: Option<&str>,
    sink: &mut dyn Write,
    mut mirror: Option<&mut dyn Write>,
) -> NetResult<FetchOutcome> {
    let ims = if ctx.options.if_modified_since {
        local_mtime.map(rfc1123_of)
    } else {
        None
    };

    // §4.11 initial decisions: a HEAD-only probe precedes the real
    // transfer when spidering, when Content-Disposition naming demands a
    // full re-stat (`always_rest`), or when server timestamps are wanted
    // and a destination file already exists to compare against.
    let send_head_first = ctx.options.spider
        || (ctx.options.content_disposition && ctx.options.always_rest)
        || (ctx.options.timestamping && destination_exists);

    let mut head_only = send_head_first && method != Method::Head;
    let mut attempt: u32 = 0;
    let mut prior_received: u64 = 0;

    loop {
        attempt += 1;
        if attempt > 1 {
            thread::sleep(backoff(attempt));
        }

        // §4.11 step 3: a WARC mirror always gets the full transaction, which
        // outranks `start_pos`/on-disk-resume/carry-over restval sources.
        let restval = if mirror.is_some() {
            0
        } else if attempt == 1 {
            ctx.options.start_pos.unwrap_or(resume_from)
        } else {
            prior_received
        };

        // §4.11 step 2: no-cache is sent when past the first attempt
        // through a proxy (some proxies cache incomplete data), or when
        // caching is disallowed outright.
        let no_cache = (ctx.options.proxy.is_some() && attempt > 1) || !ctx.options.allow_cache;

        let effective_method = if head_only { Method::Head } else { method };

        let mut state = TransactionState::default();
        let result = gethttp(
            ctx,
            url,
            effective_method,
            false,
            request_body,
            restval,
            referer,
            ims.as_deref(),
            no_cache,
            sink,
            mirror.as_deref_mut(),
            &mut state,
        );

        match result {
            Ok(TransactionOutcome::RetrUnneeded) => return Ok(FetchOutcome::Unneeded),
            Ok(TransactionOutcome::NewLocation { location, keep_post }) => {
                return Ok(FetchOutcome::Redirect { location, keep_post });
            },
            Ok(TransactionOutcome::RetrFinished(status)) => {
                // §4.11 step 6: a failed HEAD probe (500/501) does not
                // abort the fetch — fall through to the real method.
                if head_only && matches!(status.code(), 500 | 501) {
                    head_only = false;
                    log::warn!("HEAD probe for {url} got {status}, retrying as GET");
                    continue;
                }

                if head_only && ctx.options.spider {
                    return Ok(FetchOutcome::SpiderChecked { status, exists: status.code() < 400 });
                }

                // A successful (non-spider) probe just establishes that
                // the resource is reachable; the real transfer follows.
                if head_only {
                    head_only = false;
                    continue;
                }

                prior_received = state.received_len;

                // §4.11 step 6: success is purely a byte-count comparison,
                // independent of status code — a 5xx page that delivered
                // its full declared length is "finished", not retried; a
                // 200 that closed early (chunked/Content-Length mismatch)
                // is a connection-lost retry candidate just the same.
                let succeeded = match state.contlen {
                    Some(n) => state.received_len >= n,
                    None => true,
                };

                if succeeded {
                    let server_mtime = (ctx.options.timestamping && succeeded)
                        .then(|| state.remote_time.as_deref().map(date::http_atotm))
                        .flatten()
                        .filter(|&t| t >= 0);
                    return Ok(FetchOutcome::Done(status, state, server_mtime));
                }

                if attempt >= ctx.options.ntry && ctx.options.ntry != 0 {
                    return Err(NetError::TryLimitExceeded);
                }
                log::warn!("short transfer for {url}, retrying (attempt {attempt})");
                continue;
            },
            Err(err) if err.is_retry_eligible() => {
                if attempt >= ctx.options.ntry && ctx.options.ntry != 0 {
                    log::error!("giving up on {url} after {attempt} attempts: {err}");
                    return Err(NetError::TryLimitExceeded);
                }
                log::warn!("retrying {url} after {err} (attempt {attempt})");
                continue;
            },
            Err(err) => {
                log::error!("fetch of {url} failed: {err}");
                return Err(err);
            },
        }
    }
}

/// Linear backoff capped at ten seconds; real-time spent waiting between
/// attempts, not counted against the caller's deadline.
fn backoff(attempt: u32) -> Duration {
    Duration::from_millis(u64::from(attempt.saturating_mul(250)).min(10_000))
}
