//! The authentication engine (§4.9): scheme selection (NTLM > Digest >
//! Basic), credential encoding, and the challenge/response it drives.

use std::collections::HashSet;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

use crate::header::{HeadBlock, ParamTokenizer};
use crate::{Method, NetError, NetResult};

#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub enum Scheme {
    Basic,
    Digest,
    Ntlm,
}

/// One `WWW-Authenticate` challenge, lexed into its scheme and parameters.
#[derive(Clone, Debug)]
pub struct Challenge {
    pub scheme: Scheme,
    pub params: Vec<(String, String)>,
}

impl Challenge {
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// An NTLM challenge carries no `name=value` parameters: the lone token
    /// after the scheme name is either absent (first, credential-less 401)
    /// or the base64 Type 2 blob (second 401, after a Type 1 was sent). The
    /// tokenizer lexes a bare token as a name with an empty value, so the
    /// blob surfaces as the first parameter's name.
    #[must_use]
    pub fn ntlm_blob(&self) -> Option<&str> {
        self.params.first().map(|(k, _)| k.as_str()).filter(|s| !s.is_empty())
    }
}

/// NTLM authenticates the connection itself and proceeds in two rounds
/// (§4.9): `Initial` (nothing sent yet), `Negotiated` (a Type 1 message
/// was sent with the prior 401 retry, awaiting the server's Type 2
/// challenge), and `Authorized` (the Type 3 response was accepted; the
/// pool's NTLM-authorized flag then lets later requests on this
/// connection omit `Authorization` entirely).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum NtlmState {
    #[default]
    Initial,
    Negotiated,
    Authorized,
}

/// NTLM's own message encoding (Type 1/2/3) is treated as an external
/// format concern (§4.9): the transaction engine drives the two-round
/// state machine and the pool-authorization handoff, but defers the
/// actual wire bytes to a caller-supplied codec so this crate need not
/// hand-roll the NTLM message format.
pub trait NtlmCodec {
    /// Builds the base64 Type 1 (negotiate) message sent with the first
    /// retried request, before any challenge has been seen.
    fn negotiate_message(&mut self) -> String;

    /// Builds the base64 Type 3 (authenticate) message from the server's
    /// base64 Type 2 challenge blob and the credentials.
    fn authenticate_message(
        &mut self,
        challenge_b64: &str,
        user: &str,
        password: &str,
    ) -> NetResult<String>;
}

/// Lexes every `WWW-Authenticate` header in `head`, keeping the first
/// occurrence of each recognized scheme, in arrival order.
#[must_use]
pub fn parse_challenges(head: &HeadBlock) -> Vec<Challenge> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();

    for raw in head.iter_values("WWW-Authenticate") {
        let text = String::from_utf8_lossy(raw);
        let text = text.trim();

        let (scheme_tok, rest) = text
            .split_once(char::is_whitespace)
            .unwrap_or((text, ""));

        let scheme = match scheme_tok.to_ascii_lowercase().as_str() {
            "basic" => Scheme::Basic,
            "digest" => Scheme::Digest,
            "ntlm" => Scheme::Ntlm,
            _ => continue,
        };

        if !seen.insert(scheme) {
            continue;
        }

        let params = ParamTokenizer::new(rest, ',')
            .map(|p| (p.name.to_string(), p.value.to_string()))
            .collect();

        out.push(Challenge { scheme, params });
    }

    out
}

/// Selects the strongest offered scheme: NTLM > Digest > Basic.
#[must_use]
pub fn select_strongest(challenges: &[Challenge]) -> Option<&Challenge> {
    challenges
        .iter()
        .find(|c| c.scheme == Scheme::Ntlm)
        .or_else(|| challenges.iter().find(|c| c.scheme == Scheme::Digest))
        .or_else(|| challenges.iter().find(|c| c.scheme == Scheme::Basic))
}

/// `Authorization: Basic base64(user ":" password)`.
#[must_use]
pub fn basic_authorization_line(user: &str, password: &str) -> String {
    let creds = format!("{user}:{password}");
    format!("Basic {}", BASE64.encode(creds.as_bytes()))
}

#[derive(Clone, Debug)]
pub struct DigestParams {
    pub realm: String,
    pub nonce: String,
    pub opaque: Option<String>,
    pub qop: Option<String>,
    pub algorithm: String,
}

fn md5_hex(data: &[u8]) -> String {
    format!("{:x}", md5::compute(data))
}

/// Extracts and validates the Digest challenge parameters (RFC 2069 / RFC
/// 2617 "auth" qop only; unsupported `qop` or `algorithm` is rejected).
pub fn digest_params(challenge: &Challenge) -> NetResult<DigestParams> {
    let realm = challenge
        .param("realm")
        .ok_or(NetError::MissingDigestParam("realm"))?
        .trim_matches('"')
        .to_string();
    let nonce = challenge
        .param("nonce")
        .ok_or(NetError::MissingDigestParam("nonce"))?
        .trim_matches('"')
        .to_string();
    let opaque = challenge.param("opaque").map(|s| s.trim_matches('"').to_string());
    let qop = challenge.param("qop").map(|s| s.trim_matches('"').to_string());
    let algorithm = challenge
        .param("algorithm")
        .map(|s| s.trim_matches('"').to_string())
        .unwrap_or_else(|| "MD5".to_string());

    if let Some(q) = &qop {
        if q.split(',').map(str::trim).all(|v| v != "auth") {
            return Err(NetError::UnsupportedDigestParam(format!("qop={q}")));
        }
    }

    if !algorithm.eq_ignore_ascii_case("MD5") && !algorithm.eq_ignore_ascii_case("MD5-sess") {
        return Err(NetError::UnsupportedDigestParam(format!("algorithm={algorithm}")));
    }

    Ok(DigestParams { realm, nonce, opaque, qop, algorithm })
}

/// Computes the RFC 2069 / RFC 2617 Digest `response` value and formats the
/// full `Authorization: Digest ...` header line.
#[must_use]
#[allow(clippy::too_many_arguments)]
pub fn digest_authorization_line(
    params: &DigestParams,
    user: &str,
    password: &str,
    method: Method,
    uri: &str,
    cnonce: &str,
    nonce_count: &str,
) -> String {
    let a1 = if params.algorithm.eq_ignore_ascii_case("MD5-sess") {
        let inner = md5_hex(format!("{user}:{}:{password}", params.realm).as_bytes());
        md5_hex(format!("{inner}:{}:{cnonce}", params.nonce).as_bytes())
    } else {
        md5_hex(format!("{user}:{}:{password}", params.realm).as_bytes())
    };

    let a2 = md5_hex(format!("{method}:{uri}").as_bytes());

    let response = if params.qop.is_some() {
        md5_hex(format!("{a1}:{}:{nonce_count}:{cnonce}:auth:{a2}", params.nonce).as_bytes())
    } else {
        md5_hex(format!("{a1}:{}:{a2}", params.nonce).as_bytes())
    };

    let mut line = format!(
        r#"Digest username="{user}", realm="{}", nonce="{}", uri="{uri}", response="{response}""#,
        params.realm, params.nonce
    );

    if let Some(opaque) = &params.opaque {
        line.push_str(&format!(r#", opaque="{opaque}""#));
    }
    if params.qop.is_some() {
        line.push_str(&format!(r#", qop=auth, nc={nonce_count}, cnonce="{cnonce}""#));
    }
    if !params.algorithm.eq_ignore_ascii_case("MD5") {
        line.push_str(&format!(", algorithm={}", params.algorithm));
    }

    line
}

/// Process-wide (held on `ClientContext`) set of hosts that have had Basic
/// credentials volunteered and accepted, preserving "send credentials
/// preemptively on next request" semantics. Grow-only until shutdown.
#[derive(Default)]
pub struct BasicAuthedHosts {
    hosts: HashSet<String>,
}

impl BasicAuthedHosts {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn accept(&mut self, host: &str) {
        self.hosts.insert(host.to_ascii_lowercase());
    }

    #[must_use]
    pub fn contains(&self, host: &str) -> bool {
        self.hosts.contains(&host.to_ascii_lowercase())
    }
}
