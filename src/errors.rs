use std::error::Error as StdError;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::io::{Error as IoError, ErrorKind as IoErrorKind};

/// Kinds of parse failure produced by the header store, tokenizer, and the
/// semantic extractors built on top of it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ParseErrorKind {
    Uri,
    Method,
    Version,
    Status,
    NonUtf8Header,
    ReqLine,
    Header,
    ReqBody,
    ResBody,
    Request,
    Response,
    ContentDisposition,
    ContentRange,
    Hsts,
    Digest,
    Date,
}

impl Display for ParseErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Uri => f.write_str("URI parsing failed"),
            Self::Method => f.write_str("HTTP method parsing failed"),
            Self::Version => f.write_str("HTTP version parsing failed"),
            Self::Status => f.write_str("HTTP status parsing failed"),
            Self::ReqLine => f.write_str("request line parsing failed"),
            Self::Header => f.write_str("header parsing failed"),
            Self::ReqBody => f.write_str("request body parsing failed"),
            Self::ResBody => f.write_str("response body parsing failed"),
            Self::Request => f.write_str("request parsing failed"),
            Self::Response => f.write_str("response parsing failed"),
            Self::NonUtf8Header => f.write_str("header name is not UTF-8 encoded"),
            Self::ContentDisposition => f.write_str("Content-Disposition parsing failed"),
            Self::ContentRange => f.write_str("Content-Range parsing failed"),
            Self::Hsts => f.write_str("Strict-Transport-Security parsing failed"),
            Self::Digest => f.write_str("Digest challenge parsing failed"),
            Self::Date => f.write_str("HTTP-date parsing failed"),
        }
    }
}

impl From<ParseErrorKind> for IoError {
    fn from(kind: ParseErrorKind) -> Self {
        IoError::new(IoErrorKind::InvalidData, kind.to_string())
    }
}

impl From<ParseErrorKind> for NetError {
    fn from(kind: ParseErrorKind) -> Self {
        NetError::ParseError(kind)
    }
}

/// The closed set of abstract outcomes a transaction or the retry loop can
/// surface to a caller, per the external-interfaces error code list.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub enum ErrorCode {
    RetrUnneeded,
    RetrFinished,
    NewLocation,
    NewLocationKeepPost,
    HostErr,
    ConnErr,
    ConnImpossible,
    ConnSslErr,
    WriteFailed,
    ReadErr,
    HeadErr,
    HeadEof,
    RangeErr,
    AuthFailed,
    AttrMissing,
    GatewayTimeout,
    FopenErr,
    FopenExclErr,
    FwriteErr,
    UnlinkErr,
    WarcErr,
    WarcTmpFopenErr,
    WarcTmpFwriteErr,
    FileBadFile,
    WrongCode,
    TryLimitExceeded,
    TimeConvErr,
}

impl Display for ErrorCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        Debug::fmt(self, f)
    }
}

use std::fmt::Debug;

/// Errors surfaced by the transaction engine, the retry loop, the
/// persistent-connection cache, and the HSTS store.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NetError {
    UnexpectedEof,
    HttpsNotImplemented,
    ParseError(ParseErrorKind),
    ReadError(IoErrorKind),
    WriteError(IoErrorKind),
    IoError(IoErrorKind),

    /// A transaction-level outcome from the closed set in §6.
    Transaction(ErrorCode),
    /// The response head exceeded the 64 KiB ceiling.
    HeadTooLarge,
    /// Chunked transfer-encoding was malformed.
    BadChunkedEncoding,
    /// An auth challenge referenced an unsupported qop or algorithm.
    UnsupportedDigestParam(String),
    /// A required Digest parameter (realm, nonce, ...) was absent.
    MissingDigestParam(&'static str),
    /// No credentials, or no scheme this engine understands, were offered.
    NoUsableAuthScheme,
    /// The HSTS store file failed its permission or regular-file check.
    HstsStoreDisabled(String),
    /// The outer retry loop exhausted its attempt budget.
    TryLimitExceeded,
}

impl StdError for NetError {}

impl Display for NetError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::UnexpectedEof => f.write_str("Read an unexpected EOF"),
            Self::HttpsNotImplemented => f.write_str("HTTPS is not implemented"),
            Self::ParseError(kind) => write!(f, "{kind}"),
            Self::ReadError(kind) => write!(f, "IO read error: {}", IoError::from(*kind)),
            Self::WriteError(kind) => write!(f, "IO write error: {}", IoError::from(*kind)),
            Self::IoError(kind) => write!(f, "IO error: {}", IoError::from(*kind)),
            Self::Transaction(code) => write!(f, "transaction failed: {code:?}"),
            Self::HeadTooLarge => f.write_str("response head exceeded the 64 KiB ceiling"),
            Self::BadChunkedEncoding => f.write_str("malformed chunked transfer-encoding"),
            Self::UnsupportedDigestParam(p) => write!(f, "unsupported Digest parameter: {p}"),
            Self::MissingDigestParam(p) => write!(f, "missing required Digest parameter: {p}"),
            Self::NoUsableAuthScheme => f.write_str("no usable authentication scheme offered"),
            Self::HstsStoreDisabled(reason) => write!(f, "HSTS store disabled: {reason}"),
            Self::TryLimitExceeded => f.write_str("retry attempt limit exceeded"),
        }
    }
}

impl From<IoError> for NetError {
    fn from(err: IoError) -> Self {
        let kind = err.kind();
        match kind {
            IoErrorKind::UnexpectedEof => Self::UnexpectedEof,
            IoErrorKind::WouldBlock => Self::ReadError(kind),
            IoErrorKind::WriteZero => Self::WriteError(kind),
            _ => Self::IoError(kind),
        }
    }
}

impl From<NetError> for IoError {
    fn from(err: NetError) -> Self {
        match err {
            NetError::UnexpectedEof => IoError::from(IoErrorKind::UnexpectedEof),
            NetError::HttpsNotImplemented => {
                IoError::new(IoErrorKind::Unsupported, err.to_string())
            },
            NetError::ParseError(kind) => kind.into(),
            NetError::ReadError(kind) | NetError::WriteError(kind) | NetError::IoError(kind) => {
                IoError::from(kind)
            },
            other => IoError::new(IoErrorKind::Other, other.to_string()),
        }
    }
}

impl NetError {
    /// Maps this error onto the closed `ErrorCode` set, for the outer loop's
    /// exhaustive retry-eligibility dispatch.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Transaction(code) => *code,
            Self::UnexpectedEof | Self::HeadTooLarge => ErrorCode::HeadEof,
            Self::BadChunkedEncoding => ErrorCode::ReadErr,
            Self::ReadError(_) => ErrorCode::ReadErr,
            Self::WriteError(_) => ErrorCode::WriteFailed,
            Self::UnsupportedDigestParam(_) | Self::MissingDigestParam(_) => {
                ErrorCode::AttrMissing
            },
            Self::NoUsableAuthScheme => ErrorCode::AuthFailed,
            Self::TryLimitExceeded => ErrorCode::TryLimitExceeded,
            Self::HstsStoreDisabled(_) => ErrorCode::WrongCode,
            Self::HttpsNotImplemented | Self::ParseError(_) | Self::IoError(_) => {
                ErrorCode::WrongCode
            },
        }
    }

    /// Whether the outer `http_loop` should retry the attempt that produced
    /// this error, per §4.11 step 5's retry-eligible set.
    #[must_use]
    pub fn is_retry_eligible(&self) -> bool {
        matches!(
            self.code(),
            ErrorCode::HeadErr
                | ErrorCode::HeadEof
                | ErrorCode::ConnErr
                | ErrorCode::ReadErr
                | ErrorCode::WriteFailed
                | ErrorCode::RangeErr
                | ErrorCode::FopenExclErr
                | ErrorCode::GatewayTimeout
        )
    }
}

pub type NetResult<T> = Result<T, NetError>;
