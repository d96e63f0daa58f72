//! The response body reader (§4.10 `read_response_body`): exact-length,
//! chunked, and to-EOF framing; inline gzip decode; the restval skip
//! prefix; and the short-body drain heuristic (§4.10, §9.1).

use std::io::{BufRead, Read, Write};

use flate2::read::GzDecoder;

use crate::{NetError, NetResult};

/// How long the response body is framed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Framing {
    /// `Content-Length` was present and parsed.
    Exact(u64),
    /// `Transfer-Encoding: chunked`.
    Chunked,
    /// Neither: read until EOF (only safe when the connection will close).
    ToEof,
}

/// A short-body drain never reuses a connection past this many bytes of
/// declared length; above it the connection is invalidated instead of
/// drained, per §4.10 and the resolved Open Question in §9.1.
pub const SKIP_SHORT_BODY_MAX: u64 = 4096;

/// Outcome of streaming a response body to its sink.
#[derive(Debug, Default, Clone, Copy)]
pub struct BodyOutcome {
    /// Bytes actually written to the sink (post gzip-decode, post restval
    /// skip).
    pub written: u64,
}

/// Reads one HTTP response body from `reader` per `framing`, skipping
/// `restval` leading bytes of the *wire* stream when the server did not
/// honor a `Range` request (no `Content-Range` was present), optionally
/// gzip-decoding inline, and writing the result to `sink` (and `mirror`,
/// if given, which sees the raw un-decoded bytes as the WARC record
/// requires).
#[allow(clippy::too_many_arguments)]
pub fn read_response_body<R: BufRead, W: Write + ?Sized>(
    reader: &mut R,
    framing: Framing,
    restval: u64,
    gzip: bool,
    sink: &mut W,
    mut mirror: Option<&mut dyn Write>,
) -> NetResult<BodyOutcome> {
    let raw = match framing {
        Framing::Exact(n) => read_exact_n(reader, n, mirror.as_deref_mut())?,
        Framing::Chunked => read_chunked(reader, mirror.as_deref_mut())?,
        Framing::ToEof => read_to_eof(reader, mirror.as_deref_mut())?,
    };

    let after_skip = if restval > 0 && (restval as usize) < raw.len() {
        &raw[restval as usize..]
    } else if restval > 0 {
        &raw[raw.len()..]
    } else {
        &raw[..]
    };

    let written = if gzip {
        let mut decoder = GzDecoder::new(after_skip);
        let mut out = Vec::new();
        decoder.read_to_end(&mut out).map_err(NetError::from)?;
        sink.write_all(&out).map_err(NetError::from)?;
        out.len() as u64
    } else {
        sink.write_all(after_skip).map_err(NetError::from)?;
        after_skip.len() as u64
    };

    Ok(BodyOutcome { written })
}

fn read_exact_n<R: BufRead>(
    reader: &mut R,
    n: u64,
    mut mirror: Option<&mut dyn Write>,
) -> NetResult<Vec<u8>> {
    let mut buf = vec![0u8; n as usize];
    reader.read_exact(&mut buf).map_err(NetError::from)?;
    if let Some(m) = mirror.as_deref_mut() {
        m.write_all(&buf).ok();
    }
    Ok(buf)
}

fn read_to_eof<R: BufRead>(
    reader: &mut R,
    mut mirror: Option<&mut dyn Write>,
) -> NetResult<Vec<u8>> {
    let mut buf = Vec::new();
    reader.read_to_end(&mut buf).map_err(NetError::from)?;
    if let Some(m) = mirror.as_deref_mut() {
        m.write_all(&buf).ok();
    }
    Ok(buf)
}

/// Strictly follows RFC 7230 §4.1: hex size, CRLF, chunk bytes, CRLF,
/// repeated until a zero-size chunk, then optional trailers terminated by
/// a blank line.
fn read_chunked<R: BufRead>(
    reader: &mut R,
    mut mirror: Option<&mut dyn Write>,
) -> NetResult<Vec<u8>> {
    let mut out = Vec::new();

    loop {
        let mut size_line = String::new();
        read_line(reader, &mut size_line)?;
        if let Some(m) = mirror.as_deref_mut() {
            m.write_all(size_line.as_bytes()).ok();
        }

        let size_str = size_line.trim_end_matches(['\r', '\n']);
        let size_str = size_str.split(';').next().unwrap_or("").trim();
        let size = u64::from_str_radix(size_str, 16).map_err(|_| NetError::BadChunkedEncoding)?;

        if size == 0 {
            // Drain optional trailers up to the blank line.
            loop {
                let mut trailer = String::new();
                read_line(reader, &mut trailer)?;
                if let Some(m) = mirror.as_deref_mut() {
                    m.write_all(trailer.as_bytes()).ok();
                }
                if trailer.trim_end_matches(['\r', '\n']).is_empty() {
                    break;
                }
            }
            break;
        }

        let mut chunk = vec![0u8; size as usize];
        reader.read_exact(&mut chunk).map_err(NetError::from)?;
        if let Some(m) = mirror.as_deref_mut() {
            m.write_all(&chunk).ok();
        }
        out.extend_from_slice(&chunk);

        let mut crlf = [0u8; 2];
        reader.read_exact(&mut crlf).map_err(NetError::from)?;
        if crlf != *b"\r\n" {
            return Err(NetError::BadChunkedEncoding);
        }
        if let Some(m) = mirror.as_deref_mut() {
            m.write_all(&crlf).ok();
        }
    }

    Ok(out)
}

fn read_line<R: BufRead>(reader: &mut R, buf: &mut String) -> NetResult<()> {
    let mut raw = Vec::new();
    loop {
        let mut byte = [0u8; 1];
        let n = reader.read(&mut byte).map_err(NetError::from)?;
        if n == 0 {
            if raw.is_empty() {
                return Err(NetError::UnexpectedEof);
            }
            break;
        }
        raw.push(byte[0]);
        if byte[0] == b'\n' {
            break;
        }
    }
    *buf = String::from_utf8_lossy(&raw).into_owned();
    Ok(())
}

/// Whether a URL's path suggests the body is already gzip-compressed
/// content the user asked for verbatim (`.gz`/`.tgz`), which inline
/// decoding must not touch even when `Content-Encoding: gzip` is present.
#[must_use]
pub fn path_is_precompressed(path: &str) -> bool {
    let lower = path.to_ascii_lowercase();
    lower.ends_with(".gz") || lower.ends_with(".tgz")
}

/// Whether the short-body drain (rather than connection invalidation)
/// applies for a declared length, per §4.10 and §9.1's resolved threshold.
#[must_use]
pub const fn should_skip_short_body(declared_len: u64) -> bool {
    declared_len <= SKIP_SHORT_BODY_MAX
}

/// A request body: either inline bytes or a file to stream, matching the
/// outbound half of §4.10 SEND.
pub enum RequestBody<'a> {
    Empty,
    Bytes(&'a [u8]),
}

impl RequestBody<'_> {
    #[must_use]
    pub const fn len(&self) -> usize {
        match self {
            Self::Empty => 0,
            Self::Bytes(b) => b.len(),
        }
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::Empty => b"",
            Self::Bytes(b) => b,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn reads_exact_content_length() {
        let mut reader = Cursor::new(b"hello world extra".to_vec());
        let mut sink = Vec::new();
        let outcome =
            read_response_body(&mut reader, Framing::Exact(11), 0, false, &mut sink, None)
                .unwrap();
        assert_eq!(sink, b"hello world");
        assert_eq!(outcome.written, 11);
    }

    #[test]
    fn decodes_chunked_body() {
        let raw = b"5\r\nhello\r\n6\r\n world\r\n0\r\n\r\n";
        let mut reader = Cursor::new(raw.to_vec());
        let mut sink = Vec::new();
        read_response_body(&mut reader, Framing::Chunked, 0, false, &mut sink, None).unwrap();
        assert_eq!(sink, b"hello world");
    }

    #[test]
    fn chunked_plus_gzip_decodes_to_plaintext() {
        use flate2::write::GzEncoder;
        use flate2::Compression;

        let mut enc = GzEncoder::new(Vec::new(), Compression::default());
        enc.write_all(b"Hello, world!").unwrap();
        let compressed = enc.finish().unwrap();

        let chunk_size = format!("{:x}\r\n", compressed.len());
        let mut raw = Vec::new();
        raw.extend_from_slice(chunk_size.as_bytes());
        raw.extend_from_slice(&compressed);
        raw.extend_from_slice(b"\r\n0\r\n\r\n");

        let mut reader = Cursor::new(raw);
        let mut sink = Vec::new();
        read_response_body(&mut reader, Framing::Chunked, 0, true, &mut sink, None).unwrap();
        assert_eq!(sink, b"Hello, world!");
    }

    #[test]
    fn restval_skips_leading_bytes_when_range_not_honored() {
        let mut reader = Cursor::new(b"0123456789".to_vec());
        let mut sink = Vec::new();
        read_response_body(&mut reader, Framing::Exact(10), 5, false, &mut sink, None).unwrap();
        assert_eq!(sink, b"56789");
    }

    #[test]
    fn malformed_chunk_size_errors() {
        let mut reader = Cursor::new(b"zz\r\nhi\r\n0\r\n\r\n".to_vec());
        let mut sink = Vec::new();
        let err = read_response_body(&mut reader, Framing::Chunked, 0, false, &mut sink, None)
            .unwrap_err();
        assert!(matches!(err, NetError::BadChunkedEncoding));
    }

    #[test]
    fn short_body_threshold() {
        assert!(should_skip_short_body(4096));
        assert!(!should_skip_short_body(4097));
    }
}
