use std::ops::Range;

use crate::{NetError, NetResult, ParseErrorKind};

/// Maximum size of a response head (status line + headers + terminating
/// blank line) the engine will buffer before giving up on a server.
pub const MAX_HEAD_SIZE: usize = 64 * 1024;

/// An owned response head, split into logical line spans.
///
/// `lines[0]` is the status line; `lines[1..]` are header lines with folded
/// continuations already joined. An HTTP/0.9 response (the buffer does not
/// start with `"HTTP"`) has an empty `lines` vector and the whole buffer is
/// treated as a bodyless 200 response.
#[derive(Clone, Debug, Default)]
pub struct HeadBlock {
    buf: Vec<u8>,
    lines: Vec<Range<usize>>,
}

/// One case-insensitive match of a header line: `(name_span, value_span)`.
pub type HeaderSpan = (Range<usize>, Range<usize>);

impl HeadBlock {
    /// Parses a raw head buffer (terminated by an empty line, CRLF or bare
    /// LF) into a `HeadBlock`. Folds continuation lines (leading space or
    /// tab) into the preceding logical line by overwriting the CR/LF bytes
    /// in place with spaces.
    pub fn parse(mut buf: Vec<u8>) -> NetResult<Self> {
        if buf.len() > MAX_HEAD_SIZE {
            return Err(NetError::HeadTooLarge);
        }

        if !buf.starts_with(b"HTTP") {
            return Ok(Self { buf, lines: Vec::new() });
        }

        // First pass: fold continuation lines by blanking their preceding
        // line terminator, so the scan below sees one logical line. Every
        // terminator ends in `\n` (bare LF or CRLF); look at the byte past
        // it to decide whether it introduces a folded continuation, and if
        // so blank the whole terminator (both CR and LF for CRLF) in place.
        let mut i = 0;
        while i < buf.len() {
            if buf[i] == b'\n' && i + 1 < buf.len() {
                let next = buf[i + 1];
                if next == b' ' || next == b'\t' {
                    let term_start = if i > 0 && buf[i - 1] == b'\r' { i - 1 } else { i };
                    for byte in &mut buf[term_start..=i] {
                        *byte = b' ';
                    }
                }
            }
            i += 1;
        }

        let mut lines = Vec::new();
        let mut start = 0;
        let mut idx = 0;

        while idx < buf.len() {
            if buf[idx] == b'\n' {
                let mut end = idx;
                if end > start && buf[end - 1] == b'\r' {
                    end -= 1;
                }
                let is_blank = end <= start;
                lines.push(start..end);
                start = idx + 1;

                // The blank line terminating the head; anything after it is
                // body and is not indexed.
                if is_blank {
                    break;
                }
            }
            idx += 1;
        }

        Ok(Self { buf, lines })
    }

    #[must_use]
    pub fn is_http09(&self) -> bool {
        self.lines.is_empty()
    }

    fn line(&self, i: usize) -> Option<&[u8]> {
        self.lines.get(i).map(|r| &self.buf[r.clone()])
    }

    /// Parses the status line, returning `(code, reason)`. HTTP/0.9
    /// responses synthesize a 200 with a fixed message.
    pub fn status(&self) -> NetResult<(u16, String)> {
        if self.is_http09() {
            return Ok((200, String::from("OK (HTTP/0.9)")));
        }

        let line = self.line(0).ok_or(ParseErrorKind::Status)?;
        let text = std::str::from_utf8(line).map_err(|_| ParseErrorKind::Status)?;

        if !text.starts_with("HTTP") {
            return Err(ParseErrorKind::Status)?;
        }

        // Skip "HTTP" and an optional "/MAJOR.MINOR".
        let rest = text[4..].trim_start();
        let rest = rest.strip_prefix('/').map_or(rest, |r| {
            r.find(char::is_whitespace).map_or(r, |sp| &r[sp..])
        });
        let rest = rest.trim_start();

        let mut parts = rest.splitn(2, char::is_whitespace);
        let code_str = parts.next().unwrap_or("").trim();
        let reason = parts.next().unwrap_or("").trim().to_string();

        if code_str.len() != 3 || !code_str.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ParseErrorKind::Status)?;
        }

        let code: u16 = code_str.parse().map_err(|_| ParseErrorKind::Status)?;
        Ok((code, reason))
    }

    /// Case-insensitively locates a header occurrence starting the search
    /// at line index `start` (1-based into `lines`, i.e. pass `1` for the
    /// first header). Returns the matching line index and the `(name,
    /// value)` byte spans with the value already trimmed of surrounding
    /// whitespace.
    fn locate_from(&self, name: &str, start: usize) -> Option<(usize, HeaderSpan)> {
        let needle = name.as_bytes();

        for i in start..self.lines.len() {
            let Some(line) = self.line(i) else { continue };
            if line.is_empty() {
                continue;
            }

            let Some(colon) = line.iter().position(|&b| b == b':') else {
                continue;
            };

            let (raw_name, raw_val) = line.split_at(colon);
            if !raw_name.eq_ignore_ascii_case(needle) {
                continue;
            }

            let range = self.lines[i].clone();
            let name_span = range.start..range.start + colon;

            let val_bytes = &raw_val[1..];
            let lead = val_bytes.iter().take_while(|b| b.is_ascii_whitespace()).count();
            let trail = val_bytes
                .iter()
                .rev()
                .take_while(|b| b.is_ascii_whitespace())
                .count();
            let val_start = range.start + colon + 1 + lead;
            let val_end = range.start + colon + 1 + (val_bytes.len() - trail).max(lead);

            return Some((i, (name_span, val_start..val_end.max(val_start))));
        }

        None
    }

    /// Returns the byte span of the value of the first header named `name`
    /// found at or after logical line index `start` (pass `1` to begin at
    /// the first header line), or `None` if absent.
    #[must_use]
    pub fn locate(&self, name: &str, start: usize) -> Option<(usize, &[u8])> {
        self.locate_from(name, start)
            .map(|(i, (_, val))| (i, &self.buf[val]))
    }

    /// Returns an iterator over every occurrence of `name`, in arrival
    /// order, yielding the raw value bytes. Used for multi-valued headers
    /// like `Set-Cookie` and `WWW-Authenticate`.
    pub fn iter_values<'a>(&'a self, name: &'a str) -> HeaderOccurrences<'a> {
        HeaderOccurrences { block: self, name, next: 1 }
    }

    /// Returns the first value for `name` as a `String`, or `None`.
    #[must_use]
    pub fn duplicate(&self, name: &str) -> Option<String> {
        self.locate(name, 1)
            .map(|(_, v)| String::from_utf8_lossy(v).into_owned())
    }

    /// Copies the first value for `name` into `buf`, null-terminating and
    /// truncating to `bufsize - 1` bytes. Returns whether the header was
    /// present.
    pub fn copy_to(&self, name: &str, buf: &mut Vec<u8>, bufsize: usize) -> bool {
        let Some((_, value)) = self.locate(name, 1) else {
            return false;
        };

        if bufsize == 0 {
            buf.clear();
            return true;
        }

        let take = value.len().min(bufsize - 1);
        buf.clear();
        buf.extend_from_slice(&value[..take]);
        buf.push(0);
        true
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }
}

/// Iterator over multiple occurrences of the same header name, yielding
/// value spans in arrival order without leaking a mutable cursor to the
/// caller.
pub struct HeaderOccurrences<'a> {
    block: &'a HeadBlock,
    name: &'a str,
    next: usize,
}

impl<'a> Iterator for HeaderOccurrences<'a> {
    type Item = &'a [u8];

    fn next(&mut self) -> Option<Self::Item> {
        let (i, (_, val)) = self.block.locate_from(self.name, self.next)?;
        self.next = i + 1;
        Some(&self.block.buf[val])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(raw: &str) -> HeadBlock {
        HeadBlock::parse(raw.as_bytes().to_vec()).unwrap()
    }

    #[test]
    fn parses_status_line() {
        let b = block("HTTP/1.1 200 OK\r\nContent-Length: 5\r\n\r\n");
        assert_eq!(b.status().unwrap(), (200, "OK".to_string()));
    }

    #[test]
    fn http_09_synthesizes_200() {
        let b = block("hello world, no status line here");
        assert!(b.is_http09());
        assert_eq!(b.status().unwrap().0, 200);
    }

    #[test]
    fn locate_is_case_insensitive_and_trims() {
        let b = block("HTTP/1.1 200 OK\r\ncontent-TYPE:   text/plain  \r\n\r\n");
        let (_, v) = b.locate("Content-Type", 1).unwrap();
        assert_eq!(v, b"text/plain");
    }

    #[test]
    fn folds_continuation_lines() {
        // The CRLF terminator (2 bytes) is blanked to spaces in place,
        // joining with the continuation's own 2 leading spaces: 4
        // whitespace bytes total between the two words.
        let b = block("HTTP/1.1 200 OK\r\nX-Long: part-one\r\n  part-two\r\n\r\n");
        let (_, v) = b.locate("X-Long", 1).unwrap();
        assert_eq!(v, b"part-one    part-two");
    }

    #[test]
    fn folds_continuation_line_with_bare_lf() {
        let b = block("HTTP/1.1 200 OK\nX-Long: part-one\n\tpart-two\n\n");
        let (_, v) = b.locate("X-Long", 1).unwrap();
        assert_eq!(v, b"part-one \tpart-two");
    }

    #[test]
    fn multi_valued_headers_preserve_order() {
        let b = block(
            "HTTP/1.1 200 OK\r\nSet-Cookie: a=1\r\nSet-Cookie: b=2\r\n\r\n",
        );
        let vals: Vec<_> = b.iter_values("Set-Cookie").collect();
        assert_eq!(vals, vec![&b"a=1"[..], &b"b=2"[..]]);
    }

    #[test]
    fn absent_header_returns_none() {
        let b = block("HTTP/1.1 204 No Content\r\n\r\n");
        assert!(b.locate("Content-Length", 1).is_none());
    }
}
