//! Strict semantic extractors built on the parameter tokenizer: §4.3
//! (Content-Disposition), §4.4 (Strict-Transport-Security), and §4.5
//! (Content-Range).

use crate::header::{decode_extended_value, ParamTokenizer};
use crate::{NetResult, ParseErrorKind};

/// Extracts a filename from a `Content-Disposition` header value.
///
/// Keeps the most recent `filename` (unencoded) and the most recent
/// `filename*` (encoded, possibly segmented). An encoded value, if any was
/// seen, wins over the unencoded one. The result is stripped to its
/// basename; an empty basename is rejected.
#[must_use]
pub fn content_disposition_filename(value: &str) -> Option<String> {
    let mut plain: Option<String> = None;
    let mut encoded_segments: Vec<String> = Vec::new();
    let mut encoded_single: Option<String> = None;

    for param in ParamTokenizer::new(value, ';') {
        if param.name.eq_ignore_ascii_case("filename") {
            if param.is_url_encoded {
                if param.segment.is_some() {
                    if let Some(decoded) = decode_extended_value(param.value) {
                        encoded_segments.push(decoded);
                    }
                } else if let Some(decoded) = decode_extended_value(param.value) {
                    encoded_single = Some(decoded);
                }
            } else if param.segment.is_some() {
                encoded_segments.push(param.value.to_string());
            } else {
                plain = Some(unquote(param.value));
            }
        }
    }

    // Segmented values are concatenated in order of appearance (§4.3),
    // not sorted by their `*N` index.
    let selected = if !encoded_segments.is_empty() {
        Some(encoded_segments.concat())
    } else if let Some(single) = encoded_single {
        Some(single)
    } else {
        plain
    }?;

    basename(&selected)
}

fn unquote(s: &str) -> String {
    s.to_string()
}

fn basename(path: &str) -> Option<String> {
    let last = path.rfind(['/', '\\']).map_or(0, |i| i + 1);
    let name = &path[last..];
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

/// A parsed `Strict-Transport-Security` header value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HstsDirective {
    pub max_age: i64,
    pub include_subdomains: bool,
}

/// Parses a `Strict-Transport-Security` header value. `max-age` is
/// required; its absence is a parse failure.
pub fn parse_hsts_header(value: &str) -> NetResult<HstsDirective> {
    let mut max_age: Option<i64> = None;
    let mut include_subdomains = false;

    for param in ParamTokenizer::new(value, ';') {
        if param.name.eq_ignore_ascii_case("max-age") {
            max_age = param.value.trim().parse::<i64>().ok();
        } else if param.name.eq_ignore_ascii_case("includeSubDomains") {
            include_subdomains = true;
        }
    }

    let max_age = max_age.ok_or(ParseErrorKind::Hsts)?;
    Ok(HstsDirective { max_age, include_subdomains })
}

/// A parsed `Content-Range` response header value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ContentRangeValue {
    pub first: u64,
    pub last: u64,
    /// `None` when the server reported `*` (total unknown).
    pub total: Option<u64>,
}

/// Parses `bytes[:] FIRST-LAST/TOTAL`, where the leading `bytes` token and
/// the non-standard `:` are optional and `TOTAL` may be `*`.
pub fn parse_content_range(value: &str) -> NetResult<ContentRangeValue> {
    let mut s = value.trim();

    if let Some(rest) = s.strip_prefix("bytes") {
        s = rest.trim_start();
        s = s.strip_prefix(':').unwrap_or(s).trim_start();
    }

    let (range_part, total_part) = s.split_once('/').ok_or(ParseErrorKind::ContentRange)?;
    let (first_str, last_str) =
        range_part.trim().split_once('-').ok_or(ParseErrorKind::ContentRange)?;

    let first: u64 = first_str.trim().parse().map_err(|_| ParseErrorKind::ContentRange)?;
    let last: u64 = last_str.trim().parse().map_err(|_| ParseErrorKind::ContentRange)?;

    if last < first {
        return Err(ParseErrorKind::ContentRange)?;
    }

    let total_part = total_part.trim();
    let total = if total_part == "*" {
        None
    } else {
        let t: u64 = total_part.parse().map_err(|_| ParseErrorKind::ContentRange)?;
        if t <= last {
            return Err(ParseErrorKind::ContentRange)?;
        }
        Some(t)
    };

    Ok(ContentRangeValue { first, last, total })
}

/// Whether a `Content-Encoding` value names gzip compression (the only
/// inline-decoded coding; `deflate`/`br`/`compress` are recognized but left
/// to the caller per §6).
#[must_use]
pub fn is_gzip_encoding(value: &str) -> bool {
    value.trim().eq_ignore_ascii_case("gzip") || value.trim().eq_ignore_ascii_case("x-gzip")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_disposition_prefers_encoded() {
        let v = r#"attachment; filename="fallback.txt"; filename*=UTF-8''na%C3%AFve.txt"#;
        assert_eq!(content_disposition_filename(v).unwrap(), "na\u{ef}ve.txt");
    }

    #[test]
    fn content_disposition_plain_basename() {
        let v = r#"attachment; filename="dir/sub\\file.txt""#;
        assert_eq!(content_disposition_filename(v).unwrap(), "file.txt");
    }

    #[test]
    fn content_disposition_segmented() {
        let v = "attachment; filename*0=\"foo\"; filename*1=\"bar.txt\"";
        assert_eq!(content_disposition_filename(v).unwrap(), "foobar.txt");
    }

    #[test]
    fn content_disposition_segmented_out_of_order_concatenates_by_appearance() {
        // §4.3: segments concatenate in order of appearance, not sorted by
        // their `*N` index.
        let v = r#"attachment; filename*1="bar"; filename*0="foo""#;
        assert_eq!(content_disposition_filename(v).unwrap(), "barfoo");
    }

    #[test]
    fn content_disposition_empty_basename_rejected() {
        let v = r#"attachment; filename="dir/""#;
        assert!(content_disposition_filename(v).is_none());
    }

    #[test]
    fn hsts_requires_max_age() {
        assert!(parse_hsts_header("includeSubDomains").is_err());
        let d = parse_hsts_header("max-age=31536000; includeSubDomains").unwrap();
        assert_eq!(d.max_age, 31_536_000);
        assert!(d.include_subdomains);
    }

    #[test]
    fn content_range_basic() {
        let r = parse_content_range("bytes 100-199/200").unwrap();
        assert_eq!((r.first, r.last, r.total), (100, 199, Some(200)));
    }

    #[test]
    fn content_range_unknown_total() {
        let r = parse_content_range("0-99/*").unwrap();
        assert_eq!(r.total, None);
    }

    #[test]
    fn content_range_rejects_inconsistent_total() {
        assert!(parse_content_range("bytes 100-199/150").is_err());
        assert!(parse_content_range("bytes 199-100/200").is_err());
    }
}
