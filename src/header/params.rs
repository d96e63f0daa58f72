//! Tokenizes `name[=value]` parameter lists out of header values, honoring
//! quoted strings and RFC 2231 / RFC 6266 extended (`name*`) encoding.

use percent_encoding::percent_decode_str;

/// One parsed parameter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Parameter<'a> {
    /// The parameter name, with any `*`, `*N`, or `*N*` suffix stripped.
    pub name: &'a str,
    /// The raw (not percent-decoded) value span; empty if the parameter had
    /// no `=`.
    pub value: &'a str,
    /// Set when `name` carried a bare trailing `*` or a `*N*` segment
    /// suffix: `value` is `charset'lang'pct-encoded-bytes` and must be
    /// percent-decoded by the caller via [`decode_extended_value`].
    pub is_url_encoded: bool,
    /// The `N` in `name*N` / `name*N*`, for segmented (continuation)
    /// values; `None` for a plain `name` or `name*`.
    pub segment: Option<u32>,
}

/// A cursor over a header value that yields [`Parameter`]s separated by
/// `sep` (typically `;` or `,`).
pub struct ParamTokenizer<'a> {
    input: &'a str,
    pos: usize,
    sep: char,
}

impl<'a> ParamTokenizer<'a> {
    #[must_use]
    pub const fn new(input: &'a str, sep: char) -> Self {
        Self { input, pos: 0, sep }
    }

    fn skip_ws(&mut self) {
        while self.pos < self.input.len() {
            let c = self.input[self.pos..].chars().next().unwrap();
            if c.is_whitespace() {
                self.pos += c.len_utf8();
            } else {
                break;
            }
        }
    }

    fn skip_sep_and_ws(&mut self) {
        self.skip_ws();
        if self.input[self.pos..].starts_with(self.sep) {
            self.pos += self.sep.len_utf8();
        }
        self.skip_ws();
    }
}

impl<'a> Iterator for ParamTokenizer<'a> {
    type Item = Parameter<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        self.skip_sep_and_ws();

        if self.pos >= self.input.len() {
            return None;
        }

        let rest = &self.input[self.pos..];
        let name_end = rest
            .find(|c: char| c == '=' || c == self.sep || c.is_whitespace())
            .unwrap_or(rest.len());

        if name_end == 0 {
            // Stray separator with nothing before it; skip one byte and
            // keep going rather than looping forever.
            self.pos += 1;
            return self.next();
        }

        let raw_name = &rest[..name_end];
        self.pos += name_end;
        self.skip_ws();

        let has_eq = self.input[self.pos..].starts_with('=');
        if has_eq {
            self.pos += 1;
            self.skip_ws();
        }

        let value = if has_eq {
            let rest = &self.input[self.pos..];
            if rest.starts_with('"') {
                let mut end = None;
                let bytes = rest.as_bytes();
                let mut i = 1;
                while i < bytes.len() {
                    if bytes[i] == b'\\' && i + 1 < bytes.len() {
                        i += 2;
                        continue;
                    }
                    if bytes[i] == b'"' {
                        end = Some(i);
                        break;
                    }
                    i += 1;
                }
                let end = end.unwrap_or(bytes.len().saturating_sub(1).max(1));
                let v = &rest[1..end.min(rest.len())];
                let consumed = (end + 1).min(rest.len());
                self.pos += consumed;
                v
            } else {
                let end = rest
                    .find(self.sep)
                    .unwrap_or(rest.len());
                let v = rest[..end].trim_end();
                self.pos += end;
                v
            }
        } else {
            ""
        };

        self.skip_ws();
        if self.input[self.pos..].starts_with(self.sep) {
            self.pos += self.sep.len_utf8();
        }

        Some(parse_extended_name(raw_name, value))
    }
}

fn parse_extended_name<'a>(raw_name: &'a str, value: &'a str) -> Parameter<'a> {
    let Some(star) = raw_name.find('*') else {
        return Parameter { name: raw_name, value, is_url_encoded: false, segment: None };
    };

    let base = &raw_name[..star];
    let suffix = &raw_name[star + 1..];

    if suffix.is_empty() {
        // `name*`
        return Parameter { name: base, value, is_url_encoded: true, segment: None };
    }

    if let Some(stripped) = suffix.strip_suffix('*') {
        // `name*N*`
        if let Ok(n) = stripped.parse::<u32>() {
            return Parameter {
                name: base,
                value,
                is_url_encoded: true,
                segment: Some(n),
            };
        }
    }

    // `name*N`
    if let Ok(n) = suffix.parse::<u32>() {
        return Parameter { name: base, value, is_url_encoded: false, segment: Some(n) };
    }

    // Unrecognized `*` usage; treat the whole thing as a literal name.
    Parameter { name: raw_name, value, is_url_encoded: false, segment: None }
}

/// Decodes an RFC 2231 extended value of the form
/// `charset'language'percent-encoded-bytes`, rejecting charsets other than
/// `UTF-8` and `ISO-8859-1`.
pub fn decode_extended_value(raw: &str) -> Option<String> {
    let mut parts = raw.splitn(3, '\'');
    let charset = parts.next()?;
    let _lang = parts.next()?;
    let encoded = parts.next()?;

    if !charset.eq_ignore_ascii_case("utf-8") && !charset.eq_ignore_ascii_case("iso-8859-1") {
        return None;
    }

    let decoded = percent_decode_str(encoded);

    if charset.eq_ignore_ascii_case("iso-8859-1") {
        Some(decoded.map(|b| b as char).collect())
    } else {
        decoded.decode_utf8().ok().map(|cow| cow.into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_params() {
        let mut it = ParamTokenizer::new(" form-data; name=\"field1\"; filename=\"f.txt\"", ';');
        let p0 = it.next().unwrap();
        assert_eq!((p0.name, p0.value), ("form-data", ""));
        let p1 = it.next().unwrap();
        assert_eq!((p1.name, p1.value), ("name", "field1"));
        let p2 = it.next().unwrap();
        assert_eq!((p2.name, p2.value), ("filename", "f.txt"));
        assert!(it.next().is_none());
    }

    #[test]
    fn bare_token_value() {
        let mut it = ParamTokenizer::new("max-age=3600; includeSubDomains", ';');
        let p0 = it.next().unwrap();
        assert_eq!((p0.name, p0.value), ("max-age", "3600"));
        let p1 = it.next().unwrap();
        assert_eq!((p1.name, p1.value), ("includeSubDomains", ""));
    }

    #[test]
    fn extended_encoded_name() {
        let mut it = ParamTokenizer::new("filename*=UTF-8''%e2%82%ac%20rates.txt", ';');
        let p = it.next().unwrap();
        assert_eq!(p.name, "filename");
        assert!(p.is_url_encoded);
        assert_eq!(decode_extended_value(p.value).unwrap(), "\u{20ac} rates.txt");
    }

    #[test]
    fn segmented_name() {
        let mut it = ParamTokenizer::new("filename*0=\"foo\"; filename*1=\"bar\"", ';');
        let p0 = it.next().unwrap();
        assert_eq!((p0.name, p0.segment), ("filename", Some(0)));
        let p1 = it.next().unwrap();
        assert_eq!((p1.name, p1.segment), ("filename", Some(1)));
    }
}
