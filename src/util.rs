//! Small byte-level helpers shared by the header and parameter parsers.

/// Trims ASCII whitespace bytes from both ends of `bytes`.
#[must_use]
pub fn trim_whitespace_bytes(bytes: &[u8]) -> &[u8] {
    let is_ws = u8::is_ascii_whitespace;

    let start = bytes.iter().position(|b| !is_ws(b)).unwrap_or(bytes.len());
    let end = bytes.iter().rposition(|b| !is_ws(b)).map_or(start, |i| i + 1);

    &bytes[start..end]
}

#[cfg(test)]
mod tests {
    use super::trim_whitespace_bytes;

    #[test]
    fn trims_both_ends() {
        assert_eq!(trim_whitespace_bytes(b"  \t hi \r\n"), b"hi");
    }

    #[test]
    fn all_whitespace_is_empty() {
        assert_eq!(trim_whitespace_bytes(b"   \t\r\n"), b"");
    }
}
