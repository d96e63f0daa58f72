use std::cmp::Ordering;
use std::fmt::{Display, Formatter, Result as FmtResult};

use crate::{NetResult, ParseErrorKind};

pub mod block;
pub mod names;
pub mod params;
pub mod values;

pub use block::{HeadBlock, HeaderOccurrences, MAX_HEAD_SIZE};
pub use names::{header_consts, HeaderKind, HeaderName};
pub use params::{decode_extended_value, ParamTokenizer, Parameter};
pub use values::HeaderValue;

/// An object that represents a header field, used by the request builder.
#[derive(Debug, Clone)]
pub struct Header {
    pub name: HeaderName,
    pub value: HeaderValue,
}

impl PartialEq<Self> for Header {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl PartialEq<HeaderName> for Header {
    fn eq(&self, other: &HeaderName) -> bool {
        self.name == *other
    }
}

impl Eq for Header {}

impl PartialOrd<Header> for Header {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.name.cmp(&other.name))
    }
}

impl Ord for Header {
    fn cmp(&self, other: &Self) -> Ordering {
        self.name.cmp(&other.name)
    }
}

impl Display for Header {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}: {}", &self.name, &self.value)
    }
}

impl Header {
    /// Returns a new `Header` instance.
    #[must_use]
    pub const fn new(name: HeaderName, value: HeaderValue) -> Self {
        Self { name, value }
    }

    /// Parses a string slice into a `Header` object (`set_user_header`,
    /// §4.6: splits on the first `:` and trims leading whitespace).
    pub fn parse(line: &str) -> NetResult<Header> {
        let mut tokens = line.splitn(2, ':');

        let (Some(name), Some(value)) = (tokens.next(), tokens.next()) else {
            return Err(ParseErrorKind::Header)?;
        };

        let hdr_name = HeaderName::from(name.trim());
        let hdr_value = HeaderValue::from(value.trim_start());

        Ok(Self::new(hdr_name, hdr_value))
    }
}
