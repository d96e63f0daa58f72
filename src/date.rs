//! HTTP-date parsing (§4.12): RFC 1123, RFC 850, asctime, and the
//! Set-Cookie date form, without touching process locale state — a private
//! table of English month/weekday abbreviations is baked in instead, per
//! the Design Notes' guidance for implementations that cannot swap
//! locales.

use time::{Date, Month, OffsetDateTime, Time};

const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

const WEEKDAYS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

fn month_from_abbrev(s: &str) -> Option<Month> {
    let idx = MONTHS.iter().position(|m| m.eq_ignore_ascii_case(s))?;
    Month::try_from(u8::try_from(idx + 1).ok()?).ok()
}

fn is_weekday_abbrev(s: &str) -> bool {
    WEEKDAYS.iter().any(|w| w.eq_ignore_ascii_case(s))
}

fn two_digit(s: &str) -> Option<u8> {
    if s.len() == 2 && s.bytes().all(|b| b.is_ascii_digit()) {
        s.parse().ok()
    } else {
        None
    }
}

fn parse_time_of_day(s: &str) -> Option<Time> {
    let mut parts = s.splitn(3, ':');
    let h: u8 = parts.next()?.parse().ok()?;
    let m: u8 = parts.next()?.parse().ok()?;
    let sec: u8 = parts.next()?.parse().ok()?;
    Time::from_hms(h, m, sec).ok()
}

fn is_signed_offset(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some('+' | '-') => {
            let rest = chars.as_str();
            !rest.is_empty() && rest.bytes().all(|b| b.is_ascii_digit())
        },
        _ => false,
    }
}

/// §4.12 restricts every form to inputs that end at whitespace-then-`GMT`,
/// whitespace-then-`±digit`, or end-of-string; anything else after the
/// fields the form requires is a parse failure.
fn trailing_is_allowed<'a>(mut it: impl Iterator<Item = &'a str>) -> bool {
    match it.next() {
        None => true,
        Some(tok) => (tok.eq_ignore_ascii_case("GMT") || is_signed_offset(tok)) && it.next().is_none(),
    }
}

fn year_from_2digit(y: u8) -> i32 {
    // RFC 850's 2-digit year: values < 70 are 20xx, else 19xx (the
    // convention the original cookie-date parsing relies on).
    if y < 70 {
        2000 + i32::from(y)
    } else {
        1900 + i32::from(y)
    }
}

/// Parses an RFC 1123 date: `Sun, 06 Nov 1994 08:49:37 GMT`.
fn try_rfc1123(s: &str) -> Option<OffsetDateTime> {
    let (wd, rest) = s.split_once(',')?;
    if !is_weekday_abbrev(wd.trim()) {
        return None;
    }
    let rest = rest.trim_start();
    let mut it = rest.split_whitespace();
    let day: u8 = it.next()?.parse().ok()?;
    let month = month_from_abbrev(it.next()?)?;
    let year: i32 = it.next()?.parse().ok()?;
    let time = parse_time_of_day(it.next()?)?;
    if !trailing_is_allowed(it) {
        return None;
    }
    let date = Date::from_calendar_date(year, month, day).ok()?;
    Some(date.with_time(time).assume_utc())
}

/// Parses an RFC 850 date: `Sunday, 06-Nov-94 08:49:37 GMT`.
fn try_rfc850(s: &str) -> Option<OffsetDateTime> {
    let (wd, rest) = s.split_once(',')?;
    let wd = wd.trim();
    if wd.len() < 3 || !is_weekday_abbrev(&wd[..3]) {
        return None;
    }
    let rest = rest.trim_start();
    let mut it = rest.split_whitespace();
    let dmy = it.next()?;
    let time = parse_time_of_day(it.next()?)?;

    let mut dmy_parts = dmy.splitn(3, '-');
    let day: u8 = dmy_parts.next()?.parse().ok()?;
    let month = month_from_abbrev(dmy_parts.next()?)?;
    let yy = two_digit(dmy_parts.next()?)?;
    let year = year_from_2digit(yy);
    if !trailing_is_allowed(it) {
        return None;
    }

    let date = Date::from_calendar_date(year, month, day).ok()?;
    Some(date.with_time(time).assume_utc())
}

/// Parses an asctime-style date: `Sun Nov  6 08:49:37 1994`.
fn try_asctime(s: &str) -> Option<OffsetDateTime> {
    let mut it = s.split_whitespace();
    let wd = it.next()?;
    if !is_weekday_abbrev(wd) {
        return None;
    }
    let month = month_from_abbrev(it.next()?)?;
    let day: u8 = it.next()?.parse().ok()?;
    let time = parse_time_of_day(it.next()?)?;
    let year: i32 = it.next()?.parse().ok()?;
    if !trailing_is_allowed(it) {
        return None;
    }
    let date = Date::from_calendar_date(year, month, day).ok()?;
    Some(date.with_time(time).assume_utc())
}

/// Parses a Set-Cookie style date: `Sun, 06-Nov-1994 08:49:37 GMT`.
fn try_set_cookie(s: &str) -> Option<OffsetDateTime> {
    let (wd, rest) = s.split_once(',')?;
    if !is_weekday_abbrev(wd.trim()) {
        return None;
    }
    let rest = rest.trim_start();
    let mut it = rest.split_whitespace();
    let dmy = it.next()?;
    let time = parse_time_of_day(it.next()?)?;

    let mut dmy_parts = dmy.splitn(3, '-');
    let day: u8 = dmy_parts.next()?.parse().ok()?;
    let month = month_from_abbrev(dmy_parts.next()?)?;
    let year: i32 = dmy_parts.next()?.parse().ok()?;
    if !trailing_is_allowed(it) {
        return None;
    }

    let date = Date::from_calendar_date(year, month, day).ok()?;
    Some(date.with_time(time).assume_utc())
}

/// Parses an HTTP-date in any of the four recognized forms, returning
/// seconds since the Unix epoch, or `-1` on total failure (the
/// `http_atotm` sentinel).
#[must_use]
pub fn http_atotm(s: &str) -> i64 {
    let s = s.trim();

    try_rfc1123(s)
        .or_else(|| try_rfc850(s))
        .or_else(|| try_asctime(s))
        .or_else(|| try_set_cookie(s))
        .map_or(-1, |dt| dt.unix_timestamp())
}

/// Formats a Unix timestamp as an RFC 1123 date string, the inverse used by
/// the round-trip property in §8.
#[must_use]
pub fn rfc1123_of(t: i64) -> String {
    let dt = OffsetDateTime::from_unix_timestamp(t).unwrap_or(OffsetDateTime::UNIX_EPOCH);
    let wd = WEEKDAYS[usize::from(dt.weekday().number_days_from_monday())];
    let month = MONTHS[usize::from(u8::from(dt.month())) - 1];
    format!(
        "{wd}, {:02} {month} {} {:02}:{:02}:{:02} GMT",
        dt.day(),
        dt.year(),
        dt.hour(),
        dt.minute(),
        dt.second()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_rfc1123() {
        assert_eq!(http_atotm("Sun, 06 Nov 1994 08:49:37 GMT"), 784111777);
    }

    #[test]
    fn parses_rfc850() {
        assert_eq!(http_atotm("Sunday, 06-Nov-94 08:49:37 GMT"), 784111777);
    }

    #[test]
    fn parses_asctime() {
        assert_eq!(http_atotm("Sun Nov  6 08:49:37 1994"), 784111777);
    }

    #[test]
    fn parses_set_cookie_form() {
        assert_eq!(http_atotm("Sun, 06-Nov-1994 08:49:37 GMT"), 784111777);
    }

    #[test]
    fn unparseable_returns_sentinel() {
        assert_eq!(http_atotm("not a date"), -1);
    }

    #[test]
    fn rejects_trailing_junk_after_gmt() {
        assert_eq!(http_atotm("Sun, 06 Nov 1994 08:49:37 GMT unexpected trailing junk"), -1);
    }

    #[test]
    fn rejects_trailing_junk_with_no_gmt() {
        assert_eq!(http_atotm("Sun, 06 Nov 1994 08:49:37 unexpected"), -1);
    }

    #[test]
    fn accepts_a_trailing_numeric_offset() {
        assert_eq!(http_atotm("Sun, 06 Nov 1994 08:49:37 +0000"), 784_111_777);
    }

    #[test]
    fn rejects_trailing_junk_in_asctime_form() {
        assert_eq!(http_atotm("Sun Nov  6 08:49:37 1994 trailing"), -1);
    }

    #[test]
    fn round_trips_through_rfc1123() {
        for t in [0_i64, 1, 86_400, 1_700_000_000] {
            assert_eq!(http_atotm(&rfc1123_of(t)), t);
        }
    }
}
