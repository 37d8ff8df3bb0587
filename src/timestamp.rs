/*!
The [`Timestamp`] type.

A [`Timestamp`] is a point in time, anchored to UTC. It's stored as the
[`Duration`] elapsed since the Unix epoch, so there is no representation for
times before 1970-01-01T00:00:00Z, and no representation at all for
timezone-naive or local-offset values. Anything a `Timestamp` can hold is
already safe to hand to a storage layer that requires timezone-aware values.
*/

use core::{cmp, fmt, str, str::FromStr, time::Duration};

/**
A UTC timestamp, stored as the time elapsed since the Unix epoch.

The textual form is always RFC 3339 with the `Z` designator:

```
# use std::time::Duration;
let ts = timesource::Timestamp::from_unix(Duration::from_secs(1_709_209_845));

assert_eq!("2024-02-29T12:30:45.000000000Z", ts.to_string());
```
*/
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(Duration);

impl Timestamp {
    /**
    1970-01-01T00:00:00Z.
    */
    pub const EPOCH: Self = Timestamp(Duration::ZERO);

    /**
    Create a timestamp from the time elapsed since the Unix epoch.
    */
    pub const fn from_unix(elapsed_since_unix_epoch: Duration) -> Self {
        Timestamp(elapsed_since_unix_epoch)
    }

    /**
    Get the time elapsed since the Unix epoch.
    */
    pub const fn to_unix(&self) -> Duration {
        self.0
    }

    /**
    Create a timestamp from a floating-point count of seconds since the Unix
    epoch.

    Returns `None` if `secs` is negative or not finite. A negative epoch
    offset has no `Timestamp` representation.
    */
    pub fn from_unix_secs_f64(secs: f64) -> Option<Self> {
        if !secs.is_finite() {
            return None;
        }

        Duration::try_from_secs_f64(secs).ok().map(Timestamp)
    }

    /**
    Get the timestamp as a floating-point count of seconds since the Unix
    epoch.

    The result loses sub-microsecond precision for contemporary dates; use
    [`Timestamp::to_unix`] where exactness matters.
    */
    pub fn to_unix_secs_f64(&self) -> f64 {
        self.0.as_secs_f64()
    }

    /**
    Get the time elapsed since an earlier timestamp.

    Returns `None` if `earlier` is actually later than `self`.
    */
    pub fn duration_since(self, earlier: Self) -> Option<Duration> {
        self.0.checked_sub(earlier.0)
    }

    /**
    Get the timestamp advanced by `interval`, if the result is representable.
    */
    pub fn checked_add(self, interval: Duration) -> Option<Self> {
        self.0.checked_add(interval).map(Timestamp)
    }

    /**
    Get the timestamp moved back by `interval`, if the result is on or after
    the epoch.
    */
    pub fn checked_sub(self, interval: Duration) -> Option<Self> {
        self.0.checked_sub(interval).map(Timestamp)
    }

    /**
    Convert into a [`std::time::SystemTime`].
    */
    #[cfg(feature = "std")]
    pub fn to_system_time(&self) -> std::time::SystemTime {
        std::time::UNIX_EPOCH + self.0
    }

    /**
    Create a timestamp from a [`std::time::SystemTime`].

    Returns `None` for system times before the epoch; they're never clamped
    to a default.
    */
    #[cfg(feature = "std")]
    pub fn from_system_time(time: std::time::SystemTime) -> Option<Self> {
        time.duration_since(std::time::UNIX_EPOCH)
            .ok()
            .map(Timestamp)
    }
}

impl fmt::Debug for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt_rfc3339(*self, f)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt_rfc3339(*self, f)
    }
}

impl FromStr for Timestamp {
    type Err = ParseTimestampError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_rfc3339(s)
    }
}

/**
An error attempting to parse a [`Timestamp`] from text.
*/
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseTimestampError {
    reason: &'static str,
}

impl ParseTimestampError {
    fn new(reason: &'static str) -> Self {
        ParseTimestampError { reason }
    }
}

impl fmt::Display for ParseTimestampError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "invalid RFC 3339 UTC timestamp: {}", self.reason)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ParseTimestampError {}

const SECS_PER_DAY: u64 = 86_400;
const DAYS_PER_400Y: u64 = 365 * 400 + 97;

// Offset between day 0 of the proleptic Gregorian calendar shifted to start
// years on March 1 (so leap days fall at the end of a year) and 1970-01-01.
const EPOCH_SHIFT_DAYS: u64 = 719_468;

/// Civil date from a count of days since 1970-01-01. Months are 1-based.
fn date_from_days(days: u64) -> (u64, u32, u32) {
    let shifted = days + EPOCH_SHIFT_DAYS;

    let era = shifted / DAYS_PER_400Y;
    let day_of_era = shifted % DAYS_PER_400Y;

    let year_of_era =
        (day_of_era - day_of_era / 1460 + day_of_era / 36_524 - day_of_era / 146_096) / 365;
    let day_of_year = day_of_era - (365 * year_of_era + year_of_era / 4 - year_of_era / 100);

    // 0 is March in the shifted year
    let month = (5 * day_of_year + 2) / 153;
    let day = (day_of_year - (153 * month + 2) / 5 + 1) as u32;
    let month = (if month < 10 { month + 3 } else { month - 9 }) as u32;

    let year = year_of_era + era * 400 + if month <= 2 { 1 } else { 0 };

    (year, month, day)
}

/// Days since 1970-01-01 for a civil date. The date must not be before the
/// epoch; the parser checks the year range before calling.
fn days_from_date(year: u64, month: u32, day: u32) -> u64 {
    let shifted_year = if month <= 2 { year - 1 } else { year };

    let era = shifted_year / 400;
    let year_of_era = shifted_year % 400;

    let shifted_month = (if month > 2 { month - 3 } else { month + 9 }) as u64;
    let day_of_year = (153 * shifted_month + 2) / 5 + day as u64 - 1;
    let day_of_era = year_of_era * 365 + year_of_era / 4 - year_of_era / 100 + day_of_year;

    era * DAYS_PER_400Y + day_of_era - EPOCH_SHIFT_DAYS
}

fn is_leap_year(year: u64) -> bool {
    year % 4 == 0 && (year % 100 != 0 || year % 400 == 0)
}

fn days_in_month(year: u64, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        _ => {
            if is_leap_year(year) {
                29
            } else {
                28
            }
        }
    }
}

fn parse_decimal(digits: &[u8]) -> Result<u64, ParseTimestampError> {
    let mut value = 0u64;

    for &b in digits {
        if !b.is_ascii_digit() {
            return Err(ParseTimestampError::new("expected an ASCII digit"));
        }

        value = value * 10 + (b - b'0') as u64;
    }

    Ok(value)
}

fn expect_byte(bytes: &[u8], index: usize, expected: u8) -> Result<(), ParseTimestampError> {
    if bytes[index] != expected {
        return Err(ParseTimestampError::new("malformed date-time separators"));
    }

    Ok(())
}

fn parse_rfc3339(input: &str) -> Result<Timestamp, ParseTimestampError> {
    let bytes = input.as_bytes();

    // yyyy-mm-ddThh:mm:ss plus at least a UTC designator
    if bytes.len() < 20 {
        return Err(ParseTimestampError::new("input is too short"));
    }

    expect_byte(bytes, 4, b'-')?;
    expect_byte(bytes, 7, b'-')?;
    expect_byte(bytes, 13, b':')?;
    expect_byte(bytes, 16, b':')?;

    if bytes[10] != b'T' && bytes[10] != b't' && bytes[10] != b' ' {
        return Err(ParseTimestampError::new("malformed date-time separators"));
    }

    let year = parse_decimal(&bytes[0..4])?;
    let month = parse_decimal(&bytes[5..7])? as u32;
    let day = parse_decimal(&bytes[8..10])? as u32;
    let hour = parse_decimal(&bytes[11..13])?;
    let minute = parse_decimal(&bytes[14..16])?;
    let second = parse_decimal(&bytes[17..19])?;

    if year < 1970 {
        return Err(ParseTimestampError::new(
            "timestamps before the Unix epoch aren't representable",
        ));
    }

    if month < 1 || month > 12 {
        return Err(ParseTimestampError::new("month is out of range"));
    }

    if day < 1 || day > days_in_month(year, month) {
        return Err(ParseTimestampError::new("day is out of range"));
    }

    if hour > 23 || minute > 59 {
        return Err(ParseTimestampError::new("time is out of range"));
    }

    if second > 59 {
        // 60 is a leap second in RFC 3339, but a Unix offset can't carry one
        return Err(ParseTimestampError::new("time is out of range"));
    }

    let mut cursor = 19;
    let mut nanos = 0u32;

    if bytes[cursor] == b'.' {
        let fraction_start = cursor + 1;
        cursor = fraction_start;

        while cursor < bytes.len() && bytes[cursor].is_ascii_digit() {
            cursor += 1;
        }

        let fraction = &bytes[fraction_start..cursor];

        if fraction.is_empty() {
            return Err(ParseTimestampError::new("empty subsecond fraction"));
        }

        if fraction.len() > 9 {
            return Err(ParseTimestampError::new(
                "subsecond precision is limited to nanoseconds",
            ));
        }

        nanos = parse_decimal(fraction)? as u32 * 10u32.pow(9 - fraction.len() as u32);
    }

    // Only explicitly-UTC designators are accepted. A local offset (or the
    // RFC 3339 "-00:00" unknown-offset form) would make the value ambiguous
    // to a storage layer expecting UTC.
    match &bytes[cursor..] {
        b"Z" | b"z" | b"+00:00" => {}
        _ => {
            return Err(ParseTimestampError::new(
                "timestamp must carry an explicit UTC designator",
            ))
        }
    }

    let days = days_from_date(year, month, day);
    let secs = days * SECS_PER_DAY + hour * 3600 + minute * 60 + second;

    Ok(Timestamp(Duration::new(secs, nanos)))
}

/// Fill `buf` with the zero-padded decimal form of `value`.
fn fill_decimal(buf: &mut [u8], mut value: u64) {
    for slot in buf.iter_mut().rev() {
        *slot = b'0' + (value % 10) as u8;
        value /= 10;
    }
}

fn fmt_rfc3339(ts: Timestamp, f: &mut fmt::Formatter) -> fmt::Result {
    let secs = ts.0.as_secs();
    let nanos = ts.0.subsec_nanos();

    let (year, month, day) = date_from_days(secs / SECS_PER_DAY);

    // the fixed-width buffer below only fits four year digits
    if year > 9999 {
        return Err(fmt::Error);
    }

    let time_of_day = secs % SECS_PER_DAY;
    let hour = time_of_day / 3600;
    let minute = time_of_day / 60 % 60;
    let second = time_of_day % 60;

    let mut buf: [u8; 30] = *b"0000-00-00T00:00:00.000000000Z";

    fill_decimal(&mut buf[0..4], year);
    fill_decimal(&mut buf[5..7], month as u64);
    fill_decimal(&mut buf[8..10], day as u64);
    fill_decimal(&mut buf[11..13], hour);
    fill_decimal(&mut buf[14..16], minute);
    fill_decimal(&mut buf[17..19], second);

    let end = match f.precision() {
        Some(0) => 19,
        precision => {
            let digits = cmp::min(9, precision.unwrap_or(9));

            // truncate rather than round; a formatted value never reads ahead
            // of the instant it was produced from
            fill_decimal(
                &mut buf[20..20 + digits],
                nanos as u64 / 10u64.pow(9 - digits as u32),
            );

            20 + digits
        }
    };

    buf[end] = b'Z';

    // the buffer is all ASCII
    f.write_str(str::from_utf8(&buf[..=end]).map_err(|_| fmt::Error)?)
}

#[cfg(feature = "serde")]
mod serde_support {
    use super::Timestamp;

    use core::fmt;

    use serde::{
        de::{self, Deserialize, Deserializer, Visitor},
        ser::{Serialize, Serializer},
    };

    impl Serialize for Timestamp {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            serializer.collect_str(self)
        }
    }

    impl<'de> Deserialize<'de> for Timestamp {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            struct TimestampVisitor;

            impl<'de> Visitor<'de> for TimestampVisitor {
                type Value = Timestamp;

                fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                    f.write_str("an RFC 3339 UTC timestamp string")
                }

                // Numeric forms are deliberately not accepted; a bare number
                // doesn't say whether it was UTC-normalized.
                fn visit_str<E: de::Error>(self, value: &str) -> Result<Timestamp, E> {
                    value.parse().map_err(E::custom)
                }
            }

            deserializer.deserialize_str(TimestampVisitor)
        }
    }
}
