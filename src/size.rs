//! Size tokens in the unit grammar the proxy accepts.
//!
//! A size token is an unsigned decimal integer optionally followed by one
//! unit character, e.g. `4k`, `2m` or `1024`. Surrounding whitespace is
//! ignored and case is folded.
//!
//! Two quirks are kept on purpose:
//!
//! - A bare number means megabytes, and any unit character other than `k`
//!   (including `g`) is read as `m`. Gigabyte buffers are rewritten instead of
//!   rejected at admission time.
//! - [`bytes_to_size`] does emit `g` when a byte count is an exact multiple of
//!   a gibibyte. Such a token reads back as megabytes, so only values below
//!   that range survive a format/parse round trip unchanged.

use std::fmt;

use crate::error::ParseError;

pub const KIB: u64 = 1024;
pub const MIB: u64 = 1024 * KIB;
pub const GIB: u64 = 1024 * MIB;

/// One memory page, used whenever a buffer size has to be made up.
pub const DEFAULT_PAGE_SIZE: &str = "4k";
pub const DEFAULT_PAGE_BYTES: u64 = 4 * KIB;

/// Unit of a size token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SizeUnit {
    Kilo,
    Mega,
    Giga,
}

impl SizeUnit {
    /// Number of bytes in one unit.
    pub const fn bytes(self) -> u64 {
        match self {
            SizeUnit::Kilo => KIB,
            SizeUnit::Mega => MIB,
            SizeUnit::Giga => GIB,
        }
    }

    /// Lowercase suffix used in the textual form.
    pub const fn suffix(self) -> char {
        match self {
            SizeUnit::Kilo => 'k',
            SizeUnit::Mega => 'm',
            SizeUnit::Giga => 'g',
        }
    }

    /// Unit for a trailing character. Only `k` keeps its meaning; every other
    /// character, `g` included, is megabytes.
    fn from_suffix(c: char) -> Self {
        match c {
            'k' => SizeUnit::Kilo,
            _ => SizeUnit::Mega,
        }
    }
}

impl fmt::Display for SizeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.suffix())
    }
}

/// A non-zero byte quantity together with the unit it was declared in.
///
/// The byte count always fits in a `u64`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Size {
    amount: u64,
    unit: SizeUnit,
}

impl Size {
    /// Returns `None` for a zero amount or when the byte count overflows.
    pub fn new(amount: u64, unit: SizeUnit) -> Option<Self> {
        if amount == 0 {
            return None;
        }
        amount.checked_mul(unit.bytes())?;
        Some(Self { amount, unit })
    }

    pub fn amount(&self) -> u64 {
        self.amount
    }

    pub fn unit(&self) -> SizeUnit {
        self.unit
    }

    pub fn bytes(&self) -> u64 {
        self.amount * self.unit.bytes()
    }

    /// Parses a size token.
    ///
    /// An empty token (after trimming) is the "not set" sentinel and yields
    /// `Ok(None)`.
    pub fn parse(token: &str) -> Result<Option<Self>, ParseError> {
        let token = token.trim().to_lowercase();
        if token.is_empty() {
            return Ok(None);
        }

        let (digits, unit) = split_unit(&token);

        parse_decimal(digits)
            .and_then(|amount| Size::new(amount, unit))
            .map(Some)
            .ok_or(ParseError::InvalidSize(token))
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.amount, self.unit)
    }
}

/// Splits a trimmed, lowercased token into its numeric part and unit.
fn split_unit(token: &str) -> (&str, SizeUnit) {
    match token.chars().last() {
        Some(c) if !c.is_ascii_digit() => (
            &token[..token.len() - c.len_utf8()],
            SizeUnit::from_suffix(c),
        ),
        _ => (token, SizeUnit::Mega),
    }
}

/// Strict unsigned decimal: digits only, no sign, no whitespace.
pub(crate) fn parse_decimal(s: &str) -> Option<u64> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

/// Validates a size token.
///
/// With `normalize` the result is `<amount><unit>`; otherwise the trimmed,
/// lowercased input is returned as is. An empty token yields an empty string.
pub fn parse_size(token: &str, normalize: bool) -> Result<String, ParseError> {
    match Size::parse(token)? {
        None => Ok(String::new()),
        Some(size) if normalize => Ok(size.to_string()),
        Some(_) => Ok(token.trim().to_lowercase()),
    }
}

/// Byte count of a size token, or 0 if the token is empty or invalid.
pub fn size_to_bytes(token: &str) -> u64 {
    match Size::parse(token) {
        Ok(Some(size)) => size.bytes(),
        _ => 0,
    }
}

/// Formats a byte count with the largest unit that divides it exactly.
///
/// Counts that are not a multiple of 1024 are rounded up to the next
/// kilobyte. Zero formats as `0k`.
pub fn bytes_to_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0k".to_string();
    }

    for unit in [SizeUnit::Giga, SizeUnit::Mega, SizeUnit::Kilo] {
        if bytes % unit.bytes() == 0 {
            return format!("{}{}", bytes / unit.bytes(), unit);
        }
    }

    format!("{}k", bytes.div_ceil(KIB))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_size_normalized() {
        let cases = [
            ("", ""),
            ("1024", "1024m"),
            ("4k", "4k"),
            ("2m", "2m"),
            ("1g", "1m"),
            ("8K", "8k"),
            ("  16m  ", "16m"),
            ("32x", "32m"),
        ];

        for (input, want) in cases {
            assert_eq!(
                parse_size(input, true).as_deref(),
                Ok(want),
                "parse_size({input:?}, true)"
            );
        }
    }

    #[test]
    fn test_parse_size_rejects_invalid() {
        for input in [
            "invalid",
            "  invalid  value ",
            "-4k",
            "+4k",
            "4.5m",
            "18446744073709551616k",
            "0k",
            "0",
            "k",
        ] {
            assert!(
                matches!(parse_size(input, true), Err(ParseError::InvalidSize(_))),
                "{input:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_parse_size_without_normalize_keeps_token() {
        assert_eq!(parse_size("  1G ", false).unwrap(), "1g");
        assert_eq!(parse_size("1024", false).unwrap(), "1024");
    }

    #[test]
    fn test_byte_overflow_is_invalid() {
        // Fits in u64 as a number but not as a byte count.
        let token = format!("{}m", u64::MAX / MIB + 1);
        assert!(parse_size(&token, true).is_err());
        assert_eq!(size_to_bytes(&token), 0);
    }

    #[test]
    fn test_size_to_bytes() {
        assert_eq!(size_to_bytes("4k"), 4 * KIB);
        assert_eq!(size_to_bytes("2"), 2 * MIB);
        assert_eq!(size_to_bytes("3g"), 3 * MIB);
        assert_eq!(size_to_bytes(""), 0);
        assert_eq!(size_to_bytes("junk"), 0);
    }

    #[test]
    fn test_bytes_to_size_picks_largest_unit() {
        assert_eq!(bytes_to_size(0), "0k");
        assert_eq!(bytes_to_size(1), "1k");
        assert_eq!(bytes_to_size(1023), "1k");
        assert_eq!(bytes_to_size(1024), "1k");
        assert_eq!(bytes_to_size(1025), "2k");
        assert_eq!(bytes_to_size(28 * KIB), "28k");
        assert_eq!(bytes_to_size(1536 * KIB), "1536k");
        assert_eq!(bytes_to_size(MIB), "1m");
        assert_eq!(bytes_to_size(GIB), "1g");
        assert_eq!(bytes_to_size(3 * GIB), "3g");
    }

    #[test]
    fn test_size_new_rejects_zero() {
        assert!(Size::new(0, SizeUnit::Kilo).is_none());
        let size = Size::new(8, SizeUnit::Kilo).unwrap();
        assert_eq!(size.bytes(), 8192);
        assert_eq!(size.to_string(), "8k");
    }
}
