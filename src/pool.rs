//! Buffer pools: a count of equally sized buffers, written `<count> <size>`.

use std::fmt;

use crate::error::ParseError;
use crate::size::{parse_decimal, size_to_bytes, Size};

/// A count of equally sized buffers, e.g. `8 4k`.
///
/// The parser accepts any count, zero included. Bringing it into range is
/// the solver's job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferPool {
    pub count: u64,
    pub unit: Size,
}

impl BufferPool {
    pub fn new(count: u64, unit: Size) -> Self {
        Self { count, unit }
    }

    /// Parses a pool token. An empty token yields `Ok(None)`.
    pub fn parse(token: &str) -> Result<Option<Self>, ParseError> {
        let token = token.trim().to_lowercase();
        if token.is_empty() {
            return Ok(None);
        }

        let (count, size) = split_pool(&token)?;
        let unit = Size::parse(size)
            .and_then(|unit| unit.ok_or_else(|| ParseError::InvalidSize(size.to_string())))
            .map_err(|e| ParseError::InvalidPoolSize {
                field: size.to_string(),
                source: Box::new(e),
            })?;

        Ok(Some(Self { count, unit }))
    }

    /// Bytes held by the whole pool, saturating at `u64::MAX`.
    pub fn total_bytes(&self) -> u64 {
        self.count.saturating_mul(self.unit.bytes())
    }
}

impl fmt::Display for BufferPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.count, self.unit)
    }
}

/// Splits a pool token into its count and the raw size field.
///
/// The size field is returned as written so callers can decide how strictly
/// to read it.
pub fn split_pool(token: &str) -> Result<(u64, &str), ParseError> {
    let mut fields = token.split_whitespace();
    let (Some(count), Some(size), None) = (fields.next(), fields.next(), fields.next()) else {
        return Err(ParseError::InvalidPoolFormat(token.trim().to_string()));
    };

    let count =
        parse_decimal(count).ok_or_else(|| ParseError::InvalidPoolCount(count.to_string()))?;

    Ok((count, size))
}

/// Validates a pool token.
///
/// With `normalize` the result is `<count> <amount><unit>`; otherwise the
/// trimmed, lowercased input is returned. An empty token yields an empty
/// string.
pub fn parse_pool(token: &str, normalize: bool) -> Result<String, ParseError> {
    match BufferPool::parse(token)? {
        None => Ok(String::new()),
        Some(pool) if normalize => Ok(pool.to_string()),
        Some(_) => Ok(token.trim().to_lowercase()),
    }
}

/// Lenient scan of a pool token into `(count, unit bytes)`.
///
/// Each part that cannot be read comes back as 0, the same way
/// [`size_to_bytes`] treats a bad size.
pub fn pool_to_bytes(token: &str) -> (u64, u64) {
    let mut fields = token.split_whitespace();
    let count = fields.next().and_then(parse_decimal).unwrap_or(0);
    let unit_bytes = fields.next().map(size_to_bytes).unwrap_or(0);
    (count, unit_bytes)
}
