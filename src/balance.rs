//! Constraint solver for the proxy buffer triple.
//!
//! The proxy refuses to load a configuration unless:
//!
//! 1. there are between 2 and 1024 buffers in `proxy_buffers`
//! 2. `proxy_buffer_size` fits in all of `proxy_buffers` minus one buffer
//! 3. `proxy_busy_buffers_size` fits in all of `proxy_buffers` minus one buffer
//! 4. `proxy_busy_buffers_size` is at least the larger of `proxy_buffer_size`
//!    and one buffer of `proxy_buffers`
//!
//! [`balance_bytes`] repairs a triple in that order. Shrinking runs before
//! the busy-buffer floor so a reduced `proxy_buffer_size` carries through to
//! the floor. Raising the busy size to the floor is not logged: it is almost
//! always a consequence of an earlier rule.
//!
//! [`balance`] wraps the byte solver with the textual forms used in the
//! proxy configuration.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::pool::pool_to_bytes;
use crate::size::{bytes_to_size, size_to_bytes, DEFAULT_PAGE_BYTES, DEFAULT_PAGE_SIZE};

pub const MIN_BUFFER_COUNT: u64 = 2;
pub const MAX_BUFFER_COUNT: u64 = 1024;

/// The single log entry produced when auto adjust is disabled.
pub const AUTO_ADJUST_OFF: &str =
    "auto adjust is turned off, no changes have been made to the proxy values";

/// Ordered, human-readable record of the changes made by the solver.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AdjustmentLog {
    entries: Vec<String>,
}

impl AdjustmentLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Log holding only the auto-adjust-off notice.
    pub fn auto_adjust_off() -> Self {
        Self {
            entries: vec![AUTO_ADJUST_OFF.to_string()],
        }
    }

    pub fn push(&mut self, entry: impl Into<String>) {
        let entry = entry.into();
        debug!("{}", entry);
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_entries(self) -> Vec<String> {
        self.entries
    }
}

impl<'a> IntoIterator for &'a AdjustmentLog {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Solver input in the byte domain.
///
/// `None` means the value was not configured, which is different from a
/// configured value that came out as zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferRequest {
    pub count: u64,
    pub unit_bytes: u64,
    pub read_bytes: Option<u64>,
    pub busy_bytes: Option<u64>,
}

/// A complete buffering configuration in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferTriple {
    pub count: u64,
    pub unit_bytes: u64,
    pub read_bytes: u64,
    pub busy_bytes: u64,
}

impl BufferTriple {
    /// All buffers of the pool minus one.
    pub fn max_allowed(&self) -> u64 {
        self.count.saturating_sub(1).saturating_mul(self.unit_bytes)
    }

    /// Lists every proxy constraint this triple breaks.
    pub fn violations(&self) -> Vec<Violation> {
        let mut found = Vec::new();
        let max_allowed = self.max_allowed();

        if !(MIN_BUFFER_COUNT..=MAX_BUFFER_COUNT).contains(&self.count) {
            found.push(Violation::CountOutOfRange);
        }
        if self.read_bytes > max_allowed {
            found.push(Violation::ReadSizeTooLarge);
        }
        if self.busy_bytes > max_allowed {
            found.push(Violation::BusySizeTooLarge);
        }
        if self.busy_bytes < self.read_bytes.max(self.unit_bytes) {
            found.push(Violation::BusySizeTooSmall);
        }

        found
    }
}

/// A proxy constraint broken by a [`BufferTriple`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Violation {
    CountOutOfRange,
    ReadSizeTooLarge,
    BusySizeTooLarge,
    BusySizeTooSmall,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Violation::CountOutOfRange => "proxy_buffers number must be between 2 and 1024",
            Violation::ReadSizeTooLarge => {
                "proxy_buffer_size must not exceed proxy_buffers minus one buffer"
            }
            Violation::BusySizeTooLarge => {
                "proxy_busy_buffers_size must not exceed proxy_buffers minus one buffer"
            }
            Violation::BusySizeTooSmall => {
                "proxy_busy_buffers_size must be at least proxy_buffer_size and one buffer"
            }
        };
        f.write_str(msg)
    }
}

/// Repairs a byte-domain request into a triple the proxy accepts, appending
/// one entry to `log` per logged change.
pub fn balance_bytes(request: BufferRequest, log: &mut AdjustmentLog) -> BufferTriple {
    let count = request.count.clamp(MIN_BUFFER_COUNT, MAX_BUFFER_COUNT);
    if count != request.count {
        log.push(format!(
            "adjusted proxy_buffers number from {} to {}",
            request.count, count
        ));
    }

    let mut unit_bytes = request.unit_bytes;
    if unit_bytes == 0 {
        log.push(format!(
            "proxy_buffers had an empty size, set it to {}",
            DEFAULT_PAGE_SIZE
        ));
        unit_bytes = DEFAULT_PAGE_BYTES;
    }

    let mut read_bytes = request.read_bytes.unwrap_or(unit_bytes);
    let mut busy_bytes = request.busy_bytes.unwrap_or(unit_bytes);

    let max_allowed = (count - 1).saturating_mul(unit_bytes);

    if read_bytes > max_allowed {
        log.push(format!(
            "adjusted proxy_buffer_size from {} to {} because it was too large for proxy_buffers ({} {})",
            bytes_to_size(read_bytes),
            bytes_to_size(max_allowed),
            count,
            bytes_to_size(unit_bytes)
        ));
        read_bytes = max_allowed;
    }

    if busy_bytes > max_allowed {
        log.push(format!(
            "adjusted proxy_busy_buffers_size from {} to {} because it was too large",
            bytes_to_size(busy_bytes),
            bytes_to_size(max_allowed)
        ));
        busy_bytes = max_allowed;
    }

    let floor = read_bytes.max(unit_bytes);
    if busy_bytes < floor {
        trace!(
            "raised proxy_busy_buffers_size from {} to {}",
            bytes_to_size(busy_bytes),
            bytes_to_size(floor)
        );
        busy_bytes = floor;
    }

    BufferTriple {
        count,
        unit_bytes,
        read_bytes,
        busy_bytes,
    }
}

/// The three buffer directives in their textual form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxyBufferValues {
    /// `proxy_buffers`, e.g. `8 4k`.
    #[serde(rename = "buffers", default)]
    pub buffers: String,
    /// `proxy_buffer_size`.
    #[serde(rename = "buffer-size", default)]
    pub buffer_size: String,
    /// `proxy_busy_buffers_size`.
    #[serde(rename = "busy-buffers-size", default)]
    pub busy_buffers_size: String,
}

impl ProxyBufferValues {
    pub fn new(
        buffers: impl Into<String>,
        buffer_size: impl Into<String>,
        busy_buffers_size: impl Into<String>,
    ) -> Self {
        Self {
            buffers: buffers.into(),
            buffer_size: buffer_size.into(),
            busy_buffers_size: busy_buffers_size.into(),
        }
    }

    fn is_unset(&self) -> bool {
        self.buffers.trim().is_empty()
            && self.buffer_size.trim().is_empty()
            && self.busy_buffers_size.trim().is_empty()
    }
}

impl From<BufferTriple> for ProxyBufferValues {
    fn from(triple: BufferTriple) -> Self {
        Self {
            buffers: format!("{} {}", triple.count, bytes_to_size(triple.unit_bytes)),
            buffer_size: bytes_to_size(triple.read_bytes),
            busy_buffers_size: bytes_to_size(triple.busy_bytes),
        }
    }
}

/// Result of [`balance`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Balanced {
    #[serde(flatten)]
    pub values: ProxyBufferValues,
    pub adjustments: AdjustmentLog,
    /// Solver output in bytes; `None` when the input was passed through.
    #[serde(skip)]
    pub triple: Option<BufferTriple>,
}

/// Balances the textual buffer directives.
///
/// Empty strings mean "not set". With `auto_adjust` off, or when nothing is
/// set, the input comes back untouched.
pub fn balance(values: &ProxyBufferValues, auto_adjust: bool) -> Balanced {
    if !auto_adjust {
        trace!("auto adjust disabled, leaving proxy buffer values as they are");
        return Balanced {
            values: values.clone(),
            adjustments: AdjustmentLog::auto_adjust_off(),
            triple: None,
        };
    }

    if values.is_unset() {
        trace!("no proxy buffer values set, nothing to balance");
        return Balanced {
            values: values.clone(),
            adjustments: AdjustmentLog::new(),
            triple: None,
        };
    }

    let (count, unit_bytes) = if values.buffers.trim().is_empty() {
        (MIN_BUFFER_COUNT, DEFAULT_PAGE_BYTES)
    } else {
        pool_to_bytes(&values.buffers)
    };

    let request = BufferRequest {
        count,
        unit_bytes,
        read_bytes: optional_bytes(&values.buffer_size),
        busy_bytes: optional_bytes(&values.busy_buffers_size),
    };

    let mut adjustments = AdjustmentLog::new();
    let triple = balance_bytes(request, &mut adjustments);

    Balanced {
        values: triple.into(),
        adjustments,
        triple: Some(triple),
    }
}

fn optional_bytes(token: &str) -> Option<u64> {
    if token.trim().is_empty() {
        None
    } else {
        Some(size_to_bytes(token))
    }
}
