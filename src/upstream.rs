//! Upstream definitions and the adapter that balances their buffer fields.
//!
//! Only `buffers`, `buffer-size` and `busy-buffers-size` are interpreted.
//! Every other field of an upstream is carried through untouched.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::balance::{balance, AdjustmentLog, ProxyBufferValues};
use crate::error::{BalanceError, ParseError};
use crate::pool::{parse_pool, split_pool};
use crate::size::parse_size;

/// Used when the configured pool cannot be parsed.
pub const DEFAULT_PROXY_BUFFERS: &str = "8 4k";
/// Used when a configured buffer size cannot be parsed.
pub const DEFAULT_BUFFER_SIZE: &str = "4k";

/// `proxy_buffers` as written in an upstream definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpstreamBuffers {
    pub number: i32,
    pub size: String,
}

/// An upstream definition.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Upstream {
    #[serde(default)]
    pub name: String,

    #[serde(rename = "buffer-size", default, skip_serializing_if = "String::is_empty")]
    pub buffer_size: String,

    #[serde(
        rename = "busy-buffers-size",
        default,
        skip_serializing_if = "String::is_empty"
    )]
    pub busy_buffers_size: String,

    #[serde(rename = "buffers", default, skip_serializing_if = "Option::is_none")]
    pub buffers: Option<UpstreamBuffers>,

    /// Fields this crate does not interpret.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// A file holding a list of upstreams.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpstreamDocument {
    #[serde(default)]
    pub upstreams: Vec<Upstream>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// Balances the buffer fields of `upstream` in place.
///
/// Nothing is touched when the upstream has no `buffers` or when
/// `auto_adjust` is off. Fields that fail to parse are replaced with
/// [`DEFAULT_PROXY_BUFFERS`] or [`DEFAULT_BUFFER_SIZE`] before solving.
pub fn balance_upstream(
    upstream: &mut Upstream,
    auto_adjust: bool,
) -> Result<AdjustmentLog, BalanceError> {
    let Some(buffers) = upstream.buffers.as_ref() else {
        return Ok(AdjustmentLog::new());
    };

    if !auto_adjust {
        return Ok(AdjustmentLog::auto_adjust_off());
    }

    let pool = format!("{} {}", buffers.number, buffers.size);
    let values = ProxyBufferValues {
        buffers: parse_or_default(
            &upstream.name,
            "buffers",
            parse_pool(&pool, auto_adjust),
            DEFAULT_PROXY_BUFFERS,
        ),
        buffer_size: parse_or_default(
            &upstream.name,
            "buffer-size",
            parse_size(&upstream.buffer_size, auto_adjust),
            DEFAULT_BUFFER_SIZE,
        ),
        busy_buffers_size: parse_or_default(
            &upstream.name,
            "busy-buffers-size",
            parse_size(&upstream.busy_buffers_size, auto_adjust),
            DEFAULT_BUFFER_SIZE,
        ),
    };

    let balanced = balance(&values, auto_adjust);

    let (count, size) = split_pool(&balanced.values.buffers)?;
    let number = i32::try_from(count).unwrap_or(i32::MAX);

    upstream.buffers = Some(UpstreamBuffers {
        number,
        size: size.to_string(),
    });
    upstream.buffer_size = balanced.values.buffer_size;
    upstream.busy_buffers_size = balanced.values.busy_buffers_size;

    Ok(balanced.adjustments)
}

fn parse_or_default(
    upstream: &str,
    field: &str,
    parsed: Result<String, ParseError>,
    default: &str,
) -> String {
    parsed.unwrap_or_else(|e| {
        debug!(
            "upstream '{}': {} is invalid ({}), using default {}",
            upstream, field, e, default
        );
        default.to_string()
    })
}
