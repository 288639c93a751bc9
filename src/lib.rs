//! Proxy Buffer Balancer Library
//!
//! This library normalizes the three buffer directives of a buffering reverse
//! proxy (`proxy_buffers`, `proxy_buffer_size` and `proxy_busy_buffers_size`)
//! into a combination the proxy will load, and reports every change it made.
//!
//! # Features
//!
//! - **Size Grammar**: Parse and format `4k` / `2m` style size tokens
//! - **Constraint Solver**: Apply the proxy's buffer rules in a fixed priority order
//! - **Adjustment Log**: Human-readable record of every logged change
//! - **Upstream Adapter**: Balance the buffer fields of an upstream definition in place
//!
//! # Usage
//!
//! ```rust
//! use proxy_buffer_balancer::{balance, ProxyBufferValues};
//!
//! let values = ProxyBufferValues::new("8 4k", "64k", "");
//! let balanced = balance(&values, true);
//!
//! assert_eq!(balanced.values.buffers, "8 4k");
//! assert_eq!(balanced.values.buffer_size, "28k");
//! assert_eq!(balanced.values.busy_buffers_size, "28k");
//!
//! for entry in &balanced.adjustments {
//!     println!("{}", entry);
//! }
//! ```

pub mod balance;
pub mod error;
pub mod pool;
pub mod size;
pub mod upstream;

// Re-export main types for convenience
pub use balance::{
    balance, balance_bytes, AdjustmentLog, Balanced, BufferRequest, BufferTriple,
    ProxyBufferValues, Violation, AUTO_ADJUST_OFF, MAX_BUFFER_COUNT, MIN_BUFFER_COUNT,
};
pub use error::{BalanceError, ParseError};
pub use pool::{parse_pool, BufferPool};
pub use size::{bytes_to_size, parse_size, size_to_bytes, Size, SizeUnit};
pub use upstream::{balance_upstream, Upstream, UpstreamBuffers, UpstreamDocument};
