//! Balance command implementation.
//!
//! Balances one set of buffer values given on the command line.

use proxy_buffer_balancer::{balance, ProxyBufferValues};
use tracing::info;

use crate::cli::ConfigFormat;
use crate::commands::render;
use crate::config::Config;

/// Balances a single `proxy_buffers` / `proxy_buffer_size` /
/// `proxy_busy_buffers_size` triple and prints the result.
pub fn command_balance(
    buffers: String,
    buffer_size: String,
    busy_buffers_size: String,
    format: Option<ConfigFormat>,
    config: &Config,
) -> Result<(), Box<dyn std::error::Error>> {
    let values = ProxyBufferValues::new(buffers, buffer_size, busy_buffers_size);
    let balanced = balance(&values, config.auto_adjust());

    for entry in &balanced.adjustments {
        info!("{}", entry);
    }

    let format = format.unwrap_or_else(|| config.output_format());
    let output = if config.show_adjustments() {
        render(&balanced, format)?
    } else {
        render(&balanced.values, format)?
    };
    println!("{}", output.trim_end());

    // Anything that differs from the canonical output counts, including the
    // silent busy buffer repair.
    let adjusted = !balanced.adjustments.is_empty() || balanced.values != values;
    if config.fail_on_adjustment() && adjusted {
        eprintln!("❌ Buffer values needed adjustment");
        std::process::exit(2);
    }

    Ok(())
}
