//! CLI command implementations for proxy-buffer-balancer.
//!
//! This module provides implementations for all CLI subcommands:
//! - `balance`: Balance one set of buffer values
//! - `upstream`: Balance every upstream in a document
//! - `test`: Randomized solver self-test
//! - `generate`: Test data generation
//! - `config`: Configuration file generation

pub mod balance;
pub mod config;
pub mod generate;
pub mod test;
pub mod upstream;

// Re-export command functions
pub use balance::command_balance;
pub use config::command_config;
pub use generate::command_generate_testdata;
pub use test::command_test;
pub use upstream::command_upstream;

use serde::Serialize;

use crate::cli::ConfigFormat;

/// Serializes command output in the requested format.
///
/// TOML goes through `toml::Value` so plain values are emitted ahead of
/// tables regardless of field order.
pub fn render<T: Serialize>(
    value: &T,
    format: ConfigFormat,
) -> Result<String, Box<dyn std::error::Error>> {
    let output = match format {
        ConfigFormat::Json => serde_json::to_string_pretty(value)?,
        ConfigFormat::Toml => toml::to_string_pretty(&toml::Value::try_from(value)?)?,
        ConfigFormat::Yaml => serde_yaml::to_string(value)?,
    };
    Ok(output)
}
