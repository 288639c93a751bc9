//! CLI arguments and subcommands for proxy-buffer-balancer.
//!
//! This module defines the command-line interface structure using the clap library,
//! including all flags, options, and subcommands.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Log level options for CLI parsing
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Configuration format options for output
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ConfigFormat {
    Yaml,
    Json,
    Toml,
}

/// Main CLI arguments structure
#[derive(Parser, Debug)]
#[command(
    name = "proxy-buffer-balancer",
    about = "Normalize proxy buffer settings into a combination the proxy accepts",
    long_about = "Normalize proxy buffer settings into a combination the proxy accepts.\n\n\
                  Reshapes proxy_buffers, proxy_buffer_size and proxy_busy_buffers_size so \
                  that the buffering reverse proxy loads them, and reports every adjustment \
                  that was made.",
    version,
    propagate_version = true
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Log level
    #[arg(long, value_enum)]
    pub log_level: Option<LogLevel>,

    /// Config file (YAML/JSON/TOML)
    #[arg(short = 'c', long)]
    pub config: Option<PathBuf>,

    /// Disable all config file loading
    #[arg(long)]
    pub no_config: bool,

    /// Print effective merged config and exit
    #[arg(long)]
    pub show_config: bool,

    /// Output format for --show-config
    #[arg(long, value_enum, default_value = "yaml")]
    pub config_format: ConfigFormat,

    /// Validate config and exit (return code 1 on error)
    #[arg(long)]
    pub check_config: bool,

    /// Report what is wrong but leave the values as they are
    #[arg(long)]
    pub no_auto_adjust: bool,

    /// Exit with code 2 when any value had to be adjusted
    #[arg(long)]
    pub fail_on_adjustment: bool,
}

/// Subcommands for additional functionality
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Balance a single set of buffer values
    Balance {
        /// proxy_buffers, e.g. "8 4k"
        #[arg(long, default_value = "")]
        buffers: String,

        /// proxy_buffer_size, e.g. "4k"
        #[arg(long, default_value = "")]
        buffer_size: String,

        /// proxy_busy_buffers_size, e.g. "8k"
        #[arg(long, default_value = "")]
        busy_buffers_size: String,

        /// Output format (defaults to the configured output_format)
        #[arg(long, value_enum)]
        format: Option<ConfigFormat>,
    },

    /// Balance every upstream in a YAML/JSON/TOML upstream document
    Upstream {
        /// Upstream document to read
        file: PathBuf,

        /// Output file path ("-" for stdout)
        #[arg(short = 'o', long, default_value = "-")]
        output: PathBuf,

        /// Output format (defaults to the input file's format)
        #[arg(long, value_enum)]
        format: Option<ConfigFormat>,
    },

    /// Self-test the solver against random inputs
    Test {
        /// Number of random inputs to check
        #[arg(short = 'n', long, default_value_t = 10_000)]
        iterations: usize,

        /// Seed for the random generator (random if omitted)
        #[arg(long)]
        seed: Option<u64>,

        /// Print every failing input
        #[arg(long)]
        verbose: bool,
    },

    /// Generate a synthetic upstream document
    GenerateTestdata {
        /// Output file path
        #[arg(short = 'o', long, default_value = "upstreams.json")]
        output: PathBuf,

        /// Number of upstreams to generate
        #[arg(long, default_value_t = 24)]
        count: usize,
    },

    /// Generate configuration files
    Config {
        /// Output file path
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,

        /// Output format
        #[arg(long, value_enum, default_value = "yaml")]
        format: ConfigFormat,

        /// Include comments and examples
        #[arg(long)]
        commented: bool,
    },
}
