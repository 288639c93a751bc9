//! proxy-buffer-balancer - version 0.1.0
//!
//! Command-line front end for the proxy buffer normalization engine.
//! This is the main entry point that initializes logging and handles subcommands.

mod cli;
mod commands;
mod config;

use clap::Parser;
use tracing::{info, Level};

use cli::{Args, Commands, LogLevel};
use commands::{
    command_balance, command_config, command_generate_testdata, command_test, command_upstream,
};
use config::{resolve_config, show_config, validate_effective_config, Config};

/// Initializes tracing logging subsystem with configured log level.
fn setup_logging(config: &Config) {
    let level = config.log_level();
    let log_level = match level {
        LogLevel::Off => return,
        LogLevel::Error => Level::ERROR,
        LogLevel::Warn => Level::WARN,
        LogLevel::Info => Level::INFO,
        LogLevel::Debug => Level::DEBUG,
        LogLevel::Trace => Level::TRACE,
    };

    // Logs go to stderr so command output on stdout stays parseable.
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return;
    }

    info!("Logging initialized with level: {:?}", level);
}

/// Helper function to load and validate configuration.
/// Exits the process with error code 1 if validation fails.
fn load_validated_config(args: &Args) -> Result<Config, Box<dyn std::error::Error>> {
    let config = resolve_config(args)?;
    if let Err(e) = validate_effective_config(&config) {
        eprintln!("❌ Configuration invalid: {}", e);
        std::process::exit(1);
    }
    Ok(config)
}

/// Main application entry point.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Early config resolution for show/check modes
    if args.show_config || args.check_config {
        let config = resolve_config(&args)?;

        if args.check_config {
            if let Err(e) = validate_effective_config(&config) {
                eprintln!("❌ Configuration invalid: {}", e);
                std::process::exit(1);
            }
            println!("✅ Configuration is valid");
            return Ok(());
        }

        return show_config(&config, args.config_format);
    }

    // Config generation must not depend on an existing config being valid
    if let Some(Commands::Config {
        output,
        format,
        commented,
    }) = &args.command
    {
        return command_config(output.clone(), *format, *commented);
    }

    let config = load_validated_config(&args)?;
    setup_logging(&config);

    let Some(command) = args.command else {
        eprintln!("No command given, see --help");
        std::process::exit(1);
    };

    match command {
        Commands::Balance {
            buffers,
            buffer_size,
            busy_buffers_size,
            format,
        } => command_balance(buffers, buffer_size, busy_buffers_size, format, &config),

        Commands::Upstream {
            file,
            output,
            format,
        } => command_upstream(file, output, format, &config),

        Commands::Test {
            iterations,
            seed,
            verbose,
        } => command_test(iterations, seed, verbose, &config),

        Commands::GenerateTestdata { output, count } => {
            command_generate_testdata(output, count, &config)
        }

        Commands::Config { .. } => unreachable!("Config handled above"),
    }
}
