//! Configuration management for proxy-buffer-balancer.
//!
//! This module handles loading, merging, and validating configuration from files
//! and CLI arguments. It supports YAML, JSON, and TOML formats.

use crate::cli::{Args, ConfigFormat, LogLevel};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

// Default configuration constants
pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_OUTPUT_FORMAT: &str = "yaml";

const LOG_LEVELS: [&str; 6] = ["off", "error", "warn", "info", "debug", "trace"];
const OUTPUT_FORMATS: [&str; 3] = ["yaml", "json", "toml"];

/// Tool configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Rewrite inconsistent buffer values instead of only reporting them
    #[serde(alias = "auto-adjust")]
    pub auto_adjust: Option<bool>,

    // Logging
    #[serde(alias = "log-level")]
    pub log_level: Option<String>,

    // Output
    /// "yaml" | "json" | "toml"
    #[serde(alias = "output-format")]
    pub output_format: Option<String>,
    /// Print the adjustment log after balancing
    #[serde(alias = "show-adjustments")]
    pub show_adjustments: Option<bool>,
    /// Exit with code 2 when anything had to be adjusted
    #[serde(alias = "fail-on-adjustment")]
    pub fail_on_adjustment: Option<bool>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            auto_adjust: Some(true),
            log_level: Some(DEFAULT_LOG_LEVEL.into()),
            output_format: Some(DEFAULT_OUTPUT_FORMAT.into()),
            show_adjustments: Some(true),
            fail_on_adjustment: Some(false),
        }
    }
}

impl Config {
    pub fn auto_adjust(&self) -> bool {
        self.auto_adjust.unwrap_or(true)
    }

    pub fn show_adjustments(&self) -> bool {
        self.show_adjustments.unwrap_or(true)
    }

    pub fn fail_on_adjustment(&self) -> bool {
        self.fail_on_adjustment.unwrap_or(false)
    }

    /// Effective output format. Only call on a validated config.
    pub fn output_format(&self) -> ConfigFormat {
        match self.output_format.as_deref() {
            Some("json") => ConfigFormat::Json,
            Some("toml") => ConfigFormat::Toml,
            _ => ConfigFormat::Yaml,
        }
    }

    /// Effective log level. Only call on a validated config.
    pub fn log_level(&self) -> LogLevel {
        match self.log_level.as_deref() {
            Some("off") => LogLevel::Off,
            Some("error") => LogLevel::Error,
            Some("warn") => LogLevel::Warn,
            Some("debug") => LogLevel::Debug,
            Some("trace") => LogLevel::Trace,
            _ => LogLevel::Info,
        }
    }
}

/// Validate effective config (used by --check-config and at startup)
pub fn validate_effective_config(cfg: &Config) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(level) = cfg.log_level.as_deref() {
        if !LOG_LEVELS.contains(&level) {
            return Err(format!(
                "Invalid log_level '{}', expected one of: {}",
                level,
                LOG_LEVELS.join(", ")
            )
            .into());
        }
    }

    if let Some(format) = cfg.output_format.as_deref() {
        if !OUTPUT_FORMATS.contains(&format) {
            return Err(format!(
                "Invalid output_format '{}', expected one of: {}",
                format,
                OUTPUT_FORMATS.join(", ")
            )
            .into());
        }
    }

    if cfg.fail_on_adjustment() && !cfg.auto_adjust() {
        // Without auto adjust the only log entry is the "turned off" notice.
        return Err("fail_on_adjustment requires auto_adjust to be enabled".into());
    }

    Ok(())
}

/// Resolves configuration from CLI args, config file, and defaults.
/// This enforces precedence: CLI (if provided) > config file > default.
pub fn resolve_config(args: &Args) -> Result<Config, Box<dyn std::error::Error>> {
    let mut config = if args.no_config {
        Config::default()
    } else {
        load_config(args.config.as_deref())?
    };

    if let Some(level) = &args.log_level {
        config.log_level = Some(log_level_name(level).to_string());
    }

    if args.no_auto_adjust {
        config.auto_adjust = Some(false);
    }

    if args.fail_on_adjustment {
        config.fail_on_adjustment = Some(true);
    }

    Ok(config)
}

fn log_level_name(level: &LogLevel) -> &'static str {
    match level {
        LogLevel::Off => "off",
        LogLevel::Error => "error",
        LogLevel::Warn => "warn",
        LogLevel::Info => "info",
        LogLevel::Debug => "debug",
        LogLevel::Trace => "trace",
    }
}

/// Configuration loading with multiple format support
pub fn load_config(path: Option<&Path>) -> Result<Config, Box<dyn std::error::Error>> {
    let path = if let Some(p) = path {
        PathBuf::from(p)
    } else {
        // Try default locations
        let defaults = [
            "/etc/proxy-buffer-balancer/config.yaml",
            "/etc/proxy-buffer-balancer/config.yml",
            "/etc/proxy-buffer-balancer/config.json",
            "./proxy-buffer-balancer.yaml",
            "./proxy-buffer-balancer.yml",
            "./proxy-buffer-balancer.json",
        ];

        defaults
            .iter()
            .find(|p| Path::new(p).exists())
            .map(PathBuf::from)
            .unwrap_or_default()
    };

    if path.as_os_str().is_empty() || !path.exists() {
        return Ok(Config::default());
    }

    let content = fs::read_to_string(&path)?;

    match path.extension().and_then(|s| s.to_str()) {
        Some("json") => {
            let config: Config = serde_json::from_str(&content)?;
            info!("Loaded JSON configuration from: {}", path.display());
            Ok(config)
        }
        Some("toml") => {
            let config: Config = toml::from_str(&content)?;
            info!("Loaded TOML configuration from: {}", path.display());
            Ok(config)
        }
        _ => {
            // Default to YAML
            let config: Config = serde_yaml::from_str(&content)?;
            info!("Loaded YAML configuration from: {}", path.display());
            Ok(config)
        }
    }
}

/// Shows configuration in requested format
pub fn show_config(config: &Config, format: ConfigFormat) -> Result<(), Box<dyn std::error::Error>> {
    let output = match format {
        ConfigFormat::Json => serde_json::to_string_pretty(config)?,
        ConfigFormat::Toml => toml::to_string_pretty(config)?,
        ConfigFormat::Yaml => serde_yaml::to_string(config)?,
    };

    println!("{output}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::io::Write;

    fn write_temp(suffix: &str, content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(suffix)
            .tempfile()
            .expect("failed to create temp file");
        file.write_all(content.as_bytes())
            .expect("failed to write temp file");
        file
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_effective_config(&Config::default()).is_ok());
    }

    #[test]
    fn test_load_yaml_config() {
        let file = write_temp(".yaml", "auto_adjust: false\nlog-level: debug\n");
        let config = load_config(Some(file.path())).unwrap();
        assert_eq!(config.auto_adjust, Some(false));
        assert_eq!(config.log_level.as_deref(), Some("debug"));
        assert_eq!(config.output_format, None);
    }

    #[test]
    fn test_load_json_and_toml_config() {
        let json = write_temp(".json", r#"{"output_format": "json"}"#);
        let config = load_config(Some(json.path())).unwrap();
        assert_eq!(config.output_format(), ConfigFormat::Json);

        let toml = write_temp(".toml", "show_adjustments = false\n");
        let config = load_config(Some(toml.path())).unwrap();
        assert!(!config.show_adjustments());
    }

    #[test]
    fn test_missing_file_yields_default() {
        let config = load_config(Some(Path::new("/nonexistent/pbb.yaml"))).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let config = Config {
            log_level: Some("loud".into()),
            ..Config::default()
        };
        assert!(validate_effective_config(&config).is_err());

        let config = Config {
            output_format: Some("xml".into()),
            ..Config::default()
        };
        assert!(validate_effective_config(&config).is_err());

        let config = Config {
            auto_adjust: Some(false),
            fail_on_adjustment: Some(true),
            ..Config::default()
        };
        assert!(validate_effective_config(&config).is_err());
    }

    #[test]
    fn test_cli_overrides_file() {
        let file = write_temp(".yaml", "auto_adjust: true\nlog_level: warn\n");
        let path = file.path().to_string_lossy().to_string();
        let args = Args::parse_from([
            "proxy-buffer-balancer",
            "--config",
            path.as_str(),
            "--no-auto-adjust",
            "--log-level",
            "trace",
        ]);

        let config = resolve_config(&args).unwrap();
        assert!(!config.auto_adjust());
        assert_eq!(config.log_level.as_deref(), Some("trace"));
    }
}
