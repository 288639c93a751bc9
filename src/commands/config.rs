//! Config command implementation.
//!
//! Generates configuration files in various formats.

use std::fs;
use std::path::PathBuf;

use crate::cli::ConfigFormat;
use crate::config::Config;

/// Generates configuration files.
pub fn command_config(
    output: Option<PathBuf>,
    format: ConfigFormat,
    commented: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::default();
    let output = output.unwrap_or_else(|| default_output(format));

    let content = match format {
        ConfigFormat::Json => serde_json::to_string_pretty(&config)?,
        ConfigFormat::Toml => toml::to_string_pretty(&config)?,
        ConfigFormat::Yaml => {
            let mut content = serde_yaml::to_string(&config)?;
            if commented {
                content = add_config_comments(content);
            }
            content
        }
    };

    if output.to_string_lossy() == "-" {
        print!("{}", content);
    } else {
        fs::write(&output, content)?;
        println!("✅ Configuration written to: {}", output.display());
    }

    Ok(())
}

fn default_output(format: ConfigFormat) -> PathBuf {
    let extension = match format {
        ConfigFormat::Yaml => "yaml",
        ConfigFormat::Json => "json",
        ConfigFormat::Toml => "toml",
    };
    PathBuf::from(format!("proxy-buffer-balancer.{extension}"))
}

/// Adds comments to YAML configuration.
fn add_config_comments(yaml: String) -> String {
    let comments = r#"# Proxy Buffer Balancer Configuration
# ===================================
#
# Balancing
# ---------
# auto_adjust: true            # Rewrite buffer values the proxy would reject
# fail_on_adjustment: false    # Exit with code 2 when anything was adjusted
#
# Logging
# -------
# log_level: "info"            # off, error, warn, info, debug, trace
#
# Output
# ------
# output_format: "yaml"        # yaml, json or toml
# show_adjustments: true       # Print the adjustment log after balancing
"#;

    format!("{comments}\n{yaml}")
}
