//! Upstream command implementation.
//!
//! Balances the buffer fields of every upstream in a document and writes the
//! document back out.

use anyhow::Context;
use proxy_buffer_balancer::{balance_upstream, BalanceError, UpstreamDocument};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::cli::ConfigFormat;
use crate::commands::render;
use crate::config::Config;

/// Balances every upstream in `file`.
pub fn command_upstream(
    file: PathBuf,
    output: PathBuf,
    format: Option<ConfigFormat>,
    config: &Config,
) -> Result<(), Box<dyn std::error::Error>> {
    let (mut document, input_format) = load_document(&file)?;
    info!(
        "Loaded {} upstreams from: {}",
        document.upstreams.len(),
        file.display()
    );

    let adjusted_upstreams = balance_document(&mut document, config)?;

    let content = render(&document, format.unwrap_or(input_format))?;

    if output.to_string_lossy() == "-" {
        print!("{}", content);
    } else {
        fs::write(&output, content)
            .with_context(|| format!("failed to write {}", output.display()))?;
        println!("✅ Balanced upstreams written to: {}", output.display());
    }

    info!(
        "{} of {} upstreams were adjusted",
        adjusted_upstreams,
        document.upstreams.len()
    );

    if config.fail_on_adjustment() && adjusted_upstreams > 0 {
        eprintln!("❌ {} upstreams needed adjustment", adjusted_upstreams);
        std::process::exit(2);
    }

    Ok(())
}

/// Balances every upstream in `document` and returns how many of them changed.
///
/// An upstream counts as changed when the solver logged an entry or when its
/// fields were rewritten without one, such as a normalized size or a raised
/// busy buffer.
pub fn balance_document(
    document: &mut UpstreamDocument,
    config: &Config,
) -> Result<usize, BalanceError> {
    let auto_adjust = config.auto_adjust();
    let mut adjusted_upstreams = 0;

    for upstream in &mut document.upstreams {
        let before = upstream.clone();
        let log = balance_upstream(upstream, auto_adjust)?;

        if !auto_adjust || (log.is_empty() && *upstream == before) {
            debug!("upstream '{}': no adjustments", upstream.name);
            continue;
        }

        adjusted_upstreams += 1;
        for entry in &log {
            info!("upstream '{}': {}", upstream.name, entry);
            if config.show_adjustments() {
                eprintln!("upstream '{}': {}", upstream.name, entry);
            }
        }
    }

    Ok(adjusted_upstreams)
}

/// Reads an upstream document, picking the parser by file extension.
pub fn load_document(path: &Path) -> anyhow::Result<(UpstreamDocument, ConfigFormat)> {
    let content =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;

    let format = format_for_path(path);
    let document: UpstreamDocument = match format {
        ConfigFormat::Json => serde_json::from_str(&content).map_err(anyhow::Error::from),
        ConfigFormat::Toml => toml::from_str(&content).map_err(anyhow::Error::from),
        ConfigFormat::Yaml => serde_yaml::from_str(&content).map_err(anyhow::Error::from),
    }
    .with_context(|| format!("failed to parse upstream document {}", path.display()))?;

    Ok((document, format))
}

fn format_for_path(path: &Path) -> ConfigFormat {
    match path.extension().and_then(|s| s.to_str()) {
        Some("json") => ConfigFormat::Json,
        Some("toml") => ConfigFormat::Toml,
        _ => ConfigFormat::Yaml,
    }
}
