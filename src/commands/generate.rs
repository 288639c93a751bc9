//! Generate testdata command implementation.
//!
//! Generates a synthetic upstream document for exercising the `upstream`
//! command.

use chrono::Utc;
use proxy_buffer_balancer::{Upstream, UpstreamBuffers, UpstreamDocument};
use rand::Rng;
use serde_json::json;
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use tracing::{debug, info};

use crate::config::Config;

// Ranges for generated values
const MAX_BUFFER_NUMBER: i32 = 4096;
const MAX_SIZE_AMOUNT: u32 = 256;
const SERVICE_PORTS: [u16; 4] = [80, 443, 8080, 9000];

/// Generates synthetic test data and writes it to a JSON file.
pub fn command_generate_testdata(
    output: PathBuf,
    count: usize,
    _config: &Config,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("🔧 Generating synthetic upstream document...");

    let mut rng = rand::thread_rng();
    let upstreams: Vec<Upstream> = (0..count)
        .map(|i| random_upstream(&mut rng, i))
        .collect();

    let mut extra = BTreeMap::new();
    extra.insert("version".to_string(), json!("1.0"));
    extra.insert("generated_at".to_string(), json!(Utc::now().to_rfc3339()));

    let document = UpstreamDocument { upstreams, extra };

    let content = serde_json::to_string_pretty(&document)?;
    fs::write(&output, content)?;

    info!(
        "Generated {} upstreams into {}",
        document.upstreams.len(),
        output.display()
    );
    println!("✅ Test data written to: {}", output.display());
    println!("   Upstreams: {}", document.upstreams.len());
    println!(
        "\n💡 Balance it with: proxy-buffer-balancer upstream {}",
        output.display()
    );

    Ok(())
}

fn random_upstream(rng: &mut impl Rng, index: usize) -> Upstream {
    let name = format!("upstream-{}", index);

    // Roughly one in ten upstreams has no buffers and must pass through.
    let buffers = (!rng.gen_bool(0.1)).then(|| UpstreamBuffers {
        number: rng.gen_range(-2..=MAX_BUFFER_NUMBER),
        size: random_size(rng),
    });

    let mut extra = BTreeMap::new();
    extra.insert("service".to_string(), json!(format!("svc-{}", index)));
    extra.insert(
        "port".to_string(),
        json!(SERVICE_PORTS[rng.gen_range(0..SERVICE_PORTS.len())]),
    );

    debug!("generated {} with buffers {:?}", name, buffers);

    Upstream {
        name,
        buffer_size: optional_size(rng),
        busy_buffers_size: optional_size(rng),
        buffers,
        extra,
    }
}

fn optional_size(rng: &mut impl Rng) -> String {
    if rng.gen_bool(0.3) {
        String::new()
    } else {
        random_size(rng)
    }
}

fn random_size(rng: &mut impl Rng) -> String {
    match rng.gen_range(0..20) {
        0 => "invalid".to_string(),
        1 => "0k".to_string(),
        2 => format!("{}g", rng.gen_range(1..=4)),
        3..=6 => format!("{}m", rng.gen_range(1..=8)),
        _ => format!("{}k", rng.gen_range(1..=MAX_SIZE_AMOUNT)),
    }
}
