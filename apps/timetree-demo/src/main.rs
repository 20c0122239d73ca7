//! Demo workload for timetree.
//!
//! Simulates a small request pipeline on a rayon pool and prints the
//! collected statistics.
//!
//! # Usage
//!
//! ```bash
//! cargo run -p timetree-demo
//! cargo run -p timetree-demo -- --requests 500
//! TIMETREE_CORES=4 RUST_LOG=debug cargo run -p timetree-demo
//! ```

use std::thread;
use std::time::Duration;

use rayon::prelude::*;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Default number of simulated requests.
const DEFAULT_REQUESTS: u64 = 200;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let requests = parse_args();

    let config = timetree::Config::from_env()?;
    info!("Profiling {} requests on {} cores", requests, config.available_cores);
    timetree::init(config)?;

    let pipeline = timetree::group("pipeline");
    pipeline.set_builder(pipeline.builder().composite(true).multi_threaded());

    let cache = timetree::group("cache");
    cache.set_builder(cache.builder().retain_samples(true));

    (0..requests).into_par_iter().for_each(|id| {
        let request = pipeline.profile("request");
        let timer = request.start_timer();

        request.measure(|| work(id, 1));
        {
            timetree::profile_scope!(request, "decode");
            work(id, 2);
        }

        let lookup = cache.profile("lookup").start_timer();
        if id % 3 == 0 {
            work(id, 4);
            lookup.stop_as(["miss"]);
        } else {
            lookup.stop_as(["hit"]);
        }

        let stage = if id % 5 == 0 { "slow-path" } else { "fast-path" };
        timer.stop_as([stage]);
    });

    timetree::print();
    Ok(())
}

/// Sleep for a small, request-dependent time.
fn work(id: u64, scale: u64) {
    thread::sleep(Duration::from_micros((id % 7 + 1) * 50 * scale));
}

fn parse_args() -> u64 {
    let args: Vec<String> = std::env::args().collect();
    let mut requests = DEFAULT_REQUESTS;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--requests" | "-n" => {
                if i + 1 < args.len() {
                    if let Ok(n) = args[i + 1].parse() {
                        requests = n;
                    }
                    i += 1;
                }
            }
            "--help" => {
                println!("timetree demo");
                println!();
                println!("Usage: timetree-demo [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -n, --requests <N>  Number of simulated requests (default: 200)");
                println!("      --help          Show this help message");
                std::process::exit(0);
            }
            _ => {}
        }
        i += 1;
    }

    requests
}
