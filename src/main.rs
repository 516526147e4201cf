//! Performance Tester - Main CLI Application
//!
//! Measures internet latency and throughput against a speed-test endpoint,
//! or local read/write speed in a chosen directory.

use clap::Parser;
use performance_tester::{app::App, cli::Cli};
use std::process;

#[tokio::main]
async fn main() {
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("Application panic: {}", panic_info);
        process::exit(1);
    }));

    let cli = Cli::parse();

    let outcome = match App::new(cli) {
        Ok(app) => app.run().await,
        Err(e) => Err(e),
    };

    // errors were already reported by the app
    if let Err(e) = outcome {
        process::exit(e.exit_code());
    }
}
