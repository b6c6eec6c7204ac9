//! packingslipper – print the latest store order as a packing slip label.
//!
//! Usage:
//!   packingslipper [--outfile packingslip.pdf] [--offset N] [--config FILE]
//!                  [--secrets FILE] [--verbose]
//!
//! Config and secrets default to `~/.config/packingslipper/`. Any failure is
//! logged and the process exits with status 1; no PDF is written.

use std::process;

use clap::Parser;
use env_logger::Env;

use packing_slipper::cli::Cli;

fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose { "info" } else { "warn" };
    env_logger::Builder::from_env(Env::default().default_filter_or(level)).init();

    if let Err(e) = packing_slipper::run(&cli) {
        log::error!("{e}");
        process::exit(1);
    }
}
