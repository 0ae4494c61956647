// Allow dead code for items that are part of the library API but only used in tests
#![allow(dead_code)]

mod catalog;
mod cmd;
mod config;
mod extractor;
mod graph;
mod json_schema;
mod model;
mod progress;

use clap::Parser;
use cmd::Cli;

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = cmd::run(cli) {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

/// Warnings by default; `-v` for info, `-vv` and up for debug. RUST_LOG wins.
fn init_logging(verbose: u8) {
    let default_filter = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .init();
}
