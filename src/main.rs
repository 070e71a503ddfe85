//! DELTAVV CLI entrypoint.
//!
//! Thin wrapper over the `cli` module: parse args, run the analysis and
//! exports, and exit with an error status on failure.
//! For programmatic use, prefer the library API (`deltavv::api`).

use clap::Parser;

mod cli;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = cli::CliArgs::parse();
    cli::run(args)
}
