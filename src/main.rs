//! episim CLI
//!
//! Command-line interface for running epidemic scenarios.

use std::process::ExitCode;

use episim::cli::{run_cli, Args};

fn main() -> ExitCode {
    pretty_env_logger::init();
    run_cli(Args::parse())
}
