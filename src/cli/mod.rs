//! CLI module for episim.
//!
//! All CLI logic lives here instead of `main.rs` so it can be tested. The
//! entry point `run_cli` is called from `main.rs` with parsed arguments.

mod args;
mod commands;
mod output;

pub use args::{Args, Command, OutputArgs};
pub use commands::{execute, run_cli, run_preset, run_scenario_file};
pub use output::{print_help, print_presets, print_version, version_string};
