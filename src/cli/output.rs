//! CLI output formatting.

use crate::config::{presets, ScenarioConfig};
use crate::engine::jidoka::JidokaWarning;
use crate::scenarios::epidemic::DT;
use crate::visualization::{render_summary, EpidemicSummary};

/// Version string, with the git hash when the build captured one.
#[must_use]
pub fn version_string() -> String {
    match option_env!("GIT_HASH") {
        Some(hash) if !hash.is_empty() => {
            let short = hash.get(..8).unwrap_or(hash);
            format!("episim {} ({short})", env!("CARGO_PKG_VERSION"))
        }
        _ => format!("episim {}", env!("CARGO_PKG_VERSION")),
    }
}

/// Print version information.
pub fn print_version() {
    println!("{}", version_string());
}

/// Print help message.
pub fn print_help() {
    println!(
        r"episim - Fixed-step SICD epidemic projections

USAGE:
    episim <COMMAND> [OPTIONS]

COMMANDS:
    run <scenario.yaml>         Run a scenario
    preset <name>               Run a named preset scenario
        --csv <PATH>            Write the trajectory as CSV
        --jsonl <PATH>          Write the trajectory as JSON Lines
        --decimate <N>          Export every N-th step (first and last always kept)
        -v, --verbose           Enable verbose output

    list-presets                List available presets

    help                        Show this help message
    version                     Show version information

EXAMPLES:
    episim run configs/curitiba_isolation.yaml
    episim preset curitiba-isolation --csv curitiba.csv --decimate 100

Set RUST_LOG=debug for diagnostic logging."
    );
}

/// Print the preset listing.
pub fn print_presets() {
    println!("Available presets:");
    for name in presets::names() {
        let description = presets::get(name).map(|c| c.description).unwrap_or_default();
        println!("  {name:<24} {description}");
    }
}

/// Print the run report.
pub fn print_run_report(
    summary: &EpidemicSummary,
    config: &ScenarioConfig,
    warnings: &[JidokaWarning],
    verbose: bool,
) {
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    print!("{}", render_summary(summary, config));
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    if verbose {
        println!("  Steps recorded: {}", summary.steps);
        println!("  Time step:      {}", DT);
    }

    if !warnings.is_empty() {
        println!("\nWarnings:");
        for w in warnings {
            match w {
                JidokaWarning::DriftApproaching { drift, tolerance } => {
                    println!("  ! conservation drift {drift:.3e} near tolerance {tolerance:.3e}");
                }
                JidokaWarning::ConstraintApproaching {
                    name,
                    violation,
                    tolerance,
                } => {
                    println!("  ! {name}: {violation:.3e} near tolerance {tolerance:.3e}");
                }
            }
        }
    }
}
