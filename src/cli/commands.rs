//! CLI command handlers.

use std::path::Path;
use std::process::ExitCode;

use log::{debug, info};

use super::args::OutputArgs;
use super::output::{print_help, print_presets, print_run_report, print_version};
use super::{Args, Command};
use crate::config::{presets, ScenarioConfig};
use crate::engine::jidoka::JidokaGuard;
use crate::error::{SimError, SimResult};
use crate::scenarios::epidemic::{EpidemicModel, Trajectory};
use crate::visualization::{EpidemicSummary, ExportConfig, ExportFormat, Exporter};

/// Main CLI entry point.
///
/// Dispatches to the appropriate command handler based on parsed arguments.
#[must_use]
pub fn run_cli(args: Args) -> ExitCode {
    match args.command {
        Command::Run {
            scenario_path,
            output,
        } => run_scenario_file(&scenario_path, &output),
        Command::Preset { name, output } => run_preset(&name, &output),
        Command::ListPresets => {
            print_presets();
            ExitCode::SUCCESS
        }
        Command::Help => {
            print_help();
            ExitCode::SUCCESS
        }
        Command::Version => {
            print_version();
            ExitCode::SUCCESS
        }
    }
}

/// Run a scenario loaded from a YAML file.
#[must_use]
pub fn run_scenario_file(path: &Path, output: &OutputArgs) -> ExitCode {
    report(ScenarioConfig::load(path).and_then(|config| execute(&config, output)))
}

/// Run a named preset.
#[must_use]
pub fn run_preset(name: &str, output: &OutputArgs) -> ExitCode {
    let config = presets::get(name).ok_or_else(|| {
        SimError::config(format!(
            "Unknown preset '{name}'. Available: {}",
            presets::names().join(", ")
        ))
    });
    report(config.and_then(|config| execute(&config, output)))
}

fn report<T>(result: SimResult<T>) -> ExitCode {
    match result {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::from(1)
        }
    }
}

/// Build, integrate, guard, summarize and export one scenario.
///
/// # Errors
///
/// Returns the first `SimError` raised along the way.
pub fn execute(config: &ScenarioConfig, output: &OutputArgs) -> SimResult<Trajectory> {
    info!("Running scenario '{}'", config.display_name());

    let model = EpidemicModel::new(config.to_params()?)?;
    let trajectory = model.integrate();

    let guard = JidokaGuard::new(config.jidoka.clone());
    let warnings = guard.inspect(&trajectory)?;

    let summary = EpidemicSummary::from_trajectory(&trajectory);
    print_run_report(&summary, config, &warnings, output.verbose);

    let decimation = output.decimation.unwrap_or(config.output.decimation);
    let csv = output.csv.as_ref().or(config.output.csv.as_ref());
    let jsonl = output.jsonl.as_ref().or(config.output.jsonl.as_ref());

    for (path, format) in [(csv, ExportFormat::Csv), (jsonl, ExportFormat::JsonLines)] {
        if let Some(path) = path {
            debug!("Exporting {format:?} every {decimation} steps");
            Exporter::with_config(ExportConfig { format, decimation }).export(&trajectory, path)?;
            println!("Wrote {}", path.display());
        }
    }

    Ok(trajectory)
}
