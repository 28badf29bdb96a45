//! Presentation of finished trajectories.
//!
//! Reads a [`Trajectory`] and never mutates it:
//! - Export Pipeline: CSV and JSON Lines for external plotting tools
//! - Summary: peak, attack rate and hospital-capacity overflow
//!
//! # Example
//!
//! ```rust
//! use episim::scenarios::epidemic::{EpidemicModel, EpidemicParams};
//! use episim::visualization::{EpidemicSummary, Exporter};
//!
//! let trajectory = EpidemicModel::new(EpidemicParams::default())
//!     .unwrap()
//!     .integrate();
//! let summary = EpidemicSummary::from_trajectory(&trajectory);
//! assert!(summary.peak_infected > 5_100.0);
//!
//! let mut csv = Vec::new();
//! Exporter::new().write_csv(&trajectory, &mut csv).unwrap();
//! ```

use std::fmt::Write as FmtWrite;
use std::fs::File;
use std::io::{BufWriter, Write as IoWrite};
use std::path::Path;

use log::info;
use serde::{Deserialize, Serialize};

use crate::config::ScenarioConfig;
use crate::error::{SimError, SimResult};
use crate::scenarios::epidemic::{Trajectory, DT};

pub use crate::scenarios::epidemic::TrajectoryFrame;

/// Key figures of a finished trajectory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpidemicSummary {
    /// Number of recorded steps.
    pub steps: usize,
    /// Final simulation time.
    pub final_time: f64,
    /// Highest infected count.
    pub peak_infected: f64,
    /// Time of the infected peak.
    pub peak_time: f64,
    /// Susceptible count at the end.
    pub final_susceptible: f64,
    /// Infected count at the end.
    pub final_infected: f64,
    /// Cured count at the end.
    pub final_cured: f64,
    /// Dead count at the end.
    pub final_dead: f64,
    /// Share of the initial susceptibles infected by the end.
    pub attack_rate: f64,
    /// Hospital bed capacity.
    pub bed_capacity: f64,
    /// First time the infected count exceeds bed capacity.
    pub first_overflow_time: Option<f64>,
    /// Total time spent above bed capacity.
    pub time_above_capacity: f64,
    /// Largest relative deviation of `S + I + C + D` from the population.
    pub conservation_drift: f64,
}

impl EpidemicSummary {
    /// Summarize a trajectory.
    #[must_use]
    pub fn from_trajectory(trajectory: &Trajectory) -> Self {
        let (peak_time, peak_infected) = trajectory.peak_infected();
        let last = trajectory.last_frame();
        let beds = trajectory.params().bed_capacity;

        let s0 = trajectory.susceptible().first().copied().unwrap_or(0.0);
        let s_end = last.map_or(s0, |f| f.susceptible);
        let attack_rate = if s0 > 0.0 { 1.0 - s_end / s0 } else { 0.0 };

        let first_overflow_time = trajectory
            .time()
            .iter()
            .zip(trajectory.infected())
            .find(|&(_, &i)| i > beds)
            .map(|(&t, _)| t);
        let steps_above = trajectory
            .infected()
            .iter()
            .skip(1)
            .filter(|&&i| i > beds)
            .count();

        Self {
            steps: trajectory.len(),
            final_time: last.map_or(0.0, |f| f.time),
            peak_infected,
            peak_time,
            final_susceptible: s_end,
            final_infected: last.map_or(0.0, |f| f.infected),
            final_cured: last.map_or(0.0, |f| f.cured),
            final_dead: last.map_or(0.0, |f| f.dead),
            attack_rate,
            bed_capacity: beds,
            first_overflow_time,
            time_above_capacity: steps_above as f64 * DT,
            conservation_drift: trajectory.conservation_drift(),
        }
    }

    /// Check if the infected count ever exceeds bed capacity.
    #[must_use]
    pub const fn overflows_capacity(&self) -> bool {
        self.first_overflow_time.is_some()
    }
}

/// Render the text block printed after a run.
///
/// Labels follow the projection chart: contact rate, infection probability
/// and mortality in percent, and the bed reference line.
#[must_use]
pub fn render_summary(summary: &EpidemicSummary, config: &ScenarioConfig) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "Scenario: {}", config.display_name());
    if !config.description.is_empty() {
        let _ = writeln!(out, "  {}", config.description);
    }
    let _ = writeln!(out);

    if let (Some(c), Some(p)) = (
        config.transmission.contact_rate,
        config.transmission.infection_probability,
    ) {
        let _ = writeln!(out, "  Average social contact:  {c} people per day");
        let _ = writeln!(out, "  Infection probability:   {}%", p * 100.0);
    } else if let Ok(beta) = config.transmission.beta() {
        let _ = writeln!(out, "  Transmission (beta):     {beta}");
    }
    if let Ok(gamma) = config.recovery.gamma() {
        let _ = writeln!(out, "  Recovery (gamma):        {gamma}");
    }
    let _ = writeln!(out, "  Mortality:               {}%", config.death_fraction * 100.0);
    let _ = writeln!(out, "  Population:              {:.0}", config.population);
    let _ = writeln!(out);

    let _ = writeln!(
        out,
        "  Peak infected:           {:.0} at t = {:.2}",
        summary.peak_infected, summary.peak_time
    );
    let _ = writeln!(
        out,
        "  Final (t = {:.2}):       S={:.0} I={:.0} C={:.0} D={:.0}",
        summary.final_time,
        summary.final_susceptible,
        summary.final_infected,
        summary.final_cured,
        summary.final_dead
    );
    let _ = writeln!(out, "  Attack rate:             {:.2}%", summary.attack_rate * 100.0);
    match summary.first_overflow_time {
        Some(t) => {
            let _ = writeln!(
                out,
                "  Beds ({:.0}):             exceeded from t = {t:.2}, {:.2} time units above capacity",
                summary.bed_capacity, summary.time_above_capacity
            );
        }
        None => {
            let _ = writeln!(out, "  Beds ({:.0}):             never exceeded", summary.bed_capacity);
        }
    }
    let _ = writeln!(out, "  Conservation drift:      {:.3e}", summary.conservation_drift);

    out
}

/// Export format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExportFormat {
    /// CSV format.
    Csv,
    /// JSON Lines format (one frame per line).
    JsonLines,
}

/// Export configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Output format.
    pub format: ExportFormat,
    /// Decimation factor (1 = every step, 2 = every other, etc.).
    pub decimation: usize,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            format: ExportFormat::Csv,
            decimation: 1,
        }
    }
}

/// Exporter for trajectory data.
#[derive(Debug, Clone, Default)]
pub struct Exporter {
    config: ExportConfig,
}

impl Exporter {
    /// Create new exporter with default config.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with custom config.
    #[must_use]
    pub const fn with_config(config: ExportConfig) -> Self {
        Self { config }
    }

    /// Rows selected by the decimation factor. The last row is always kept.
    fn selected<'a>(&self, trajectory: &'a Trajectory) -> impl Iterator<Item = TrajectoryFrame> + 'a {
        let step = self.config.decimation.max(1);
        let last = trajectory.len().saturating_sub(1);
        trajectory
            .frames()
            .filter(move |f| f.index % step == 0 || f.index == last)
    }

    /// Write trajectory as CSV.
    ///
    /// # Errors
    ///
    /// Returns error if writing fails.
    pub fn write_csv<W: IoWrite>(&self, trajectory: &Trajectory, writer: W) -> SimResult<()> {
        let mut writer = BufWriter::new(writer);

        writeln!(writer, "index,time,susceptible,infected,cured,dead,bed_capacity")
            .map_err(|e| SimError::io(format!("Write header failed: {e}")))?;

        for frame in self.selected(trajectory) {
            writeln!(
                writer,
                "{},{},{},{},{},{},{}",
                frame.index,
                frame.time,
                frame.susceptible,
                frame.infected,
                frame.cured,
                frame.dead,
                frame.bed_capacity
            )
            .map_err(|e| SimError::io(format!("Write data failed: {e}")))?;
        }

        writer
            .flush()
            .map_err(|e| SimError::io(format!("Flush failed: {e}")))?;

        Ok(())
    }

    /// Write trajectory as JSON Lines.
    ///
    /// # Errors
    ///
    /// Returns error if serialization or writing fails.
    pub fn write_json_lines<W: IoWrite>(&self, trajectory: &Trajectory, writer: W) -> SimResult<()> {
        let mut writer = BufWriter::new(writer);

        for frame in self.selected(trajectory) {
            let json = serde_json::to_string(&frame)
                .map_err(|e| SimError::serialization(format!("JSON serialization failed: {e}")))?;
            writeln!(writer, "{json}").map_err(|e| SimError::io(format!("Write failed: {e}")))?;
        }

        writer
            .flush()
            .map_err(|e| SimError::io(format!("Flush failed: {e}")))?;

        Ok(())
    }

    /// Export trajectory to a CSV file.
    ///
    /// # Errors
    ///
    /// Returns error if file operations fail.
    pub fn to_csv(&self, trajectory: &Trajectory, path: &Path) -> SimResult<()> {
        let file = create(path)?;
        self.write_csv(trajectory, file)?;
        info!("Wrote CSV trajectory to {}", path.display());
        Ok(())
    }

    /// Export trajectory to a JSON Lines file.
    ///
    /// # Errors
    ///
    /// Returns error if file operations fail.
    pub fn to_json_lines(&self, trajectory: &Trajectory, path: &Path) -> SimResult<()> {
        let file = create(path)?;
        self.write_json_lines(trajectory, file)?;
        info!("Wrote JSON Lines trajectory to {}", path.display());
        Ok(())
    }

    /// Export using configured format.
    ///
    /// # Errors
    ///
    /// Returns error if export fails.
    pub fn export(&self, trajectory: &Trajectory, path: &Path) -> SimResult<()> {
        match self.config.format {
            ExportFormat::Csv => self.to_csv(trajectory, path),
            ExportFormat::JsonLines => self.to_json_lines(trajectory, path),
        }
    }
}

fn create(path: &Path) -> SimResult<File> {
    File::create(path).map_err(|e| SimError::io(format!("Failed to create {}: {e}", path.display())))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::config::presets;
    use crate::scenarios::epidemic::{EpidemicModel, EpidemicParams};
    use tempfile::tempdir;

    fn short() -> Trajectory {
        EpidemicModel::new(EpidemicParams {
            simulation_time: 1.0,
            ..EpidemicParams::default()
        })
        .unwrap()
        .integrate()
    }

    fn reference() -> Trajectory {
        EpidemicModel::new(EpidemicParams::default()).unwrap().integrate()
    }

    #[test]
    fn test_summary_reference_scenario() {
        let summary = EpidemicSummary::from_trajectory(&reference());
        assert_eq!(summary.steps, 36_001);
        assert!((summary.final_time - 360.0).abs() < 1e-6);
        assert!(summary.peak_infected > 5_100.0);
        assert!(summary.final_infected < summary.peak_infected);
        assert!(summary.attack_rate > 0.0 && summary.attack_rate < 1.0);
        assert!(summary.overflows_capacity());
        assert!(summary.time_above_capacity > 0.0);
        assert!(summary.first_overflow_time.unwrap() > 0.0);
        assert!(summary.conservation_drift < 1e-6);
    }

    #[test]
    fn test_summary_without_overflow() {
        let trajectory = EpidemicModel::new(EpidemicParams {
            bed_capacity: 900_000.0,
            simulation_time: 10.0,
            ..EpidemicParams::default()
        })
        .unwrap()
        .integrate();
        let summary = EpidemicSummary::from_trajectory(&trajectory);
        assert!(!summary.overflows_capacity());
        assert!(summary.time_above_capacity.abs() < f64::EPSILON);
    }

    #[test]
    fn test_render_summary_labels() {
        let config = presets::curitiba_isolation();
        let summary = EpidemicSummary::from_trajectory(&reference());
        let text = render_summary(&summary, &config);
        assert!(text.contains("curitiba-isolation"));
        assert!(text.contains("3 people per day"));
        assert!(text.contains("Infection probability"));
        assert!(text.contains("Mortality"));
        assert!(text.contains("4%"));
        assert!(text.contains("Beds (5623)"));
        assert!(text.contains("Peak infected"));
    }

    #[test]
    fn test_write_csv() {
        let trajectory = short();
        let mut buf = Vec::new();
        Exporter::new().write_csv(&trajectory, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "index,time,susceptible,infected,cured,dead,bed_capacity");
        assert_eq!(lines.len(), trajectory.len() + 1);
        assert!(lines[1].starts_with("0,0,"));
        assert!(lines[1].ends_with(",5623"));
    }

    #[test]
    fn test_write_csv_decimated_keeps_last_row() {
        let trajectory = short(); // 101 rows
        let exporter = Exporter::with_config(ExportConfig {
            format: ExportFormat::Csv,
            decimation: 30,
        });
        let mut buf = Vec::new();
        exporter.write_csv(&trajectory, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let indices: Vec<usize> = text
            .lines()
            .skip(1)
            .map(|l| l.split(',').next().unwrap().parse().unwrap())
            .collect();
        assert_eq!(indices, vec![0, 30, 60, 90, 100]);
    }

    #[test]
    fn test_write_json_lines() {
        let trajectory = short();
        let mut buf = Vec::new();
        Exporter::new()
            .write_json_lines(&trajectory, &mut buf)
            .unwrap();
        let text = String::from_utf8(buf).unwrap();
        let first: TrajectoryFrame = serde_json::from_str(text.lines().next().unwrap()).unwrap();
        assert_eq!(first, trajectory.frame(0).unwrap());
        assert_eq!(text.lines().count(), trajectory.len());
    }

    #[test]
    fn test_export_to_files() {
        let dir = tempdir().unwrap();
        let trajectory = short();

        let csv_path = dir.path().join("curve.csv");
        Exporter::new().export(&trajectory, &csv_path).unwrap();
        let content = std::fs::read_to_string(&csv_path).unwrap();
        assert!(content.starts_with("index,time"));

        let jsonl_path = dir.path().join("curve.jsonl");
        let exporter = Exporter::with_config(ExportConfig {
            format: ExportFormat::JsonLines,
            decimation: 1,
        });
        exporter.export(&trajectory, &jsonl_path).unwrap();
        assert!(jsonl_path.exists());
    }

    #[test]
    fn test_export_to_missing_directory_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing").join("curve.csv");
        let err = Exporter::new().to_csv(&short(), &path).unwrap_err();
        assert!(matches!(err, SimError::Io(_)));
    }
}
