//! Jidoka (自働化) - Autonomous anomaly detection.
//!
//! Inspects a finished SICD trajectory for numerical defects and stops the
//! line when one is found.
//!
//! # Anomaly Types
//!
//! 1. **Non-finite values**: NaN or Inf in any series
//! 2. **Negative compartments**: a count below zero beyond tolerance
//! 3. **Conservation drift**: `S + I + C + D` deviates from `N`
//!
//! # Severity Levels
//!
//! - **Acceptable**: Within tolerance, continue normally
//! - **Warning**: Approaching tolerance, log and continue
//! - **Critical**: Tolerance exceeded, stop the line
//! - **Fatal**: Unrecoverable state, halt immediately
//!
//! The guard never modifies the trajectory. Explicit Euler drift is measured,
//! not corrected.

use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::{SimError, SimResult};
use crate::scenarios::epidemic::Trajectory;

/// Severity levels for Jidoka violations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ViolationSeverity {
    /// Acceptable variance within tolerance (continue).
    Acceptable,
    /// Warning: approaching tolerance boundary (log, continue).
    Warning,
    /// Critical: tolerance exceeded (stop the line).
    Critical,
    /// Fatal: unrecoverable state (halt immediately).
    Fatal,
}

/// Warning from Jidoka inspection (non-critical issue).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum JidokaWarning {
    /// Conservation drift approaching tolerance.
    DriftApproaching {
        /// Current relative drift.
        drift: f64,
        /// Tolerance threshold.
        tolerance: f64,
    },
    /// Compartment approaching a negative count.
    ConstraintApproaching {
        /// Constraint name.
        name: String,
        /// Current violation amount.
        violation: f64,
        /// Tolerance threshold.
        tolerance: f64,
    },
}

/// Classifier for graduated Jidoka responses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeverityClassifier {
    /// Warning threshold as fraction of tolerance (e.g., 0.8 = warn at 80%).
    pub warning_fraction: f64,
}

impl Default for SeverityClassifier {
    fn default() -> Self {
        Self {
            warning_fraction: 0.8,
        }
    }
}

impl SeverityClassifier {
    /// Create a new severity classifier.
    #[must_use]
    pub const fn new(warning_fraction: f64) -> Self {
        Self { warning_fraction }
    }

    /// Classify a non-negative deviation against its tolerance.
    #[must_use]
    pub fn classify(&self, deviation: f64, tolerance: f64) -> ViolationSeverity {
        let deviation = deviation.abs();
        if deviation.is_nan() || deviation.is_infinite() {
            ViolationSeverity::Fatal
        } else if deviation > tolerance {
            ViolationSeverity::Critical
        } else if deviation > tolerance * self.warning_fraction {
            ViolationSeverity::Warning
        } else {
            ViolationSeverity::Acceptable
        }
    }
}

/// Jidoka guard configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JidokaConfig {
    /// NaN/Inf detection enabled.
    pub check_finite: bool,
    /// Enable conservation check.
    pub check_conservation: bool,
    /// Maximum allowed relative drift of `S + I + C + D` from `N`.
    pub conservation_tolerance: f64,
    /// Allowed negative overshoot of a compartment, relative to `N`.
    pub constraint_tolerance: f64,
    /// Severity classifier for graduated responses.
    pub severity_classifier: SeverityClassifier,
}

impl Default for JidokaConfig {
    fn default() -> Self {
        Self {
            check_finite: true,
            check_conservation: true,
            conservation_tolerance: 1e-6,
            constraint_tolerance: 1e-9,
            severity_classifier: SeverityClassifier::default(),
        }
    }
}

/// Jidoka guard for autonomous anomaly detection.
///
/// # Example
///
/// ```rust
/// use episim::engine::jidoka::{JidokaConfig, JidokaGuard};
/// use episim::scenarios::epidemic::{EpidemicModel, EpidemicParams};
///
/// let trajectory = EpidemicModel::new(EpidemicParams::default())
///     .unwrap()
///     .integrate();
/// let guard = JidokaGuard::new(JidokaConfig::default());
///
/// // The reference scenario is numerically clean
/// assert!(guard.check(&trajectory).is_ok());
/// ```
#[derive(Debug, Clone, Default)]
pub struct JidokaGuard {
    config: JidokaConfig,
}

impl JidokaGuard {
    /// Create a new Jidoka guard with given configuration.
    #[must_use]
    pub const fn new(config: JidokaConfig) -> Self {
        Self { config }
    }

    /// Get configuration.
    #[must_use]
    pub const fn config(&self) -> &JidokaConfig {
        &self.config
    }

    /// Check a trajectory for anomalies.
    ///
    /// # Errors
    ///
    /// Returns `SimError` if any anomaly is detected:
    /// - `NonFiniteValue`: NaN or Inf found
    /// - `ConstraintViolation`: negative compartment or conservation drift
    pub fn check(&self, trajectory: &Trajectory) -> SimResult<()> {
        if self.config.check_finite {
            check_finite(trajectory)?;
        }

        self.check_non_negative(trajectory)?;

        if self.config.check_conservation {
            self.check_conservation(trajectory)?;
        }

        Ok(())
    }

    /// Check and collect warnings for values approaching their tolerances.
    ///
    /// # Errors
    ///
    /// Returns `SimError` on critical or fatal violations, as [`Self::check`].
    pub fn inspect(&self, trajectory: &Trajectory) -> SimResult<Vec<JidokaWarning>> {
        self.check(trajectory)?;

        let mut warnings = Vec::new();
        let classifier = &self.config.severity_classifier;

        if self.config.check_conservation {
            let drift = trajectory.conservation_drift();
            let tolerance = self.config.conservation_tolerance;
            if classifier.classify(drift, tolerance) == ViolationSeverity::Warning {
                warn!("Conservation drift {drift:.3e} approaching tolerance {tolerance:.3e}");
                warnings.push(JidokaWarning::DriftApproaching { drift, tolerance });
            }
        }

        let tolerance = self.config.constraint_tolerance;
        for (name, series) in named_series(trajectory) {
            let violation = most_negative(series) / trajectory.population();
            if violation < 0.0
                && classifier.classify(violation, tolerance) == ViolationSeverity::Warning
            {
                let name = format!("{name}_non_negative");
                warn!("Constraint '{name}' approaching tolerance: {violation:.3e}");
                warnings.push(JidokaWarning::ConstraintApproaching {
                    name,
                    violation,
                    tolerance,
                });
            }
        }

        Ok(warnings)
    }

    fn check_non_negative(&self, trajectory: &Trajectory) -> SimResult<()> {
        let tolerance = self.config.constraint_tolerance;
        for (name, series) in named_series(trajectory) {
            let violation = most_negative(series) / trajectory.population();
            if violation < -tolerance {
                return Err(SimError::ConstraintViolation {
                    name: format!("{name}_non_negative"),
                    violation,
                    tolerance,
                });
            }
        }
        Ok(())
    }

    fn check_conservation(&self, trajectory: &Trajectory) -> SimResult<()> {
        let drift = trajectory.conservation_drift();
        let tolerance = self.config.conservation_tolerance;
        match self.config.severity_classifier.classify(drift, tolerance) {
            ViolationSeverity::Critical | ViolationSeverity::Fatal => {
                Err(SimError::ConstraintViolation {
                    name: "population_conserved".to_string(),
                    violation: drift,
                    tolerance,
                })
            }
            ViolationSeverity::Acceptable | ViolationSeverity::Warning => Ok(()),
        }
    }
}

fn named_series(trajectory: &Trajectory) -> [(&'static str, &[f64]); 4] {
    [
        ("susceptible", trajectory.susceptible()),
        ("infected", trajectory.infected()),
        ("cured", trajectory.cured()),
        ("dead", trajectory.dead()),
    ]
}

fn most_negative(series: &[f64]) -> f64 {
    series.iter().copied().fold(0.0, f64::min)
}

fn check_finite(trajectory: &Trajectory) -> SimResult<()> {
    let series = [
        ("time", trajectory.time()),
        ("susceptible", trajectory.susceptible()),
        ("infected", trajectory.infected()),
        ("cured", trajectory.cured()),
        ("dead", trajectory.dead()),
        ("bed_capacity", trajectory.bed_capacity()),
    ];
    for (name, values) in series {
        if let Some(k) = values.iter().position(|v| !v.is_finite()) {
            return Err(SimError::NonFiniteValue {
                location: format!("{name}[{k}]"),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::scenarios::epidemic::{EpidemicModel, EpidemicParams};

    fn run(params: EpidemicParams) -> Trajectory {
        EpidemicModel::new(params).unwrap().integrate()
    }

    fn short() -> EpidemicParams {
        EpidemicParams {
            simulation_time: 20.0,
            ..EpidemicParams::default()
        }
    }

    #[test]
    fn test_severity_classifier() {
        let classifier = SeverityClassifier::default();
        assert_eq!(classifier.classify(0.1, 1.0), ViolationSeverity::Acceptable);
        assert_eq!(classifier.classify(0.9, 1.0), ViolationSeverity::Warning);
        assert_eq!(classifier.classify(1.5, 1.0), ViolationSeverity::Critical);
        assert_eq!(classifier.classify(f64::NAN, 1.0), ViolationSeverity::Fatal);
        assert_eq!(
            classifier.classify(f64::INFINITY, 1.0),
            ViolationSeverity::Fatal
        );
        assert_eq!(classifier.classify(-0.9, 1.0), ViolationSeverity::Warning);
    }

    #[test]
    fn test_severity_ordering() {
        assert!(ViolationSeverity::Acceptable < ViolationSeverity::Warning);
        assert!(ViolationSeverity::Warning < ViolationSeverity::Critical);
        assert!(ViolationSeverity::Critical < ViolationSeverity::Fatal);
    }

    #[test]
    fn test_reference_scenario_passes() {
        let guard = JidokaGuard::default();
        let trajectory = run(EpidemicParams::default());
        assert!(guard.check(&trajectory).is_ok());
        assert!(guard.inspect(&trajectory).unwrap().is_empty());
    }

    #[test]
    fn test_unstable_step_is_stopped() {
        // beta * dt > 1 drives S below zero in a single step.
        let params = EpidemicParams {
            beta: 500.0,
            gamma: 0.0,
            initial_infected: 450_000.0,
            simulation_time: 0.02,
            ..short()
        };
        let guard = JidokaGuard::default();
        let err = guard.check(&run(params)).unwrap_err();
        assert!(err.is_jidoka_violation());
        assert!(err.to_string().contains("susceptible_non_negative"));
    }

    #[test]
    fn test_overflow_reports_non_finite() {
        let params = EpidemicParams {
            beta: 1e300,
            gamma: 0.0,
            initial_infected: 450_000.0,
            ..short()
        };
        let guard = JidokaGuard::default();
        let err = guard.check(&run(params)).unwrap_err();
        assert!(matches!(err, SimError::NonFiniteValue { .. }));
    }

    #[test]
    fn test_zero_tolerance_flags_rounding_drift() {
        let guard = JidokaGuard::new(JidokaConfig {
            conservation_tolerance: 0.0,
            ..JidokaConfig::default()
        });
        let trajectory = run(EpidemicParams::default());
        if trajectory.conservation_drift() > 0.0 {
            let err = guard.check(&trajectory).unwrap_err();
            assert!(err.to_string().contains("population_conserved"));
        }
    }

    #[test]
    fn test_disabled_checks() {
        let guard = JidokaGuard::new(JidokaConfig {
            check_finite: false,
            check_conservation: false,
            conservation_tolerance: 0.0,
            ..JidokaConfig::default()
        });
        assert!(guard.check(&run(short())).is_ok());
    }

    #[test]
    fn test_config_roundtrip_defaults() {
        let config: JidokaConfig = serde_yaml::from_str("conservation_tolerance: 1.0e-3").unwrap();
        assert!((config.conservation_tolerance - 1e-3).abs() < f64::EPSILON);
        assert!(config.check_finite);
        assert!((config.severity_classifier.warning_fraction - 0.8).abs() < f64::EPSILON);
    }
}
