//! Numerical safety for the integrator.
//!
//! Jidoka guards inspect finished trajectories and stop on anomalies.

pub mod jidoka;

pub use jidoka::{JidokaConfig, JidokaGuard, JidokaWarning, SeverityClassifier, ViolationSeverity};
