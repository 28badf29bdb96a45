//! # episim
//!
//! Fixed-step SICD epidemic projections.
//!
//! A closed population is split into Susceptible, Infected, Cured and Dead
//! compartments and advanced with explicit Euler at `dt = 0.01`:
//! - Poka-Yoke: parameters and YAML scenarios are validated before integration
//! - Jidoka: trajectories are checked for non-finite values, negative
//!   compartments and population drift
//!
//! ## Example
//!
//! ```rust
//! use episim::prelude::*;
//!
//! let model = EpidemicModel::new(EpidemicParams::default()).unwrap();
//! let trajectory = model.integrate();
//! assert_eq!(trajectory.len(), 36_001);
//! ```

#![forbid(unsafe_code)]
#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![warn(clippy::pedantic, clippy::nursery)]
#![allow(
    clippy::module_name_repetitions,
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::suboptimal_flops,
    clippy::imprecise_flops,
    clippy::too_many_lines,
    clippy::missing_const_for_fn,
)]

pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod scenarios;
pub mod visualization;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::config::{ScenarioConfig, ScenarioConfigBuilder};
    pub use crate::engine::jidoka::{JidokaConfig, JidokaGuard, JidokaWarning};
    pub use crate::error::{SimError, SimResult};
    pub use crate::scenarios::epidemic::{
        Compartments, EpidemicModel, EpidemicParams, Trajectory, TrajectoryFrame, DT,
    };
    pub use crate::visualization::{EpidemicSummary, ExportFormat, Exporter};
}

/// Re-export for public API
pub use error::{SimError, SimResult};
