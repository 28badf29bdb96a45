//! Simulation scenarios.
//!
//! - Epidemic model (SICD, fixed-step Euler)

pub mod epidemic;

pub use epidemic::{Compartments, EpidemicModel, EpidemicParams, Trajectory, TrajectoryFrame};
