//! Epidemic compartmental model with deaths.
//!
//! Implements the SICD model (Susceptible-Infected-Cured-Dead) used for
//! city-level outbreak projections:
//! - Fixed-step explicit Euler integration (`dt = 0.01`)
//! - Removal from the infected compartment splits into cure and death
//! - Trajectories are produced in absolute population counts
//!
//! The state is advanced as fractions of the population. Every step reads a
//! single snapshot of the previous fractions, so the update is a true explicit
//! Euler step and never a cascading one. Conservation is not re-imposed after
//! each step: the drift of `S + I + C + D` away from `N` is a property of the
//! scheme and is reported by [`Trajectory::conservation_drift`].

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::error::{SimError, SimResult};

/// Fixed integration step, in the time unit of `beta` and `gamma`.
pub const DT: f64 = 0.01;

/// Scenario parameters for the SICD model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EpidemicParams {
    /// Total closed population size N.
    pub population: f64,
    /// Transmission coefficient (β): contacts per unit time × infection probability.
    pub beta: f64,
    /// Recovery coefficient (γ): 1 / infectious period.
    pub gamma: f64,
    /// Fraction of removals from the infected compartment that die.
    pub death_fraction: f64,
    /// Initial number of infected individuals.
    pub initial_infected: f64,
    /// Initial number of cured individuals.
    pub initial_cured: f64,
    /// Initial number of dead individuals.
    pub initial_dead: f64,
    /// Time horizon to integrate.
    pub simulation_time: f64,
    /// Available hospital beds (constant reference line).
    pub bed_capacity: f64,
}

impl Default for EpidemicParams {
    fn default() -> Self {
        Self {
            population: 900_000.0,
            beta: 0.3,  // 3 contacts/day × 10% infection probability
            gamma: 0.25, // 4-day infectious period
            death_fraction: 0.04,
            initial_infected: 5_100.0,
            initial_cured: 0.0,
            initial_dead: 0.0,
            simulation_time: 360.0,
            bed_capacity: 5_623.0,
        }
    }
}

impl EpidemicParams {
    /// Check every parameter against its admissible range.
    ///
    /// # Errors
    ///
    /// Returns `SimError::InvalidParameter` for the first violation found.
    pub fn validate(&self) -> SimResult<()> {
        let finite = [
            ("population", self.population),
            ("beta", self.beta),
            ("gamma", self.gamma),
            ("death_fraction", self.death_fraction),
            ("initial_infected", self.initial_infected),
            ("initial_cured", self.initial_cured),
            ("initial_dead", self.initial_dead),
            ("simulation_time", self.simulation_time),
            ("bed_capacity", self.bed_capacity),
        ];
        for (name, value) in finite {
            if !value.is_finite() {
                return Err(SimError::invalid_parameter(name, value, "must be finite"));
            }
        }

        if self.population <= 0.0 {
            return Err(SimError::invalid_parameter(
                "population",
                self.population,
                "must be positive",
            ));
        }
        if self.beta < 0.0 {
            return Err(SimError::invalid_parameter("beta", self.beta, "must be non-negative"));
        }
        if self.gamma < 0.0 {
            return Err(SimError::invalid_parameter(
                "gamma",
                self.gamma,
                "must be non-negative",
            ));
        }
        if !(0.0..=1.0).contains(&self.death_fraction) {
            return Err(SimError::invalid_parameter(
                "death_fraction",
                self.death_fraction,
                "must lie in [0, 1]",
            ));
        }

        let initial = [
            ("initial_infected", self.initial_infected),
            ("initial_cured", self.initial_cured),
            ("initial_dead", self.initial_dead),
        ];
        for (name, value) in initial {
            if value < 0.0 {
                return Err(SimError::invalid_parameter(name, value, "must be non-negative"));
            }
        }
        if self.initial_infected > self.population {
            return Err(SimError::invalid_parameter(
                "initial_infected",
                self.initial_infected,
                format!("exceeds population {}", self.population),
            ));
        }
        let seeded = self.initial_infected + self.initial_cured + self.initial_dead;
        if seeded > self.population {
            return Err(SimError::invalid_parameter(
                "initial_cured + initial_dead",
                self.initial_cured + self.initial_dead,
                format!(
                    "initial compartments sum to {seeded}, exceeding population {}",
                    self.population
                ),
            ));
        }

        if self.simulation_time <= 0.0 {
            return Err(SimError::invalid_parameter(
                "simulation_time",
                self.simulation_time,
                "must be positive",
            ));
        }
        if self.bed_capacity < 0.0 {
            return Err(SimError::invalid_parameter(
                "bed_capacity",
                self.bed_capacity,
                "must be non-negative",
            ));
        }

        Ok(())
    }

    /// Per-capita rate at which infected individuals die.
    #[must_use]
    pub fn mortality_rate(&self) -> f64 {
        self.death_fraction * self.gamma
    }

    /// Per-capita rate at which infected individuals are cured.
    #[must_use]
    pub fn cure_rate(&self) -> f64 {
        self.gamma * (1.0 - self.death_fraction)
    }

    /// Basic reproduction number R0 = β/γ.
    #[must_use]
    pub fn r0(&self) -> f64 {
        self.beta / self.gamma
    }

    /// Number of Euler steps, `floor(simulation_time / DT)`.
    #[must_use]
    pub fn steps(&self) -> usize {
        (self.simulation_time / DT).floor() as usize
    }
}

/// Compartment values at one step.
///
/// Holds fractions of the population inside the integrator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Compartments {
    /// Susceptible.
    pub susceptible: f64,
    /// Infected.
    pub infected: f64,
    /// Cured (mild symptoms, recovered).
    pub cured: f64,
    /// Dead.
    pub dead: f64,
}

impl Compartments {
    /// Sum of all four compartments.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.susceptible + self.infected + self.cured + self.dead
    }
}

/// SICD epidemic model, ready to integrate.
///
/// Construction validates the parameters and derives the cure and mortality
/// rates. [`EpidemicModel::integrate`] consumes the model, so a trajectory is
/// produced exactly once per model.
#[derive(Debug, Clone)]
pub struct EpidemicModel {
    params: EpidemicParams,
    mortality_rate: f64,
    cure_rate: f64,
    initial: Compartments,
}

impl EpidemicModel {
    /// Create a new model from scenario parameters.
    ///
    /// Initial susceptibles are `(N - I0 - C0 - D0) / N`. This differs from
    /// the `(N - I0) / N` form whenever `C0` or `D0` is non-zero.
    ///
    /// # Errors
    ///
    /// Returns `SimError::InvalidParameter` if any parameter is out of range.
    pub fn new(params: EpidemicParams) -> SimResult<Self> {
        params.validate()?;

        let n = params.population;
        let initial = Compartments {
            susceptible: (n - params.initial_infected - params.initial_cured - params.initial_dead)
                / n,
            infected: params.initial_infected / n,
            cured: params.initial_cured / n,
            dead: params.initial_dead / n,
        };

        debug!(
            "SICD model: N={n}, beta={}, gamma={}, death_fraction={}, R0={:.3}, {} steps",
            params.beta,
            params.gamma,
            params.death_fraction,
            params.r0(),
            params.steps()
        );

        Ok(Self {
            mortality_rate: params.mortality_rate(),
            cure_rate: params.cure_rate(),
            params,
            initial,
        })
    }

    /// Get scenario parameters.
    #[must_use]
    pub const fn params(&self) -> &EpidemicParams {
        &self.params
    }

    /// Initial state as fractions of the population.
    #[must_use]
    pub const fn initial_state(&self) -> &Compartments {
        &self.initial
    }

    /// Per-capita death rate, `death_fraction * gamma`.
    #[must_use]
    pub const fn mortality_rate(&self) -> f64 {
        self.mortality_rate
    }

    /// Per-capita cure rate, `gamma * (1 - death_fraction)`.
    #[must_use]
    pub const fn cure_rate(&self) -> f64 {
        self.cure_rate
    }

    /// One explicit Euler step from the previous fractions.
    ///
    /// Every right-hand side reads only `prev`.
    #[inline]
    #[allow(clippy::many_single_char_names)]
    fn euler_step(&self, prev: &Compartments) -> Compartments {
        let beta = self.params.beta;
        let gamma = self.params.gamma;
        let s = prev.susceptible;
        let i = prev.infected;

        Compartments {
            infected: i + (beta * i * s - gamma * i) * DT,
            cured: prev.cured + (self.cure_rate * i) * DT,
            dead: prev.dead + (self.mortality_rate * i) * DT,
            susceptible: s - (beta * i * s) * DT,
        }
    }

    /// Run the fixed-step simulation to completion.
    ///
    /// Integrates `floor(simulation_time / DT)` steps in fractional form, then
    /// scales every compartment by the population once.
    #[must_use]
    pub fn integrate(self) -> Trajectory {
        let steps = self.params.steps();
        let len = steps + 1;

        let mut time = Vec::with_capacity(len);
        let mut susceptible = Vec::with_capacity(len);
        let mut infected = Vec::with_capacity(len);
        let mut cured = Vec::with_capacity(len);
        let mut dead = Vec::with_capacity(len);

        let mut prev = self.initial;
        let mut prev_time = 0.0;
        time.push(prev_time);
        susceptible.push(prev.susceptible);
        infected.push(prev.infected);
        cured.push(prev.cured);
        dead.push(prev.dead);

        for _ in 0..steps {
            let next = self.euler_step(&prev);
            let next_time = prev_time + DT;

            time.push(next_time);
            susceptible.push(next.susceptible);
            infected.push(next.infected);
            cured.push(next.cured);
            dead.push(next.dead);

            prev = next;
            prev_time = next_time;
        }

        let bed_capacity = vec![self.params.bed_capacity; len];

        // Fractions to absolute counts, once.
        let n = self.params.population;
        for series in [&mut susceptible, &mut infected, &mut cured, &mut dead] {
            for value in series.iter_mut() {
                *value *= n;
            }
        }

        let trajectory = Trajectory {
            params: self.params,
            time,
            susceptible,
            infected,
            cured,
            dead,
            bed_capacity,
        };

        info!(
            "Integrated {steps} steps to t={prev_time:.2}: conservation drift {:.3e}",
            trajectory.conservation_drift()
        );

        trajectory
    }
}

/// One row of a trajectory, in absolute counts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrajectoryFrame {
    /// Step index.
    pub index: usize,
    /// Simulation time.
    pub time: f64,
    /// Susceptible count.
    pub susceptible: f64,
    /// Infected count.
    pub infected: f64,
    /// Cured count.
    pub cured: f64,
    /// Dead count.
    pub dead: f64,
    /// Hospital bed capacity (reference line).
    pub bed_capacity: f64,
}

impl TrajectoryFrame {
    /// Sum of all four compartments.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.susceptible + self.infected + self.cured + self.dead
    }
}

/// Finished SICD trajectory in absolute population counts.
///
/// All series have the same length, `floor(simulation_time / DT) + 1`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trajectory {
    params: EpidemicParams,
    time: Vec<f64>,
    susceptible: Vec<f64>,
    infected: Vec<f64>,
    cured: Vec<f64>,
    dead: Vec<f64>,
    bed_capacity: Vec<f64>,
}

impl Trajectory {
    /// Parameters the trajectory was produced from.
    #[must_use]
    pub const fn params(&self) -> &EpidemicParams {
        &self.params
    }

    /// Population size N.
    #[must_use]
    pub const fn population(&self) -> f64 {
        self.params.population
    }

    /// Simulation time at each step.
    #[must_use]
    pub fn time(&self) -> &[f64] {
        &self.time
    }

    /// Susceptible counts.
    #[must_use]
    pub fn susceptible(&self) -> &[f64] {
        &self.susceptible
    }

    /// Infected counts.
    #[must_use]
    pub fn infected(&self) -> &[f64] {
        &self.infected
    }

    /// Cured counts.
    #[must_use]
    pub fn cured(&self) -> &[f64] {
        &self.cured
    }

    /// Dead counts.
    #[must_use]
    pub fn dead(&self) -> &[f64] {
        &self.dead
    }

    /// Bed capacity reference series.
    #[must_use]
    pub fn bed_capacity(&self) -> &[f64] {
        &self.bed_capacity
    }

    /// Number of recorded steps (initial state included).
    #[must_use]
    pub fn len(&self) -> usize {
        self.time.len()
    }

    /// Check if the trajectory has no steps.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    /// Get the row at step `index`.
    #[must_use]
    pub fn frame(&self, index: usize) -> Option<TrajectoryFrame> {
        Some(TrajectoryFrame {
            index,
            time: *self.time.get(index)?,
            susceptible: *self.susceptible.get(index)?,
            infected: *self.infected.get(index)?,
            cured: *self.cured.get(index)?,
            dead: *self.dead.get(index)?,
            bed_capacity: *self.bed_capacity.get(index)?,
        })
    }

    /// Iterate over all rows.
    pub fn frames(&self) -> impl Iterator<Item = TrajectoryFrame> + '_ {
        (0..self.len()).filter_map(|k| self.frame(k))
    }

    /// Last recorded row.
    #[must_use]
    pub fn last_frame(&self) -> Option<TrajectoryFrame> {
        self.len().checked_sub(1).and_then(|k| self.frame(k))
    }

    /// Time and count of the infected peak.
    ///
    /// Ties resolve to the earliest step.
    #[must_use]
    pub fn peak_infected(&self) -> (f64, f64) {
        self.time
            .iter()
            .zip(&self.infected)
            .fold((0.0, f64::NEG_INFINITY), |best, (&t, &i)| {
                if i > best.1 {
                    (t, i)
                } else {
                    best
                }
            })
    }

    /// Largest relative deviation of `S + I + C + D` from the population.
    #[must_use]
    pub fn conservation_drift(&self) -> f64 {
        let n = self.params.population;
        self.frames()
            .map(|f| (f.total() - n).abs() / n)
            .fold(0.0, f64::max)
    }
}


#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn params_strategy() -> impl Strategy<Value = EpidemicParams> {
        (
            1_000.0f64..2_000_000.0,
            0.0f64..2.0,
            0.0f64..1.0,
            0.0f64..=1.0,
            0.0f64..0.5,
            1.0f64..20.0,
        )
            .prop_map(|(population, beta, gamma, death_fraction, infected_share, time)| {
                EpidemicParams {
                    population,
                    beta,
                    gamma,
                    death_fraction,
                    initial_infected: population * infected_share,
                    initial_cured: 0.0,
                    initial_dead: 0.0,
                    simulation_time: time,
                    bed_capacity: 100.0,
                }
            })
    }

    proptest! {
        /// Initial fractions always partition the population.
        #[test]
        fn prop_initial_fractions_sum_to_one(params in params_strategy()) {
            let model = EpidemicModel::new(params).unwrap();
            prop_assert!((model.initial_state().total() - 1.0).abs() < 1e-9);
        }

        /// Every series has floor(T/dt) + 1 entries.
        #[test]
        fn prop_series_lengths(params in params_strategy()) {
            let trajectory = EpidemicModel::new(params).unwrap().integrate();
            let len = params.steps() + 1;
            prop_assert_eq!(trajectory.len(), len);
            prop_assert_eq!(trajectory.susceptible().len(), len);
            prop_assert_eq!(trajectory.infected().len(), len);
            prop_assert_eq!(trajectory.cured().len(), len);
            prop_assert_eq!(trajectory.dead().len(), len);
        }

        /// Susceptibles never increase for non-negative beta.
        #[test]
        fn prop_susceptible_non_increasing(params in params_strategy()) {
            let trajectory = EpidemicModel::new(params).unwrap().integrate();
            for w in trajectory.susceptible().windows(2) {
                prop_assert!(w[1] <= w[0]);
            }
        }

        /// Mortality and cure rates add back to gamma.
        #[test]
        fn prop_rates_split_gamma(params in params_strategy()) {
            let model = EpidemicModel::new(params).unwrap();
            let sum = model.mortality_rate() + model.cure_rate();
            prop_assert!((sum - params.gamma).abs() <= 4.0 * f64::EPSILON * params.gamma.max(1.0));
        }
    }
}
