//! Scenario configuration with YAML schema and validation.
//!
//! Implements Poka-Yoke (mistake-proofing) through:
//! - Type-safe configuration structs
//! - Range validation via `validator`
//! - Runtime semantic validation of cross-field rules
//!
//! A scenario is phrased the way an analyst describes an outbreak: contact
//! rate and infection probability instead of β, infectious period instead of
//! γ. Either form is accepted, never both.

pub mod presets;

use std::path::{Path, PathBuf};

use log::debug;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::engine::jidoka::JidokaConfig;
use crate::error::{SimError, SimResult};
use crate::scenarios::epidemic::EpidemicParams;

/// Top-level scenario configuration.
///
/// Loaded from YAML files with full schema validation.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct ScenarioConfig {
    /// Schema version for forward compatibility.
    #[validate(length(min = 1))]
    #[serde(default = "default_schema_version")]
    pub schema_version: String,

    /// Scenario name.
    #[serde(default)]
    pub name: String,

    /// Free-form description.
    #[serde(default)]
    pub description: String,

    /// Total closed population size.
    #[validate(range(exclusive_min = 0.0))]
    pub population: f64,

    /// How β is given.
    #[validate(nested)]
    pub transmission: TransmissionConfig,

    /// How γ is given.
    #[validate(nested)]
    pub recovery: RecoveryConfig,

    /// Fraction of removals that die.
    #[validate(range(min = 0.0, max = 1.0))]
    pub death_fraction: f64,

    /// Initial compartment counts.
    #[validate(nested)]
    #[serde(default)]
    pub initial: InitialConditions,

    /// Time horizon to integrate.
    #[validate(range(exclusive_min = 0.0))]
    #[serde(default = "default_simulation_time")]
    pub simulation_time: f64,

    /// Available hospital beds.
    #[validate(range(min = 0.0))]
    #[serde(default)]
    pub bed_capacity: f64,

    /// Jidoka (stop-on-error) configuration.
    #[serde(default)]
    pub jidoka: JidokaConfig,

    /// Output configuration.
    #[validate(nested)]
    #[serde(default)]
    pub output: OutputConfig,
}

fn default_schema_version() -> String {
    "1.0".to_string()
}

const fn default_simulation_time() -> f64 {
    21.0
}

impl ScenarioConfig {
    /// Load configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - YAML parsing fails
    /// - Validation fails
    pub fn load<P: AsRef<Path>>(path: P) -> SimResult<Self> {
        let path = path.as_ref();
        debug!("Loading scenario from {}", path.display());
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML string.
    ///
    /// # Errors
    ///
    /// Returns error if parsing or validation fails.
    pub fn from_yaml(yaml: &str) -> SimResult<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;

        // Poka-Yoke: validate all constraints
        config.validate()?;

        // Additional semantic validation
        config.validate_semantic()?;

        Ok(config)
    }

    /// Serialize configuration to YAML.
    ///
    /// # Errors
    ///
    /// Returns error if serialization fails.
    pub fn to_yaml(&self) -> SimResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Create a builder for configuration.
    #[must_use]
    pub fn builder() -> ScenarioConfigBuilder {
        ScenarioConfigBuilder::default()
    }

    /// Validate semantic constraints beyond schema.
    ///
    /// # Errors
    ///
    /// Returns `SimError::Config` if a cross-field rule is broken.
    pub fn validate_semantic(&self) -> SimResult<()> {
        self.transmission.beta()?;
        self.recovery.gamma()?;

        if self.initial.infected > self.population {
            return Err(SimError::config(format!(
                "Initial infected {} exceeds population {}",
                self.initial.infected, self.population
            )));
        }

        if self.output.decimation == 0 {
            return Err(SimError::config("Output decimation must be at least 1"));
        }

        Ok(())
    }

    /// Convert to model parameters.
    ///
    /// # Errors
    ///
    /// Returns `SimError::Config` if β or γ cannot be derived.
    pub fn to_params(&self) -> SimResult<EpidemicParams> {
        Ok(EpidemicParams {
            population: self.population,
            beta: self.transmission.beta()?,
            gamma: self.recovery.gamma()?,
            death_fraction: self.death_fraction,
            initial_infected: self.initial.infected,
            initial_cured: self.initial.cured,
            initial_dead: self.initial.dead,
            simulation_time: self.simulation_time,
            bed_capacity: self.bed_capacity,
        })
    }

    /// Display name, falling back to a placeholder.
    #[must_use]
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            "unnamed scenario"
        } else {
            &self.name
        }
    }
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            name: String::new(),
            description: String::new(),
            population: 900_000.0,
            transmission: TransmissionConfig::default(),
            recovery: RecoveryConfig::default(),
            death_fraction: 0.04,
            initial: InitialConditions::default(),
            simulation_time: default_simulation_time(),
            bed_capacity: 0.0,
            jidoka: JidokaConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

/// Configuration builder for programmatic construction.
#[derive(Debug, Default)]
pub struct ScenarioConfigBuilder {
    config: ScenarioConfig,
}

impl ScenarioConfigBuilder {
    /// Set the scenario name.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.config.name = name.into();
        self
    }

    /// Set the scenario description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.config.description = description.into();
        self
    }

    /// Set the population size.
    #[must_use]
    pub fn population(mut self, population: f64) -> Self {
        self.config.population = population;
        self
    }

    /// Give β as contact rate × infection probability.
    #[must_use]
    pub fn contacts(mut self, contact_rate: f64, infection_probability: f64) -> Self {
        self.config.transmission = TransmissionConfig {
            beta: None,
            contact_rate: Some(contact_rate),
            infection_probability: Some(infection_probability),
        };
        self
    }

    /// Give β directly.
    #[must_use]
    pub fn beta(mut self, beta: f64) -> Self {
        self.config.transmission = TransmissionConfig {
            beta: Some(beta),
            contact_rate: None,
            infection_probability: None,
        };
        self
    }

    /// Give γ as the reciprocal of an infectious period.
    #[must_use]
    pub fn infectious_period(mut self, period: f64) -> Self {
        self.config.recovery = RecoveryConfig {
            gamma: None,
            infectious_period: Some(period),
        };
        self
    }

    /// Give γ directly.
    #[must_use]
    pub fn gamma(mut self, gamma: f64) -> Self {
        self.config.recovery = RecoveryConfig {
            gamma: Some(gamma),
            infectious_period: None,
        };
        self
    }

    /// Set the death fraction.
    #[must_use]
    pub fn death_fraction(mut self, death_fraction: f64) -> Self {
        self.config.death_fraction = death_fraction;
        self
    }

    /// Set initial infected, cured and dead counts.
    #[must_use]
    pub fn initial(mut self, infected: f64, cured: f64, dead: f64) -> Self {
        self.config.initial = InitialConditions {
            infected,
            cured,
            dead,
        };
        self
    }

    /// Set the simulation time horizon.
    #[must_use]
    pub fn simulation_time(mut self, simulation_time: f64) -> Self {
        self.config.simulation_time = simulation_time;
        self
    }

    /// Set the bed capacity reference line.
    #[must_use]
    pub fn bed_capacity(mut self, bed_capacity: f64) -> Self {
        self.config.bed_capacity = bed_capacity;
        self
    }

    /// Set Jidoka configuration.
    #[must_use]
    pub fn jidoka(mut self, config: JidokaConfig) -> Self {
        self.config.jidoka = config;
        self
    }

    /// Build the configuration without validation.
    #[must_use]
    pub fn build(self) -> ScenarioConfig {
        self.config
    }

    /// Build and validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns error if schema or semantic validation fails.
    pub fn try_build(self) -> SimResult<ScenarioConfig> {
        let config = self.config;
        config.validate()?;
        config.validate_semantic()?;
        Ok(config)
    }
}

/// Transmission coefficient, given directly or as contacts × probability.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct TransmissionConfig {
    /// β directly.
    #[validate(range(min = 0.0))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub beta: Option<f64>,
    /// Average contacts per person per unit time.
    #[validate(range(min = 0.0))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_rate: Option<f64>,
    /// Probability that a contact transmits the infection.
    #[validate(range(min = 0.0, max = 1.0))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub infection_probability: Option<f64>,
}

impl TransmissionConfig {
    /// Resolve β.
    ///
    /// # Errors
    ///
    /// Returns `SimError::Config` unless exactly one form is complete.
    pub fn beta(&self) -> SimResult<f64> {
        match (self.beta, self.contact_rate, self.infection_probability) {
            (Some(beta), None, None) => Ok(beta),
            (None, Some(c), Some(p)) => Ok(c * p),
            (Some(_), _, _) => Err(SimError::config(
                "transmission: give either beta or contact_rate/infection_probability, not both",
            )),
            (None, None, None) => Err(SimError::config(
                "transmission: beta or contact_rate/infection_probability is required",
            )),
            (None, _, _) => Err(SimError::config(
                "transmission: contact_rate and infection_probability must be given together",
            )),
        }
    }
}

/// Recovery coefficient, given directly or as an infectious period.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct RecoveryConfig {
    /// γ directly.
    #[validate(range(min = 0.0))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gamma: Option<f64>,
    /// Mean time an individual stays infectious.
    #[validate(range(exclusive_min = 0.0))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub infectious_period: Option<f64>,
}

impl RecoveryConfig {
    /// Resolve γ.
    ///
    /// # Errors
    ///
    /// Returns `SimError::Config` unless exactly one form is given.
    pub fn gamma(&self) -> SimResult<f64> {
        match (self.gamma, self.infectious_period) {
            (Some(gamma), None) => Ok(gamma),
            (None, Some(period)) if period > 0.0 => Ok(1.0 / period),
            (None, Some(period)) => Err(SimError::config(format!(
                "recovery: infectious_period must be positive, got {period}"
            ))),
            (Some(_), Some(_)) => Err(SimError::config(
                "recovery: give either gamma or infectious_period, not both",
            )),
            (None, None) => Err(SimError::config(
                "recovery: gamma or infectious_period is required",
            )),
        }
    }
}

/// Initial compartment counts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct InitialConditions {
    /// Initial infected.
    #[validate(range(min = 0.0))]
    #[serde(default = "default_initial_infected")]
    pub infected: f64,
    /// Initial cured.
    #[validate(range(min = 0.0))]
    #[serde(default)]
    pub cured: f64,
    /// Initial dead.
    #[validate(range(min = 0.0))]
    #[serde(default)]
    pub dead: f64,
}

const fn default_initial_infected() -> f64 {
    1.0
}

impl Default for InitialConditions {
    fn default() -> Self {
        Self {
            infected: default_initial_infected(),
            cured: 0.0,
            dead: 0.0,
        }
    }
}

/// Output configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    /// CSV export path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub csv: Option<PathBuf>,
    /// JSON Lines export path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jsonl: Option<PathBuf>,
    /// Export every n-th step (first and last steps are always kept).
    #[validate(range(min = 1))]
    #[serde(default = "default_decimation")]
    pub decimation: usize,
}

const fn default_decimation() -> usize {
    1
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            csv: None,
            jsonl: None,
            decimation: default_decimation(),
        }
    }
}
