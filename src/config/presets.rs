//! Named scenario presets.
//!
//! Curitiba projections from the 19/03/2020 health bulletin (17 confirmed
//! cases). Both presets share the city and disease parameters and differ in
//! social contact.

use crate::config::ScenarioConfig;

const CURITIBA_POPULATION: f64 = 900_000.0;
const CURITIBA_INITIAL_INFECTED: f64 = 5_100.0;
const CURITIBA_BEDS: f64 = 5_623.0;
const COVID_INFECTION_PROBABILITY: f64 = 0.10;
const COVID_INFECTIOUS_PERIOD: f64 = 4.0;
const COVID_MORTALITY: f64 = 0.04;

/// Preset names, in listing order.
const NAMES: [&str; 2] = ["curitiba-isolation", "curitiba-no-isolation"];

/// List available preset names.
#[must_use]
pub fn names() -> &'static [&'static str] {
    &NAMES
}

/// Look up a preset by name.
#[must_use]
pub fn get(name: &str) -> Option<ScenarioConfig> {
    match name {
        "curitiba-isolation" => Some(curitiba_isolation()),
        "curitiba-no-isolation" => Some(curitiba_no_isolation()),
        _ => None,
    }
}

/// Curitiba under social isolation: 3 contacts per day.
#[must_use]
pub fn curitiba_isolation() -> ScenarioConfig {
    curitiba(
        "curitiba-isolation",
        "Curitiba SARS-CoV-2 projection, isolation control",
        3.0,
    )
}

/// Curitiba without isolation: 6 contacts per day.
///
/// Illustrative counterpart to the isolation projection. The bulletin
/// projection only covers 3 contacts per day; the doubled contact rate is
/// an assumption for comparison.
#[must_use]
pub fn curitiba_no_isolation() -> ScenarioConfig {
    curitiba(
        "curitiba-no-isolation",
        "Illustrative: Curitiba with doubled contacts (6/day), no isolation",
        6.0,
    )
}

fn curitiba(name: &str, description: &str, contact_rate: f64) -> ScenarioConfig {
    ScenarioConfig::builder()
        .name(name)
        .description(description)
        .population(CURITIBA_POPULATION)
        .contacts(contact_rate, COVID_INFECTION_PROBABILITY)
        .infectious_period(COVID_INFECTIOUS_PERIOD)
        .death_fraction(COVID_MORTALITY)
        .initial(CURITIBA_INITIAL_INFECTED, 0.0, 0.0)
        .simulation_time(360.0)
        .bed_capacity(CURITIBA_BEDS)
        .build()
}
