//! Reproducibility and numerical-safety hypotheses.
//!
//! Each test states a null hypothesis and the falsification it attempts.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use episim::prelude::*;

fn run(params: EpidemicParams) -> Trajectory {
    EpidemicModel::new(params).unwrap().integrate()
}

// H0: Two runs of the same scenario can differ
// Falsification: Integrate twice, compare serialized frames bitwise
#[test]
fn h0_1_identical_parameters_produce_identical_output() {
    let a = run(EpidemicParams::default());
    let b = run(EpidemicParams::default());

    let serialize = |t: &Trajectory| {
        t.frames()
            .map(|f| serde_json::to_string(&f).unwrap())
            .collect::<Vec<_>>()
    };
    assert_eq!(serialize(&a), serialize(&b));
}

// H0: The step count drifts from floor(T / dt) under binary rounding
// Falsification: Horizons that are exact multiples of dt
#[test]
fn h0_2_step_count_is_exact_for_round_horizons() {
    for (horizon, expected) in [(0.01, 2), (1.0, 101), (21.0, 2_101), (360.0, 36_001)] {
        let params = EpidemicParams {
            simulation_time: horizon,
            ..EpidemicParams::default()
        };
        assert_eq!(run(params).len(), expected, "horizon {horizon}");
    }
}

// H0: Fractional horizons round up to the nearest step
// Falsification: 0.29 / 0.01 and 1.13 / 0.01 fall just below an integer
#[test]
fn h0_2b_fractional_horizons_truncate() {
    for (horizon, expected) in [(0.29, 29), (1.13, 113)] {
        let params = EpidemicParams {
            simulation_time: horizon,
            ..EpidemicParams::default()
        };
        let trajectory = run(params);
        assert_eq!(trajectory.len(), expected, "horizon {horizon}");
        let last = trajectory.time()[expected - 1];
        assert!(last < horizon - 0.005, "horizon {horizon} ends at {last}");
    }
}

// H0: The time axis is recomputed rather than accumulated
// Falsification: the reference run must end where repeated `+ dt` lands
#[test]
fn h0_2c_time_axis_accumulates() {
    let trajectory = run(EpidemicParams::default());
    let mut expected = 0.0_f64;
    for &t in trajectory.time() {
        assert_eq!(t.to_bits(), expected.to_bits());
        expected += DT;
    }
    let last = trajectory.time()[trajectory.len() - 1];
    assert!((last - 359.999_999_999_817_6).abs() < 1e-9);
}

// H0: A horizon shorter than one step still integrates
// Falsification: T < dt must yield the initial snapshot only
#[test]
fn h0_3_sub_step_horizon_yields_initial_state_only() {
    let params = EpidemicParams {
        simulation_time: 0.005,
        ..EpidemicParams::default()
    };
    let trajectory = run(params);
    assert_eq!(trajectory.len(), 1);
    assert!((trajectory.infected()[0] - 5_100.0).abs() < 1e-9);
}

// H0: Zero transmission still spreads infection
// Falsification: beta = 0, susceptible pool must stay constant
#[test]
fn h0_4_zero_transmission_freezes_susceptible() {
    let params = EpidemicParams {
        beta: 0.0,
        ..EpidemicParams::default()
    };
    let trajectory = run(params);
    let s0 = trajectory.susceptible()[0];
    assert!(trajectory
        .susceptible()
        .iter()
        .all(|&s| (s - s0).abs() < 1e-6));
    assert!(trajectory.infected()[trajectory.len() - 1] < trajectory.infected()[0]);
}

// H0: Removals split inconsistently between cured and dead
// Falsification: with I0 only and beta = 0, D / (C + D) must equal d
#[test]
fn h0_5_removals_split_by_death_fraction() {
    let params = EpidemicParams {
        beta: 0.0,
        simulation_time: 30.0,
        ..EpidemicParams::default()
    };
    let trajectory = run(params);
    let last = trajectory.last_frame().unwrap();
    let ratio = last.dead / (last.dead + last.cured);
    assert!((ratio - 0.04).abs() < 1e-9);
}

// H0: An unstable step size goes unnoticed
// Falsification: large beta with the default guard must stop the line
#[test]
fn h0_6_jidoka_stops_unstable_integration() {
    let params = EpidemicParams {
        beta: 500.0,
        gamma: 0.0,
        initial_infected: 450_000.0,
        simulation_time: 0.02,
        ..EpidemicParams::default()
    };
    let trajectory = run(params);
    let err = JidokaGuard::default().check(&trajectory).unwrap_err();
    assert!(err.is_jidoka_violation());
}
