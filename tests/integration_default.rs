//! End-to-end runs of the single-lobe scenario.

mod common;

use wind_sim::energy::Resolution;
use wind_sim::geo::{GridCell, build_outline, fill_interior};
use wind_sim::sim::types::SeriesRow;

use common::{CENTER, constant_weather, initialize, single_lobe_config, turbine, turbine_at};

/// One representative turbine on the lobe centre, 10 m/s wind aligned with
/// the rotor, 24 hourly steps.
fn run_default() -> (wind_sim::sim::SimulationState, Vec<SeriesRow>) {
    let (lat, lon) = CENTER;
    let mut state = initialize(
        single_lobe_config(24),
        &[turbine_at(lat, lon)],
        &constant_weather(lat, lon, 24, 10.0),
    );
    state.run();
    let rows = state.export_series();
    (state, rows)
}

#[test]
fn single_lobe_fill_has_expected_shape() {
    let interior = fill_interior(&build_outline(&[wind_sim::geo::Lobe::new(10, 10, 5.0, 5.0)]), 20, 20);
    assert_eq!(interior.len(), 47);
    assert!(interior.contains(&GridCell::new(10, 10)));
    assert!(!interior.contains(&GridCell::new(0, 0)));
    assert!(interior.iter().all(|c| c.x < 20 && c.y < 20));
}

#[test]
fn full_run_produces_one_row_per_step() {
    let (state, rows) = run_default();
    assert_eq!(state.agents().len(), 1);
    assert_eq!(rows.len(), 24);
    assert!(rows.iter().all(|r| r.cell() == GridCell::new(10, 10)));
    assert_eq!(state.diagnostics().gaps, 0);
}

#[test]
fn cumulative_energy_is_bounded_and_non_decreasing() {
    let (state, rows) = run_default();
    let rated_kw = state.agents()[0].spec.rated_kw;

    assert!(rows[0].cumulative_kwh > 0.0);
    for pair in rows.windows(2) {
        assert!(pair[1].cumulative_kwh >= pair[0].cumulative_kwh);
    }
    let last = rows.last().unwrap().cumulative_kwh;
    assert!(last <= rated_kw * 24.0);
    assert!((last - state.agents()[0].cumulative_kwh()).abs() < 1e-9);
}

#[test]
fn export_is_idempotent() {
    let (state, rows) = run_default();
    assert_eq!(rows, state.export_series());
    assert_eq!(state.export_series(), state.export_series());
}

#[test]
fn energy_report_matches_series_total() {
    let (state, _) = run_default();
    let daily = state.energy_report(Resolution::Daily);
    assert_eq!(daily.len(), 1);
    assert!((daily[0].energy_kwh - state.total_energy_kwh()).abs() < 1e-6);

    let hourly = state.energy_report(Resolution::Hourly);
    assert_eq!(hourly.len(), 24);
    assert!(hourly.windows(2).all(|w| w[0].start < w[1].start));
}

#[test]
fn scaling_factor_multiplies_cell_energy() {
    let (lat, lon) = CENTER;
    let turbines = vec![
        turbine("A", lat, lon, 2000.0, 90.0),
        turbine("B", lat - 0.2, lon + 0.2, 2000.0, 90.0),
        turbine("C", lat + 0.2, lon - 0.2, 2000.0, 90.0),
    ];
    let mut state = initialize(single_lobe_config(4), &turbines, &constant_weather(lat, lon, 4, 9.0));
    state.run();

    assert_eq!(state.agents().len(), 1);
    assert_eq!(state.agents()[0].scaling_factor, 3.0);
    for r in state.export_series() {
        assert!((r.cell_energy_kwh - 3.0 * r.energy_kwh).abs() < 1e-9);
    }
}

#[test]
fn wind_from_behind_produces_nothing() {
    let (lat, lon) = CENTER;
    let mut weather = constant_weather(lat, lon, 6, 10.0);
    for r in weather.iter_mut().filter(|r| r.parameter_id == "wind_dir_past1h") {
        r.value = 90.0;
    }
    let mut state = initialize(single_lobe_config(6), &[turbine_at(lat, lon)], &weather);
    state.run();
    let rows = state.export_series();
    assert_eq!(rows.len(), 6);
    assert!(rows.iter().all(|r| r.power_kw == 0.0));
    assert_eq!(state.total_energy_kwh(), 0.0);
}

#[test]
fn agent_retires_after_service_life() {
    let (lat, lon) = CENTER;
    let mut config = single_lobe_config(10);
    config.agent.service_life_years = 5.5 / 8760.0;
    let mut state = initialize(config, &[turbine_at(lat, lon)], &constant_weather(lat, lon, 10, 10.0));
    let summaries = state.run();

    assert_eq!(state.export_series().len(), 6);
    assert_eq!(summaries.iter().map(|s| s.retired).sum::<usize>(), 4);
    assert_eq!(state.diagnostics().retired, 1);
    assert!(!state.agents()[0].is_operational());
}

#[test]
fn steps_past_weather_coverage_are_gaps() {
    let (lat, lon) = CENTER;
    // observations at hours 0, 1 and 2 only
    let mut state = initialize(
        single_lobe_config(200),
        &[turbine_at(lat, lon)],
        &constant_weather(lat, lon, 2, 10.0),
    );
    let summaries = state.run();
    assert_eq!(summaries.len(), 200);

    // windows ending at 1h, 2h and 3h still contain an observation
    let rows = state.export_series();
    assert_eq!(rows.iter().map(|r| r.step).collect::<Vec<_>>(), vec![0, 1, 2]);
    assert!(summaries[..3].iter().all(|s| s.produced == 1 && s.gaps == 0));
    assert!(summaries[3..].iter().all(|s| s.produced == 0 && s.gaps == 1));
    assert_eq!(state.diagnostics().gaps, 197);
    assert_eq!(state.agents()[0].gaps(), 197);

    let produced: f64 = rows.iter().map(|r| r.cell_energy_kwh).sum();
    assert!((state.total_energy_kwh() - produced).abs() < 1e-9);
}

#[test]
fn gaps_are_counted_not_fatal() {
    let (lat, lon) = CENTER;
    let mut empty = initialize(single_lobe_config(3), &[turbine_at(lat, lon)], &[]);
    let summaries = empty.run();
    assert_eq!(summaries.len(), 3);
    assert_eq!(empty.diagnostics().gaps, 3);
    assert!(empty.export_series().is_empty());
}
