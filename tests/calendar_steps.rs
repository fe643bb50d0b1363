//! Calendar step resolutions and out-of-box inputs through the engine.

mod common;

use chrono::{DateTime, Duration, TimeZone, Utc};

use wind_sim::energy::Resolution;
use wind_sim::geo::GridCell;
use wind_sim::sim::placement::ValidCellSet;
use wind_sim::weather::WeatherRecord;

use common::{CENTER, constant_weather, epoch, initialize, single_lobe_config, turbine_at};

/// Constant weather at the lobe centre starting at `start` instead of the epoch.
fn weather_from(start: DateTime<Utc>, hours: i64) -> Vec<WeatherRecord> {
    let (lat, lon) = CENTER;
    let shift = start - epoch();
    let mut rows = constant_weather(lat, lon, hours, 10.0);
    for r in &mut rows {
        r.timestamp += shift;
    }
    rows
}

#[test]
fn daily_steps_integrate_whole_days() {
    let (lat, lon) = CENTER;
    let mut config = single_lobe_config(3);
    config.step = Resolution::Daily;
    let mut state = initialize(config, &[turbine_at(lat, lon)], &constant_weather(lat, lon, 72, 10.0));
    let summaries = state.run();
    assert_eq!(summaries.len(), 3);
    assert!(summaries.iter().all(|s| s.produced == 1));

    let rows = state.export_series();
    assert_eq!(rows.len(), 3);
    for (i, r) in rows.iter().enumerate() {
        assert_eq!(r.timestamp, epoch() + Duration::days(i as i64 + 1));
        assert!(r.power_kw > 0.0);
        assert!((r.energy_kwh - r.power_kw * 24.0 * r.efficiency).abs() < 1e-6);
    }
    assert_eq!(rows[0].efficiency, 1.0);
    assert!(rows[1].efficiency < rows[0].efficiency);
    assert!(rows[2].efficiency < rows[1].efficiency);
    assert!((state.agents()[0].age_years() - 72.0 / 8760.0).abs() < 1e-12);

    // each day is reported under the day its window started
    let daily = state.energy_report(Resolution::Daily);
    let starts: Vec<_> = daily.iter().map(|b| b.start).collect();
    assert_eq!(starts, vec![epoch(), epoch() + Duration::days(1), epoch() + Duration::days(2)]);
    for (bucket, row) in daily.iter().zip(&rows) {
        assert!((bucket.energy_kwh - row.cell_energy_kwh).abs() < 1e-6);
    }
}

#[test]
fn weekly_steps_report_under_monday() {
    let (lat, lon) = CENTER;
    let mut config = single_lobe_config(2);
    config.step = Resolution::Weekly;
    let mut state = initialize(config, &[turbine_at(lat, lon)], &constant_weather(lat, lon, 14 * 24, 10.0));
    state.run();

    let rows = state.export_series();
    assert_eq!(rows.len(), 2);
    for r in &rows {
        assert!((r.energy_kwh - r.power_kw * 168.0 * r.efficiency).abs() < 1e-6);
    }

    // 1970-01-01 was a Thursday
    let weekly = state.energy_report(Resolution::Weekly);
    let monday = Utc.with_ymd_and_hms(1969, 12, 29, 0, 0, 0).unwrap();
    let starts: Vec<_> = weekly.iter().map(|b| b.start).collect();
    assert_eq!(starts, vec![monday, monday + Duration::weeks(1)]);
    assert!((weekly.iter().map(|b| b.energy_kwh).sum::<f64>() - state.total_energy_kwh()).abs() < 1e-6);
}

#[test]
fn monthly_steps_clamp_to_month_end() {
    let (lat, lon) = CENTER;
    let start = Utc.with_ymd_and_hms(2024, 1, 31, 0, 0, 0).unwrap();
    let mut config = single_lobe_config(2);
    config.start = start;
    config.step = Resolution::Monthly;
    let mut state = initialize(config, &[turbine_at(lat, lon)], &weather_from(start, 60 * 24));
    state.run();

    let rows = state.export_series();
    assert_eq!(rows.len(), 2);
    let feb29 = Utc.with_ymd_and_hms(2024, 2, 29, 0, 0, 0).unwrap();
    let mar29 = Utc.with_ymd_and_hms(2024, 3, 29, 0, 0, 0).unwrap();
    assert_eq!(rows[0].timestamp, feb29);
    assert_eq!(rows[1].timestamp, mar29);
    // both windows span 29 days
    for r in &rows {
        assert!((r.energy_kwh - r.power_kw * 696.0 * r.efficiency).abs() < 1e-6);
    }

    let monthly = state.energy_report(Resolution::Monthly);
    let starts: Vec<_> = monthly.iter().map(|b| b.start).collect();
    assert_eq!(
        starts,
        vec![
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap(),
        ]
    );
    assert!((monthly[0].energy_kwh - rows[0].cell_energy_kwh).abs() < 1e-6);
    assert!((monthly[1].energy_kwh - rows[1].cell_energy_kwh).abs() < 1e-6);
}

#[test]
fn out_of_box_inputs_are_clamped_and_snapped() {
    let config = single_lobe_config(3);
    let land = ValidCellSet::from_lobes(&config.lobes, config.width, config.height);
    // (-5, 30) clamps onto the south-east corner, which is sea
    let corner = GridCell::new(19, 0);
    assert!(!land.contains(&corner));
    let expected = land.nearest(&corner).unwrap();

    let mut state = initialize(config, &[turbine_at(-5.0, 30.0)], &constant_weather(-5.0, 30.0, 3, 10.0));
    assert_eq!(state.diagnostics().skipped_registry, 0);
    assert_eq!(state.diagnostics().skipped_weather, 0);
    assert_eq!(state.diagnostics().unplaced, 0);
    assert_eq!(state.agents().len(), 1);
    assert_eq!(state.agents()[0].cell, expected);
    assert!(land.contains(&state.agents()[0].cell));

    // the only station sits on the corner cell; the agent reads it through
    // the nearest-cell fallback
    assert!(state.weather().index().cell(&corner).is_some());
    state.run();
    let rows = state.export_series();
    assert_eq!(rows.len(), 3);
    assert!(rows.iter().all(|r| r.cell() == expected));
    assert_eq!(state.diagnostics().gaps, 0);
}
