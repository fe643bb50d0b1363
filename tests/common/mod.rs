//! Shared test fixtures for integration tests.

#![allow(dead_code)]

use chrono::{DateTime, Duration, Utc};

use wind_sim::registry::TurbineRecord;
use wind_sim::sim::{SimConfig, SimulationState};
use wind_sim::weather::WeatherRecord;

/// Latitude/longitude of the single-lobe centre cell `(10, 10)`.
pub const CENTER: (f64, f64) = (10.5, 10.5);

/// Single-lobe configuration: 20x20 grid over a 0..20 box, one radius-5
/// lobe at (10, 10), hourly steps from the Unix epoch.
pub fn single_lobe_config(steps: u64) -> SimConfig {
    SimConfig::single_lobe(steps)
}

/// Registry record with only a position.
pub fn turbine_at(lat: f64, lon: f64) -> TurbineRecord {
    TurbineRecord {
        latitude: Some(lat),
        longitude: Some(lon),
        ..Default::default()
    }
}

/// Fully specified registry record.
pub fn turbine(id: &str, lat: f64, lon: f64, capacity_kw: f64, rotor_diameter_m: f64) -> TurbineRecord {
    TurbineRecord {
        id: Some(id.to_string()),
        capacity_kw: Some(capacity_kw),
        rotor_diameter_m: Some(rotor_diameter_m),
        hub_height_m: Some(80.0),
        azimuth_deg: Some(270.0),
        latitude: Some(lat),
        longitude: Some(lon),
    }
}

/// Hourly observations of constant wind speed, direction 270 and 15 °C at
/// one station, covering `epoch ..= epoch + hours`.
pub fn constant_weather(lat: f64, lon: f64, hours: i64, speed: f64) -> Vec<WeatherRecord> {
    let mut rows = Vec::new();
    for h in 0..=hours {
        for (id, value) in [
            ("wind_speed_past1h", speed),
            ("wind_dir_past1h", 270.0),
            ("temp_mean_past1h", 15.0),
        ] {
            rows.push(WeatherRecord {
                station_id: "06180".into(),
                timestamp: epoch() + Duration::hours(h),
                parameter_id: id.into(),
                value,
                latitude: lat,
                longitude: lon,
            });
        }
    }
    rows
}

pub fn epoch() -> DateTime<Utc> {
    DateTime::<Utc>::UNIX_EPOCH
}

/// Initializes a state, panicking on configuration errors.
pub fn initialize(config: SimConfig, turbines: &[TurbineRecord], weather: &[WeatherRecord]) -> SimulationState {
    SimulationState::initialize(config, turbines, weather).expect("initialize")
}
