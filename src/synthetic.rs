//! Seeded synthetic turbine registry and weather tables.
//!
//! Used when no input tables are supplied. Identical seeds produce identical
//! tables.

use chrono::{DateTime, Duration, Timelike, Utc};
use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::config::SyntheticConfig;
use crate::energy::normalize_deg;
use crate::geo::{GridCell, GridIndexer};
use crate::registry::TurbineRecord;
use crate::sim::placement::ValidCellSet;
use crate::weather::{Parameter, WeatherRecord};

/// Common turbine models as (capacity kW, rotor diameter m, hub height m).
const MODELS: [(f64, f64, f64); 3] = [(800.0, 52.0, 50.0), (2300.0, 93.0, 80.0), (3600.0, 120.0, 90.0)];

/// Daily temperature swing around the mean (°C).
const DIURNAL_AMPLITUDE_C: f64 = 4.0;
/// Phase shift placing the daily temperature peak at 15:00 (hours).
const DIURNAL_PHASE_H: f64 = 9.0;
/// Per-hour standard deviation of the wind direction random walk (degrees).
const DIRECTION_STEP_STD: f64 = 12.0;
const MAX_WIND_MS: f64 = 40.0;

/// Utility function to generate Gaussian noise using Box-Muller transform.
///
/// # Arguments
///
/// * `rng` - Random number generator
/// * `std_dev` - Standard deviation of the noise
///
/// # Returns
///
/// Random value from a Gaussian distribution with mean 0 and specified standard deviation
pub fn gaussian_noise(rng: &mut StdRng, std_dev: f64) -> f64 {
    if std_dev <= 0.0 {
        return 0.0;
    }

    let u1: f64 = rng.random::<f64>().clamp(1e-12, 1.0);
    let u2: f64 = rng.random::<f64>();
    let z0 = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
    z0 * std_dev
}

/// Generates registry records scattered over landmass cells.
///
/// Each record picks a random land cell and a random position within it,
/// plus one of three common turbine models. Returns an empty table when
/// there is no land.
pub fn generate_registry(
    config: &SyntheticConfig,
    indexer: &GridIndexer,
    land: &ValidCellSet,
    seed: u64,
) -> Vec<TurbineRecord> {
    let cells: Vec<GridCell> = land.iter().copied().collect();
    if cells.is_empty() {
        return Vec::new();
    }
    let mut rng = StdRng::seed_from_u64(seed);
    let (cell_h, cell_w) = cell_size(indexer);

    (0..config.turbines)
        .map(|i| {
            let cell = cells[rng.random_range(0..cells.len())];
            let (lat, lon) = indexer.cell_center(&cell);
            let (capacity, rotor, hub) = MODELS[rng.random_range(0..MODELS.len())];
            TurbineRecord {
                id: Some(format!("T{i:05}")),
                capacity_kw: Some(capacity),
                rotor_diameter_m: Some(rotor),
                hub_height_m: Some(hub + gaussian_noise(&mut rng, 5.0).abs()),
                azimuth_deg: Some(normalize_deg(270.0 + gaussian_noise(&mut rng, 20.0))),
                latitude: Some(lat + (rng.random::<f64>() - 0.5) * 0.8 * cell_h),
                longitude: Some(lon + (rng.random::<f64>() - 0.5) * 0.8 * cell_w),
            }
        })
        .collect()
}

/// Generates hourly observations for stations spread over the landmass.
///
/// Stations sit on evenly spaced land cells in `(x, y)` order. Per station,
/// wind speed follows a mean-reverting AR(1) process
///
/// ```text
/// w(t) = mean + alpha * (w(t-1) - mean) + epsilon(t)
/// ```
///
/// wind direction a Gaussian random walk, and temperature a diurnal sine
/// with noise. Observations cover `start ..= start + hours`.
pub fn generate_weather(
    config: &SyntheticConfig,
    indexer: &GridIndexer,
    land: &ValidCellSet,
    start: DateTime<Utc>,
    hours: u64,
    seed: u64,
) -> Vec<WeatherRecord> {
    let cells: Vec<GridCell> = land.iter().copied().collect();
    let stations = config.stations.min(cells.len());
    if stations == 0 {
        return Vec::new();
    }
    let mut rng = StdRng::seed_from_u64(seed);
    let alpha = config.wind_alpha.clamp(0.0, 1.0);
    let mut rows = Vec::with_capacity(stations * (hours as usize + 1) * Parameter::ALL.len());

    for k in 0..stations {
        let cell = cells[k * cells.len() / stations];
        let (lat, lon) = indexer.cell_center(&cell);
        let station_id = format!("{:05}", 6000 + k);

        let mut wind = config.mean_wind_ms;
        let mut direction = normalize_deg(270.0 + gaussian_noise(&mut rng, 30.0));

        for h in 0..=hours {
            let timestamp = start + Duration::hours(h as i64);
            wind = (config.mean_wind_ms
                + alpha * (wind - config.mean_wind_ms)
                + gaussian_noise(&mut rng, config.wind_noise_std))
            .clamp(0.0, MAX_WIND_MS);
            direction = normalize_deg(direction + gaussian_noise(&mut rng, DIRECTION_STEP_STD));
            let phase = (f64::from(timestamp.hour()) - DIURNAL_PHASE_H) / 24.0 * std::f64::consts::TAU;
            let temperature = config.mean_temp_c + DIURNAL_AMPLITUDE_C * phase.sin() + gaussian_noise(&mut rng, 0.5);

            for (parameter, value) in [
                (Parameter::WindSpeed, wind),
                (Parameter::WindDirection, direction),
                (Parameter::Temperature, temperature),
            ] {
                rows.push(WeatherRecord {
                    station_id: station_id.clone(),
                    timestamp,
                    parameter_id: parameter.id().to_string(),
                    value,
                    latitude: lat,
                    longitude: lon,
                });
            }
        }
    }
    rows
}

/// Cell height and width in degrees.
fn cell_size(indexer: &GridIndexer) -> (f64, f64) {
    let b = indexer.bounds();
    (
        (b.max_lat - b.min_lat) / indexer.height() as f64,
        (b.max_lon - b.min_lon) / indexer.width() as f64,
    )
}
