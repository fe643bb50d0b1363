//! TOML-based scenario configuration and preset definitions.

use std::fs;
use std::path::Path;

use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use thiserror::Error;

use crate::devices::{AgentSettings, TurbineType};
use crate::energy::Resolution;
use crate::error::{SimError, SimResult};
use crate::geo::{GridBounds, Lobe};
use crate::sim::types::SimConfig;

/// Top-level scenario configuration parsed from TOML.
///
/// All fields have defaults matching the `denmark` preset. Load from TOML
/// with [`ScenarioConfig::from_toml_file`] or pick a preset with
/// [`ScenarioConfig::from_preset`].
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioConfig {
    /// Clock and reporting parameters.
    #[serde(default)]
    pub simulation: SimulationConfig,
    /// Grid size and geographic bounding box.
    #[serde(default)]
    pub grid: GridConfig,
    /// Landmass lobes.
    #[serde(default)]
    pub outline: OutlineConfig,
    /// Turbine class and fleet settings.
    #[serde(default)]
    pub turbine: TurbineConfig,
    /// Weather lookup parameters.
    #[serde(default)]
    pub weather: WeatherConfig,
    /// Synthetic input generation, used when no input tables are given.
    #[serde(default)]
    pub synthetic: SyntheticConfig,
}

/// Clock and reporting parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    /// Clock time before the first tick (RFC 3339).
    pub start: String,
    /// Number of ticks (must be > 0).
    pub steps: u64,
    /// Step size: `hourly`, `daily`, `weekly` or `monthly`.
    pub step: String,
    /// Energy report bucket size, same choices as `step`.
    pub reporting: String,
    /// Master random seed.
    pub seed: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            start: "2024-01-01T00:00:00Z".to_string(),
            steps: 24,
            step: "hourly".to_string(),
            reporting: "daily".to_string(),
            seed: 42,
        }
    }
}

/// Grid size and the geographic box projected onto it.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GridConfig {
    pub width: usize,
    pub height: usize,
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl Default for GridConfig {
    fn default() -> Self {
        let b = GridBounds::denmark();
        Self {
            width: 70,
            height: 70,
            min_lat: b.min_lat,
            max_lat: b.max_lat,
            min_lon: b.min_lon,
            max_lon: b.max_lon,
        }
    }
}

impl GridConfig {
    pub fn bounds(&self) -> GridBounds {
        GridBounds {
            min_lat: self.min_lat,
            max_lat: self.max_lat,
            min_lon: self.min_lon,
            max_lon: self.max_lon,
        }
    }
}

/// Landmass outline as a union of lobes.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutlineConfig {
    pub lobes: Vec<LobeConfig>,
}

impl Default for OutlineConfig {
    fn default() -> Self {
        Self {
            lobes: vec![
                // Jutland
                LobeConfig::new(15, 25, 15.0, 40.0, 0.0),
                // Djursland
                LobeConfig::new(30, 35, 7.0, 5.0, 5.0),
                // Zealand
                LobeConfig::new(58, 17, 12.0, 16.0, 0.0),
                // Funen
                LobeConfig::new(37, 12, 7.0, 6.0, -20.0),
            ],
        }
    }
}

/// One landmass lobe.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LobeConfig {
    pub center_x: i64,
    pub center_y: i64,
    pub radius_x: f64,
    pub radius_y: f64,
    /// Counter-clockwise rotation (degrees).
    pub rotation_deg: f64,
    /// Polygon corners (must be >= 3).
    pub corners: usize,
}

impl Default for LobeConfig {
    fn default() -> Self {
        Self::new(0, 0, 0.0, 0.0, 0.0)
    }
}

impl LobeConfig {
    fn new(center_x: i64, center_y: i64, radius_x: f64, radius_y: f64, rotation_deg: f64) -> Self {
        Self {
            center_x,
            center_y,
            radius_x,
            radius_y,
            rotation_deg,
            corners: 8,
        }
    }

    pub fn to_lobe(&self) -> Lobe {
        Lobe {
            corners: self.corners,
            ..Lobe::new(self.center_x, self.center_y, self.radius_x, self.radius_y).rotated(self.rotation_deg)
        }
    }
}

/// Turbine class and fleet-wide agent settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TurbineConfig {
    /// `small`, `standard`, `large` or `offshore`.
    pub turbine_type: String,
    /// Rotor power coefficient (0.0-0.593).
    pub power_coefficient: f64,
    /// Rotor orientation where the registry reports none (degrees).
    pub azimuth_deg: f64,
    /// Overrides the class cut-in speed (m/s).
    pub cut_in_ms: Option<f64>,
    /// Overrides the class cut-out speed (m/s).
    pub cut_out_ms: Option<f64>,
    /// Age at which agents retire (years).
    pub service_life_years: f64,
    /// Efficiency loss per year (0.0-1.0).
    pub annual_degradation: f64,
}

impl Default for TurbineConfig {
    fn default() -> Self {
        let agent = AgentSettings::default();
        Self {
            turbine_type: "standard".to_string(),
            power_coefficient: agent.power_coefficient,
            azimuth_deg: agent.azimuth_deg,
            cut_in_ms: None,
            cut_out_ms: None,
            service_life_years: agent.service_life_years,
            annual_degradation: agent.annual_degradation,
        }
    }
}

/// Weather lookup parameters.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WeatherConfig {
    /// Maximum distance between query time and matched observation (hours).
    /// Unbounded when absent.
    pub max_time_distance_hours: Option<f64>,
}

/// Synthetic registry and weather generation.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SyntheticConfig {
    /// Weather stations placed on landmass cells.
    pub stations: usize,
    /// Registry records generated.
    pub turbines: usize,
    /// Long-run mean wind speed (m/s).
    pub mean_wind_ms: f64,
    /// AR(1) persistence of wind speed (0.0-1.0).
    pub wind_alpha: f64,
    /// AR(1) innovation standard deviation (m/s).
    pub wind_noise_std: f64,
    /// Mean air temperature (°C).
    pub mean_temp_c: f64,
    /// Hours of weather to generate; defaults to the simulated span.
    pub hours: Option<u64>,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            stations: 12,
            turbines: 300,
            mean_wind_ms: 8.0,
            wind_alpha: 0.9,
            wind_noise_std: 1.5,
            mean_temp_c: 9.0,
            hours: None,
        }
    }
}

/// Configuration error with field path and constraint description.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("config error: {field}: {message}")]
pub struct ConfigError {
    /// Dotted field path (e.g., `"simulation.steps"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl ConfigError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl ScenarioConfig {
    /// Returns the Denmark scenario: 70x70 grid, four lobes.
    pub fn denmark() -> Self {
        Self {
            simulation: SimulationConfig::default(),
            grid: GridConfig::default(),
            outline: OutlineConfig::default(),
            turbine: TurbineConfig::default(),
            weather: WeatherConfig::default(),
            synthetic: SyntheticConfig::default(),
        }
    }

    /// Returns a 20x20 grid with one radius-5 lobe at (10, 10).
    ///
    /// The bounding box spans 20 degrees on both axes, so each cell covers
    /// one degree.
    pub fn single_lobe() -> Self {
        Self {
            grid: GridConfig {
                width: 20,
                height: 20,
                min_lat: 0.0,
                max_lat: 20.0,
                min_lon: 0.0,
                max_lon: 20.0,
            },
            outline: OutlineConfig {
                lobes: vec![LobeConfig::new(10, 10, 5.0, 5.0, 0.0)],
            },
            synthetic: SyntheticConfig {
                stations: 3,
                turbines: 20,
                ..SyntheticConfig::default()
            },
            ..Self::denmark()
        }
    }

    /// Available preset names.
    pub const PRESETS: &[&str] = &["denmark", "single_lobe"];

    /// Loads a scenario from a named preset.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the preset name is unknown.
    pub fn from_preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "denmark" => Ok(Self::denmark()),
            "single_lobe" => Ok(Self::single_lobe()),
            _ => Err(ConfigError::new(
                "preset",
                format!("unknown preset \"{name}\", available: {}", Self::PRESETS.join(", ")),
            )),
        }
    }

    /// Parses a scenario from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)
            .map_err(|e| ConfigError::new("scenario", format!("cannot read \"{}\": {e}", path.display())))?;
        Self::from_toml_str(&content)
    }

    /// Parses a scenario from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError::new("toml", e.to_string()))
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if configuration is valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        let s = &self.simulation;

        if DateTime::parse_from_rfc3339(&s.start).is_err() {
            errors.push(ConfigError::new("simulation.start", "must be an RFC 3339 timestamp"));
        }
        if s.steps == 0 {
            errors.push(ConfigError::new("simulation.steps", "must be > 0"));
        }
        for (field, value) in [("simulation.step", &s.step), ("simulation.reporting", &s.reporting)] {
            if value.parse::<Resolution>().is_err() {
                errors.push(ConfigError::new(
                    field,
                    format!("must be one of {}, got \"{value}\"", Resolution::NAMES.join(", ")),
                ));
            }
        }

        let g = &self.grid;
        if g.width == 0 {
            errors.push(ConfigError::new("grid.width", "must be > 0"));
        }
        if g.height == 0 {
            errors.push(ConfigError::new("grid.height", "must be > 0"));
        }
        if !(g.min_lat < g.max_lat) {
            errors.push(ConfigError::new("grid.min_lat", "must be < grid.max_lat"));
        }
        if !(g.min_lon < g.max_lon) {
            errors.push(ConfigError::new("grid.min_lon", "must be < grid.max_lon"));
        }

        for (i, lobe) in self.outline.lobes.iter().enumerate() {
            if lobe.corners < 3 {
                errors.push(ConfigError::new(format!("outline.lobes[{i}].corners"), "must be >= 3"));
            }
            if !(lobe.radius_x >= 0.0 && lobe.radius_y >= 0.0) {
                errors.push(ConfigError::new(format!("outline.lobes[{i}].radius_x"), "radii must be >= 0"));
            }
        }

        let t = &self.turbine;
        if t.turbine_type.parse::<TurbineType>().is_err() {
            errors.push(ConfigError::new(
                "turbine.turbine_type",
                format!("must be one of {}, got \"{}\"", TurbineType::NAMES.join(", "), t.turbine_type),
            ));
        }
        if !(0.0..=0.593).contains(&t.power_coefficient) {
            errors.push(ConfigError::new("turbine.power_coefficient", "must be in [0.0, 0.593]"));
        }
        if !(0.0..=1.0).contains(&t.annual_degradation) {
            errors.push(ConfigError::new("turbine.annual_degradation", "must be in [0.0, 1.0]"));
        }
        if !(t.service_life_years > 0.0) {
            errors.push(ConfigError::new("turbine.service_life_years", "must be > 0"));
        }
        let spec = t.turbine_type.parse::<TurbineType>().map(TurbineType::spec).ok();
        if let Some(spec) = spec {
            let cut_in = t.cut_in_ms.unwrap_or(spec.cut_in_ms);
            let cut_out = t.cut_out_ms.unwrap_or(spec.cut_out_ms);
            if !(0.0 <= cut_in && cut_in < cut_out) {
                errors.push(ConfigError::new("turbine.cut_in_ms", "must be >= 0 and < turbine.cut_out_ms"));
            }
        }

        if let Some(h) = self.weather.max_time_distance_hours {
            if hours_to_duration(h).is_none() {
                errors.push(ConfigError::new(
                    "weather.max_time_distance_hours",
                    "must be a finite number of hours >= 0 within the representable time range",
                ));
            }
        }

        let syn = &self.synthetic;
        if !(0.0..=1.0).contains(&syn.wind_alpha) {
            errors.push(ConfigError::new("synthetic.wind_alpha", "must be in [0.0, 1.0]"));
        }
        if syn.wind_noise_std < 0.0 {
            errors.push(ConfigError::new("synthetic.wind_noise_std", "must be >= 0"));
        }

        errors
    }

    /// Resolves the scenario into an engine configuration.
    ///
    /// # Errors
    ///
    /// * `SimError::UnknownTurbineType` / `SimError::UnknownResolution` for
    ///   names outside the supported sets
    /// * `SimError::InvalidTimestamp` for an unparseable start time
    /// * `SimError::Config` for any other failed validation
    pub fn to_sim_config(&self) -> SimResult<SimConfig> {
        let turbine_type: TurbineType = self.turbine.turbine_type.parse()?;
        let step: Resolution = self.simulation.step.parse()?;
        let reporting: Resolution = self.simulation.reporting.parse()?;
        let start = DateTime::parse_from_rfc3339(&self.simulation.start)
            .map(|t| t.with_timezone(&Utc))
            .map_err(|_| SimError::InvalidTimestamp {
                field: "simulation.start".to_string(),
                value: self.simulation.start.clone(),
            })?;

        let errors = self.validate();
        if !errors.is_empty() {
            return Err(SimError::Config(errors));
        }

        let max_time_distance = self
            .weather
            .max_time_distance_hours
            .map(|h| {
                hours_to_duration(h).ok_or_else(|| {
                    SimError::Config(vec![ConfigError::new(
                        "weather.max_time_distance_hours",
                        "out of range",
                    )])
                })
            })
            .transpose()?;

        let t = &self.turbine;
        let base = turbine_type.spec();
        let turbine = crate::devices::TurbineSpec {
            cut_in_ms: t.cut_in_ms.unwrap_or(base.cut_in_ms),
            cut_out_ms: t.cut_out_ms.unwrap_or(base.cut_out_ms),
            ..base
        };

        Ok(SimConfig {
            start,
            steps: self.simulation.steps,
            step,
            reporting,
            bounds: self.grid.bounds(),
            width: self.grid.width,
            height: self.grid.height,
            lobes: self.outline.lobes.iter().map(LobeConfig::to_lobe).collect(),
            turbine,
            agent: AgentSettings {
                power_coefficient: t.power_coefficient,
                azimuth_deg: t.azimuth_deg,
                service_life_years: t.service_life_years,
                annual_degradation: t.annual_degradation,
            },
            max_time_distance,
        })
    }
}

/// Converts fractional hours to a duration, rounded to the second.
///
/// `None` for negative, non-finite or unrepresentable values.
fn hours_to_duration(hours: f64) -> Option<Duration> {
    let seconds = (hours * 3600.0).round();
    if !seconds.is_finite() || seconds < 0.0 || seconds >= i64::MAX as f64 {
        return None;
    }
    Duration::try_seconds(seconds as i64)
}
