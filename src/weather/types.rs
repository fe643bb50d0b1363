//! Weather parameters, observations and derived samples.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geo::grid::{GridCell, GridIndexer, is_valid_coordinate};

/// Observed weather parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Parameter {
    /// Mean wind speed over the past hour (m/s).
    WindSpeed,
    /// Mean wind direction over the past hour (degrees, direction wind blows from).
    WindDirection,
    /// Mean air temperature over the past hour (°C).
    Temperature,
}

impl Parameter {
    /// All parameters, in index order.
    pub const ALL: [Parameter; 3] = [
        Parameter::WindSpeed,
        Parameter::WindDirection,
        Parameter::Temperature,
    ];

    /// Dense index for per-parameter storage.
    pub fn index(self) -> usize {
        match self {
            Parameter::WindSpeed => 0,
            Parameter::WindDirection => 1,
            Parameter::Temperature => 2,
        }
    }

    /// Observation network parameter id.
    pub fn id(self) -> &'static str {
        match self {
            Parameter::WindSpeed => "wind_speed_past1h",
            Parameter::WindDirection => "wind_dir_past1h",
            Parameter::Temperature => "temp_mean_past1h",
        }
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Error for parameter ids outside the supported set.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown weather parameter \"{0}\"")]
pub struct UnknownParameter(pub String);

impl FromStr for Parameter {
    type Err = UnknownParameter;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "wind_speed_past1h" | "wind_speed" => Ok(Parameter::WindSpeed),
            "wind_dir_past1h" | "wind_dir" | "wind_direction" => Ok(Parameter::WindDirection),
            "temp_mean_past1h" | "temp" | "temperature" => Ok(Parameter::Temperature),
            other => Err(UnknownParameter(other.to_string())),
        }
    }
}

/// One projected weather observation.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherObservation {
    pub station_id: String,
    pub cell: GridCell,
    pub timestamp: DateTime<Utc>,
    pub parameter: Parameter,
    pub value: f64,
}

/// One row of the external weather table, before grid projection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherRecord {
    pub station_id: String,
    pub timestamp: DateTime<Utc>,
    pub parameter_id: String,
    pub value: f64,
    pub latitude: f64,
    pub longitude: f64,
}

impl WeatherRecord {
    /// Projects the row onto the grid.
    ///
    /// Returns `None` for an unknown parameter id, a non-finite value or an
    /// invalid position.
    pub fn project(&self, indexer: &GridIndexer) -> Option<WeatherObservation> {
        let parameter = self.parameter_id.parse::<Parameter>().ok()?;
        if !self.value.is_finite() || !is_valid_coordinate(self.latitude, self.longitude) {
            return None;
        }
        Some(WeatherObservation {
            station_id: self.station_id.clone(),
            cell: indexer.map_to_grid(self.latitude, self.longitude),
            timestamp: self.timestamp,
            parameter,
            value: self.value,
        })
    }
}

/// Values of the three core parameters at one point in time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WeatherSample {
    /// Wind speed (m/s).
    pub wind_speed_ms: f64,
    /// Wind direction (degrees in `[0, 360)`).
    pub wind_direction_deg: f64,
    /// Air temperature (°C).
    pub temperature_c: f64,
}

/// Window average produced by the weather coupler.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowAverage {
    pub sample: WeatherSample,
    /// Hourly points with all three parameters present. Zero when the
    /// result came from the single-point fallback.
    pub valid_samples: usize,
}

/// Per-parameter lookup results.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ParameterValues {
    values: [Option<f64>; 3],
}

impl ParameterValues {
    pub fn get(&self, parameter: Parameter) -> Option<f64> {
        self.values[parameter.index()]
    }

    pub fn set(&mut self, parameter: Parameter, value: Option<f64>) {
        self.values[parameter.index()] = value;
    }

    /// Builds a complete sample when all three parameters are present.
    pub fn to_sample(&self) -> Option<WeatherSample> {
        Some(WeatherSample {
            wind_speed_ms: self.get(Parameter::WindSpeed)?,
            wind_direction_deg: self.get(Parameter::WindDirection)?,
            temperature_c: self.get(Parameter::Temperature)?,
        })
    }
}
