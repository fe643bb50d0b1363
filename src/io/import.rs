//! CSV readers for the turbine registry and weather observation tables.
//!
//! Rows that fail to deserialize are counted and skipped; only I/O failures
//! abort a read.

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use serde::de::DeserializeOwned;
use tracing::{info, warn};

use crate::error::SimResult;
use crate::registry::TurbineRecord;
use crate::weather::WeatherRecord;

/// Parsed rows plus the number of rows that could not be parsed.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportReport<T> {
    pub records: Vec<T>,
    pub skipped: usize,
}

/// Reads a turbine registry CSV file.
///
/// Expected columns: `id`, `capacity_kw`, `rotor_diameter_m`,
/// `hub_height_m`, `azimuth_deg`, `latitude`, `longitude`. Empty cells
/// deserialize as missing values.
///
/// # Errors
///
/// Returns `SimError::Io` if the file cannot be opened or read.
pub fn read_turbines(path: &Path) -> SimResult<ImportReport<TurbineRecord>> {
    let file = File::open(path)?;
    read_turbines_from(io::BufReader::new(file))
}

/// Reads turbine registry rows from any reader.
///
/// # Errors
///
/// Returns `SimError::Csv` on an underlying read failure.
pub fn read_turbines_from(reader: impl Read) -> SimResult<ImportReport<TurbineRecord>> {
    read_records(reader, "turbine registry")
}

/// Reads a weather observation CSV file.
///
/// Expected columns: `station_id`, `timestamp` (RFC 3339), `parameter_id`,
/// `value`, `latitude`, `longitude`.
///
/// # Errors
///
/// Returns `SimError::Io` if the file cannot be opened or read.
pub fn read_weather(path: &Path) -> SimResult<ImportReport<WeatherRecord>> {
    let file = File::open(path)?;
    read_weather_from(io::BufReader::new(file))
}

/// Reads weather observation rows from any reader.
///
/// # Errors
///
/// Returns `SimError::Csv` on an underlying read failure.
pub fn read_weather_from(reader: impl Read) -> SimResult<ImportReport<WeatherRecord>> {
    read_records(reader, "weather")
}

fn read_records<T: DeserializeOwned>(reader: impl Read, table: &str) -> SimResult<ImportReport<T>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let mut records = Vec::new();
    let mut skipped = 0;
    for (line, result) in rdr.deserialize::<T>().enumerate() {
        match result {
            Ok(record) => records.push(record),
            Err(e) if e.is_io_error() => return Err(e.into()),
            Err(e) => {
                skipped += 1;
                warn!(table, row = line + 1, error = %e, "unparseable row skipped");
            }
        }
    }
    info!(table, rows = records.len(), skipped, "table loaded");
    Ok(ImportReport { records, skipped })
}
