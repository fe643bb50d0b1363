//! CSV export for the production series and the energy report.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::energy::EnergyBucket;
use crate::sim::types::SeriesRow;

/// Column header of the production series export.
const SERIES_HEADER: &str = "timestamp,step,turbine_id,x,y,power_kw,energy_kwh,\
                             cell_energy_kwh,cumulative_kwh,efficiency,scaling_factor";

/// Column header of the energy report export.
const ENERGY_HEADER: &str = "bucket_start,energy_kwh";

/// Exports the production series to a CSV file at the given path.
///
/// Writes a header row followed by one row per [`SeriesRow`], in the order
/// given. Produces deterministic output for identical inputs.
///
/// # Arguments
///
/// * `rows` - Production rows from `SimulationState::export_series`
/// * `path` - Output file path
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_series_csv(rows: &[SeriesRow], path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    write_series_csv(rows, io::BufWriter::new(file))
}

/// Writes production rows as CSV to any writer.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_series_csv(rows: &[SeriesRow], writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);
    wtr.write_record(SERIES_HEADER.split(',').map(str::trim))?;

    for r in rows {
        wtr.write_record(&[
            r.timestamp.to_rfc3339(),
            r.step.to_string(),
            r.turbine_id.to_string(),
            r.x.to_string(),
            r.y.to_string(),
            format!("{:.4}", r.power_kw),
            format!("{:.4}", r.energy_kwh),
            format!("{:.4}", r.cell_energy_kwh),
            format!("{:.4}", r.cumulative_kwh),
            format!("{:.6}", r.efficiency),
            format!("{:.1}", r.scaling_factor),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

/// Exports energy buckets to a CSV file at the given path.
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_energy_csv(buckets: &[EnergyBucket], path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    write_energy_csv(buckets, io::BufWriter::new(file))
}

/// Writes energy buckets as CSV to any writer.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_energy_csv(buckets: &[EnergyBucket], writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);
    wtr.write_record(ENERGY_HEADER.split(','))?;
    for b in buckets {
        wtr.write_record(&[b.start.to_rfc3339(), format!("{:.4}", b.energy_kwh)])?;
    }
    wtr.flush()?;
    Ok(())
}
