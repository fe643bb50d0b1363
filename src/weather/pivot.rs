//! Long-to-wide pivot of observations, one row per station and timestamp.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use super::types::{Parameter, ParameterValues, WeatherObservation};
use crate::geo::GridCell;

/// All parameters reported by one station at one timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct StationRow {
    pub station_id: String,
    pub timestamp: DateTime<Utc>,
    pub cell: GridCell,
    pub values: ParameterValues,
}

/// Counts of rows lacking one or more parameters after pivoting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MissingDataSummary {
    pub rows: usize,
    /// Rows with at least one parameter absent.
    pub incomplete_rows: usize,
    missing: [usize; 3],
}

impl MissingDataSummary {
    /// Rows in which `parameter` is absent.
    pub fn missing(&self, parameter: Parameter) -> usize {
        self.missing[parameter.index()]
    }
}

/// Pivots observations into rows sorted by `(station_id, timestamp)`.
///
/// When a station reports the same parameter twice for one timestamp the
/// first value is kept.
pub fn pivot(observations: &[WeatherObservation]) -> Vec<StationRow> {
    let mut rows: BTreeMap<(&str, DateTime<Utc>), StationRow> = BTreeMap::new();
    for obs in observations {
        let row = rows
            .entry((obs.station_id.as_str(), obs.timestamp))
            .or_insert_with(|| StationRow {
                station_id: obs.station_id.clone(),
                timestamp: obs.timestamp,
                cell: obs.cell,
                values: ParameterValues::default(),
            });
        if row.values.get(obs.parameter).is_none() {
            row.values.set(obs.parameter, Some(obs.value));
        }
    }
    rows.into_values().collect()
}

pub fn summarize_missing(rows: &[StationRow]) -> MissingDataSummary {
    let mut summary = MissingDataSummary {
        rows: rows.len(),
        ..Default::default()
    };
    for row in rows {
        let mut complete = true;
        for p in Parameter::ALL {
            if row.values.get(p).is_none() {
                summary.missing[p.index()] += 1;
                complete = false;
            }
        }
        if !complete {
            summary.incomplete_rows += 1;
        }
    }
    summary
}
