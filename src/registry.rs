//! Turbine registry records and per-cell aggregation.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::energy::circular_mean_deg;
use crate::geo::grid::{GridCell, GridIndexer, is_valid_coordinate};

/// One row of the external turbine registry.
///
/// Only the position is required; missing physical attributes fall back to
/// turbine type defaults when an agent is built.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TurbineRecord {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub capacity_kw: Option<f64>,
    #[serde(default)]
    pub rotor_diameter_m: Option<f64>,
    #[serde(default)]
    pub hub_height_m: Option<f64>,
    #[serde(default)]
    pub azimuth_deg: Option<f64>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
}

impl TurbineRecord {
    /// Position if both coordinates are present and valid.
    pub fn position(&self) -> Option<(f64, f64)> {
        let (lat, lon) = (self.latitude?, self.longitude?);
        is_valid_coordinate(lat, lon).then_some((lat, lon))
    }
}

/// Summary of all registry records that project onto one cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CellAggregate {
    pub cell: GridCell,
    /// Number of real turbines the cell represents.
    pub count: usize,
    pub mean_capacity_kw: Option<f64>,
    pub mean_rotor_diameter_m: Option<f64>,
    pub mean_hub_height_m: Option<f64>,
    /// Circular mean of the reported azimuths.
    pub mean_azimuth_deg: Option<f64>,
}

impl CellAggregate {
    /// Scaling factor applied to the representative agent's output.
    pub fn scaling_factor(&self) -> f64 {
        self.count as f64
    }
}

/// Aggregated cells plus the number of records without a valid position.
#[derive(Debug, Clone, Default)]
pub struct AggregationReport {
    pub cells: BTreeMap<GridCell, CellAggregate>,
    pub skipped: usize,
}

impl AggregationReport {
    /// Total real turbines represented across all cells.
    pub fn turbine_count(&self) -> usize {
        self.cells.values().map(|c| c.count).sum()
    }
}

/// Groups registry records by grid cell.
#[derive(Debug, Clone)]
pub struct SpatialAggregator {
    indexer: GridIndexer,
}

#[derive(Default)]
struct Accumulator {
    count: usize,
    capacity: Mean,
    rotor: Mean,
    hub: Mean,
    azimuths: Vec<f64>,
}

#[derive(Default)]
struct Mean {
    sum: f64,
    n: usize,
}

impl Mean {
    fn push(&mut self, value: Option<f64>) {
        if let Some(v) = value.filter(|v| v.is_finite() && *v > 0.0) {
            self.sum += v;
            self.n += 1;
        }
    }

    fn value(&self) -> Option<f64> {
        (self.n > 0).then(|| self.sum / self.n as f64)
    }
}

impl SpatialAggregator {
    pub fn new(indexer: GridIndexer) -> Self {
        Self { indexer }
    }

    pub fn indexer(&self) -> &GridIndexer {
        &self.indexer
    }

    /// Projects every record onto the grid and averages each cell.
    ///
    /// Records without a valid position are skipped and counted. Physical
    /// attributes are averaged over the records that report a positive
    /// finite value, so a partly filled cell still gets a mean.
    pub fn aggregate<'a>(&self, records: impl IntoIterator<Item = &'a TurbineRecord>) -> AggregationReport {
        let mut acc: BTreeMap<GridCell, Accumulator> = BTreeMap::new();
        let mut skipped = 0;

        for record in records {
            let Some((lat, lon)) = record.position() else {
                skipped += 1;
                continue;
            };
            let a = acc.entry(self.indexer.map_to_grid(lat, lon)).or_default();
            a.count += 1;
            a.capacity.push(record.capacity_kw);
            a.rotor.push(record.rotor_diameter_m);
            a.hub.push(record.hub_height_m);
            if let Some(az) = record.azimuth_deg.filter(|v| v.is_finite()) {
                a.azimuths.push(az);
            }
        }

        if skipped > 0 {
            warn!(skipped, "registry records without valid position skipped");
        }

        let cells: BTreeMap<GridCell, CellAggregate> = acc
            .into_iter()
            .map(|(cell, a)| {
                let aggregate = CellAggregate {
                    cell,
                    count: a.count,
                    mean_capacity_kw: a.capacity.value(),
                    mean_rotor_diameter_m: a.rotor.value(),
                    mean_hub_height_m: a.hub.value(),
                    mean_azimuth_deg: circular_mean_deg(a.azimuths),
                };
                (cell, aggregate)
            })
            .collect();

        info!(cells = cells.len(), skipped, "registry aggregated");
        AggregationReport { cells, skipped }
    }
}
