//! Core simulation types: configuration, output rows and diagnostics.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::devices::{AgentSettings, TurbineSpec, TurbineType};
use crate::energy::Resolution;
use crate::geo::{GridBounds, GridCell, Lobe};

/// Fully resolved simulation configuration.
///
/// Built from a [`crate::config::ScenarioConfig`] after validation; the
/// engine never reads configuration from anywhere else.
///
/// # Examples
///
/// ```
/// use wind_sim::energy::Resolution;
/// use wind_sim::sim::types::SimConfig;
///
/// let cfg = SimConfig::single_lobe(24);
/// assert_eq!(cfg.steps, 24);
/// assert_eq!(cfg.step, Resolution::Hourly);
/// ```
#[derive(Debug, Clone)]
pub struct SimConfig {
    /// Clock time before the first tick.
    pub start: DateTime<Utc>,
    /// Number of ticks to run.
    pub steps: u64,
    /// Clock step size.
    pub step: Resolution,
    /// Default bucket size for energy reports.
    pub reporting: Resolution,
    /// Geographic box projected onto the grid.
    pub bounds: GridBounds,
    pub width: usize,
    pub height: usize,
    /// Landmass lobes defining the valid placement area.
    pub lobes: Vec<Lobe>,
    /// Turbine class defaults after overrides.
    pub turbine: TurbineSpec,
    /// Fleet-wide agent settings.
    pub agent: AgentSettings,
    /// Staleness bound for nearest-time weather lookups.
    pub max_time_distance: Option<Duration>,
}

impl SimConfig {
    /// Hourly configuration over a 20x20 grid with one radius-5 lobe.
    pub fn single_lobe(steps: u64) -> Self {
        Self {
            start: DateTime::<Utc>::UNIX_EPOCH,
            steps,
            step: Resolution::Hourly,
            reporting: Resolution::Daily,
            bounds: GridBounds {
                min_lat: 0.0,
                max_lat: 20.0,
                min_lon: 0.0,
                max_lon: 20.0,
            },
            width: 20,
            height: 20,
            lobes: vec![Lobe::new(10, 10, 5.0, 5.0)],
            turbine: TurbineType::Standard.spec(),
            agent: AgentSettings::default(),
            max_time_distance: None,
        }
    }
}

/// One agent's production in one tick.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesRow {
    pub timestamp: DateTime<Utc>,
    pub step: u64,
    pub turbine_id: usize,
    pub x: usize,
    pub y: usize,
    pub power_kw: f64,
    pub energy_kwh: f64,
    pub cell_energy_kwh: f64,
    pub cumulative_kwh: f64,
    pub efficiency: f64,
    pub scaling_factor: f64,
}

impl SeriesRow {
    pub fn cell(&self) -> GridCell {
        GridCell::new(self.x, self.y)
    }
}

/// Aggregate outcome of one tick across all agents.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepSummary {
    pub step: u64,
    pub timestamp: DateTime<Utc>,
    /// Agents that produced a row.
    pub produced: usize,
    /// Agents without weather for the window.
    pub gaps: usize,
    /// Agents skipped as retired.
    pub retired: usize,
    /// Scaled energy across all cells (kWh).
    pub cell_energy_kwh: f64,
}

impl fmt::Display for StepSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "step={:>4} {} | produced={} gaps={} retired={} | energy={:.1} kWh",
            self.step,
            self.timestamp.format("%Y-%m-%d %H:%M"),
            self.produced,
            self.gaps,
            self.retired,
            self.cell_energy_kwh,
        )
    }
}

/// Data quality counters collected during initialization and stepping.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Diagnostics {
    /// Registry records without valid geometry.
    pub skipped_registry: usize,
    /// Weather rows with unknown parameter, bad value or bad coordinates.
    pub skipped_weather: usize,
    /// Aggregates with no free landmass cell.
    pub unplaced: usize,
    /// Agent ticks skipped for missing weather.
    pub gaps: usize,
    /// Agents past their service life.
    pub retired: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_lobe_defaults() {
        let cfg = SimConfig::single_lobe(24);
        assert_eq!(cfg.width, 20);
        assert_eq!(cfg.lobes.len(), 1);
        assert_eq!(cfg.turbine.rated_kw, 2300.0);
        assert!(cfg.max_time_distance.is_none());
    }

    #[test]
    fn step_summary_display_does_not_panic() {
        let s = StepSummary {
            step: 3,
            timestamp: DateTime::<Utc>::UNIX_EPOCH,
            produced: 2,
            gaps: 1,
            retired: 0,
            cell_energy_kwh: 1234.5,
        };
        let text = format!("{s}");
        assert!(text.contains("gaps=1"));
    }

    #[test]
    fn series_row_cell() {
        let row = SeriesRow {
            timestamp: DateTime::<Utc>::UNIX_EPOCH,
            step: 0,
            turbine_id: 0,
            x: 4,
            y: 9,
            power_kw: 0.0,
            energy_kwh: 0.0,
            cell_energy_kwh: 0.0,
            cumulative_kwh: 0.0,
            efficiency: 1.0,
            scaling_factor: 1.0,
        };
        assert_eq!(row.cell(), GridCell::new(4, 9));
    }
}
