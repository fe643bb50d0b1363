//! Common types and traits for simulated generation units.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::weather::WeatherCoupler;

/// Read-only world state handed to every unit during one simulation tick.
///
/// # Fields
/// * `step` - Index of the tick being simulated (0-based)
/// * `timestamp` - Clock time at the end of the tick
/// * `window_hours` - Hours covered by the tick
/// * `weather` - Shared weather lookup service
pub struct StepContext<'a> {
    pub step: u64,
    pub timestamp: DateTime<Utc>,
    pub window_hours: u32,
    pub weather: &'a WeatherCoupler,
}

impl StepContext<'_> {
    /// Clock time at the start of the tick.
    pub fn window_start(&self) -> DateTime<Utc> {
        self.timestamp - Duration::hours(i64::from(self.window_hours))
    }
}

/// Production of one unit over one tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StepOutput {
    /// Power derived from the window average (kW).
    pub power_kw: f64,
    /// Energy of the representative turbine after efficiency (kWh).
    pub energy_kwh: f64,
    /// Energy scaled to every real turbine in the cell (kWh).
    pub cell_energy_kwh: f64,
    /// Running total for the representative turbine (kWh).
    pub cumulative_kwh: f64,
    /// Efficiency applied this tick.
    pub efficiency: f64,
}

/// Result of stepping one unit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StepOutcome {
    Produced(StepOutput),
    /// No weather covered the window; the unit did not change.
    Gap,
    /// The unit is past its service life and was skipped.
    Retired,
}

/// Capability of a simulated entity that advances with the clock.
///
/// The engine only talks to units through this trait, so new kinds of
/// generation plug in without the step loop matching on concrete types.
pub trait Steppable {
    /// Advances the unit by one tick.
    ///
    /// Implementations read shared state through `ctx` and mutate only
    /// themselves.
    fn step(&mut self, ctx: &StepContext<'_>) -> StepOutcome;

    /// Returns `false` once the unit no longer takes part in the simulation.
    fn is_active(&self) -> bool;

    /// Returns a human-readable type name for the unit.
    fn kind(&self) -> &'static str;
}
