/// Calendar-aware simulation clock.
pub mod clock;
pub mod engine;
/// Placement of aggregated turbines onto landmass cells.
pub mod placement;
pub mod types;

pub use engine::SimulationState;
pub use types::{Diagnostics, SeriesRow, SimConfig, StepSummary};
