//! Agent-based wind farm simulator on a rasterized landmass grid.
//!
//! Turbine registry rows are aggregated per grid cell, placed on the
//! landmass and stepped through time against nearest-in-time weather
//! observations.

pub mod config;
pub mod devices;
pub mod energy;
pub mod error;
/// Landmass outline rasterization and the geographic grid.
pub mod geo;
pub mod io;
pub mod logging;
pub mod registry;
/// Simulation clock, placement and engine.
pub mod sim;
pub mod synthetic;
pub mod weather;
