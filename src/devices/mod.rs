//! Simulated generation units.

/// Wind turbine agent and turbine classes.
pub mod turbine;
pub mod types;

pub use turbine::{AgentSettings, TurbineAgent, TurbineSpec, TurbineType};
pub use types::{StepContext, StepOutcome, StepOutput, Steppable};
