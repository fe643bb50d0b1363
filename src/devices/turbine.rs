//! Wind turbine agent with aging and efficiency degradation.

use std::fmt;
use std::str::FromStr;

use tracing::debug;

use crate::devices::types::{StepContext, StepOutcome, StepOutput, Steppable};
use crate::energy::EnergyCalculator;
use crate::error::SimError;
use crate::geo::GridCell;
use crate::registry::CellAggregate;

/// Hours in a simulated year, used for aging and degradation.
pub const HOURS_PER_YEAR: f64 = 8760.0;
/// Rotor diameter used when the registry reports none (m).
pub const DEFAULT_ROTOR_DIAMETER_M: f64 = 100.0;
/// Hub height used when the registry reports none (m).
pub const DEFAULT_HUB_HEIGHT_M: f64 = 80.0;

/// Named turbine class supplying rated power and the operating envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurbineType {
    Small,
    Standard,
    Large,
    Offshore,
}

impl TurbineType {
    pub const NAMES: &[&str] = &["small", "standard", "large", "offshore"];

    pub fn as_str(&self) -> &'static str {
        match self {
            TurbineType::Small => "small",
            TurbineType::Standard => "standard",
            TurbineType::Large => "large",
            TurbineType::Offshore => "offshore",
        }
    }

    /// Nameplate data for this class.
    pub fn spec(self) -> TurbineSpec {
        let (rated_kw, cut_in_ms, rated_speed_ms, cut_out_ms) = match self {
            TurbineType::Small => (800.0, 2.5, 10.0, 20.0),
            TurbineType::Standard => (2300.0, 3.0, 12.0, 25.0),
            TurbineType::Large => (3600.0, 3.0, 12.0, 25.0),
            TurbineType::Offshore => (8000.0, 3.5, 14.0, 30.0),
        };
        TurbineSpec {
            rated_kw,
            cut_in_ms,
            rated_speed_ms,
            cut_out_ms,
            rotor_diameter_m: DEFAULT_ROTOR_DIAMETER_M,
            hub_height_m: DEFAULT_HUB_HEIGHT_M,
        }
    }
}

impl fmt::Display for TurbineType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TurbineType {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "small" => Ok(TurbineType::Small),
            "standard" => Ok(TurbineType::Standard),
            "large" => Ok(TurbineType::Large),
            "offshore" => Ok(TurbineType::Offshore),
            _ => Err(SimError::UnknownTurbineType(s.to_string())),
        }
    }
}

/// Nameplate data for one turbine class.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TurbineSpec {
    pub rated_kw: f64,
    pub cut_in_ms: f64,
    pub rated_speed_ms: f64,
    pub cut_out_ms: f64,
    pub rotor_diameter_m: f64,
    pub hub_height_m: f64,
}

/// Fleet-wide settings applied to every agent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AgentSettings {
    /// Rotor power coefficient (Cp).
    pub power_coefficient: f64,
    /// Rotor orientation used when a cell reports no azimuth (degrees).
    pub azimuth_deg: f64,
    /// Age at which an agent retires (years).
    pub service_life_years: f64,
    /// Fractional efficiency loss per year of operation.
    pub annual_degradation: f64,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            power_coefficient: crate::energy::DEFAULT_POWER_COEFFICIENT,
            azimuth_deg: 270.0,
            service_life_years: 20.0,
            annual_degradation: 0.005,
        }
    }
}

/// Simulated wind turbine representing every real turbine in one grid cell.
///
/// Energy per tick is the power at the window-averaged weather, held for the
/// tick's hours and reduced by the current efficiency. The agent ages by the
/// tick duration each time it produces, and efficiency decays as
///
/// ```text
/// efficiency = (1 - annual_degradation) ^ age_years
/// ```
///
/// Once age exceeds the service life the agent retires in place and is
/// skipped from then on.
#[derive(Debug, Clone)]
pub struct TurbineAgent {
    /// Stable agent id, assigned in placement order.
    pub id: usize,

    /// Cell the agent occupies.
    pub cell: GridCell,

    /// Nameplate data after registry overrides.
    pub spec: TurbineSpec,

    /// Number of real turbines represented.
    pub scaling_factor: f64,

    /// Age at which the agent retires (years).
    pub service_life_years: f64,

    /// Fractional efficiency loss per year.
    pub annual_degradation: f64,

    calculator: EnergyCalculator,
    age_years: f64,
    efficiency: f64,
    cumulative_kwh: f64,
    operational: bool,
    gaps: usize,
}

impl TurbineAgent {
    /// Creates a new agent.
    ///
    /// # Arguments
    ///
    /// * `id` - Agent id
    /// * `cell` - Grid cell the agent is placed on
    /// * `spec` - Nameplate data
    /// * `azimuth_deg` - Rotor orientation (degrees)
    /// * `scaling_factor` - Number of real turbines represented
    /// * `settings` - Fleet-wide settings
    pub fn new(
        id: usize,
        cell: GridCell,
        spec: TurbineSpec,
        azimuth_deg: f64,
        scaling_factor: f64,
        settings: &AgentSettings,
    ) -> Self {
        let calculator = EnergyCalculator::new(
            spec.rotor_diameter_m,
            spec.rated_kw,
            azimuth_deg,
            settings.power_coefficient,
        )
        .with_envelope(spec.cut_in_ms, spec.cut_out_ms);
        Self {
            id,
            cell,
            spec,
            scaling_factor: scaling_factor.max(0.0),
            service_life_years: settings.service_life_years,
            annual_degradation: settings.annual_degradation.clamp(0.0, 1.0),
            calculator,
            age_years: 0.0,
            efficiency: 1.0,
            cumulative_kwh: 0.0,
            operational: true,
            gaps: 0,
        }
    }

    /// Builds an agent from a registry aggregate.
    ///
    /// Mean capacity and rotor diameter replace the class defaults when the
    /// cell reports them; the class keeps supplying the operating envelope.
    pub fn from_aggregate(
        id: usize,
        cell: GridCell,
        aggregate: &CellAggregate,
        base: TurbineSpec,
        settings: &AgentSettings,
    ) -> Self {
        let spec = TurbineSpec {
            rated_kw: aggregate.mean_capacity_kw.unwrap_or(base.rated_kw),
            rotor_diameter_m: aggregate.mean_rotor_diameter_m.unwrap_or(base.rotor_diameter_m),
            hub_height_m: aggregate.mean_hub_height_m.unwrap_or(base.hub_height_m),
            ..base
        };
        let azimuth = aggregate.mean_azimuth_deg.unwrap_or(settings.azimuth_deg);
        Self::new(id, cell, spec, azimuth, aggregate.scaling_factor(), settings)
    }

    pub fn calculator(&self) -> &EnergyCalculator {
        &self.calculator
    }

    pub fn azimuth_deg(&self) -> f64 {
        self.calculator.azimuth_deg
    }

    pub fn swept_area_m2(&self) -> f64 {
        self.calculator.swept_area_m2()
    }

    pub fn age_years(&self) -> f64 {
        self.age_years
    }

    pub fn efficiency(&self) -> f64 {
        self.efficiency
    }

    pub fn cumulative_kwh(&self) -> f64 {
        self.cumulative_kwh
    }

    pub fn is_operational(&self) -> bool {
        self.operational
    }

    /// Number of ticks skipped for missing weather.
    pub fn gaps(&self) -> usize {
        self.gaps
    }

    fn age_by(&mut self, hours: f64) {
        self.age_years += hours / HOURS_PER_YEAR;
        self.efficiency = (1.0 - self.annual_degradation).powf(self.age_years);
        if self.age_years > self.service_life_years {
            self.operational = false;
            debug!(agent = self.id, cell = %self.cell, age_years = self.age_years, "turbine retired");
        }
    }
}

impl Steppable for TurbineAgent {
    fn step(&mut self, ctx: &StepContext<'_>) -> StepOutcome {
        if !self.operational {
            return StepOutcome::Retired;
        }

        let covered = ctx.weather.covers_window(self.cell, ctx.window_start(), ctx.timestamp);
        let window = if covered {
            ctx.weather.average_over_window(self.cell, ctx.timestamp, ctx.window_hours)
        } else {
            None
        };
        let Some(window) = window else {
            self.gaps += 1;
            debug!(agent = self.id, cell = %self.cell, step = ctx.step, "no weather for window");
            return StepOutcome::Gap;
        };

        let w = window.sample;
        let power_kw = self
            .calculator
            .power(w.wind_speed_ms, w.wind_direction_deg, w.temperature_c);
        let hours = f64::from(ctx.window_hours);
        let efficiency = self.efficiency;
        let energy_kwh = power_kw * hours * efficiency;
        self.cumulative_kwh += energy_kwh;
        self.age_by(hours);

        StepOutcome::Produced(StepOutput {
            power_kw,
            energy_kwh,
            cell_energy_kwh: energy_kwh * self.scaling_factor,
            cumulative_kwh: self.cumulative_kwh,
            efficiency,
        })
    }

    fn is_active(&self) -> bool {
        self.operational
    }

    fn kind(&self) -> &'static str {
        "wind_turbine"
    }
}
