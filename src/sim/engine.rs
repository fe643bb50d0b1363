//! Simulation state that couples turbines, weather and the clock.

use tracing::{debug, info, warn};

use crate::devices::{StepContext, StepOutcome, Steppable, TurbineAgent};
use crate::energy::{EnergyBucket, EnergyCalculator, PowerSample, Resolution};
use crate::error::SimResult;
use crate::geo::GridIndexer;
use crate::registry::{SpatialAggregator, TurbineRecord};
use crate::weather::pivot::{MissingDataSummary, pivot, summarize_missing};
use crate::weather::{WeatherCoupler, WeatherIndex, WeatherObservation, WeatherRecord};

use super::clock::SimulationClock;
use super::placement::{ValidCellSet, place_aggregates};
use super::types::{Diagnostics, SeriesRow, SimConfig, StepSummary};

/// Complete simulation state: agents, shared weather, clock and output.
///
/// Weather and the valid-cell set are read-only once stepping starts; each
/// tick only mutates the agents' own fields and appends output rows.
pub struct SimulationState {
    config: SimConfig,
    clock: SimulationClock,
    weather: WeatherCoupler,
    valid_cells: ValidCellSet,
    agents: Vec<TurbineAgent>,
    series: Vec<SeriesRow>,
    production: Vec<PowerSample>,
    diagnostics: Diagnostics,
    weather_summary: MissingDataSummary,
}

impl SimulationState {
    /// Builds the simulation from the two input tables.
    ///
    /// Registry rows are aggregated per cell and placed on the landmass;
    /// weather rows are projected and indexed. Bad rows are counted in
    /// [`Diagnostics`], never fatal.
    ///
    /// # Errors
    ///
    /// Returns `SimError::Config` for a zero-sized grid or degenerate bounds.
    pub fn initialize(
        config: SimConfig,
        turbines: &[TurbineRecord],
        weather: &[WeatherRecord],
    ) -> SimResult<Self> {
        let indexer = GridIndexer::new(config.bounds, config.width, config.height)?;

        let mut valid_cells = ValidCellSet::from_lobes(&config.lobes, config.width, config.height);
        if valid_cells.is_empty() {
            warn!("landmass outline has no interior cells; no turbines can be placed");
        }
        let land_cells = valid_cells.len();

        let aggregation = SpatialAggregator::new(indexer.clone()).aggregate(turbines);
        let placement = place_aggregates(&aggregation.cells, &mut valid_cells);
        let agents: Vec<TurbineAgent> = placement
            .placed
            .iter()
            .enumerate()
            .map(|(id, p)| TurbineAgent::from_aggregate(id, p.cell, &p.aggregate, config.turbine, &config.agent))
            .collect();

        let observations: Vec<WeatherObservation> = weather.iter().filter_map(|r| r.project(&indexer)).collect();
        let skipped_weather = weather.len() - observations.len();
        if skipped_weather > 0 {
            warn!(skipped = skipped_weather, "weather rows with unknown parameter or invalid value skipped");
        }
        let weather_summary = summarize_missing(&pivot(&observations));
        if weather_summary.incomplete_rows > 0 {
            info!(
                rows = weather_summary.rows,
                incomplete = weather_summary.incomplete_rows,
                "station rows with missing parameters"
            );
        }

        let mut coupler = WeatherCoupler::new(WeatherIndex::build(observations));
        if let Some(max) = config.max_time_distance {
            coupler = coupler.with_max_time_distance(max);
        }

        info!(
            land_cells,
            agents = agents.len(),
            represented = aggregation.turbine_count(),
            weather_cells = coupler.index().cell_count(),
            observations = coupler.index().observation_count(),
            "simulation initialized"
        );

        let clock = SimulationClock::new(config.start, config.step, config.steps);
        Ok(Self {
            config,
            clock,
            weather: coupler,
            valid_cells,
            agents,
            series: Vec::new(),
            production: Vec::new(),
            diagnostics: Diagnostics {
                skipped_registry: aggregation.skipped,
                skipped_weather,
                unplaced: placement.unplaced,
                ..Diagnostics::default()
            },
            weather_summary,
        })
    }

    /// Advances the clock one tick and steps every agent.
    ///
    /// Returns `None` once the clock has run its configured number of ticks.
    pub fn step(&mut self) -> Option<StepSummary> {
        let tick = self.clock.tick()?;
        let ctx = StepContext {
            step: tick.step,
            timestamp: tick.timestamp,
            window_hours: tick.window_hours,
            weather: &self.weather,
        };

        let mut summary = StepSummary {
            step: tick.step,
            timestamp: tick.timestamp,
            produced: 0,
            gaps: 0,
            retired: 0,
            cell_energy_kwh: 0.0,
        };

        for agent in &mut self.agents {
            let was_active = agent.is_active();
            match agent.step(&ctx) {
                StepOutcome::Produced(out) => {
                    summary.produced += 1;
                    summary.cell_energy_kwh += out.cell_energy_kwh;
                    self.series.push(SeriesRow {
                        timestamp: tick.timestamp,
                        step: tick.step,
                        turbine_id: agent.id,
                        x: agent.cell.x,
                        y: agent.cell.y,
                        power_kw: out.power_kw,
                        energy_kwh: out.energy_kwh,
                        cell_energy_kwh: out.cell_energy_kwh,
                        cumulative_kwh: out.cumulative_kwh,
                        efficiency: out.efficiency,
                        scaling_factor: agent.scaling_factor,
                    });
                }
                StepOutcome::Gap => summary.gaps += 1,
                StepOutcome::Retired => summary.retired += 1,
            }
            if was_active && !agent.is_active() {
                self.diagnostics.retired += 1;
            }
        }

        if tick.window_hours > 0 {
            let hours = f64::from(tick.window_hours);
            self.production.push(PowerSample {
                timestamp: tick.previous,
                power_kw: summary.cell_energy_kwh / hours,
                hours,
            });
        }
        self.diagnostics.gaps += summary.gaps;
        debug!(%summary, "step complete");
        Some(summary)
    }

    /// Runs all remaining ticks.
    pub fn run(&mut self) -> Vec<StepSummary> {
        let mut summaries = Vec::with_capacity(self.clock.total().saturating_sub(self.clock.steps_done()) as usize);
        while let Some(summary) = self.step() {
            summaries.push(summary);
        }
        info!(
            steps = summaries.len(),
            rows = self.series.len(),
            total_kwh = self.total_energy_kwh(),
            gaps = self.diagnostics.gaps,
            retired = self.diagnostics.retired,
            "simulation finished"
        );
        summaries
    }

    /// Production rows in the order they were produced.
    ///
    /// Pure read; repeated calls without an intervening step return equal
    /// tables.
    pub fn export_series(&self) -> Vec<SeriesRow> {
        self.series.clone()
    }

    /// Scaled fleet energy resampled into calendar buckets.
    ///
    /// Each tick's energy is attributed to the bucket containing the start
    /// of its window.
    pub fn energy_report(&self, resolution: Resolution) -> Vec<EnergyBucket> {
        EnergyCalculator::energy_over_period(&self.production, resolution)
    }

    /// Total scaled energy produced so far (kWh).
    pub fn total_energy_kwh(&self) -> f64 {
        self.series.iter().map(|r| r.cell_energy_kwh).sum()
    }

    pub fn agents(&self) -> &[TurbineAgent] {
        &self.agents
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub fn weather_summary(&self) -> &MissingDataSummary {
        &self.weather_summary
    }

    pub fn weather(&self) -> &WeatherCoupler {
        &self.weather
    }

    /// Landmass cells left free after placement.
    pub fn valid_cells(&self) -> &ValidCellSet {
        &self.valid_cells
    }

    pub fn clock(&self) -> &SimulationClock {
        &self.clock
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }
}
