//! wind-sim entry point: CLI wiring, input loading and result export.

mod cli;

use std::process;

use clap::Parser;
use tracing::info;

use wind_sim::config::ScenarioConfig;
use wind_sim::error::{SimError, SimResult};
use wind_sim::geo::GridIndexer;
use wind_sim::io::export::{export_energy_csv, export_series_csv};
use wind_sim::io::import::{read_turbines, read_weather};
use wind_sim::logging::init_logging;
use wind_sim::registry::TurbineRecord;
use wind_sim::sim::clock::SimulationClock;
use wind_sim::sim::placement::ValidCellSet;
use wind_sim::sim::{SimConfig, SimulationState};
use wind_sim::synthetic::{generate_registry, generate_weather};
use wind_sim::weather::WeatherRecord;

use cli::Cli;

/// Seed offset for the weather generator to avoid correlation with the registry.
const WEATHER_SEED_OFFSET: u64 = 1013;

/// Hours between the clock start and its final tick.
fn simulated_hours(sim: &SimConfig) -> u64 {
    let mut clock = SimulationClock::new(sim.start, sim.step, sim.steps);
    clock.run(|_| {});
    (clock.now() - sim.start).num_hours().max(0) as u64
}

/// Loads the input tables, generating synthetic ones where no file is given.
fn load_inputs(
    cli: &Cli,
    scenario: &ScenarioConfig,
    sim: &SimConfig,
) -> SimResult<(Vec<TurbineRecord>, Vec<WeatherRecord>)> {
    let synthetic = &scenario.synthetic;
    let seed = scenario.simulation.seed;
    let needs_land = cli.turbines.is_none() || cli.weather.is_none();
    let (indexer, land) = if needs_land {
        let indexer = GridIndexer::new(sim.bounds, sim.width, sim.height)?;
        let land = ValidCellSet::from_lobes(&sim.lobes, sim.width, sim.height);
        (Some(indexer), land)
    } else {
        (None, ValidCellSet::default())
    };

    let turbines = match (&cli.turbines, &indexer) {
        (Some(path), _) => {
            let report = read_turbines(path)?;
            if report.skipped > 0 {
                eprintln!("warning: {} unparseable registry rows skipped", report.skipped);
            }
            report.records
        }
        (None, Some(indexer)) => generate_registry(synthetic, indexer, &land, seed),
        (None, None) => Vec::new(),
    };

    let weather = match (&cli.weather, &indexer) {
        (Some(path), _) => {
            let report = read_weather(path)?;
            if report.skipped > 0 {
                eprintln!("warning: {} unparseable weather rows skipped", report.skipped);
            }
            report.records
        }
        (None, Some(indexer)) => {
            let hours = synthetic.hours.unwrap_or_else(|| simulated_hours(sim));
            generate_weather(
                synthetic,
                indexer,
                &land,
                sim.start,
                hours,
                seed.wrapping_add(WEATHER_SEED_OFFSET),
            )
        }
        (None, None) => Vec::new(),
    };

    Ok((turbines, weather))
}

fn run(cli: &Cli) -> SimResult<()> {
    // Load config: --scenario takes priority, then --preset, then denmark default
    let mut scenario = if let Some(ref path) = cli.scenario {
        ScenarioConfig::from_toml_file(path)?
    } else if let Some(ref name) = cli.preset {
        ScenarioConfig::from_preset(name)?
    } else {
        ScenarioConfig::denmark()
    };

    if let Some(seed) = cli.seed {
        scenario.simulation.seed = seed;
    }

    let sim = scenario.to_sim_config()?;
    let reporting = sim.reporting;
    let (turbines, weather) = load_inputs(cli, &scenario, &sim)?;
    info!(turbines = turbines.len(), weather = weather.len(), "inputs ready");

    let mut state = SimulationState::initialize(sim, &turbines, &weather)?;
    let summaries = state.run();

    for s in &summaries {
        println!("{s}");
    }

    let d = state.diagnostics();
    println!();
    println!("agents:            {}", state.agents().len());
    println!("steps:             {}", summaries.len());
    println!("total energy:      {:.1} kWh", state.total_energy_kwh());
    println!("skipped registry:  {}", d.skipped_registry);
    println!("skipped weather:   {}", d.skipped_weather);
    println!("unplaced:          {}", d.unplaced);
    println!("gaps:              {}", d.gaps);
    println!("retired:           {}", d.retired);

    if let Some(ref path) = cli.series_out {
        export_series_csv(&state.export_series(), path)?;
        eprintln!("Series written to {}", path.display());
    }

    if let Some(ref path) = cli.energy_out {
        export_energy_csv(&state.energy_report(reporting), path)?;
        eprintln!("Energy report ({}) written to {}", reporting.as_str(), path.display());
    }

    Ok(())
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(&cli) {
        match e {
            SimError::Config(errors) => {
                for err in &errors {
                    eprintln!("{err}");
                }
            }
            other => eprintln!("error: {other}"),
        }
        process::exit(1);
    }
}
