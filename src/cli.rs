use std::path::PathBuf;

use clap::Parser;

/// Agent-based wind farm simulator over a rasterized landmass.
///
/// Without `--turbines`/`--weather` the inputs are generated from the
/// scenario's `[synthetic]` section.
#[derive(Parser, Debug)]
#[command(name = "wind-sim", author, version, about, long_about = None)]
pub struct Cli {
    /// Load scenario from a TOML config file
    #[arg(long, value_name = "PATH", conflicts_with = "preset")]
    pub scenario: Option<PathBuf>,

    /// Use a built-in preset (denmark, single_lobe)
    #[arg(long, value_name = "NAME")]
    pub preset: Option<String>,

    /// Turbine registry CSV
    #[arg(long, value_name = "CSV")]
    pub turbines: Option<PathBuf>,

    /// Weather observation CSV
    #[arg(long, value_name = "CSV")]
    pub weather: Option<PathBuf>,

    /// Override the scenario's random seed
    #[arg(long)]
    pub seed: Option<u64>,

    /// Write the per-turbine production series to CSV
    #[arg(long, value_name = "CSV")]
    pub series_out: Option<PathBuf>,

    /// Write the energy report at the reporting resolution to CSV
    #[arg(long, value_name = "CSV")]
    pub energy_out: Option<PathBuf>,

    /// Debug logging for the simulator
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}
