//! Defines command-line interface options using `clap` for the npgo application.

use crate::config::{RunConfig, DEFAULT_INPUT_DIR, DEFAULT_OUTPUT_DIR};
use crate::errors::Result;
use clap::Parser;
use std::path::PathBuf;

/// Computes the NPGO index for one CESM-LE ensemble member
#[derive(Parser, Debug)]
#[command(
    version,
    name = "npgo",
    about = "Compute the North Pacific Gyre Oscillation index from ensemble SST residuals"
)]
pub struct Args {
    /// Ensemble member, e.g. 001
    pub ensemble: String,

    /// Starting year for the index, 1920 or later
    pub start_year: String,

    /// Ending year for the index, 2100 or earlier
    pub end_year: String,

    /// Directory holding remapped.SST.<ensemble>.192001-210012.nc
    #[arg(long, default_value = DEFAULT_INPUT_DIR)]
    pub input_dir: PathBuf,

    /// Directory the NPGO.<ensemble>.<start>-<end>.nc result is written to
    #[arg(long, default_value = DEFAULT_OUTPUT_DIR)]
    pub output_dir: PathBuf,

    /// Number of threads to use for parallel processing. Defaults to number of CPU cores.
    #[arg(short = 't', long)]
    pub threads: Option<usize>,

    /// Enable verbose output.
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

impl Args {
    /// Turn the parsed arguments into a run configuration
    ///
    /// # Errors
    ///
    /// Fails if either year is not an integer.
    pub fn to_config(&self) -> Result<RunConfig> {
        Ok(
            RunConfig::from_args(&self.ensemble, &self.start_year, &self.end_year)?
                .with_input_dir(&self.input_dir)
                .with_output_dir(&self.output_dir),
        )
    }
}
