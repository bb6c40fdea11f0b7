//! Run configuration: requested years, ensemble member and file locations
//!
//! Input and output files follow fixed naming conventions keyed on the ensemble
//! id. The directories default to the locations the CESM-LE residual fields and
//! NPGO results have always lived in.

use crate::calendar::{FIRST_YEAR, LAST_YEAR};
use crate::errors::{NpgoError, Result};
use std::path::{Path, PathBuf};

/// Directory holding `remapped.SST.<ens>.192001-210012.nc`
pub const DEFAULT_INPUT_DIR: &str =
    "/glade/scratch/rbrady/EBUS_BGC_Variability/global_residuals/SST/remapped";

/// Directory receiving `NPGO.<ens>.<start>-<end>.nc`
pub const DEFAULT_OUTPUT_DIR: &str = "/glade/p/work/rbrady/NPGO";

/// Name of the SST variable in the input files
pub const SST_VARIABLE: &str = "SST";

/// Everything one NPGO run needs to know
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    pub ensemble: String,
    pub start_year: i32,
    pub end_year: i32,
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
}

impl RunConfig {
    /// Create a configuration using the default directories
    pub fn new(ensemble: impl Into<String>, start_year: i32, end_year: i32) -> Self {
        Self {
            ensemble: ensemble.into(),
            start_year,
            end_year,
            input_dir: PathBuf::from(DEFAULT_INPUT_DIR),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
        }
    }

    /// Build a configuration from the raw command-line strings
    ///
    /// # Errors
    ///
    /// Returns [`NpgoError::InvalidYear`] when either year is not an integer.
    pub fn from_args(ensemble: &str, start_year: &str, end_year: &str) -> Result<Self> {
        Ok(Self::new(
            ensemble,
            parse_year(start_year)?,
            parse_year(end_year)?,
        ))
    }

    #[must_use]
    pub fn with_input_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.input_dir = dir.as_ref().to_path_buf();
        self
    }

    #[must_use]
    pub fn with_output_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.output_dir = dir.as_ref().to_path_buf();
        self
    }

    /// Check the requested years against the model calendar.
    ///
    /// Only the outer bounds are checked; a start year after the end year is
    /// accepted here and fails later when there is nothing to decompose.
    ///
    /// # Errors
    ///
    /// Returns [`NpgoError::StartYearOutOfRange`] or [`NpgoError::EndYearOutOfRange`].
    pub fn validate(&self) -> Result<()> {
        if self.start_year < FIRST_YEAR {
            return Err(NpgoError::StartYearOutOfRange {
                year: self.start_year,
                min: FIRST_YEAR,
            });
        }
        if self.end_year > LAST_YEAR {
            return Err(NpgoError::EndYearOutOfRange {
                year: self.end_year,
                max: LAST_YEAR,
            });
        }
        Ok(())
    }

    /// File name of the ensemble member's regridded SST residuals
    #[must_use]
    pub fn input_file_name(&self) -> String {
        format!(
            "remapped.SST.{}.{FIRST_YEAR}01-{LAST_YEAR}12.nc",
            self.ensemble
        )
    }

    /// File name of the NPGO result for this run
    #[must_use]
    pub fn output_file_name(&self) -> String {
        format!(
            "NPGO.{}.{}-{}.nc",
            self.ensemble, self.start_year, self.end_year
        )
    }

    #[must_use]
    pub fn input_path(&self) -> PathBuf {
        self.input_dir.join(self.input_file_name())
    }

    #[must_use]
    pub fn output_path(&self) -> PathBuf {
        self.output_dir.join(self.output_file_name())
    }
}

fn parse_year(value: &str) -> Result<i32> {
    value
        .trim()
        .parse::<i32>()
        .map_err(|_| NpgoError::InvalidYear {
            value: value.to_string(),
        })
}
