//! npgo: North Pacific Gyre Oscillation index from ensemble SST output
//!
//! Computes the NPGO index for one CESM Large Ensemble member. The index is the
//! second EOF mode of January-March SST anomalies over the Northeast Pacific
//! (25-62N, 180-250E), weighted by the square root of the cosine of latitude.
//!
//! ## Pipeline
//!
//! 1. Validate the requested years against the 1920-2100 model calendar
//! 2. Read the member's regridded SST residuals, restricted to the years and box
//! 3. Average January-March of every year
//! 4. Decompose the annual means into EOFs (no centering)
//! 5. Express the patterns as correlation maps and project every month of the
//!    window onto the EOFs, each divided by the square root of its eigenvalue
//! 6. Keep the second mode and orient it so the correlation at 45.5N, 210E
//!    is negative
//! 7. Write `eof`, `pc` and `variance_fraction` with descriptive metadata
//!
//! ## Module Organization
//!
//! - [`config`]: Run configuration and file naming
//! - [`calendar`]: The fixed monthly calendar
//! - [`region`]: Geographic box selection
//! - [`field`]: In-memory SST field
//! - [`netcdf_io`]: Reading SST, writing the result
//! - [`seasonal`]: JFM annual means
//! - [`eof`]: EOF solver
//! - [`npgo`]: Pipeline and sign convention
//! - [`parallel`]: Parallel processing configuration
//! - [`errors`]: Centralized error handling
//!
//! ## Usage
//!
//! ```rust,no_run
//! use npgo::prelude::*;
//!
//! let config = RunConfig::new("001", 1920, 2015)
//!     .with_input_dir("/data/residuals")
//!     .with_output_dir("/data/npgo");
//! let output = npgo::run(&config).unwrap();
//! println!("wrote {}", output.display());
//! ```

pub mod calendar;
pub mod cli;
pub mod config;
pub mod eof;
pub mod errors;
pub mod field;
pub mod netcdf_io;
pub mod npgo;
pub mod parallel;
pub mod region;
pub mod seasonal;

pub use crate::errors::{NpgoError, Result};
pub use crate::npgo::{compute_npgo, run};

pub mod prelude {
    //! Commonly used imports for convenience
    pub use crate::config::RunConfig;
    pub use crate::eof::{Eof, EofScaling};
    pub use crate::errors::{NpgoError, Result};
    pub use crate::field::SstField;
    pub use crate::netcdf_io::NpgoWriter;
    pub use crate::npgo::NpgoIndex;
    pub use crate::parallel::ParallelConfig;
    pub use crate::region::Region;
}
