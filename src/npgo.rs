//! NPGO index computation
//!
//! The North Pacific Gyre Oscillation is the second EOF mode of winter (JFM)
//! SST anomalies over the Northeast Pacific (25-62N, 180-250E). The pattern is
//! reported as a correlation map, and the index is a monthly pseudo-PC obtained
//! by projecting every month of the requested window onto the EOFs of the
//! annual JFM means.
//!
//! References: Di Lorenzo & Mantua (2016), Nature Climate Change 6(11),
//! doi:10.1038/nclimate3082; Joh & Di Lorenzo (2017), GRL 44,
//! doi:10.1002/2017GL075930.

use crate::config::RunConfig;
use crate::eof::{latitude_weights, Eof, EofScaling};
use crate::errors::{NpgoError, Result};
use crate::field::SstField;
use crate::netcdf_io::{read_sst, write_npgo_to_netcdf};
use crate::region::{locate, Region};
use crate::seasonal::jfm_annual_mean;
use chrono::NaiveDate;
use ndarray::{Array1, Array2, Axis};
use std::path::PathBuf;

/// Number of modes retained from the decomposition
pub const N_EOFS: usize = 2;

/// Zero-based index of the NPGO mode
pub const NPGO_MODE: usize = 1;

/// Grid point (lat, lon) whose correlation must come out negative
pub const ORIENTATION_POINT: (f64, f64) = (45.5, 210.0);

const COORD_TOLERANCE: f64 = 1e-6;

/// The NPGO mode: pattern, index and explained variance
#[derive(Debug, Clone)]
pub struct NpgoIndex {
    /// Correlation between the PC and JFM SST anomalies, `[lat, lon]`
    pub eof: Array2<f64>,
    /// Monthly pseudo-PC
    pub pc: Array1<f64>,
    /// Fraction of JFM variance explained by the mode
    pub variance_fraction: f64,
    /// Zero-based mode number
    pub mode: usize,
    pub lat: Vec<f64>,
    pub lon: Vec<f64>,
    /// Month-end date of each `pc` value
    pub time: Vec<NaiveDate>,
}

impl NpgoIndex {
    /// Compute the oriented NPGO mode from a monthly field already cut to the
    /// region and years of interest.
    ///
    /// # Errors
    ///
    /// Propagates decomposition failures and fails if the orientation point
    /// is not on the grid.
    pub fn from_field(field: &SstField) -> Result<Self> {
        let seasonal = jfm_annual_mean(field)?;
        tracing::debug!(
            first = ?seasonal.years.first(),
            last = ?seasonal.years.last(),
            "seasonal means ready"
        );

        let weights = latitude_weights(&field.lat, field.lon.len());
        let solver = Eof::new(&seasonal.data, &weights)?;
        if solver.n_modes() <= NPGO_MODE {
            return Err(NpgoError::Decomposition(format!(
                "only {} mode(s) available, need mode {NPGO_MODE}",
                solver.n_modes()
            )));
        }

        let patterns = solver.eofs_as_correlation(N_EOFS);
        let variance = solver.variance_fraction(N_EOFS);

        let monthly = field.data.mapv(f64::from);
        let pseudo_pcs =
            solver.project_field(&monthly, N_EOFS, EofScaling::DivideBySqrtEigenvalue)?;

        let mut index = Self {
            eof: patterns.index_axis(Axis(0), NPGO_MODE).to_owned(),
            pc: pseudo_pcs.column(NPGO_MODE).to_owned(),
            variance_fraction: variance[NPGO_MODE],
            mode: NPGO_MODE,
            lat: field.lat.clone(),
            lon: field.lon.clone(),
            time: field.time.clone(),
        };
        index.orient()?;
        Ok(index)
    }

    /// Fix the sign so the correlation at [`ORIENTATION_POINT`] is negative.
    ///
    /// Pattern and index are negated together unless the value there is
    /// already below zero; a NaN there also triggers the flip. Returns whether
    /// a flip happened.
    ///
    /// # Errors
    ///
    /// Returns [`NpgoError::CoordinateNotFound`] if the point is not on the grid.
    pub fn orient(&mut self) -> Result<bool> {
        let (lat, lon) = ORIENTATION_POINT;
        let i = locate("lat", &self.lat, lat, COORD_TOLERANCE)?;
        let j = locate("lon", &self.lon, lon, COORD_TOLERANCE)?;

        if self.eof[[i, j]] < 0.0 {
            return Ok(false);
        }
        self.eof.mapv_inplace(|v| -v);
        self.pc.mapv_inplace(|v| -v);
        Ok(true)
    }
}

/// Validate the request, read the ensemble member and compute its NPGO mode.
///
/// # Errors
///
/// Year-range errors are raised before the input file is touched; anything
/// from reading or decomposing is propagated.
pub fn compute_npgo(config: &RunConfig) -> Result<NpgoIndex> {
    config.validate()?;
    println!("Computing NPGO for ensemble number {}...", config.ensemble);

    let input = config.input_path();
    let field = read_sst(
        &input,
        &Region::NORTHEAST_PACIFIC,
        config.start_year,
        config.end_year,
    )?;
    println!("Global residuals loaded...");
    tracing::debug!(path = %input.display(), shape = ?field.data.dim(), "SST loaded");

    let index = NpgoIndex::from_field(&field)?;
    println!("NPGO computed.");
    Ok(index)
}

/// Compute the NPGO and save it, returning the output path.
///
/// # Errors
///
/// See [`compute_npgo`]; write failures are propagated as well.
pub fn run(config: &RunConfig) -> Result<PathBuf> {
    let index = compute_npgo(config)?;

    println!("Saving to netCDF...");
    let output = config.output_path();
    write_npgo_to_netcdf(&index, &output)?;
    Ok(output)
}
