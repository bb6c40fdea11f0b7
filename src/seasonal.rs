//! Seasonal resampling: annual means over January-March
//!
//! Months outside JFM are masked out, then each calendar year is averaged.
//! Every year between the first and last time step gets a bin; a bin with no
//! valid JFM value comes out NaN and is passed on unchanged.

use crate::calendar::is_jfm;
use crate::errors::Result;
use crate::field::SstField;
use chrono::Datelike;
use ndarray::Array3;
use rayon::prelude::*;

/// Annual JFM means, indexed `[year, lat, lon]`
#[derive(Debug, Clone)]
pub struct SeasonalMeans {
    pub years: Vec<i32>,
    pub data: Array3<f64>,
}

/// Computes annual JFM means of a monthly field using parallel processing
///
/// # Errors
///
/// Returns an error if the field's values cannot be viewed as a (time, space)
/// matrix.
pub fn jfm_annual_mean(field: &SstField) -> Result<SeasonalMeans> {
    let (nt, nlat, nlon) = field.data.dim();
    let npoints = nlat * nlon;

    let years: Vec<i32> = match (field.time.first(), field.time.last()) {
        (Some(first), Some(last)) => (first.year()..=last.year()).collect(),
        _ => Vec::new(),
    };

    // Time indices contributing to each year's mean
    let bins: Vec<Vec<usize>> = years
        .iter()
        .map(|&year| {
            field
                .time
                .iter()
                .enumerate()
                .filter(|(_, date)| date.year() == year && is_jfm(date))
                .map(|(i, _)| i)
                .collect()
        })
        .collect();

    let data = field.data.as_standard_layout();
    let flat = data.view().into_shape((nt, npoints))?;

    tracing::debug!(
        years = years.len(),
        points = npoints,
        threads = rayon::current_num_threads(),
        "computing JFM annual means"
    );

    let columns: Vec<Vec<f64>> = (0..npoints)
        .into_par_iter()
        .map(|p| {
            bins.iter()
                .map(|bin| {
                    let mut sum = 0.0_f64;
                    let mut count = 0_u32;
                    for &t in bin {
                        let value = f64::from(flat[[t, p]]);
                        if value.is_finite() {
                            sum += value;
                            count += 1;
                        }
                    }
                    if count > 0 {
                        sum / f64::from(count)
                    } else {
                        f64::NAN
                    }
                })
                .collect()
        })
        .collect();

    let means = Array3::from_shape_fn((years.len(), nlat, nlon), |(y, i, j)| {
        columns[i * nlon + j][y]
    });

    Ok(SeasonalMeans { years, data: means })
}
