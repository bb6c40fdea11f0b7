//! In-memory SST field on a (time, lat, lon) grid

use crate::errors::{NpgoError, Result};
use chrono::NaiveDate;
use ndarray::Array3;

/// SST values with their coordinates. Missing values are NaN.
#[derive(Debug, Clone)]
pub struct SstField {
    /// Values indexed `[time, lat, lon]`
    pub data: Array3<f32>,
    /// Latitudes in degrees north
    pub lat: Vec<f64>,
    /// Longitudes in degrees east
    pub lon: Vec<f64>,
    /// Month-end date of each time step
    pub time: Vec<NaiveDate>,
}

impl SstField {
    /// Assemble a field, checking coordinate lengths against the data shape.
    ///
    /// # Errors
    ///
    /// Returns [`NpgoError::UnsupportedShape`] if any coordinate length disagrees
    /// with the matching axis of `data`.
    pub fn new(
        data: Array3<f32>,
        lat: Vec<f64>,
        lon: Vec<f64>,
        time: Vec<NaiveDate>,
    ) -> Result<Self> {
        let (nt, nlat, nlon) = data.dim();
        if nt != time.len() || nlat != lat.len() || nlon != lon.len() {
            return Err(NpgoError::UnsupportedShape {
                var: "SST".to_string(),
                shape: data.shape().to_vec(),
            });
        }
        Ok(Self {
            data,
            lat,
            lon,
            time,
        })
    }

    /// Same field with every value negated
    #[must_use]
    pub fn negated(&self) -> Self {
        Self {
            data: self.data.mapv(|v| -v),
            ..self.clone()
        }
    }
}
