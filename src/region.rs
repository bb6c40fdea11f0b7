//! Geographic box selection on monotonic coordinate axes

use crate::errors::{NpgoError, Result};
use std::ops::Range;

/// Latitude/longitude box, bounds inclusive, longitudes in degrees east
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Region {
    pub lat_min: f64,
    pub lat_max: f64,
    pub lon_min: f64,
    pub lon_max: f64,
}

impl Region {
    /// Northeast Pacific box used for the NPGO: 25-62N, 180-250E
    pub const NORTHEAST_PACIFIC: Self = Self {
        lat_min: 25.0,
        lat_max: 62.0,
        lon_min: 180.0,
        lon_max: 250.0,
    };

    /// Index ranges of `lat` and `lon` inside the box
    ///
    /// # Errors
    ///
    /// Returns [`NpgoError::EmptySelection`] if either axis has no point in the box.
    pub fn select(&self, lat: &[f64], lon: &[f64]) -> Result<(Range<usize>, Range<usize>)> {
        let lat_range = select_range("lat", lat, self.lat_min, self.lat_max)?;
        let lon_range = select_range("lon", lon, self.lon_min, self.lon_max)?;
        Ok((lat_range, lon_range))
    }
}

impl Default for Region {
    fn default() -> Self {
        Self::NORTHEAST_PACIFIC
    }
}

/// Contiguous index range of a monotonic axis with values in `[lo, hi]`.
///
/// Works for ascending and descending axes.
///
/// # Errors
///
/// Returns [`NpgoError::EmptySelection`] when no value lies in the interval.
pub fn select_range(name: &str, coords: &[f64], lo: f64, hi: f64) -> Result<Range<usize>> {
    let inside = |v: f64| v >= lo && v <= hi;

    let first = coords.iter().position(|&v| inside(v));
    let last = coords.iter().rposition(|&v| inside(v));

    match (first, last) {
        (Some(first), Some(last)) => Ok(first..last + 1),
        _ => Err(NpgoError::EmptySelection {
            coord: name.to_string(),
            lo,
            hi,
        }),
    }
}

/// Index of the coordinate equal to `value` within `tolerance`
///
/// # Errors
///
/// Returns [`NpgoError::CoordinateNotFound`] when no coordinate matches.
pub fn locate(name: &str, coords: &[f64], value: f64, tolerance: f64) -> Result<usize> {
    coords
        .iter()
        .position(|&c| (c - value).abs() <= tolerance)
        .ok_or_else(|| NpgoError::CoordinateNotFound {
            coord: name.to_string(),
            value,
        })
}
