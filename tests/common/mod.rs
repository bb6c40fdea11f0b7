//! Synthetic SST residuals with an analytically known EOF structure.
//!
//! Inside the Northeast Pacific box the field is `a(t) * c1(lon) + b(t) * c2(lon)`
//! with `c1 = [1, 1, 1]` and `c2 = [1, -2, 1]` over longitudes 200, 210, 220.
//! During JFM, `a` alternates 2, -2 year by year and `b` follows 1, 1, -1, -1, so
//! over any run of whole four-year blocks starting in 1920 the two modes are
//! orthogonal in time and space. Mode 0 carries 2/3 of the variance and mode 1
//! (the `b` pattern) carries 1/3.

#![allow(dead_code)]

use chrono::Datelike;
use ndarray::{Array1, Array3, Array4};
use netcdf::create;
use npgo::calendar::{self, N_MONTHS};
use npgo::field::SstField;
use std::path::Path;

/// Full input grid, including points outside the box
pub const LAT: [f64; 5] = [10.5, 30.5, 45.5, 55.5, 70.5];
pub const LON: [f64; 5] = [150.0, 200.0, 210.0, 220.0, 260.0];

/// The part of the grid inside the box
pub const BOX_LAT: [f64; 3] = [30.5, 45.5, 55.5];
pub const BOX_LON: [f64; 3] = [200.0, 210.0, 220.0];

/// Value used everywhere outside the box
pub const OUTSIDE: f32 = 99.0;

pub const FILL: f32 = -999.0;

/// Mode amplitudes `(a, b)` for a calendar month
pub fn amplitudes(year: i32, month: u32) -> (f64, f64) {
    if month <= 3 {
        let k = (year - 1920).rem_euclid(4);
        let a = if k % 2 == 0 { 2.0 } else { -2.0 };
        let b = if k < 2 { 1.0 } else { -1.0 };
        (a, b)
    } else {
        (0.5, -0.25)
    }
}

/// Zonal structure `(c1, c2)` of the two modes
pub fn structure(lon: f64) -> (f64, f64) {
    if (lon - 210.0).abs() < 1e-9 {
        (1.0, -2.0)
    } else {
        (1.0, 1.0)
    }
}

fn in_box(lat: f64, lon: f64) -> bool {
    (25.0..=62.0).contains(&lat) && (180.0..=250.0).contains(&lon)
}

pub fn value(year: i32, month: u32, lat: f64, lon: f64) -> f32 {
    if !in_box(lat, lon) {
        return OUTSIDE;
    }
    let (a, b) = amplitudes(year, month);
    let (c1, c2) = structure(lon);
    (a * c1 + b * c2) as f32
}

/// Expected NPGO index for a window of `n_years` whole years
pub fn expected_pc(year: i32, month: u32, n_years: usize) -> f64 {
    let (_, b) = amplitudes(year, month);
    let n = n_years as f64;
    b * ((n - 1.0) / n).sqrt()
}

/// In-memory field over the box for `[start_year, end_year]`
pub fn synthetic_field(start_year: i32, end_year: i32) -> SstField {
    let months = calendar::months_of(calendar::year_window(start_year, end_year));
    let data = Array3::from_shape_fn(
        (months.len(), BOX_LAT.len(), BOX_LON.len()),
        |(t, i, j)| value(months[t].year(), months[t].month(), BOX_LAT[i], BOX_LON[j]),
    );
    SstField::new(data, BOX_LAT.to_vec(), BOX_LON.to_vec(), months)
        .expect("synthetic field has consistent coordinates")
}

fn full_data() -> Array3<f32> {
    Array3::from_shape_fn((N_MONTHS, LAT.len(), LON.len()), |(t, i, j)| {
        let (year, month) = calendar::year_month(t);
        value(year, month, LAT[i], LON[j])
    })
}

fn put_coordinates(file: &mut netcdf::FileMut, n_time: usize) -> Result<(), netcdf::Error> {
    file.add_dimension("time", n_time)?;
    file.add_dimension("lat", LAT.len())?;
    file.add_dimension("lon", LON.len())?;

    // Deliberately meaningless time values: the reader must ignore them
    {
        let mut time_var = file.add_variable::<f64>("time", &["time"])?;
        time_var.put_attribute("units", "days since 0000-01-01")?;
        let time = Array1::from_shape_fn(n_time, |t| t as f64);
        time_var.put(time.view(), ..)?;
    }

    {
        let mut lat_var = file.add_variable::<f32>("lat", &["lat"])?;
        lat_var.put_attribute("units", "degrees_north")?;
        let lat = Array1::from_iter(LAT.iter().map(|&v| v as f32));
        lat_var.put(lat.view(), ..)?;
    }

    {
        let mut lon_var = file.add_variable::<f32>("lon", &["lon"])?;
        lon_var.put_attribute("units", "degrees_east")?;
        let lon = Array1::from_iter(LON.iter().map(|&v| v as f32));
        lon_var.put(lon.view(), ..)?;
    }

    Ok(())
}

/// Residual file name for an ensemble member
pub fn residual_path(dir: &Path, ensemble: &str) -> std::path::PathBuf {
    dir.join(format!("remapped.SST.{ensemble}.192001-210012.nc"))
}

/// Write a full 1920-2100 residual file laid out `(time, lat, lon)`
pub fn write_residual_file(dir: &Path, ensemble: &str) -> Result<(), netcdf::Error> {
    let mut file = create(residual_path(dir, ensemble))?;
    put_coordinates(&mut file, N_MONTHS)?;

    let mut sst = file.add_variable::<f32>("SST", &["time", "lat", "lon"])?;
    sst.put_attribute("units", "degC")?;
    sst.put(full_data().view(), ..)?;
    Ok(())
}

/// Same field with a `(time, z_t, lat, lon)` layout and a single level
pub fn write_single_level_file(dir: &Path, ensemble: &str) -> Result<(), netcdf::Error> {
    let mut file = create(residual_path(dir, ensemble))?;
    put_coordinates(&mut file, N_MONTHS)?;
    file.add_dimension("z_t", 1)?;

    let data = full_data();
    let data4 = Array4::from_shape_fn((N_MONTHS, 1, LAT.len(), LON.len()), |(t, _, i, j)| {
        data[[t, i, j]]
    });
    let mut sst = file.add_variable::<f32>("SST", &["time", "z_t", "lat", "lon"])?;
    sst.put(data4.view(), ..)?;
    Ok(())
}

/// Same field with `land` (an in-box `(lat, lon)`) filled at every time step
pub fn write_file_with_land(dir: &Path, ensemble: &str, land: (f64, f64)) -> Result<(), netcdf::Error> {
    let mut file = create(residual_path(dir, ensemble))?;
    put_coordinates(&mut file, N_MONTHS)?;

    let mut data = full_data();
    let i = LAT.iter().position(|&v| v == land.0).expect("land lat on grid");
    let j = LON.iter().position(|&v| v == land.1).expect("land lon on grid");
    data.slice_mut(ndarray::s![.., i, j]).fill(FILL);

    let mut sst = file.add_variable::<f32>("SST", &["time", "lat", "lon"])?;
    sst.put_attribute("_FillValue", FILL)?;
    sst.put(data.view(), ..)?;
    Ok(())
}

/// A file whose time axis is too short for the model calendar
pub fn write_short_file(dir: &Path, ensemble: &str) -> Result<(), netcdf::Error> {
    let mut file = create(residual_path(dir, ensemble))?;
    put_coordinates(&mut file, 12)?;

    let data = Array3::<f32>::zeros((12, LAT.len(), LON.len()));
    let mut sst = file.add_variable::<f32>("SST", &["time", "lat", "lon"])?;
    sst.put(data.view(), ..)?;
    Ok(())
}

pub fn assert_close(actual: f64, expected: f64, tol: f64) {
    assert!(
        (actual - expected).abs() <= tol,
        "expected {expected}, got {actual} (tolerance {tol})"
    );
}
