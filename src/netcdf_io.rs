//! NetCDF I/O: reading the SST residuals and writing the NPGO result
//!
//! The reader pulls only the hyperslab the index needs (requested years and the
//! Northeast Pacific box) out of the full 1920-2100 global file. The writer
//! lays out the result the way downstream analysis scripts expect: a 2-D `eof`
//! correlation map, a monthly `pc` series, a scalar `variance_fraction`, and a
//! scalar `mode` coordinate recording which mode was kept.

use crate::calendar::{self, TIME_CALENDAR, TIME_UNITS};
use crate::config::SST_VARIABLE;
use crate::errors::{NpgoError, Result};
use crate::field::SstField;
use crate::npgo::NpgoIndex;
use crate::region::Region;
use chrono::Utc;
use ndarray::{arr0, Array1, Array3};
use netcdf::{AttributeValue, File, Variable};
use std::{fs, ops::Range, path::Path};

/// Free-text attributes attached to the output
pub mod attrs {
    pub const EOF_LONG_NAME: &str = "Correlation between PC and JFM SSTa";
    pub const PC_LONG_NAME: &str = "Principal component for NPGO";
    pub const DESCRIPTION: &str =
        "Second mode of JFM SSTa variability over 25-62N and 180-110W.";
    pub const ANOMALIES: &str =
        "Anomalies were computed by removing the ensemble mean at each grid cell.";
    pub const WEIGHTING: &str = concat!(
        "The native grid was regridded to a standard 1deg x 1deg (180x360) grid.",
        "Weighting was computed via the sqrt of the cosine of latitude."
    );
}

/// Where the time, lat and lon axes sit in the SST variable
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Layout {
    /// `(time, lat, lon)`
    Plain,
    /// `(time, 1, lat, lon)`, a single vertical level
    SingleLevel,
}

impl Layout {
    fn detect(var: &str, shape: &[usize]) -> Result<Self> {
        match shape {
            [_, _, _] => Ok(Self::Plain),
            [_, 1, _, _] => Ok(Self::SingleLevel),
            _ => Err(NpgoError::UnsupportedShape {
                var: var.to_string(),
                shape: shape.to_vec(),
            }),
        }
    }

    /// Positions of the time, lat and lon axes
    const fn axes(self) -> (usize, usize, usize) {
        match self {
            Self::Plain => (0, 1, 2),
            Self::SingleLevel => (0, 2, 3),
        }
    }
}

/// Reads SST for `[start_year, end_year]` over `region` from a residual file.
///
/// The file's own time coordinate is ignored and the fixed monthly calendar is
/// assigned instead, so the time axis must hold exactly 1920-01..2100-12.
///
/// # Errors
///
/// Fails if the file cannot be opened, `SST` or its coordinates are missing,
/// the layout is not `(time, lat, lon)`, or the region selects nothing.
pub fn read_sst(path: &Path, region: &Region, start_year: i32, end_year: i32) -> Result<SstField> {
    let file = netcdf::open(path)?;
    let var = file
        .variable(SST_VARIABLE)
        .ok_or_else(|| NpgoError::VariableNotFound {
            var: SST_VARIABLE.to_string(),
        })?;

    let dims = var.dimensions();
    let shape: Vec<usize> = dims.iter().map(netcdf::Dimension::len).collect();
    let layout = Layout::detect(SST_VARIABLE, &shape)?;
    let (time_axis, lat_axis, lon_axis) = layout.axes();

    calendar::check_length(shape[time_axis])?;

    let lat = read_coordinate(&file, &dims[lat_axis].name())?;
    let lon = read_coordinate(&file, &dims[lon_axis].name())?;
    let (lat_range, lon_range) = region.select(&lat, &lon)?;
    let time_range = calendar::year_window(start_year, end_year);

    tracing::debug!(
        ?shape,
        ?time_range,
        ?lat_range,
        ?lon_range,
        "reading SST hyperslab"
    );

    let data = read_hyperslab(
        &var,
        layout,
        time_range.clone(),
        lat_range.clone(),
        lon_range.clone(),
    )?;

    SstField::new(
        data,
        lat[lat_range].to_vec(),
        lon[lon_range].to_vec(),
        calendar::months_of(time_range),
    )
}

fn read_coordinate(file: &File, name: &str) -> Result<Vec<f64>> {
    let var = file
        .variable(name)
        .ok_or_else(|| NpgoError::VariableNotFound {
            var: name.to_string(),
        })?;
    Ok(var.get_values::<f64, _>(..)?)
}

fn read_hyperslab(
    var: &Variable,
    layout: Layout,
    time: Range<usize>,
    lat: Range<usize>,
    lon: Range<usize>,
) -> Result<Array3<f32>> {
    let dim = (time.len(), lat.len(), lon.len());
    if time.is_empty() {
        return Ok(Array3::zeros(dim));
    }

    let values: Vec<f32> = match layout {
        Layout::Plain => var.get_values::<f32, _>((time, lat, lon))?,
        Layout::SingleLevel => var.get_values::<f32, _>((time, 0..1, lat, lon))?,
    };

    let mut data = Array3::from_shape_vec(dim, values)?;
    let fills = fill_values(var);
    if !fills.is_empty() {
        data.mapv_inplace(|v| if fills.contains(&v) { f32::NAN } else { v });
    }
    Ok(data)
}

/// `_FillValue` and `missing_value` of a variable, if set
fn fill_values(var: &Variable) -> Vec<f32> {
    ["_FillValue", "missing_value"]
        .iter()
        .filter_map(|name| var.attribute(name))
        .filter_map(|attr| match attr.value().ok()? {
            AttributeValue::Float(v) => Some(v),
            AttributeValue::Double(v) => Some(v as f32),
            AttributeValue::Short(v) => Some(f32::from(v)),
            AttributeValue::Int(v) => Some(v as f32),
            _ => None,
        })
        .collect()
}

/// Writer for NPGO result files
pub struct NpgoWriter<'a> {
    output_path: &'a Path,
}

impl<'a> NpgoWriter<'a> {
    pub fn new(output_path: &'a Path) -> Self {
        Self { output_path }
    }

    /// Write the index, replacing any file already at the output path
    pub fn write(&self, index: &NpgoIndex) -> Result<()> {
        if self.output_path.exists() {
            fs::remove_file(self.output_path)?;
        }

        let mut file = netcdf::create(self.output_path)?;

        file.add_dimension("time", index.time.len())?;
        file.add_dimension("lat", index.lat.len())?;
        file.add_dimension("lon", index.lon.len())?;

        {
            let mut time_var = file.add_variable::<f64>("time", &["time"])?;
            time_var.put_attribute("units", TIME_UNITS)?;
            time_var.put_attribute("calendar", TIME_CALENDAR)?;
            time_var.put_attribute("long_name", "time")?;
            let days: Array1<f64> = index
                .time
                .iter()
                .map(|&d| calendar::days_since_epoch(d))
                .collect();
            time_var.put(days.view(), ..)?;
        }

        {
            let mut lat_var = file.add_variable::<f64>("lat", &["lat"])?;
            lat_var.put_attribute("units", "degrees_north")?;
            lat_var.put_attribute("long_name", "latitude")?;
            lat_var.put(Array1::from(index.lat.clone()).view(), ..)?;
        }

        {
            let mut lon_var = file.add_variable::<f64>("lon", &["lon"])?;
            lon_var.put_attribute("units", "degrees_east")?;
            lon_var.put_attribute("long_name", "longitude")?;
            lon_var.put(Array1::from(index.lon.clone()).view(), ..)?;
        }

        {
            let mut mode_var = file.add_variable::<i32>("mode", &[])?;
            mode_var.put_attribute("long_name", "eof_mode_number")?;
            mode_var.put(arr0(index.mode as i32).view(), ..)?;
        }

        {
            let mut eof_var = file.add_variable::<f64>("eof", &["lat", "lon"])?;
            eof_var.put_attribute("_FillValue", f64::NAN)?;
            eof_var.put_attribute("long_name", attrs::EOF_LONG_NAME)?;
            eof_var.put_attribute("coordinates", "mode")?;
            eof_var.put(index.eof.view(), ..)?;
        }

        {
            let mut pc_var = file.add_variable::<f64>("pc", &["time"])?;
            pc_var.put_attribute("long_name", attrs::PC_LONG_NAME)?;
            pc_var.put_attribute("coordinates", "mode")?;
            pc_var.put(index.pc.view(), ..)?;
        }

        {
            let mut vf_var = file.add_variable::<f64>("variance_fraction", &[])?;
            vf_var.put_attribute("long_name", "variance_fractions")?;
            vf_var.put_attribute("units", "dimensionless")?;
            vf_var.put_attribute("coordinates", "mode")?;
            vf_var.put(arr0(index.variance_fraction).view(), ..)?;
        }

        file.add_attribute("description", attrs::DESCRIPTION)?;
        file.add_attribute("anomalies", attrs::ANOMALIES)?;
        file.add_attribute("weighting", attrs::WEIGHTING)?;
        file.add_attribute(
            "history",
            format!("Created by npgo on {}", Utc::now().to_rfc3339()),
        )?;

        Ok(())
    }
}

/// Writes the index to `output_path`, overwriting without prompting.
pub fn write_npgo_to_netcdf(index: &NpgoIndex, output_path: &Path) -> Result<()> {
    NpgoWriter::new(output_path).write(index)
}
