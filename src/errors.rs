//! Centralized error handling for npgo
//!
//! Every fallible operation in the crate returns [`Result`], whose error side is
//! [`NpgoError`]. The two year-range variants are the only domain checks; the rest
//! wrap failures coming up from the NetCDF, array and decomposition layers.

use thiserror::Error;

/// Main error type for npgo operations
#[derive(Debug, Error)]
pub enum NpgoError {
    /// Requested start year precedes the model calendar
    #[error("Starting year must be {min} or later (got {year}).")]
    StartYearOutOfRange { year: i32, min: i32 },

    /// Requested end year runs past the model calendar
    #[error("End year must be {max} or earlier (got {year}).")]
    EndYearOutOfRange { year: i32, max: i32 },

    /// A year argument that is not an integer
    #[error("Invalid year '{value}': expected an integer")]
    InvalidYear { value: String },

    /// NetCDF file operation errors
    #[error("NetCDF error: {0}")]
    NetCDF(#[from] netcdf::Error),

    /// I/O operation errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Array shape or dimension error
    #[error("Array error: {0}")]
    Shape(#[from] ndarray::ShapeError),

    /// Variable not found in NetCDF file
    #[error("Variable '{var}' not found in file")]
    VariableNotFound { var: String },

    /// Variable layout the reader does not understand
    #[error("Variable '{var}' has unsupported shape {shape:?}: expected (time, lat, lon)")]
    UnsupportedShape { var: String, shape: Vec<usize> },

    /// File time axis does not match the fixed monthly calendar
    #[error("Time axis has {found} steps but the monthly calendar 1920-01..2100-12 has {expected}")]
    CalendarMismatch { expected: usize, found: usize },

    /// Coordinate selection matched nothing
    #[error("No '{coord}' values within [{lo}, {hi}]")]
    EmptySelection { coord: String, lo: f64, hi: f64 },

    /// Point lookup on a coordinate that does not carry the value
    #[error("Coordinate {coord}={value} not present in the grid")]
    CoordinateNotFound { coord: String, value: f64 },

    /// Field handed to the solver on a different grid than it was built on
    #[error("Field grid {found:?} does not match the EOF grid {expected:?}")]
    GridMismatch {
        expected: (usize, usize),
        found: (usize, usize),
    },

    /// Missing values that move around in time
    #[error("Missing values detected in different locations at different times")]
    InconsistentMissing,

    /// Degenerate or otherwise undecomposable input
    #[error("EOF decomposition failed: {0}")]
    Decomposition(String),

    /// Thread pool configuration error
    #[error("Thread pool error: {0}")]
    ThreadPool(String),
}

/// Result type alias for npgo operations
pub type Result<T> = std::result::Result<T, NpgoError>;
