//! Empirical Orthogonal Function analysis of (time, lat, lon) fields
//!
//! [`Eof`] decomposes a weighted field with a thin SVD. The input is used as
//! given: no time mean is removed, so callers pass anomalies. Modes come out
//! in order of decreasing eigenvalue.
//!
//! Grid points that are missing (NaN) at every time are dropped before the
//! decomposition and come back as NaN in every spatial output. A point that is
//! missing at some times but not others is an error.
//!
//! ```rust,no_run
//! use npgo::eof::{latitude_weights, Eof, EofScaling};
//! # fn demo(data: ndarray::Array3<f64>, lat: Vec<f64>) -> npgo::Result<()> {
//! let weights = latitude_weights(&lat, data.dim().2);
//! let solver = Eof::new(&data, &weights)?;
//! let patterns = solver.eofs_as_correlation(2);
//! let pcs = solver.project_field(&data, 2, EofScaling::DivideBySqrtEigenvalue)?;
//! # Ok(())
//! # }
//! ```

use crate::errors::{NpgoError, Result};
use nalgebra::{DMatrix, SVD};
use ndarray::{Array1, Array2, Array3, ArrayView1, Axis};
use rayon::prelude::*;

/// How EOFs are scaled before a field is projected onto them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EofScaling {
    /// Unit-length EOFs
    #[default]
    None,
    /// EOFs divided by the square root of their eigenvalue
    DivideBySqrtEigenvalue,
    /// EOFs multiplied by the square root of their eigenvalue
    MultiplyBySqrtEigenvalue,
}

/// Square root of the cosine of latitude, broadcast over longitude
#[must_use]
pub fn latitude_weights(lat: &[f64], nlon: usize) -> Array2<f64> {
    Array2::from_shape_fn((lat.len(), nlon), |(i, _)| lat[i].to_radians().cos().sqrt())
}

/// EOF solver for a single field
#[derive(Debug, Clone)]
pub struct Eof {
    nlat: usize,
    nlon: usize,
    /// Flat (lat * nlon + lon) index of every non-missing grid point
    valid: Vec<usize>,
    /// Weight of each non-missing grid point
    weights: Array1<f64>,
    /// Unweighted input restricted to non-missing points, `[time, point]`
    original: Array2<f64>,
    /// All eigenvalues, descending
    eigenvalues: Array1<f64>,
    /// Unit-length EOFs in weighted space, `[mode, point]`
    eofs: Array2<f64>,
    /// Unscaled principal components, `[time, mode]`
    pcs: Array2<f64>,
}

impl Eof {
    /// Decompose `data` (`[time, lat, lon]`) with spatial `weights` (`[lat, lon]`).
    ///
    /// # Errors
    ///
    /// Fails when the weights do not match the grid, fewer than two time steps
    /// are given, missing values are inconsistent in time, every point is
    /// missing, or the SVD does not converge.
    pub fn new(data: &Array3<f64>, weights: &Array2<f64>) -> Result<Self> {
        let (nt, nlat, nlon) = data.dim();
        if weights.dim() != (nlat, nlon) {
            return Err(NpgoError::GridMismatch {
                expected: (nlat, nlon),
                found: weights.dim(),
            });
        }
        if nt < 2 {
            return Err(NpgoError::Decomposition(format!(
                "need at least two time steps, got {nt}"
            )));
        }

        let flat = flatten(data)?;
        let valid = non_missing_points(&flat)?;
        if valid.is_empty() {
            return Err(NpgoError::Decomposition(
                "all grid points are missing".to_string(),
            ));
        }

        let flat_weights = weights.as_standard_layout();
        let flat_weights = flat_weights.view().into_shape(nlat * nlon)?;
        let weights: Array1<f64> = valid.iter().map(|&p| flat_weights[p]).collect();
        let original = flat.select(Axis(1), &valid);

        let nv = valid.len();
        let weighted = DMatrix::from_fn(nt, nv, |t, v| original[[t, v]] * weights[v]);

        let svd = SVD::try_new(weighted, true, true, f64::EPSILON, 0)
            .ok_or_else(|| NpgoError::Decomposition("SVD did not converge".to_string()))?;
        let (u, v_t) = match (svd.u, svd.v_t) {
            (Some(u), Some(v_t)) => (u, v_t),
            _ => {
                return Err(NpgoError::Decomposition(
                    "SVD did not produce singular vectors".to_string(),
                ))
            }
        };
        let singular = svd.singular_values;

        let mut order: Vec<usize> = (0..singular.len()).collect();
        order.sort_by(|&a, &b| singular[b].total_cmp(&singular[a]));

        let nmodes = order.len();
        let dof = (nt - 1) as f64;
        let eigenvalues: Array1<f64> = order.iter().map(|&k| singular[k].powi(2) / dof).collect();
        let eofs = Array2::from_shape_fn((nmodes, nv), |(m, v)| v_t[(order[m], v)]);
        let pcs = Array2::from_shape_fn((nt, nmodes), |(t, m)| {
            u[(t, order[m])] * singular[order[m]]
        });

        tracing::debug!(
            times = nt,
            points = nv,
            missing = nlat * nlon - nv,
            leading = ?eigenvalues.iter().take(4).collect::<Vec<_>>(),
            "EOF decomposition complete"
        );

        Ok(Self {
            nlat,
            nlon,
            valid,
            weights,
            original,
            eigenvalues,
            eofs,
            pcs,
        })
    }

    /// Number of modes the decomposition produced
    #[must_use]
    pub fn n_modes(&self) -> usize {
        self.eigenvalues.len()
    }

    /// Leading `n` eigenvalues
    #[must_use]
    pub fn eigenvalues(&self, n: usize) -> Array1<f64> {
        self.eigenvalues.slice(ndarray::s![..self.clamp(n)]).to_owned()
    }

    /// Fraction of the total variance carried by each of the leading `n` modes
    #[must_use]
    pub fn variance_fraction(&self, n: usize) -> Array1<f64> {
        let total = self.eigenvalues.sum();
        self.eigenvalues(n).mapv(|l| l / total)
    }

    /// Leading `n` EOFs, `[mode, lat, lon]`
    #[must_use]
    pub fn eofs(&self, n: usize) -> Array3<f64> {
        let n = self.clamp(n);
        let mut out = Array3::from_elem((n, self.nlat, self.nlon), f64::NAN);
        for m in 0..n {
            for (v, &p) in self.valid.iter().enumerate() {
                out[[m, p / self.nlon, p % self.nlon]] = self.eofs[[m, v]];
            }
        }
        out
    }

    /// Leading `n` principal components, `[time, mode]`, unscaled
    #[must_use]
    pub fn pcs(&self, n: usize) -> Array2<f64> {
        self.pcs.slice(ndarray::s![.., ..self.clamp(n)]).to_owned()
    }

    /// Leading `n` EOFs expressed as the correlation between each PC and the
    /// input field at every grid point, `[mode, lat, lon]`
    #[must_use]
    pub fn eofs_as_correlation(&self, n: usize) -> Array3<f64> {
        let n = self.clamp(n);
        let mut out = Array3::from_elem((n, self.nlat, self.nlon), f64::NAN);

        for m in 0..n {
            let pc = self.pcs.column(m);
            let correlations: Vec<f64> = (0..self.valid.len())
                .into_par_iter()
                .map(|v| pearson(pc, self.original.column(v)))
                .collect();
            for (v, &p) in self.valid.iter().enumerate() {
                out[[m, p / self.nlon, p % self.nlon]] = correlations[v];
            }
        }
        out
    }

    /// Project another field on the same grid onto the leading `n` EOFs,
    /// returning pseudo-PCs `[time, mode]`.
    ///
    /// The field is weighted like the training data and must be missing at
    /// exactly the same grid points.
    ///
    /// # Errors
    ///
    /// Returns [`NpgoError::GridMismatch`] for a different grid and
    /// [`NpgoError::InconsistentMissing`] when the missing points differ.
    pub fn project_field(
        &self,
        field: &Array3<f64>,
        n: usize,
        scaling: EofScaling,
    ) -> Result<Array2<f64>> {
        let (nt, nlat, nlon) = field.dim();
        if (nlat, nlon) != (self.nlat, self.nlon) {
            return Err(NpgoError::GridMismatch {
                expected: (self.nlat, self.nlon),
                found: (nlat, nlon),
            });
        }

        let flat = flatten(field)?;
        if nt > 0 && non_missing_points(&flat)? != self.valid {
            return Err(NpgoError::InconsistentMissing);
        }

        let n = self.clamp(n);
        let scale: Vec<f64> = (0..n)
            .map(|m| match scaling {
                EofScaling::None => 1.0,
                EofScaling::DivideBySqrtEigenvalue => 1.0 / self.eigenvalues[m].sqrt(),
                EofScaling::MultiplyBySqrtEigenvalue => self.eigenvalues[m].sqrt(),
            })
            .collect();

        let rows: Vec<Vec<f64>> = (0..nt)
            .into_par_iter()
            .map(|t| {
                (0..n)
                    .map(|m| {
                        let dot: f64 = self
                            .valid
                            .iter()
                            .enumerate()
                            .map(|(v, &p)| flat[[t, p]] * self.weights[v] * self.eofs[[m, v]])
                            .sum();
                        dot * scale[m]
                    })
                    .collect()
            })
            .collect();

        Ok(Array2::from_shape_fn((nt, n), |(t, m)| rows[t][m]))
    }

    fn clamp(&self, n: usize) -> usize {
        n.min(self.n_modes())
    }
}

/// `[time, lat, lon]` to `[time, lat * nlon + lon]`
fn flatten(data: &Array3<f64>) -> Result<Array2<f64>> {
    let (nt, nlat, nlon) = data.dim();
    Ok(data
        .as_standard_layout()
        .into_owned()
        .into_shape((nt, nlat * nlon))?)
}

/// Grid points that are not NaN, judged on the first time step and required to
/// hold at every other time step.
fn non_missing_points(flat: &Array2<f64>) -> Result<Vec<usize>> {
    let Some(first) = flat.outer_iter().next() else {
        return Ok(Vec::new());
    };
    let valid: Vec<usize> = (0..first.len()).filter(|&p| !first[p].is_nan()).collect();

    let consistent = flat.outer_iter().all(|row| {
        row.iter()
            .enumerate()
            .all(|(p, v)| v.is_nan() == first[p].is_nan())
    });
    if !consistent {
        return Err(NpgoError::InconsistentMissing);
    }
    Ok(valid)
}

/// Pearson correlation of two equally long series
fn pearson(x: ArrayView1<f64>, y: ArrayView1<f64>) -> f64 {
    let n = x.len() as f64;
    let mx = x.sum() / n;
    let my = y.sum() / n;

    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (&a, &b) in x.iter().zip(y.iter()) {
        let (da, db) = (a - mx, b - my);
        sxy += da * db;
        sxx += da * da;
        syy += db * db;
    }
    sxy / (sxx * syy).sqrt()
}
