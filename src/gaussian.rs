//! Multivariate normal distribution
//!
//! A [`Gaussian`] stores its mean and covariance together with the quantities derived from them
//! (Cholesky factor, precision matrix, log normalisation constant), which are computed once at
//! construction. Instances are never mutated: every EM step builds fresh ones.

use ndarray::{Array1, Array2, ArrayBase, ArrayView1, Axis, Data, Ix1, Ix2};
use ndarray_rand::rand::Rng;
use ndarray_rand::rand_distr::{Distribution, StandardNormal};
use ndarray_rand::RandomExt;
#[cfg(feature = "serde")]
use serde_crate::{Deserialize, Serialize};
#[cfg(feature = "serde")]
use std::convert::TryFrom;

use crate::error::{GmmError, Result};
use crate::linalg::{inverse_from_cholesky, ln_det_from_cholesky, lower_cholesky, sorted_eigh};
use crate::Float;

/// Smallest value returned by [`Gaussian::density`]. Keeps responsibilities and the log
/// likelihood finite when a point lies far away from every component.
pub const DENSITY_FLOOR: f64 = 1e-300;

/// Number of standard deviations spanned by the ellipse of [`Gaussian::shape`], which
/// encloses ~95% of the mass in two dimensions.
pub const REFERENCE_N_SIGMA: f64 = 2.;

pub(crate) fn density_floor<F: Float>() -> F {
    F::cast(DENSITY_FLOOR).max(F::min_positive_value())
}

/// Adds `reg_covar` to the diagonal of `covariance`, multiplied by the mean variance
/// `tr(Σ)/D` whenever that exceeds one. The regularisation then keeps the same relative size
/// for data measured on a large scale.
pub(crate) fn regularize<F: Float>(covariance: &mut Array2<F>, reg_covar: F) {
    let n_features = covariance.nrows();
    if n_features == 0 {
        return;
    }
    let mean_variance = covariance.diag().sum() / F::cast(n_features);
    let reg = reg_covar * mean_variance.max(F::one());
    covariance.diag_mut().mapv_inplace(|v| v + reg);
}

pub(crate) fn check_n_features(expected: usize, found: usize) -> Result<()> {
    if expected == found {
        Ok(())
    } else {
        Err(GmmError::DimensionMismatch { expected, found })
    }
}

#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(
        crate = "serde_crate",
        try_from = "GaussianParts<F>",
        into = "GaussianParts<F>"
    )
)]
/// A multivariate normal distribution `N(mean, covariance)`.
///
/// The covariance has to be symmetric positive definite, which is checked by factorizing it
/// when the distribution is built.
///
/// ```
/// use linfa_gmm::Gaussian;
/// use ndarray::array;
///
/// let gaussian = Gaussian::<f64>::new(array![0., 0.], array![[1., 0.], [0., 1.]]).unwrap();
/// let peak = gaussian.density(&array![0., 0.]).unwrap();
/// assert!((peak - 1. / (2. * std::f64::consts::PI)).abs() < 1e-12);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Gaussian<F: Float> {
    mean: Array1<F>,
    covariance: Array2<F>,
    cholesky: Array2<F>,
    precision: Array2<F>,
    log_norm: F,
}

impl<F: Float> Gaussian<F> {
    /// Builds a Gaussian from its mean and covariance.
    ///
    /// Fails with `DimensionMismatch` if the covariance is not `D×D` for a `D`-long mean, with
    /// `InvalidValue` if it is not symmetric and with `SingularMatrix` if it is not positive
    /// definite.
    pub fn new(mean: Array1<F>, covariance: Array2<F>) -> Result<Self> {
        let n_features = mean.len();
        if n_features == 0 {
            return Err(GmmError::EmptyInput);
        }
        let (rows, cols) = covariance.dim();
        check_n_features(n_features, rows)?;
        check_n_features(n_features, cols)?;

        let scale = covariance
            .iter()
            .fold(F::zero(), |acc, &v| if v.abs() > acc { v.abs() } else { acc });
        let tol = F::cast(1e-9) * scale;
        for i in 0..n_features {
            for j in (i + 1)..n_features {
                if (covariance[[i, j]] - covariance[[j, i]]).abs() > tol {
                    return Err(GmmError::InvalidValue(format!(
                        "covariance is not symmetric at ({}, {})",
                        i, j
                    )));
                }
            }
        }

        let cholesky = lower_cholesky(&covariance)?;
        let precision = inverse_from_cholesky(&cholesky)?;
        let log_norm = F::cast(-0.5 * n_features as f64 * (2. * std::f64::consts::PI).ln())
            - F::cast(0.5) * ln_det_from_cholesky(&cholesky);

        Ok(Gaussian {
            mean,
            covariance,
            cholesky,
            precision,
            log_norm,
        })
    }

    /// Maximum likelihood estimate over the rows of `observations`: sample mean and covariance
    /// (normalised by `N`) with `reg_covar` added to the diagonal, relative to the mean variance
    /// when that exceeds one.
    pub fn fit<D: Data<Elem = F>>(observations: &ArrayBase<D, Ix2>, reg_covar: F) -> Result<Self> {
        let (n_samples, n_features) = observations.dim();
        if n_samples == 0 || n_features == 0 {
            return Err(GmmError::EmptyInput);
        }
        let mean = observations
            .mean_axis(Axis(0))
            .ok_or(GmmError::EmptyInput)?;
        let diff = observations - &mean;
        let mut covariance = diff.t().dot(&diff) / F::cast(n_samples);
        regularize(&mut covariance, reg_covar);
        Self::new(mean, covariance)
    }

    pub fn mean(&self) -> &Array1<F> {
        &self.mean
    }

    pub fn covariance(&self) -> &Array2<F> {
        &self.covariance
    }

    /// Inverse of the covariance matrix
    pub fn precision(&self) -> &Array2<F> {
        &self.precision
    }

    /// Lower triangular Cholesky factor `L` of the covariance, `Σ = L Lᵀ`
    pub fn cholesky(&self) -> &Array2<F> {
        &self.cholesky
    }

    pub fn n_features(&self) -> usize {
        self.mean.len()
    }

    /// Squared Mahalanobis distance `(x - μ)ᵀ Σ⁻¹ (x - μ)`
    pub fn mahalanobis<D: Data<Elem = F>>(&self, x: &ArrayBase<D, Ix1>) -> Result<F> {
        check_n_features(self.n_features(), x.len())?;
        Ok(self.mahalanobis_unchecked(x.view()))
    }

    /// Natural logarithm of the density at `x`
    pub fn log_density<D: Data<Elem = F>>(&self, x: &ArrayBase<D, Ix1>) -> Result<F> {
        check_n_features(self.n_features(), x.len())?;
        Ok(self.log_density_unchecked(x.view()))
    }

    /// Probability density at `x`, floored at [`DENSITY_FLOOR`] so that it never underflows to
    /// zero.
    pub fn density<D: Data<Elem = F>>(&self, x: &ArrayBase<D, Ix1>) -> Result<F> {
        check_n_features(self.n_features(), x.len())?;
        Ok(self.density_unchecked(x.view()))
    }

    pub(crate) fn mahalanobis_unchecked(&self, x: ArrayView1<F>) -> F {
        let diff = &x - &self.mean;
        diff.dot(&self.precision.dot(&diff)).max(F::zero())
    }

    pub(crate) fn log_density_unchecked(&self, x: ArrayView1<F>) -> F {
        self.log_norm - F::cast(0.5) * self.mahalanobis_unchecked(x)
    }

    pub(crate) fn density_unchecked(&self, x: ArrayView1<F>) -> F {
        let density = self.log_density_unchecked(x).exp();
        if density.is_nan() {
            density_floor()
        } else {
            density.max(density_floor())
        }
    }

    /// Principal axes of the covariance, scaled to span `n_sigma` standard deviations.
    ///
    /// In two dimensions this describes the `n_sigma` contour ellipse of the distribution.
    pub fn shape_descriptor(&self, n_sigma: F) -> Result<ShapeDescriptor<F>> {
        let (variances, mut principal_axes) = sorted_eigh(&self.covariance)?;
        // fix the sign ambiguity: first non-zero coordinate of each axis is positive
        for mut axis in principal_axes.columns_mut() {
            let flip = axis
                .iter()
                .find(|v| **v != F::zero())
                .map_or(false, |v| *v < F::zero());
            if flip {
                axis.mapv_inplace(|v| -v);
            }
        }
        let semi_axis_lengths = variances.mapv(|v| n_sigma * v.max(F::zero()).sqrt());
        Ok(ShapeDescriptor {
            variances,
            semi_axis_lengths,
            principal_axes,
        })
    }

    /// [`shape_descriptor`](Self::shape_descriptor) with the 2-sigma convention
    pub fn shape(&self) -> Result<ShapeDescriptor<F>> {
        self.shape_descriptor(F::cast(REFERENCE_N_SIGMA))
    }
}

/// Serialized form of a [`Gaussian`]. Only the mean and the covariance are stored, the derived
/// quantities are recomputed (and the covariance checked) by [`Gaussian::new`] when reading it
/// back.
#[cfg(feature = "serde")]
#[derive(Serialize, Deserialize)]
#[serde(crate = "serde_crate")]
struct GaussianParts<F: Float> {
    mean: Array1<F>,
    covariance: Array2<F>,
}

#[cfg(feature = "serde")]
impl<F: Float> TryFrom<GaussianParts<F>> for Gaussian<F> {
    type Error = GmmError;

    fn try_from(parts: GaussianParts<F>) -> Result<Self> {
        Gaussian::new(parts.mean, parts.covariance)
    }
}

#[cfg(feature = "serde")]
impl<F: Float> From<Gaussian<F>> for GaussianParts<F> {
    fn from(gaussian: Gaussian<F>) -> Self {
        GaussianParts {
            mean: gaussian.mean,
            covariance: gaussian.covariance,
        }
    }
}

/// Samples `μ + L z` with `z` drawn from a standard normal.
impl<F: Float> Distribution<Array1<F>> for Gaussian<F>
where
    StandardNormal: Distribution<F>,
{
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Array1<F> {
        let z: Array1<F> = Array1::random_using(self.n_features(), StandardNormal, rng);
        &self.mean + &self.cholesky.dot(&z)
    }
}

#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
/// Geometry of a covariance matrix, as needed to draw it as an ellipse (or ellipsoid).
///
/// Axes are ordered by decreasing variance.
#[derive(Clone, Debug, PartialEq)]
pub struct ShapeDescriptor<F: Float> {
    variances: Array1<F>,
    semi_axis_lengths: Array1<F>,
    principal_axes: Array2<F>,
}

impl<F: Float> ShapeDescriptor<F> {
    /// Eigenvalues of the covariance
    pub fn variances(&self) -> &Array1<F> {
        &self.variances
    }

    /// `n_sigma * sqrt(variance)` for every axis
    pub fn semi_axis_lengths(&self) -> &Array1<F> {
        &self.semi_axis_lengths
    }

    /// Unit eigenvectors of the covariance, one per column
    pub fn principal_axes(&self) -> &Array2<F> {
        &self.principal_axes
    }

    /// Angle in radians of the dominant axis, computed as `atan2(-v_y, v_x)` for a renderer whose
    /// origin is the top-left corner (negate it for a bottom-left origin). Only defined in two
    /// dimensions.
    pub fn rotation_angle(&self) -> Option<F> {
        if self.principal_axes.nrows() != 2 {
            return None;
        }
        let dominant = self.principal_axes.column(0);
        Some((-dominant[1]).atan2(dominant[0]))
    }

    pub fn rotation_degrees(&self) -> Option<F> {
        self.rotation_angle().map(|angle| angle.to_degrees())
    }
}
