//! Covariance decompositions on top of `linfa-linalg`
//!
//! A Gaussian needs four things from its covariance: the lower Cholesky factor, the precision
//! matrix, the log-determinant and the sorted eigendecomposition used to draw it. All of them are
//! computed by the pure Rust kernels of `linfa-linalg`, so no BLAS/LAPACK backend is involved.

use linfa_linalg::cholesky::Cholesky;
use linfa_linalg::eigh::{EigSort, Eigh};
use linfa_linalg::triangular::{SolveTriangularInplace, UPLO};
use ndarray::{Array1, Array2, ArrayBase, Data, Ix1, Ix2};

pub use linfa_linalg::LinalgError;

use crate::Float;

pub type Result<T> = std::result::Result<T, LinalgError>;

/// Outer product `a bᵀ`
pub fn outer<F: Float>(
    a: &ArrayBase<impl Data<Elem = F>, Ix1>,
    b: &ArrayBase<impl Data<Elem = F>, Ix1>,
) -> Array2<F> {
    Array2::from_shape_fn((a.len(), b.len()), |(i, j)| a[i] * b[j])
}

/// Lower triangular `L` with `matrix = L Lᵀ`.
///
/// Fails with `NotPositiveDefinite` when a pivot is not strictly positive.
pub fn lower_cholesky<F: Float, S: Data<Elem = F>>(
    matrix: &ArrayBase<S, Ix2>,
) -> Result<Array2<F>> {
    let mut lower = matrix.cholesky()?;
    // keep the strict upper triangle at zero, `L` is used as a linear map when sampling
    for i in 0..lower.nrows() {
        for j in (i + 1)..lower.ncols() {
            lower[[i, j]] = F::zero();
        }
    }
    Ok(lower)
}

/// Inverse `L⁻ᵀ L⁻¹` of the matrix whose lower Cholesky factor is `lower`
pub fn inverse_from_cholesky<F: Float>(lower: &Array2<F>) -> Result<Array2<F>> {
    let mut inv_lower = Array2::eye(lower.nrows());
    lower.solve_triangular_inplace(&mut inv_lower, UPLO::Lower)?;
    Ok(inv_lower.t().dot(&inv_lower))
}

/// `ln |Σ| = 2 Σ ln L_ii` for the lower Cholesky factor `L` of `Σ`
pub fn ln_det_from_cholesky<F: Float>(lower: &Array2<F>) -> F {
    F::cast(2.) * lower.diag().iter().map(|d| d.ln()).sum::<F>()
}

/// Log-determinant of a symmetric positive definite matrix
pub fn ln_det<F: Float, S: Data<Elem = F>>(matrix: &ArrayBase<S, Ix2>) -> Result<F> {
    Ok(ln_det_from_cholesky(&lower_cholesky(matrix)?))
}

/// Eigenvalues and unit eigenvectors (one per column) of a symmetric matrix, in order of
/// decreasing eigenvalue
pub fn sorted_eigh<F: Float, S: Data<Elem = F>>(
    matrix: &ArrayBase<S, Ix2>,
) -> Result<(Array1<F>, Array2<F>)> {
    Ok(matrix.eigh()?.sort_eig_desc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::{array, Array};
    use ndarray_rand::rand::SeedableRng;
    use ndarray_rand::rand_distr::Uniform;
    use ndarray_rand::RandomExt;
    use rand_isaac::Isaac64Rng;

    fn random_spd(n: usize, rng: &mut Isaac64Rng) -> Array2<f64> {
        let a = Array::random_using((n, n), Uniform::new(-1., 1.), rng);
        a.dot(&a.t()) + Array2::<f64>::eye(n)
    }

    #[test]
    fn test_outer() {
        let a = array![1., 2.];
        let b = array![3., -1., 0.5];
        assert_abs_diff_eq!(outer(&a, &b), array![[3., -1., 0.5], [6., -2., 1.]]);
    }

    #[test]
    fn test_cholesky_reconstructs() {
        let mut rng = Isaac64Rng::seed_from_u64(42);
        let spd = random_spd(4, &mut rng);
        let lower = lower_cholesky(&spd).unwrap();
        assert_abs_diff_eq!(lower.dot(&lower.t()), spd, epsilon = 1e-12);
        for i in 0..4 {
            for j in (i + 1)..4 {
                assert_eq!(lower[[i, j]], 0.);
            }
        }
    }

    #[test]
    fn test_cholesky_rejects_indefinite() {
        let m: Array2<f64> = array![[1., 2.], [2., 1.]];
        assert!(matches!(
            lower_cholesky(&m),
            Err(LinalgError::NotPositiveDefinite)
        ));
        let zero = Array2::<f64>::zeros((2, 2));
        assert!(matches!(
            lower_cholesky(&zero),
            Err(LinalgError::NotPositiveDefinite)
        ));
    }

    #[test]
    fn test_cholesky_rejects_non_square() {
        let m = Array2::<f64>::ones((2, 3));
        assert!(lower_cholesky(&m).is_err());
    }

    #[test]
    fn test_ln_det() {
        let spd: Array2<f64> = array![[2., 0.5], [0.5, 1.]];
        assert_abs_diff_eq!(ln_det(&spd).unwrap(), 1.75f64.ln(), epsilon = 1e-12);
        let diag = Array2::<f64>::from_diag(&array![1e-3, 1e3, 5.]);
        assert_abs_diff_eq!(ln_det(&diag).unwrap(), 5f64.ln(), epsilon = 1e-12);
    }

    #[test]
    fn test_inverse_from_cholesky() {
        let mut rng = Isaac64Rng::seed_from_u64(3);
        for n in 1..5 {
            let spd = random_spd(n, &mut rng);
            let inv = inverse_from_cholesky(&lower_cholesky(&spd).unwrap()).unwrap();
            assert_abs_diff_eq!(spd.dot(&inv), Array2::<f64>::eye(n), epsilon = 1e-10);
            assert_abs_diff_eq!(inv, inv.t(), epsilon = 1e-12);
        }
    }

    #[test]
    fn test_eigh_diagonal() {
        let m: Array2<f64> = array![[1., 0.], [0., 3.]];
        let (values, vectors) = sorted_eigh(&m).unwrap();
        assert_abs_diff_eq!(values, array![3., 1.], epsilon = 1e-12);
        assert_abs_diff_eq!(f64::abs(vectors[[1, 0]]), 1., epsilon = 1e-12);
        assert_abs_diff_eq!(f64::abs(vectors[[0, 1]]), 1., epsilon = 1e-12);
    }

    #[test]
    fn test_eigh_reconstructs() {
        let mut rng = Isaac64Rng::seed_from_u64(11);
        for n in 1..6 {
            let spd = random_spd(n, &mut rng);
            let (values, vectors) = sorted_eigh(&spd).unwrap();
            for w in values.windows(2) {
                assert!(w[0] >= w[1]);
            }
            assert_abs_diff_eq!(
                vectors.t().dot(&vectors),
                Array2::<f64>::eye(n),
                epsilon = 1e-10
            );
            let rebuilt = vectors.dot(&Array2::from_diag(&values)).dot(&vectors.t());
            let scale = spd.iter().fold(0f64, |acc, v| acc.max(v.abs()));
            assert_abs_diff_eq!(rebuilt, spd, epsilon = 1e-9 * scale);
        }
    }

    #[test]
    fn test_eigh_rotated_ellipse() {
        // 45 degree rotation of diag(4, 1)
        let m: Array2<f64> = array![[2.5, 1.5], [1.5, 2.5]];
        let (values, vectors) = sorted_eigh(&m).unwrap();
        assert_abs_diff_eq!(values, array![4., 1.], epsilon = 1e-12);
        let v = vectors.column(0);
        assert_abs_diff_eq!(f64::abs(v[0]), 0.5f64.sqrt(), epsilon = 1e-12);
        assert_abs_diff_eq!(v[0] * v[1], 0.5, epsilon = 1e-12);
    }
}
