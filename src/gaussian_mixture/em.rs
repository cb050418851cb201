//! The two halves of an EM iteration.
//!
//! Both steps are written as reductions over the observations and keep no state between calls:
//! the expectation step turns a set of components into a responsibility matrix, the maximization
//! step turns a responsibility matrix into a new set of components.

use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};
use tracing::warn;

use crate::error::Result;
use crate::gaussian::{density_floor, regularize, Gaussian};
use crate::gaussian_mixture::component::MixtureComponent;
use crate::gaussian_mixture::hyperparams::EmValidParams;
use crate::linalg::outer;
use crate::Float;

/// Responsibilities of each component for a single observation, along with the mixture density
/// `Σ_k w_k p_k(x)` at that observation.
///
/// When every component density sits at the floor the observation is too far away to tell the
/// components apart and the responsibilities fall back to `1/K`.
pub(crate) fn point_responsibility<F: Float>(
    components: &[MixtureComponent<F>],
    x: ArrayView1<F>,
) -> (Array1<F>, F) {
    let n_components = components.len();
    let floor = density_floor::<F>();

    let mut all_floored = true;
    let mut weighted = Array1::zeros(n_components);
    for (k, component) in components.iter().enumerate() {
        let density = component.gaussian().density_unchecked(x);
        if density > floor {
            all_floored = false;
        }
        weighted[k] = component.weight() * density;
    }

    let total = weighted.sum();
    let mixture_density = total.max(F::min_positive_value());
    if all_floored || total <= F::zero() || !total.is_finite() {
        let uniform = F::one() / F::cast(n_components);
        (Array1::from_elem(n_components, uniform), mixture_density)
    } else {
        weighted /= total;
        (weighted, mixture_density)
    }
}

pub(crate) struct Expectation<F> {
    /// `(n_samples, n_components)`, every row sums to one
    pub responsibilities: Array2<F>,
    /// `Σ_i ln Σ_k w_k p_k(x_i)` under the components the expectation was computed with
    pub log_likelihood: F,
}

pub(crate) fn expectation<F: Float>(
    components: &[MixtureComponent<F>],
    observations: ArrayView2<F>,
) -> Expectation<F> {
    let mut responsibilities = Array2::zeros((observations.nrows(), components.len()));
    let mut log_likelihood = F::zero();
    for (x, mut row) in observations
        .rows()
        .into_iter()
        .zip(responsibilities.rows_mut())
    {
        let (resp, mixture_density) = point_responsibility(components, x);
        row.assign(&resp);
        log_likelihood += mixture_density.ln();
    }
    Expectation {
        responsibilities,
        log_likelihood,
    }
}

pub(crate) struct Maximization<F: Float> {
    pub components: Vec<MixtureComponent<F>>,
    /// `N_k = Σ_i r_ik` for every component
    pub effective_counts: Array1<F>,
}

/// Re-estimates weights, means and covariances from the responsibilities.
///
/// `reg_covariance` is added to every covariance diagonal, relative to the mean variance of the
/// component when that exceeds one. A component whose effective count is below
/// `min_effective_count` keeps its previous Gaussian. Weights are floored at `min_weight` and
/// renormalised.
pub(crate) fn maximization<F: Float>(
    components: &[MixtureComponent<F>],
    observations: ArrayView2<F>,
    responsibilities: &Array2<F>,
    params: &EmValidParams<F>,
) -> Result<Maximization<F>> {
    let n_samples = F::cast(observations.nrows());
    let n_features = observations.ncols();
    let effective_counts = responsibilities.sum_axis(Axis(0));

    let mut weights = effective_counts.mapv(|nk| (nk / n_samples).max(params.min_weight()));
    let total_weight = weights.sum();
    weights /= total_weight;

    let mut updated = Vec::with_capacity(components.len());
    for (k, (component, resp)) in components
        .iter()
        .zip(responsibilities.columns())
        .enumerate()
    {
        let nk = effective_counts[k];
        let gaussian = if nk < params.min_effective_count() {
            warn!(
                component = k,
                effective_count = %nk,
                "component lost its support, keeping previous mean and covariance"
            );
            component.gaussian().clone()
        } else {
            let mut mean = Array1::zeros(n_features);
            for (x, &r) in observations.rows().into_iter().zip(resp.iter()) {
                mean.scaled_add(r, &x);
            }
            mean /= nk;

            let mut covariance = Array2::zeros((n_features, n_features));
            for (x, &r) in observations.rows().into_iter().zip(resp.iter()) {
                let diff = &x - &mean;
                covariance.scaled_add(r, &outer(&diff, &diff));
            }
            covariance /= nk;
            regularize(&mut covariance, params.reg_covariance());

            Gaussian::new(mean, covariance)?
        };
        updated.push(MixtureComponent::new(weights[k], gaussian));
    }

    Ok(Maximization {
        components: updated,
        effective_counts,
    })
}
