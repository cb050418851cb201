use crate::error::{GmmError, Result};
use crate::gaussian::Gaussian;
use crate::gaussian_mixture::algorithm::GaussianMixtureModel;
use crate::gaussian_mixture::component::MixtureComponent;
use crate::gaussian_mixture::hyperparams::{GmmInitMethod, GmmValidParams};
use crate::Float;
use ndarray::{Array1, Array2, ArrayView2};
use rand::seq::index;
use rand::Rng;
use ndarray_rand::rand_distr::StandardNormal;
use ndarray_rand::RandomExt;
use tracing::debug;

/// Builds the starting point of a fitting run according to `params.init_method()`.
///
/// Both methods start every component from the per-feature variances of the whole dataset (a
/// diagonal covariance) and from uniform weights. They only differ in how the means are spread.
pub(crate) fn initialize<F: Float, R: Rng + Clone>(
    params: &GmmValidParams<F, R>,
    observations: &ArrayView2<F>,
    rng: &mut R,
) -> Result<GaussianMixtureModel<F>> {
    let n_clusters = params.n_clusters();
    let (n_samples, n_features) = observations.dim();
    if n_samples == 0 {
        return Err(GmmError::EmptyInput);
    }

    let whole = Gaussian::fit(observations, params.reg_covariance())?;
    let covariance = Array2::from_diag(&whole.covariance().diag());
    let weight = F::one() / F::cast(n_clusters);

    let means: Vec<Array1<F>> = match params.init_method() {
        GmmInitMethod::Jitter => (0..n_clusters)
            .map(|_| {
                let z = Array1::<f64>::random_using(n_features, StandardNormal, &mut *rng)
                    .mapv(|v| F::cast(v));
                whole.mean() + &whole.cholesky().dot(&z)
            })
            .collect(),
        GmmInitMethod::Random => {
            if n_samples < n_clusters {
                return Err(GmmError::InvalidValue(format!(
                    "random initialization needs at least {} observations, got {}",
                    n_clusters, n_samples
                )));
            }
            index::sample(rng, n_samples, n_clusters)
                .into_iter()
                .map(|i| observations.row(i).to_owned())
                .collect()
        }
    };
    debug!(n_clusters, init_method = ?params.init_method(), "initial means drawn");

    let components = means
        .into_iter()
        .map(|mean| Ok(MixtureComponent::new(weight, Gaussian::new(mean, covariance.clone())?)))
        .collect::<Result<Vec<_>>>()?;
    Ok(GaussianMixtureModel::from_components(components))
}
