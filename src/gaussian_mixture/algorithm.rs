use crate::error::{GmmError, Result};
use crate::gaussian::check_n_features;
use crate::gaussian_mixture::component::MixtureComponent;
use crate::gaussian_mixture::em::{expectation, maximization, point_responsibility};
use crate::gaussian_mixture::em::{Expectation, Maximization};
use crate::gaussian_mixture::hyperparams::{EmValidParams, GmmParams, GmmValidParams};
use crate::gaussian_mixture::init::initialize;
use crate::gaussian_mixture::iter::EmIter;
use crate::traits::{Fit, PredictRef};
use crate::Float;
use ndarray::{s, Array1, Array2, Array3, ArrayBase, ArrayView2, Axis, Data, Ix1, Ix2};
use rand::Rng;
use rand_isaac::Isaac64Rng;
#[cfg(feature = "serde")]
use serde_crate::{Deserialize, Serialize};
#[cfg(feature = "serde")]
use std::convert::TryFrom;
use tracing::{debug, info};

/// Largest accepted deviation of the sum of the weights from one when a model is built
pub const WEIGHT_TOLERANCE: f64 = 1e-6;

#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(
        crate = "serde_crate",
        try_from = "Vec<MixtureComponent<F>>",
        into = "Vec<MixtureComponent<F>>"
    )
)]
/// Gaussian Mixture Model (GMM) aims at clustering a dataset by finding normally
/// distributed sub datasets (hence the Gaussian Mixture name) .
///
/// GMM assumes all the data points are generated from a mixture of a number K
/// of Gaussian distributions with certain parameters.
/// Expectation-maximization (EM) algorithm is used to fit the GMM to the dataset
/// by parameterizing the weight, mean, and covariance of each cluster distribution.
///
/// A model is an immutable value: [`update`](Self::update) performs one EM iteration and returns
/// a new model, leaving the current one untouched. Callers can therefore keep every intermediate
/// model around, for instance to draw a snapshot of each iteration.
///
/// ## The algorithm
///
/// One EM iteration is a fixed-point two-step algorithm:
///
/// 1. Expectation step: compute the responsibility of every component for every observation,
///    that is the posterior probability that the component generated the observation.
/// 2. Maximization step: re-estimate the weights, means and covariances of the components from
///    the responsibilities.
///
/// Two safeguards keep iterations well defined on degenerate intermediate states: a small
/// multiple of the identity is added to every covariance, and a component which is responsible
/// for (almost) no observation keeps its previous mean and covariance while its weight is floored
/// to a tiny positive value.
///
/// The [`Fit`] implementation of [`GmmParams`] wraps this in a complete fitting procedure:
/// initialization, iteration until the average log-likelihood stops improving by more than
/// `tolerance`, and several restarts (`n_runs`).
///
/// ## Tutorial
///
/// ```rust
/// use linfa_gmm::traits::{Fit, Predict};
/// use linfa_gmm::GaussianMixtureModel;
/// use ndarray::{array, Array2};
///
/// let observations: Array2<f64> = array![
///     [0.1, 0.0], [-0.1, 0.2], [0.0, -0.1], [0.2, 0.1],
///     [5.0, 5.1], [5.2, 4.9], [4.9, 5.0], [5.1, 5.2],
/// ];
///
/// let gmm = GaussianMixtureModel::params(2)
///     .n_runs(5)
///     .tolerance(1e-6)
///     .fit(&observations)
///     .expect("GMM fitting");
///
/// // soft assignments, one row per observation
/// let responsibilities = gmm.predict_responsibilities(&observations).unwrap();
/// assert_eq!(responsibilities.dim(), (8, 2));
///
/// // hard assignments are the most responsible component
/// let memberships = gmm.predict(&observations).unwrap();
/// assert_eq!(memberships[0], memberships[3]);
/// assert_ne!(memberships[0], memberships[4]);
///
/// // one more EM iteration
/// let step = gmm.update(&observations).unwrap();
/// assert!(step.log_likelihood.is_finite());
/// assert_eq!(step.model.n_components(), 2);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct GaussianMixtureModel<F: Float> {
    components: Vec<MixtureComponent<F>>,
}

/// Outcome of one EM iteration
#[derive(Clone, Debug, PartialEq)]
pub struct EmStep<F: Float> {
    /// The re-estimated model
    pub model: GaussianMixtureModel<F>,
    /// Log-likelihood of the observations under the model the step started from
    pub log_likelihood: F,
    /// Sum of the responsibilities of each component
    pub effective_counts: Array1<F>,
}

impl<F: Float> GaussianMixtureModel<F> {
    /// Assembles a mixture from its components.
    ///
    /// Fails with `EmptyInput` when there is no component, with `DimensionMismatch` when the
    /// components do not share the same number of features and with `InvalidWeights` when a
    /// weight is outside of `[0, 1]` or the weights do not sum to one (up to
    /// [`WEIGHT_TOLERANCE`]). Accepted weights are rescaled to sum exactly to one.
    pub fn new<I: IntoIterator<Item = MixtureComponent<F>>>(components: I) -> Result<Self> {
        let components: Vec<_> = components.into_iter().collect();
        let n_features = components
            .first()
            .ok_or(GmmError::EmptyInput)?
            .gaussian()
            .n_features();

        let mut total = F::zero();
        for (k, component) in components.iter().enumerate() {
            check_n_features(n_features, component.gaussian().n_features())?;
            let weight = component.weight();
            if !weight.is_finite() || weight < F::zero() || weight > F::one() {
                return Err(GmmError::InvalidWeights(format!(
                    "weight of component #{} is {}, expected a value in [0, 1]",
                    k + 1,
                    weight
                )));
            }
            total += weight;
        }
        if (total - F::one()).abs() > F::cast(WEIGHT_TOLERANCE) {
            return Err(GmmError::InvalidWeights(format!(
                "weights sum to {}, expected 1",
                total
            )));
        }

        let components = components
            .into_iter()
            .map(|component| {
                let (weight, gaussian) = component.into_parts();
                MixtureComponent::new(weight / total, gaussian)
            })
            .collect();
        Ok(GaussianMixtureModel { components })
    }

    pub fn params(n_clusters: usize) -> GmmParams<F, Isaac64Rng> {
        GmmParams::new(n_clusters)
    }

    pub fn params_with_rng<R: Rng + Clone>(n_clusters: usize, rng: R) -> GmmParams<F, R> {
        GmmParams::new_with_rng(n_clusters, rng)
    }

    pub fn components(&self) -> &[MixtureComponent<F>] {
        &self.components
    }

    pub fn n_components(&self) -> usize {
        self.components.len()
    }

    pub fn n_features(&self) -> usize {
        self.components[0].gaussian().n_features()
    }

    pub fn weights(&self) -> Array1<F> {
        self.components.iter().map(|c| c.weight()).collect()
    }

    /// Component means, one per row
    pub fn means(&self) -> Array2<F> {
        let mut means = Array2::zeros((self.n_components(), self.n_features()));
        for (mut row, component) in means.rows_mut().into_iter().zip(&self.components) {
            row.assign(component.gaussian().mean());
        }
        means
    }

    /// Alias of [`means`](Self::means)
    pub fn centroids(&self) -> Array2<F> {
        self.means()
    }

    /// Component covariances, shape `(n_components, n_features, n_features)`
    pub fn covariances(&self) -> Array3<F> {
        let n_features = self.n_features();
        let mut covariances = Array3::zeros((self.n_components(), n_features, n_features));
        for (k, component) in self.components.iter().enumerate() {
            covariances
                .slice_mut(s![k, .., ..])
                .assign(component.gaussian().covariance());
        }
        covariances
    }

    fn check_observations<D: Data<Elem = F>>(
        &self,
        observations: &ArrayBase<D, Ix2>,
    ) -> Result<()> {
        if observations.nrows() == 0 {
            return Err(GmmError::EmptyInput);
        }
        check_n_features(self.n_features(), observations.ncols())
    }

    /// Posterior probability of every component for the single observation `x`.
    ///
    /// The output sums to one. If `x` is so far from every component that all densities
    /// underflow, every component is given the same responsibility.
    pub fn predict_responsibility<D: Data<Elem = F>>(
        &self,
        x: &ArrayBase<D, Ix1>,
    ) -> Result<Array1<F>> {
        check_n_features(self.n_features(), x.len())?;
        let (responsibility, _) = point_responsibility(&self.components, x.view());
        Ok(responsibility)
    }

    /// Responsibilities of all observations, shape `(n_samples, n_components)`
    pub fn predict_responsibilities<D: Data<Elem = F>>(
        &self,
        observations: &ArrayBase<D, Ix2>,
    ) -> Result<Array2<F>> {
        check_n_features(self.n_features(), observations.ncols())?;
        Ok(expectation(&self.components, observations.view()).responsibilities)
    }

    /// `Σ_i ln Σ_k w_k p_k(x_i)`
    pub fn log_likelihood<D: Data<Elem = F>>(&self, observations: &ArrayBase<D, Ix2>) -> Result<F> {
        self.check_observations(observations)?;
        Ok(expectation(&self.components, observations.view()).log_likelihood)
    }

    /// One EM iteration with the default safeguards, see [`update_with`](Self::update_with).
    pub fn update<D: Data<Elem = F>>(&self, observations: &ArrayBase<D, Ix2>) -> Result<EmStep<F>> {
        self.update_with(observations, &EmValidParams::default())
    }

    /// One EM iteration: an expectation step under the current parameters followed by a
    /// maximization step. Returns the new model together with the log-likelihood of the current
    /// one.
    pub fn update_with<D: Data<Elem = F>>(
        &self,
        observations: &ArrayBase<D, Ix2>,
        params: &EmValidParams<F>,
    ) -> Result<EmStep<F>> {
        self.check_observations(observations)?;
        let observations = observations.view();

        let Expectation {
            responsibilities,
            log_likelihood,
        } = expectation(&self.components, observations);
        let Maximization {
            components,
            effective_counts,
        } = maximization(&self.components, observations, &responsibilities, params)?;

        debug!(
            log_likelihood = %log_likelihood,
            effective_counts = ?effective_counts,
            "EM step"
        );
        Ok(EmStep {
            model: GaussianMixtureModel { components },
            log_likelihood,
            effective_counts,
        })
    }

    /// Endless sequence of EM iterations starting from this model, each item feeding the next.
    /// The sequence stops after the first error.
    ///
    /// ```rust
    /// use linfa_gmm::{EmValidParams, Gaussian, GaussianMixtureModel, MixtureComponent};
    /// use ndarray::{array, Array2};
    ///
    /// let observations = array![[1., 0.], [-1., 0.], [0., 1.], [0., -1.]];
    /// let gaussian = Gaussian::new(array![0.5, 0.5], Array2::eye(2)).unwrap();
    /// let gmm = GaussianMixtureModel::new(vec![MixtureComponent::new(1., gaussian)]).unwrap();
    ///
    /// let history = gmm
    ///     .iterate(&observations, EmValidParams::default())
    ///     .take(5)
    ///     .collect::<Result<Vec<_>, _>>()
    ///     .unwrap();
    /// assert_eq!(history.len(), 5);
    /// ```
    pub fn iterate<'a, D: Data<Elem = F>>(
        &self,
        observations: &'a ArrayBase<D, Ix2>,
        params: EmValidParams<F>,
    ) -> EmIter<'a, F> {
        EmIter::new(self.clone(), observations.view(), params)
    }

    pub(crate) fn from_components(components: Vec<MixtureComponent<F>>) -> Self {
        GaussianMixtureModel { components }
    }
}

/// Deserialized components go through [`GaussianMixtureModel::new`], which checks them.
#[cfg(feature = "serde")]
impl<F: Float> TryFrom<Vec<MixtureComponent<F>>> for GaussianMixtureModel<F> {
    type Error = GmmError;

    fn try_from(components: Vec<MixtureComponent<F>>) -> Result<Self> {
        GaussianMixtureModel::new(components)
    }
}

#[cfg(feature = "serde")]
impl<F: Float> From<GaussianMixtureModel<F>> for Vec<MixtureComponent<F>> {
    fn from(gmm: GaussianMixtureModel<F>) -> Self {
        gmm.components
    }
}

impl<F: Float, R: Rng + Clone, D: Data<Elem = F>> Fit<ArrayBase<D, Ix2>, GmmError>
    for GmmValidParams<F, R>
{
    type Object = GaussianMixtureModel<F>;

    fn fit(&self, observations: &ArrayBase<D, Ix2>) -> Result<Self::Object> {
        let observations: ArrayView2<F> = observations.view();
        let n_samples = F::cast(observations.nrows());
        let mut rng = self.rng();

        let mut best: Option<(F, GaussianMixtureModel<F>)> = None;
        for run in 0..self.n_runs() {
            let mut gmm = initialize(self, &observations, &mut rng)?;
            let mut lower_bound = -F::infinity();
            let mut converged = false;

            for n_iter in 0..self.max_n_iterations() {
                let prev_lower_bound = lower_bound;
                let step = gmm.update_with(&observations, self.em_params())?;
                lower_bound = step.log_likelihood / n_samples;
                gmm = step.model;

                if (lower_bound - prev_lower_bound).abs() < self.tolerance() {
                    info!(
                        run,
                        n_iter,
                        lower_bound = %lower_bound,
                        "EM converged"
                    );
                    converged = true;
                    break;
                }
            }

            if !converged {
                info!(run, "EM reached max_n_iterations without converging");
                continue;
            }
            let improves = best
                .as_ref()
                .map_or(true, |(best_bound, _)| lower_bound > *best_bound);
            if improves {
                best = Some((lower_bound, gmm));
            }
        }

        best.map(|(_, gmm)| gmm).ok_or_else(|| {
            GmmError::NotConverged(format!(
                "EM fitting algorithm did not converge in any of the {} runs. Try different init \
                 parameters, or increase max_n_iterations, tolerance or check for degenerate data.",
                self.n_runs()
            ))
        })
    }
}

impl<F: Float, D: Data<Elem = F>> PredictRef<ArrayBase<D, Ix2>, Result<Array1<usize>>>
    for GaussianMixtureModel<F>
{
    fn predict_ref<'a>(&'a self, observations: &'a ArrayBase<D, Ix2>) -> Result<Array1<usize>> {
        let responsibilities = self.predict_responsibilities(observations)?;
        Ok(responsibilities.map_axis(Axis(1), |row| {
            row.iter()
                .enumerate()
                .fold((0, F::neg_infinity()), |(best_k, best_r), (k, &r)| {
                    if r > best_r {
                        (k, r)
                    } else {
                        (best_k, best_r)
                    }
                })
                .0
        }))
    }
}
