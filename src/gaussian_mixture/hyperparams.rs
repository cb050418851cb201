use crate::error::{GmmError, Result};
use crate::param_guard::ParamGuard;
use crate::Float;
use rand::{Rng, SeedableRng};
use rand_isaac::Isaac64Rng;
#[cfg(feature = "serde")]
use serde_crate::{Deserialize, Serialize};

#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Clone, Copy, Debug, PartialEq)]
/// The numerical safeguards applied by a single EM step.
pub struct EmValidParams<F: Float> {
    reg_covar: F,
    min_effective_count: F,
    min_weight: F,
}

impl<F: Float> Default for EmValidParams<F> {
    fn default() -> Self {
        EmValidParams {
            reg_covar: F::cast(1e-6),
            min_effective_count: F::cast(1e-6),
            min_weight: F::cast(1e-10),
        }
    }
}

impl<F: Float> EmValidParams<F> {
    pub fn reg_covariance(&self) -> F {
        self.reg_covar
    }

    pub fn min_effective_count(&self) -> F {
        self.min_effective_count
    }

    pub fn min_weight(&self) -> F {
        self.min_weight
    }
}

#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Clone, Copy, Debug, PartialEq)]
/// The numerical safeguards applied by a single EM step, see
/// [`GaussianMixtureModel::update_with`](crate::GaussianMixtureModel::update_with).
pub struct EmParams<F: Float>(EmValidParams<F>);

impl<F: Float> Default for EmParams<F> {
    fn default() -> Self {
        EmParams(EmValidParams::default())
    }
}

impl<F: Float> EmParams<F> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Non-negative regularization added to the diagonal of every re-estimated covariance.
    /// Keeps covariances positive definite when a component collapses onto collinear points.
    pub fn reg_covariance(mut self, reg_covar: F) -> Self {
        self.0.reg_covar = reg_covar;
        self
    }

    /// Components whose effective point count falls below this value keep their mean and
    /// covariance from the previous step. Must be strictly positive, the M-step divides by the
    /// effective count of every other component.
    pub fn min_effective_count(mut self, min_effective_count: F) -> Self {
        self.0.min_effective_count = min_effective_count;
        self
    }

    /// Lower bound on mixing weights, so that no component ever drops out of the mixture.
    pub fn min_weight(mut self, min_weight: F) -> Self {
        self.0.min_weight = min_weight;
        self
    }
}

fn check_non_negative<F: Float>(name: &str, value: F) -> Result<()> {
    if value.is_finite() && value >= F::zero() {
        Ok(())
    } else {
        Err(GmmError::InvalidValue(format!(
            "`{}` must be finite and positive!",
            name
        )))
    }
}

fn check_positive<F: Float>(name: &str, value: F) -> Result<()> {
    if value.is_finite() && value > F::zero() {
        Ok(())
    } else {
        Err(GmmError::InvalidValue(format!(
            "`{}` must be finite and strictly positive!",
            name
        )))
    }
}

impl<F: Float> ParamGuard for EmParams<F> {
    type Checked = EmValidParams<F>;
    type Error = GmmError;

    fn check_ref(&self) -> Result<&Self::Checked> {
        check_non_negative("reg_covariance", self.0.reg_covar)?;
        check_positive("min_effective_count", self.0.min_effective_count)?;
        check_non_negative("min_weight", self.0.min_weight)?;
        if self.0.min_weight >= F::one() {
            return Err(GmmError::InvalidValue(
                "`min_weight` must be lower than 1!".to_string(),
            ));
        }
        Ok(&self.0)
    }

    fn check(self) -> Result<Self::Checked> {
        self.check_ref()?;
        Ok(self.0)
    }
}

#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Clone, Copy, Debug, PartialEq)]
/// A specifier for the method used for the initialization of the fitting algorithm of GMM
pub enum GmmInitMethod {
    /// Every component starts from the Gaussian of the whole dataset, its mean moved by a draw
    /// from that same Gaussian. Weights start uniform.
    Jitter,
    /// Means are distinct observations picked at random, covariances are the covariance of the
    /// whole dataset. Weights start uniform.
    Random,
}

#[derive(Clone, Debug)]
/// The set of hyperparameters that can be specified for the execution of
/// the [GMM algorithm](crate::GaussianMixtureModel).
pub struct GmmValidParams<F: Float, R: Rng> {
    n_clusters: usize,
    tolerance: F,
    n_runs: u64,
    max_n_iter: u64,
    init_method: GmmInitMethod,
    em: EmValidParams<F>,
    rng: R,
}

impl<F: Float, R: Rng + Clone> GmmValidParams<F, R> {
    pub fn n_clusters(&self) -> usize {
        self.n_clusters
    }

    pub fn tolerance(&self) -> F {
        self.tolerance
    }

    pub fn reg_covariance(&self) -> F {
        self.em.reg_covar
    }

    pub fn n_runs(&self) -> u64 {
        self.n_runs
    }

    pub fn max_n_iterations(&self) -> u64 {
        self.max_n_iter
    }

    pub fn init_method(&self) -> &GmmInitMethod {
        &self.init_method
    }

    pub fn em_params(&self) -> &EmValidParams<F> {
        &self.em
    }

    pub fn rng(&self) -> R {
        self.rng.clone()
    }
}

#[derive(Clone, Debug)]
/// The set of hyperparameters that can be specified for the execution of
/// the [GMM algorithm](crate::GaussianMixtureModel).
pub struct GmmParams<F: Float, R: Rng>(GmmValidParams<F, R>);

impl<F: Float> GmmParams<F, Isaac64Rng> {
    pub fn new(n_clusters: usize) -> GmmParams<F, Isaac64Rng> {
        Self::new_with_rng(n_clusters, Isaac64Rng::seed_from_u64(42))
    }
}

impl<F: Float, R: Rng + Clone> GmmParams<F, R> {
    pub fn new_with_rng(n_clusters: usize, rng: R) -> GmmParams<F, R> {
        Self(GmmValidParams {
            n_clusters,
            tolerance: F::cast(1e-3),
            n_runs: 1,
            max_n_iter: 100,
            init_method: GmmInitMethod::Jitter,
            em: EmValidParams::default(),
            rng,
        })
    }

    /// Set the convergence threshold. EM iterations will stop when the gain of the average
    /// log-likelihood per observation is below this threshold.
    pub fn tolerance(mut self, tolerance: F) -> Self {
        self.0.tolerance = tolerance;
        self
    }

    /// Non-negative regularization added to the diagonal of covariance.
    /// Allows to assure that the covariance matrices are all positive.
    pub fn reg_covariance(mut self, reg_covar: F) -> Self {
        self.0.em.reg_covar = reg_covar;
        self
    }

    /// Replace every EM safeguard at once.
    pub fn em_params(mut self, em: EmParams<F>) -> Self {
        self.0.em = em.0;
        self
    }

    /// Set the number of initializations to perform. The best results are kept.
    pub fn n_runs(mut self, n_runs: u64) -> Self {
        self.0.n_runs = n_runs;
        self
    }

    /// Set the number of EM iterations to perform.
    pub fn max_n_iterations(mut self, max_n_iter: u64) -> Self {
        self.0.max_n_iter = max_n_iter;
        self
    }

    /// Set the method used to initialize the weights, the means and the covariances.
    pub fn init_method(mut self, init_method: GmmInitMethod) -> Self {
        self.0.init_method = init_method;
        self
    }

    pub fn with_rng<R2: Rng + Clone>(self, rng: R2) -> GmmParams<F, R2> {
        GmmParams(GmmValidParams {
            n_clusters: self.0.n_clusters,
            tolerance: self.0.tolerance,
            n_runs: self.0.n_runs,
            max_n_iter: self.0.max_n_iter,
            init_method: self.0.init_method,
            em: self.0.em,
            rng,
        })
    }
}

impl<F: Float, R: Rng> ParamGuard for GmmParams<F, R> {
    type Checked = GmmValidParams<F, R>;
    type Error = GmmError;

    fn check_ref(&self) -> Result<&Self::Checked> {
        if self.0.n_clusters == 0 {
            Err(GmmError::InvalidValue(
                "`n_clusters` cannot be 0!".to_string(),
            ))
        } else if !(self.0.tolerance > F::zero()) {
            Err(GmmError::InvalidValue(
                "`tolerance` must be greater than 0!".to_string(),
            ))
        } else if self.0.n_runs == 0 {
            Err(GmmError::InvalidValue("`n_runs` cannot be 0!".to_string()))
        } else if self.0.max_n_iter == 0 {
            Err(GmmError::InvalidValue(
                "`max_n_iterations` cannot be 0!".to_string(),
            ))
        } else {
            EmParams(self.0.em).check_ref()?;
            Ok(&self.0)
        }
    }

    fn check(self) -> Result<Self::Checked> {
        self.check_ref()?;
        Ok(self.0)
    }
}
