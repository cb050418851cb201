use crate::gaussian::Gaussian;
use crate::Float;
#[cfg(feature = "serde")]
use serde_crate::{Deserialize, Serialize};

#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
/// A weighted Gaussian, one term of a [`GaussianMixtureModel`](crate::GaussianMixtureModel).
///
/// Weights are only validated once components are assembled into a model.
#[derive(Clone, Debug, PartialEq)]
pub struct MixtureComponent<F: Float> {
    weight: F,
    gaussian: Gaussian<F>,
}

impl<F: Float> MixtureComponent<F> {
    pub fn new(weight: F, gaussian: Gaussian<F>) -> Self {
        MixtureComponent { weight, gaussian }
    }

    /// Mixing weight, in `[0, 1]` once part of a model
    pub fn weight(&self) -> F {
        self.weight
    }

    pub fn gaussian(&self) -> &Gaussian<F> {
        &self.gaussian
    }

    pub fn into_parts(self) -> (F, Gaussian<F>) {
        (self.weight, self.gaussian)
    }
}
