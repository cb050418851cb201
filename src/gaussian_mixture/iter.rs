use crate::error::Result;
use crate::gaussian_mixture::algorithm::{EmStep, GaussianMixtureModel};
use crate::gaussian_mixture::hyperparams::EmValidParams;
use crate::Float;
use ndarray::ArrayView2;

/// Iterator over successive EM steps, created by
/// [`GaussianMixtureModel::iterate`](crate::GaussianMixtureModel::iterate).
///
/// Never ends on its own: stop consuming it, e.g. with `take`, once the model is good enough.
/// After an error has been yielded the iterator is exhausted.
pub struct EmIter<'a, F: Float> {
    current: Option<GaussianMixtureModel<F>>,
    observations: ArrayView2<'a, F>,
    params: EmValidParams<F>,
}

impl<'a, F: Float> EmIter<'a, F> {
    pub(crate) fn new(
        model: GaussianMixtureModel<F>,
        observations: ArrayView2<'a, F>,
        params: EmValidParams<F>,
    ) -> Self {
        EmIter {
            current: Some(model),
            observations,
            params,
        }
    }
}

impl<'a, F: Float> Iterator for EmIter<'a, F> {
    type Item = Result<EmStep<F>>;

    fn next(&mut self) -> Option<Self::Item> {
        let model = self.current.take()?;
        let step = model.update_with(&self.observations, &self.params);
        if let Ok(step) = &step {
            self.current = Some(step.model.clone());
        }
        Some(step)
    }
}
