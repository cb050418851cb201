//! Provide traits for different classes of algorithms
//!

use std::error::Error;

/// Fittable algorithms
///
/// A fittable algorithm takes a set of observations and creates a model from it. The
/// hyperparameters are `self` and the observations are passed by reference.
pub trait Fit<R, E: Error> {
    type Object;

    fn fit(&self, records: &R) -> Result<Self::Object, E>;
}

/// Predict with model for reference of dataset
pub trait PredictRef<R, T> {
    fn predict_ref<'a>(&'a self, x: &'a R) -> T;
}

/// Predict with model
///
/// Implemented for every model that can predict from a reference to its input.
pub trait Predict<R, T> {
    fn predict(&self, x: R) -> T;
}

impl<'a, R, T, O: PredictRef<R, T>> Predict<&'a R, T> for O {
    fn predict(&self, x: &'a R) -> T {
        self.predict_ref(x)
    }
}
