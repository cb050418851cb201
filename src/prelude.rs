//! linfa-gmm prelude.
//!
//! This module contains the most used types, type aliases, traits and
//! functions that you can import easily as a group.
//!

#[doc(no_inline)]
pub use crate::error::{GmmError, Result};

#[doc(no_inline)]
pub use crate::traits::*;

#[doc(no_inline)]
pub use crate::param_guard::ParamGuard;

#[doc(no_inline)]
pub use crate::float::Float;

#[doc(no_inline)]
pub use crate::gaussian::{Gaussian, ShapeDescriptor};

#[doc(no_inline)]
pub use crate::gaussian_mixture::{
    EmParams, EmStep, EmValidParams, GaussianMixtureModel, GmmInitMethod, GmmParams,
    MixtureComponent,
};
