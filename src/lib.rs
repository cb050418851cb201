//! `linfa-gmm` fits Gaussian Mixture Models to point clouds with an explicit
//! Expectation-Maximization loop, written in pure Rust on top of `ndarray`.
//!
//! ## The big picture
//!
//! A [`GaussianMixtureModel`] is an immutable list of weighted [`Gaussian`]s. Every EM iteration
//! ([`GaussianMixtureModel::update`]) computes how responsible each component is for each point,
//! re-estimates the components from those responsibilities and hands back a brand new model.
//! Keeping all intermediate models is therefore free, which is what the `em_snapshots` demo does
//! to draw one picture per iteration.
//!
//! On top of the single step the crate provides:
//! * a complete fitting procedure with initialization, convergence check and restarts, through
//!   the [`Fit`](traits::Fit) implementation of [`GmmParams`],
//! * hard cluster assignments through [`Predict`](traits::Predict),
//! * the [`ShapeDescriptor`] of each covariance, i.e. the axes of its contour ellipse,
//! * a small dense linear algebra kernel ([`linalg`]) so that no BLAS/LAPACK backend is needed.
//!
//! ## Example
//!
//! ```rust
//! use linfa_gmm::prelude::*;
//! use ndarray::{array, Array2};
//!
//! let observations = array![[1., 0.], [-1., 0.], [0., 1.], [0., -1.]];
//! let start = Gaussian::new(array![0., 0.], Array2::eye(2))?;
//! let gmm = GaussianMixtureModel::new(vec![MixtureComponent::new(1., start)])?;
//!
//! let step = gmm.update(&observations)?;
//! let ellipse = step.model.components()[0].gaussian().shape()?;
//! assert_eq!(ellipse.semi_axis_lengths().len(), 2);
//! # Ok::<(), GmmError>(())
//! ```

pub mod error;
pub mod float;
pub mod gaussian;
pub mod gaussian_mixture;
pub mod linalg;
pub mod param_guard;
pub mod prelude;
pub mod traits;

pub use error::{GmmError, Result};
pub use float::Float;
pub use gaussian::{Gaussian, ShapeDescriptor, DENSITY_FLOOR};
pub use gaussian_mixture::*;
pub use param_guard::ParamGuard;
