//! `linfa-gmm-datasets` provides synthetic datasets ready to be used in the tests, benchmarks and
//! demos of `linfa-gmm`.
//!
//! ## Current State
//!
//! Currently the following generators are provided:
//!
//! * [`generate::blobs`]: isotropic standard-normal blobs around a set of centroids
//! * [`generate::blobs_with_distribution`]: the same, with a user supplied distribution
//! * [`generate::transformed_blobs`]: blobs stretched and rotated by a per-blob linear map
//!
//! along with [`generate::IrwinHallNormal`], a cheap approximately-normal distribution.
//!
//! ## Using a generator
//!
//! ```
//! use linfa_gmm_datasets::generate;
//! use ndarray::array;
//! use ndarray_rand::rand::SeedableRng;
//! use rand_isaac::Isaac64Rng;
//!
//! let mut rng = Isaac64Rng::seed_from_u64(42);
//! let centroids = array![[0., 0.], [10., 10.]];
//! let points = generate::blobs(50, &centroids, &mut rng);
//! assert_eq!(points.dim(), (100, 2));
//! ```

pub mod generate;
