//! Utility functions for randomly generating datasets

use ndarray::{s, Array, Array2, ArrayBase, Data, Ix1, Ix2, Ix3};
use ndarray_rand::{
    rand::Rng,
    rand_distr::{Distribution, StandardNormal},
    RandomExt,
};

/// Special case of `blobs_with_distribution` with a standard normal distribution.
pub fn blobs(
    blob_size: usize,
    blob_centroids: &ArrayBase<impl Data<Elem = f64>, Ix2>,
    rng: &mut impl Rng,
) -> Array2<f64> {
    blobs_with_distribution(blob_size, blob_centroids, StandardNormal, rng)
}

/// Given an input matrix `blob_centroids`, with shape `(n_blobs, n_features)`,
/// generate `blob_size` data points (a "blob") around each of the blob centroids.
///
/// More specifically, each blob is formed by `blob_size` points sampled from a distribution
/// centered in the blob centroid.
///
/// `blobs` can be used to quickly assemble a synthetic dataset to test or
/// benchmark various clustering algorithms on a best-case scenario input.
pub fn blobs_with_distribution(
    blob_size: usize,
    blob_centroids: &ArrayBase<impl Data<Elem = f64>, Ix2>,
    distribution: impl Distribution<f64> + Clone,
    rng: &mut impl Rng,
) -> Array2<f64> {
    let (n_centroids, n_features) = blob_centroids.dim();
    let mut blobs: Array2<f64> = Array2::zeros((n_centroids * blob_size, n_features));

    for (blob_index, blob_centroid) in blob_centroids.rows().into_iter().enumerate() {
        let blob = make_blob(blob_size, &blob_centroid, distribution.clone(), rng);

        let indexes = s![blob_index * blob_size..(blob_index + 1) * blob_size, ..];
        blobs.slice_mut(indexes).assign(&blob);
    }
    blobs
}

/// Generate `blob_size` points around each centroid, where every point is `A z + c`:
/// `c` is the blob centroid, `A` the blob's linear map taken from `transforms` (shape
/// `(n_blobs, n_features, n_features)`) and each coordinate of `z` is drawn from
/// `distribution`.
///
/// With a standard normal `distribution`, blob `i` is distributed as `N(c_i, A_i A_iᵀ)`.
///
/// # Panics
///
/// Panics if `transforms` does not hold one square map per centroid.
pub fn transformed_blobs(
    blob_size: usize,
    blob_centroids: &ArrayBase<impl Data<Elem = f64>, Ix2>,
    transforms: &ArrayBase<impl Data<Elem = f64>, Ix3>,
    distribution: impl Distribution<f64> + Clone,
    rng: &mut impl Rng,
) -> Array2<f64> {
    let (n_centroids, n_features) = blob_centroids.dim();
    assert_eq!(
        transforms.dim(),
        (n_centroids, n_features, n_features),
        "one square transformation per centroid is required"
    );

    let mut blobs = blobs_with_distribution(
        blob_size,
        &Array2::<f64>::zeros((n_centroids, n_features)),
        distribution,
        rng,
    );
    for (blob_index, (centroid, transform)) in blob_centroids
        .rows()
        .into_iter()
        .zip(transforms.outer_iter())
        .enumerate()
    {
        let mut blob = blobs.slice_mut(s![blob_index * blob_size..(blob_index + 1) * blob_size, ..]);
        let mapped = blob.dot(&transform.t()) + &centroid;
        blob.assign(&mapped);
    }
    blobs
}

/// Generate `blob_size` data points (a "blob") around `blob_centroid` using the given distribution.
///
/// `blob` can be used to quickly assemble a synthetic stereotypical cluster.
fn make_blob(
    blob_size: usize,
    blob_centroid: &ArrayBase<impl Data<Elem = f64>, Ix1>,
    distribution: impl Distribution<f64>,
    rng: &mut impl Rng,
) -> Array2<f64> {
    let shape = (blob_size, blob_centroid.len());
    let origin_blob: Array2<f64> = Array::random_using(shape, distribution, rng);
    origin_blob + blob_centroid
}

/// Approximately standard-normal distribution: the sum of twelve `U(0, 1)` draws minus six
/// (an Irwin-Hall variable, recentred).
///
/// Mean is zero, variance is one, support is bounded to `[-6, 6]`.
#[derive(Clone, Copy, Debug, Default)]
pub struct IrwinHallNormal;

impl Distribution<f64> for IrwinHallNormal {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        (0..12).map(|_| rng.gen::<f64>()).sum::<f64>() - 6.
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::{array, Axis};
    use ndarray_rand::rand::SeedableRng;
    use rand_isaac::Isaac64Rng;

    #[test]
    fn blobs_are_centred_on_their_centroids() {
        let mut rng = Isaac64Rng::seed_from_u64(42);
        let centroids = array![[0., 1.], [-10., 20.], [-1., 10.]];
        let points = blobs(500, &centroids, &mut rng);
        assert_eq!(points.dim(), (1500, 2));

        for (i, centroid) in centroids.rows().into_iter().enumerate() {
            let blob = points.slice(s![i * 500..(i + 1) * 500, ..]);
            let mean = blob.mean_axis(Axis(0)).unwrap();
            assert_abs_diff_eq!(mean[0], centroid[0], epsilon = 0.2);
            assert_abs_diff_eq!(mean[1], centroid[1], epsilon = 0.2);
        }
    }

    #[test]
    fn irwin_hall_is_roughly_standard() {
        let mut rng = Isaac64Rng::seed_from_u64(57);
        let n = 20_000;
        let samples: Vec<f64> = (0..n).map(|_| IrwinHallNormal.sample(&mut rng)).collect();
        let mean = samples.iter().sum::<f64>() / n as f64;
        let var = samples.iter().map(|x| (x - mean) * (x - mean)).sum::<f64>() / n as f64;
        assert_abs_diff_eq!(mean, 0., epsilon = 0.05);
        assert_abs_diff_eq!(var, 1., epsilon = 0.05);
        assert!(samples.iter().all(|x| x.abs() <= 6.));
    }

    #[test]
    fn transformed_blobs_follow_the_linear_map() {
        let mut rng = Isaac64Rng::seed_from_u64(7);
        let centroids = array![[4., 4.3], [-4.5, 1.3]];
        let transforms = array![[[2., 0.], [0., 0.5]], [[1., 0.], [0., 1.]]];
        let n = 4000;
        let points = transformed_blobs(n, &centroids, &transforms, StandardNormal, &mut rng);
        assert_eq!(points.dim(), (2 * n, 2));

        let first = points.slice(s![..n, ..]);
        let mean = first.mean_axis(Axis(0)).unwrap();
        assert_abs_diff_eq!(mean[0], 4., epsilon = 0.15);
        assert_abs_diff_eq!(mean[1], 4.3, epsilon = 0.15);
        let std_x = first.column(0).std(0.);
        let std_y = first.column(1).std(0.);
        assert_abs_diff_eq!(std_x, 2., epsilon = 0.1);
        assert_abs_diff_eq!(std_y, 0.5, epsilon = 0.05);
    }
}
