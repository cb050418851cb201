use approx::assert_abs_diff_eq;
use linfa_gmm::prelude::*;
use linfa_gmm_datasets::generate;
use ndarray::{array, Array2, Axis};
use ndarray_rand::rand::SeedableRng;
use ndarray_rand::rand_distr::Normal;
use rand_isaac::Isaac64Rng;

fn three_clusters(rng: &mut Isaac64Rng) -> (Array2<f64>, Array2<f64>) {
    let centers = array![[0., 0.], [10., 0.], [0., 10.]];
    let spread = Normal::new(0., 0.5).unwrap();
    let observations = generate::blobs_with_distribution(100, &centers, spread, rng);
    (centers, observations)
}

fn model_around(centers: &Array2<f64>, offset: f64) -> GaussianMixtureModel<f64> {
    let n_components = centers.nrows();
    GaussianMixtureModel::new(centers.axis_iter(Axis(0)).map(|center| {
        let mean = center.mapv(|c| c + offset);
        let gaussian = Gaussian::new(mean, Array2::eye(2)).unwrap();
        MixtureComponent::new(1. / n_components as f64, gaussian)
    }))
    .unwrap()
}

#[test]
fn separated_clusters_are_recovered_within_twenty_steps() {
    let mut rng = Isaac64Rng::seed_from_u64(42);
    let (centers, observations) = three_clusters(&mut rng);

    let mut gmm = model_around(&centers, 0.8);
    for _ in 0..20 {
        gmm = gmm.update(&observations).unwrap().model;
    }

    for (center, mean) in centers.rows().into_iter().zip(gmm.means().rows()) {
        assert_abs_diff_eq!(center, mean, epsilon = 0.5);
    }
    assert_abs_diff_eq!(gmm.weights(), array![1. / 3., 1. / 3., 1. / 3.], epsilon = 0.05);
    assert_abs_diff_eq!(gmm.weights().sum(), 1., epsilon = 1e-9);
}

#[test]
fn log_likelihood_does_not_decrease() {
    let mut rng = Isaac64Rng::seed_from_u64(7);
    let (centers, observations) = three_clusters(&mut rng);

    // deliberately poor start: all components piled up on one side
    let start = model_around(&array![[-3., -3.], [-2., -3.], [-3., -2.]], 0.);
    let history = start
        .iterate(&observations, EmValidParams::default())
        .take(40)
        .collect::<Result<Vec<_>>>()
        .unwrap();

    for pair in history.windows(2) {
        let (before, after) = (pair[0].log_likelihood, pair[1].log_likelihood);
        assert!(
            after >= before - 1e-6 * before.abs().max(1.),
            "log-likelihood dropped from {} to {}",
            before,
            after
        );
    }
    let last = &history[history.len() - 1];
    assert!(last.log_likelihood > history[0].log_likelihood);
    assert_eq!(last.model.n_components(), centers.nrows());
}

#[test]
fn update_reproduces_single_gaussian_optimum() {
    let observations = array![[1., 0.], [-1., 0.], [0., 1.], [0., -1.]];
    let start = GaussianMixtureModel::new(vec![MixtureComponent::new(
        1.,
        Gaussian::new(array![0., 0.], Array2::eye(2)).unwrap(),
    )])
    .unwrap();

    let first = start.update(&observations).unwrap().model;
    let second = first.update(&observations).unwrap().model;
    let gaussian = second.components()[0].gaussian();
    assert_abs_diff_eq!(gaussian.mean(), &array![0., 0.], epsilon = 1e-9);
    assert_abs_diff_eq!(
        gaussian.covariance(),
        &array![[0.5, 0.], [0., 0.5]],
        epsilon = 1e-5
    );
}

#[test]
fn fit_and_predict_three_clusters() {
    let mut rng = Isaac64Rng::seed_from_u64(42);
    let (centers, observations) = three_clusters(&mut rng);

    let gmm = GaussianMixtureModel::params(3)
        .n_runs(5)
        .tolerance(1e-6)
        .max_n_iterations(500)
        .fit(&observations)
        .expect("GMM fitting");

    let means = gmm.means();
    for center in centers.rows() {
        let closest = means
            .rows()
            .into_iter()
            .map(|mean| (&mean - &center).mapv(|d| d * d).sum().sqrt())
            .fold(f64::INFINITY, f64::min);
        assert!(closest < 0.5, "no component near {}", center);
    }

    let memberships = gmm.predict(&observations).unwrap();
    for blob in memberships.exact_chunks(100) {
        assert!(blob.iter().all(|&m| m == blob[0]));
    }
    assert_ne!(memberships[0], memberships[100]);
    assert_ne!(memberships[100], memberships[200]);
    assert_ne!(memberships[0], memberships[200]);
}

#[test]
fn shape_of_fitted_transformed_blob() {
    let mut rng = Isaac64Rng::seed_from_u64(57);
    let centers = array![[0., 0.]];
    let transforms = array![[[2., 0.], [0., 0.5]]];
    let observations = generate::transformed_blobs(
        2000,
        &centers,
        &transforms,
        Normal::new(0., 1.).unwrap(),
        &mut rng,
    );

    let gmm = GaussianMixtureModel::params(1).fit(&observations).unwrap();
    let shape = gmm.components()[0].gaussian().shape().unwrap();
    // variances 4 and 0.25, 2-sigma semi axes 4 and 1
    assert_abs_diff_eq!(shape.semi_axis_lengths()[0], 4., epsilon = 0.3);
    assert_abs_diff_eq!(shape.semi_axis_lengths()[1], 1., epsilon = 0.1);
    let angle = shape.rotation_angle().unwrap();
    assert!(angle.sin().abs() < 0.1, "major axis should follow x, got {}", angle);
}
