use criterion::{
    black_box, criterion_group, criterion_main, AxisScale, BenchmarkId, Criterion,
    PlotConfiguration,
};
use linfa_gmm::traits::Fit;
use linfa_gmm::{Gaussian, GaussianMixtureModel, MixtureComponent};
use linfa_gmm_datasets::generate;
use ndarray::{Array2, Axis};
use ndarray_rand::rand::SeedableRng;
use ndarray_rand::rand_distr::Uniform;
use ndarray_rand::RandomExt;
use rand_isaac::Isaac64Rng;

fn update_bench(c: &mut Criterion) {
    let mut rng = Isaac64Rng::seed_from_u64(40);
    let cluster_sizes = vec![10, 100, 1000, 10000];

    let mut benchmark = c.benchmark_group("em_update");
    benchmark.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));
    for cluster_size in cluster_sizes {
        let n_clusters = 3;
        let centroids = Array2::random_using((n_clusters, 2), Uniform::new(-30., 30.), &mut rng);
        let observations = generate::blobs(cluster_size, &centroids, &mut rng);
        let gmm = GaussianMixtureModel::new(centroids.axis_iter(Axis(0)).map(|centroid| {
            let gaussian = Gaussian::new(centroid.to_owned(), Array2::eye(2)).unwrap();
            MixtureComponent::new(1. / n_clusters as f64, gaussian)
        }))
        .unwrap();

        benchmark.bench_with_input(
            BenchmarkId::new("update", cluster_size),
            &observations,
            |bencher, observations| {
                bencher.iter(|| black_box(gmm.update(observations).expect("EM step fail")));
            },
        );
    }
    benchmark.finish();
}

fn gaussian_mixture_bench(c: &mut Criterion) {
    let mut rng = Isaac64Rng::seed_from_u64(40);
    let cluster_sizes = vec![10, 100, 1000];

    let mut benchmark = c.benchmark_group("gaussian_mixture");
    benchmark.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));
    for cluster_size in cluster_sizes {
        let rng = &mut rng;
        benchmark.bench_with_input(
            BenchmarkId::new("gaussian_mixture", cluster_size),
            &cluster_size,
            move |bencher, &cluster_size| {
                let n_clusters = 4;
                let n_features = 3;
                let centroids =
                    Array2::random_using((n_clusters, n_features), Uniform::new(-30., 30.), rng);
                let observations = generate::blobs(cluster_size, &centroids, rng);
                bencher.iter(|| {
                    black_box(
                        GaussianMixtureModel::params(n_clusters)
                            .with_rng(rng.clone())
                            .tolerance(1e-3)
                            .max_n_iterations(1000)
                            .fit(&observations),
                    )
                });
            },
        );
    }
    benchmark.finish();
}

criterion_group!(benches, update_bench, gaussian_mixture_bench);
criterion_main!(benches);
