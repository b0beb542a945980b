//! Benchmarks for the cluster classifiers

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use geoclass_algorithms::classification::{ClusterClassifier, MahalanobisClassifier, MaxLikelihoodClassifier};
use geoclass_core::{Cluster, ClusterStatistics, Clusters, Raster};
use geoclass_parallel::ProcessingMode;
use ndarray::Array2;

const BANDS: usize = 4;

fn create_bands(size: usize) -> Vec<Raster<f32>> {
    (0..BANDS)
        .map(|band| {
            let mut raster = Raster::new(size, size);
            for row in 0..size {
                for col in 0..size {
                    let value = ((row * 7 + col * 13 + band * 31) % 200) as f32;
                    raster.set(row, col, value + 1.0).unwrap();
                }
            }
            raster
        })
        .collect()
}

fn create_clusters(count: usize) -> Clusters {
    (0..count)
        .map(|i| {
            let mean = (0..BANDS).map(|b| (i * 40 + b * 5) as f64).collect();
            let mut cov = Array2::<f64>::eye(BANDS) * 100.0;
            cov[(0, 1)] = 10.0;
            cov[(1, 0)] = 10.0;
            Cluster::new(i as i32 + 1, ClusterStatistics::new(mean, cov, 1000).unwrap())
        })
        .collect()
}

fn bench_mahalanobis(c: &mut Criterion) {
    let mut group = c.benchmark_group("mahalanobis");

    for size in [256, 512, 1024].iter() {
        let bands = create_bands(*size);
        let refs: Vec<&Raster<f32>> = bands.iter().collect();
        let classifier = MahalanobisClassifier::new(create_clusters(5), 50.0);

        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| classifier.classify_raster(black_box(&refs)).unwrap())
        });
    }

    group.finish();
}

fn bench_max_likelihood(c: &mut Criterion) {
    let mut group = c.benchmark_group("max_likelihood");

    let bands = create_bands(512);
    let refs: Vec<&Raster<f32>> = bands.iter().collect();
    for (name, mode) in [
        ("sequential", ProcessingMode::Sequential),
        ("parallel", ProcessingMode::Parallel),
    ] {
        let mut classifier = MaxLikelihoodClassifier::new(create_clusters(5), 1.0);
        classifier.set_processing_mode(mode);

        group.bench_function(name, |b| {
            b.iter(|| classifier.classify_raster(black_box(&refs)).unwrap())
        });
    }

    group.finish();
}

criterion_group!(benches, bench_mahalanobis, bench_max_likelihood);
criterion_main!(benches);
