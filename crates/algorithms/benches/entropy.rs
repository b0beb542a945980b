//! Benchmarks for entropy by tiles

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use geoclass_algorithms::entropy::EntropyByTiles;
use geoclass_core::Raster;

fn create_image(size: usize) -> Raster<f32> {
    let mut image = Raster::new(size, size);
    for row in 0..size {
        for col in 0..size {
            let value = ((row * 7 + col * 13) % 100) as f32 / 10.0;
            image.set(row, col, (row + col) as f32 + value).unwrap();
        }
    }
    image
}

fn bench_entropy(c: &mut Criterion) {
    let mut group = c.benchmark_group("entropy_by_tiles");

    for size in [512, 1024, 2048].iter() {
        let image = create_image(*size);

        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| EntropyByTiles::new(black_box(&image)).calculate_entropy().unwrap())
        });
    }

    group.finish();
}

criterion_group!(benches, bench_entropy);
criterion_main!(benches);
