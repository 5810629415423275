use criterion::{black_box, criterion_group, criterion_main, Criterion};
use ndarray::Array4;
use ndarray_rand::rand_distr::Uniform;
use ndarray_rand::RandomExt;

use pvtk::array::LatticeValues;

fn lattice_values_sum(n: usize) -> f64 {
    let array: Array4<f64> = ndarray::Array::random((3, n, n, n), Uniform::new(0., 10.));

    let values = LatticeValues::new(array.view());
    values.iter().sum()
}

fn linearize_bench(c: &mut Criterion) {
    c.bench_function("lattice_values 100", |b| {
        b.iter(|| lattice_values_sum(black_box(100)))
    });

    c.bench_function("lattice_values 150", |b| {
        b.iter(|| lattice_values_sum(black_box(150)))
    });
}

criterion_group!(benches, linearize_bench);
criterion_main!(benches);
