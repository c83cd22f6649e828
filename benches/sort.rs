use std::hint::black_box;
use std::time::{Duration, Instant};

use criterion::measurement::Measurement;
use criterion::{
    criterion_group, criterion_main, BenchmarkGroup, BenchmarkId, Criterion, SamplingMode,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const BENCH_SIZES: [usize; 4] = [1_000, 16_384, 65_536, 262_144];
const BENCH_SAMPLE_SIZE: usize = 10;
const BENCH_WARMUP_MS: u64 = 80;
const BENCH_MEASURE_MS_SMALL: u64 = 150;
const BENCH_MEASURE_MS_LARGE: u64 = 400;

#[derive(Clone, Copy)]
enum Distribution {
    RandomUniform,
    FewDistinct,
    NearlySorted,
    Descending,
}

impl Distribution {
    fn label(self) -> &'static str {
        match self {
            Self::RandomUniform => "random_uniform",
            Self::FewDistinct => "few_distinct",
            Self::NearlySorted => "nearly_sorted_1pct_swaps",
            Self::Descending => "descending",
        }
    }
}

const DISTRIBUTIONS: [Distribution; 4] = [
    Distribution::RandomUniform,
    Distribution::FewDistinct,
    Distribution::NearlySorted,
    Distribution::Descending,
];

type SortFn = fn(&mut [u64]);

const SORTS: [(&str, SortFn); 4] = [
    ("blocksort", |v| blocksort::sort(v)),
    ("blocksort_no_cache", |v| blocksort::sort_with_cache::<0, _, _>(v, |a, b| a < b)),
    ("std_stable", |v| v.sort()),
    ("std_unstable", |v| v.sort_unstable()),
];

fn bench_sort(c: &mut Criterion) {
    for &dist in &DISTRIBUTIONS {
        let mut group = c.benchmark_group(format!("sort/{}", dist.label()));

        for &(name, sort) in &SORTS {
            for &size in &BENCH_SIZES {
                apply_runtime(&mut group, size);
                let base = generate_dataset(dist, size, 0x5EED_B10C ^ size as u64);

                group.bench_function(BenchmarkId::new(name, size), |bencher| {
                    bencher.iter_custom(|iters| {
                        let mut total = Duration::ZERO;

                        for _ in 0..iters {
                            let mut data = base.clone();
                            let start = Instant::now();
                            sort(&mut data);
                            total += start.elapsed();
                            black_box(&data);
                        }

                        total
                    });
                });
            }
        }

        group.finish();
    }
}

fn apply_runtime<M: Measurement>(group: &mut BenchmarkGroup<'_, M>, size: usize) {
    group.sample_size(BENCH_SAMPLE_SIZE);
    group.warm_up_time(Duration::from_millis(BENCH_WARMUP_MS));

    if size <= 16_384 {
        group.sampling_mode(SamplingMode::Auto);
        group.measurement_time(Duration::from_millis(BENCH_MEASURE_MS_SMALL));
    } else {
        group.sampling_mode(SamplingMode::Flat);
        group.measurement_time(Duration::from_millis(BENCH_MEASURE_MS_LARGE));
    }
}

fn generate_dataset(dist: Distribution, size: usize, seed: u64) -> Vec<u64> {
    let mut rng = StdRng::seed_from_u64(seed);

    match dist {
        Distribution::RandomUniform => (0..size).map(|_| rng.random::<u64>()).collect(),
        Distribution::FewDistinct => (0..size).map(|_| rng.random_range(0..16)).collect(),
        Distribution::NearlySorted => {
            let mut data: Vec<u64> = (0..size as u64).collect();

            for _ in 0..(size / 100).max(1) {
                let a = rng.random_range(0..size);
                let b = rng.random_range(0..size);
                data.swap(a, b);
            }

            data
        }
        Distribution::Descending => (0..size as u64).rev().collect(),
    }
}

criterion_group!(benches, bench_sort);
criterion_main!(benches);
