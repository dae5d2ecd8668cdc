//! Benchmarks `race`/`join`/`gather` over a small fixed fan-in width.
use criterion::{black_box, Criterion};
use futures::executor::block_on;
use std::env;
use std::time::Duration;
use strand_core::combinators::{gather, join, left_race, Child};
use strand_core::error::StrandError;

fn children(n: usize) -> Vec<Child<'static, u64>> {
    (0..n)
        .map(|i| Box::pin(async move { Ok::<_, StrandError>(i as u64) }) as Child<'static, u64>)
        .collect()
}

fn bench_race(c: &mut Criterion) {
    c.bench_function("combinators/race_of_4", |b| {
        b.iter(|| black_box(block_on(left_race(children(4))).unwrap()));
    });
}

fn bench_join(c: &mut Criterion) {
    c.bench_function("combinators/join_of_4", |b| {
        b.iter(|| black_box(block_on(join(children(4))).unwrap()));
    });
}

fn bench_gather(c: &mut Criterion) {
    c.bench_function("combinators/gather_of_4", |b| {
        b.iter(|| black_box(block_on(gather(children(4)))));
    });
}

fn main() {
    let mut quick_mode = false;
    for arg in env::args().skip(1) {
        if arg == "--quick" {
            quick_mode = true;
        }
    }

    let mut criterion = Criterion::default();
    if quick_mode {
        criterion = criterion
            .sample_size(10)
            .warm_up_time(Duration::from_millis(100))
            .measurement_time(Duration::from_millis(250));
    }

    bench_race(&mut criterion);
    bench_join(&mut criterion);
    bench_gather(&mut criterion);
    criterion.final_summary();
}
