//! Benchmarks the cost of a single write/read rendezvous through a bounded [`Channel`].
//!
//! # Design background (Why)
//! - One `bench_function`, a `--quick` flag for fast local iteration, and
//!   `criterion::Criterion::final_summary()` at the end rather than `criterion_main!`'s
//!   harness (this crate's `[[bench]] harness = false` drives `Criterion` manually).
use criterion::{black_box, Criterion};
use futures::executor::block_on;
use std::env;
use std::time::Duration;
use strand_core::channel::Channel;
use strand_core::error::StrandError;

fn bench_buffered_rendezvous(c: &mut Criterion) {
    c.bench_function("channel_rendezvous/capacity_1", |b| {
        b.iter(|| {
            let channel: Channel<u64> = Channel::new(1);
            block_on(channel.write(black_box(7))).unwrap();
            let value = block_on(channel.read()).unwrap();
            black_box(value)
        });
    });
}

fn bench_zero_capacity_try_path(c: &mut Criterion) {
    c.bench_function("channel_rendezvous/capacity_0_try", |b| {
        b.iter(|| {
            let channel: Channel<u64> = Channel::new(0);
            let miss = channel.try_write(black_box(1));
            black_box(miss)
        });
    });
}

fn bench_promise_spawn_and_await(c: &mut Criterion) {
    use strand_core::executor::LocalExecutor;
    use strand_core::promise::Promise;

    c.bench_function("channel_rendezvous/promise_spawn_await", |b| {
        b.iter(|| {
            let exec = LocalExecutor::new();
            let promise = Promise::spawn(exec.clone(), async { Ok::<_, StrandError>(1u64) });
            exec.run_until_idle();
            black_box(promise.get().unwrap())
        });
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

    bench_buffered_rendezvous(&mut criterion);
    bench_zero_capacity_try_path(&mut criterion);
    bench_promise_spawn_and_await(&mut criterion);
    criterion.final_summary();
}
