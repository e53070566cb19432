use std::time::Duration;

use convergent::clock::MockClock;
use convergent::prelude::*;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn bench_gcounter_increment(c: &mut Criterion) {
    c.bench_function("GCounter::increment x1000", |b| {
        b.iter(|| {
            let counter = GCounter::with_identity("bench");
            for _ in 0..1000 {
                counter.increment();
            }
            black_box(counter.value())
        })
    });
}

fn bench_gcounter_merge(c: &mut Criterion) {
    let counters: Vec<GCounter> = (0..10)
        .map(|i| {
            let c = GCounter::with_identity(format!("node-{i}"));
            c.increment_by(100).unwrap();
            c
        })
        .collect();

    c.bench_function("GCounter::merge 10 replicas", |b| {
        b.iter(|| {
            let merged = counters[0].clone();
            for other in &counters[1..] {
                merged.merge(other);
            }
            black_box(merged.value())
        })
    });

    // Also benchmark with many more replicas
    let many_counters: Vec<GCounter> = (0..100)
        .map(|i| {
            let c = GCounter::with_identity(format!("node-{i}"));
            c.increment_by(100).unwrap();
            c
        })
        .collect();

    c.bench_function("GCounter::merge 100 replicas", |b| {
        b.iter(|| {
            let merged = many_counters[0].clone();
            for other in &many_counters[1..] {
                merged.merge(other);
            }
            black_box(merged.value())
        })
    });
}

fn bench_gcounter_snapshot(c: &mut Criterion) {
    let merged = GCounter::with_identity("bench");
    for i in 0..100 {
        let other = GCounter::with_identity(format!("node-{i}"));
        other.increment_by(i).unwrap();
        merged.merge(&other);
    }

    c.bench_function("GCounter::to_json+from_json 100 replicas", |b| {
        b.iter(|| {
            let bytes = merged.to_json().unwrap();
            black_box(GCounter::from_json(&bytes).unwrap().value())
        })
    });
}

/// A set with `n` random adds and removes over `n / 2` distinct elements.
fn random_set(seed: u64, n: u32) -> LwwSet<u32> {
    let mut rng = StdRng::seed_from_u64(seed);
    let clock = MockClock::new();
    let set = LwwSet::new().with_clock(clock.clone());
    for _ in 0..n {
        clock.advance(Duration::from_micros(rng.gen_range(0..3)));
        let elem = rng.gen_range(0..n / 2);
        if rng.gen_bool(0.7) {
            set.add(elem);
        } else {
            set.remove(&elem);
        }
    }
    set
}

fn bench_lww_set_add(c: &mut Criterion) {
    c.bench_function("LwwSet::add x1000", |b| {
        b.iter(|| {
            let set = LwwSet::new();
            for i in 0..1000u32 {
                set.add(i);
            }
            black_box(set.len())
        })
    });
}

fn bench_lww_set_contains(c: &mut Criterion) {
    let set = random_set(7, 2000);

    c.bench_function("LwwSet::contains x1000", |b| {
        b.iter(|| {
            let mut present = 0;
            for i in 0..1000u32 {
                if set.contains(&i) {
                    present += 1;
                }
            }
            black_box(present)
        })
    });
}

fn bench_lww_set_merge(c: &mut Criterion) {
    let s1 = random_set(1, 1000);
    let s2 = random_set(2, 1000);

    c.bench_function("LwwSet::merge 1000+1000 ops", |b| {
        b.iter(|| {
            let merged = s1.clone();
            merged.merge(&s2);
            black_box(merged.len())
        })
    });
}

criterion_group!(
    benches,
    bench_gcounter_increment,
    bench_gcounter_merge,
    bench_gcounter_snapshot,
    bench_lww_set_add,
    bench_lww_set_contains,
    bench_lww_set_merge,
);
criterion_main!(benches);
