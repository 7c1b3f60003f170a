use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use probe_collections::{Int2IntHashMap, Int2ObjectHashMap, IntHashSet, Long2LongHashMap};
use std::collections::HashMap;
use std::time::Duration;

fn lcg(mut s: u64) -> impl Iterator<Item = u64> {
    std::iter::from_fn(move || {
        s = s.wrapping_mul(6364136223846793005).wrapping_add(1);
        Some(s)
    })
}

fn int_key(n: u64) -> i32 {
    (n >> 33) as i32
}

fn bench_insert_fresh_100k(c: &mut Criterion) {
    c.bench_function("int2int::insert_fresh_100k", |b| {
        b.iter_batched(
            || Int2IntHashMap::new(-1),
            |mut m| {
                for (i, x) in lcg(1).take(100_000).enumerate() {
                    m.put(int_key(x), i as i32).unwrap();
                }
                black_box(m)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_insert_warm_100k(c: &mut Criterion) {
    c.bench_function("int2int::insert_warm_100k", |b| {
        b.iter_batched(
            || {
                // Pre-grow and then clear; capacity is kept.
                let mut m = Int2IntHashMap::new(-1);
                for (i, x) in lcg(2).take(110_000).enumerate() {
                    m.put(int_key(x), i as i32).unwrap();
                }
                m.clear();
                m
            },
            |mut m| {
                for (i, x) in lcg(3).take(100_000).enumerate() {
                    m.put(int_key(x), i as i32).unwrap();
                }
                black_box(m)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_std_insert_100k(c: &mut Criterion) {
    c.bench_function("std::insert_fresh_100k", |b| {
        b.iter_batched(
            HashMap::<i32, i32>::new,
            |mut m| {
                for (i, x) in lcg(1).take(100_000).enumerate() {
                    m.insert(int_key(x), i as i32);
                }
                black_box(m)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_get_hit_10k(c: &mut Criterion) {
    let mut m = Long2LongHashMap::new(-1);
    let keys: Vec<i64> = lcg(5).take(100_000).map(|x| x as i64 >> 1).collect();
    for (i, &k) in keys.iter().enumerate() {
        m.put(k, i as i64).unwrap();
    }
    c.bench_function("long2long::get_hit_10k", |b| {
        b.iter(|| {
            let mut acc = 0i64;
            for &k in keys.iter().take(10_000) {
                acc = acc.wrapping_add(m.get(k));
            }
            black_box(acc)
        })
    });
}

fn bench_get_miss_10k(c: &mut Criterion) {
    let mut m = Int2IntHashMap::new(-1);
    for (i, x) in lcg(7).take(100_000).enumerate() {
        m.put(int_key(x), i as i32).unwrap();
    }
    let misses: Vec<i32> = lcg(0xdead_beef).take(10_000).map(int_key).collect();
    c.bench_function("int2int::get_miss_10k", |b| {
        b.iter(|| {
            let mut hits = 0usize;
            for &k in &misses {
                hits += usize::from(m.contains_key(k));
            }
            black_box(hits)
        })
    });
}

fn bench_remove_random_10k(c: &mut Criterion) {
    c.bench_function("int2int::remove_random_10k_of_110k", |b| {
        b.iter_batched(
            || {
                let mut m = Int2IntHashMap::new(-1);
                let keys: Vec<i32> = lcg(9).take(110_000).map(int_key).collect();
                for (i, &k) in keys.iter().enumerate() {
                    m.put(k, i as i32).unwrap();
                }
                let victims: Vec<i32> = keys.iter().step_by(11).copied().take(10_000).collect();
                (m, victims)
            },
            |(mut m, victims)| {
                for k in victims {
                    black_box(m.remove(k));
                }
                black_box(m)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_iterate_and_cursor(c: &mut Criterion) {
    let mut m = Int2ObjectHashMap::new();
    for (i, x) in lcg(13).take(50_000).enumerate() {
        m.put(int_key(x), i as u64);
    }
    c.bench_function("int2object::iter_50k", |b| {
        b.iter(|| {
            let mut acc = 0u64;
            for (_, v) in m.iter() {
                acc = acc.wrapping_add(v.copied().unwrap_or(0));
            }
            black_box(acc)
        })
    });

    let mut s = IntHashSet::new();
    for x in lcg(17).take(50_000) {
        s.insert(int_key(x));
    }
    c.bench_function("intset::cursor_remove_half_50k", |b| {
        b.iter_batched(
            || s.clone(),
            |mut s| {
                let mut cursor = s.cursor();
                while let Some(v) = cursor.next() {
                    if v & 1 == 0 {
                        cursor.remove();
                    }
                }
                black_box(s)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_config() -> Criterion {
    Criterion::default()
        .sample_size(12)
        .measurement_time(Duration::from_secs(5))
        .warm_up_time(Duration::from_secs(1))
}

criterion_group! {
    name = benches_insert;
    config = bench_config();
    targets = bench_insert_fresh_100k, bench_insert_warm_100k, bench_std_insert_100k
}
criterion_group! {
    name = benches_ops;
    config = bench_config();
    targets = bench_get_hit_10k,
              bench_get_miss_10k,
              bench_remove_random_10k,
              bench_iterate_and_cursor
}
criterion_main!(benches_insert, benches_ops);
