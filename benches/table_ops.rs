use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use linked_hashtbl::{
    CapacityLimit, DirectBuildHasher, HashTable, LinkedHashTable, LinkedTableBuilder, Order,
};
use std::time::Duration;

fn lcg(mut s: u64) -> impl Iterator<Item = u64> {
    std::iter::from_fn(move || {
        s = s.wrapping_mul(6364136223846793005).wrapping_add(1);
        Some(s)
    })
}

fn key(n: u64) -> String {
    format!("k{:016x}", n)
}

fn bench_insert_fresh_100k(c: &mut Criterion) {
    c.bench_function("linked::insert_fresh_100k", |b| {
        b.iter_batched(
            LinkedHashTable::<String, u64>::new,
            |mut t| {
                for (i, x) in lcg(1).take(100_000).enumerate() {
                    t.insert(key(x), i as u64);
                }
                black_box(t)
            },
            BatchSize::SmallInput,
        )
    });

    c.bench_function("plain::insert_fresh_100k", |b| {
        b.iter_batched(
            HashTable::<String, u64>::new,
            |mut t| {
                for (i, x) in lcg(1).take(100_000).enumerate() {
                    t.insert(key(x), i as u64);
                }
                black_box(t)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_insert_presized_100k(c: &mut Criterion) {
    c.bench_function("linked::insert_presized_100k", |b| {
        b.iter_batched(
            || LinkedHashTable::<String, u64>::with_capacity(1 << 18),
            |mut t| {
                for (i, x) in lcg(2).take(100_000).enumerate() {
                    t.insert(key(x), i as u64);
                }
                black_box(t)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_get_hit_10k(c: &mut Criterion) {
    c.bench_function("linked::peek_hit_10k_on_100k", |b| {
        let mut t = LinkedHashTable::new();
        let keys: Vec<_> = lcg(7).take(100_000).map(key).collect();
        for (i, k) in keys.iter().enumerate() {
            t.insert(k.clone(), i as u64);
        }
        // Precompute 10k random query keys using LCG
        let n = keys.len();
        let mut s = 0x9e3779b97f4a7c15u64;
        let queries: Vec<String> = (0..10_000)
            .map(|_| {
                s = s.wrapping_mul(2862933555777941757).wrapping_add(3037000493);
                keys[(s as usize) % n].clone()
            })
            .collect();
        b.iter(|| {
            for k in &queries {
                black_box(t.peek(k.as_str()));
            }
        })
    });

    c.bench_function("linked::get_promote_10k_on_100k", |b| {
        b.iter_batched(
            || {
                let mut t = LinkedTableBuilder::new()
                    .order(Order::Access)
                    .build::<String, u64>();
                let keys: Vec<_> = lcg(7).take(100_000).map(key).collect();
                for (i, k) in keys.iter().enumerate() {
                    t.insert(k.clone(), i as u64);
                }
                let n = keys.len();
                let mut s = 0x9e3779b97f4a7c15u64;
                let queries: Vec<String> = (0..10_000)
                    .map(|_| {
                        s = s.wrapping_mul(2862933555777941757).wrapping_add(3037000493);
                        keys[(s as usize) % n].clone()
                    })
                    .collect();
                (t, queries)
            },
            |(mut t, queries)| {
                for k in &queries {
                    black_box(t.get(k.as_str()));
                }
                black_box(t)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_get_miss_10k(c: &mut Criterion) {
    c.bench_function("linked::peek_miss_10k_on_100k", |b| {
        let mut t = LinkedHashTable::new();
        for (i, x) in lcg(11).take(100_000).enumerate() {
            t.insert(key(x), i as u64);
        }
        let mut miss = lcg(0xdead_beef);
        b.iter(|| {
            for _ in 0..10_000 {
                let k = key(miss.next().unwrap());
                black_box(t.peek(k.as_str()));
            }
        })
    });
}

fn bench_remove_random_10k(c: &mut Criterion) {
    c.bench_function("linked::remove_random_10k_of_110k", |b| {
        b.iter_batched(
            || {
                let mut t = LinkedHashTable::new();
                let keys: Vec<_> = lcg(5).take(110_000).map(key).collect();
                for (i, k) in keys.iter().enumerate() {
                    t.insert(k.clone(), i as u64);
                }
                // Precompute 10k unique victims via LCG
                let n = keys.len();
                let mut sel = std::collections::HashSet::with_capacity(10_000);
                let mut s = 0x9e3779b97f4a7c15u64;
                while sel.len() < 10_000 {
                    s = s.wrapping_mul(2862933555777941757).wrapping_add(3037000493);
                    sel.insert((s as usize) % n);
                }
                let to_remove: Vec<String> = sel.into_iter().map(|i| keys[i].clone()).collect();
                (t, to_remove)
            },
            |(mut t, to_remove)| {
                for k in &to_remove {
                    let _ = t.remove(k.as_str());
                }
                black_box(t)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_lru_churn(c: &mut Criterion) {
    c.bench_function("linked::lru_churn_100k_into_4k", |b| {
        b.iter_batched(
            || {
                LinkedTableBuilder::new()
                    .capacity(8192)
                    .order(Order::Access)
                    .hasher(DirectBuildHasher)
                    .evictor(CapacityLimit::new(4096))
                    .build::<u64, u64>()
            },
            |mut t| {
                for x in lcg(42).take(100_000) {
                    // Mix of hits and inserts against a bounded cache.
                    let k = x % 8192;
                    if t.get(&k).is_none() {
                        t.insert(k, x);
                    }
                }
                black_box(t)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_iterate_100k(c: &mut Criterion) {
    c.bench_function("linked::iter_all_100k", |b| {
        let mut t = LinkedHashTable::new();
        for (i, x) in lcg(999).take(100_000).enumerate() {
            t.insert(key(x), i as u64);
        }
        b.iter(|| {
            let mut sum = 0u64;
            for (_k, v) in t.iter() {
                sum = sum.wrapping_add(*v);
            }
            black_box(sum)
        })
    });

    c.bench_function("linked::apply_all_100k", |b| {
        let mut t = LinkedHashTable::new();
        for (i, x) in lcg(999).take(100_000).enumerate() {
            t.insert(key(x), i as u64);
        }
        b.iter(|| {
            let mut sum = 0u64;
            t.apply(|_, v| {
                sum = sum.wrapping_add(*v);
                true
            });
            black_box(sum)
        })
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
    targets = bench_insert_fresh_100k, bench_insert_presized_100k
}
criterion_group! {
    name = benches_ops;
    config = bench_config();
    targets = bench_get_hit_10k,
              bench_get_miss_10k,
              bench_remove_random_10k,
              bench_lru_churn,
              bench_iterate_100k
}
criterion_main!(benches_insert, benches_ops);
