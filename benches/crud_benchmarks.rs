use avl_tree::{AvlTreeMap, OrderedMap};
use criterion::{BatchSize, BenchmarkId, Criterion, criterion_group, criterion_main};
use std::collections::{BTreeMap, HashSet};
use std::hint::black_box;

const N: usize = 10_000;
const SEED: u64 = 12345;

// ─── Helper functions to generate key sequences ─────────────────────────────

fn ordered_keys(n: usize) -> Vec<i64> {
    (0..n as i64).collect()
}

fn reverse_ordered_keys(n: usize) -> Vec<i64> {
    (0..n as i64).rev().collect()
}

/// `n` distinct pseudo-random keys from a linear congruential generator started at `seed`.
fn random_keys(n: usize, seed: u64) -> Vec<i64> {
    let mut seen = HashSet::with_capacity(n);
    let mut keys = Vec::with_capacity(n);
    let mut x = seed;
    while keys.len() < n {
        x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
        let key = (x >> 33) as i64;
        if seen.insert(key) {
            keys.push(key);
        }
    }
    keys
}

fn filled<M: OrderedMap<i64, i64> + Default>(keys: &[i64]) -> M {
    let mut map = M::default();
    for &k in keys {
        map.insert(k, k).expect("benchmark keys are distinct");
    }
    map
}

// ─── Generic drivers, written against the shared contract ───────────────────

fn bench_insert(c: &mut Criterion, name: &str, keys: &[i64]) {
    let mut group = c.benchmark_group(name);

    group.bench_function(BenchmarkId::new("AvlTreeMap", keys.len()), |b| {
        b.iter(|| filled::<AvlTreeMap<i64, i64>>(keys));
    });

    group.bench_function(BenchmarkId::new("BTreeMap", keys.len()), |b| {
        b.iter(|| filled::<BTreeMap<i64, i64>>(keys));
    });

    group.finish();
}

fn sum_lookups<M: OrderedMap<i64, i64>>(map: &M, keys: &[i64]) -> i64 {
    let mut sum = 0i64;
    for k in keys {
        if let Ok(&v) = map.get(k) {
            sum = sum.wrapping_add(v);
        }
    }
    sum
}

fn bench_get(c: &mut Criterion, name: &str, fill: &[i64], probe: &[i64]) {
    let avl: AvlTreeMap<i64, i64> = filled(fill);
    let bt: BTreeMap<i64, i64> = filled(fill);
    let mut group = c.benchmark_group(name);

    group.bench_function(BenchmarkId::new("AvlTreeMap", probe.len()), |b| {
        b.iter(|| sum_lookups(&avl, black_box(probe)));
    });

    group.bench_function(BenchmarkId::new("BTreeMap", probe.len()), |b| {
        b.iter(|| sum_lookups(&bt, black_box(probe)));
    });

    group.finish();
}

fn remove_all<M: OrderedMap<i64, i64>>(mut map: M, keys: &[i64]) -> M {
    for k in keys {
        map.remove(k).expect("every removed key was inserted");
    }
    map
}

fn bench_remove(c: &mut Criterion, name: &str, fill: &[i64], order: &[i64]) {
    let avl: AvlTreeMap<i64, i64> = filled(fill);
    let bt: BTreeMap<i64, i64> = filled(fill);
    let mut group = c.benchmark_group(name);

    group.bench_function(BenchmarkId::new("AvlTreeMap", order.len()), |b| {
        b.iter_batched(|| avl.clone(), |map| remove_all(map, order), BatchSize::SmallInput);
    });

    group.bench_function(BenchmarkId::new("BTreeMap", order.len()), |b| {
        b.iter_batched(|| bt.clone(), |map| remove_all(map, order), BatchSize::SmallInput);
    });

    group.finish();
}

fn neighbour_walk<M: OrderedMap<i64, i64>>(map: &M, probe: &[i64]) -> i64 {
    let mut sum = 0i64;
    for k in probe {
        if let Some(&next) = map.next_key(k) {
            sum = sum.wrapping_add(next);
        }
        if let Some(&prev) = map.prev_key(k) {
            sum = sum.wrapping_sub(prev);
        }
    }
    sum
}

// ─── Map Benchmarks ─────────────────────────────────────────────────────────

fn bench_map_insert_ordered(c: &mut Criterion) {
    bench_insert(c, "map_insert_ordered", &ordered_keys(N));
}

fn bench_map_insert_reverse(c: &mut Criterion) {
    bench_insert(c, "map_insert_reverse", &reverse_ordered_keys(N));
}

fn bench_map_insert_random(c: &mut Criterion) {
    bench_insert(c, "map_insert_random", &random_keys(N, SEED));
}

fn bench_map_get_ordered(c: &mut Criterion) {
    let keys = ordered_keys(N);
    bench_get(c, "map_get_ordered", &keys, &keys);
}

fn bench_map_get_reverse(c: &mut Criterion) {
    bench_get(c, "map_get_reverse", &ordered_keys(N), &reverse_ordered_keys(N));
}

fn bench_map_get_random(c: &mut Criterion) {
    let keys = random_keys(N, SEED);
    bench_get(c, "map_get_random", &keys, &keys);
}

fn bench_map_remove_ordered(c: &mut Criterion) {
    let keys = ordered_keys(N);
    bench_remove(c, "map_remove_ordered", &keys, &keys);
}

fn bench_map_remove_reverse(c: &mut Criterion) {
    bench_remove(c, "map_remove_reverse", &ordered_keys(N), &reverse_ordered_keys(N));
}

fn bench_map_remove_random(c: &mut Criterion) {
    let keys = random_keys(N, SEED);
    let mut order = keys.clone();
    // Removal order unrelated to insertion order.
    order.sort_by_key(|&k| (k as u64).wrapping_mul(6364136223846793005) ^ 0x9E37_79B9_7F4A_7C15);
    bench_remove(c, "map_remove_random", &keys, &order);
}

fn bench_map_neighbours_random(c: &mut Criterion) {
    let keys = random_keys(N, SEED);
    let probe = random_keys(N, SEED + 1);
    let avl: AvlTreeMap<i64, i64> = filled(&keys);
    let bt: BTreeMap<i64, i64> = filled(&keys);
    let mut group = c.benchmark_group("map_neighbours_random");

    group.bench_function(BenchmarkId::new("AvlTreeMap", N), |b| {
        b.iter(|| neighbour_walk(&avl, black_box(&probe)));
    });

    group.bench_function(BenchmarkId::new("BTreeMap", N), |b| {
        b.iter(|| neighbour_walk(&bt, black_box(&probe)));
    });

    group.finish();
}

// ─── Criterion Groups ───────────────────────────────────────────────────────

criterion_group!(map_insert_benches, bench_map_insert_ordered, bench_map_insert_reverse, bench_map_insert_random,);

criterion_group!(map_get_benches, bench_map_get_ordered, bench_map_get_reverse, bench_map_get_random,);

criterion_group!(map_remove_benches, bench_map_remove_ordered, bench_map_remove_reverse, bench_map_remove_random,);

criterion_group!(map_neighbour_benches, bench_map_neighbours_random,);

criterion_main!(map_insert_benches, map_get_benches, map_remove_benches, map_neighbour_benches,);
