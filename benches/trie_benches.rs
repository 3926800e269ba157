use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use radix_index::Trie;
use std::collections::BTreeMap;

const SIZES: &[usize] = &[1_000, 10_000, 100_000];

fn sequential_keys(n: usize) -> Vec<Vec<u8>> {
    (0..n).map(|i| format!("key:{:08}", i).into_bytes()).collect()
}

fn route_keys(n: usize) -> Vec<Vec<u8>> {
    let hosts = ["example.com", "test.org", "demo.net"];
    let sections = ["users", "posts", "api/v1", "api/v2", "static/img"];
    (0..n)
        .map(|i| {
            let host = hosts[i % hosts.len()];
            let section = sections[(i / hosts.len()) % sections.len()];
            format!("{}/{}/{}", host, section, i / (hosts.len() * sections.len())).into_bytes()
        })
        .collect()
}

fn random_keys(n: usize, rng: &mut StdRng) -> Vec<Vec<u8>> {
    (0..n)
        .map(|_| {
            let len = rng.gen_range(1..24);
            (0..len).map(|_| rng.gen::<u8>()).collect()
        })
        .collect()
}

fn build(keys: &[Vec<u8>]) -> Trie {
    keys.iter()
        .enumerate()
        .map(|(i, key)| (key.as_slice(), i as i64))
        .collect()
}

fn bench_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("insert");
    let mut rng = StdRng::seed_from_u64(7);

    for &size in SIZES {
        let mut keys = route_keys(size);
        keys.shuffle(&mut rng);

        group.bench_with_input(BenchmarkId::new("Trie", size), &keys, |b, keys| {
            b.iter(|| black_box(build(keys)));
        });

        group.bench_with_input(BenchmarkId::new("BTreeMap", size), &keys, |b, keys| {
            b.iter(|| {
                let map: BTreeMap<Vec<u8>, i64> = keys
                    .iter()
                    .enumerate()
                    .map(|(i, key)| (key.clone(), i as i64))
                    .collect();
                black_box(map)
            });
        });
    }

    group.finish();
}

fn bench_lookup(c: &mut Criterion) {
    let mut group = c.benchmark_group("lookup");
    let mut rng = StdRng::seed_from_u64(11);

    for &size in SIZES {
        let keys = random_keys(size, &mut rng);
        let trie = build(&keys);

        group.bench_with_input(BenchmarkId::new("hit", size), &keys, |b, keys| {
            b.iter(|| {
                let mut sum = 0i64;
                for key in keys {
                    sum = sum.wrapping_add(trie.get(key).unwrap_or(0));
                }
                black_box(sum)
            });
        });

        let misses = random_keys(size, &mut rng);
        group.bench_with_input(BenchmarkId::new("miss", size), &misses, |b, misses| {
            b.iter(|| black_box(misses.iter().filter(|key| trie.contains_key(key)).count()));
        });
    }

    group.finish();
}

fn bench_remove(c: &mut Criterion) {
    let mut group = c.benchmark_group("remove");

    for &size in SIZES {
        let keys = sequential_keys(size);
        let trie = build(&keys);

        group.bench_with_input(BenchmarkId::new("all", size), &keys, |b, keys| {
            b.iter(|| {
                let mut trie = trie.clone();
                for key in keys {
                    trie.remove(key);
                }
                black_box(trie.node_count())
            });
        });
    }

    group.finish();
}

fn bench_cursor(c: &mut Criterion) {
    let mut group = c.benchmark_group("cursor");

    for &size in SIZES {
        let keys = route_keys(size);
        let trie = build(&keys);

        group.bench_function(BenchmarkId::new("full_scan", size), |b| {
            b.iter(|| {
                let mut cursor = trie.cursor();
                let mut count = 0usize;
                while let Ok(Some(_)) = cursor.next(&trie, "") {
                    count += 1;
                }
                black_box(count)
            });
        });

        group.bench_function(BenchmarkId::new("prefix_scan", size), |b| {
            b.iter(|| black_box(trie.view_subtrie("test.org/api/").iter().count()));
        });

        group.bench_function(BenchmarkId::new("seek_at_most", size), |b| {
            let mut cursor = trie.cursor();
            b.iter(|| {
                for key in keys.iter().step_by(97) {
                    black_box(cursor.seek_at_most(&trie, key).ok());
                }
            });
        });

        group.bench_function(BenchmarkId::new("prefixes_of", size), |b| {
            b.iter(|| black_box(trie.prefixes_of("demo.net/static/img/12345").count()));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_insert, bench_lookup, bench_remove, bench_cursor);
criterion_main!(benches);
