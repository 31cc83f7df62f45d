//! Benchmarks for blockidx index operations

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use blockidx::{IndexHandler, MapConfig, SegmentMeta};
use tempfile::TempDir;

fn populated_index(dir: &TempDir, buckets: u32, keys: u64) -> IndexHandler {
    let mut index = IndexHandler::create(dir.path(), 1, buckets, &MapConfig::default()).unwrap();
    for key in 0..keys {
        index
            .write_segment_meta(key, SegmentMeta::new(key as u32, 128))
            .unwrap();
    }
    index
}

fn index_benchmarks(c: &mut Criterion) {
    c.bench_function("write_segment_meta/append", |b| {
        let dir = TempDir::new().unwrap();
        // Roomy cap: criterion can run enough iterations to exhaust the
        // default 64 MB arena
        let config = MapConfig::builder()
            .max_map_size(4 * 1024 * 1024 * 1024)
            .build();
        let mut index = IndexHandler::create(dir.path(), 1, 1021, &config).unwrap();
        let mut key = 0u64;
        b.iter(|| {
            key += 1;
            index
                .write_segment_meta(black_box(key), SegmentMeta::new(0, 128))
                .unwrap()
        });
    });

    c.bench_function("read_segment_meta/10k_keys", |b| {
        let dir = TempDir::new().unwrap();
        let index = populated_index(&dir, 1021, 10_000);
        let mut key = 0u64;
        b.iter(|| {
            key = (key + 1) % 10_000;
            index.read_segment_meta(black_box(key)).unwrap()
        });
    });

    c.bench_function("read_segment_meta/long_chains", |b| {
        // 16 buckets over 10k keys: ~600-node chains
        let dir = TempDir::new().unwrap();
        let index = populated_index(&dir, 16, 10_000);
        let mut key = 0u64;
        b.iter(|| {
            key = (key + 1) % 10_000;
            index.read_segment_meta(black_box(key)).unwrap()
        });
    });

    c.bench_function("delete_then_reinsert", |b| {
        let dir = TempDir::new().unwrap();
        let mut index = populated_index(&dir, 1021, 10_000);
        let mut key = 0u64;
        b.iter(|| {
            key = (key + 1) % 10_000;
            index.delete_segment_meta(black_box(key)).unwrap();
            index
                .write_segment_meta(black_box(key), SegmentMeta::new(0, 128))
                .unwrap()
        });
    });
}

criterion_group!(benches, index_benchmarks);
criterion_main!(benches);
