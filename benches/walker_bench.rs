//! Benchmarks for fs-walker
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use fs_walker::storage::MemoryStorage;
use fs_walker::walker::{join_path, SyncWalker};
use std::sync::Arc;

fn benchmark_join_path(c: &mut Criterion) {
    c.bench_function("join_path", |b| {
        b.iter(|| {
            let path = join_path(black_box("/export/data/projects/"), black_box("notes.txt"));
            black_box(path);
        })
    });
}

fn benchmark_sync_walk(c: &mut Criterion) {
    // 10 directories of 100 files each
    let storage = MemoryStorage::new();
    for d in 0..10 {
        for f in 0..100 {
            storage.add_file(&format!("root/dir{d}/file{f}.dat"), b"0123456789abcdef");
        }
    }
    let walker = SyncWalker::new(Arc::new(storage));

    c.bench_function("sync_walk_1k_entries", |b| {
        b.iter(|| {
            let entries = walker.each_entry(Some("root"), |_| {}).unwrap();
            black_box(entries);
        })
    });
}

criterion_group!(benches, benchmark_join_path, benchmark_sync_walk);
criterion_main!(benches);
