use criterion::{black_box, criterion_group, criterion_main, Criterion};
use lz_keen::raw::{
    compress_block, compress_block_bound, compress_block_hc, uncompress_block, HashTable,
};
use rand::prelude::*;

fn criterion_benchmark(c: &mut Criterion) {
    let mut data = vec![0u8; 1_000_000];
    thread_rng().fill(&mut data[200_000..600_000]); // mixed

    let mut compressed = vec![0u8; compress_block_bound(data.len())];
    let mut table = HashTable::default();

    c.bench_function("compress 1M mixed", |b| {
        b.iter(|| compress_block(black_box(&data), &mut compressed, &mut table))
    });

    c.bench_function("compress_hc 1M mixed", |b| {
        b.iter(|| compress_block_hc(black_box(&data), &mut compressed, 16))
    });

    let n = compress_block(&data, &mut compressed, &mut table).unwrap();
    let mut plain = vec![0u8; data.len()];
    c.bench_function("uncompress 1M mixed", |b| {
        b.iter(|| uncompress_block(black_box(&compressed[..n]), &mut plain))
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
