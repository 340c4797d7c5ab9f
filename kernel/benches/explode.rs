use criterion::{criterion_group, criterion_main, Criterion};
use jagged_kernel::explode::{explode_data, explode_size};

// Per three entries: one empty outer list, one singleton, and one
// [empty, pair]. Consumption is exactly six counts per tile, so a tiled
// column is never over-read.
const TRICK: [u64; 6] = [0, 1, 1, 2, 0, 2];

fn bench_explode_size(c: &mut Criterion) {
    let tiles = 10_000;
    let sizes: Vec<u64> = TRICK
        .iter()
        .copied()
        .cycle()
        .take(tiles * TRICK.len())
        .collect();
    let columns: Vec<&[u64]> = vec![&sizes];
    let levels = [0u32, 0];
    let num_entries = tiles * 3;

    let len = explode_size(num_entries, &levels, &columns, None).unwrap();
    let mut out = vec![0u64; len];

    c.bench_function("explode_size dry run", |b| {
        b.iter(|| explode_size(num_entries, &levels, &columns, None).unwrap())
    });
    c.bench_function("explode_size fill", |b| {
        b.iter(|| explode_size(num_entries, &levels, &columns, Some(&mut out)).unwrap())
    });
}

fn bench_explode_data(c: &mut Criterion) {
    let num_entries = 10_000;
    let outer: Vec<u64> = [3u64, 2, 2, 2]
        .iter()
        .copied()
        .cycle()
        .take(num_entries * 4)
        .collect();
    let inner: Vec<u64> = vec![4; num_entries];
    let columns: Vec<&[u64]> = vec![&outer, &inner];
    let levels = [0u32, 0, 1];

    let data = vec![0u8; outer.iter().sum::<u64>() as usize * 8];
    let len = explode_data(num_entries, &levels, &columns, 0, 8, &data, None).unwrap();
    let mut out = vec![0u8; len * 8];

    c.bench_function("explode_data fill (8-byte items)", |b| {
        b.iter(|| {
            explode_data(num_entries, &levels, &columns, 0, 8, &data, Some(&mut out)).unwrap()
        })
    });
}

criterion_group!(benches, bench_explode_size, bench_explode_data);
criterion_main!(benches);
