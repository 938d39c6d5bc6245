//! Recovery read benchmarks.

use burrow_bench::{encoded_catalog, encoded_log, write_temp};
use burrow_core::{EntryRead, RecoveryReader};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

/// Benchmark full scans of a data file.
///
/// The two small sizes fit in the first read; the larger ones need a second.
fn bench_entry_scan(c: &mut Criterion) {
    let mut group = c.benchmark_group("entry_scan");
    group.sample_size(50);

    for value_size in [8, 16, 256, 4096].iter() {
        let (data, _) = encoded_log(1000, *value_size);
        let (_dir, path) = write_temp(&data);

        group.throughput(Throughput::Bytes(data.len() as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(value_size),
            value_size,
            |b, _| {
                b.iter(|| {
                    let mut reader = RecoveryReader::open(&path, 4096).unwrap();
                    let count = reader.entries(0).map(|r| r.unwrap()).count();
                    black_box(count);
                    reader.release().unwrap();
                });
            },
        );
    }

    group.finish();
}

/// Benchmark single positioned reads at known offsets.
fn bench_entry_read_at(c: &mut Criterion) {
    let mut group = c.benchmark_group("entry_read_at");

    for value_size in [16, 4096].iter() {
        let (data, offsets) = encoded_log(256, *value_size);
        let (_dir, path) = write_temp(&data);
        let mut reader = RecoveryReader::open(&path, 4096).unwrap();

        group.bench_with_input(
            BenchmarkId::from_parameter(value_size),
            value_size,
            |b, _| {
                let mut i = 0;
                b.iter(|| {
                    let offset = offsets[i % offsets.len()];
                    i += 1;
                    match reader.read_entry_at(black_box(offset)).unwrap() {
                        EntryRead::Entry(recovered) => black_box(recovered.size),
                        EntryRead::EndOfData => unreachable!(),
                    };
                });
            },
        );
    }

    group.finish();
}

/// Benchmark bucket catalog scans across buffer sizes.
fn bench_bucket_scan(c: &mut Criterion) {
    let mut group = c.benchmark_group("bucket_scan");
    let data = encoded_catalog(10_000);
    let (_dir, path) = write_temp(&data);

    group.throughput(Throughput::Bytes(data.len() as u64));
    for buffer_size in [4096usize, 64 * 1024, 1024 * 1024].iter() {
        group.bench_with_input(
            BenchmarkId::from_parameter(buffer_size),
            buffer_size,
            |b, &buffer_size| {
                b.iter(|| {
                    let mut reader = RecoveryReader::open(&path, buffer_size).unwrap();
                    let count = reader.buckets().map(|r| r.unwrap()).count();
                    black_box(count);
                    reader.release().unwrap();
                });
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_entry_scan,
    bench_entry_read_at,
    bench_bucket_scan
);
criterion_main!(benches);
