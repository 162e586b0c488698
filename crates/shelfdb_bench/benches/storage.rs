//! Storage backend benchmarks.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use shelfdb_storage::{FileBackend, InMemoryBackend, StorageBackend};
use tempfile::TempDir;

/// Create deterministic data of given size.
fn blob(size: usize) -> Vec<u8> {
    (0..size).map(|i| (i % 256) as u8).collect()
}

fn backends(dir: &TempDir) -> Vec<(&'static str, Box<dyn StorageBackend>)> {
    vec![
        ("memory", Box::new(InMemoryBackend::new())),
        (
            "file",
            Box::new(FileBackend::open(dir.path(), "json", false).unwrap()),
        ),
        (
            "file_fsync",
            Box::new(FileBackend::open(&dir.path().join("synced"), "json", true).unwrap()),
        ),
    ]
}

/// Benchmark whole-blob replacement.
fn bench_write(c: &mut Criterion) {
    let mut group = c.benchmark_group("write");
    group.sample_size(20);
    let dir = TempDir::new().unwrap();

    for (name, backend) in backends(&dir) {
        for size in [256, 4096, 65536].iter() {
            let data = blob(*size);
            group.throughput(Throughput::Bytes(*size as u64));
            group.bench_with_input(BenchmarkId::new(name, size), &data, |b, data| {
                b.iter(|| backend.write("bench", black_box(data)).unwrap());
            });
        }
    }
    group.finish();
}

/// Benchmark whole-blob reads.
fn bench_read(c: &mut Criterion) {
    let mut group = c.benchmark_group("read");
    let dir = TempDir::new().unwrap();

    for (name, backend) in backends(&dir) {
        for size in [256, 4096, 65536].iter() {
            let key = format!("bench_{size}");
            backend.write(&key, &blob(*size)).unwrap();
            group.throughput(Throughput::Bytes(*size as u64));
            group.bench_with_input(BenchmarkId::new(name, size), &key, |b, key| {
                b.iter(|| black_box(backend.read(key).unwrap()));
            });
        }
    }
    group.finish();
}

/// Benchmark the existence probe and lazy creation.
fn bench_create_if_absent(c: &mut Criterion) {
    let dir = TempDir::new().unwrap();
    let backend = FileBackend::open(dir.path(), "json", false).unwrap();
    backend.create_if_absent("present", b"null").unwrap();

    c.bench_function("create_if_absent_existing", |b| {
        b.iter(|| black_box(backend.create_if_absent("present", b"null").unwrap()));
    });
    c.bench_function("exists", |b| {
        b.iter(|| black_box(backend.exists("present").unwrap()));
    });
}

criterion_group!(benches, bench_write, bench_read, bench_create_if_absent);
criterion_main!(benches);
