//! Snapshot codec benchmarks.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use serde_json::{json, Value};
use shelfdb_bench::generate_records;
use shelfdb_codec::Format;

/// Create a nested map collection value.
fn nested_map(depth: usize, width: usize) -> Value {
    if depth == 0 {
        json!("leaf")
    } else {
        let children: serde_json::Map<String, Value> = (0..width)
            .map(|i| (format!("key_{i}"), nested_map(depth - 1, width)))
            .collect();
        Value::Object(children)
    }
}

/// Benchmark encoding list snapshots in both formats.
fn bench_encode_list(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode_list");

    for count in [10, 100, 1000].iter() {
        let value = Value::Array(generate_records(*count, 64));
        group.throughput(Throughput::Elements(*count as u64));

        for (name, format, pretty) in [
            ("json_pretty", Format::Json, true),
            ("json", Format::Json, false),
            ("cbor", Format::Cbor, false),
        ] {
            group.bench_with_input(BenchmarkId::new(name, count), &value, |b, value| {
                b.iter(|| {
                    let bytes = format.encode(black_box(value), pretty).unwrap();
                    black_box(bytes);
                });
            });
        }
    }
    group.finish();
}

/// Benchmark decoding list snapshots in both formats.
fn bench_decode_list(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode_list");

    for count in [10, 100, 1000].iter() {
        let value = Value::Array(generate_records(*count, 64));
        group.throughput(Throughput::Elements(*count as u64));

        for format in [Format::Json, Format::Cbor] {
            let bytes = format.encode(&value, true).unwrap();
            group.bench_with_input(
                BenchmarkId::new(format.extension(), count),
                &bytes,
                |b, bytes| {
                    b.iter(|| {
                        let decoded = format.decode(black_box(bytes)).unwrap();
                        black_box(decoded);
                    });
                },
            );
        }
    }
    group.finish();
}

/// Benchmark nested map snapshots.
fn bench_nested_map(c: &mut Criterion) {
    let mut group = c.benchmark_group("nested_map");

    for (depth, width) in [(2, 10), (4, 5), (6, 3)].iter() {
        let value = nested_map(*depth, *width);
        let label = format!("d{depth}_w{width}");

        for format in [Format::Json, Format::Cbor] {
            group.bench_with_input(
                BenchmarkId::new(format!("roundtrip_{}", format.extension()), &label),
                &value,
                |b, value| {
                    b.iter(|| {
                        let encoded = format.encode(black_box(value), false).unwrap();
                        let decoded = format.decode(&encoded).unwrap();
                        black_box(decoded);
                    });
                },
            );
        }
    }
    group.finish();
}

criterion_group!(benches, bench_encode_list, bench_decode_list, bench_nested_map);
criterion_main!(benches);
