use brc_pipeline::StationMap;
use brc_pipeline::station_map::BuildStationHasher;
use brc_pipeline::temperature::parse_temp;
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use pprof::criterion::{Output, PProfProfiler};
use std::hash::BuildHasher;
use std::hint::black_box;

fn station_names(count: usize) -> Vec<Vec<u8>> {
    (0..count)
        .map(|i| {
            let len = 2 + (i * 7) % 40;
            (0..len)
                .map(|j| b'A' + ((i + j * 13) % 26) as u8)
                .chain(i.to_string().into_bytes())
                .collect()
        })
        .collect()
}

fn bench_hash(c: &mut Criterion) {
    let lengths: &[usize] = &[2, 4, 8, 9, 12, 16, 24, 32, 49];

    let names: Vec<Vec<u8>> = lengths
        .iter()
        .map(|&len| (0..len).map(|i| b'A' + (i % 26) as u8).collect())
        .collect();

    let mut group = c.benchmark_group("hash");

    for (i, name) in names.iter().enumerate() {
        group.throughput(criterion::Throughput::Bytes(name.len() as u64));
        group.bench_with_input(BenchmarkId::new("station", lengths[i]), name, |b, name| {
            b.iter(|| BuildStationHasher.hash_one(black_box(name.as_slice())))
        });
    }

    group.finish();
}

fn bench_record(c: &mut Criterion) {
    let names = station_names(10_000);
    let mut map = StationMap::with_capacity(names.len());
    for name in &names {
        map.record(name, 0);
    }

    let mut group = c.benchmark_group("record");

    group.bench_function("existing_entry", |b| {
        let name = names[0].as_slice();
        b.iter(|| map.record(black_box(name), black_box(42)))
    });

    group.bench_function("realistic_cycle", |b| {
        let mut i = 0;
        b.iter(|| {
            map.record(black_box(&names[i % names.len()]), 42);
            i += 1;
        })
    });

    group.finish();
}

fn bench_merge(c: &mut Criterion) {
    let names = station_names(10_000);

    let mut partial = StationMap::new();
    for (i, name) in names.iter().enumerate() {
        partial.record(name, i as i64 % 999);
    }

    let mut global = StationMap::new();
    global.merge(partial.clone());

    c.bench_function("merge_10k_stations", |b| {
        b.iter(|| global.merge(black_box(partial.clone())))
    });
}

fn bench_parse_temp(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_temp");

    for value in ["1.2", "-1.2", "12.3", "-12.3", "99.9"] {
        group.bench_with_input(BenchmarkId::new("fixed_point", value), value, |b, value| {
            b.iter(|| parse_temp(black_box(value.as_bytes())))
        });
        group.bench_with_input(BenchmarkId::new("f64", value), value, |b, value| {
            b.iter(|| black_box(value).parse::<f64>())
        });
    }

    group.finish();
}

criterion_group! {
    name = benches;
    config = Criterion::default().with_profiler(PProfProfiler::new(100, Output::Flamegraph(None)));
    targets = bench_hash, bench_record, bench_merge, bench_parse_temp
}

criterion_main!(benches);
