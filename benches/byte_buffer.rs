use brc_pipeline::byte_buffer::ByteBuffer;
use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

fn bench_byte_position(c: &mut Criterion) {
    let mut group = c.benchmark_group("byte_position");

    let test_cases: Vec<(&str, Vec<u8>)> = vec![
        ("len_4_pos_2", b"Xi;3.4".to_vec()),
        ("len_8_pos_4", b"Lima;5.6".to_vec()),
        ("len_12_pos_6", b"Berlin;12.3".to_vec()),
        ("len_16_pos_9", b"Melbourne;23.4".to_vec()),
        ("len_24_pos_13", b"San Francisco;-5.2".to_vec()),
        ("len_32_pos_18", b"Thiruvananthapuram;31.2".to_vec()),
        (
            "len_64_pos_45",
            b"Some Very Long Station Name That Goes On Forever;99.9".to_vec(),
        ),
    ];

    for (name, line) in &test_cases {
        group.throughput(Throughput::Bytes(line.len() as u64));
        group.bench_with_input(BenchmarkId::new("semicolon", name), line, |b, line| {
            b.iter(|| black_box(line.as_slice()).byte_position(b';'))
        });
        group.bench_with_input(BenchmarkId::new("naive", name), line, |b, line| {
            b.iter(|| black_box(line.as_slice()).iter().position(|&b| b == b';'))
        });
    }

    group.finish();
}

fn bench_byte_position_worst_case(c: &mut Criterion) {
    let mut group = c.benchmark_group("byte_position_worst");

    let late: Vec<u8> = "A"
        .repeat(63)
        .into_bytes()
        .into_iter()
        .chain([b';'])
        .collect();

    let missing: Vec<u8> = "A".repeat(64).into_bytes();

    group.throughput(Throughput::Bytes(64));

    group.bench_function("needle_at_end_64", |b| {
        b.iter(|| black_box(late.as_slice()).byte_position(b';'))
    });

    group.bench_function("needle_missing_64", |b| {
        b.iter(|| black_box(missing.as_slice()).byte_position(b';'))
    });

    group.finish();
}

// The splitter looks for the last newline of each block.
fn bench_last_byte_position(c: &mut Criterion) {
    let mut group = c.benchmark_group("last_byte_position");

    let line = b"Melbourne;23.4\n";
    for size in [64usize, 4096, 1 << 20] {
        let mut block: Vec<u8> = line.iter().cycle().take(size).cloned().collect();
        // Worst case for the backward scan: a long unterminated tail.
        let tail = size / 2;
        block[size - tail..].fill(b'A');

        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::new("swar", size), &block, |b, block| {
            b.iter(|| black_box(block.as_slice()).last_byte_position(b'\n'))
        });
        group.bench_with_input(BenchmarkId::new("rposition", size), &block, |b, block| {
            b.iter(|| black_box(block.as_slice()).iter().rposition(|&b| b == b'\n'))
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_byte_position,
    bench_byte_position_worst_case,
    bench_last_byte_position
);
criterion_main!(benches);
