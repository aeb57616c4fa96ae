//! Integration tests for brc_pipeline
//!
//! These run the full pipeline over real files and over generated inputs.

use brc_pipeline::config::MalformedPolicy;
use brc_pipeline::error::PipelineError;
use brc_pipeline::report::{Order, write_report};
use brc_pipeline::{Pipeline, PipelineConfig, StationAggregate, StationMap};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fs::File;
use std::io::{Cursor, Write};
use tempfile::{NamedTempFile, tempdir};

const NAMES: &[&str] = &[
    "Hamburg",
    "Berlin",
    "Bulawayo",
    "Palembang",
    "St. John's",
    "Cracow",
    "Bridgetown",
    "Istanbul",
    "Roseau",
    "Conakry",
    "Ur",
    "Bāgepalli",
    "Llanfairpwllgwyngyllgogerychwyrndrobwllllantysiliogogogoch",
];

/// Random measurements plus the aggregates they should produce.
fn generate(seed: u64, lines: usize) -> (Vec<u8>, StationMap) {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut data = Vec::new();
    let mut expected = StationMap::new();

    for _ in 0..lines {
        let name = NAMES[rng.random_range(0..NAMES.len())];
        let tenths: i64 = rng.random_range(-999..=999);
        let sign = if tenths < 0 { "-" } else { "" };
        writeln!(data, "{name};{sign}{}.{}", tenths.abs() / 10, tenths.abs() % 10).unwrap();
        expected.record(name.as_bytes(), tenths);
    }

    (data, expected)
}

fn pipeline(workers: usize, block_size: usize) -> Pipeline {
    Pipeline::new(
        PipelineConfig::default()
            .with_workers(workers)
            .with_block_size(block_size),
    )
    .unwrap()
}

#[test]
fn test_aggregate_file() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(b"Hamburg;12.3\nBerlin;-5.5\nHamburg;8.0\n").unwrap();
    file.flush().unwrap();

    let result = pipeline(4, 1 << 20)
        .run(File::open(file.path()).unwrap())
        .unwrap();

    assert_eq!(
        result.stations.get(b"Hamburg"),
        Some(&StationAggregate {
            min: 80,
            max: 123,
            sum: 203,
            count: 2
        })
    );
    assert_eq!(
        result.stations.get(b"Berlin"),
        Some(&StationAggregate {
            min: -55,
            max: -55,
            sum: -55,
            count: 1
        })
    );

    let mut out = Vec::new();
    write_report(&mut out, &result.stations, Order::Sorted).unwrap();
    assert_eq!(
        String::from_utf8(out).unwrap(),
        "Berlin=-5.5/-5.5/-5.5\nHamburg=8.0/10.2/12.3\n"
    );
}

#[test]
fn test_generated_input_matches_sequential_fold() {
    let (data, expected) = generate(7, 20_000);

    let result = pipeline(4, 4096).run(Cursor::new(&data)).unwrap();

    assert_eq!(result.stations, expected);
    assert_eq!(result.stats.lines, 20_000);
    assert_eq!(result.stats.skipped, 0);
    assert_eq!(result.stats.bytes, data.len() as u64);
    assert!(result.stats.chunks > 1);
}

#[test]
fn test_chunk_boundary_independence() {
    let (data, expected) = generate(42, 5_000);

    for block_size in [7, 64, 1000, 4096, 1 << 20] {
        let result = pipeline(3, block_size).run(Cursor::new(&data)).unwrap();
        assert_eq!(result.stations, expected, "block_size={block_size}");
    }
}

#[test]
fn test_deterministic_across_worker_counts() {
    let (data, _) = generate(1234, 10_000);

    let single = pipeline(1, 2048).run(Cursor::new(&data)).unwrap();
    for workers in [2, 4, 16] {
        let many = pipeline(workers, 2048).run(Cursor::new(&data)).unwrap();
        assert_eq!(many.stations, single.stations, "workers={workers}");
        assert_eq!(many.stats.lines, single.stats.lines);
    }
}

#[test]
fn test_tiny_queues_do_not_deadlock() {
    let (data, expected) = generate(99, 3_000);

    let config = PipelineConfig::default()
        .with_workers(8)
        .with_block_size(32)
        .with_queue_capacities(1, 1);
    let result = Pipeline::new(config).unwrap().run(Cursor::new(&data)).unwrap();

    assert_eq!(result.stations, expected);
}

#[test]
fn test_malformed_lines_skipped_end_to_end() {
    let input = b"Hamburg;12.3\nBroken line\n;1.0\nBerlin;\nBerlin;1.23\nHamburg;8.0\n";
    let result = pipeline(2, 16).run(Cursor::new(input)).unwrap();

    assert_eq!(result.stats.lines, 2);
    assert_eq!(result.stats.skipped, 4);
    assert_eq!(result.stations.len(), 1);
    assert_eq!(result.stations.get(b"Hamburg").map(|s| s.count), Some(2));
}

#[test]
fn test_strict_mode_fails_run() {
    let (mut data, _) = generate(5, 1_000);
    data.extend_from_slice(b"Hamburg;abc\n");

    let config = PipelineConfig::default()
        .with_workers(3)
        .with_block_size(512)
        .with_malformed(MalformedPolicy::Fail);
    let err = Pipeline::new(config)
        .unwrap()
        .run(Cursor::new(&data))
        .unwrap_err();

    assert!(matches!(err, PipelineError::MalformedRecord { .. }));
}

#[test]
fn test_unterminated_last_record_is_counted() {
    let result = pipeline(2, 8)
        .run(Cursor::new(b"Hamburg;12.3\nHamburg;8.0"))
        .unwrap();

    assert_eq!(result.stations.get(b"Hamburg").map(|s| s.count), Some(2));
}

#[test]
fn test_report_written_to_file() {
    let dir = tempdir().unwrap();
    let (data, expected) = generate(11, 500);

    let input_path = dir.path().join("measurements.txt");
    std::fs::write(&input_path, &data).unwrap();

    let result = pipeline(2, 256)
        .run(File::open(&input_path).unwrap())
        .unwrap();

    let output_path = dir.path().join("cities.out");
    let mut out = File::create(&output_path).unwrap();
    write_report(&mut out, &result.stations, Order::Sorted).unwrap();

    let text = std::fs::read_to_string(&output_path).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), expected.len());

    let mut sorted = lines.clone();
    sorted.sort_by_key(|line| line.as_bytes());
    assert_eq!(lines, sorted);
    assert!(lines.iter().all(|line| line.matches('/').count() == 2));
}

#[test]
fn test_cli_reports_failure_once() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("missing.txt");

    let output = std::process::Command::new(env!("CARGO_BIN_EXE_brc"))
        .arg(&missing)
        .arg("-o")
        .arg(dir.path().join("cities.out"))
        .output()
        .unwrap();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert_eq!(stderr.matches("Failed to open").count(), 1, "{stderr}");
}
