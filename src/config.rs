//! Configuration types for brc_pipeline
//!
//! This module defines:
//! - CLI argument parsing using clap derive macros
//! - Pipeline configuration with validation

use crate::error::ConfigError;
use clap::Parser;
use std::path::PathBuf;

/// Maximum reasonable worker count
const MAX_WORKERS: usize = 1024;

/// Largest block the splitter will allocate per read
const MAX_BLOCK_SIZE: usize = 1 << 30;

pub const DEFAULT_BLOCK_SIZE: usize = 64 * 1024 * 1024;
pub const DEFAULT_CHUNK_QUEUE_CAPACITY: usize = 15;
pub const DEFAULT_PARTIAL_QUEUE_CAPACITY: usize = 10;

/// Per-station min/mean/max over a `<station>;<temperature>` file
#[derive(Parser, Debug, Clone)]
#[command(
    name = "brc",
    version,
    about = "Per-station min/mean/max over a <station>;<temperature> file",
    after_help = "EXAMPLES:\n    \
        brc measurements.txt -o -\n    \
        brc measurements.txt -w 8 --block-size 16M\n    \
        brc measurements.txt --strict --cpuprofile cpu.svg"
)]
pub struct CliArgs {
    /// Input file, one `<station>;<temperature>` record per line
    #[arg(value_name = "FILE", default_value = "measurements.txt")]
    pub input: PathBuf,

    /// Output file, `-` for stdout
    #[arg(short, long, default_value = "cities.out", value_name = "FILE")]
    pub output: PathBuf,

    /// Number of parsing worker threads
    #[arg(short = 'w', long, default_value_t = default_workers(), value_name = "NUM")]
    pub workers: usize,

    /// Bytes read per block (accepts K, M and G suffixes)
    #[arg(long, default_value = "64M", value_parser = parse_size, value_name = "SIZE")]
    pub block_size: usize,

    /// Chunks buffered between the reader and the workers
    #[arg(long, default_value_t = DEFAULT_CHUNK_QUEUE_CAPACITY, value_name = "NUM")]
    pub chunk_queue: usize,

    /// Partial results buffered between the workers and the reducer
    #[arg(long, default_value_t = DEFAULT_PARTIAL_QUEUE_CAPACITY, value_name = "NUM")]
    pub partial_queue: usize,

    /// Fail on the first malformed record instead of skipping it
    #[arg(long)]
    pub strict: bool,

    /// Write stations in map order instead of sorting by name
    #[arg(long)]
    pub unsorted: bool,

    /// Write a CPU flamegraph (SVG) to this file
    #[arg(long, value_name = "FILE")]
    pub cpuprofile: Option<PathBuf>,

    /// Verbose output (per-worker and per-chunk logging)
    #[arg(short = 'v', long)]
    pub verbose: bool,
}

/// One worker per core, leaving a core for the reader.
pub fn default_workers() -> usize {
    num_cpus::get().saturating_sub(1).max(1)
}

/// Parses a byte count such as `65536`, `512K`, `64M` or `1G`.
pub fn parse_size(value: &str) -> Result<usize, ConfigError> {
    let trimmed = value.trim();
    let (digits, shift) = match trimmed.char_indices().last() {
        Some((i, 'k' | 'K')) => (&trimmed[..i], 10),
        Some((i, 'm' | 'M')) => (&trimmed[..i], 20),
        Some((i, 'g' | 'G')) => (&trimmed[..i], 30),
        _ => (trimmed, 0),
    };

    let base: usize = digits.parse().map_err(|e: std::num::ParseIntError| {
        ConfigError::InvalidSize {
            value: value.to_string(),
            reason: e.to_string(),
        }
    })?;

    base.checked_mul(1 << shift)
        .ok_or_else(|| ConfigError::InvalidSize {
            value: value.to_string(),
            reason: "too large".to_string(),
        })
}

/// What a worker does with a record it cannot parse
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MalformedPolicy {
    /// Leave the record out of every aggregate and count it as skipped
    #[default]
    Skip,
    /// Abort the run with `PipelineError::MalformedRecord`
    Fail,
}

/// Settings for one aggregation run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Bytes requested per read from the input
    pub block_size: usize,

    /// Capacity of the splitter → worker queue
    pub chunk_queue_capacity: usize,

    /// Capacity of the worker → reducer queue
    pub partial_queue_capacity: usize,

    /// Number of parsing workers
    pub workers: usize,

    pub malformed: MalformedPolicy,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            block_size: DEFAULT_BLOCK_SIZE,
            chunk_queue_capacity: DEFAULT_CHUNK_QUEUE_CAPACITY,
            partial_queue_capacity: DEFAULT_PARTIAL_QUEUE_CAPACITY,
            workers: default_workers(),
            malformed: MalformedPolicy::Skip,
        }
    }
}

impl PipelineConfig {
    pub fn from_args(args: &CliArgs) -> Result<Self, ConfigError> {
        let config = Self {
            block_size: args.block_size,
            chunk_queue_capacity: args.chunk_queue,
            partial_queue_capacity: args.partial_queue,
            workers: args.workers,
            malformed: if args.strict {
                MalformedPolicy::Fail
            } else {
                MalformedPolicy::Skip
            },
        };

        config.validate()?;
        Ok(config)
    }

    pub fn with_block_size(mut self, block_size: usize) -> Self {
        self.block_size = block_size;
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn with_queue_capacities(mut self, chunks: usize, partials: usize) -> Self {
        self.chunk_queue_capacity = chunks;
        self.partial_queue_capacity = partials;
        self
    }

    pub fn with_malformed(mut self, malformed: MalformedPolicy) -> Self {
        self.malformed = malformed;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.workers == 0 || self.workers > MAX_WORKERS {
            return Err(ConfigError::InvalidWorkerCount {
                count: self.workers,
                max: MAX_WORKERS,
            });
        }

        if self.block_size == 0 || self.block_size > MAX_BLOCK_SIZE {
            return Err(ConfigError::InvalidBlockSize {
                size: self.block_size,
                max: MAX_BLOCK_SIZE,
            });
        }

        if self.chunk_queue_capacity == 0 {
            return Err(ConfigError::InvalidQueueCapacity {
                queue: "chunk",
                capacity: self.chunk_queue_capacity,
            });
        }

        if self.partial_queue_capacity == 0 {
            return Err(ConfigError::InvalidQueueCapacity {
                queue: "partial",
                capacity: self.partial_queue_capacity,
            });
        }

        Ok(())
    }
}
