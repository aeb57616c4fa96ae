//! Error types for brc_pipeline
//!
//! - `PipelineError` is what a run returns to the caller
//! - `ConfigError` covers rejected pipeline settings
//! - `WorkerError` covers parser threads that died
//! - `TemperatureError` is the outcome of a value field that is not fixed point

use thiserror::Error;

/// Top-level error type for an aggregation run
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Reading the input failed. Never retried.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Worker/concurrency errors
    #[error("Worker error: {0}")]
    Worker(#[from] WorkerError),

    /// A record could not be parsed and the run is configured to fail on it
    #[error("Malformed record in chunk {chunk} at byte {offset}: {reason}")]
    MalformedRecord {
        chunk: u64,
        offset: usize,
        reason: RecordError,
    },

    /// Channel closed unexpectedly
    #[error("Channel closed unexpectedly")]
    ChannelClosed,

    /// Another stage failed and the run was stopped early
    #[error("Run aborted after an earlier failure")]
    Aborted,
}

/// Configuration errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid worker count {count}: must be between 1 and {max}")]
    InvalidWorkerCount { count: usize, max: usize },

    #[error("Invalid {queue} queue capacity {capacity}: must be at least 1")]
    InvalidQueueCapacity { queue: &'static str, capacity: usize },

    #[error("Invalid block size {size}: must be between 1 and {max} bytes")]
    InvalidBlockSize { size: usize, max: usize },

    #[error("Invalid size '{value}': {reason}")]
    InvalidSize { value: String, reason: String },
}

/// Worker thread errors
#[derive(Error, Debug)]
pub enum WorkerError {
    #[error("Worker {id} panicked: {message}")]
    Panicked { id: usize, message: String },

    #[error("Splitter thread panicked: {message}")]
    SplitterPanicked { message: String },

    #[error("Failed to spawn worker {id}: {source}")]
    SpawnFailed {
        id: usize,
        #[source]
        source: std::io::Error,
    },
}

/// Why a single record was rejected
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordError {
    #[error("missing ';' delimiter")]
    MissingDelimiter,

    #[error("empty station name")]
    EmptyStation,

    #[error("invalid temperature: {0}")]
    Temperature(#[from] TemperatureError),
}

/// A value field that is not `-?[0-9]+\.[0-9]`
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemperatureError {
    #[error("empty value field")]
    Empty,

    #[error("expected -?digits.digit")]
    Malformed,

    #[error("value out of range")]
    Overflow,
}

/// Result type alias for PipelineError
pub type Result<T> = std::result::Result<T, PipelineError>;
