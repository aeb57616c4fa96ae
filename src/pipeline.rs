//! Pipeline orchestrator
//!
//! Wires the splitter, the parsing workers and the reducer together:
//!
//! ```text
//!  reader ──▶ Splitter ──▶ chunk queue ──▶ Worker 0..N ──▶ partial queue ──▶ Reducer
//!            (1 thread)    (bounded)       (N threads)      (bounded)       (caller)
//! ```
//!
//! Both queues are `crossbeam_channel::bounded` and are the only state the
//! threads share. Shutdown is driven by sender disconnection:
//!
//! 1. The splitter owns the only chunk sender and drops it when the input is
//!    exhausted (or on a read error).
//! 2. Each worker leaves its loop once the chunk queue is closed and drained.
//! 3. Every worker owns one clone of the partial sender and the orchestrator
//!    keeps none, so the partial queue closes exactly when the last worker
//!    has exited.
//! 4. The reducer then drains what is left and returns.
//!
//! A failing stage raises a shared abort flag. The splitter stops reading and
//! the remaining workers stop parsing, so little input is consumed after the
//! first error.

use crate::config::PipelineConfig;
use crate::error::{PipelineError, Result, WorkerError};
use crate::reducer::{Reduced, reduce};
use crate::splitter::{Chunk, SplitStats, Splitter};
use crate::station_map::StationMap;
use crate::worker::{Partial, run_worker};
use crossbeam_channel::bounded;
use std::any::Any;
use std::io::Read;
use std::sync::atomic::AtomicBool;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, error, info};

/// Counters for a finished run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunStats {
    /// Chunks produced by the splitter
    pub chunks: u64,

    /// Input bytes consumed
    pub bytes: u64,

    /// Records aggregated
    pub lines: u64,

    /// Malformed records skipped
    pub skipped: u64,

    /// Parsing workers used
    pub workers: usize,

    pub elapsed: Duration,
}

/// Result of a completed run
#[derive(Debug)]
pub struct Aggregation {
    pub stations: StationMap,
    pub stats: RunStats,
}

/// A configured split-parse-reduce pipeline. Each call to `run` sets up its
/// own queues and threads and tears them down before returning.
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Aggregates every record of `reader`.
    ///
    /// Fails on the first read error, on a malformed record under
    /// `MalformedPolicy::Fail`, or if a thread panics. No partial result is
    /// returned on failure.
    pub fn run<R: Read + Send>(&self, reader: R) -> Result<Aggregation> {
        let start = Instant::now();

        info!(
            workers = self.config.workers,
            block_size = self.config.block_size,
            "Starting aggregation"
        );

        let abort = AtomicBool::new(false);
        let (split, reduced) = thread::scope(|scope| self.run_scoped(scope, reader, &abort))?;

        let stats = RunStats {
            chunks: split.chunks,
            bytes: split.bytes,
            lines: reduced.lines,
            skipped: reduced.skipped,
            workers: self.config.workers,
            elapsed: start.elapsed(),
        };

        info!(
            stations = reduced.stations.len(),
            lines = stats.lines,
            skipped = stats.skipped,
            chunks = stats.chunks,
            bytes = stats.bytes,
            elapsed_ms = stats.elapsed.as_millis() as u64,
            "Aggregation completed"
        );

        Ok(Aggregation {
            stations: reduced.stations,
            stats,
        })
    }

    fn run_scoped<'scope, 'env, R: Read + Send + 'scope>(
        &'env self,
        scope: &'scope thread::Scope<'scope, 'env>,
        reader: R,
        abort: &'scope AtomicBool,
    ) -> Result<(SplitStats, Reduced)> {
        let config = &self.config;

        let (chunk_tx, chunk_rx) = bounded::<Chunk>(config.chunk_queue_capacity);
        let (partial_tx, partial_rx) = bounded::<Partial>(config.partial_queue_capacity);

        let mut workers = Vec::with_capacity(config.workers);
        for id in 0..config.workers {
            let chunks = chunk_rx.clone();
            let partials = partial_tx.clone();
            let policy = config.malformed;

            let handle = thread::Builder::new()
                .name(format!("brc-worker-{id}"))
                .spawn_scoped(scope, move || run_worker(id, chunks, partials, policy, abort))
                .map_err(|source| WorkerError::SpawnFailed { id, source })?;

            workers.push((id, handle));
        }

        drop(chunk_rx);
        drop(partial_tx);

        let splitter = Splitter::new(reader, config.block_size);
        let split_handle = thread::Builder::new()
            .name("brc-splitter".to_string())
            .spawn_scoped(scope, move || splitter.run(chunk_tx, abort))
            .map_err(|source| WorkerError::SpawnFailed {
                id: config.workers,
                source,
            })?;

        let reduced = reduce(partial_rx);
        debug!(partials = reduced.partials, "Reducer drained");

        let mut failure: Option<PipelineError> = None;

        for (id, handle) in workers {
            let result = handle.join().unwrap_or_else(|payload| {
                Err(WorkerError::Panicked {
                    id,
                    message: panic_message(payload.as_ref()),
                }
                .into())
            });

            if let Err(e) = result {
                error!(worker = id, error = %e, "Worker failed");
                failure.get_or_insert(e);
            }
        }

        let split = split_handle.join().unwrap_or_else(|payload| {
            Err(WorkerError::SplitterPanicked {
                message: panic_message(payload.as_ref()),
            }
            .into())
        });

        // A worker failure is the root cause when the splitter only saw the
        // chunk queue close underneath it or the abort flag go up.
        match (failure, split) {
            (Some(e), _) => Err(e),
            (None, Err(e)) => {
                error!(error = %e, "Splitter failed");
                Err(e)
            }
            (None, Ok(split)) => Ok((split, reduced)),
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
