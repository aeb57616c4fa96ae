//! Parsing workers
//!
//! Each worker pulls chunks from the chunk queue, parses them into a private
//! `StationMap` and hands the finished map to the reducer by value. Workers
//! never share a map, so this stage needs no locks.

use crate::byte_buffer::ByteBuffer;
use crate::config::MalformedPolicy;
use crate::error::{PipelineError, RecordError, Result};
use crate::splitter::Chunk;
use crate::station_map::StationMap;
use crate::temperature::parse_temp;
use crossbeam_channel::{Receiver, Sender};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, trace};

/// Aggregates of one chunk, on their way to the reducer
#[derive(Debug, Default)]
pub struct Partial {
    pub stations: StationMap,

    /// Records that contributed to `stations`
    pub lines: u64,

    /// Malformed records left out
    pub skipped: u64,
}

/// Location of the first malformed record when parsing is strict
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rejected {
    pub offset: usize,
    pub reason: RecordError,
}

#[inline(always)]
fn parse_record(line: &[u8]) -> std::result::Result<(&[u8], i64), RecordError> {
    let semi = line
        .byte_position(b';')
        .ok_or(RecordError::MissingDelimiter)?;

    let name = &line[..semi];
    if name.is_empty() {
        return Err(RecordError::EmptyStation);
    }

    let temp = parse_temp(&line[semi + 1..])?;
    Ok((name, temp))
}

/// Parses every record of `bytes` into a fresh partial aggregate.
///
/// A final record without a trailing newline is parsed like any other.
/// Empty lines are ignored. Other malformed records are counted and skipped,
/// or with `MalformedPolicy::Fail` the first one is returned as `Rejected`.
pub fn parse_chunk(
    bytes: &[u8],
    policy: MalformedPolicy,
) -> std::result::Result<Partial, Rejected> {
    let mut partial = Partial::default();
    let mut start = 0;

    while start < bytes.len() {
        let end = bytes[start..]
            .byte_position(b'\n')
            .map_or(bytes.len(), |pos| start + pos);

        let line = &bytes[start..end];

        if !line.is_empty() {
            match parse_record(line) {
                Ok((name, temp)) => {
                    partial.stations.record(name, temp);
                    partial.lines += 1;
                }
                Err(reason) => match policy {
                    MalformedPolicy::Skip => {
                        trace!(offset = start, %reason, "Skipping malformed record");
                        partial.skipped += 1;
                    }
                    MalformedPolicy::Fail => {
                        return Err(Rejected {
                            offset: start,
                            reason,
                        });
                    }
                },
            }
        }

        start = end + 1;
    }

    Ok(partial)
}

/// Worker loop: runs until the chunk queue is closed and drained, or until
/// `abort` is raised.
///
/// Consuming `partials` drops this worker's sender on return, so the reducer
/// sees the queue close only after every worker has left this function.
/// A rejected record raises `abort` before the error is returned.
pub fn run_worker(
    id: usize,
    chunks: Receiver<Chunk>,
    partials: Sender<Partial>,
    policy: MalformedPolicy,
    abort: &AtomicBool,
) -> Result<()> {
    debug!(worker = id, "Worker starting");

    let mut processed = 0u64;

    for chunk in chunks.iter() {
        if abort.load(Ordering::Relaxed) {
            debug!(worker = id, chunks = processed, "Worker stopping, run aborted");
            return Ok(());
        }

        let partial = match parse_chunk(&chunk.bytes, policy) {
            Ok(partial) => partial,
            Err(rejected) => {
                abort.store(true, Ordering::Relaxed);
                return Err(PipelineError::MalformedRecord {
                    chunk: chunk.seq,
                    offset: rejected.offset,
                    reason: rejected.reason,
                });
            }
        };

        trace!(
            worker = id,
            chunk = chunk.seq,
            stations = partial.stations.len(),
            lines = partial.lines,
            "Chunk parsed"
        );

        // The chunk buffer is no longer needed once its map is built.
        drop(chunk);

        partials
            .send(partial)
            .map_err(|_| PipelineError::ChannelClosed)?;
        processed += 1;
    }

    debug!(worker = id, chunks = processed, "Worker finished");
    Ok(())
}
