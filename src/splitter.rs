//! Chunk splitter
//!
//! Reads the input sequentially in fixed-size blocks and cuts it into
//! chunks that only contain whole lines. The bytes after the last newline of
//! a block are carried over and prefixed to the next block, so no record is
//! ever split between two chunks and every input byte lands in exactly one
//! chunk.

use crate::byte_buffer::ByteBuffer;
use crate::error::{PipelineError, Result};
use crossbeam_channel::Sender;
use std::io::{ErrorKind, Read};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, trace};

/// A run of whole lines from the input
#[derive(Debug)]
pub struct Chunk {
    /// Position of this chunk in read order, starting at 0
    pub seq: u64,

    /// Lines, each terminated by `\n` except possibly the last chunk's final
    /// record when the input does not end with a newline
    pub bytes: Vec<u8>,
}

/// Totals reported by the splitter once the input is exhausted
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SplitStats {
    pub chunks: u64,
    pub bytes: u64,
}

pub struct Splitter<R> {
    reader: R,
    block_size: usize,
    leftover: Vec<u8>,
    next_seq: u64,
    done: bool,
}

impl<R: Read> Splitter<R> {
    pub fn new(reader: R, block_size: usize) -> Self {
        Self {
            reader,
            block_size: block_size.max(1),
            leftover: Vec::new(),
            next_seq: 0,
            done: false,
        }
    }

    /// Reads blocks until one yields at least one complete line, and returns
    /// that chunk. At end of input a non-empty leftover is returned as the
    /// final chunk, then `Ok(None)`.
    pub fn next_chunk(&mut self) -> Result<Option<Chunk>> {
        while !self.done {
            let start = self.leftover.len();

            let mut buf = std::mem::take(&mut self.leftover);
            buf.resize(start + self.block_size, 0);

            let read = match self.reader.read(&mut buf[start..]) {
                Ok(read) => read,
                Err(e) if e.kind() == ErrorKind::Interrupted => {
                    buf.truncate(start);
                    self.leftover = buf;
                    continue;
                }
                Err(e) => return Err(PipelineError::Io(e)),
            };

            let filled = start + read;

            if read == 0 {
                self.done = true;
                buf.truncate(filled);

                if buf.is_empty() {
                    break;
                }

                trace!(bytes = buf.len(), "Input ends without a newline");
                return Ok(Some(self.emit(buf)));
            }

            // Only the fresh window can hold the newline: the leftover never
            // contains one.
            match buf[start..filled].last_byte_position(b'\n') {
                Some(pos) => {
                    let end = start + pos + 1;
                    self.leftover = buf[end..filled].to_vec();
                    buf.truncate(end);
                    return Ok(Some(self.emit(buf)));
                }
                None => {
                    // A line longer than the block, keep accumulating.
                    buf.truncate(filled);
                    self.leftover = buf;
                }
            }
        }

        Ok(None)
    }

    fn emit(&mut self, bytes: Vec<u8>) -> Chunk {
        let seq = self.next_seq;
        self.next_seq += 1;
        Chunk { seq, bytes }
    }

    /// Feeds every chunk into `chunks`. Blocks while the queue is full.
    /// Consuming `chunks` closes the queue on return, whatever the outcome.
    ///
    /// `abort` is checked before reading each chunk. A read error raises it
    /// so the workers stop as well.
    pub fn run(mut self, chunks: Sender<Chunk>, abort: &AtomicBool) -> Result<SplitStats> {
        let mut stats = SplitStats::default();

        loop {
            if abort.load(Ordering::Relaxed) {
                debug!(
                    chunks = stats.chunks,
                    bytes = stats.bytes,
                    "Splitter stopping, run aborted"
                );
                return Err(PipelineError::Aborted);
            }

            let chunk = match self.next_chunk() {
                Ok(Some(chunk)) => chunk,
                Ok(None) => break,
                Err(e) => {
                    abort.store(true, Ordering::Relaxed);
                    return Err(e);
                }
            };

            stats.chunks += 1;
            stats.bytes += chunk.bytes.len() as u64;

            debug!(chunk = chunk.seq, bytes = chunk.bytes.len(), "Chunk ready");

            chunks
                .send(chunk)
                .map_err(|_| PipelineError::ChannelClosed)?;
        }

        debug!(chunks = stats.chunks, bytes = stats.bytes, "Input exhausted");
        Ok(stats)
    }
}
