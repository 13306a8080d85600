//! Partition planning.
//!
//! The buffer is split into one contiguous partition per worker, and each
//! partition into a fixed number of sub-chunks that bound how long a worker
//! runs between cancellation checks. Sub-chunks are not a work-stealing
//! unit: a worker only ever claims chunks within its own partition.

use std::ops::Range;

/// Upper bound on concurrent workers per scan call.
pub const MAX_THREADS: usize = 32;

/// Fixed number of sub-chunks per partition.
pub const SUB_CHUNK_COUNT: usize = 16;

/// Floor on sub-chunk size; small partitions end up with fewer, larger
/// chunks and the excess indices are skipped.
pub const MIN_SUB_CHUNK_BYTES: usize = 1024 * 1024;

/// A half-open byte range `[start, end)` assigned to exactly one worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Partition {
    pub start: usize,
    pub end: usize,
}

impl Partition {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// Returns the byte range of sub-chunk `index`, clamped to the
    /// partition end, or `None` when the chunk falls entirely outside the
    /// partition (small partitions) or the index is out of range.
    pub fn sub_chunk(&self, index: usize) -> Option<Range<usize>> {
        if index >= SUB_CHUNK_COUNT {
            return None;
        }
        let chunk = (self.len() / SUB_CHUNK_COUNT).max(MIN_SUB_CHUNK_BYTES);
        let start = self.start + index * chunk;
        if start >= self.end {
            return None;
        }
        // The last sub-chunk absorbs the division remainder so the sixteen
        // chunks cover the partition exactly.
        let end = if index == SUB_CHUNK_COUNT - 1 {
            self.end
        } else {
            (start + chunk).min(self.end)
        };
        Some(start..end)
    }
}

/// Splits `buffer_len` bytes across `thread_count` contiguous partitions.
///
/// The thread count is clamped to `[1, MAX_THREADS]`. Partitions cover the
/// buffer exactly once; the last partition absorbs the integer-division
/// remainder.
pub fn plan(buffer_len: usize, thread_count: usize) -> Vec<Partition> {
    let threads = thread_count.clamp(1, MAX_THREADS);
    let stride = buffer_len / threads;

    (0..threads)
        .map(|i| Partition {
            start: i * stride,
            end: if i == threads - 1 {
                buffer_len
            } else {
                (i + 1) * stride
            },
        })
        .collect()
}
