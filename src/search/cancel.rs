//! Shared cancellation state for one scan call.
//!
//! Created fresh per call and discarded when the call returns. The boolean
//! flags are lock-free; the first-result slot is the only lock on the hot
//! path and is held just long enough to compare-and-set an offset.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;

pub(crate) struct CancelState {
    /// Workers must cease scanning.
    pub stop: AtomicBool,
    /// A match exists somewhere.
    pub found: AtomicBool,
    /// First-found mode: offset captured by whichever worker verified first.
    first_match: Mutex<Option<usize>>,
    /// Leftmost mode: lowest offset reported so far.
    best: AtomicU64,
}

impl CancelState {
    pub fn new() -> Self {
        Self {
            stop: AtomicBool::new(false),
            found: AtomicBool::new(false),
            first_match: Mutex::new(None),
            best: AtomicU64::new(u64::MAX),
        }
    }

    /// Records a first-found match: signals all workers to stop and captures
    /// `offset` only if no worker got there first. Returns whether this
    /// worker's offset won the slot.
    pub fn report_first_found(&self, offset: usize) -> bool {
        self.stop.store(true, Ordering::Release);
        self.found.store(true, Ordering::Release);

        let mut slot = self
            .first_match
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if slot.is_none() {
            *slot = Some(offset);
            true
        } else {
            false
        }
    }

    /// Records a leftmost-mode match: keeps the lowest offset and leaves
    /// `stop` unset so lower partitions keep scanning.
    pub fn report_leftmost(&self, offset: usize) {
        self.found.store(true, Ordering::Release);
        self.best.fetch_min(offset as u64, Ordering::AcqRel);
    }

    /// Lowest offset any partition could still improve on.
    pub fn leftmost_bound(&self) -> u64 {
        self.best.load(Ordering::Acquire)
    }

    /// Resolves the winning offset after all workers have joined.
    pub fn winner(&self) -> Option<usize> {
        let slot = self
            .first_match
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(offset) = *slot {
            return Some(offset);
        }
        match self.best.load(Ordering::Acquire) {
            u64::MAX => None,
            best => Some(best as usize),
        }
    }
}
