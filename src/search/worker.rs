//! Cancellable scan worker.
//!
//! Each worker owns one partition and repeatedly claims the next sub-chunk
//! by fetch-and-increment, scans it with the vector matcher, and credits the
//! bytes it examined to the shared telemetry. The first worker to verify a
//! match signals the shared stop flag; everyone else observes it at the next
//! loop boundary and winds down.

use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::trace;

use super::cancel::CancelState;
use super::matcher;
use super::partition::{Partition, SUB_CHUNK_COUNT};
use crate::affinity;
use crate::config::MatchMode;
use crate::telemetry::ScanTelemetry;

pub(crate) struct Worker<'scan> {
    index: usize,
    buffer: &'scan [u8],
    pattern: &'scan [u8],
    partition: Partition,
    cursor: AtomicUsize,
    shared: &'scan CancelState,
    telemetry: Option<&'scan ScanTelemetry>,
    match_mode: MatchMode,
    pin_core: Option<usize>,
}

impl<'scan> Worker<'scan> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        index: usize,
        buffer: &'scan [u8],
        pattern: &'scan [u8],
        partition: Partition,
        shared: &'scan CancelState,
        telemetry: Option<&'scan ScanTelemetry>,
        match_mode: MatchMode,
        pin_core: Option<usize>,
    ) -> Self {
        Self {
            index,
            buffer,
            pattern,
            partition,
            cursor: AtomicUsize::new(0),
            shared,
            telemetry,
            match_mode,
            pin_core,
        }
    }

    /// Runs the claim/scan loop to completion. Returns the absolute offset
    /// of this worker's match, if it found one.
    pub fn run(&self) -> Option<usize> {
        if let Some(core) = self.pin_core {
            affinity::try_pin_to_core(core);
        }

        loop {
            if self.cancelled() {
                trace!("worker {} cancelled", self.index);
                return None;
            }

            let claim = self.cursor.fetch_add(1, Ordering::Relaxed);
            if claim >= SUB_CHUNK_COUNT {
                trace!("worker {} exhausted its partition", self.index);
                return None;
            }
            let Some(core_range) = self.partition.sub_chunk(claim) else {
                continue;
            };

            // Extend the scan slice past the sub-chunk end so a match that
            // starts inside this chunk but straddles the boundary is still
            // fully visible. Only the core length is credited to telemetry,
            // keeping the global byte count within the buffer length.
            let core_len = core_range.len();
            let scan_end = (core_range.end + self.pattern.len() - 1).min(self.buffer.len());
            let slice = &self.buffer[core_range.start..scan_end];

            let scan = matcher::find_in_range(slice, self.pattern, &self.shared.stop);
            if let Some(telemetry) = self.telemetry {
                telemetry.add_bytes_scanned(scan.bytes_examined.min(core_len) as u64);
            }

            if let Some(relative) = scan.matched {
                let offset = core_range.start + relative;
                trace!("worker {} matched at offset {}", self.index, offset);
                match self.match_mode {
                    MatchMode::FirstFound => {
                        self.shared.report_first_found(offset);
                    }
                    MatchMode::Leftmost => {
                        self.shared.report_leftmost(offset);
                    }
                }
                return Some(offset);
            }

            if self.match_mode == MatchMode::FirstFound
                && self.shared.found.load(Ordering::Acquire)
            {
                return None;
            }
        }
    }

    fn cancelled(&self) -> bool {
        match self.match_mode {
            MatchMode::FirstFound => self.shared.stop.load(Ordering::Acquire),
            // A leftmost worker is done once no offset in its partition can
            // beat the best match reported so far.
            MatchMode::Leftmost => self.shared.leftmost_bound() <= self.partition.start as u64,
        }
    }
}
