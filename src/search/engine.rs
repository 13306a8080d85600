//! Scan coordinator.
//!
//! Validates inputs, plans partitions, runs one cancellable worker per
//! partition on scoped threads, joins them, and resolves the winning match.

use std::thread;
use tracing::{debug, info};

use super::cancel::CancelState;
use super::partition::{self, MAX_THREADS};
use super::worker::Worker;
use crate::affinity;
use crate::config::ScanConfig;
use crate::errors::{ScanError, ScanResult};
use crate::telemetry::ScanTelemetry;

/// Longest supported pattern in bytes.
pub const MAX_PATTERN_LEN: usize = 256;

/// Searches `buffer` for the first occurrence of `pattern` using
/// `thread_count` concurrent workers (clamped to `[1, 32]`).
///
/// Returns the byte offset of a match, or `None` when the pattern does not
/// occur. A pattern of length 0 or greater than [`MAX_PATTERN_LEN`] is a
/// usage condition, reported as `Ok(None)` without spawning any threads.
///
/// When the pattern occurs more than once, the reported offset is whichever
/// worker completed its verification first, not necessarily the lowest one;
/// use [`crate::MatchMode::Leftmost`] via [`search_with_config`] for
/// lowest-offset semantics.
///
/// # Errors
///
/// [`ScanError::StartupFailure`] if a worker thread cannot be spawned. No
/// partition is ever silently dropped.
pub fn search(
    buffer: &[u8],
    pattern: &[u8],
    thread_count: usize,
    telemetry: Option<&ScanTelemetry>,
) -> ScanResult<Option<usize>> {
    search_with_config(
        buffer,
        pattern,
        &ScanConfig::with_threads(thread_count),
        telemetry,
    )
}

/// Synonym of [`search`]. The engine implements a single algorithm
/// variant; the historical entry-point names all resolve to it.
pub fn search_hyper(
    buffer: &[u8],
    pattern: &[u8],
    thread_count: usize,
    telemetry: Option<&ScanTelemetry>,
) -> ScanResult<Option<usize>> {
    search(buffer, pattern, thread_count, telemetry)
}

/// Synonym of [`search`]. See [`search_hyper`].
pub fn search_ultimate(
    buffer: &[u8],
    pattern: &[u8],
    thread_count: usize,
    telemetry: Option<&ScanTelemetry>,
) -> ScanResult<Option<usize>> {
    search(buffer, pattern, thread_count, telemetry)
}

/// [`search`] with full control over thread count, pinning, and match mode.
pub fn search_with_config(
    buffer: &[u8],
    pattern: &[u8],
    config: &ScanConfig,
    telemetry: Option<&ScanTelemetry>,
) -> ScanResult<Option<usize>> {
    if pattern.is_empty() || pattern.len() > MAX_PATTERN_LEN {
        debug!(
            "Pattern length {} outside supported range 1-{}, reporting no match",
            pattern.len(),
            MAX_PATTERN_LEN
        );
        return Ok(None);
    }

    let threads = config.thread_count.get().clamp(1, MAX_THREADS);
    info!(
        "Starting scan: {} bytes, {}-byte pattern, {} workers, {:?} mode",
        buffer.len(),
        pattern.len(),
        threads,
        config.match_mode
    );

    if let Some(telemetry) = telemetry {
        telemetry.reset_for_scan();
    }

    let partitions = partition::plan(buffer.len(), threads);
    debug!("Partition plan: {:?}", partitions);

    let shared = CancelState::new();

    let spawn_result = thread::scope(|scope| -> ScanResult<()> {
        let mut handles = Vec::with_capacity(partitions.len());
        for (index, &part) in partitions.iter().enumerate() {
            let pin_core = config.pin_workers.then(affinity::next_core);
            let worker = Worker::new(
                index,
                buffer,
                pattern,
                part,
                &shared,
                telemetry,
                config.match_mode,
                pin_core,
            );

            let handle = thread::Builder::new()
                .name(format!("flashscan-worker-{index}"))
                .spawn_scoped(scope, move || worker.run())
                .map_err(|e| {
                    // Already-spawned workers drain at scope exit once the
                    // stop flag is raised.
                    shared.stop.store(true, std::sync::atomic::Ordering::Release);
                    ScanError::startup_failure(index, e)
                })?;
            handles.push(handle);
        }

        for handle in handles {
            // A worker records its match into the shared state before
            // returning, so the join result itself is not consulted.
            let _ = handle.join();
        }
        Ok(())
    });
    spawn_result?;

    let matched = shared.winner();

    if let Some(telemetry) = telemetry {
        if let Some(offset) = matched {
            telemetry.record_match(offset as u64);
        }
        telemetry.record_end();
    }

    match matched {
        Some(offset) => info!("Scan found match at offset {}", offset),
        None => info!("Scan exhausted buffer without a match"),
    }
    Ok(matched)
}
