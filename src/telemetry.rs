use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tracing::info;

/// Tracks progress and outcome of a single scan call.
///
/// All workers of one call share the same instance through cheap clones; the
/// counters live behind `Arc` so a clone observes the same state. The caller
/// reads the counters only after the call returns.
#[derive(Debug, Clone)]
pub struct ScanTelemetry {
    bytes_scanned: Arc<AtomicU64>,
    found: Arc<AtomicBool>,
    position: Arc<AtomicU64>,
    cycles_start: Arc<AtomicU64>,
    cycles_end: Arc<AtomicU64>,
}

impl ScanTelemetry {
    /// Creates a new telemetry record with all counters at zero
    pub fn new() -> Self {
        Self {
            bytes_scanned: Arc::new(AtomicU64::new(0)),
            found: Arc::new(AtomicBool::new(false)),
            position: Arc::new(AtomicU64::new(0)),
            cycles_start: Arc::new(AtomicU64::new(0)),
            cycles_end: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Clears all counters and records the scan start timestamp
    pub fn reset_for_scan(&self) {
        self.found.store(false, Ordering::Relaxed);
        self.position.store(0, Ordering::Relaxed);
        self.bytes_scanned.store(0, Ordering::Relaxed);
        self.cycles_end.store(0, Ordering::Relaxed);
        self.cycles_start.store(read_cycle_counter(), Ordering::Relaxed);
    }

    /// Adds to the global bytes-scanned counter.
    ///
    /// Called by every worker after each sub-chunk scan, including sub-chunks
    /// abandoned due to cancellation.
    pub fn add_bytes_scanned(&self, bytes: u64) {
        self.bytes_scanned.fetch_add(bytes, Ordering::Relaxed);
    }

    /// Records the winning match offset
    pub fn record_match(&self, position: u64) {
        self.position.store(position, Ordering::Relaxed);
        self.found.store(true, Ordering::Relaxed);
    }

    /// Records the scan end timestamp
    pub fn record_end(&self) {
        self.cycles_end.store(read_cycle_counter(), Ordering::Relaxed);
    }

    /// Total bytes examined by all workers
    pub fn bytes_scanned(&self) -> u64 {
        self.bytes_scanned.load(Ordering::Relaxed)
    }

    /// Whether any worker confirmed a match
    pub fn found(&self) -> bool {
        self.found.load(Ordering::Relaxed)
    }

    /// Offset of the winning match, if any
    pub fn position(&self) -> Option<u64> {
        if self.found() {
            Some(self.position.load(Ordering::Relaxed))
        } else {
            None
        }
    }

    /// Cycles elapsed between scan start and end.
    ///
    /// Zero on platforms without a cycle counter.
    pub fn elapsed_cycles(&self) -> u64 {
        self.cycles_end
            .load(Ordering::Relaxed)
            .saturating_sub(self.cycles_start.load(Ordering::Relaxed))
    }

    /// Takes a point-in-time copy of all counters
    pub fn snapshot(&self) -> ScanStats {
        ScanStats {
            bytes_scanned: self.bytes_scanned(),
            found: self.found(),
            position: self.position(),
            elapsed_cycles: self.elapsed_cycles(),
        }
    }

    /// Scan throughput in GB/s for the given wall-clock duration.
    ///
    /// Returns `0.0` when `elapsed_ms` is not positive.
    pub fn throughput_gbps(&self, elapsed_ms: f64) -> f64 {
        if elapsed_ms <= 0.0 {
            return 0.0;
        }
        let bytes = self.bytes_scanned() as f64;
        (bytes / (elapsed_ms / 1000.0)) / 1e9
    }

    /// Renders a human-readable summary of the scan
    pub fn format_summary(&self, elapsed_ms: f64, total_len: usize) -> String {
        let bytes = self.bytes_scanned();
        let cycles = self.elapsed_cycles();
        let gbps = self.throughput_gbps(elapsed_ms);
        let pct = if total_len > 0 {
            (bytes as f64 * 100.0) / total_len as f64
        } else {
            0.0
        };

        let mut summary = format!(
            "=== RESULTS ===\n\
             Time: {:.3} ms\n\
             Scanned: {:.1} MB ({:.1}%)\n\
             Speed: {:.1} GB/s\n\
             Cycles: {}",
            elapsed_ms,
            bytes as f64 / 1e6,
            pct,
            gbps,
            cycles,
        );
        if bytes > 0 {
            summary.push_str(&format!("\nCycles/byte: {:.1}", cycles as f64 / bytes as f64));
        }
        summary
    }

    /// Logs the scan summary
    pub fn log_summary(&self, elapsed_ms: f64, total_len: usize) {
        let bytes = self.bytes_scanned();
        let pct = if total_len > 0 {
            (bytes as f64 * 100.0) / total_len as f64
        } else {
            0.0
        };
        info!(
            "Scan complete: {:.3} ms, {} bytes scanned ({:.1}%), {:.1} GB/s, found: {}",
            elapsed_ms,
            bytes,
            pct,
            self.throughput_gbps(elapsed_ms),
            self.found()
        );
    }
}

impl Default for ScanTelemetry {
    fn default() -> Self {
        Self::new()
    }
}

/// Point-in-time copy of the scan counters
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ScanStats {
    pub bytes_scanned: u64,
    pub found: bool,
    pub position: Option<u64>,
    pub elapsed_cycles: u64,
}

/// Scan throughput in GB/s; `0.0` when no telemetry was supplied or
/// `elapsed_ms` is not positive.
pub fn throughput_gbps(telemetry: Option<&ScanTelemetry>, elapsed_ms: f64) -> f64 {
    telemetry.map_or(0.0, |t| t.throughput_gbps(elapsed_ms))
}

/// Human-readable summary; empty when no telemetry was supplied.
pub fn format_summary(
    telemetry: Option<&ScanTelemetry>,
    elapsed_ms: f64,
    total_len: usize,
) -> String {
    telemetry.map_or_else(String::new, |t| t.format_summary(elapsed_ms, total_len))
}

#[cfg(target_arch = "x86_64")]
fn read_cycle_counter() -> u64 {
    let mut aux = 0u32;
    // SAFETY: __rdtscp has no preconditions on x86_64
    unsafe { std::arch::x86_64::__rdtscp(&mut aux) }
}

#[cfg(not(target_arch = "x86_64"))]
fn read_cycle_counter() -> u64 {
    0
}
