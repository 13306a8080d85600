//! flashscan: throughput-oriented substring search over in-memory byte
//! buffers.
//!
//! Finds one pattern (1–256 bytes) in a caller-owned buffer — typically a
//! memory-mapped file — using an AVX2-vectorized matcher and up to 32
//! concurrent workers with cooperative early-exit cancellation. The engine
//! never copies the buffer; a match is reported as a byte offset valid for
//! as long as the caller keeps the buffer alive.
//!
//! ```
//! use flashscan::{search, ScanTelemetry};
//!
//! let buffer = b"some large corpus with a needle in it".to_vec();
//! let telemetry = ScanTelemetry::new();
//!
//! let offset = search(&buffer, b"needle", 4, Some(&telemetry)).unwrap();
//! assert_eq!(offset, Some(25));
//! assert!(telemetry.found());
//! ```
//!
//! By default, when the pattern occurs more than once the reported offset is
//! first-found, not leftmost: whichever worker verifies a match first wins,
//! and the rest are cancelled. [`MatchMode::Leftmost`] opts into
//! lowest-offset semantics at the cost of less aggressive cancellation.

pub mod buffer;
pub mod config;
pub mod errors;
pub mod search;
pub mod telemetry;

mod affinity;

pub use buffer::map_file;
pub use config::{MatchMode, ScanConfig};
pub use errors::{ScanError, ScanResult};
pub use search::{
    search, search_hyper, search_ultimate, search_with_config, MAX_PATTERN_LEN, MAX_THREADS,
};
pub use telemetry::{ScanStats, ScanTelemetry};
