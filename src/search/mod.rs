//! Concurrent vectorized substring search.
//!
//! The coordinator in [`engine`] partitions the buffer across workers, each
//! of which drives the vector matcher over sub-chunks of its partition and
//! participates in the shared early-exit cancellation protocol.

pub mod engine;
pub mod partition;

mod cancel;
mod matcher;
mod worker;

pub use engine::{search, search_hyper, search_ultimate, search_with_config, MAX_PATTERN_LEN};
pub use partition::{Partition, MAX_THREADS, SUB_CHUNK_COUNT};
