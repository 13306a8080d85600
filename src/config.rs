use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;

/// Which occurrence a scan reports when the pattern occurs more than once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    /// Report whichever worker completes its verification first.
    ///
    /// This is the throughput-oriented default: the reported offset depends
    /// on scheduling, not on byte order, when duplicates exist across
    /// partitions.
    #[default]
    FirstFound,
    /// Report the lowest byte offset. Workers keep scanning until every
    /// partition that could hold an earlier occurrence has reported.
    Leftmost,
}

/// Configuration for a scan call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Number of worker threads, clamped to `[1, 32]` at scan time.
    /// Defaults to the number of CPU cores.
    #[serde(default = "default_thread_count")]
    pub thread_count: NonZeroUsize,

    /// Whether to pin workers to cores round-robin. Pinning is a scheduling
    /// hint; failure to pin never fails the scan.
    #[serde(default = "default_pin_workers")]
    pub pin_workers: bool,

    /// Which occurrence to report when the pattern occurs more than once
    #[serde(default)]
    pub match_mode: MatchMode,
}

fn default_thread_count() -> NonZeroUsize {
    NonZeroUsize::new(num_cpus::get()).unwrap_or(NonZeroUsize::MIN)
}

fn default_pin_workers() -> bool {
    true
}

impl ScanConfig {
    /// Creates a config with the given thread count and all other defaults
    pub fn with_threads(thread_count: usize) -> Self {
        Self {
            thread_count: NonZeroUsize::new(thread_count.max(1))
                .unwrap_or(NonZeroUsize::MIN),
            ..Self::default()
        }
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            thread_count: default_thread_count(),
            pin_workers: default_pin_workers(),
            match_mode: MatchMode::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let config = ScanConfig::default();
        assert_eq!(config.thread_count.get(), num_cpus::get());
        assert!(config.pin_workers);
        assert_eq!(config.match_mode, MatchMode::FirstFound);
    }

    #[test]
    fn test_with_threads_clamps_zero() {
        let config = ScanConfig::with_threads(0);
        assert_eq!(config.thread_count.get(), 1);

        let config = ScanConfig::with_threads(8);
        assert_eq!(config.thread_count.get(), 8);
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let config: ScanConfig = serde_json::from_str(r#"{"thread_count": 4}"#).unwrap();
        assert_eq!(config.thread_count.get(), 4);
        assert!(config.pin_workers);
        assert_eq!(config.match_mode, MatchMode::FirstFound);

        let config: ScanConfig =
            serde_json::from_str(r#"{"thread_count": 2, "match_mode": "leftmost"}"#).unwrap();
        assert_eq!(config.match_mode, MatchMode::Leftmost);
    }
}
