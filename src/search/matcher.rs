//! Vectorized single-pattern matcher.
//!
//! Scans one contiguous byte range for one pattern. On x86_64 with AVX2 the
//! range is processed in 128-byte groups of four 32-byte lanes: every byte is
//! compared against a broadcast of the pattern's first byte, ANDed with a
//! shifted comparison against the second byte, and the surviving candidate
//! positions are verified with a prefix-word compare followed by a full
//! equality check. Candidates are walked by lowest-set-bit extraction, never
//! byte-by-byte branching.
//!
//! The matcher holds no shared state; the only synchronization it touches is
//! a periodic relaxed load of the caller's stop flag.

use std::sync::atomic::{AtomicBool, Ordering};

/// Bytes covered by one group of four 32-byte lanes.
#[cfg(target_arch = "x86_64")]
const GROUP_BYTES: usize = 128;

/// Lane-groups processed between stop-flag polls (one poll per KiB).
#[cfg(target_arch = "x86_64")]
const GROUPS_PER_STOP_CHECK: usize = 8;

/// How far ahead of the current group to issue a cache prefetch.
#[cfg(target_arch = "x86_64")]
const PREFETCH_DISTANCE: usize = 1024;

/// Bytes scanned between stop-flag polls in the scalar paths.
const SCALAR_STOP_INTERVAL: usize = 4096;

/// Outcome of scanning one range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct RangeScan {
    /// Offset of the first verified match within the range, if any.
    pub matched: Option<usize>,
    /// Bytes actually examined: the match offset on success, the full range
    /// length on exhaustion, or the position reached when the stop flag was
    /// observed.
    pub bytes_examined: usize,
}

impl RangeScan {
    fn not_found(bytes_examined: usize) -> Self {
        Self {
            matched: None,
            bytes_examined,
        }
    }

    fn found(offset: usize) -> Self {
        Self {
            matched: Some(offset),
            bytes_examined: offset,
        }
    }
}

/// Finds the first occurrence of `needle` in `haystack`, polling `stop`
/// periodically so a cancelled scan abandons the range within a bounded
/// number of lane-groups.
pub(crate) fn find_in_range(haystack: &[u8], needle: &[u8], stop: &AtomicBool) -> RangeScan {
    if needle.is_empty() || needle.len() > haystack.len() {
        return RangeScan::not_found(0);
    }
    if needle.len() == 1 {
        return find_byte(haystack, needle[0], stop);
    }

    #[cfg(target_arch = "x86_64")]
    {
        if is_x86_feature_detected!("avx2") {
            // SAFETY: AVX2 support verified at runtime
            return unsafe { find_avx2(haystack, needle, stop) };
        }
    }

    find_scalar(haystack, needle, 0, stop)
}

/// Single-byte scan, equivalent to a linear character search.
fn find_byte(haystack: &[u8], byte: u8, stop: &AtomicBool) -> RangeScan {
    let mut i = 0;
    while i < haystack.len() {
        if i % SCALAR_STOP_INTERVAL == 0 && i > 0 && stop.load(Ordering::Relaxed) {
            return RangeScan::not_found(i);
        }
        let block_end = (i + SCALAR_STOP_INTERVAL).min(haystack.len());
        if let Some(pos) = haystack[i..block_end].iter().position(|&b| b == byte) {
            return RangeScan::found(i + pos);
        }
        i = block_end;
    }
    RangeScan::not_found(haystack.len())
}

/// Byte-wise scan from `start`, shared by the non-AVX2 fallback and the
/// vector path's tail. Caller guarantees `needle.len() <= haystack.len()`
/// and `needle` is non-empty.
fn find_scalar(haystack: &[u8], needle: &[u8], start: usize, stop: &AtomicBool) -> RangeScan {
    let nlen = needle.len();
    let first = needle[0];
    let last_start = haystack.len() - nlen;

    let mut since_check = 0;
    let mut i = start;
    while i <= last_start {
        since_check += 1;
        if since_check >= SCALAR_STOP_INTERVAL {
            if stop.load(Ordering::Relaxed) {
                return RangeScan::not_found(i);
            }
            since_check = 0;
        }
        if haystack[i] == first && &haystack[i..i + nlen] == needle {
            return RangeScan::found(i);
        }
        i += 1;
    }
    RangeScan::not_found(haystack.len())
}

#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "avx2")]
unsafe fn find_avx2(haystack: &[u8], needle: &[u8], stop: &AtomicBool) -> RangeScan {
    use std::arch::x86_64::*;

    let len = haystack.len();
    let nlen = needle.len();
    let ptr = haystack.as_ptr();

    let first = _mm256_set1_epi8(needle[0] as i8);
    let second = _mm256_set1_epi8(needle[1] as i8);

    // Machine-word prefix of the pattern, zero-padded for short patterns.
    // Candidate prefixes are padded the same way, so plain equality works.
    let prefix_len = nlen.min(4);
    let mut prefix = [0u8; 4];
    prefix[..prefix_len].copy_from_slice(&needle[..prefix_len]);
    let prefix_word = u32::from_le_bytes(prefix);

    let mut i = 0;
    let mut groups = 0;

    // The shifted second-byte loads read one byte past the group, so the
    // main loop needs GROUP_BYTES + 1 bytes of headroom; the remainder goes
    // to the scalar tail.
    while i + GROUP_BYTES + 1 <= len {
        groups += 1;
        if groups >= GROUPS_PER_STOP_CHECK {
            if stop.load(Ordering::Relaxed) {
                return RangeScan::not_found(i);
            }
            groups = 0;
        }

        if i + PREFETCH_DISTANCE < len {
            _mm_prefetch::<_MM_HINT_T0>(ptr.add(i + PREFETCH_DISTANCE) as *const i8);
        }

        for lane in 0..4 {
            let base = i + lane * 32;
            let hay = _mm256_loadu_si256(ptr.add(base) as *const __m256i);
            let ahead = _mm256_loadu_si256(ptr.add(base + 1) as *const __m256i);

            let candidates = _mm256_and_si256(
                _mm256_cmpeq_epi8(hay, first),
                _mm256_cmpeq_epi8(ahead, second),
            );
            let mut mask = _mm256_movemask_epi8(candidates) as u32;

            while mask != 0 {
                let idx = base + mask.trailing_zeros() as usize;
                mask &= mask - 1;

                if idx + nlen > len {
                    continue;
                }
                let mut cand = [0u8; 4];
                cand[..prefix_len].copy_from_slice(&haystack[idx..idx + prefix_len]);
                if u32::from_le_bytes(cand) == prefix_word
                    && &haystack[idx..idx + nlen] == needle
                {
                    return RangeScan::found(idx);
                }
            }
        }

        i += GROUP_BYTES;
    }

    find_scalar(haystack, needle, i, stop)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unset() -> AtomicBool {
        AtomicBool::new(false)
    }

    #[test]
    fn test_empty_needle_examines_nothing() {
        let scan = find_in_range(b"abcdef", b"", &unset());
        assert_eq!(scan, RangeScan::not_found(0));
    }

    #[test]
    fn test_needle_longer_than_range() {
        let scan = find_in_range(b"ab", b"abc", &unset());
        assert_eq!(scan, RangeScan::not_found(0));
    }

    #[test]
    fn test_single_byte_needle() {
        let scan = find_in_range(b"aaabaaa", b"b", &unset());
        assert_eq!(scan.matched, Some(3));

        let scan = find_in_range(b"aaaaaaa", b"b", &unset());
        assert_eq!(scan, RangeScan::not_found(7));
    }

    #[test]
    fn test_match_at_start_and_end() {
        let hay = b"needle in a haystack ends with needle";
        assert_eq!(find_in_range(hay, b"needle in", &unset()).matched, Some(0));

        let scan = find_in_range(hay, b"with needle", &unset());
        assert_eq!(scan.matched, Some(hay.len() - 11));
    }

    #[test]
    fn test_match_in_large_buffer() {
        // Large enough to exercise the full lane-group loop plus the tail.
        let mut hay = vec![b'x'; 100_000];
        hay[70_001..70_008].copy_from_slice(b"pattern");

        let scan = find_in_range(&hay, b"pattern", &unset());
        assert_eq!(scan.matched, Some(70_001));
        assert_eq!(scan.bytes_examined, 70_001);
    }

    #[test]
    fn test_match_in_tail_region() {
        let mut hay = vec![b'x'; 4096 + 100];
        let at = hay.len() - 5;
        hay[at..at + 3].copy_from_slice(b"abc");

        let scan = find_in_range(&hay, b"abc", &unset());
        assert_eq!(scan.matched, Some(at));
    }

    #[test]
    fn test_two_byte_filter_false_positives() {
        // Candidates share the first two bytes but differ later; the
        // verification step must skip them without losing the real match.
        let mut hay = b"ababababababab".repeat(100);
        hay.extend_from_slice(b"abacus");

        let scan = find_in_range(&hay, b"abacus", &unset());
        assert_eq!(scan.matched, Some(1400));
    }

    #[test]
    fn test_exhaustive_scan_counts_full_range() {
        let hay = vec![b'a'; 50_000];
        let scan = find_in_range(&hay, b"ZZZ", &unset());
        assert_eq!(scan, RangeScan::not_found(50_000));
    }

    #[test]
    fn test_preset_stop_abandons_early() {
        let stop = AtomicBool::new(true);
        let hay = vec![b'a'; 1_000_000];

        let scan = find_in_range(&hay, b"ZZZ", &stop);
        assert_eq!(scan.matched, None);
        // Polling happens within a bounded number of groups (vector path)
        // or bytes (scalar path), so the scan gives up long before the end.
        assert!(scan.bytes_examined <= SCALAR_STOP_INTERVAL * 2);
    }

    #[test]
    fn test_preset_stop_single_byte() {
        let stop = AtomicBool::new(true);
        let hay = vec![b'a'; 1_000_000];

        let scan = find_in_range(&hay, b"Z", &stop);
        assert_eq!(scan.matched, None);
        assert!(scan.bytes_examined < hay.len());
    }

    #[test]
    fn test_long_pattern() {
        let needle: Vec<u8> = (0..=255u8).collect();
        let mut hay = vec![b'q'; 10_000];
        hay[5000..5256].copy_from_slice(&needle);

        let scan = find_in_range(&hay, &needle, &unset());
        assert_eq!(scan.matched, Some(5000));
    }

    #[test]
    fn test_matches_scalar_reference() {
        // Pseudo-random buffer over a tiny alphabet so matches are common.
        let mut state = 0x2545F491u64;
        let hay: Vec<u8> = (0..10_000)
            .map(|_| {
                state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
                b'a' + ((state >> 33) % 4) as u8
            })
            .collect();

        for needle in [&b"ab"[..], b"abc", b"dcba", b"aaaa", b"abcd"] {
            let expected = hay.windows(needle.len()).position(|w| w == needle);
            let scan = find_in_range(&hay, needle, &unset());
            assert_eq!(scan.matched, expected, "needle {:?}", needle);
        }
    }
}
