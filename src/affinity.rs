//! Best-effort CPU pinning for scan workers.
//!
//! Workers are pinned round-robin across available cores as a scheduling
//! hint. Pinning is only supported on Linux; everywhere else (and on any
//! failure) the worker simply runs unpinned.

use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::debug;

static NEXT_CORE: AtomicUsize = AtomicUsize::new(0);

/// Returns the next core index in the global round-robin rotation.
pub(crate) fn next_core() -> usize {
    let cores = num_cpus::get().max(1);
    NEXT_CORE.fetch_add(1, Ordering::Relaxed) % cores
}

/// Pins the calling thread to `core`, logging failure instead of
/// propagating it. Returns whether the pin took effect.
pub(crate) fn try_pin_to_core(core: usize) -> bool {
    match pin_current_thread(core) {
        Ok(()) => true,
        Err(e) => {
            debug!("Failed to pin worker to core {}: {}", core, e);
            false
        }
    }
}

#[cfg(target_os = "linux")]
fn pin_current_thread(core: usize) -> io::Result<()> {
    // cpu_set_t is a fixed-size bitmask; indices past it are undefined
    // behavior in CPU_SET.
    let capacity = std::mem::size_of::<libc::cpu_set_t>() * 8;
    if core >= capacity {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("core index {} exceeds cpu_set_t capacity {}", core, capacity),
        ));
    }

    // SAFETY: zeroed cpu_set_t is valid and core is within the bitmask
    unsafe {
        let mut set: libc::cpu_set_t = std::mem::zeroed();
        libc::CPU_ZERO(&mut set);
        libc::CPU_SET(core, &mut set);

        let rc = libc::pthread_setaffinity_np(
            libc::pthread_self(),
            std::mem::size_of::<libc::cpu_set_t>(),
            &set as *const _,
        );
        if rc != 0 {
            return Err(io::Error::from_raw_os_error(rc));
        }
    }
    Ok(())
}

#[cfg(not(target_os = "linux"))]
fn pin_current_thread(_core: usize) -> io::Result<()> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        "thread affinity is not supported on this platform",
    ))
}
