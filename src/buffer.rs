use memmap2::Mmap;
use std::fs::File;
use std::path::Path;
use tracing::debug;

use crate::errors::{ScanError, ScanResult};

/// Maps a file into memory as a read-only byte buffer.
///
/// The engine itself consumes any `&[u8]`; this is a convenience for the
/// common case of scanning a large on-disk corpus without reading it into
/// heap memory. The mapping must outlive every scan over it, which the
/// borrow checker enforces.
pub fn map_file(path: impl AsRef<Path>) -> ScanResult<Mmap> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| ScanError::from_open(path, e))?;

    // SAFETY: the mapping is read-only; mutation of the underlying file by
    // another process while mapped is undefined, which is the contract the
    // caller accepts by memory-mapping.
    let mmap = unsafe { Mmap::map(&file)? };
    debug!("Mapped {} bytes from {}", mmap.len(), path.display());
    Ok(mmap)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_map_file_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("corpus.bin");
        let mut file = File::create(&path).unwrap();
        file.write_all(b"hello mapped world").unwrap();

        let mmap = map_file(&path).unwrap();
        assert_eq!(&mmap[..], b"hello mapped world");
    }

    #[test]
    fn test_map_missing_file() {
        let dir = tempdir().unwrap();
        let result = map_file(dir.path().join("missing.bin"));
        assert!(matches!(result, Err(ScanError::FileNotFound(_))));
    }
}
