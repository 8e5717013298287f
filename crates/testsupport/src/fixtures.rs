//! Common test fixtures: temp files and cache configurations.

use std::fs;
use std::path::PathBuf;

use common::CacheConfig;
use tempfile::TempDir;

/// Deterministic byte pattern of the given length.
///
/// # Example
///
/// ```
/// use testsupport::prelude::*;
///
/// let bytes = patterned(300);
/// assert_eq!(bytes[0], 0);
/// assert_eq!(bytes[256], 0);
/// assert_eq!(bytes[299], 43);
/// ```
pub fn patterned(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 256) as u8).collect()
}

/// Create a temp directory holding one file with the given contents.
///
/// The directory guard must stay alive for the duration of the test.
pub fn temp_file_with(bytes: &[u8]) -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("cache.dat");
    fs::write(&path, bytes).expect("write fixture file");
    (dir, path)
}

/// Temp directory plus the path of a file that does not exist yet.
pub fn temp_path() -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("cache.dat");
    (dir, path)
}

/// A cache configuration sized for tests.
///
/// Direct I/O is disabled so assertions on intermediate on-disk state and
/// small page sizes behave identically on every filesystem.
pub fn small_config(page_size: usize, slots: usize) -> CacheConfig {
    CacheConfig::builder()
        .max_files(8)
        .slots_per_file(slots)
        .page_size(page_size)
        .direct(false)
        .build()
}
