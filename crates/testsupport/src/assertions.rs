//! Custom assertion helpers for testing.

use std::fs;
use std::path::Path;

use pretty_assertions::assert_eq;

/// Assert that a file on disk contains exactly `expected`.
///
/// # Example
///
/// ```no_run
/// use testsupport::prelude::*;
///
/// assert_file_bytes("/tmp/cache.dat", b"hello");
/// ```
pub fn assert_file_bytes(path: impl AsRef<Path>, expected: &[u8]) {
    let actual = fs::read(path.as_ref())
        .unwrap_or_else(|e| panic!("read {}: {e}", path.as_ref().display()));
    assert_eq!(
        actual.len(),
        expected.len(),
        "file length mismatch for {}",
        path.as_ref().display()
    );
    assert_eq!(actual, expected.to_vec());
}

/// Assert that a file's length matches without comparing contents.
pub fn assert_file_len(path: impl AsRef<Path>, expected: u64) {
    let len = fs::metadata(path.as_ref())
        .unwrap_or_else(|e| panic!("stat {}: {e}", path.as_ref().display()))
        .len();
    assert_eq!(len, expected);
}
