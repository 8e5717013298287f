//! Test support utilities for the page cache workspace.
//!
//! This crate provides shared testing infrastructure:
//! - Temp-file fixtures with deterministic byte patterns
//! - A plain in-memory file model for oracle comparisons
//! - Property-based generators for operation sequences
//! - Custom assertion helpers
//!
//! # Example Usage
//!
//! ```no_run
//! use pagecache::{OpenOptions, PageCache};
//! use testsupport::prelude::*;
//!
//! let (_dir, path) = temp_file_with(&patterned(5000));
//! let mut cache = PageCache::new(small_config(4096, 2));
//! let handle = cache.open(&path, OpenOptions::new().read(true)).unwrap();
//! ```

pub mod assertions;
pub mod fixtures;
pub mod model;
pub mod proptest_generators;

/// Convenient re-exports for common testing patterns.
pub mod prelude {
    pub use crate::assertions::*;
    pub use crate::fixtures::*;
    pub use crate::model::*;
    pub use crate::proptest_generators::*;
}
