
use std::io;
use thiserror::Error;

/// Page size used when the OS query is unavailable or nonsensical.
pub const FALLBACK_PAGE_SIZE: usize = 4096;

/// Opaque identifier for one open file within a `PageCache`.
/// Examples:
/// - `let first = Handle(0);`
/// - `let last = Handle(127); // with the default 128-entry table`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Handle(pub usize);

/// Canonical error type shared across the cache subsystems.
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("bad handle")]
    BadHandle,
    #[error("handle table full")]
    TableFull,
    #[error("seek resolves to a negative offset")]
    InvalidSeek,
    #[error("short write-back: wrote {written} of {expected} bytes")]
    ShortWrite { expected: usize, written: usize },
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Result alias that carries a `CacheError`.
pub type CacheResult<T> = Result<T, CacheError>;

/// Runtime configuration for the page cache.
///
/// # Example
/// ```
/// use common::CacheConfig;
///
/// let config = CacheConfig::builder()
///     .max_files(16)
///     .slots_per_file(8)
///     .page_size(4096)
///     .direct(false)
///     .build();
/// ```
#[derive(Clone, Debug, bon::Builder)]
pub struct CacheConfig {
    /// Number of entries in the handle table.
    #[builder(default = 128)]
    pub max_files: usize,
    /// Number of page slots pre-allocated per open file.
    #[builder(default = 64)]
    pub slots_per_file: usize,
    /// Page granularity override; `None` queries the OS at open.
    /// Must be a nonzero power of two when set.
    pub page_size: Option<usize>,
    /// Controls whether open attempts an OS-level cache-bypass hint.
    #[builder(default = true)]
    pub direct: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_files: 128,
            slots_per_file: 64,
            page_size: None,
            direct: true,
        }
    }
}

/// Convenient re-exports for downstream crates.
pub mod prelude {
    pub use crate::{CacheConfig, CacheError, CacheResult, Handle};
}
