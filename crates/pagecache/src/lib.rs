//! User-space page cache over OS file descriptors.
//!
//! The cache presents a byte-oriented stream interface while buffering all
//! traffic in a bounded pool of page-aligned slots per open file:
//! - Open acquires a direct-I/O descriptor when the platform allows it,
//!   falling back to a plain one.
//! - Reads and writes are chunked along page boundaries through the slot
//!   pool; misses load whole pages, evictions write dirty pages back.
//! - Durability is explicit: fsync (or close) flushes dirty slots, trims
//!   direct-I/O padding, and syncs the descriptor.
//!
//! # Example
//!
//! ```no_run
//! use std::io::SeekFrom;
//!
//! use common::CacheConfig;
//! use pagecache::{OpenOptions, PageCache};
//!
//! let mut cache = PageCache::new(CacheConfig::default());
//! let handle = cache
//!     .open("/tmp/data.bin", OpenOptions::new().read(true).write(true).create(true))
//!     .unwrap();
//!
//! cache.write(handle, b"hello").unwrap();
//! cache.seek(handle, SeekFrom::Start(0)).unwrap();
//!
//! let mut buf = [0u8; 5];
//! cache.read(handle, &mut buf).unwrap();
//!
//! cache.close(handle).unwrap();
//! ```


mod file;
mod raw;
mod slot;

use std::fs;
use std::io::SeekFrom;
use std::os::unix::fs::OpenOptionsExt;
use std::path::Path;

use common::{CacheConfig, CacheError, CacheResult, Handle};

use crate::file::CachedFile;

/// Options controlling how a file is opened, mirroring
/// `std::fs::OpenOptions`.
///
/// Access rights on the resulting handle derive from `read`/`write`; a
/// read on a write-only handle (or vice versa) fails with a bad-handle
/// error.
#[derive(Clone, Debug)]
pub struct OpenOptions {
    pub(crate) read: bool,
    pub(crate) write: bool,
    create: bool,
    truncate: bool,
    mode: u32,
}

impl OpenOptions {
    pub fn new() -> Self {
        Self {
            read: false,
            write: false,
            create: false,
            truncate: false,
            mode: 0o666,
        }
    }

    pub fn read(&mut self, read: bool) -> &mut Self {
        self.read = read;
        self
    }

    pub fn write(&mut self, write: bool) -> &mut Self {
        self.write = write;
        self
    }

    pub fn create(&mut self, create: bool) -> &mut Self {
        self.create = create;
        self
    }

    pub fn truncate(&mut self, truncate: bool) -> &mut Self {
        self.truncate = truncate;
        self
    }

    /// Unix permission bits applied when the open creates the file.
    pub fn mode(&mut self, mode: u32) -> &mut Self {
        self.mode = mode;
        self
    }

    pub(crate) fn to_std(&self) -> fs::OpenOptions {
        let mut opts = fs::OpenOptions::new();
        opts.read(self.read)
            .write(self.write)
            .create(self.create)
            .truncate(self.truncate)
            .mode(self.mode);
        opts
    }
}

impl Default for OpenOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle table plus configuration: the single object a client threads
/// through its I/O.
///
/// All operations take `&mut self`, so one cache (and every handle in it)
/// belongs to one thread at a time; there is no internal locking.
pub struct PageCache {
    config: CacheConfig,
    files: Vec<Option<CachedFile>>,
}

impl PageCache {
    /// Create a cache with an empty handle table.
    ///
    /// # Panics
    ///
    /// Panics if `max_files` or `slots_per_file` is 0.
    pub fn new(config: CacheConfig) -> Self {
        assert!(config.max_files > 0, "max_files must be > 0");
        assert!(config.slots_per_file > 0, "slots_per_file must be > 0");
        let files = (0..config.max_files).map(|_| None).collect();
        Self { config, files }
    }

    /// Open `path` and install it in the first free table entry.
    ///
    /// Every open pre-allocates `slots_per_file` page buffers; the handle
    /// table itself never grows.
    ///
    /// # Errors
    ///
    /// `TableFull` when no entry is free; otherwise the underlying open or
    /// stat error.
    pub fn open(&mut self, path: impl AsRef<Path>, opts: &OpenOptions) -> CacheResult<Handle> {
        let file = CachedFile::open(path.as_ref(), opts, &self.config)?;
        let idx = self
            .files
            .iter()
            .position(Option::is_none)
            .ok_or(CacheError::TableFull)?;
        self.files[idx] = Some(file);
        Ok(Handle(idx))
    }

    /// Flush, release the table entry, and close the descriptor.
    ///
    /// Resources are released even when the flush fails; the first error
    /// is still reported.
    pub fn close(&mut self, handle: Handle) -> CacheResult<()> {
        let mut file = self
            .files
            .get_mut(handle.0)
            .and_then(Option::take)
            .ok_or(CacheError::BadHandle)?;
        let result = file.flush_all();
        drop(file);
        result
    }

    /// Read at the handle's current position. Returns the bytes moved;
    /// a short count (including 0) means end of file.
    pub fn read(&mut self, handle: Handle, buf: &mut [u8]) -> CacheResult<usize> {
        let file = self.lookup(handle)?;
        if !file.can_read {
            return Err(CacheError::BadHandle);
        }
        file.read(buf)
    }

    /// Write at the handle's current position. On success the full buffer
    /// was accepted; there are no short writes.
    pub fn write(&mut self, handle: Handle, buf: &[u8]) -> CacheResult<usize> {
        let file = self.lookup(handle)?;
        if !file.can_write {
            return Err(CacheError::BadHandle);
        }
        file.write(buf)
    }

    /// Reposition the handle. No I/O; positions past EOF are legal.
    pub fn seek(&mut self, handle: Handle, pos: SeekFrom) -> CacheResult<u64> {
        self.lookup(handle)?.seek(pos)
    }

    /// Flush all dirty slots for the handle and sync the descriptor.
    pub fn fsync(&mut self, handle: Handle) -> CacheResult<()> {
        self.lookup(handle)?.flush_all()
    }

    fn lookup(&mut self, handle: Handle) -> CacheResult<&mut CachedFile> {
        self.files
            .get_mut(handle.0)
            .and_then(Option::as_mut)
            .ok_or(CacheError::BadHandle)
    }
}

impl Default for PageCache {
    fn default() -> Self {
        Self::new(CacheConfig::default())
    }
}
