//! Page slots and their aligned backing buffers.

use std::alloc::{self, Layout};
use std::ptr::NonNull;
use std::slice;

/// Heap buffer of exactly one page, aligned to the page size.
///
/// Direct-I/O transfers require the memory side of a pread/pwrite to be
/// aligned as strictly as the file side, so the buffer is carved straight
/// from the global allocator with an explicit layout instead of a `Vec`.
pub(crate) struct PageBuf {
    ptr: NonNull<u8>,
    layout: Layout,
}

impl PageBuf {
    /// Allocate a zeroed page buffer. `page_size` must be a nonzero power
    /// of two (enforced at file open).
    pub(crate) fn new(page_size: usize) -> Self {
        let layout = Layout::from_size_align(page_size, page_size)
            .expect("page size must be a nonzero power of two");
        let raw = unsafe { alloc::alloc_zeroed(layout) };
        let ptr = NonNull::new(raw).unwrap_or_else(|| alloc::handle_alloc_error(layout));
        Self { ptr, layout }
    }

    pub(crate) fn as_slice(&self) -> &[u8] {
        unsafe { slice::from_raw_parts(self.ptr.as_ptr(), self.layout.size()) }
    }

    pub(crate) fn as_mut_slice(&mut self) -> &mut [u8] {
        unsafe { slice::from_raw_parts_mut(self.ptr.as_ptr(), self.layout.size()) }
    }
}

impl Drop for PageBuf {
    fn drop(&mut self) {
        unsafe { alloc::dealloc(self.ptr.as_ptr(), self.layout) }
    }
}

// PageBuf exclusively owns its allocation.
unsafe impl Send for PageBuf {}
unsafe impl Sync for PageBuf {}

/// One cache slot: an aligned buffer plus the bookkeeping that ties it to
/// an aligned region of the underlying file.
pub(crate) struct PageSlot {
    pub(crate) data: PageBuf,
    /// File offset of `data[0]`; meaningful only while `in_use`.
    pub(crate) base: u64,
    /// Prefix of `data` mirroring real file content; the tail stays zeroed.
    pub(crate) valid: usize,
    pub(crate) dirty: bool,
    pub(crate) in_use: bool,
    pub(crate) last_access: u64,
}

impl PageSlot {
    pub(crate) fn new(page_size: usize) -> Self {
        Self {
            data: PageBuf::new(page_size),
            base: 0,
            valid: 0,
            dirty: false,
            in_use: false,
            last_access: 0,
        }
    }

    /// Rebind the slot to a new base, clearing all prior state.
    pub(crate) fn claim(&mut self, base: u64) {
        self.in_use = true;
        self.base = base;
        self.valid = 0;
        self.dirty = false;
        self.last_access = 0;
    }
}
