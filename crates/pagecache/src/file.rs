//! Per-open file state and the page manager.
//!
//! A `CachedFile` owns the underlying descriptor and a fixed pool of page
//! slots. All byte movement between the caller and the descriptor funnels
//! through `prepare`, which resolves an aligned base offset to a slot,
//! reading, evicting, and writing back as needed.

use std::cmp;
use std::fs::File;
use std::io::SeekFrom;
use std::os::unix::fs::FileExt;
use std::path::Path;

use common::{CacheConfig, CacheError, CacheResult};

use crate::raw;
use crate::slot::PageSlot;
use crate::OpenOptions;

fn align_down(value: u64, align: usize) -> u64 {
    value - value % align as u64
}

pub(crate) struct CachedFile {
    file: File,
    pub(crate) can_read: bool,
    pub(crate) can_write: bool,
    direct_io: bool,
    position: u64,
    file_size: u64,
    page_size: usize,
    access_clock: u64,
    slots: Vec<PageSlot>,
}

impl CachedFile {
    /// Open `path` and pre-allocate the slot pool.
    ///
    /// The slot buffers for the whole lifetime of the open are allocated
    /// here; the read/write paths never allocate.
    pub(crate) fn open(path: &Path, opts: &OpenOptions, config: &CacheConfig) -> CacheResult<Self> {
        let page_size = config.page_size.unwrap_or_else(raw::os_page_size);
        assert!(
            page_size.is_power_of_two(),
            "page_size must be a nonzero power of two"
        );

        let (file, direct_io) = raw::open_raw(path, opts, config.direct)?;
        let file_size = file.metadata()?.len();
        let slots = (0..config.slots_per_file)
            .map(|_| PageSlot::new(page_size))
            .collect();

        Ok(Self {
            file,
            can_read: opts.read,
            can_write: opts.write,
            direct_io,
            position: 0,
            file_size,
            page_size,
            access_clock: 0,
            slots,
        })
    }

    /// Resolve `base` to a slot index, loading the page on a miss.
    ///
    /// Miss handling prefers a free slot; with the pool exhausted, the
    /// victim is flushed before reuse so no dirty bytes are lost.
    fn prepare(&mut self, base: u64) -> CacheResult<usize> {
        debug_assert_eq!(base % self.page_size as u64, 0);

        if let Some(idx) = self
            .slots
            .iter()
            .position(|slot| slot.in_use && slot.base == base)
        {
            return Ok(idx);
        }

        let idx = match self.slots.iter().position(|slot| !slot.in_use) {
            Some(idx) => idx,
            None => {
                let victim = self.pick_victim();
                self.flush_slot(victim)?;
                victim
            }
        };

        self.slots[idx].claim(base);

        let slot = &mut self.slots[idx];
        let done = match self.file.read_at(slot.data.as_mut_slice(), base) {
            Ok(done) => done,
            Err(err) => {
                slot.in_use = false;
                return Err(err.into());
            }
        };

        raw::advise_dontneed(&self.file, base, self.page_size as u64);

        // A short count is a partial final page (or 0 at EOF); the tail is
        // zeroed so writes overlapping it start from defined bytes.
        let slot = &mut self.slots[idx];
        slot.valid = done;
        slot.data.as_mut_slice()[done..].fill(0);

        Ok(idx)
    }

    /// Choose the in-use slot with the largest access stamp.
    ///
    /// Evicting the most recent touch is the inherited policy of this
    /// cache; ties keep the first slot found.
    fn pick_victim(&self) -> usize {
        let mut victim: Option<(usize, u64)> = None;
        for (idx, slot) in self.slots.iter().enumerate() {
            if !slot.in_use {
                continue;
            }
            match victim {
                Some((_, stamp)) if slot.last_access <= stamp => {}
                _ => victim = Some((idx, slot.last_access)),
            }
        }
        victim.map(|(idx, _)| idx).expect("slot pool is empty")
    }

    /// Write a dirty slot's live bytes back to the descriptor.
    ///
    /// Direct-I/O descriptors take whole-page writes; when that pads past
    /// the logical end of file, the file is truncated straight back.
    fn flush_slot(&mut self, idx: usize) -> CacheResult<()> {
        let slot = &mut self.slots[idx];
        if !slot.in_use || !slot.dirty {
            return Ok(());
        }

        // The logical file shrank past this page; its bytes are moot.
        if self.file_size <= slot.base {
            slot.dirty = false;
            return Ok(());
        }

        let len = cmp::min((self.file_size - slot.base) as usize, self.page_size);
        if len == 0 {
            slot.dirty = false;
            return Ok(());
        }

        let write_len = if self.direct_io { self.page_size } else { len };
        let written = self.file.write_at(&slot.data.as_slice()[..write_len], slot.base)?;
        if written != write_len {
            return Err(CacheError::ShortWrite {
                expected: write_len,
                written,
            });
        }

        raw::advise_dontneed(&self.file, slot.base, write_len as u64);

        if write_len > len {
            self.file.set_len(self.file_size)?;
        }

        self.slots[idx].dirty = false;
        Ok(())
    }

    /// Flush every dirty slot, trim any direct-I/O padding, and fsync.
    pub(crate) fn flush_all(&mut self) -> CacheResult<()> {
        let mut had_dirty = false;
        for idx in 0..self.slots.len() {
            if self.slots[idx].in_use && self.slots[idx].dirty {
                had_dirty = true;
                self.flush_slot(idx)?;
            }
        }

        if had_dirty && self.can_write {
            self.file.set_len(self.file_size)?;
        }

        self.file.sync_all()?;
        Ok(())
    }

    /// Copy up to `buf.len()` bytes out of the cache at the current
    /// position. A short count means end of file, never an error.
    pub(crate) fn read(&mut self, buf: &mut [u8]) -> CacheResult<usize> {
        if buf.is_empty() {
            return Ok(0);
        }

        let mut total = 0;
        while total < buf.len() {
            if self.position >= self.file_size {
                break;
            }

            let base = align_down(self.position, self.page_size);
            let page_off = (self.position - base) as usize;
            let in_page = self.page_size - page_off;

            let available = cmp::min((self.file_size - self.position) as usize, in_page);
            let mut chunk = cmp::min(buf.len() - total, available);
            if chunk == 0 {
                break;
            }

            let idx = self.prepare(base)?;
            self.access_clock += 1;

            let slot = &mut self.slots[idx];
            slot.last_access = self.access_clock;
            debug_assert!(slot.valid <= self.page_size);

            // The cached page may be a partial final page; never read past
            // its valid prefix.
            if slot.valid < page_off + chunk {
                chunk = slot.valid.saturating_sub(page_off);
            }
            if chunk == 0 {
                break;
            }

            buf[total..total + chunk]
                .copy_from_slice(&slot.data.as_slice()[page_off..page_off + chunk]);
            total += chunk;
            self.position += chunk as u64;
        }

        Ok(total)
    }

    /// Copy `buf` into the cache at the current position, dirtying and
    /// growing as needed. Always moves the full buffer or fails.
    pub(crate) fn write(&mut self, buf: &[u8]) -> CacheResult<usize> {
        if buf.is_empty() {
            return Ok(0);
        }

        let mut total = 0;
        while total < buf.len() {
            let base = align_down(self.position, self.page_size);
            let page_off = (self.position - base) as usize;
            let chunk = cmp::min(buf.len() - total, self.page_size - page_off);

            let idx = self.prepare(base)?;
            self.access_clock += 1;

            let slot = &mut self.slots[idx];
            slot.data.as_mut_slice()[page_off..page_off + chunk]
                .copy_from_slice(&buf[total..total + chunk]);
            slot.valid = cmp::min(self.page_size, cmp::max(slot.valid, page_off + chunk));
            slot.dirty = true;
            slot.last_access = self.access_clock;

            total += chunk;
            self.position += chunk as u64;

            let new_end = base + cmp::max(slot.valid, page_off + chunk) as u64;
            if new_end > self.file_size {
                self.file_size = new_end;
            }
        }

        Ok(buf.len())
    }

    /// Reposition without touching the cache or the descriptor.
    ///
    /// Positions beyond the end of file are legal: a later read sees EOF,
    /// a later write grows the file over a zero-filled gap.
    pub(crate) fn seek(&mut self, pos: SeekFrom) -> CacheResult<u64> {
        let target = match pos {
            SeekFrom::Start(offset) => i128::from(offset),
            SeekFrom::Current(delta) => i128::from(self.position) + i128::from(delta),
            SeekFrom::End(delta) => i128::from(self.file_size) + i128::from(delta),
        };
        let target = u64::try_from(target).map_err(|_| CacheError::InvalidSeek)?;
        self.position = target;
        Ok(target)
    }
}
