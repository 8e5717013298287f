//! A plain in-memory file used as an oracle for cache behavior.

use std::cmp;
use std::io::SeekFrom;

/// Byte-for-byte model of what a file should contain after a sequence of
/// stream operations: reads stop at end of file, writes grow it, seeking
/// past the end leaves a zero-filled gap once written over.
#[derive(Clone, Debug, Default)]
pub struct MirrorFile {
    data: Vec<u8>,
    position: u64,
}

impl MirrorFile {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_bytes(data: Vec<u8>) -> Self {
        Self { data, position: 0 }
    }

    /// Read up to `count` bytes at the current position.
    pub fn read(&mut self, count: usize) -> Vec<u8> {
        let start = cmp::min(self.position as usize, self.data.len());
        let end = cmp::min(start + count, self.data.len());
        let out = self.data[start..end].to_vec();
        self.position = end as u64;
        out
    }

    /// Write `bytes` at the current position, zero-filling any gap left by
    /// an earlier seek past the end.
    pub fn write(&mut self, bytes: &[u8]) {
        let start = self.position as usize;
        let end = start + bytes.len();
        if self.data.len() < end {
            self.data.resize(end, 0);
        }
        self.data[start..end].copy_from_slice(bytes);
        self.position = end as u64;
    }

    /// Reposition; `None` when the target would be negative.
    pub fn seek(&mut self, pos: SeekFrom) -> Option<u64> {
        let target = match pos {
            SeekFrom::Start(offset) => i128::from(offset),
            SeekFrom::Current(delta) => i128::from(self.position) + i128::from(delta),
            SeekFrom::End(delta) => i128::from(self.data.len() as u64) + i128::from(delta),
        };
        let target = u64::try_from(target).ok()?;
        self.position = target;
        Some(target)
    }

    pub fn position(&self) -> u64 {
        self.position
    }

    pub fn len(&self) -> u64 {
        self.data.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn bytes(&self) -> &[u8] {
        &self.data
    }
}
