//! Byte buffer with zero-fill semantics
//!
//! The buffer behaves as if it were infinitely long and zero padded:
//!
//! - Reads past the end return 0 and never change the length.
//! - Writes past the end grow the buffer with zero bytes up to the written
//!   address before storing.
//! - Destructive range operations (delete, yank) on a range that starts past
//!   the end are no-ops that report `None` so the caller can tell the user.
//!
//! Two dirty flags are tracked separately. `modified` stays set until the
//! buffer is written back to its own file. `last_change` is what the quit
//! check looks at and is also cleared by a successful save.

use thiserror::Error;

/// Largest buffer the editor is willing to grow to
pub const MAX_LENGTH: usize = 0x7fff_ffff;

/// Errors that can occur while growing the buffer
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum BufferError {
    /// Growth would exceed `MAX_LENGTH` or the allocator refused it
    #[error("Memory overflow.")]
    MemoryOverflow,
}

/// Mutable byte sequence being edited
#[derive(Debug, Default, Clone)]
pub struct ByteBuffer {
    /// The bytes themselves; `u8` storage keeps every value in 0..=255,
    /// so no separate normalisation pass exists
    bytes: Vec<u8>,

    /// Dirty since the buffer was last written to its own file
    modified: bool,

    /// Dirty since the last save or quit check
    last_change: bool,
}

impl ByteBuffer {
    /// Create a buffer holding `bytes`, with both dirty flags clear
    pub fn new(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            modified: false,
            last_change: false,
        }
    }

    /// Number of stored bytes
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the buffer holds no bytes
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// The stored bytes, each already within 0..=255
    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }

    /// Last valid address, or 0 for an empty buffer
    pub fn last_address(&self) -> usize {
        self.bytes.len().saturating_sub(1)
    }

    /// Whether the buffer changed since it was last saved to its own file
    pub fn is_modified(&self) -> bool {
        self.modified
    }

    /// Whether the buffer changed since the last save or quit check
    pub fn has_last_change(&self) -> bool {
        self.last_change
    }

    /// Record a successful write of the whole buffer to its own file
    pub fn mark_saved(&mut self) {
        self.modified = false;
        self.last_change = false;
    }

    /// Replace the contents wholesale (re-read from disk), clearing dirty flags
    pub fn replace(&mut self, bytes: Vec<u8>) {
        self.bytes = bytes;
        self.mark_saved();
    }

    fn touch(&mut self) {
        self.modified = true;
        self.last_change = true;
    }

    /// Grow the buffer with zero bytes until it holds at least `len` bytes
    pub fn ensure_len(&mut self, len: usize) -> Result<(), BufferError> {
        if len <= self.bytes.len() {
            return Ok(());
        }
        if len > MAX_LENGTH {
            return Err(BufferError::MemoryOverflow);
        }
        self.bytes
            .try_reserve(len - self.bytes.len())
            .map_err(|_| BufferError::MemoryOverflow)?;
        self.bytes.resize(len, 0);
        Ok(())
    }

    /// Read the byte at `addr`, or 0 past the end
    pub fn read(&self, addr: usize) -> u8 {
        self.bytes.get(addr).copied().unwrap_or(0)
    }

    /// Store `value` at `addr`, zero-extending the buffer if needed
    pub fn write(&mut self, addr: usize, value: u8) -> Result<(), BufferError> {
        let needed = addr.checked_add(1).ok_or(BufferError::MemoryOverflow)?;
        self.ensure_len(needed)?;
        self.bytes[addr] = value;
        self.touch();
        Ok(())
    }

    /// Splice `values` in at `at`, shifting the tail right
    ///
    /// If `at` is past the end the gap is zero filled first.
    pub fn insert(&mut self, at: usize, values: &[u8]) -> Result<(), BufferError> {
        if at >= self.bytes.len() {
            let needed = at
                .checked_add(values.len())
                .ok_or(BufferError::MemoryOverflow)?;
            if needed > MAX_LENGTH {
                return Err(BufferError::MemoryOverflow);
            }
            self.ensure_len(at)?;
            self.bytes.extend_from_slice(values);
        } else {
            if self.bytes.len() + values.len() > MAX_LENGTH {
                return Err(BufferError::MemoryOverflow);
            }
            self.bytes
                .try_reserve(values.len())
                .map_err(|_| BufferError::MemoryOverflow)?;
            self.bytes.splice(at..at, values.iter().copied());
        }
        self.touch();
        Ok(())
    }

    /// Remove the inclusive range `[start, end]`, returning the removed bytes
    ///
    /// Returns `None` without touching anything if `end < start` or `start`
    /// is past the end. A range running past the end is clamped.
    pub fn delete(&mut self, start: usize, end: usize) -> Option<Vec<u8>> {
        if end < start || start >= self.bytes.len() {
            return None;
        }
        let stop = end.saturating_add(1).min(self.bytes.len());
        let removed: Vec<u8> = self.bytes.drain(start..stop).collect();
        self.touch();
        Some(removed)
    }

    /// Write `values` starting at `at` without shifting anything
    ///
    /// The buffer only grows as far as needed to fit the write.
    pub fn overwrite(&mut self, at: usize, values: &[u8]) -> Result<(), BufferError> {
        if values.is_empty() {
            return Ok(());
        }
        let needed = at
            .checked_add(values.len())
            .ok_or(BufferError::MemoryOverflow)?;
        self.ensure_len(needed)?;
        self.bytes[at..needed].copy_from_slice(values);
        self.touch();
        Ok(())
    }

    /// Copy out the inclusive range `[start, end]`, zero filling past the end
    pub fn slice(&self, start: usize, end: usize) -> Vec<u8> {
        if end < start {
            return Vec::new();
        }
        (start..=end).map(|addr| self.read(addr)).collect()
    }

    /// Copy the part of `[start, end]` that actually exists, for yanking
    ///
    /// Returns `None` if `end < start` or `start` is past the end.
    pub fn yank_range(&self, start: usize, end: usize) -> Option<Vec<u8>> {
        if end < start || start >= self.bytes.len() {
            return None;
        }
        let stop = end.saturating_add(1).min(self.bytes.len());
        Some(self.bytes[start..stop].to_vec())
    }
}
