//! Byte sources for the decompression engine.
//!
//! The LZSS engine pulls compressed bytes one at a time. Entries read through a
//! memory-mapped region and entries buffered from a forward-only stream both
//! end up as an in-memory byte sequence, so any `Cursor` over bytes serves as a
//! source.

use std::io::Cursor;

/// A pull-based source of compressed bytes.
pub trait ByteSource {
    /// Take the next byte, or `None` once the source is exhausted.
    fn next_byte(&mut self) -> Option<u8>;

    /// Fill `buf` completely, or return `false` without a defined amount consumed.
    fn next_bytes(&mut self, buf: &mut [u8]) -> bool {
        for slot in buf.iter_mut() {
            match self.next_byte() {
                Some(b) => *slot = b,
                None => return false,
            }
        }
        true
    }

    /// Number of bytes left in the source.
    fn remaining(&self) -> usize;
}

impl<T: AsRef<[u8]>> ByteSource for Cursor<T> {
    #[inline]
    fn next_byte(&mut self) -> Option<u8> {
        let pos = usize::try_from(self.position()).ok()?;
        let byte = *self.get_ref().as_ref().get(pos)?;
        self.set_position(self.position() + 1);
        Some(byte)
    }

    fn next_bytes(&mut self, buf: &mut [u8]) -> bool {
        let Ok(pos) = usize::try_from(self.position()) else {
            return false;
        };
        let Some(end) = pos.checked_add(buf.len()) else {
            return false;
        };
        match self.get_ref().as_ref().get(pos..end) {
            Some(src) => {
                buf.copy_from_slice(src);
                self.set_position(end as u64);
                true
            }
            None => false,
        }
    }

    fn remaining(&self) -> usize {
        let len = self.get_ref().as_ref().len();
        usize::try_from(self.position())
            .map(|pos| len.saturating_sub(pos))
            .unwrap_or(0)
    }
}
