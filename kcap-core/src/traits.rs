//! Core traits shared by the pack readers.
//!
//! The random-access and streaming readers hand out different handle types,
//! but they all present entry content through the same [`EntryRead`]
//! interface.

use crate::entry::Entry;
use crate::error::Result;
use std::io::Read;

/// Scratch size used when skipping and draining entry bytes.
pub const SKIP_BUFFER_SIZE: usize = 512;

/// Upper bound on up-front allocation; declared sizes are untrusted.
pub const MAX_PREALLOCATION: usize = 1 << 20;

/// Byte reader over the decompressed content of one entry.
///
/// `read` (from [`Read`]) returns `Ok(0)` once the entry's declared size has
/// been produced. Readers are single-consumer; they are not meant to be shared
/// between threads while in use.
pub trait EntryRead: Read {
    /// Skip up to `n` decompressed bytes, returning how many were skipped.
    ///
    /// Fewer than `n` bytes are skipped only when the entry ends first.
    fn skip(&mut self, n: u64) -> Result<u64> {
        let mut scratch = [0u8; SKIP_BUFFER_SIZE];
        let mut skipped = 0u64;
        while skipped < n {
            let want = (n - skipped).min(SKIP_BUFFER_SIZE as u64) as usize;
            let got = self.read(&mut scratch[..want])?;
            if got == 0 {
                break;
            }
            skipped += got as u64;
        }
        Ok(skipped)
    }

    /// Non-blocking hint: `1` while more data is expected, `0` at the end.
    ///
    /// This is not a byte count.
    fn available(&self) -> Result<usize>;

    /// Release the reader. Further reads fail; closing twice is a no-op.
    fn close(&mut self);

    /// Whether [`EntryRead::close`] has been called.
    fn is_closed(&self) -> bool;
}

/// An archive whose entries can be looked up and opened in any order.
pub trait ArchiveReader {
    /// Handle type returned by [`ArchiveReader::open_entry`].
    type Reader: EntryRead;

    /// All entries, in directory order.
    fn entries(&self) -> Result<&[Entry]>;

    /// Look up an entry by decoded name. The first match wins.
    fn entry(&self, name: &str) -> Result<Option<&Entry>> {
        Ok(self.entries()?.iter().find(|e| e.name == name))
    }

    /// Open an independent reader over the entry's decompressed content.
    fn open_entry(&self, entry: &Entry) -> Result<Self::Reader>;

    /// Decompress a whole entry into memory.
    fn read_entry(&self, entry: &Entry) -> Result<Vec<u8>> {
        let mut reader = self.open_entry(entry)?;
        let hint = entry.size().unwrap_or(0) as usize;
        let mut data = Vec::with_capacity(hint.min(MAX_PREALLOCATION));
        reader.read_to_end(&mut data)?;
        reader.close();
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::CompressionMethod;
    use std::io::{self, Cursor};

    struct SliceReader {
        inner: Cursor<Vec<u8>>,
        closed: bool,
    }

    impl Read for SliceReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.inner.read(buf)
        }
    }

    impl EntryRead for SliceReader {
        fn available(&self) -> Result<usize> {
            Ok(usize::from(self.inner.position() < self.inner.get_ref().len() as u64))
        }

        fn close(&mut self) {
            self.closed = true;
        }

        fn is_closed(&self) -> bool {
            self.closed
        }
    }

    /// Archive whose single entry declares far more bytes than it holds.
    struct Oversized {
        entries: Vec<Entry>,
    }

    impl ArchiveReader for Oversized {
        type Reader = SliceReader;

        fn entries(&self) -> Result<&[Entry]> {
            Ok(&self.entries)
        }

        fn open_entry(&self, _entry: &Entry) -> Result<SliceReader> {
            Ok(SliceReader {
                inner: Cursor::new(b"abc".to_vec()),
                closed: false,
            })
        }
    }

    #[test]
    fn test_read_entry_caps_preallocation() {
        let mut entry = Entry::new("big", CompressionMethod::Lzss, 16, 11);
        entry.resolve(i32::MAX as u32);
        let archive = Oversized {
            entries: vec![entry],
        };

        let entry = archive.entry("big").unwrap().unwrap();
        let data = archive.read_entry(entry).unwrap();
        assert_eq!(data, b"abc");
        assert!(data.capacity() <= MAX_PREALLOCATION);
    }

    #[test]
    fn test_default_skip() {
        let mut reader = SliceReader {
            inner: Cursor::new(vec![7u8; 1500]),
            closed: false,
        };
        assert_eq!(reader.skip(1000).unwrap(), 1000);
        assert_eq!(reader.available().unwrap(), 1);
        assert_eq!(reader.skip(1000).unwrap(), 500);
        assert_eq!(reader.available().unwrap(), 0);
        assert_eq!(reader.skip(10).unwrap(), 0);
    }
}
