//! Memory-mapped entry regions.
//!
//! Each entry handle of the random-access reader maps exactly the byte range
//! of its own data region, read-only. The mapping is owned by the handle and
//! released when the handle is closed or dropped.
//!
//! # Example
//!
//! ```no_run
//! use kcap_core::mmap::MappedRegion;
//! use std::fs::File;
//!
//! let file = File::open("script.PAK")?;
//! let region = MappedRegion::map(&file, 16, 44)?;
//! assert_eq!(region.len(), 44);
//! # Ok::<(), kcap_core::error::KcapError>(())
//! ```
//!
//! # Safety
//!
//! Memory-mapped files can be dangerous if the underlying file is modified by
//! another process while mapped. Only read-only mappings are created, and the
//! region is bounds-checked against the file length before mapping.

use crate::error::{KcapError, Result};
use memmap2::Mmap;
use std::fs::File;

/// A read-only mapping of one byte range of a file.
#[derive(Debug)]
pub struct MappedRegion {
    /// `None` for empty regions, which cannot be mapped.
    mmap: Option<Mmap>,
    /// Offset of the region within the file.
    offset: u64,
}

impl MappedRegion {
    /// Map `len` bytes of `file` starting at `offset`, with default options.
    ///
    /// # Errors
    ///
    /// Returns [`KcapError::RegionOutOfBounds`] if the range does not fit in
    /// the file, or [`KcapError::Io`] if mapping fails.
    pub fn map(file: &File, offset: u64, len: usize) -> Result<Self> {
        MapOptions::new().map(file, offset, len)
    }

    /// A region with no bytes.
    pub fn empty(offset: u64) -> Self {
        Self { mmap: None, offset }
    }

    /// Length of the region in bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.mmap.as_ref().map_or(0, |m| m.len())
    }

    /// Whether the region holds no bytes.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Offset of the region within its file.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// The mapped bytes.
    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        self.mmap.as_deref().unwrap_or(&[])
    }
}

impl AsRef<[u8]> for MappedRegion {
    fn as_ref(&self) -> &[u8] {
        self.as_slice()
    }
}

/// Options for mapping regions.
///
/// ```no_run
/// use kcap_core::mmap::MapOptions;
/// use std::fs::File;
///
/// let file = File::open("script.PAK")?;
/// let region = MapOptions::new().populate(true).map(&file, 0, 16)?;
/// # Ok::<(), kcap_core::error::KcapError>(())
/// ```
#[derive(Debug, Default, Clone, Copy)]
pub struct MapOptions {
    /// Whether to populate (prefault) the memory mapping.
    populate: bool,
}

impl MapOptions {
    /// Create a new `MapOptions` with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether to populate the memory mapping.
    ///
    /// When enabled, the operating system reads the region into memory up
    /// front, which pays off for entries that are read entirely.
    pub fn populate(mut self, populate: bool) -> Self {
        self.populate = populate;
        self
    }

    /// Map `len` bytes of `file` starting at `offset`.
    pub fn map(&self, file: &File, offset: u64, len: usize) -> Result<MappedRegion> {
        let file_len = file.metadata()?.len();
        let end = offset.checked_add(len as u64);
        if end.is_none_or(|end| end > file_len) {
            return Err(KcapError::region_out_of_bounds(offset, len as u64, file_len));
        }
        if len == 0 {
            return Ok(MappedRegion::empty(offset));
        }

        let mut options = memmap2::MmapOptions::new();
        options.offset(offset).len(len);
        if self.populate {
            options.populate();
        }
        // SAFETY: Read-only mapping of a range checked against the file length;
        // the caller is responsible for the file not being truncated while mapped.
        let mmap = unsafe { options.map(file)? };

        Ok(MappedRegion {
            mmap: Some(mmap),
            offset,
        })
    }
}
