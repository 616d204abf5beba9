//! Random-access pack reader.
//!
//! [`PackFile`] parses the directory once, resolves every entry's
//! decompressed size, and hands out independent [`EntryReader`]s. Each reader
//! maps only its own entry's data region.
//!
//! ## Example
//!
//! ```no_run
//! use kcap_pack::PackFile;
//! use std::io::Read;
//!
//! let pack = PackFile::open("script.PAK")?;
//! for entry in pack.iter()? {
//!     println!("{}: {:?} bytes", entry.name, entry.size());
//! }
//!
//! if let Some(mut reader) = pack.open_entry_by_name("MAIN.TXT")? {
//!     let mut text = Vec::new();
//!     reader.read_to_end(&mut text)?;
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use crate::directory::read_directory;
use kcap_core::mmap::{MapOptions, MappedRegion};
use kcap_core::{ArchiveReader, CompressionMethod, Entry, EntryRead, KcapError, Result};
use kcap_lzss::{DATA_HEADER_SIZE, LzssDecoder, header::ORIGINAL_SIZE_OFFSET};
use std::fs::File;
use std::io::{self, BufReader, Cursor, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Options for opening a [`PackFile`].
#[derive(Debug, Default, Clone, Copy)]
pub struct PackOptions {
    map: MapOptions,
}

impl PackOptions {
    /// Default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Prefault entry mappings when readers are opened.
    pub fn populate(mut self, populate: bool) -> Self {
        self.map = self.map.populate(populate);
        self
    }

    /// Open the pack at `path`.
    pub fn open(&self, path: impl AsRef<Path>) -> Result<PackFile> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let mut pack = self.open_file(file)?;
        pack.path = Some(path.to_path_buf());
        Ok(pack)
    }

    /// Open a pack from an already opened file.
    pub fn open_file(&self, file: File) -> Result<PackFile> {
        let mut entries = read_directory(&mut BufReader::new(&file))?;
        let file_len = file.metadata()?.len();
        resolve_sizes(&file, file_len, &mut entries)?;

        log::debug!("opened pack: {} entries, {} bytes", entries.len(), file_len);
        Ok(PackFile {
            path: None,
            entries,
            file_len,
            options: self.map,
            state: Arc::new(Mutex::new(ArchiveState { file: Some(file) })),
        })
    }
}

/// Fill in decompressed sizes without decoding anything.
///
/// Compressed entries store their original size in the data header at
/// `offset + 4`; every other entry's size is its compressed size.
fn resolve_sizes(mut file: &File, file_len: u64, entries: &mut [Entry]) -> Result<()> {
    let mut buf = [0u8; 4];
    for entry in entries.iter_mut() {
        let size = match entry.method {
            CompressionMethod::Lzss => {
                let offset = u64::from(entry.offset);
                if offset + DATA_HEADER_SIZE as u64 > file_len {
                    return Err(KcapError::region_out_of_bounds(
                        offset,
                        DATA_HEADER_SIZE as u64,
                        file_len,
                    ));
                }
                file.seek(SeekFrom::Start(offset + ORIGINAL_SIZE_OFFSET as u64))?;
                file.read_exact(&mut buf)?;
                let size = u32::from_le_bytes(buf);
                if size > i32::MAX as u32 {
                    return Err(KcapError::invalid_header(format!(
                        "Data header of {:?} is broken (invalid size {size})",
                        entry.name
                    )));
                }
                size
            }
            _ => entry.compressed_size,
        };
        log::trace!("resolved {:?}: {} bytes", entry.name, size);
        entry.resolve(size);
    }
    Ok(())
}

/// State shared between a pack and the readers it issued.
#[derive(Debug)]
struct ArchiveState {
    /// `None` once the pack is closed.
    file: Option<File>,
}

fn lock(state: &Mutex<ArchiveState>) -> MutexGuard<'_, ArchiveState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A pack opened for random access.
#[derive(Debug)]
pub struct PackFile {
    path: Option<PathBuf>,
    entries: Vec<Entry>,
    file_len: u64,
    options: MapOptions,
    state: Arc<Mutex<ArchiveState>>,
}

impl PackFile {
    /// Open the pack at `path` with default options.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        PackOptions::new().open(path)
    }

    /// Path the pack was opened from, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the pack has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Size of the container file in bytes.
    pub fn file_len(&self) -> u64 {
        self.file_len
    }

    /// All entries, in directory order, with resolved sizes.
    pub fn entries(&self) -> Result<&[Entry]> {
        self.ensure_open()?;
        Ok(&self.entries)
    }

    /// Iterate over entries in directory order.
    pub fn iter(&self) -> Result<std::slice::Iter<'_, Entry>> {
        Ok(self.entries()?.iter())
    }

    /// First entry named `name`.
    pub fn entry(&self, name: &str) -> Result<Option<&Entry>> {
        Ok(self.entries()?.iter().find(|e| e.name == name))
    }

    /// Open a fresh reader over an entry's content.
    ///
    /// Every call creates an independent reader with its own mapping and
    /// decoder state.
    pub fn open_entry(&self, entry: &Entry) -> Result<EntryReader> {
        let guard = lock(&self.state);
        let file = guard.file.as_ref().ok_or(KcapError::closed("PackFile"))?;

        let offset = u64::from(entry.offset);
        let body = match entry.method {
            CompressionMethod::Lzss => {
                let region = self.options.map(file, offset, entry.compressed_size as usize)?;
                Body::Lzss(Box::new(LzssDecoder::new(Cursor::new(region))?))
            }
            _ => {
                let size = entry.size().unwrap_or(entry.compressed_size);
                Body::Stored(self.options.map(file, offset, size as usize)?)
            }
        };
        drop(guard);

        log::debug!(
            "opened entry {:?} ({}, {} bytes at {:#x})",
            entry.name,
            entry.method,
            entry.compressed_size,
            entry.offset
        );
        Ok(EntryReader {
            entry: entry.clone(),
            body: Some(body),
            position: 0,
            archive: Arc::clone(&self.state),
        })
    }

    /// Open the first entry named `name`.
    pub fn open_entry_by_name(&self, name: &str) -> Result<Option<EntryReader>> {
        self.entry(name)?.map(|entry| self.open_entry(entry)).transpose()
    }

    /// Decompress a whole entry into memory.
    pub fn read_entry(&self, entry: &Entry) -> Result<Vec<u8>> {
        ArchiveReader::read_entry(self, entry)
    }

    /// Close the pack. Readers it issued fail from now on.
    ///
    /// Closing twice is a no-op.
    pub fn close(&mut self) {
        if lock(&self.state).file.take().is_some() {
            log::debug!("closed pack {:?}", self.path);
        }
    }

    /// Whether [`PackFile::close`] has been called.
    pub fn is_closed(&self) -> bool {
        lock(&self.state).file.is_none()
    }

    fn ensure_open(&self) -> Result<()> {
        if self.is_closed() {
            return Err(KcapError::closed("PackFile"));
        }
        Ok(())
    }
}

impl Drop for PackFile {
    fn drop(&mut self) {
        self.close();
    }
}

impl ArchiveReader for PackFile {
    type Reader = EntryReader;

    fn entries(&self) -> Result<&[Entry]> {
        PackFile::entries(self)
    }

    fn open_entry(&self, entry: &Entry) -> Result<EntryReader> {
        PackFile::open_entry(self, entry)
    }
}

#[derive(Debug)]
enum Body {
    Stored(MappedRegion),
    Lzss(Box<LzssDecoder<Cursor<MappedRegion>>>),
}

/// Reader over one entry of a [`PackFile`].
///
/// Dropping or closing the reader releases its mapping.
#[derive(Debug)]
pub struct EntryReader {
    entry: Entry,
    /// `None` once closed.
    body: Option<Body>,
    /// Bytes served from a stored region.
    position: usize,
    archive: Arc<Mutex<ArchiveState>>,
}

impl EntryReader {
    /// The entry being read.
    pub fn entry(&self) -> &Entry {
        &self.entry
    }

    /// Decompressed bytes returned so far.
    pub fn total_out(&self) -> u64 {
        match &self.body {
            Some(Body::Lzss(decoder)) => decoder.total_out(),
            _ => self.position as u64,
        }
    }

    /// The open body, or an error once this reader or its pack is closed.
    fn body(&mut self) -> Result<&mut Body> {
        if lock(&self.archive).file.is_none() {
            // Release the mapping as soon as the pack is gone.
            self.body = None;
            return Err(KcapError::closed("PackFile"));
        }
        self.body.as_mut().ok_or(KcapError::closed("Entry reader"))
    }

    fn read_inner(&mut self, buf: &mut [u8]) -> Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        let position = self.position;
        match self.body()? {
            Body::Lzss(decoder) => decoder.decompress(buf),
            Body::Stored(region) => {
                let rest = &region.as_slice()[position..];
                let n = rest.len().min(buf.len());
                buf[..n].copy_from_slice(&rest[..n]);
                self.position += n;
                Ok(n)
            }
        }
    }
}

impl Read for EntryReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        Ok(self.read_inner(buf)?)
    }
}

impl EntryRead for EntryReader {
    fn available(&self) -> Result<usize> {
        if lock(&self.archive).file.is_none() {
            return Err(KcapError::closed("PackFile"));
        }
        match &self.body {
            None => Err(KcapError::closed("Entry reader")),
            Some(Body::Lzss(decoder)) => decoder.available(),
            Some(Body::Stored(region)) => Ok(usize::from(self.position < region.len())),
        }
    }

    fn close(&mut self) {
        self.body = None;
    }

    fn is_closed(&self) -> bool {
        self.body.is_none()
    }
}
