//! Streaming pack reader.
//!
//! [`PackReader`] reads a pack from any forward-only [`Read`] source in a
//! single pass. Entries come out in directory order; an entry's bytes must be
//! consumed, skipped or drained with [`PackReader::close_entry`] before the
//! next one is reachable, which [`PackReader::next_entry`] does on its own.
//!
//! ## Example
//!
//! ```no_run
//! use kcap_pack::PackReader;
//! use std::fs::File;
//! use std::io::{BufReader, Read};
//!
//! let mut reader = PackReader::new(BufReader::new(File::open("script.PAK")?));
//! while let Some(entry) = reader.next_entry()? {
//!     let mut data = Vec::new();
//!     reader.read_to_end(&mut data)?;
//!     println!("{}: {} bytes", entry.name, data.len());
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use crate::directory::{HEADER_SIZE, RECORD_SIZE, read_directory};
use kcap_core::traits::{MAX_PREALLOCATION, SKIP_BUFFER_SIZE};
use kcap_core::{CompressionMethod, Entry, EntryRead, KcapError, Result};
use kcap_lzss::LzssDecoder;
use std::io::{self, Cursor, Read};

#[derive(Debug)]
enum State {
    /// Directory not read yet.
    Unopened,
    /// Between two entries, or before the first one.
    BetweenEntries,
    /// Inside an entry with bytes left.
    InEntry(Box<CurrentEntry>),
    /// Every entry has been delivered.
    Exhausted,
    Closed,
}

#[derive(Debug)]
struct CurrentEntry {
    name: String,
    size: u64,
    remaining: u64,
    body: Body,
}

#[derive(Debug)]
enum Body {
    /// Raw bytes read straight from the source.
    Stored,
    /// Compressed bytes, fully buffered.
    Lzss(LzssDecoder<Cursor<Vec<u8>>>),
}

/// Single-pass reader over a pack stream.
///
/// Reading (via [`Read`]) returns the current entry's content and `Ok(0)` at
/// its end, or when no entry is current.
#[derive(Debug)]
pub struct PackReader<R> {
    /// `None` once the reader is closed.
    reader: Option<R>,
    state: State,
    directory: Vec<Entry>,
    /// Index of the next entry to deliver.
    next: usize,
    /// Bytes consumed from `reader` so far.
    position: u64,
}

impl<R: Read> PackReader<R> {
    /// Wrap a source positioned at the start of a pack. Nothing is read yet.
    pub fn new(reader: R) -> Self {
        Self {
            reader: Some(reader),
            state: State::Unopened,
            directory: Vec::new(),
            next: 0,
            position: 0,
        }
    }

    /// The directory, read from the source on first use.
    ///
    /// Sizes of entries not yet reached are unresolved.
    pub fn directory(&mut self) -> Result<&[Entry]> {
        self.ensure_directory()?;
        Ok(&self.directory)
    }

    /// Bytes consumed from the underlying source.
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Advance to the next entry, draining whatever is left of the current one.
    ///
    /// Returns `None` once every entry has been delivered.
    pub fn next_entry(&mut self) -> Result<Option<Entry>> {
        self.close_entry()?;
        self.ensure_directory()?;
        if matches!(self.state, State::Exhausted) {
            return Ok(None);
        }

        let Some(entry) = self.directory.get(self.next).cloned() else {
            self.state = State::Exhausted;
            return Ok(None);
        };

        self.skip_to(&entry)?;
        let (size, body) = match entry.method {
            CompressionMethod::Lzss => {
                let data = self.read_compressed(&entry)?;
                let decoder = LzssDecoder::new(Cursor::new(data))?;
                (decoder.size(), Body::Lzss(decoder))
            }
            _ => (entry.compressed_size, Body::Stored),
        };

        let resolved = &mut self.directory[self.next];
        resolved.resolve(size);
        let entry = resolved.clone();
        self.next += 1;

        log::debug!("entering {:?} ({}, {} bytes)", entry.name, entry.method, size);
        self.state = if size == 0 {
            State::BetweenEntries
        } else {
            State::InEntry(Box::new(CurrentEntry {
                name: entry.name.clone(),
                size: u64::from(size),
                remaining: u64::from(size),
                body,
            }))
        };
        Ok(Some(entry))
    }

    /// Drain the rest of the current entry, if any.
    pub fn close_entry(&mut self) -> Result<()> {
        self.ensure_open()?;
        let mut scratch = [0u8; SKIP_BUFFER_SIZE];
        while matches!(self.state, State::InEntry(_)) {
            self.read_entry(&mut scratch)?;
        }
        Ok(())
    }

    /// Close the reader, dropping the source and any pending decoder.
    ///
    /// Reads fail from now on; closing twice is a no-op.
    pub fn close(&mut self) {
        if self.reader.take().is_some() {
            log::debug!("closed pack stream at {}", self.position);
        }
        self.state = State::Closed;
        self.directory = Vec::new();
    }

    /// Whether [`PackReader::close`] has been called.
    pub fn is_closed(&self) -> bool {
        matches!(self.state, State::Closed)
    }

    /// Recover the underlying source, or `None` if the reader was closed.
    pub fn into_inner(self) -> Option<R> {
        self.reader
    }

    fn ensure_open(&self) -> Result<()> {
        if self.is_closed() {
            return Err(KcapError::closed("Pack stream"));
        }
        Ok(())
    }

    fn source(&mut self) -> Result<&mut R> {
        self.reader.as_mut().ok_or_else(|| KcapError::closed("Pack stream"))
    }

    fn ensure_directory(&mut self) -> Result<()> {
        self.ensure_open()?;
        if matches!(self.state, State::Unopened) {
            self.directory = read_directory(self.source()?)?;
            self.position =
                HEADER_SIZE as u64 + RECORD_SIZE as u64 * self.directory.len() as u64;
            self.state = State::BetweenEntries;
        }
        Ok(())
    }

    /// Discard bytes up to the entry's data offset.
    fn skip_to(&mut self, entry: &Entry) -> Result<()> {
        let offset = u64::from(entry.offset);
        if offset < self.position {
            return Err(KcapError::out_of_order(&entry.name, offset, self.position));
        }

        let gap = offset - self.position;
        if gap > 0 {
            let skipped = io::copy(&mut self.source()?.take(gap), &mut io::sink())?;
            self.position += skipped;
            if skipped < gap {
                return Err(KcapError::corrupted(
                    self.position,
                    format!("Stream ended before the data of {:?}", entry.name),
                ));
            }
            log::trace!("skipped {gap} bytes before {:?}", entry.name);
        }
        Ok(())
    }

    /// Buffer an entry's compressed data region.
    fn read_compressed(&mut self, entry: &Entry) -> Result<Vec<u8>> {
        let len = u64::from(entry.compressed_size);
        let mut data = Vec::with_capacity((entry.compressed_size as usize).min(MAX_PREALLOCATION));
        let read = self.source()?.take(len).read_to_end(&mut data)? as u64;
        self.position += read;
        if read < len {
            return Err(KcapError::truncated(len, read));
        }
        Ok(data)
    }

    fn read_entry(&mut self, buf: &mut [u8]) -> Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        let current = match &mut self.state {
            State::Closed => return Err(KcapError::closed("Pack stream")),
            State::InEntry(current) => current,
            _ => return Ok(0),
        };

        let want = buf.len().min(usize::try_from(current.remaining).unwrap_or(usize::MAX));
        let n = match &mut current.body {
            Body::Stored => {
                let reader = self
                    .reader
                    .as_mut()
                    .ok_or_else(|| KcapError::closed("Pack stream"))?;
                let n = reader.read(&mut buf[..want])?;
                self.position += n as u64;
                n
            }
            Body::Lzss(decoder) => decoder.decompress(&mut buf[..want])?,
        };
        if n == 0 {
            log::debug!("{:?} ended early", current.name);
            return Err(KcapError::truncated(current.size, current.size - current.remaining));
        }

        current.remaining -= n as u64;
        if current.remaining == 0 {
            self.state = State::BetweenEntries;
        }
        Ok(n)
    }
}

impl<R: Read> Read for PackReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        Ok(self.read_entry(buf)?)
    }
}

impl<R: Read> EntryRead for PackReader<R> {
    fn available(&self) -> Result<usize> {
        self.ensure_open()?;
        Ok(usize::from(matches!(self.state, State::InEntry(_))))
    }

    fn close(&mut self) {
        PackReader::close(self);
    }

    fn is_closed(&self) -> bool {
        PackReader::is_closed(self)
    }
}
