//! # KCAP Pack
//!
//! Readers for KCAP pack archives.
//!
//! A pack is a 16-byte header, a directory of 44-byte records and the entry
//! data regions. Entries are either stored raw or compressed with LZSS (see
//! [`kcap_lzss`]).
//!
//! Two readers are provided:
//!
//! - [`PackFile`]: random access over a file. Entry sizes are resolved when
//!   the pack is opened and every entry can be opened any number of times.
//! - [`PackReader`]: single pass over any [`std::io::Read`] source, entries
//!   in directory order.
//!
//! ## Example
//!
//! ```no_run
//! use kcap_pack::{PackFile, PackReader};
//! use std::fs::File;
//! use std::io::{BufReader, Read};
//!
//! // Random access
//! let pack = PackFile::open("script.PAK")?;
//! if let Some(entry) = pack.entry("MAIN.TXT")? {
//!     let data = pack.read_entry(entry)?;
//!     assert_eq!(Some(data.len() as u32), entry.size());
//! }
//!
//! // Streaming
//! let mut reader = PackReader::new(BufReader::new(File::open("script.PAK")?));
//! while let Some(entry) = reader.next_entry()? {
//!     let mut data = Vec::new();
//!     reader.read_to_end(&mut data)?;
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod directory;
pub mod file;
pub mod stream;

// Re-exports
pub use directory::{PackHeader, SIGNATURE, decode_name, read_directory};
pub use file::{EntryReader, PackFile, PackOptions};
pub use stream::PackReader;

pub use kcap_core::{
    ArchiveReader, CompressionMethod, Entry, EntryRead, EntrySize, KcapError, Result,
};
