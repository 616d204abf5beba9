//! # KCAP Core
//!
//! Core components for reading KCAP pack archives.
//!
//! This crate provides the building blocks shared by the codec and container
//! layers:
//!
//! - [`bytes`]: Fixed-width little-endian field extraction
//! - [`ringbuffer`]: Position-addressed sliding window for LZSS decompression
//! - [`source`]: Pull-based byte sources feeding the decompressor
//! - [`mmap`]: Read-only memory-mapped entry regions
//! - [`traits`]: Entry reader and archive reader traits
//! - [`entry`]: Archive entry metadata
//! - [`error`]: Error types
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │ L4: CLI (kcap-cli)                                      │
//! │     list / extract / test / info                        │
//! ├─────────────────────────────────────────────────────────┤
//! │ L3: Container (kcap-pack)                               │
//! │     directory parser, PackFile, PackReader              │
//! ├─────────────────────────────────────────────────────────┤
//! │ L2: Codec (kcap-lzss)                                   │
//! │     data header, LZSS decompression engine              │
//! ├─────────────────────────────────────────────────────────┤
//! │ L1: Core (this crate)                                   │
//! │     field codec, RingBuffer, ByteSource, mmap, errors   │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust
//! use kcap_core::bytes::le_u32;
//! use kcap_core::ringbuffer::RingBuffer;
//!
//! let header = [b'K', b'C', b'A', b'P', 0, 0, 0, 0, 0, 0, 0, 0, 3, 0, 0, 0];
//! assert_eq!(le_u32(&header, 12), Some(3));
//!
//! let mut window = RingBuffer::pack_lzss(0);
//! window.write_byte(b'A');
//! assert_eq!(window.byte_at(0), b'A');
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod bytes;
pub mod entry;
pub mod error;
pub mod mmap;
pub mod ringbuffer;
pub mod source;
pub mod traits;

// Re-exports for convenience
pub use entry::{CompressionMethod, Entry, EntrySize};
pub use error::{ErrorKind, KcapError, Result};
pub use mmap::{MapOptions, MappedRegion};
pub use ringbuffer::RingBuffer;
pub use source::ByteSource;
pub use traits::{ArchiveReader, EntryRead};
