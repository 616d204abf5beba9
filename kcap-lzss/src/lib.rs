//! # KCAP LZSS
//!
//! Pure Rust decompressor for the LZSS variant used by KCAP pack archives.
//!
//! Entries stored with compression method `1` carry an 8-byte data header
//! (compressed size, original size) followed by an LZSS bitstream:
//!
//! - **Window**: 4 KB, zero-filled, write cursor starting at `0x1000 - 18`
//! - **Flags**: one control byte per 8 operations, consumed LSB first
//! - **Literal** (`1`): one byte
//! - **Back-reference** (`0`): two bytes, 12-bit absolute position and a
//!   length of 3 to 18 bytes
//!
//! ## Example
//!
//! ```rust
//! use kcap_lzss::LzssDecoder;
//! use std::io::{Cursor, Read};
//!
//! // Two literals, then a length-9 reference back to the first one.
//! let data = [11, 0, 0, 0, 11, 0, 0, 0, 0b0000_0011, b'a', b'b', 0xEE, 0xF6];
//! let mut decoder = LzssDecoder::new(Cursor::new(&data[..]))?;
//!
//! let mut text = String::new();
//! decoder.read_to_string(&mut text)?;
//! assert_eq!(text, "abababababa");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod decode;
pub mod header;

// Re-exports
pub use decode::{
    INITIAL_POSITION, LzssDecoder, MAX_REFERENCE_LENGTH, MIN_REFERENCE_LENGTH, WINDOW_SIZE,
    decode_lzss, decode_reference,
};
pub use header::{DATA_HEADER_SIZE, DataHeader};
