//! LZSS decompression engine.
//!
//! The bitstream is a sequence of flag blocks. Each block starts with one
//! control byte whose bits, LSB first, select literal (`1`) or back-reference
//! (`0`) for the next eight operations.
//!
//! A back-reference is two bytes `r1, r2`:
//!
//! ```text
//! position = r1 | (r2 & 0xF0) << 4     12-bit absolute window position
//! length   = (r2 & 0x0F) + 3           3..=18 bytes
//! ```
//!
//! Positions address the 4 KB window directly (not relative to the cursor).
//! The window write cursor starts at `0x1000 - 18` and the window is
//! zero-filled, so references into not-yet-written space yield zero bytes.

use crate::header::{DATA_HEADER_SIZE, DataHeader};
use kcap_core::error::{KcapError, Result};
use kcap_core::ringbuffer::{RingBuffer, sizes};
use kcap_core::source::ByteSource;
use kcap_core::traits::MAX_PREALLOCATION;
use std::io::{self, Cursor, Read};

/// Size of the sliding window.
pub const WINDOW_SIZE: usize = sizes::PACK_LZSS;

/// Maximum length of one back-reference.
pub const MAX_REFERENCE_LENGTH: usize = 0x12;

/// Minimum length of one back-reference.
pub const MIN_REFERENCE_LENGTH: usize = 3;

/// Initial window write position.
pub const INITIAL_POSITION: usize = WINDOW_SIZE - MAX_REFERENCE_LENGTH;

/// Operations described by one control byte.
const BLOCK_OPERATIONS: u8 = 8;

/// Split a back-reference into (window position, length).
#[inline]
pub fn decode_reference(r1: u8, r2: u8) -> (usize, usize) {
    let position = r1 as usize | (((r2 >> 4) & 0x0F) as usize) << 8;
    let length = (r2 & 0x0F) as usize + MIN_REFERENCE_LENGTH;
    (position, length)
}

/// Decompressor for one LZSS-compressed entry.
///
/// The decoder owns its window and flag state; every entry access creates a
/// fresh decoder. Input comes from any [`ByteSource`] positioned at the start
/// of the entry's data header.
#[derive(Debug)]
pub struct LzssDecoder<S> {
    /// Compressed input. `None` once closed.
    source: Option<S>,
    /// Sizes from the data header.
    header: DataHeader,
    /// Sliding window.
    window: RingBuffer,
    /// Control byte of the current flag block, shifted as bits are used.
    flags: u8,
    /// Operations left in the current flag block.
    flags_remaining: u8,
    /// Bytes copied by the last back-reference.
    replay: [u8; MAX_REFERENCE_LENGTH],
    /// Length of the last back-reference.
    replay_len: usize,
    /// Next replay byte to emit.
    replay_pos: usize,
    /// Compressed bytes consumed, including the data header.
    total_in: u64,
    /// Decompressed bytes returned to callers.
    total_out: u64,
}

impl<S: ByteSource> LzssDecoder<S> {
    /// Create a decoder, reading and validating the data header.
    ///
    /// # Errors
    ///
    /// Fails with a format error if the header is short or declares an
    /// original size smaller than the compressed size.
    pub fn new(mut source: S) -> Result<Self> {
        let header = DataHeader::read_from(&mut source)?;
        Ok(Self {
            source: Some(source),
            header,
            window: RingBuffer::pack_lzss(INITIAL_POSITION),
            flags: 0,
            flags_remaining: 0,
            replay: [0; MAX_REFERENCE_LENGTH],
            replay_len: 0,
            replay_pos: 0,
            total_in: DATA_HEADER_SIZE as u64,
            total_out: 0,
        })
    }

    /// Compressed size declared by the data header.
    pub fn compressed_size(&self) -> u32 {
        self.header.compressed_size
    }

    /// Decompressed size declared by the data header.
    pub fn size(&self) -> u32 {
        self.header.original_size
    }

    /// Compressed bytes consumed so far, including the 8-byte data header.
    pub fn total_in(&self) -> u64 {
        self.total_in
    }

    /// Decompressed bytes returned so far.
    pub fn total_out(&self) -> u64 {
        self.total_out
    }

    /// Decompressed bytes still expected.
    pub fn remaining(&self) -> u64 {
        u64::from(self.header.original_size).saturating_sub(self.total_out)
    }

    /// Whether the declared size has been fully produced.
    pub fn is_finished(&self) -> bool {
        self.remaining() == 0
    }

    /// `1` while output is still expected, `0` afterwards.
    pub fn available(&self) -> Result<usize> {
        self.ensure_open()?;
        Ok(usize::from(!self.is_finished()))
    }

    /// The sliding window.
    pub fn window(&self) -> &RingBuffer {
        &self.window
    }

    /// The last `count` bytes written into the window, oldest first.
    pub fn recent(&self, count: usize) -> Vec<u8> {
        self.window.last_bytes(count)
    }

    /// Release the input. Further decompression fails; closing twice is a no-op.
    pub fn close(&mut self) {
        self.source = None;
    }

    /// Whether [`LzssDecoder::close`] has been called.
    pub fn is_closed(&self) -> bool {
        self.source.is_none()
    }

    fn ensure_open(&self) -> Result<()> {
        if self.source.is_none() {
            return Err(KcapError::closed("Decompressor"));
        }
        Ok(())
    }

    /// Decompress into `output`, returning the number of bytes written.
    ///
    /// Returns `Ok(0)` once the declared original size has been produced (or
    /// when `output` is empty). If the input runs out first, the bytes decoded
    /// so far are returned and the following call fails with
    /// [`KcapError::Truncated`].
    pub fn decompress(&mut self, output: &mut [u8]) -> Result<usize> {
        if output.is_empty() {
            return Ok(0);
        }
        self.ensure_open()?;

        let remaining = self.remaining();
        if remaining == 0 {
            return Ok(0);
        }

        let want = output
            .len()
            .min(usize::try_from(remaining).unwrap_or(usize::MAX));
        let mut produced = 0;
        while produced < want {
            match self.decode_byte() {
                Some(byte) => {
                    output[produced] = byte;
                    produced += 1;
                }
                None => break,
            }
        }

        if produced == 0 {
            return Err(KcapError::truncated(
                u64::from(self.header.original_size),
                self.total_out,
            ));
        }
        self.total_out += produced as u64;
        Ok(produced)
    }

    /// Decode one byte, or `None` when the input is exhausted.
    fn decode_byte(&mut self) -> Option<u8> {
        if self.replay_pos < self.replay_len {
            let byte = self.replay[self.replay_pos];
            self.replay_pos += 1;
            return Some(byte);
        }

        let source = self.source.as_mut()?;

        if self.flags_remaining == 0 {
            self.flags = source.next_byte()?;
            self.total_in += 1;
            self.flags_remaining = BLOCK_OPERATIONS;
        }
        let literal = self.flags & 1 == 1;
        self.flags >>= 1;
        self.flags_remaining -= 1;

        let r1 = source.next_byte()?;
        self.total_in += 1;
        if literal {
            self.window.write_byte(r1);
            return Some(r1);
        }

        let r2 = source.next_byte()?;
        self.total_in += 1;
        let (position, length) = decode_reference(r1, r2);
        self.window
            .copy_from_position(position, length, &mut self.replay);
        self.replay_len = length;
        self.replay_pos = 1;
        Some(self.replay[0])
    }

    /// Decompress everything that is left into a vector.
    pub fn decompress_to_end(&mut self) -> Result<Vec<u8>> {
        let hint = usize::try_from(self.remaining()).unwrap_or(0);
        let mut output = Vec::with_capacity(hint.min(MAX_PREALLOCATION));
        let mut chunk = [0u8; WINDOW_SIZE];
        loop {
            let n = self.decompress(&mut chunk)?;
            if n == 0 {
                return Ok(output);
            }
            output.extend_from_slice(&chunk[..n]);
        }
    }
}

impl<S: ByteSource> Read for LzssDecoder<S> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        Ok(self.decompress(buf)?)
    }
}

/// Decompress a complete data region (data header plus bitstream).
///
/// # Example
///
/// ```rust
/// use kcap_lzss::decode_lzss;
///
/// // Header (compressed 11, original 18), then one back-reference of
/// // length 18 into the zero-filled window.
/// let data = [11, 0, 0, 0, 18, 0, 0, 0, 0x00, 0x00, 0x0F];
/// assert_eq!(decode_lzss(&data).unwrap(), vec![0u8; 18]);
/// ```
pub fn decode_lzss(data: &[u8]) -> Result<Vec<u8>> {
    LzssDecoder::new(Cursor::new(data))?.decompress_to_end()
}
