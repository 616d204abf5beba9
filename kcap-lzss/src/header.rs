//! Data header of LZSS-compressed entries.
//!
//! Every compressed entry's data region starts with an 8-byte header:
//!
//! | Offset | Size | Field |
//! |---|---|---|
//! | 0 | 4 | compressed size |
//! | 4 | 4 | original (decompressed) size |
//!
//! The LZSS bitstream follows immediately.

use kcap_core::bytes::{le_u32, non_negative};
use kcap_core::error::{KcapError, Result};
use kcap_core::source::ByteSource;

/// Size of the data header in bytes.
pub const DATA_HEADER_SIZE: usize = 8;

/// Offset of the compressed size field.
pub const COMPRESSED_SIZE_OFFSET: usize = 0;

/// Offset of the original size field.
pub const ORIGINAL_SIZE_OFFSET: usize = 4;

/// The 8-byte header preceding an LZSS bitstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataHeader {
    /// Compressed size as recorded in the data header.
    pub compressed_size: u32,
    /// Size of the decompressed content.
    pub original_size: u32,
}

impl DataHeader {
    /// Parse and validate a data header from the first 8 bytes of `buf`.
    ///
    /// # Errors
    ///
    /// [`KcapError::InvalidHeader`] if fewer than 8 bytes are given,
    /// [`KcapError::InvalidSize`] if either size is above `i32::MAX` or the
    /// original size is smaller than the compressed size.
    pub fn parse(buf: &[u8]) -> Result<Self> {
        let (Some(compressed_size), Some(original_size)) = (
            le_u32(buf, COMPRESSED_SIZE_OFFSET),
            le_u32(buf, ORIGINAL_SIZE_OFFSET),
        ) else {
            return Err(KcapError::invalid_header(format!(
                "Data header is broken (need {} bytes, got {})",
                DATA_HEADER_SIZE,
                buf.len()
            )));
        };

        let header = Self {
            compressed_size,
            original_size,
        };
        header.validate()?;
        Ok(header)
    }

    /// Read and validate a data header from a byte source.
    pub fn read_from<S: ByteSource>(source: &mut S) -> Result<Self> {
        let mut buf = [0u8; DATA_HEADER_SIZE];
        if !source.next_bytes(&mut buf) {
            return Err(KcapError::invalid_header(format!(
                "Data header is broken (need {} bytes)",
                DATA_HEADER_SIZE
            )));
        }
        Self::parse(&buf)
    }

    /// Check that both sizes are non-negative and `original_size >= compressed_size`.
    pub fn validate(&self) -> Result<()> {
        // Both fields are signed in the format.
        match (non_negative(self.compressed_size), non_negative(self.original_size)) {
            (Some(compressed), Some(original)) if original >= compressed => Ok(()),
            _ => Err(KcapError::invalid_size(
                self.compressed_size,
                self.original_size,
            )),
        }
    }

    /// Serialize the header in on-disk layout.
    pub fn to_bytes(&self) -> [u8; DATA_HEADER_SIZE] {
        let mut buf = [0u8; DATA_HEADER_SIZE];
        buf[..4].copy_from_slice(&self.compressed_size.to_le_bytes());
        buf[4..].copy_from_slice(&self.original_size.to_le_bytes());
        buf
    }
}
