//! Shared helpers for kcap-pack integration tests.

#![allow(dead_code)]

use encoding_rs::SHIFT_JIS;
use kcap_lzss::DataHeader;
use std::io::{self, Read, Write};

pub const HEADER_SIZE: usize = 16;
pub const RECORD_SIZE: usize = 44;
pub const OFFSET_FIELD: usize = 36;
pub const COMPRESSED_SIZE_FIELD: usize = 40;

/// Builds pack images in memory.
///
/// Data regions follow the directory in entry order, separated by `gap`
/// filler bytes.
#[derive(Default)]
pub struct PackBuilder {
    entries: Vec<(u32, Vec<u8>, Vec<u8>)>,
    gap: usize,
}

impl PackBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Filler bytes placed before every data region.
    pub fn gap(mut self, gap: usize) -> Self {
        self.gap = gap;
        self
    }

    pub fn stored(self, name: &str, data: &[u8]) -> Self {
        self.raw(0, name, data.to_vec())
    }

    /// A compressed entry whose bitstream holds only literals.
    pub fn literal(self, name: &str, data: &[u8]) -> Self {
        self.raw(1, name, lzss_region(data.len(), &literal_stream(data)))
    }

    /// An entry with an explicit method and data region.
    pub fn raw(mut self, method: u32, name: &str, region: Vec<u8>) -> Self {
        let (encoded, _, _) = SHIFT_JIS.encode(name);
        assert!(encoded.len() <= 24, "name too long: {name}");
        self.entries.push((method, encoded.into_owned(), region));
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut bytes = b"KCAP".to_vec();
        bytes.extend_from_slice(&[0; 8]);
        bytes.extend_from_slice(&(self.entries.len() as u32).to_le_bytes());

        let mut offset = HEADER_SIZE + RECORD_SIZE * self.entries.len();
        for (method, name, region) in &self.entries {
            offset += self.gap;
            bytes.extend_from_slice(&method.to_le_bytes());
            let mut field = [0u8; 24];
            field[..name.len()].copy_from_slice(name);
            bytes.extend_from_slice(&field);
            bytes.extend_from_slice(&[0; 8]);
            bytes.extend_from_slice(&(offset as u32).to_le_bytes());
            bytes.extend_from_slice(&(region.len() as u32).to_le_bytes());
            offset += region.len();
        }
        for (_, _, region) in &self.entries {
            bytes.extend(std::iter::repeat_n(0xEE, self.gap));
            bytes.extend_from_slice(region);
        }
        bytes
    }

    pub fn write_temp(&self) -> tempfile::NamedTempFile {
        write_temp(&self.build())
    }
}

pub fn write_temp(bytes: &[u8]) -> tempfile::NamedTempFile {
    let mut tmp = tempfile::NamedTempFile::new().expect("Failed to create temp file");
    tmp.write_all(bytes).expect("Failed to write temp file");
    tmp.flush().expect("Failed to flush temp file");
    tmp
}

/// Overwrite a u32 field of directory record `index`.
pub fn patch_record(bytes: &mut [u8], index: usize, field: usize, value: u32) {
    let at = HEADER_SIZE + RECORD_SIZE * index + field;
    bytes[at..at + 4].copy_from_slice(&value.to_le_bytes());
}

pub fn read_record_field(bytes: &[u8], index: usize, field: usize) -> u32 {
    let at = HEADER_SIZE + RECORD_SIZE * index + field;
    u32::from_le_bytes(bytes[at..at + 4].try_into().unwrap())
}

/// Bitstream of literals only: one all-literal control byte per 8 bytes.
pub fn literal_stream(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    for chunk in data.chunks(8) {
        out.push(0xFF);
        out.extend_from_slice(chunk);
    }
    out
}

/// Data header plus bitstream.
///
/// The header's compressed size is capped at the original size so that
/// literal-only streams still carry a valid header.
pub fn lzss_region(original_size: usize, stream: &[u8]) -> Vec<u8> {
    let compressed = (8 + stream.len()).min(original_size);
    let mut region = DataHeader {
        compressed_size: compressed as u32,
        original_size: original_size as u32,
    }
    .to_bytes()
    .to_vec();
    region.extend_from_slice(stream);
    region
}

/// `text` followed by a back-reference repeating its first `len` bytes.
///
/// `text` must be 1..=7 bytes so the reference falls in the first flag block.
pub fn text_then_reference(text: &[u8], len: usize) -> (Vec<u8>, Vec<u8>) {
    assert!((1..8).contains(&text.len()) && (3..=18).contains(&len));
    let position = 0x1000 - 18;
    let mut stream = vec![(1u8 << text.len()) - 1];
    stream.extend_from_slice(text);
    stream.push((position & 0xFF) as u8);
    stream.push((((position >> 8) & 0x0F) << 4 | (len - 3)) as u8);

    let mut expected = text.to_vec();
    for i in 0..len {
        expected.push(expected[i]);
    }
    (stream, expected)
}

/// A reader that hands out at most `chunk` bytes per call and cannot seek.
pub struct Trickle<R> {
    inner: R,
    chunk: usize,
}

impl<R> Trickle<R> {
    pub fn new(inner: R, chunk: usize) -> Self {
        Self { inner, chunk }
    }
}

impl<R: Read> Read for Trickle<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = buf.len().min(self.chunk);
        self.inner.read(&mut buf[..n])
    }
}
