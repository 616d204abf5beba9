//! KCAP container directory.
//!
//! A pack starts with a 16-byte header followed by one 44-byte record per
//! entry. All integers are little-endian.
//!
//! ```text
//! header  0..4    "KCAP"
//!         4..12   unused
//!         12..16  entry count
//!
//! record  0..4    method (0 = stored, 1 = LZSS)
//!         4..28   name, Windows-31J, padded
//!         28..36  unused
//!         36..40  data offset (absolute)
//!         40..44  compressed size
//! ```

use encoding_rs::SHIFT_JIS;
use kcap_core::bytes::{le_u32, non_negative};
use kcap_core::{CompressionMethod, Entry, KcapError, Result};
use std::collections::HashSet;
use std::io::{self, Read};

/// Signature at the start of every pack.
pub const SIGNATURE: [u8; 4] = *b"KCAP";

/// Size of the pack header.
pub const HEADER_SIZE: usize = 16;

/// Offset of the signature within the header.
pub const SIGNATURE_OFFSET: usize = 0;

/// Offset of the entry count within the header.
pub const ENTRY_COUNT_OFFSET: usize = 12;

/// Size of one directory record.
pub const RECORD_SIZE: usize = 44;

/// Offset of the method id within a record.
pub const METHOD_OFFSET: usize = 0;

/// Offset of the name field within a record.
pub const NAME_OFFSET: usize = 4;

/// Width of the name field.
pub const NAME_SIZE: usize = 24;

/// Offset of the data offset within a record.
pub const DATA_OFFSET_OFFSET: usize = 36;

/// Offset of the compressed size within a record.
pub const COMPRESSED_SIZE_OFFSET: usize = 40;

/// Records preallocated before any have been read.
const MAX_PREALLOCATED_RECORDS: usize = 4096;

/// The 16-byte pack header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PackHeader {
    /// Number of directory records that follow.
    pub entry_count: u32,
}

impl PackHeader {
    /// Parse the header from its 16 bytes.
    pub fn parse(buf: &[u8; HEADER_SIZE]) -> Result<Self> {
        let signature = &buf[SIGNATURE_OFFSET..SIGNATURE_OFFSET + SIGNATURE.len()];
        if signature != SIGNATURE {
            return Err(KcapError::invalid_magic(SIGNATURE.to_vec(), signature.to_vec()));
        }

        le_u32(buf, ENTRY_COUNT_OFFSET)
            .and_then(non_negative)
            .map(|entry_count| Self { entry_count })
            .ok_or_else(|| KcapError::invalid_header("KCAP header is broken (invalid entry count)"))
    }

    /// Read and parse the header.
    pub fn read<R: Read>(reader: &mut R) -> Result<Self> {
        let mut buf = [0u8; HEADER_SIZE];
        read_fixed(reader, &mut buf, "KCAP header")?;
        Self::parse(&buf)
    }

    /// Size of the header plus all directory records.
    pub fn directory_size(&self) -> u64 {
        HEADER_SIZE as u64 + RECORD_SIZE as u64 * u64::from(self.entry_count)
    }
}

/// Decode a fixed-width name field.
///
/// Names are Windows-31J; padding and other characters up to U+0020 are
/// trimmed from both ends.
pub fn decode_name(raw: &[u8]) -> String {
    let (decoded, _) = SHIFT_JIS.decode_without_bom_handling(raw);
    decoded.trim_matches(|c: char| c <= ' ').to_string()
}

/// Parse one 44-byte directory record. The size is left unresolved.
pub fn parse_record(buf: &[u8; RECORD_SIZE]) -> Result<Entry> {
    let name = decode_name(&buf[NAME_OFFSET..NAME_OFFSET + NAME_SIZE]);
    let field = |offset: usize, what: &str| {
        le_u32(buf, offset).and_then(non_negative).ok_or_else(|| {
            KcapError::invalid_header(format!("Entry header of {name:?} is broken (invalid {what})"))
        })
    };

    let method = le_u32(buf, METHOD_OFFSET).map_or(CompressionMethod::Stored, CompressionMethod::from_id);
    let offset = field(DATA_OFFSET_OFFSET, "offset")?;
    let compressed_size = field(COMPRESSED_SIZE_OFFSET, "compressed size")?;

    Ok(Entry::new(name, method, offset, compressed_size))
}

/// Read and parse one directory record.
pub fn read_record<R: Read>(reader: &mut R) -> Result<Entry> {
    let mut buf = [0u8; RECORD_SIZE];
    read_fixed(reader, &mut buf, "Entry header")?;
    parse_record(&buf)
}

/// Read the header and every directory record, in order.
///
/// Duplicate names are kept; lookups by name return the first.
pub fn read_directory<R: Read>(reader: &mut R) -> Result<Vec<Entry>> {
    let header = PackHeader::read(reader)?;
    let count = header.entry_count as usize;

    let mut entries = Vec::with_capacity(count.min(MAX_PREALLOCATED_RECORDS));
    let mut names = HashSet::new();
    for index in 0..count {
        let entry = read_record(reader)?;
        log::trace!(
            "record {index}: {:?} method={} offset={:#x} compressed={}",
            entry.name,
            entry.method,
            entry.offset,
            entry.compressed_size
        );
        if !names.insert(entry.name.clone()) {
            log::warn!("duplicate entry name {:?}; only the first is reachable by name", entry.name);
        }
        entries.push(entry);
    }

    log::debug!("parsed KCAP directory: {count} entries");
    Ok(entries)
}

fn read_fixed<R: Read>(reader: &mut R, buf: &mut [u8], what: &str) -> Result<()> {
    reader.read_exact(buf).map_err(|err| match err.kind() {
        io::ErrorKind::UnexpectedEof => {
            KcapError::invalid_header(format!("{what} is broken (header size does not match)"))
        }
        _ => KcapError::from(err),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn header(count: u32) -> Vec<u8> {
        let mut buf = b"KCAP".to_vec();
        buf.extend_from_slice(&[0; 8]);
        buf.extend_from_slice(&count.to_le_bytes());
        buf
    }

    fn record(method: u32, name: &[u8], offset: u32, size: u32) -> Vec<u8> {
        let mut buf = method.to_le_bytes().to_vec();
        let mut field = [0u8; NAME_SIZE];
        field[..name.len()].copy_from_slice(name);
        buf.extend_from_slice(&field);
        buf.extend_from_slice(&[0; 8]);
        buf.extend_from_slice(&offset.to_le_bytes());
        buf.extend_from_slice(&size.to_le_bytes());
        buf
    }

    #[test]
    fn test_parse_header() {
        let buf: [u8; HEADER_SIZE] = header(3).try_into().unwrap();
        let header = PackHeader::parse(&buf).unwrap();
        assert_eq!(header.entry_count, 3);
        assert_eq!(header.directory_size(), 16 + 3 * 44);
    }

    #[test]
    fn test_bad_signature() {
        let mut buf: [u8; HEADER_SIZE] = header(1).try_into().unwrap();
        buf[..4].copy_from_slice(b"LAC\0");
        let err = PackHeader::parse(&buf).unwrap_err();
        assert!(matches!(err, KcapError::InvalidMagic { .. }));
    }

    #[test]
    fn test_negative_entry_count() {
        let buf: [u8; HEADER_SIZE] = header(0x8000_0000).try_into().unwrap();
        assert!(PackHeader::parse(&buf).unwrap_err().is_format_error());
    }

    #[test]
    fn test_short_header() {
        let err = PackHeader::read(&mut Cursor::new(b"KCAP\0\0".to_vec())).unwrap_err();
        assert!(matches!(err, KcapError::InvalidHeader { .. }));
    }

    #[test]
    fn test_parse_record() {
        let buf: [u8; RECORD_SIZE] = record(1, b"SCRIPT.TXT", 0x100, 42).try_into().unwrap();
        let entry = parse_record(&buf).unwrap();
        assert_eq!(entry.name, "SCRIPT.TXT");
        assert_eq!(entry.method, CompressionMethod::Lzss);
        assert_eq!(entry.offset, 0x100);
        assert_eq!(entry.compressed_size, 42);
        assert_eq!(entry.size(), None);
    }

    #[test]
    fn test_unknown_method_is_not_rejected() {
        let buf: [u8; RECORD_SIZE] = record(7, b"X", 0, 0).try_into().unwrap();
        assert_eq!(parse_record(&buf).unwrap().method, CompressionMethod::Unknown(7));
    }

    #[test]
    fn test_negative_offset_rejected() {
        let buf: [u8; RECORD_SIZE] = record(0, b"X", 0xFFFF_FFFF, 0).try_into().unwrap();
        assert!(parse_record(&buf).unwrap_err().is_format_error());
    }

    #[test]
    fn test_decode_name() {
        assert_eq!(decode_name(b"BGM01.OGG\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0"), "BGM01.OGG");
        assert_eq!(decode_name(b"  padded \0\0"), "padded");
        // "ファイル" in Windows-31J.
        assert_eq!(decode_name(b"\x83\x74\x83\x40\x83\x43\x83\x8b\0\0"), "ファイル");
        // NEC special character only present in the Windows-31J table.
        assert_eq!(decode_name(b"\x87\x40"), "\u{2460}");
        // A full-width name uses all 24 bytes without padding.
        let full = [0x82, 0xa0].repeat(12);
        assert_eq!(decode_name(&full), "あ".repeat(12));
    }

    #[test]
    fn test_read_directory() {
        let mut data = header(3);
        data.extend(record(0, b"A.TXT", 148, 5));
        data.extend(record(1, b"B.TXT", 153, 20));
        data.extend(record(0, b"A.TXT", 173, 1));

        let entries = read_directory(&mut Cursor::new(data)).unwrap();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].name, "A.TXT");
        assert_eq!(entries[1].method, CompressionMethod::Lzss);
        assert_eq!(entries[2].offset, 173);
    }

    #[test]
    fn test_read_directory_short_record() {
        let mut data = header(2);
        data.extend(record(0, b"A.TXT", 104, 5));
        data.extend_from_slice(&[0; 10]);

        let err = read_directory(&mut Cursor::new(data)).unwrap_err();
        assert!(matches!(err, KcapError::InvalidHeader { .. }));
    }

    #[test]
    fn test_empty_directory() {
        assert!(read_directory(&mut Cursor::new(header(0))).unwrap().is_empty());
    }
}
