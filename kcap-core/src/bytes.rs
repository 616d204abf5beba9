//! Fixed-width little-endian field extraction.
//!
//! All multi-byte fields of the pack format are little-endian 32-bit integers
//! at fixed offsets inside fixed-size records.

/// Read a little-endian `u32` at `offset`.
///
/// Returns `None` if fewer than four bytes are available at `offset`.
#[inline]
pub fn le_u32(buf: &[u8], offset: usize) -> Option<u32> {
    let end = offset.checked_add(4)?;
    let field: [u8; 4] = buf.get(offset..end)?.try_into().ok()?;
    Some(u32::from_le_bytes(field))
}

/// Convert a stored 32-bit field to a non-negative signed value.
///
/// The format stores counts, offsets and sizes in fields that are read as
/// signed integers, so values above `i32::MAX` are treated as invalid.
#[inline]
pub fn non_negative(value: u32) -> Option<u32> {
    (value <= i32::MAX as u32).then_some(value)
}
