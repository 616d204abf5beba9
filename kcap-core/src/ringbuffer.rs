//! Ring buffer (sliding window) for LZSS decompression.
//!
//! The pack format addresses its dictionary by absolute window position rather
//! than by distance from the write cursor, so this buffer exposes both the
//! write cursor and position-based reads. All indices wrap modulo the
//! capacity.

/// Window sizes used by the pack format.
pub mod sizes {
    /// Dictionary size of the pack LZSS variant (4 KB).
    pub const PACK_LZSS: usize = 0x1000;
}

/// A circular buffer holding the most recently decompressed bytes.
#[derive(Debug, Clone)]
pub struct RingBuffer {
    /// The underlying buffer.
    buffer: Vec<u8>,
    /// Current write position (next byte will be written here).
    position: usize,
    /// Number of bytes written (up to capacity).
    size: usize,
    /// Mask for efficient modulo (capacity - 1).
    mask: usize,
}

impl RingBuffer {
    /// Create a zero-filled ring buffer with the write cursor at 0.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is not a power of 2 or is zero.
    pub fn new(capacity: usize) -> Self {
        Self::with_position(capacity, 0)
    }

    /// Create a zero-filled ring buffer with the write cursor at `start`.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is not a power of 2 or is zero.
    pub fn with_position(capacity: usize, start: usize) -> Self {
        assert!(capacity > 0, "Capacity must be greater than 0");
        assert!(
            capacity.is_power_of_two(),
            "Capacity must be a power of 2, got {}",
            capacity
        );

        Self {
            buffer: vec![0; capacity],
            position: start & (capacity - 1),
            size: 0,
            mask: capacity - 1,
        }
    }

    /// Create the 4 KB window used by the pack LZSS variant.
    pub fn pack_lzss(start: usize) -> Self {
        Self::with_position(sizes::PACK_LZSS, start)
    }

    /// Get the capacity of the buffer.
    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    /// Get the number of bytes written so far, saturating at the capacity.
    pub fn len(&self) -> usize {
        self.size
    }

    /// Check whether nothing has been written yet.
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Get the current write position.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Write a single byte at the cursor and advance it.
    #[inline]
    pub fn write_byte(&mut self, byte: u8) {
        self.buffer[self.position] = byte;
        self.position = (self.position + 1) & self.mask;
        if self.size < self.buffer.len() {
            self.size += 1;
        }
    }

    /// Read the byte stored at an absolute window position (wrapping).
    #[inline]
    pub fn byte_at(&self, index: usize) -> u8 {
        self.buffer[index & self.mask]
    }

    /// Replay `length` bytes starting at window position `start`.
    ///
    /// Bytes are copied one at a time, and each copied byte is written back at
    /// the cursor before the next one is read, so a source range overlapping
    /// the cursor repeats freshly written bytes. Copied bytes are also stored
    /// in `output` as far as it has room.
    ///
    /// Returns the number of bytes stored in `output`.
    pub fn copy_from_position(&mut self, start: usize, length: usize, output: &mut [u8]) -> usize {
        let mut written = 0;
        for i in 0..length {
            let byte = self.byte_at(start.wrapping_add(i));
            self.write_byte(byte);
            if let Some(slot) = output.get_mut(i) {
                *slot = byte;
                written += 1;
            }
        }
        written
    }

    /// Get the last N bytes written, oldest first.
    pub fn last_bytes(&self, count: usize) -> Vec<u8> {
        let count = count.min(self.size);
        (0..count)
            .map(|i| self.buffer[self.position.wrapping_sub(count - i) & self.mask])
            .collect()
    }

    /// Raw view of the window contents, indexed by absolute position.
    pub fn as_slice(&self) -> &[u8] {
        &self.buffer
    }
}
