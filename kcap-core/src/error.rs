//! Error types for KCAP pack operations.
//!
//! Every failure falls into one of three kinds (see [`ErrorKind`]):
//! structurally invalid archive data, I/O failures of the underlying byte
//! source, and lifecycle misuse such as reading from a closed archive.

use std::fmt;
use std::io;
use thiserror::Error;

/// Coarse classification of a [`KcapError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The archive or stream is structurally invalid. Not recoverable.
    Format,
    /// The underlying byte source failed.
    Io,
    /// The caller used a closed or exhausted resource.
    Use,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Format => f.write_str("format error"),
            Self::Io => f.write_str("I/O error"),
            Self::Use => f.write_str("usage error"),
        }
    }
}

/// The main error type for KCAP operations.
#[derive(Debug, Error)]
pub enum KcapError {
    /// I/O error from the underlying reader or file.
    #[error("I/O error: {0}")]
    Io(io::Error),

    /// The archive does not start with the `KCAP` signature.
    #[error("Unsupported archive: expected signature {expected:02x?}, found {found:02x?}")]
    InvalidMagic {
        /// Expected signature bytes.
        expected: Vec<u8>,
        /// Signature bytes actually found.
        found: Vec<u8>,
    },

    /// A fixed-size header could not be read or holds an impossible value.
    #[error("Invalid header: {message}")]
    InvalidHeader {
        /// Description of the header error.
        message: String,
    },

    /// A data header declares an original size smaller than its compressed size.
    #[error("Invalid data header: original size {original} is smaller than compressed size {compressed}")]
    InvalidSize {
        /// Declared compressed size.
        compressed: u32,
        /// Declared original size.
        original: u32,
    },

    /// Corrupted entry data.
    #[error("Corrupted data at offset {offset}: {message}")]
    CorruptedData {
        /// Byte offset (within the container) where corruption was detected.
        offset: u64,
        /// Description of the corruption.
        message: String,
    },

    /// Compressed input ran out before the declared size was produced.
    #[error("Data size does not match: expected {expected} bytes, produced {produced}")]
    Truncated {
        /// Declared original size of the entry.
        expected: u64,
        /// Bytes produced before the input ran out.
        produced: u64,
    },

    /// An entry's data region does not fit inside the container.
    #[error("Entry region {offset}+{len} lies outside the container ({file_len} bytes)")]
    RegionOutOfBounds {
        /// Start of the region.
        offset: u64,
        /// Length of the region.
        len: u64,
        /// Length of the container file.
        file_len: u64,
    },

    /// A forward-only stream was asked for data it has already passed.
    #[error("Entry {name:?} starts at offset {offset}, but the stream is already at {position}")]
    OutOfOrder {
        /// Name of the entry.
        name: String,
        /// Declared data offset of the entry.
        offset: u64,
        /// Current position of the stream.
        position: u64,
    },

    /// Operation on a closed archive, stream, handle or decoder.
    #[error("{what} closed")]
    Closed {
        /// What was closed.
        what: &'static str,
    },
}

/// Result type alias for KCAP operations.
pub type Result<T> = std::result::Result<T, KcapError>;

impl KcapError {
    /// Create an invalid signature error.
    pub fn invalid_magic(expected: impl Into<Vec<u8>>, found: impl Into<Vec<u8>>) -> Self {
        Self::InvalidMagic {
            expected: expected.into(),
            found: found.into(),
        }
    }

    /// Create an invalid header error.
    pub fn invalid_header(message: impl Into<String>) -> Self {
        Self::InvalidHeader {
            message: message.into(),
        }
    }

    /// Create an invalid data header size error.
    pub fn invalid_size(compressed: u32, original: u32) -> Self {
        Self::InvalidSize {
            compressed,
            original,
        }
    }

    /// Create a corrupted data error.
    pub fn corrupted(offset: u64, message: impl Into<String>) -> Self {
        Self::CorruptedData {
            offset,
            message: message.into(),
        }
    }

    /// Create a truncated data error.
    pub fn truncated(expected: u64, produced: u64) -> Self {
        Self::Truncated { expected, produced }
    }

    /// Create a region out of bounds error.
    pub fn region_out_of_bounds(offset: u64, len: u64, file_len: u64) -> Self {
        Self::RegionOutOfBounds {
            offset,
            len,
            file_len,
        }
    }

    /// Create an out of order entry error.
    pub fn out_of_order(name: impl Into<String>, offset: u64, position: u64) -> Self {
        Self::OutOfOrder {
            name: name.into(),
            offset,
            position,
        }
    }

    /// Create a closed resource error.
    pub fn closed(what: &'static str) -> Self {
        Self::Closed { what }
    }

    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Io(_) => ErrorKind::Io,
            Self::Closed { .. } => ErrorKind::Use,
            Self::InvalidMagic { .. }
            | Self::InvalidHeader { .. }
            | Self::InvalidSize { .. }
            | Self::CorruptedData { .. }
            | Self::Truncated { .. }
            | Self::RegionOutOfBounds { .. }
            | Self::OutOfOrder { .. } => ErrorKind::Format,
        }
    }

    /// Whether the archive data itself is invalid.
    pub fn is_format_error(&self) -> bool {
        self.kind() == ErrorKind::Format
    }

    /// Whether this error was caused by using a closed resource.
    pub fn is_use_error(&self) -> bool {
        self.kind() == ErrorKind::Use
    }
}

impl From<io::Error> for KcapError {
    fn from(err: io::Error) -> Self {
        // Unwrap errors that were only boxed to pass through `io::Read`.
        if !err.get_ref().is_some_and(|inner| inner.is::<KcapError>()) {
            return Self::Io(err);
        }
        let kind = err.kind();
        match err.into_inner().map(|inner| inner.downcast::<KcapError>()) {
            Some(Ok(kcap)) => *kcap,
            Some(Err(inner)) => Self::Io(io::Error::new(kind, inner)),
            None => Self::Io(io::Error::from(kind)),
        }
    }
}

impl From<KcapError> for io::Error {
    fn from(err: KcapError) -> Self {
        match err {
            KcapError::Io(inner) => inner,
            other => {
                let kind = match other.kind() {
                    ErrorKind::Format => io::ErrorKind::InvalidData,
                    _ => io::ErrorKind::Other,
                };
                io::Error::new(kind, other)
            }
        }
    }
}
