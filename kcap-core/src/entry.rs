//! Archive entry metadata.
//!
//! This module defines the [`Entry`] struct describing one named, offset
//! addressed unit of data inside a pack, as recorded in the 44-byte directory
//! record, plus the lazily resolved decompressed size.

use std::path::{Component, Path};

/// Storage method of an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompressionMethod {
    /// Method 0: raw bytes.
    #[default]
    Stored,
    /// Method 1: LZSS-compressed, preceded by an 8-byte data header.
    Lzss,
    /// Any other method id. Not rejected while parsing the directory; such
    /// entries are served as raw bytes.
    Unknown(u32),
}

impl CompressionMethod {
    /// Map the on-disk method id.
    pub fn from_id(id: u32) -> Self {
        match id {
            0 => Self::Stored,
            1 => Self::Lzss,
            other => Self::Unknown(other),
        }
    }

    /// The on-disk method id.
    pub fn id(&self) -> u32 {
        match self {
            Self::Stored => 0,
            Self::Lzss => 1,
            Self::Unknown(id) => *id,
        }
    }

    /// Whether entry data must go through the LZSS engine.
    pub fn is_compressed(&self) -> bool {
        matches!(self, Self::Lzss)
    }

    /// Get the method name as a string.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Stored => "Stored",
            Self::Lzss => "LZSS",
            Self::Unknown(_) => "Unknown",
        }
    }
}

impl std::fmt::Display for CompressionMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unknown(id) => write!(f, "Unknown({})", id),
            _ => write!(f, "{}", self.name()),
        }
    }
}

/// Decompressed size of an entry.
///
/// Compressed entries only learn their size from the data header at the start
/// of their data region, which the readers probe after the directory is parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EntrySize {
    /// Not probed yet.
    #[default]
    Unresolved,
    /// Size in bytes of the decompressed content.
    Resolved(u32),
}

impl EntrySize {
    /// The size, if resolved.
    pub fn get(&self) -> Option<u32> {
        match self {
            Self::Unresolved => None,
            Self::Resolved(size) => Some(*size),
        }
    }

    /// Whether the size has been resolved.
    pub fn is_resolved(&self) -> bool {
        matches!(self, Self::Resolved(_))
    }
}

/// An entry in a pack archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Decoded entry name, trimmed of padding.
    pub name: String,
    /// Storage method.
    pub method: CompressionMethod,
    /// Absolute offset of the entry's data region within the container.
    pub offset: u32,
    /// Size of the data region as recorded in the directory.
    pub compressed_size: u32,
    /// Decompressed size.
    pub size: EntrySize,
}

impl Entry {
    /// Create an entry with an unresolved size.
    pub fn new(
        name: impl Into<String>,
        method: CompressionMethod,
        offset: u32,
        compressed_size: u32,
    ) -> Self {
        Self {
            name: name.into(),
            method,
            offset,
            compressed_size,
            size: EntrySize::Unresolved,
        }
    }

    /// Record the resolved size.
    pub fn resolve(&mut self, size: u32) {
        self.size = EntrySize::Resolved(size);
    }

    /// Decompressed size, if resolved.
    pub fn size(&self) -> Option<u32> {
        self.size.get()
    }

    /// Whether the entry is LZSS-compressed.
    pub fn is_compressed(&self) -> bool {
        self.method.is_compressed()
    }

    /// Get the compression ratio (compressed/uncompressed).
    pub fn compression_ratio(&self) -> f64 {
        match self.size() {
            Some(size) if size > 0 => self.compressed_size as f64 / size as f64,
            _ => 1.0,
        }
    }

    /// Get the space savings as a percentage.
    pub fn space_savings(&self) -> f64 {
        match self.size() {
            Some(size) if size > 0 => (1.0 - self.compression_ratio()) * 100.0,
            _ => 0.0,
        }
    }

    /// Whether the name would escape an extraction directory.
    ///
    /// Pack names use `\` as a separator, so both separators are considered.
    pub fn has_unsafe_path(&self) -> bool {
        let normalized = self.name.replace('\\', "/");
        let path = Path::new(&normalized);
        path.is_absolute()
            || normalized.contains('\0')
            || path
                .components()
                .any(|c| matches!(c, Component::ParentDir | Component::Prefix(_)))
    }

    /// Get a sanitized relative path that's safe for extraction.
    ///
    /// Backslashes become `/`; `..`, `.` and root components are dropped.
    pub fn sanitized_name(&self) -> String {
        let normalized = self.name.replace('\\', "/");
        let mut result = String::new();

        for component in Path::new(&normalized).components() {
            if let Component::Normal(s) = component {
                if !result.is_empty() {
                    result.push('/');
                }
                result.push_str(&s.to_string_lossy().replace('\0', "_"));
            }
        }

        result
    }
}

impl std::fmt::Display for Entry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let size = match self.size() {
            Some(size) => size.to_string(),
            None => "?".to_string(),
        };
        write!(
            f,
            "{:>10} {:>10} {:>6} {}",
            size,
            self.compressed_size,
            self.method.name(),
            self.name
        )
    }
}
