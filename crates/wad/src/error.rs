//! WAD error types

use crate::chunk::Compression;
use thiserror::Error;

/// Errors from reading, writing or unpacking WAD archives
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WadError {
    /// Malformed or truncated bytes
    #[error(transparent)]
    Format(#[from] riot_core::Error),

    /// Major version other than 1, 2 or 3
    #[error("unsupported WAD version {major}.{minor}")]
    UnsupportedVersion {
        /// Major version byte
        major: u8,
        /// Minor version byte
        minor: u8,
    },

    /// Compression method this crate cannot unpack
    #[error("unsupported chunk compression: {0}")]
    UnsupportedCompression(Compression),

    /// The compressed stream itself was rejected
    #[error("decompression failed: {0}")]
    Decompress(String),

    /// A payload could not be compressed
    #[error("compression failed: {0}")]
    Compress(String),

    /// A chunk's payload lies outside the archive
    #[error(
        "chunk {path_hash:#018x} spans {offset:#x}..{end:#x}, past the end of the archive ({len} bytes)"
    )]
    ChunkOutOfBounds {
        /// Path hash of the chunk
        path_hash: u64,
        /// Declared data offset
        offset: u64,
        /// Declared end of the compressed payload
        end: u64,
        /// Archive length
        len: usize,
    },

    /// Decompressed payload length differs from the chunk table
    #[error("chunk {path_hash:#018x} unpacked to {actual} bytes, table declares {expected}")]
    SizeMismatch {
        /// Path hash of the chunk
        path_hash: u64,
        /// Declared decompressed size
        expected: u32,
        /// Bytes actually produced
        actual: usize,
    },
}

impl WadError {
    /// Create a decompression error
    pub fn decompress(msg: impl Into<String>) -> Self {
        WadError::Decompress(msg.into())
    }

    /// Create a compression error
    pub fn compress(msg: impl Into<String>) -> Self {
        WadError::Compress(msg.into())
    }

    /// The underlying format error kind, if this is a format error
    pub fn format_kind(&self) -> Option<riot_core::ErrorKind> {
        match self {
            WadError::Format(e) => Some(e.kind()),
            _ => None,
        }
    }
}

/// Result type for WAD operations
pub type WadResult<T> = Result<T, WadError>;
