//! Chunk table records
//!
//! ```text
//! path_hash: u64            XXH64 of the lowercased path
//! data_offset: u32          absolute offset of the payload
//! compressed_size: u32
//! decompressed_size: u32
//! packed: u8                sub-chunk count (high nibble), compression (low nibble)
//! duplicated: u8
//! sub_chunk_start: u16
//! [checksum: u64]           major > 2 only
//! ```

use riot_core::{ByteCursor, ByteWriter, Error, Result};
use std::fmt;
use std::ops::Range;

/// Chunk record length without the checksum
pub const CHUNK_LEN: usize = 24;

/// Trailing checksum length of major > 2 records
pub const CHUNK_CHECKSUM_LEN: usize = 8;

/// Highest sub-chunk count the packed nibble can carry
pub const MAX_SUB_CHUNKS: u8 = 0x0F;

/// Record length of one chunk for the given major version
pub fn chunk_len(major: u8) -> usize {
    if major > 2 {
        CHUNK_LEN + CHUNK_CHECKSUM_LEN
    } else {
        CHUNK_LEN
    }
}

/// Payload compression method (low nibble of the packed byte)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Compression {
    /// Stored as-is
    None = 0,
    /// Gzip stream
    Gzip = 1,
    /// Payload is a reference to a file shipped elsewhere
    Satellite = 2,
    /// Single zstd frame
    Zstd = 3,
    /// Zstd payload split into independently compressed frames
    ZstdChunked = 4,
}

impl Compression {
    /// Every method, in wire order
    pub const ALL: [Compression; 5] = [
        Compression::None,
        Compression::Gzip,
        Compression::Satellite,
        Compression::Zstd,
        Compression::ZstdChunked,
    ];

    /// Method for a low-nibble value
    pub fn from_raw(raw: u8) -> Option<Compression> {
        Compression::ALL.into_iter().find(|c| c.to_raw() == raw)
    }

    /// Low-nibble value of this method
    pub fn to_raw(self) -> u8 {
        self as u8
    }

    /// Lowercase display name
    pub fn name(self) -> &'static str {
        match self {
            Compression::None => "none",
            Compression::Gzip => "gzip",
            Compression::Satellite => "satellite",
            Compression::Zstd => "zstd",
            Compression::ZstdChunked => "zstd-chunked",
        }
    }
}

impl fmt::Display for Compression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One record of the chunk table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WadChunk {
    /// XXH64 of the lowercased path
    pub path_hash: u64,
    /// Absolute offset of the payload
    pub data_offset: u32,
    /// Payload length in the archive
    pub compressed_size: u32,
    /// Payload length once unpacked
    pub decompressed_size: u32,
    /// How the payload is stored
    pub compression: Compression,
    /// Payload is shared with another chunk
    pub duplicated: bool,
    /// Number of sub-chunks
    pub sub_chunk_count: u8,
    /// Index of the first sub-chunk
    pub sub_chunk_start: u16,
    /// Zero for records read from major <= 2 archives
    pub checksum: u64,
}

impl WadChunk {
    /// Sub-chunk count and compression packed into one byte
    pub fn packed(&self) -> u8 {
        (self.sub_chunk_count << 4) | (self.compression.to_raw() & 0x0F)
    }

    /// Byte range of the compressed payload, widened so it cannot overflow
    pub fn data_range(&self) -> Range<u64> {
        let start = self.data_offset as u64;
        start..start + self.compressed_size as u64
    }

    /// Copy of this record pointing at `data_offset`
    pub fn with_data_offset(&self, data_offset: u32) -> WadChunk {
        WadChunk {
            data_offset,
            ..*self
        }
    }

    pub(crate) fn read(c: &mut ByteCursor<'_>, major: u8) -> Result<WadChunk> {
        let path_hash = c.read_u64()?;
        let data_offset = c.read_u32()?;
        let compressed_size = c.read_u32()?;
        let decompressed_size = c.read_u32()?;
        let at = c.position();
        let packed = c.read_u8()?;
        let compression = Compression::from_raw(packed & 0x0F).ok_or_else(|| {
            Error::corrupt(at, format!("unknown compression method {}", packed & 0x0F))
        })?;
        let duplicated = c.read_u8()? != 0;
        let sub_chunk_start = c.read_u16()?;
        let checksum = if major > 2 { c.read_u64()? } else { 0 };
        Ok(WadChunk {
            path_hash,
            data_offset,
            compressed_size,
            decompressed_size,
            compression,
            duplicated,
            sub_chunk_count: packed >> 4,
            sub_chunk_start,
            checksum,
        })
    }

    /// Write a major > 2 record
    pub(crate) fn write(&self, w: &mut ByteWriter) -> Result<()> {
        if self.sub_chunk_count > MAX_SUB_CHUNKS {
            return Err(Error::corrupt(
                w.position(),
                format!("{} sub-chunks do not fit a nibble", self.sub_chunk_count),
            ));
        }
        w.write_u64(self.path_hash)?;
        w.write_u32(self.data_offset)?;
        w.write_u32(self.compressed_size)?;
        w.write_u32(self.decompressed_size)?;
        w.write_u8(self.packed())?;
        w.write_u8(self.duplicated as u8)?;
        w.write_u16(self.sub_chunk_start)?;
        w.write_u64(self.checksum)
    }
}

impl fmt::Display for WadChunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "WadChunk(path_hash={:#018x}, data_offset={:#010x}, compressed_size={}, \
             decompressed_size={}, compression={}, duplicated={}, sub_chunk_count={}, \
             sub_chunk_start={}, checksum={:#018x})",
            self.path_hash,
            self.data_offset,
            self.compressed_size,
            self.decompressed_size,
            self.compression,
            self.duplicated,
            self.sub_chunk_count,
            self.sub_chunk_start,
            self.checksum
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> WadChunk {
        WadChunk {
            path_hash: 0x0123_4567_89AB_CDEF,
            data_offset: 0x200,
            compressed_size: 10,
            decompressed_size: 30,
            compression: Compression::Zstd,
            duplicated: true,
            sub_chunk_count: 2,
            sub_chunk_start: 7,
            checksum: 0xFEED,
        }
    }

    #[test]
    fn test_compression_raw_values() {
        for c in Compression::ALL {
            assert_eq!(Compression::from_raw(c.to_raw()), Some(c));
        }
        assert_eq!(Compression::ZstdChunked.to_raw(), 4);
        assert_eq!(Compression::from_raw(5), None);
    }

    #[test]
    fn test_packed_byte() {
        assert_eq!(sample().packed(), 0x23);
    }

    #[test]
    fn test_chunk_lengths() {
        assert_eq!(chunk_len(1), 24);
        assert_eq!(chunk_len(2), 24);
        assert_eq!(chunk_len(3), 32);
    }

    #[test]
    fn test_write_then_read_v3_record() {
        let mut w = ByteWriter::new();
        sample().write(&mut w).unwrap();
        assert_eq!(w.position(), chunk_len(3));

        let bytes = w.into_inner();
        let mut c = ByteCursor::new(&bytes);
        assert_eq!(WadChunk::read(&mut c, 3).unwrap(), sample());
        assert!(c.is_at_end());
    }

    #[test]
    fn test_v2_record_has_no_checksum() {
        let mut w = ByteWriter::new();
        sample().write(&mut w).unwrap();
        let bytes = w.into_inner();

        let mut c = ByteCursor::new(&bytes[..CHUNK_LEN]);
        let chunk = WadChunk::read(&mut c, 2).unwrap();
        assert_eq!(chunk.checksum, 0);
        assert_eq!(chunk.with_data_offset(0x200), WadChunk { checksum: 0, ..sample() });
    }

    #[test]
    fn test_unknown_compression_is_corrupt() {
        let mut w = ByteWriter::new();
        sample().write(&mut w).unwrap();
        let mut bytes = w.into_inner();
        bytes[20] = 0x0E;
        let err = WadChunk::read(&mut ByteCursor::new(&bytes), 3).unwrap_err();
        assert!(err.is_corrupt());
    }

    #[test]
    fn test_too_many_sub_chunks() {
        let chunk = WadChunk {
            sub_chunk_count: 16,
            ..sample()
        };
        assert!(chunk.write(&mut ByteWriter::new()).is_err());
    }

    #[test]
    fn test_display() {
        let text = sample().to_string();
        assert!(text.starts_with("WadChunk(path_hash=0x0123456789abcdef"));
        assert!(text.contains("compression=zstd"));
        assert!(text.contains("sub_chunk_count=2"));
    }
}
