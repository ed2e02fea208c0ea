//! WAD archive headers and the chunk table reader
//!
//! ```text
//! "RW" major: u8 minor: u8
//! major 2: sig_len: u32, signature[sig_len], checksum: u64
//! major 3: signature[256], checksum: u64
//! major <= 2: toc_offset: u16, toc_entry_size: u16
//! chunk_count: u32, WadChunk * chunk_count
//! data segment
//! ```
//!
//! Signatures and checksums are carried but never verified.

use crate::chunk::{chunk_len, WadChunk};
use crate::compression::decompress;
use crate::error::{WadError, WadResult};
use riot_core::{xxh64_path, ByteCursor, Error};
use std::fmt;
use tracing::{debug, warn};

/// Archive magic
pub const WAD_MAGIC: [u8; 2] = *b"RW";

/// Fixed signature length of major 3 archives
pub const V3_SIGNATURE_LEN: usize = 256;

/// Signature block of a major 2 or 3 archive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    /// Raw signature bytes
    pub bytes: Vec<u8>,
    /// Checksum following the signature
    pub checksum: u64,
}

/// Table-of-contents fields of a major <= 2 archive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableOfContents {
    /// Offset of the chunk table
    pub offset: u16,
    /// Length of one chunk record
    pub entry_size: u16,
}

/// A parsed chunk table
///
/// Payload bytes are not copied; [`Wad::chunk_data`] slices them out of the
/// buffer the table was read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Wad {
    pub(crate) major: u8,
    pub(crate) minor: u8,
    pub(crate) signature: Option<Signature>,
    pub(crate) toc: Option<TableOfContents>,
    pub(crate) chunks: Vec<WadChunk>,
    pub(crate) data_start: u32,
}

fn read_signature(c: &mut ByteCursor<'_>, major: u8, minor: u8) -> WadResult<Option<Signature>> {
    let len = match major {
        1 => return Ok(None),
        2 => c.read_u32()? as usize,
        3 => V3_SIGNATURE_LEN,
        _ => return Err(WadError::UnsupportedVersion { major, minor }),
    };
    let bytes = c.consume(len)?.to_vec();
    let checksum = c.read_u64()?;
    debug!(len, checksum, "WAD signature");
    Ok(Some(Signature { bytes, checksum }))
}

impl Wad {
    /// Parse the header and chunk table of an archive
    pub fn read(bytes: &[u8]) -> WadResult<Wad> {
        let mut c = ByteCursor::new(bytes);
        let magic: [u8; 2] = c.read_array()?;
        if magic != WAD_MAGIC {
            return Err(Error::corrupt(0, format!("invalid WAD magic {magic:02x?}")).into());
        }
        let major = c.read_u8()?;
        let minor = c.read_u8()?;
        debug!(major, minor, "WAD version");

        let signature = read_signature(&mut c, major, minor)?;
        let toc = if major <= 2 {
            let toc = TableOfContents {
                offset: c.read_u16()?,
                entry_size: c.read_u16()?,
            };
            debug!(offset = toc.offset, entry_size = toc.entry_size, "WAD table of contents");
            Some(toc)
        } else {
            None
        };

        let count = c.read_u32()?;
        let table_len = (count as usize)
            .checked_mul(chunk_len(major))
            .ok_or_else(|| Error::alloc(format!("{count} chunk records overflow")))?;
        c.ensure(table_len)?;
        debug!(count, "WAD chunks");

        let mut chunks = Vec::new();
        chunks.try_reserve_exact(count as usize).map_err(Error::from)?;
        let mut data_start = u32::MAX;
        for _ in 0..count {
            let chunk = WadChunk::read(&mut c, major)?;
            data_start = data_start.min(chunk.data_offset);
            chunks.push(chunk);
        }

        let table_end = c.position();
        if chunks.is_empty() {
            data_start = u32::try_from(table_end)
                .map_err(|_| Error::corrupt(table_end, "chunk table ends past 4 GiB"))?;
        } else if (data_start as usize) < table_end {
            warn!(data_start, table_end, "WAD data segment overlaps the chunk table");
        }
        debug!(table_end, data_start, "WAD data segment");

        Ok(Wad {
            major,
            minor,
            signature,
            toc,
            chunks,
            data_start,
        })
    }

    /// (major, minor)
    pub fn version(&self) -> (u8, u8) {
        (self.major, self.minor)
    }

    /// Signature block, for major 2 and 3
    pub fn signature(&self) -> Option<&Signature> {
        self.signature.as_ref()
    }

    /// Table-of-contents fields, for major <= 2
    pub fn toc(&self) -> Option<TableOfContents> {
        self.toc
    }

    /// Chunk records in table order
    pub fn chunks(&self) -> &[WadChunk] {
        &self.chunks
    }

    /// Number of chunk records
    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Lowest data offset of any chunk; the end of the table when there are none
    pub fn data_start(&self) -> u32 {
        self.data_start
    }

    /// First chunk with the given path hash
    pub fn find(&self, path_hash: u64) -> Option<&WadChunk> {
        self.chunks.iter().find(|c| c.path_hash == path_hash)
    }

    /// First chunk whose path hashes to the same value as `path`
    pub fn find_path(&self, path: &str) -> Option<&WadChunk> {
        self.find(xxh64_path(path))
    }

    /// Compressed payload of `chunk` inside `bytes`
    pub fn chunk_data<'a>(bytes: &'a [u8], chunk: &WadChunk) -> WadResult<&'a [u8]> {
        let range = chunk.data_range();
        let out_of_bounds = || WadError::ChunkOutOfBounds {
            path_hash: chunk.path_hash,
            offset: range.start,
            end: range.end,
            len: bytes.len(),
        };
        let start = usize::try_from(range.start).map_err(|_| out_of_bounds())?;
        let end = usize::try_from(range.end).map_err(|_| out_of_bounds())?;
        bytes.get(start..end).ok_or_else(out_of_bounds)
    }

    /// Decompressed payload of `chunk` inside `bytes`
    pub fn read_chunk(bytes: &[u8], chunk: &WadChunk) -> WadResult<Vec<u8>> {
        decompress(chunk, Wad::chunk_data(bytes, chunk)?)
    }
}

impl fmt::Display for Wad {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "WAD version {}.{}", self.major, self.minor)?;
        writeln!(f, "WAD chunks: {}", self.chunks.len())?;
        for chunk in &self.chunks {
            writeln!(f, "\t{chunk}")?;
        }
        Ok(())
    }
}
