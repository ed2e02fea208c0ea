//! WAD writer
//!
//! Output is always a 3.1 archive with a zeroed signature block. Chunk
//! records keep their order; their data offsets are rebased onto the new
//! header so archives of any source version re-encode consistently.

use crate::chunk::{chunk_len, WadChunk};
use crate::compression::ChunkCodec;
use crate::error::WadResult;
use crate::reader::{Wad, V3_SIGNATURE_LEN, WAD_MAGIC};
use riot_core::{xxh64_path, ByteCursor, ByteWriter, Error};
use tracing::debug;

/// Version emitted by the writer
pub const WRITE_VERSION: (u8, u8) = (3, 1);

/// Bytes before the first chunk record of a written archive
pub const V3_HEADER_LEN: usize = WAD_MAGIC.len() + 2 + V3_SIGNATURE_LEN + 8 + 4;

fn table_end(count: usize) -> riot_core::Result<usize> {
    count
        .checked_mul(chunk_len(WRITE_VERSION.0))
        .and_then(|n| n.checked_add(V3_HEADER_LEN))
        .ok_or_else(|| Error::alloc(format!("{count} chunk records overflow")))
}

fn offset_u32(offset: usize) -> riot_core::Result<u32> {
    u32::try_from(offset)
        .map_err(|_| Error::corrupt(offset, "data offset does not fit in 32 bits"))
}

/// Emit header, table and data segment; chunk offsets must already be final
fn write_archive(chunks: &[WadChunk], data: &[u8]) -> WadResult<Vec<u8>> {
    let mut w = ByteWriter::new();
    w.push(&WAD_MAGIC)?;
    w.write_u8(WRITE_VERSION.0)?;
    w.write_u8(WRITE_VERSION.1)?;
    w.push(&[0; V3_SIGNATURE_LEN])?;
    w.write_u64(0)?;
    let count = u32::try_from(chunks.len())
        .map_err(|_| Error::alloc(format!("{} chunks exceed u32", chunks.len())))?;
    w.write_u32(count)?;
    for chunk in chunks {
        chunk.write(&mut w)?;
    }
    w.push(data)?;
    debug!(chunks = chunks.len(), len = w.position(), "wrote WAD");
    Ok(w.into_inner())
}

impl Wad {
    /// Re-encode this table, copying the data segment out of `bytes`
    ///
    /// `bytes` must be the buffer the table was read from.
    pub fn write(&self, bytes: &[u8]) -> WadResult<Vec<u8>> {
        let mut c = ByteCursor::new(bytes);
        c.skip(self.data_start as usize)?;
        let data = c.consume(c.remaining())?;

        let base = table_end(self.chunks.len())?;
        let chunks = self
            .chunks
            .iter()
            .map(|chunk| -> riot_core::Result<WadChunk> {
                let rebased = (chunk.data_offset - self.data_start) as usize + base;
                Ok(chunk.with_data_offset(offset_u32(rebased)?))
            })
            .collect::<riot_core::Result<Vec<_>>>()?;
        write_archive(&chunks, data)
    }
}

/// Builds a 3.1 archive from payloads
///
/// ```ignore
/// let mut b = WadBuilder::new();
/// b.add("data/characters/annie.bin", &bin_bytes, &ZstdCodec::default())?;
/// let bytes = b.build()?;
/// ```
#[derive(Debug, Default)]
pub struct WadBuilder {
    chunks: Vec<WadChunk>,
    data: Vec<u8>,
}

impl WadBuilder {
    /// An empty archive
    pub fn new() -> Self {
        WadBuilder::default()
    }

    /// Add a payload under the hash of `path`
    pub fn add(
        &mut self,
        path: &str,
        contents: &[u8],
        codec: &dyn ChunkCodec,
    ) -> WadResult<&WadChunk> {
        self.add_hashed(xxh64_path(path), contents, codec)
    }

    /// Add a payload under an explicit path hash
    pub fn add_hashed(
        &mut self,
        path_hash: u64,
        contents: &[u8],
        codec: &dyn ChunkCodec,
    ) -> WadResult<&WadChunk> {
        let packed = codec.encode(contents)?;
        let size = |n: usize| {
            u32::try_from(n).map_err(|_| Error::alloc(format!("payload of {n} bytes exceeds u32")))
        };
        let chunk = WadChunk {
            path_hash,
            // relative to the data segment until build()
            data_offset: offset_u32(self.data.len())?,
            compressed_size: size(packed.len())?,
            decompressed_size: size(contents.len())?,
            compression: codec.compression(),
            duplicated: false,
            sub_chunk_count: 0,
            sub_chunk_start: 0,
            checksum: 0,
        };
        self.data.try_reserve(packed.len()).map_err(Error::from)?;
        self.data.extend_from_slice(&packed);
        self.chunks.push(chunk);
        Ok(&self.chunks[self.chunks.len() - 1])
    }

    /// Number of chunks added so far
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    /// Whether no chunks were added
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Finish the archive
    pub fn build(self) -> WadResult<Vec<u8>> {
        let base = table_end(self.chunks.len())?;
        let chunks = self
            .chunks
            .iter()
            .map(|chunk| -> riot_core::Result<WadChunk> {
                let offset = (chunk.data_offset as usize)
                    .checked_add(base)
                    .ok_or_else(|| Error::alloc("data offset overflows"))?;
                Ok(chunk.with_data_offset(offset_u32(offset)?))
            })
            .collect::<riot_core::Result<Vec<_>>>()?;
        write_archive(&chunks, &self.data)
    }
}
