//! Chunk payload codecs
//!
//! Every compression method a WAD chunk can declare maps to a [`ChunkCodec`].
//! Decoding is bounded by the size the chunk table declares: a stream that
//! inflates past it is cut off and reported as a size mismatch rather than
//! read to exhaustion.

use crate::chunk::{Compression, WadChunk};
use crate::error::{WadError, WadResult};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use std::io::{Read, Write};

/// Frame size used when writing [`Compression::ZstdChunked`] payloads
pub const ZSTD_FRAME_SIZE: usize = 64 * 1024;

/// A payload codec
///
/// Codecs are `Send + Sync` so chunks can be unpacked from several threads.
pub trait ChunkCodec: Send + Sync {
    /// Method recorded in the chunk table for payloads this codec writes
    fn compression(&self) -> Compression;

    /// Compress a payload
    fn encode(&self, data: &[u8]) -> WadResult<Vec<u8>>;

    /// Decompress a payload expected to unpack to `size` bytes
    ///
    /// At most `size + 1` bytes are produced, enough to detect an overrun.
    fn decode(&self, data: &[u8], size: usize) -> WadResult<Vec<u8>>;
}

/// Upper bound on the up-front reservation per compressed input byte
///
/// The declared size is untrusted; beyond this ratio the output grows only as
/// the stream actually produces bytes.
pub const MAX_RESERVE_RATIO: usize = 64;

fn initial_capacity(size: usize, compressed_len: usize) -> usize {
    size.min(compressed_len.max(1).saturating_mul(MAX_RESERVE_RATIO))
}

fn read_bounded(
    reader: impl Read,
    size: usize,
    compressed_len: usize,
    what: &str,
) -> WadResult<Vec<u8>> {
    let mut out = Vec::new();
    out.try_reserve_exact(initial_capacity(size, compressed_len))
        .map_err(riot_core::Error::from)?;
    reader
        .take(size as u64 + 1)
        .read_to_end(&mut out)
        .map_err(|e| WadError::decompress(format!("{what}: {e}")))?;
    Ok(out)
}

/// Stored payloads
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityCodec;

impl ChunkCodec for IdentityCodec {
    fn compression(&self) -> Compression {
        Compression::None
    }

    fn encode(&self, data: &[u8]) -> WadResult<Vec<u8>> {
        Ok(data.to_vec())
    }

    fn decode(&self, data: &[u8], size: usize) -> WadResult<Vec<u8>> {
        read_bounded(data, size, data.len(), "stored")
    }
}

/// Gzip payloads
#[derive(Debug, Clone, Copy)]
pub struct GzipCodec {
    level: u32,
}

impl GzipCodec {
    /// Codec writing at `level` (0 to 9)
    pub fn new(level: u32) -> Self {
        GzipCodec { level }
    }
}

impl Default for GzipCodec {
    fn default() -> Self {
        GzipCodec::new(6)
    }
}

impl ChunkCodec for GzipCodec {
    fn compression(&self) -> Compression {
        Compression::Gzip
    }

    fn encode(&self, data: &[u8]) -> WadResult<Vec<u8>> {
        let mut encoder = GzEncoder::new(Vec::new(), flate2::Compression::new(self.level));
        encoder
            .write_all(data)
            .map_err(|e| WadError::compress(format!("gzip encoder: {e}")))?;
        encoder
            .finish()
            .map_err(|e| WadError::compress(format!("gzip encoder: {e}")))
    }

    fn decode(&self, data: &[u8], size: usize) -> WadResult<Vec<u8>> {
        read_bounded(GzDecoder::new(data), size, data.len(), "gzip")
    }
}

/// Zstd payloads, optionally split into one frame per [`ZSTD_FRAME_SIZE`] bytes
#[derive(Debug, Clone, Copy)]
pub struct ZstdCodec {
    level: i32,
    chunked: bool,
}

impl ZstdCodec {
    /// Single-frame codec
    pub fn new(level: i32) -> Self {
        ZstdCodec {
            level,
            chunked: false,
        }
    }

    /// Multi-frame codec
    pub fn chunked(level: i32) -> Self {
        ZstdCodec {
            level,
            chunked: true,
        }
    }
}

impl Default for ZstdCodec {
    fn default() -> Self {
        ZstdCodec::new(3)
    }
}

impl ChunkCodec for ZstdCodec {
    fn compression(&self) -> Compression {
        if self.chunked {
            Compression::ZstdChunked
        } else {
            Compression::Zstd
        }
    }

    fn encode(&self, data: &[u8]) -> WadResult<Vec<u8>> {
        let frames: Vec<&[u8]> = if self.chunked && !data.is_empty() {
            data.chunks(ZSTD_FRAME_SIZE).collect()
        } else {
            vec![data]
        };
        let mut out = Vec::new();
        for frame in frames {
            let compressed = zstd::stream::encode_all(frame, self.level)
                .map_err(|e| WadError::compress(format!("zstd encoder: {e}")))?;
            out.extend_from_slice(&compressed);
        }
        Ok(out)
    }

    // The streaming decoder continues across concatenated frames, so one
    // path serves both variants.
    fn decode(&self, data: &[u8], size: usize) -> WadResult<Vec<u8>> {
        let decoder = zstd::stream::read::Decoder::new(data)
            .map_err(|e| WadError::decompress(format!("zstd decode: {e}")))?;
        read_bounded(decoder, size, data.len(), "zstd decode")
    }
}

/// Codec for a compression method
pub fn codec_for(compression: Compression) -> WadResult<Box<dyn ChunkCodec>> {
    match compression {
        Compression::None => Ok(Box::new(IdentityCodec)),
        Compression::Gzip => Ok(Box::new(GzipCodec::default())),
        Compression::Zstd => Ok(Box::new(ZstdCodec::default())),
        Compression::ZstdChunked => Ok(Box::new(ZstdCodec::chunked(3))),
        Compression::Satellite => Err(WadError::UnsupportedCompression(compression)),
    }
}

/// Unpack a chunk's compressed payload, checking the declared size
pub fn decompress(chunk: &WadChunk, raw: &[u8]) -> WadResult<Vec<u8>> {
    let codec = codec_for(chunk.compression)?;
    let out = codec.decode(raw, chunk.decompressed_size as usize)?;
    if out.len() != chunk.decompressed_size as usize {
        return Err(WadError::SizeMismatch {
            path_hash: chunk.path_hash,
            expected: chunk.decompressed_size,
            actual: out.len(),
        });
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload() -> Vec<u8> {
        (0..200_000u32).map(|i| (i % 251) as u8).collect()
    }

    fn chunk_for(compression: Compression, size: usize) -> WadChunk {
        WadChunk {
            path_hash: 1,
            data_offset: 0,
            compressed_size: 0,
            decompressed_size: size as u32,
            compression,
            duplicated: false,
            sub_chunk_count: 0,
            sub_chunk_start: 0,
            checksum: 0,
        }
    }

    // Test that trait is object-safe
    fn _accepts_box_dyn_codec(_codec: Box<dyn ChunkCodec>) {}

    #[test]
    fn test_every_supported_codec_round_trips() {
        let data = payload();
        for compression in [
            Compression::None,
            Compression::Gzip,
            Compression::Zstd,
            Compression::ZstdChunked,
        ] {
            let codec = codec_for(compression).unwrap();
            assert_eq!(codec.compression(), compression);
            let packed = codec.encode(&data).unwrap();
            let chunk = chunk_for(compression, data.len());
            assert_eq!(decompress(&chunk, &packed).unwrap(), data, "{compression}");
        }
    }

    #[test]
    fn test_chunked_zstd_writes_several_frames() {
        let data = payload();
        let single = ZstdCodec::new(3).encode(&data).unwrap();
        let chunked = ZstdCodec::chunked(3).encode(&data).unwrap();
        assert_ne!(single, chunked);
        // a single-frame reader still sees every frame
        let out = ZstdCodec::new(3).decode(&chunked, data.len()).unwrap();
        assert_eq!(out, data);
    }

    #[test]
    fn test_empty_payloads() {
        for codec in [
            Box::new(IdentityCodec) as Box<dyn ChunkCodec>,
            Box::new(GzipCodec::default()),
            Box::new(ZstdCodec::chunked(1)),
        ] {
            let packed = codec.encode(&[]).unwrap();
            let chunk = chunk_for(codec.compression(), 0);
            assert!(decompress(&chunk, &packed).unwrap().is_empty());
        }
    }

    #[test]
    fn test_satellite_unsupported() {
        let chunk = chunk_for(Compression::Satellite, 4);
        assert_eq!(
            decompress(&chunk, b"abcd").unwrap_err(),
            WadError::UnsupportedCompression(Compression::Satellite)
        );
    }

    #[test]
    fn test_size_mismatch() {
        let packed = GzipCodec::default().encode(b"hello world").unwrap();

        let short = chunk_for(Compression::Gzip, 5);
        assert!(matches!(
            decompress(&short, &packed).unwrap_err(),
            WadError::SizeMismatch { actual: 6, .. }
        ));

        let long = chunk_for(Compression::Gzip, 50);
        assert!(matches!(
            decompress(&long, &packed).unwrap_err(),
            WadError::SizeMismatch {
                expected: 50,
                actual: 11,
                ..
            }
        ));
    }

    #[test]
    fn test_reservation_capped_by_input() {
        assert_eq!(initial_capacity(100, 10), 100);
        assert_eq!(initial_capacity(u32::MAX as usize, 10), 10 * MAX_RESERVE_RATIO);
        assert_eq!(initial_capacity(u32::MAX as usize, 0), MAX_RESERVE_RATIO);
    }

    #[test]
    fn test_huge_declared_size_small_payload() {
        let out = IdentityCodec.decode(b"abc", u32::MAX as usize).unwrap();
        assert_eq!(out, b"abc");
        assert!(out.capacity() <= 3 * MAX_RESERVE_RATIO);

        let chunk = chunk_for(Compression::None, u32::MAX as usize);
        assert!(matches!(
            decompress(&chunk, b"abc").unwrap_err(),
            WadError::SizeMismatch { actual: 3, .. }
        ));
    }

    #[test]
    fn test_highly_compressed_payload_still_unpacks() {
        let data = vec![0u8; 1 << 20];
        let packed = ZstdCodec::default().encode(&data).unwrap();
        assert!(packed.len() * MAX_RESERVE_RATIO < data.len());
        let chunk = chunk_for(Compression::Zstd, data.len());
        assert_eq!(decompress(&chunk, &packed).unwrap(), data);
    }

    #[test]
    fn test_garbage_stream() {
        let chunk = chunk_for(Compression::Zstd, 10);
        assert!(matches!(
            decompress(&chunk, b"definitely not zstd").unwrap_err(),
            WadError::Decompress(_)
        ));
    }
}
