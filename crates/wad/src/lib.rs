//! WAD archive chunk tables
//!
//! A WAD archive is a header, a flat table of fixed-size [`WadChunk`]
//! records, and a data segment holding each chunk's compressed payload.
//! This crate reads the table of major versions 1 through 3, slices and
//! unpacks payloads, and writes 3.1 archives.
//!
//! ```ignore
//! use riot_wad::Wad;
//!
//! let wad = Wad::read(&bytes)?;
//! if let Some(chunk) = wad.find_path("data/characters/annie/annie.bin") {
//!     let bin = Wad::read_chunk(&bytes, chunk)?;
//! }
//! let v3 = wad.write(&bytes)?;
//! ```

#![warn(clippy::all)]
#![warn(missing_docs)]

pub mod chunk;
pub mod compression;
pub mod error;
pub mod reader;
pub mod writer;

pub use chunk::{chunk_len, Compression, WadChunk, CHUNK_CHECKSUM_LEN, CHUNK_LEN, MAX_SUB_CHUNKS};
pub use compression::{
    codec_for, decompress, ChunkCodec, GzipCodec, IdentityCodec, ZstdCodec, ZSTD_FRAME_SIZE,
};
pub use error::{WadError, WadResult};
pub use reader::{Signature, TableOfContents, Wad, V3_SIGNATURE_LEN, WAD_MAGIC};
pub use writer::{WadBuilder, V3_HEADER_LEN, WRITE_VERSION};
