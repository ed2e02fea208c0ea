//! riotfmt - codecs for the BIN property-tree and WAD archive formats
//!
//! This crate re-exports the workspace libraries under one name:
//! - [`riot_core`]: byte cursors, errors, hashing and decode limits
//! - [`riot_bin`]: the two-pass BIN decoder, encoder, builder and printer
//! - [`riot_wad`]: WAD chunk tables and payload codecs
//!
//! # Quick Start
//!
//! ```ignore
//! use riotfmt::{Document, Wad};
//!
//! let wad = Wad::read(&archive)?;
//! let chunk = wad.find_path("data/characters/annie/annie.bin").ok_or("missing chunk")?;
//! let doc = Document::read(&Wad::read_chunk(&archive, chunk)?)?;
//! println!("{}", doc.display());
//! ```

pub use riot_bin;
pub use riot_core;
pub use riot_wad;

pub use riot_bin::{Document, DocumentBuilder, Node, NodeKind};
pub use riot_core::{fnv1a, xxh64_path, Error, ErrorKind, Limits, Result};
pub use riot_wad::{Compression, Wad, WadBuilder, WadChunk, WadError};
