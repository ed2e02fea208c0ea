//! Shared building blocks for the riotfmt codecs
//!
//! This crate holds what every format in the workspace needs:
//! - ByteCursor / ByteWriter: bounds-checked little-endian I/O over buffers
//! - Error: the Eof / Alloc / Corrupt taxonomy
//! - hash: FNV-1a and XXH64 name hashing
//! - Limits: recursion bounds for untrusted input

#![warn(clippy::all)]
#![warn(missing_docs)]

pub mod cursor;
pub mod error;
pub mod hash;
pub mod limits;

pub use cursor::{ByteCursor, ByteWriter, WRITE_CHUNK_SIZE};
pub use error::{Error, ErrorKind, Result};
pub use hash::{fnv1a, xxh64_path};
pub use limits::Limits;
