//! BIN property-tree codec
//!
//! Decoding runs in two passes over the input:
//! - [`sizing`]: walks the bytes once, validating every length prefix and
//!   counting the string bytes, nodes, fields and pairs a decode will need
//! - [`decode`]: reserves exactly that much in a [`Mempool`] and walks the
//!   bytes again, filling it without reallocating
//!
//! [`encode`] writes a [`Document`] back out, and [`builder`] assembles one
//! in memory.
//!
//! # Example
//!
//! ```ignore
//! use riot_bin::Document;
//!
//! let doc = Document::read(&bytes)?;
//! for entry in doc.entries() {
//!     println!("{:#010x}: {} fields", entry.path_hash, entry.fields.len());
//! }
//! assert_eq!(Document::read(&doc.write()?)?, doc);
//! ```

#![warn(clippy::all)]
#![warn(missing_docs)]

pub mod arena;
pub mod builder;
pub mod decode;
pub mod document;
pub mod encode;
pub mod kind;
pub mod node;
pub mod printer;
pub mod sizing;
mod walk;

pub use arena::{ArenaSizes, Mempool};
pub use builder::DocumentBuilder;
pub use decode::{decode_document, Decoder};
pub use document::{Document, Entry, Patch, PATCH_CLASS, PATCH_PATH_FIELD, PATCH_VALUE_FIELD};
pub use encode::{encode_document, Encoder};
pub use kind::{NodeKind, Shape, COMPLEX_FLAG};
pub use node::{Field, FieldList, ListNode, MapNode, Node, NodeId, OptionNode, Pair, Span, StrRef};
pub use printer::{DocumentDisplay, NodeDisplay};
pub use sizing::{size_document, Sizer};
pub use walk::{PATCH_MAGIC, PROP_MAGIC};
