//! Top-level BIN documents
//!
//! ## Format
//!
//! ```text
//! ["PTCH" + 8 unknown bytes]         optional patch header
//! "PROP"
//! version: u32
//! [count: u32, STR * count]          linked files, version >= 2
//! count: u32, class: u32 * count,    entries
//!     (size: u32, path: u32, field_count: u16, Field * field_count) * count
//! [count: u32,                       patches, version >= 3 with patch header
//!     (path: u32, size: u32, type: u8, STR, value) * count]
//! ```
//!
//! A document exposes five sections: the type name ("PROP" or "PTCH"), the
//! version, the linked-file list, the entry map and the patch map. Absent
//! sections read as empty containers of type `none`.

use crate::arena::Mempool;
use crate::decode::decode_document;
use crate::encode::Encoder;
use crate::node::{Field, FieldList, ListNode, MapNode, Node, NodeId, Pair, StrRef};
use crate::printer::DocumentDisplay;
use crate::walk::{LINKED_FILES_VERSION, PATCHES_VERSION, PATCH_HEADER_LEN};
use riot_core::{fnv1a, Limits, Result};

/// Class hash of the embed synthesized for each patch
pub const PATCH_CLASS: u32 = fnv1a("patch");

/// Field holding a patch's target path
pub const PATCH_PATH_FIELD: u32 = fnv1a("path");

/// Field holding a patch's replacement value
pub const PATCH_VALUE_FIELD: u32 = fnv1a("value");

/// A decoded property-tree document
///
/// The document owns every arena its nodes live in; all borrowed views are
/// tied to its lifetime.
#[derive(Debug, Clone)]
pub struct Document {
    pub(crate) pool: Mempool,
    pub(crate) type_name: StrRef,
    pub(crate) version: u32,
    pub(crate) patch_header: Option<[u8; PATCH_HEADER_LEN]>,
    pub(crate) linked_files: ListNode,
    pub(crate) entries: MapNode,
    pub(crate) patches: MapNode,
}

/// One entry of the entries section
#[derive(Debug, Clone, Copy)]
pub struct Entry<'a> {
    /// Hash of the entry's path (the map key)
    pub path_hash: u32,
    /// Class hash of the entry's embed
    pub class_hash: u32,
    /// Fields of the entry's embed
    pub fields: &'a [Field],
}

/// One entry of the patches section
#[derive(Debug, Clone, Copy)]
pub struct Patch<'a> {
    /// Hash of the patched entry
    pub target: u32,
    /// Property path inside the target
    pub path: &'a [u8],
    /// Replacement value
    pub value: &'a Node,
}

impl Document {
    /// Decode a document with default limits
    pub fn read(bytes: &[u8]) -> Result<Document> {
        decode_document(bytes, Limits::default())
    }

    /// Decode a document with explicit limits
    pub fn read_with_limits(bytes: &[u8], limits: Limits) -> Result<Document> {
        decode_document(bytes, limits)
    }

    /// Encode this document
    pub fn write(&self) -> Result<Vec<u8>> {
        Encoder::new(self).encode_document()
    }

    /// Format version
    pub fn version(&self) -> u32 {
        self.version
    }

    /// True when the document carried a patch header
    pub fn is_patch(&self) -> bool {
        self.patch_header.is_some()
    }

    /// The unknown bytes following the patch magic
    pub fn patch_header(&self) -> Option<[u8; PATCH_HEADER_LEN]> {
        self.patch_header
    }

    /// "PROP" or "PTCH"
    pub fn type_name(&self) -> &[u8] {
        self.pool.str_bytes(self.type_name)
    }

    pub(crate) fn has_linked_files(&self) -> bool {
        self.version >= LINKED_FILES_VERSION
    }

    pub(crate) fn has_patches(&self) -> bool {
        self.version >= PATCHES_VERSION && self.patch_header.is_some()
    }

    /// Type section as a string node
    pub fn type_section(&self) -> Node {
        Node::Str(self.type_name)
    }

    /// Version section as a u32 node
    pub fn version_section(&self) -> Node {
        Node::U32(self.version)
    }

    /// Linked-files section as a list node
    pub fn linked_section(&self) -> Node {
        Node::List(self.linked_files)
    }

    /// Entries section as a map node
    pub fn entries_section(&self) -> Node {
        Node::Map(self.entries)
    }

    /// Patches section as a map node
    pub fn patches_section(&self) -> Node {
        Node::Map(self.patches)
    }

    /// All five sections with their display names
    pub fn sections(&self) -> [(&'static str, Node); 5] {
        [
            ("type", self.type_section()),
            ("version", self.version_section()),
            ("linked", self.linked_section()),
            ("entries", self.entries_section()),
            ("patches", self.patches_section()),
        ]
    }

    /// Paths of linked files
    pub fn linked_files(&self) -> impl Iterator<Item = &[u8]> + '_ {
        self.list_items(&self.linked_files)
            .iter()
            .filter_map(|n| n.as_str_ref())
            .map(|s| self.pool.str_bytes(s))
    }

    /// Entries in file order
    pub fn entries(&self) -> impl Iterator<Item = Entry<'_>> + '_ {
        self.pairs(&self.entries).iter().map(|pair| {
            let embed = self.node(pair.value).as_field_list().copied();
            let embed = embed.unwrap_or(FieldList::NULL);
            Entry {
                path_hash: self.node(pair.key).as_hash().unwrap_or_default(),
                class_hash: embed.name,
                fields: self.fields(&embed),
            }
        })
    }

    /// Number of entries
    pub fn entry_count(&self) -> usize {
        self.entries.pairs.len()
    }

    /// Patches in file order
    pub fn patches(&self) -> impl Iterator<Item = Patch<'_>> + '_ {
        self.pairs(&self.patches).iter().filter_map(|pair| {
            let embed = self.node(pair.value).as_field_list()?;
            let fields = self.fields(embed);
            let path = fields.iter().find(|f| f.name == PATCH_PATH_FIELD)?;
            let value = fields.iter().find(|f| f.name == PATCH_VALUE_FIELD)?;
            Some(Patch {
                target: self.node(pair.key).as_hash()?,
                path: self.pool.str_bytes(self.node(path.value).as_str_ref()?),
                value: self.node(value.value),
            })
        })
    }

    /// Number of patches
    pub fn patch_count(&self) -> usize {
        self.patches.pairs.len()
    }

    /// Node in slot `id`
    ///
    /// # Panics
    ///
    /// Panics if `id` came from another document.
    pub fn node(&self, id: NodeId) -> &Node {
        self.pool.node(id)
    }

    /// Items of a list node
    ///
    /// # Panics
    ///
    /// Panics if `list` came from another document.
    pub fn list_items(&self, list: &ListNode) -> &[Node] {
        self.pool.nodes(list.items)
    }

    /// Fields of a pointer or embed
    ///
    /// # Panics
    ///
    /// Panics if `fields` came from another document.
    pub fn fields(&self, fields: &FieldList) -> &[Field] {
        self.pool.fields(fields.fields)
    }

    /// Pairs of a map
    ///
    /// # Panics
    ///
    /// Panics if `map` came from another document.
    pub fn pairs(&self, map: &MapNode) -> &[Pair] {
        self.pool.pairs(map.pairs)
    }

    /// Payload of a string node
    ///
    /// # Panics
    ///
    /// Panics if `s` came from another document.
    pub fn str_bytes(&self, s: StrRef) -> &[u8] {
        self.pool.str_bytes(s)
    }

    /// The arenas backing this document
    pub fn mempool(&self) -> &Mempool {
        &self.pool
    }

    /// Text rendering of the whole tree
    pub fn display(&self) -> DocumentDisplay<'_> {
        DocumentDisplay::new(self)
    }

    /// Structural comparison of `a` (in this document) and `b` (in `other`)
    pub fn node_eq(&self, a: &Node, other: &Document, b: &Node) -> bool {
        match (a, b) {
            (Node::F32(x), Node::F32(y)) => x.to_bits() == y.to_bits(),
            (Node::Vec2(x), Node::Vec2(y)) => floats_eq(x, y),
            (Node::Vec3(x), Node::Vec3(y)) => floats_eq(x, y),
            (Node::Vec4(x), Node::Vec4(y)) => floats_eq(x, y),
            (Node::Mat4(x), Node::Mat4(y)) => floats_eq(x, y),
            (Node::Str(x), Node::Str(y)) => self.str_bytes(*x) == other.str_bytes(*y),
            (Node::List(x), Node::List(y)) | (Node::List2(x), Node::List2(y)) => {
                x.elem == y.elem && self.nodes_eq(self.list_items(x), other, other.list_items(y))
            }
            (Node::Pointer(x), Node::Pointer(y)) | (Node::Embed(x), Node::Embed(y)) => {
                x.name == y.name && self.fields_eq(self.fields(x), other, other.fields(y))
            }
            (Node::Option(x), Node::Option(y)) => {
                x.elem == y.elem
                    && match (x.value, y.value) {
                        (None, None) => true,
                        (Some(p), Some(q)) => self.node_eq(self.node(p), other, other.node(q)),
                        _ => false,
                    }
            }
            (Node::Map(x), Node::Map(y)) => {
                let (px, py) = (self.pairs(x), other.pairs(y));
                x.key == y.key
                    && x.value == y.value
                    && px.len() == py.len()
                    && px.iter().zip(py).all(|(p, q)| {
                        self.node_eq(self.node(p.key), other, other.node(q.key))
                            && self.node_eq(self.node(p.value), other, other.node(q.value))
                    })
            }
            _ => a == b,
        }
    }

    fn nodes_eq(&self, a: &[Node], other: &Document, b: &[Node]) -> bool {
        a.len() == b.len() && a.iter().zip(b).all(|(x, y)| self.node_eq(x, other, y))
    }

    fn fields_eq(&self, a: &[Field], other: &Document, b: &[Field]) -> bool {
        a.len() == b.len()
            && a.iter().zip(b).all(|(x, y)| {
                x.name == y.name && self.node_eq(self.node(x.value), other, other.node(y.value))
            })
    }
}

fn floats_eq(a: &[f32], b: &[f32]) -> bool {
    a.iter().zip(b).all(|(x, y)| x.to_bits() == y.to_bits())
}

/// Structural equality: same tags, values, counts and order.
///
/// Arena layout is ignored, and floats compare by bit pattern so NaN payloads
/// survive a round trip.
impl PartialEq for Document {
    fn eq(&self, other: &Document) -> bool {
        self.patch_header == other.patch_header
            && self
                .sections()
                .iter()
                .zip(other.sections().iter())
                .all(|((_, a), (_, b))| self.node_eq(a, other, b))
    }
}
