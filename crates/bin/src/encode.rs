//! Encoding pass
//!
//! Serializes a [`Document`] back to bytes. Every sized container writes a
//! placeholder for its size field, writes its body, then patches the field
//! with the byte count actually written, so size prefixes are exact at any
//! depth. The tree is re-validated on the way: a tree the decoder would
//! reject is refused here with `Corrupt`.

use crate::document::{Document, PATCH_CLASS, PATCH_PATH_FIELD, PATCH_VALUE_FIELD};
use crate::kind::NodeKind;
use crate::node::{Field, FieldList, ListNode, MapNode, Node, OptionNode};
use crate::walk::{PATCH_MAGIC, PROP_MAGIC};
use riot_core::{ByteWriter, Error, Result};
use tracing::debug;

/// Writes a document's tree into a [`ByteWriter`]
pub struct Encoder<'d> {
    doc: &'d Document,
    out: ByteWriter,
}

impl<'d> Encoder<'d> {
    /// Create an encoder for `doc`
    pub fn new(doc: &'d Document) -> Self {
        Encoder {
            doc,
            out: ByteWriter::new(),
        }
    }

    /// Bytes written so far
    pub fn as_bytes(&self) -> &[u8] {
        self.out.as_slice()
    }

    fn invalid(&self, reason: impl Into<String>) -> Error {
        Error::corrupt(self.out.position(), reason)
    }

    fn expect_kind(&self, node: &Node, kind: NodeKind, what: &str) -> Result<()> {
        if node.kind() != kind {
            return Err(self.invalid(format!(
                "{what} declares {kind} but holds {}",
                node.kind()
            )));
        }
        Ok(())
    }

    /// Encode one node (without its type tag)
    pub fn write_node(&mut self, node: &Node) -> Result<()> {
        match node {
            Node::None => Err(self.invalid("cannot encode a value of type none")),
            Node::Bool(v) | Node::Flag(v) => self.out.write_u8(*v as u8),
            Node::I8(v) => self.out.write_i8(*v),
            Node::U8(v) => self.out.write_u8(*v),
            Node::I16(v) => self.out.write_i16(*v),
            Node::U16(v) => self.out.write_u16(*v),
            Node::I32(v) => self.out.write_i32(*v),
            Node::U32(v) | Node::Hash(v) | Node::Link(v) => self.out.write_u32(*v),
            Node::I64(v) => self.out.write_i64(*v),
            Node::U64(v) | Node::File(v) => self.out.write_u64(*v),
            Node::F32(v) => self.out.write_f32(*v),
            Node::Vec2(v) => self.out.write_f32_slice(v),
            Node::Vec3(v) => self.out.write_f32_slice(v),
            Node::Vec4(v) => self.out.write_f32_slice(v),
            Node::Mat4(v) => self.out.write_f32_slice(v),
            Node::Rgba(v) => self.out.push(v),
            Node::Str(s) => {
                let bytes = self.doc.str_bytes(*s);
                self.write_str(bytes)
            }
            Node::List(list) | Node::List2(list) => self.write_list(list),
            Node::Pointer(fields) | Node::Embed(fields) => self.write_field_list(fields),
            Node::Option(option) => self.write_option(option),
            Node::Map(map) => self.write_map(map),
        }
    }

    fn write_str(&mut self, bytes: &[u8]) -> Result<()> {
        let len = u16::try_from(bytes.len())
            .map_err(|_| self.invalid(format!("string of {} bytes exceeds u16", bytes.len())))?;
        self.out.write_u16(len)?;
        self.out.push(bytes)
    }

    fn write_list(&mut self, list: &ListNode) -> Result<()> {
        if list.elem.is_container() {
            return Err(self.invalid(format!("list cannot contain {}", list.elem)));
        }
        let items = self.doc.list_items(list);
        self.out.write_u8(list.elem.to_raw())?;
        let size_at = self.out.reserve_u32()?;
        self.out.write_u32(items.len() as u32)?;
        for item in items {
            self.expect_kind(item, list.elem, "list")?;
            self.write_node(item)?;
        }
        self.out.patch_span(size_at)
    }

    fn write_fields(&mut self, fields: &[Field]) -> Result<()> {
        for field in fields {
            let value = self.doc.node(field.value);
            self.out.write_u32(field.name)?;
            self.out.write_u8(value.kind().to_raw())?;
            self.write_node(value)?;
        }
        Ok(())
    }

    fn field_count(&self, fields: &[Field]) -> Result<u16> {
        u16::try_from(fields.len())
            .map_err(|_| self.invalid(format!("{} fields exceed u16", fields.len())))
    }

    fn write_field_list(&mut self, list: &FieldList) -> Result<()> {
        let fields = self.doc.fields(list);
        self.out.write_u32(list.name)?;
        if list.is_null() {
            if !fields.is_empty() {
                return Err(self.invalid("null pointer with fields"));
            }
            return Ok(());
        }
        let count = self.field_count(fields)?;
        let size_at = self.out.reserve_u32()?;
        self.out.write_u16(count)?;
        self.write_fields(fields)?;
        self.out.patch_span(size_at)
    }

    fn write_option(&mut self, option: &OptionNode) -> Result<()> {
        if option.elem.is_container() {
            return Err(self.invalid(format!("option cannot contain {}", option.elem)));
        }
        self.out.write_u8(option.elem.to_raw())?;
        match option.value {
            None => self.out.write_u8(0),
            Some(id) => {
                let value = self.doc.node(id);
                self.expect_kind(value, option.elem, "option")?;
                self.out.write_u8(1)?;
                self.write_node(value)
            }
        }
    }

    fn write_map(&mut self, map: &MapNode) -> Result<()> {
        if !map.key.is_primitive() {
            return Err(self.invalid(format!("map keys must be primitive, found {}", map.key)));
        }
        if map.value.is_container() {
            return Err(self.invalid(format!("map values cannot be {}", map.value)));
        }
        let pairs = self.doc.pairs(map);
        self.out.write_u8(map.key.to_raw())?;
        self.out.write_u8(map.value.to_raw())?;
        let size_at = self.out.reserve_u32()?;
        self.out.write_u32(pairs.len() as u32)?;
        for pair in pairs {
            let (key, value) = (self.doc.node(pair.key), self.doc.node(pair.value));
            self.expect_kind(key, map.key, "map key")?;
            self.expect_kind(value, map.value, "map value")?;
            self.write_node(key)?;
            self.write_node(value)?;
        }
        self.out.patch_span(size_at)
    }

    fn write_linked_files(&mut self) -> Result<()> {
        let doc = self.doc;
        let items = doc.list_items(&doc.linked_files);
        self.out.write_u32(items.len() as u32)?;
        for item in items {
            self.expect_kind(item, NodeKind::Str, "linked files")?;
            self.write_node(item)?;
        }
        Ok(())
    }

    /// Key hash and embed of one entry/patch pair
    fn section_pair(&self, key: &'d Node, value: &'d Node) -> Result<(u32, &'d FieldList)> {
        let doc_key = key
            .as_hash()
            .filter(|_| key.kind() == NodeKind::Hash)
            .ok_or_else(|| self.invalid(format!("section key must be hash, found {}", key.kind())))?;
        match value {
            Node::Embed(fields) => Ok((doc_key, fields)),
            other => Err(self.invalid(format!("section value must be embed, found {}", other.kind()))),
        }
    }

    fn write_entries(&mut self) -> Result<()> {
        let doc = self.doc;
        let pairs = doc.pairs(&doc.entries);
        self.out.write_u32(pairs.len() as u32)?;
        let mut entries = Vec::new();
        entries.try_reserve_exact(pairs.len())?;
        for pair in pairs {
            let (path, embed) = self.section_pair(doc.node(pair.key), doc.node(pair.value))?;
            self.out.write_u32(embed.name)?;
            entries.push((path, embed));
        }
        for (path, embed) in entries {
            let fields = doc.fields(embed);
            let count = self.field_count(fields)?;
            let size_at = self.out.reserve_u32()?;
            self.out.write_u32(path)?;
            self.out.write_u16(count)?;
            self.write_fields(fields)?;
            self.out.patch_span(size_at)?;
        }
        Ok(())
    }

    fn write_patches(&mut self) -> Result<()> {
        let doc = self.doc;
        let pairs = doc.pairs(&doc.patches);
        self.out.write_u32(pairs.len() as u32)?;
        for pair in pairs {
            let (target, embed) = self.section_pair(doc.node(pair.key), doc.node(pair.value))?;
            if embed.name != PATCH_CLASS {
                return Err(self.invalid(format!(
                    "patch embed has class {:#010x}, expected {PATCH_CLASS:#010x}",
                    embed.name
                )));
            }
            let (path, value) = match doc.fields(embed) {
                [path, value]
                    if path.name == PATCH_PATH_FIELD && value.name == PATCH_VALUE_FIELD =>
                {
                    (doc.node(path.value), doc.node(value.value))
                }
                fields => {
                    return Err(self.invalid(format!(
                        "patch embed must hold exactly a path and a value field, found {} fields",
                        fields.len()
                    )))
                }
            };
            self.expect_kind(path, NodeKind::Str, "patch path")?;

            self.out.write_u32(target)?;
            let size_at = self.out.reserve_u32()?;
            self.out.write_u8(value.kind().to_raw())?;
            self.write_node(path)?;
            self.write_node(value)?;
            self.out.patch_span(size_at)?;
        }
        Ok(())
    }

    /// Encode the whole document and return the bytes
    pub fn encode_document(mut self) -> Result<Vec<u8>> {
        let doc = self.doc;
        if let Some(header) = doc.patch_header {
            self.out.push(&PATCH_MAGIC)?;
            self.out.push(&header)?;
        }
        self.out.push(&PROP_MAGIC)?;
        self.out.write_u32(doc.version)?;

        if doc.has_linked_files() {
            self.write_linked_files()?;
        } else if !doc.list_items(&doc.linked_files).is_empty() {
            return Err(self.invalid(format!(
                "version {} cannot carry linked files",
                doc.version
            )));
        }

        self.write_entries()?;

        if doc.has_patches() {
            self.write_patches()?;
        } else if doc.patch_count() != 0 {
            return Err(self.invalid("patches require version 3 and a patch header"));
        }

        debug!(
            version = doc.version,
            entries = doc.entry_count(),
            len = self.out.position(),
            "encoded document"
        );
        Ok(self.out.into_inner())
    }
}

/// Encode `doc` to bytes
pub fn encode_document(doc: &Document) -> Result<Vec<u8>> {
    Encoder::new(doc).encode_document()
}
