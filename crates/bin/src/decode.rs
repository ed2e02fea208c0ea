//! Decoding pass
//!
//! Mirrors [`Sizer`](crate::sizing::Sizer) step for step, but materialises
//! every value into a [`Mempool`] reserved from the sizes the sizing pass
//! produced. Each value is returned to its parent, which places it in a slot
//! it allocated; `read_node` itself never claims a node slot.

use crate::arena::Mempool;
use crate::document::{Document, PATCH_CLASS, PATCH_PATH_FIELD, PATCH_VALUE_FIELD};
use crate::kind::{NodeKind, Shape};
use crate::node::{Field, FieldList, ListNode, MapNode, Node, OptionNode, Pair, Span};
use crate::sizing::size_document;
use crate::walk::{
    read_document_header, read_field_list_header, read_kind, read_list_header, read_map_header,
    read_option_header, read_section_count, split_class_hashes, SizedBody,
    MIN_ENTRY_LEN, MIN_PATCH_LEN, PATCH_MAGIC, PROP_MAGIC,
};
use riot_core::{ByteCursor, Limits, Result};
use tracing::debug;

/// Walks input bytes and fills a [`Mempool`]
pub struct Decoder<'a> {
    cursor: ByteCursor<'a>,
    pool: Mempool,
    limits: Limits,
    depth: usize,
}

impl<'a> Decoder<'a> {
    /// Create a decoder over `bytes` filling `pool`
    pub fn new(bytes: &'a [u8], pool: Mempool, limits: Limits) -> Self {
        Decoder {
            cursor: ByteCursor::new(bytes),
            pool,
            limits,
            depth: 0,
        }
    }

    /// Arenas filled so far
    pub fn pool(&self) -> &Mempool {
        &self.pool
    }

    /// Current read position
    pub fn position(&self) -> usize {
        self.cursor.position()
    }

    fn nested<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        self.depth += 1;
        if !self.limits.allows_depth(self.depth) {
            return Err(self.cursor.corrupt(format!(
                "nesting deeper than {} levels",
                self.limits.max_depth
            )));
        }
        let out = f(self);
        self.depth -= 1;
        out
    }

    /// Decode one value of `kind` at the cursor
    pub fn read_node(&mut self, kind: NodeKind) -> Result<Node> {
        match kind.shape() {
            Shape::Invalid => Err(self.cursor.corrupt(format!("value of type {kind}"))),
            Shape::Fixed(_) => self.read_fixed(kind),
            Shape::Str => {
                let len = self.cursor.read_u16()? as usize;
                let bytes = self.cursor.consume(len)?;
                Ok(Node::Str(self.pool.alloc_str(bytes)?))
            }
            Shape::List => {
                let list = self.nested(Self::read_list)?;
                Ok(match kind {
                    NodeKind::List2 => Node::List2(list),
                    _ => Node::List(list),
                })
            }
            Shape::FieldList => {
                let fields = self.nested(Self::read_field_list)?;
                Ok(match kind {
                    NodeKind::Pointer => Node::Pointer(fields),
                    _ => Node::Embed(fields),
                })
            }
            Shape::Option => Ok(Node::Option(self.nested(Self::read_option)?)),
            Shape::Map => Ok(Node::Map(self.nested(Self::read_map)?)),
        }
    }

    fn read_fixed(&mut self, kind: NodeKind) -> Result<Node> {
        let c = &mut self.cursor;
        let node = match kind {
            NodeKind::Bool => Node::Bool(c.read_u8()? != 0),
            NodeKind::Flag => Node::Flag(c.read_u8()? != 0),
            NodeKind::I8 => Node::I8(c.read_i8()?),
            NodeKind::U8 => Node::U8(c.read_u8()?),
            NodeKind::I16 => Node::I16(c.read_i16()?),
            NodeKind::U16 => Node::U16(c.read_u16()?),
            NodeKind::I32 => Node::I32(c.read_i32()?),
            NodeKind::U32 => Node::U32(c.read_u32()?),
            NodeKind::I64 => Node::I64(c.read_i64()?),
            NodeKind::U64 => Node::U64(c.read_u64()?),
            NodeKind::F32 => Node::F32(c.read_f32()?),
            NodeKind::Vec2 => Node::Vec2(c.read_f32_array()?),
            NodeKind::Vec3 => Node::Vec3(c.read_f32_array()?),
            NodeKind::Vec4 => Node::Vec4(c.read_f32_array()?),
            NodeKind::Mat4 => Node::Mat4(c.read_f32_array()?),
            NodeKind::Rgba => Node::Rgba(c.read_array()?),
            NodeKind::Hash => Node::Hash(c.read_u32()?),
            NodeKind::Link => Node::Link(c.read_u32()?),
            NodeKind::File => Node::File(c.read_u64()?),
            other => return Err(c.corrupt(format!("{other} has no fixed layout"))),
        };
        Ok(node)
    }

    fn read_list(&mut self) -> Result<ListNode> {
        let header = read_list_header(&mut self.cursor)?;
        let items = self.pool.alloc_nodes(header.count as usize)?;
        for i in 0..items.len() {
            let node = self.read_node(header.elem)?;
            self.pool.set_node(items.id(i), node);
        }
        header.body.finish(&self.cursor, "list")?;
        Ok(ListNode {
            elem: header.elem,
            items,
        })
    }

    fn read_fields(&mut self, count: u16) -> Result<Span> {
        let fields = self.pool.alloc_fields(count as usize)?;
        for i in 0..fields.len() {
            let name = self.cursor.read_u32()?;
            let kind = read_kind(&mut self.cursor)?;
            let node = self.read_node(kind)?;
            let value = self.pool.alloc_node(node)?;
            self.pool.set_field(fields, i, Field { name, value });
        }
        Ok(fields)
    }

    fn read_field_list(&mut self) -> Result<FieldList> {
        let Some(header) = read_field_list_header(&mut self.cursor)? else {
            return Ok(FieldList::NULL);
        };
        let fields = self.read_fields(header.count)?;
        header.body.finish(&self.cursor, "embed")?;
        Ok(FieldList {
            name: header.name,
            fields,
        })
    }

    fn read_option(&mut self) -> Result<OptionNode> {
        let header = read_option_header(&mut self.cursor)?;
        let value = if header.present {
            let node = self.read_node(header.elem)?;
            Some(self.pool.alloc_node(node)?)
        } else {
            None
        };
        Ok(OptionNode {
            elem: header.elem,
            value,
        })
    }

    fn read_map(&mut self) -> Result<MapNode> {
        let header = read_map_header(&mut self.cursor)?;
        let pairs = self.pool.alloc_pairs(header.count as usize)?;
        for i in 0..pairs.len() {
            let key = self.read_node(header.key)?;
            let key = self.pool.alloc_node(key)?;
            let value = self.read_node(header.value)?;
            let value = self.pool.alloc_node(value)?;
            self.pool.set_pair(pairs, i, Pair { key, value });
        }
        header.body.finish(&self.cursor, "map")?;
        Ok(MapNode {
            key: header.key,
            value: header.value,
            pairs,
        })
    }

    fn read_linked_files(&mut self) -> Result<ListNode> {
        let min = NodeKind::Str.min_encoded_size();
        let count = read_section_count(&mut self.cursor, min, "linked files")?;
        let items = self.pool.alloc_nodes(count as usize)?;
        for i in 0..items.len() {
            let node = self.read_node(NodeKind::Str)?;
            self.pool.set_node(items.id(i), node);
        }
        Ok(ListNode {
            elem: NodeKind::Str,
            items,
        })
    }

    fn read_entries(&mut self) -> Result<MapNode> {
        let count = read_section_count(&mut self.cursor, MIN_ENTRY_LEN, "entries")?;
        let mut classes = split_class_hashes(&mut self.cursor, count)?;
        let pairs = self.pool.alloc_pairs(count as usize)?;
        for i in 0..pairs.len() {
            let class = classes.read_u32()?;
            let body = SizedBody::read(&mut self.cursor)?;
            let path = self.cursor.read_u32()?;
            let field_count = self.cursor.read_u16()?;
            let fields = self.nested(|d| d.read_fields(field_count))?;
            body.finish(&self.cursor, "entry")?;

            let key = self.pool.alloc_node(Node::Hash(path))?;
            let value = self.pool.alloc_node(Node::Embed(FieldList {
                name: class,
                fields,
            }))?;
            self.pool.set_pair(pairs, i, Pair { key, value });
        }
        Ok(MapNode {
            key: NodeKind::Hash,
            value: NodeKind::Embed,
            pairs,
        })
    }

    fn read_patches(&mut self) -> Result<MapNode> {
        let count = read_section_count(&mut self.cursor, MIN_PATCH_LEN, "patches")?;
        let pairs = self.pool.alloc_pairs(count as usize)?;
        for i in 0..pairs.len() {
            let target = self.cursor.read_u32()?;
            let body = SizedBody::read(&mut self.cursor)?;
            let kind = read_kind(&mut self.cursor)?;
            let (path, value) = self.nested(|d| {
                let path = d.read_node(NodeKind::Str)?;
                let value = d.read_node(kind)?;
                Ok((path, value))
            })?;
            body.finish(&self.cursor, "patch")?;

            let path = self.pool.alloc_node(path)?;
            let value = self.pool.alloc_node(value)?;
            let fields = self.pool.alloc_fields(2)?;
            self.pool.set_field(
                fields,
                0,
                Field {
                    name: PATCH_PATH_FIELD,
                    value: path,
                },
            );
            self.pool.set_field(
                fields,
                1,
                Field {
                    name: PATCH_VALUE_FIELD,
                    value,
                },
            );
            let key = self.pool.alloc_node(Node::Hash(target))?;
            let value = self.pool.alloc_node(Node::Embed(FieldList {
                name: PATCH_CLASS,
                fields,
            }))?;
            self.pool.set_pair(pairs, i, Pair { key, value });
        }
        Ok(MapNode {
            key: NodeKind::Hash,
            value: NodeKind::Embed,
            pairs,
        })
    }

    /// Decode a complete document, requiring every input byte to be consumed
    pub fn decode_document(mut self) -> Result<Document> {
        let header = read_document_header(&mut self.cursor)?;
        debug!(
            version = header.version,
            patch = header.patch_header.is_some(),
            "decoding document"
        );
        let magic = if header.patch_header.is_some() {
            PATCH_MAGIC
        } else {
            PROP_MAGIC
        };
        let type_name = self.pool.alloc_str(&magic)?;

        let linked_files = if header.has_linked_files() {
            self.read_linked_files()?
        } else {
            ListNode {
                elem: NodeKind::None,
                items: Span::EMPTY,
            }
        };
        let entries = self.read_entries()?;
        let patches = if header.has_patches() {
            self.read_patches()?
        } else {
            MapNode {
                key: NodeKind::None,
                value: NodeKind::None,
                pairs: Span::EMPTY,
            }
        };

        if !self.cursor.is_at_end() {
            return Err(self.cursor.corrupt(format!(
                "{} bytes of trailing input",
                self.cursor.remaining()
            )));
        }

        Ok(Document {
            pool: self.pool,
            type_name,
            version: header.version,
            patch_header: header.patch_header,
            linked_files,
            entries,
            patches,
        })
    }
}

/// Decode `bytes` with both passes: size, reserve, then fill
pub fn decode_document(bytes: &[u8], limits: Limits) -> Result<Document> {
    let sizes = size_document(bytes, limits)?;
    debug!(
        len = bytes.len(),
        strings = sizes.strings,
        nodes = sizes.nodes,
        fields = sizes.fields,
        pairs = sizes.pairs,
        "arena requirements"
    );
    let pool = Mempool::with_capacity(sizes)?;
    Decoder::new(bytes, pool, limits).decode_document()
}
