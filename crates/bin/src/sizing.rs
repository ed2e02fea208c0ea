//! Sizing pass
//!
//! Walks a document without materialising anything, counting the arena slots
//! the decoding pass will need and checking every declared length on the way.
//!
//! Accounting rules (the decoding pass consumes exactly these):
//! - every value walked by [`Sizer::size_node`] takes one node slot
//! - strings add their payload length to the string region
//! - pointers/embeds add their field count, maps their pair count
//! - every entry and patch takes one pair plus two nodes (key and embed);
//!   patches also take the two fields of their synthesized embed
//! - the type section string takes four string bytes

use crate::arena::ArenaSizes;
use crate::kind::{NodeKind, Shape};
use crate::walk::{
    read_document_header, read_field_list_header, read_kind, read_list_header, read_map_header,
    read_option_header, read_section_count, split_class_hashes, SizedBody,
    MIN_ENTRY_LEN, MIN_PATCH_LEN, PROP_MAGIC,
};
use riot_core::{ByteCursor, Limits, Result};
use tracing::trace;

/// Walks input bytes and accumulates [`ArenaSizes`]
pub struct Sizer<'a> {
    cursor: ByteCursor<'a>,
    sizes: ArenaSizes,
    limits: Limits,
    depth: usize,
}

impl<'a> Sizer<'a> {
    /// Create a sizer positioned at the start of `bytes`
    pub fn new(bytes: &'a [u8], limits: Limits) -> Self {
        Sizer {
            cursor: ByteCursor::new(bytes),
            sizes: ArenaSizes::default(),
            limits,
            depth: 0,
        }
    }

    /// Sizes accumulated so far
    pub fn sizes(&self) -> ArenaSizes {
        self.sizes
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

    /// Size one value of `kind` at the cursor
    pub fn size_node(&mut self, kind: NodeKind) -> Result<()> {
        self.sizes.add_nodes(1)?;
        match kind.shape() {
            Shape::Invalid => Err(self.cursor.corrupt(format!("value of type {kind}"))),
            Shape::Fixed(n) => self.cursor.skip(n),
            Shape::Str => self.size_str(),
            Shape::List => self.nested(Self::size_list),
            Shape::FieldList => self.nested(Self::size_field_list),
            Shape::Option => self.nested(Self::size_option),
            Shape::Map => self.nested(Self::size_map),
        }
    }

    fn size_str(&mut self) -> Result<()> {
        let len = self.cursor.read_u16()? as usize;
        self.cursor.skip(len)?;
        self.sizes.add_strings(len)
    }

    fn size_list(&mut self) -> Result<()> {
        let header = read_list_header(&mut self.cursor)?;
        for _ in 0..header.count {
            self.size_node(header.elem)?;
        }
        header.body.finish(&self.cursor, "list")
    }

    fn size_fields(&mut self, count: u16) -> Result<()> {
        for _ in 0..count {
            self.cursor.skip(4)?;
            let kind = read_kind(&mut self.cursor)?;
            self.size_node(kind)?;
        }
        self.sizes.add_fields(count as usize)
    }

    fn size_field_list(&mut self) -> Result<()> {
        let Some(header) = read_field_list_header(&mut self.cursor)? else {
            return Ok(());
        };
        self.size_fields(header.count)?;
        header.body.finish(&self.cursor, "embed")
    }

    fn size_option(&mut self) -> Result<()> {
        let header = read_option_header(&mut self.cursor)?;
        if header.present {
            self.size_node(header.elem)?;
        }
        Ok(())
    }

    fn size_map(&mut self) -> Result<()> {
        let header = read_map_header(&mut self.cursor)?;
        for _ in 0..header.count {
            self.size_node(header.key)?;
            self.size_node(header.value)?;
        }
        header.body.finish(&self.cursor, "map")?;
        self.sizes.add_pairs(header.count as usize)
    }

    fn size_linked_files(&mut self) -> Result<()> {
        let min = NodeKind::Str.min_encoded_size();
        let count = read_section_count(&mut self.cursor, min, "linked files")?;
        for _ in 0..count {
            self.size_node(NodeKind::Str)?;
        }
        Ok(())
    }

    fn size_entry(&mut self) -> Result<()> {
        let body = SizedBody::read(&mut self.cursor)?;
        self.cursor.skip(4)?;
        let count = self.cursor.read_u16()?;
        self.nested(|s| s.size_fields(count))?;
        body.finish(&self.cursor, "entry")?;
        // key hash and embed
        self.sizes.add_nodes(2)?;
        self.sizes.add_pairs(1)
    }

    fn size_entries(&mut self) -> Result<()> {
        let count = read_section_count(&mut self.cursor, MIN_ENTRY_LEN, "entries")?;
        split_class_hashes(&mut self.cursor, count)?;
        for _ in 0..count {
            self.size_entry()?;
        }
        Ok(())
    }

    fn size_patch(&mut self) -> Result<()> {
        self.cursor.skip(4)?;
        let body = SizedBody::read(&mut self.cursor)?;
        let kind = read_kind(&mut self.cursor)?;
        self.nested(|s| {
            s.size_node(NodeKind::Str)?;
            s.size_node(kind)
        })?;
        body.finish(&self.cursor, "patch")?;
        self.sizes.add_nodes(2)?;
        self.sizes.add_fields(2)?;
        self.sizes.add_pairs(1)
    }

    fn size_patches(&mut self) -> Result<()> {
        let count = read_section_count(&mut self.cursor, MIN_PATCH_LEN, "patches")?;
        for _ in 0..count {
            self.size_patch()?;
        }
        Ok(())
    }

    /// Size a complete document, requiring every input byte to be consumed
    pub fn size_document(mut self) -> Result<ArenaSizes> {
        let header = read_document_header(&mut self.cursor)?;
        self.sizes.add_strings(PROP_MAGIC.len())?;
        if header.has_linked_files() {
            self.size_linked_files()?;
        }
        self.size_entries()?;
        if header.has_patches() {
            self.size_patches()?;
        }
        if !self.cursor.is_at_end() {
            return Err(self.cursor.corrupt(format!(
                "{} bytes of trailing input",
                self.cursor.remaining()
            )));
        }
        trace!(
            version = header.version,
            strings = self.sizes.strings,
            nodes = self.sizes.nodes,
            fields = self.sizes.fields,
            pairs = self.sizes.pairs,
            "sized document"
        );
        Ok(self.sizes)
    }
}

/// Compute the arena sizes needed to decode `bytes`
pub fn size_document(bytes: &[u8], limits: Limits) -> Result<ArenaSizes> {
    Sizer::new(bytes, limits).size_document()
}
