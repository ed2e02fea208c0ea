//! Wire headers shared by the sizing and decoding walks
//!
//! Both walks read every header through these functions, so they enforce the
//! same tag, nesting and length rules in the same order and cannot disagree
//! about which inputs are valid.

use crate::kind::NodeKind;
use riot_core::{ByteCursor, Result};

/// Magic of an optional patch header
pub const PATCH_MAGIC: [u8; 4] = *b"PTCH";

/// Magic of the property tree proper
pub const PROP_MAGIC: [u8; 4] = *b"PROP";

/// Unknown bytes following [`PATCH_MAGIC`]
pub const PATCH_HEADER_LEN: usize = 8;

/// First version carrying the linked-files section
pub const LINKED_FILES_VERSION: u32 = 2;

/// First version carrying the patches section
pub const PATCHES_VERSION: u32 = 3;

/// Fewest bytes of a field: name, tag, one-byte value
const MIN_FIELD_LEN: usize = 6;

/// Fewest bytes of an entry: class hash, size, path, field count
pub(crate) const MIN_ENTRY_LEN: usize = 14;

/// Fewest bytes of a patch: target, size, tag, empty path, one-byte value
pub(crate) const MIN_PATCH_LEN: usize = 12;

/// Read a tag byte, rejecting unknown values
pub(crate) fn read_kind(c: &mut ByteCursor<'_>) -> Result<NodeKind> {
    let at = c.position();
    let raw = c.read_u8()?;
    NodeKind::from_raw(raw)
        .ok_or_else(|| riot_core::Error::corrupt(at, format!("unknown type tag {raw:#04x}")))
}

/// A declared byte length and where its span begins
#[derive(Debug, Clone, Copy)]
pub(crate) struct SizedBody {
    size: u32,
    start: usize,
}

impl SizedBody {
    /// Read a u32 size field; the span starts right after it
    pub(crate) fn read(c: &mut ByteCursor<'_>) -> Result<Self> {
        let size = c.read_u32()?;
        Ok(SizedBody {
            size,
            start: c.position(),
        })
    }

    /// Declared bytes not yet consumed
    pub(crate) fn left(&self, c: &ByteCursor<'_>) -> usize {
        (self.size as usize).saturating_sub(c.position() - self.start)
    }

    /// Fail with `Corrupt` unless exactly `size` bytes were consumed
    pub(crate) fn finish(self, c: &ByteCursor<'_>, what: &str) -> Result<()> {
        let consumed = c.position() - self.start;
        if consumed != self.size as usize {
            return Err(c.corrupt(format!(
                "{what}: {consumed} bytes read, {} bytes declared",
                self.size
            )));
        }
        Ok(())
    }
}

/// Fail unless `count` values of at least `min` bytes each fit in the rest
/// of the input (`Eof`) and in the rest of `body`, if any (`Corrupt`)
///
/// Runs before any slot is reserved for the values, so a declared count can
/// never claim more memory than the input could describe.
pub(crate) fn check_count(
    c: &ByteCursor<'_>,
    count: usize,
    min: usize,
    body: Option<&SizedBody>,
    what: &str,
) -> Result<()> {
    let need = count.saturating_mul(min);
    c.ensure(need)?;
    if let Some(body) = body {
        let left = body.left(c);
        if need > left {
            return Err(c.corrupt(format!(
                "{what}: {count} elements need at least {need} bytes, {left} declared"
            )));
        }
    }
    Ok(())
}

/// Read a u32 element count of an unsized section whose elements take at
/// least `min` bytes each
pub(crate) fn read_section_count(c: &mut ByteCursor<'_>, min: usize, what: &str) -> Result<u32> {
    let count = c.read_u32()?;
    check_count(c, count as usize, min, None, what)?;
    Ok(count)
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct ListHeader {
    pub elem: NodeKind,
    pub count: u32,
    pub body: SizedBody,
}

pub(crate) fn read_list_header(c: &mut ByteCursor<'_>) -> Result<ListHeader> {
    let at = c.position();
    let elem = read_kind(c)?;
    if elem.is_container() {
        return Err(riot_core::Error::corrupt(
            at,
            format!("list cannot contain container type {elem}"),
        ));
    }
    let body = SizedBody::read(c)?;
    let count = c.read_u32()?;
    check_count(c, count as usize, elem.min_encoded_size(), Some(&body), "list")?;
    Ok(ListHeader { elem, count, body })
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct OptionHeader {
    pub elem: NodeKind,
    pub present: bool,
}

pub(crate) fn read_option_header(c: &mut ByteCursor<'_>) -> Result<OptionHeader> {
    let at = c.position();
    let elem = read_kind(c)?;
    if elem.is_container() {
        return Err(riot_core::Error::corrupt(
            at,
            format!("option cannot contain container type {elem}"),
        ));
    }
    let present = c.read_u8()? != 0;
    Ok(OptionHeader { elem, present })
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct MapHeader {
    pub key: NodeKind,
    pub value: NodeKind,
    pub count: u32,
    pub body: SizedBody,
}

pub(crate) fn read_map_header(c: &mut ByteCursor<'_>) -> Result<MapHeader> {
    let at = c.position();
    let key = read_kind(c)?;
    if !key.is_primitive() {
        return Err(riot_core::Error::corrupt(
            at,
            format!("map keys must be primitive, found {key}"),
        ));
    }
    let value = read_kind(c)?;
    if value.is_container() {
        return Err(riot_core::Error::corrupt(
            at + 1,
            format!("map values must not be containers, found {value}"),
        ));
    }
    let body = SizedBody::read(c)?;
    let count = c.read_u32()?;
    let pair_len = key.min_encoded_size() + value.min_encoded_size();
    check_count(c, count as usize, pair_len, Some(&body), "map")?;
    Ok(MapHeader {
        key,
        value,
        count,
        body,
    })
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct FieldListHeader {
    pub name: u32,
    pub count: u16,
    pub body: SizedBody,
}

/// Read a pointer/embed header; `None` for a null (zero-named) one
pub(crate) fn read_field_list_header(c: &mut ByteCursor<'_>) -> Result<Option<FieldListHeader>> {
    let name = c.read_u32()?;
    if name == 0 {
        return Ok(None);
    }
    let body = SizedBody::read(c)?;
    let count = c.read_u16()?;
    check_count(c, count as usize, MIN_FIELD_LEN, Some(&body), "embed")?;
    Ok(Some(FieldListHeader { name, count, body }))
}

/// Patch header and version of a document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct DocumentHeader {
    pub patch_header: Option<[u8; PATCH_HEADER_LEN]>,
    pub version: u32,
}

impl DocumentHeader {
    pub(crate) fn has_linked_files(&self) -> bool {
        self.version >= LINKED_FILES_VERSION
    }

    pub(crate) fn has_patches(&self) -> bool {
        self.version >= PATCHES_VERSION && self.patch_header.is_some()
    }
}

pub(crate) fn read_document_header(c: &mut ByteCursor<'_>) -> Result<DocumentHeader> {
    let mut magic: [u8; 4] = c.read_array()?;
    let mut patch_header = None;
    if magic == PATCH_MAGIC {
        patch_header = Some(c.read_array()?);
        magic = c.read_array()?;
    }
    if magic != PROP_MAGIC {
        return Err(riot_core::Error::corrupt(
            c.position() - 4,
            format!("invalid magic {magic:02x?}"),
        ));
    }
    let version = c.read_u32()?;
    Ok(DocumentHeader {
        patch_header,
        version,
    })
}

/// Skip the class-hash table of the entries section, returning a cursor over it
pub(crate) fn split_class_hashes<'a>(
    c: &mut ByteCursor<'a>,
    count: u32,
) -> Result<ByteCursor<'a>> {
    let len = (count as usize)
        .checked_mul(4)
        .ok_or_else(|| riot_core::Error::alloc("entry hash table size overflows"))?;
    let table = ByteCursor::new(c.consume(len)?);
    Ok(table)
}
