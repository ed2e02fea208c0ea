//! Arena storage for decoded documents
//!
//! A [`Mempool`] owns four flat regions: string bytes, nodes, fields and
//! pairs. Allocation only ever appends, handing out indices rather than
//! references, so a region's contents never move under a holder of a
//! [`Span`] or [`NodeId`].
//!
//! Two modes exist:
//! - **sized**: built from the [`ArenaSizes`] the sizing pass computed. Every
//!   region is reserved once, exactly, and a request past its capacity fails
//!   with `Alloc` instead of growing.
//! - **growable**: used when assembling documents in memory. Regions grow on
//!   demand through fallible reservation.

use crate::node::{Field, Node, NodeId, Pair, Span, StrRef};
use riot_core::{Error, Result};

/// Slot counts for each arena region
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ArenaSizes {
    /// String payload bytes
    pub strings: usize,
    /// Node slots
    pub nodes: usize,
    /// Field slots
    pub fields: usize,
    /// Pair slots
    pub pairs: usize,
}

fn checked_add(total: &mut usize, n: usize, region: &str) -> Result<()> {
    *total = total
        .checked_add(n)
        .ok_or_else(|| Error::alloc(format!("{region} arena size overflows")))?;
    Ok(())
}

impl ArenaSizes {
    pub(crate) fn add_strings(&mut self, n: usize) -> Result<()> {
        checked_add(&mut self.strings, n, "string")
    }

    pub(crate) fn add_nodes(&mut self, n: usize) -> Result<()> {
        checked_add(&mut self.nodes, n, "node")
    }

    pub(crate) fn add_fields(&mut self, n: usize) -> Result<()> {
        checked_add(&mut self.fields, n, "field")
    }

    pub(crate) fn add_pairs(&mut self, n: usize) -> Result<()> {
        checked_add(&mut self.pairs, n, "pair")
    }

    /// Approximate heap footprint of a mempool of these sizes
    pub fn byte_footprint(&self) -> Option<usize> {
        let nodes = self.nodes.checked_mul(std::mem::size_of::<Node>())?;
        let fields = self.fields.checked_mul(std::mem::size_of::<Field>())?;
        let pairs = self.pairs.checked_mul(std::mem::size_of::<Pair>())?;
        self.strings
            .checked_add(nodes)?
            .checked_add(fields)?
            .checked_add(pairs)
    }
}

/// Owner of all arena regions of one document
#[derive(Debug, Clone, Default)]
pub struct Mempool {
    strings: Vec<u8>,
    nodes: Vec<Node>,
    fields: Vec<Field>,
    pairs: Vec<Pair>,
    capacity: Option<ArenaSizes>,
}

fn to_index(n: usize, region: &str) -> Result<u32> {
    u32::try_from(n).map_err(|_| Error::alloc(format!("{region} arena exceeds u32 indices")))
}

/// Reserve room for `n` more items, honouring a fixed capacity if present.
fn claim<T>(region: &mut Vec<T>, n: usize, cap: Option<usize>, name: &str) -> Result<u32> {
    let head = region.len();
    let end = head
        .checked_add(n)
        .ok_or_else(|| Error::alloc(format!("{name} arena size overflows")))?;
    match cap {
        Some(cap) if end > cap => {
            return Err(Error::alloc(format!(
                "{name} arena exhausted: {end} slots requested, capacity {cap}"
            )));
        }
        Some(_) => {}
        None => region.try_reserve(n)?,
    }
    to_index(end, name)?;
    to_index(head, name)
}

impl Mempool {
    /// Create an empty, growable mempool
    pub fn growable() -> Self {
        Mempool::default()
    }

    /// Create a mempool with exactly `sizes` capacity in every region
    ///
    /// # Errors
    ///
    /// Returns `Alloc` if any region cannot be reserved.
    pub fn with_capacity(sizes: ArenaSizes) -> Result<Self> {
        let mut pool = Mempool {
            capacity: Some(sizes),
            ..Mempool::default()
        };
        pool.strings.try_reserve_exact(sizes.strings)?;
        pool.nodes.try_reserve_exact(sizes.nodes)?;
        pool.fields.try_reserve_exact(sizes.fields)?;
        pool.pairs.try_reserve_exact(sizes.pairs)?;
        Ok(pool)
    }

    /// Slots handed out so far in each region
    pub fn usage(&self) -> ArenaSizes {
        ArenaSizes {
            strings: self.strings.len(),
            nodes: self.nodes.len(),
            fields: self.fields.len(),
            pairs: self.pairs.len(),
        }
    }

    /// Fixed capacity of each region; `None` for a growable mempool
    pub fn capacity(&self) -> Option<ArenaSizes> {
        self.capacity
    }

    /// True when a sized mempool has handed out every slot it reserved
    pub fn is_full(&self) -> bool {
        self.capacity == Some(self.usage())
    }

    /// Copy `bytes` into the string region
    pub fn alloc_str(&mut self, bytes: &[u8]) -> Result<StrRef> {
        let len = u16::try_from(bytes.len())
            .map_err(|_| Error::alloc(format!("string of {} bytes exceeds u16", bytes.len())))?;
        let cap = self.capacity.map(|c| c.strings);
        let start = claim(&mut self.strings, bytes.len(), cap, "string")?;
        self.strings.extend_from_slice(bytes);
        Ok(StrRef { start, len })
    }

    /// Allocate `n` node slots, initialised to [`Node::None`]
    pub fn alloc_nodes(&mut self, n: usize) -> Result<Span> {
        let cap = self.capacity.map(|c| c.nodes);
        let start = claim(&mut self.nodes, n, cap, "node")?;
        self.nodes.resize(self.nodes.len() + n, Node::None);
        Ok(Span {
            start,
            len: n as u32,
        })
    }

    /// Allocate one node slot holding `node`
    pub fn alloc_node(&mut self, node: Node) -> Result<NodeId> {
        let span = self.alloc_nodes(1)?;
        let id = span.id(0);
        self.set_node(id, node);
        Ok(id)
    }

    /// Allocate `n` field slots
    pub fn alloc_fields(&mut self, n: usize) -> Result<Span> {
        let cap = self.capacity.map(|c| c.fields);
        let start = claim(&mut self.fields, n, cap, "field")?;
        let blank = Field {
            name: 0,
            value: NodeId(0),
        };
        self.fields.resize(self.fields.len() + n, blank);
        Ok(Span {
            start,
            len: n as u32,
        })
    }

    /// Allocate `n` pair slots
    pub fn alloc_pairs(&mut self, n: usize) -> Result<Span> {
        let cap = self.capacity.map(|c| c.pairs);
        let start = claim(&mut self.pairs, n, cap, "pair")?;
        let blank = Pair {
            key: NodeId(0),
            value: NodeId(0),
        };
        self.pairs.resize(self.pairs.len() + n, blank);
        Ok(Span {
            start,
            len: n as u32,
        })
    }

    pub(crate) fn set_node(&mut self, id: NodeId, node: Node) {
        self.nodes[id.index()] = node;
    }

    pub(crate) fn set_field(&mut self, span: Span, i: usize, field: Field) {
        self.fields[span.range().start + i] = field;
    }

    pub(crate) fn set_pair(&mut self, span: Span, i: usize, pair: Pair) {
        self.pairs[span.range().start + i] = pair;
    }

    /// Node in slot `id`
    ///
    /// # Panics
    ///
    /// Panics if `id` was not allocated from this mempool.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    /// Nodes covered by `span`
    ///
    /// # Panics
    ///
    /// Panics if `span` was not allocated from this mempool.
    pub fn nodes(&self, span: Span) -> &[Node] {
        &self.nodes[span.range()]
    }

    /// Fields covered by `span`
    ///
    /// # Panics
    ///
    /// Panics if `span` was not allocated from this mempool.
    pub fn fields(&self, span: Span) -> &[Field] {
        &self.fields[span.range()]
    }

    /// Pairs covered by `span`
    ///
    /// # Panics
    ///
    /// Panics if `span` was not allocated from this mempool.
    pub fn pairs(&self, span: Span) -> &[Pair] {
        &self.pairs[span.range()]
    }

    /// Payload bytes of a string
    ///
    /// # Panics
    ///
    /// Panics if `s` was not allocated from this mempool.
    pub fn str_bytes(&self, s: StrRef) -> &[u8] {
        &self.strings[s.range()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use riot_core::ErrorKind;

    #[test]
    #[should_panic]
    fn test_foreign_node_id_panics() {
        let mut big = Mempool::growable();
        big.alloc_nodes(4).unwrap();
        let foreign = big.alloc_node(Node::U8(1)).unwrap();
        let small = Mempool::growable();
        small.node(foreign);
    }

    #[test]
    #[should_panic]
    fn test_foreign_span_panics() {
        let mut big = Mempool::growable();
        let span = big.alloc_fields(3).unwrap();
        Mempool::growable().fields(span);
    }

    #[test]
    fn test_sized_pool_fills_exactly() {
        let sizes = ArenaSizes {
            strings: 3,
            nodes: 2,
            fields: 1,
            pairs: 1,
        };
        let mut pool = Mempool::with_capacity(sizes).unwrap();
        let s = pool.alloc_str(b"abc").unwrap();
        let span = pool.alloc_nodes(2).unwrap();
        pool.set_node(span.id(0), Node::Str(s));
        pool.set_node(span.id(1), Node::U32(7));
        pool.alloc_fields(1).unwrap();
        pool.alloc_pairs(1).unwrap();

        assert!(pool.is_full());
        assert_eq!(pool.usage(), sizes);
        assert_eq!(pool.str_bytes(s), b"abc");
        assert_eq!(pool.nodes(span)[1], Node::U32(7));
    }

    #[test]
    fn test_sized_pool_rejects_overrun() {
        let sizes = ArenaSizes {
            nodes: 1,
            ..ArenaSizes::default()
        };
        let mut pool = Mempool::with_capacity(sizes).unwrap();
        pool.alloc_node(Node::Bool(true)).unwrap();
        let err = pool.alloc_node(Node::Bool(false)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Alloc);
        assert_eq!(pool.usage().nodes, 1);

        let err = pool.alloc_str(b"x").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Alloc);
    }

    #[test]
    fn test_growable_pool() {
        let mut pool = Mempool::growable();
        assert!(pool.capacity().is_none());
        let a = pool.alloc_node(Node::I8(-1)).unwrap();
        let b = pool.alloc_node(Node::I8(1)).unwrap();
        assert_eq!(a.index() + 1, b.index());
        assert_eq!(*pool.node(b), Node::I8(1));
        assert!(!pool.is_full());
    }

    #[test]
    fn test_huge_capacity_is_alloc_error() {
        let sizes = ArenaSizes {
            nodes: usize::MAX / 2,
            ..ArenaSizes::default()
        };
        let err = Mempool::with_capacity(sizes).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Alloc);
    }

    #[test]
    fn test_size_accumulation_overflow() {
        let mut sizes = ArenaSizes::default();
        sizes.add_nodes(usize::MAX).unwrap();
        assert_eq!(sizes.add_nodes(1).unwrap_err().kind(), ErrorKind::Alloc);
    }

    #[test]
    fn test_string_length_limit() {
        let mut pool = Mempool::growable();
        let long = vec![b'a'; u16::MAX as usize + 1];
        assert_eq!(pool.alloc_str(&long).unwrap_err().kind(), ErrorKind::Alloc);
    }
}
