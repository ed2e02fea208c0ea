//! Decoded node representation
//!
//! Nodes never own their children. Containers hold [`Span`]s or [`NodeId`]s
//! into the arenas of the [`Mempool`](crate::arena::Mempool) they were
//! decoded into, and strings hold a [`StrRef`] into its byte region.

use crate::kind::NodeKind;
use std::ops::Range;

/// Index of one slot in the node arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// Slot index
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A contiguous run of slots in one arena region
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub(crate) start: u32,
    pub(crate) len: u32,
}

impl Span {
    /// An empty span
    pub const EMPTY: Span = Span { start: 0, len: 0 };

    /// Number of slots
    #[inline]
    pub fn len(self) -> usize {
        self.len as usize
    }

    /// Whether the span covers no slots
    #[inline]
    pub fn is_empty(self) -> bool {
        self.len == 0
    }

    /// Slot indices covered by this span
    #[inline]
    pub fn range(self) -> Range<usize> {
        self.start as usize..self.start as usize + self.len as usize
    }

    /// Node id of the `i`th slot
    #[inline]
    pub fn id(self, i: usize) -> NodeId {
        debug_assert!(i < self.len());
        NodeId(self.start + i as u32)
    }
}

/// Location of a string payload in the byte region
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StrRef {
    pub(crate) start: u32,
    pub(crate) len: u16,
}

impl StrRef {
    /// Payload length in bytes
    #[inline]
    pub fn len(self) -> usize {
        self.len as usize
    }

    /// Whether the payload is empty
    #[inline]
    pub fn is_empty(self) -> bool {
        self.len == 0
    }

    #[inline]
    pub(crate) fn range(self) -> Range<usize> {
        self.start as usize..self.start as usize + self.len as usize
    }
}

/// Homogeneous sequence; `items` are node slots
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ListNode {
    /// Kind of every item
    pub elem: NodeKind,
    /// Item slots
    pub items: Span,
}

/// Named field collection of a pointer or embed; `fields` are field slots
///
/// A name hash of zero is a null pointer and always has no fields.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldList {
    /// Class name hash
    pub name: u32,
    /// Field slots
    pub fields: Span,
}

impl FieldList {
    /// The null pointer
    pub const NULL: FieldList = FieldList {
        name: 0,
        fields: Span::EMPTY,
    };

    /// Whether this is the null pointer
    #[inline]
    pub fn is_null(&self) -> bool {
        self.name == 0
    }
}

/// Zero-or-one value of a declared kind
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OptionNode {
    /// Declared kind of the value
    pub elem: NodeKind,
    /// The value, if present
    pub value: Option<NodeId>,
}

/// Key/value sequence; `pairs` are pair slots
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapNode {
    /// Kind of every key
    pub key: NodeKind,
    /// Kind of every value
    pub value: NodeKind,
    /// Pair slots
    pub pairs: Span,
}

/// One decoded value
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Node {
    /// Placeholder of an unfilled slot; never produced from input bytes
    None,
    /// Boolean stored as one byte
    Bool(bool),
    /// Signed 8-bit integer
    I8(i8),
    /// Unsigned 8-bit integer
    U8(u8),
    /// Signed 16-bit integer
    I16(i16),
    /// Unsigned 16-bit integer
    U16(u16),
    /// Signed 32-bit integer
    I32(i32),
    /// Unsigned 32-bit integer
    U32(u32),
    /// Signed 64-bit integer
    I64(i64),
    /// Unsigned 64-bit integer
    U64(u64),
    /// 32-bit float
    F32(f32),
    /// Two floats
    Vec2([f32; 2]),
    /// Three floats
    Vec3([f32; 3]),
    /// Four floats
    Vec4([f32; 4]),
    /// Row-major 4x4 float matrix
    Mat4([f32; 16]),
    /// Color as red, green, blue, alpha bytes
    Rgba([u8; 4]),
    /// Length-prefixed byte string
    Str(StrRef),
    /// FNV-1a name hash
    Hash(u32),
    /// XXH64 hash of a file path
    File(u64),
    /// Hash naming another entry
    Link(u32),
    /// Boolean flag stored as one byte
    Flag(bool),
    /// Homogeneous list
    List(ListNode),
    /// Second list tag, same layout as `List`
    List2(ListNode),
    /// Nullable named field collection
    Pointer(FieldList),
    /// Inline named field collection
    Embed(FieldList),
    /// Zero or one value
    Option(OptionNode),
    /// Key/value map
    Map(MapNode),
}

impl Node {
    /// Tag this node is encoded with
    pub fn kind(&self) -> NodeKind {
        match self {
            Node::None => NodeKind::None,
            Node::Bool(_) => NodeKind::Bool,
            Node::I8(_) => NodeKind::I8,
            Node::U8(_) => NodeKind::U8,
            Node::I16(_) => NodeKind::I16,
            Node::U16(_) => NodeKind::U16,
            Node::I32(_) => NodeKind::I32,
            Node::U32(_) => NodeKind::U32,
            Node::I64(_) => NodeKind::I64,
            Node::U64(_) => NodeKind::U64,
            Node::F32(_) => NodeKind::F32,
            Node::Vec2(_) => NodeKind::Vec2,
            Node::Vec3(_) => NodeKind::Vec3,
            Node::Vec4(_) => NodeKind::Vec4,
            Node::Mat4(_) => NodeKind::Mat4,
            Node::Rgba(_) => NodeKind::Rgba,
            Node::Str(_) => NodeKind::Str,
            Node::Hash(_) => NodeKind::Hash,
            Node::File(_) => NodeKind::File,
            Node::Link(_) => NodeKind::Link,
            Node::Flag(_) => NodeKind::Flag,
            Node::List(_) => NodeKind::List,
            Node::List2(_) => NodeKind::List2,
            Node::Pointer(_) => NodeKind::Pointer,
            Node::Embed(_) => NodeKind::Embed,
            Node::Option(_) => NodeKind::Option,
            Node::Map(_) => NodeKind::Map,
        }
    }

    /// List payload of a `List` or `List2` node
    pub fn as_list(&self) -> Option<&ListNode> {
        match self {
            Node::List(l) | Node::List2(l) => Some(l),
            _ => None,
        }
    }

    /// Field list of a `Pointer` or `Embed` node
    pub fn as_field_list(&self) -> Option<&FieldList> {
        match self {
            Node::Pointer(f) | Node::Embed(f) => Some(f),
            _ => None,
        }
    }

    /// Payload of a `Map` node
    pub fn as_map(&self) -> Option<&MapNode> {
        match self {
            Node::Map(m) => Some(m),
            _ => None,
        }
    }

    /// Payload of an `Option` node
    pub fn as_option(&self) -> Option<&OptionNode> {
        match self {
            Node::Option(o) => Some(o),
            _ => None,
        }
    }

    /// 32-bit value of a `Hash` or `Link` node
    pub fn as_hash(&self) -> Option<u32> {
        match self {
            Node::Hash(h) | Node::Link(h) => Some(*h),
            _ => None,
        }
    }

    /// Value of a `U32` node
    pub fn as_u32(&self) -> Option<u32> {
        match self {
            Node::U32(v) => Some(*v),
            _ => None,
        }
    }

    /// String location of a `Str` node
    pub fn as_str_ref(&self) -> Option<StrRef> {
        match self {
            Node::Str(s) => Some(*s),
            _ => None,
        }
    }
}

/// Named value inside a pointer or embed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    /// Field name hash
    pub name: u32,
    /// Slot of the value
    pub value: NodeId,
}

/// Key/value entry of a map
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pair {
    /// Slot of the key
    pub key: NodeId,
    /// Slot of the value
    pub value: NodeId,
}
