//! Node type tags
//!
//! Every value in a property tree is introduced by a one-byte tag. Tags with
//! the high bit set ([`COMPLEX_FLAG`]) are complex kinds; the rest are plain
//! values. [`NodeKind::shape`] maps each tag to the wire layout the sizing,
//! decoding and encoding walks dispatch on.
//!
//! ```text
//! 0x00 none   0x05 u16   0x0A f32    0x0F rgba   0x80 list    0x85 option
//! 0x01 bool   0x06 i32   0x0B vec2   0x10 string 0x81 list2   0x86 map
//! 0x02 i8     0x07 u32   0x0C vec3   0x11 hash   0x82 pointer 0x87 flag
//! 0x03 u8     0x08 i64   0x0D vec4   0x12 file   0x83 embed
//! 0x04 i16    0x09 u64   0x0E mtx44              0x84 link
//! ```

use std::fmt;

/// Bit distinguishing complex kinds from plain values on the wire
pub const COMPLEX_FLAG: u8 = 0x80;

/// Closed set of node kinds
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// Tag of [`Node::None`](crate::node::Node::None)
    None = 0x00,
    /// Tag of [`Node::Bool`](crate::node::Node::Bool)
    Bool = 0x01,
    /// Tag of [`Node::I8`](crate::node::Node::I8)
    I8 = 0x02,
    /// Tag of [`Node::U8`](crate::node::Node::U8)
    U8 = 0x03,
    /// Tag of [`Node::I16`](crate::node::Node::I16)
    I16 = 0x04,
    /// Tag of [`Node::U16`](crate::node::Node::U16)
    U16 = 0x05,
    /// Tag of [`Node::I32`](crate::node::Node::I32)
    I32 = 0x06,
    /// Tag of [`Node::U32`](crate::node::Node::U32)
    U32 = 0x07,
    /// Tag of [`Node::I64`](crate::node::Node::I64)
    I64 = 0x08,
    /// Tag of [`Node::U64`](crate::node::Node::U64)
    U64 = 0x09,
    /// Tag of [`Node::F32`](crate::node::Node::F32)
    F32 = 0x0A,
    /// Tag of [`Node::Vec2`](crate::node::Node::Vec2)
    Vec2 = 0x0B,
    /// Tag of [`Node::Vec3`](crate::node::Node::Vec3)
    Vec3 = 0x0C,
    /// Tag of [`Node::Vec4`](crate::node::Node::Vec4)
    Vec4 = 0x0D,
    /// Tag of [`Node::Mat4`](crate::node::Node::Mat4)
    Mat4 = 0x0E,
    /// Tag of [`Node::Rgba`](crate::node::Node::Rgba)
    Rgba = 0x0F,
    /// Tag of [`Node::Str`](crate::node::Node::Str)
    Str = 0x10,
    /// Tag of [`Node::Hash`](crate::node::Node::Hash)
    Hash = 0x11,
    /// Tag of [`Node::File`](crate::node::Node::File)
    File = 0x12,
    /// Tag of [`Node::List`](crate::node::Node::List)
    List = 0x80,
    /// Tag of [`Node::List2`](crate::node::Node::List2)
    List2 = 0x81,
    /// Tag of [`Node::Pointer`](crate::node::Node::Pointer)
    Pointer = 0x82,
    /// Tag of [`Node::Embed`](crate::node::Node::Embed)
    Embed = 0x83,
    /// Tag of [`Node::Link`](crate::node::Node::Link)
    Link = 0x84,
    /// Tag of [`Node::Option`](crate::node::Node::Option)
    Option = 0x85,
    /// Tag of [`Node::Map`](crate::node::Node::Map)
    Map = 0x86,
    /// Tag of [`Node::Flag`](crate::node::Node::Flag)
    Flag = 0x87,
}

/// Wire layout of a node kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// No encoding; a value of this kind is never valid on the wire
    Invalid,
    /// Exactly this many bytes
    Fixed(usize),
    /// u16 length, then that many bytes
    Str,
    /// elem u8, size u32, count u32, elements
    List,
    /// name u32, then size u32, count u16, fields unless the name is 0
    FieldList,
    /// elem u8, present u8, optional element
    Option,
    /// key u8, value u8, size u32, count u32, pairs
    Map,
}

impl NodeKind {
    /// Every kind, in tag order
    pub const ALL: [NodeKind; 27] = [
        NodeKind::None,
        NodeKind::Bool,
        NodeKind::I8,
        NodeKind::U8,
        NodeKind::I16,
        NodeKind::U16,
        NodeKind::I32,
        NodeKind::U32,
        NodeKind::I64,
        NodeKind::U64,
        NodeKind::F32,
        NodeKind::Vec2,
        NodeKind::Vec3,
        NodeKind::Vec4,
        NodeKind::Mat4,
        NodeKind::Rgba,
        NodeKind::Str,
        NodeKind::Hash,
        NodeKind::File,
        NodeKind::List,
        NodeKind::List2,
        NodeKind::Pointer,
        NodeKind::Embed,
        NodeKind::Link,
        NodeKind::Option,
        NodeKind::Map,
        NodeKind::Flag,
    ];

    /// Decode a tag byte; `None` for bytes outside the known set
    pub fn from_raw(raw: u8) -> Option<NodeKind> {
        let kind = match raw {
            0x00 => NodeKind::None,
            0x01 => NodeKind::Bool,
            0x02 => NodeKind::I8,
            0x03 => NodeKind::U8,
            0x04 => NodeKind::I16,
            0x05 => NodeKind::U16,
            0x06 => NodeKind::I32,
            0x07 => NodeKind::U32,
            0x08 => NodeKind::I64,
            0x09 => NodeKind::U64,
            0x0A => NodeKind::F32,
            0x0B => NodeKind::Vec2,
            0x0C => NodeKind::Vec3,
            0x0D => NodeKind::Vec4,
            0x0E => NodeKind::Mat4,
            0x0F => NodeKind::Rgba,
            0x10 => NodeKind::Str,
            0x11 => NodeKind::Hash,
            0x12 => NodeKind::File,
            0x80 => NodeKind::List,
            0x81 => NodeKind::List2,
            0x82 => NodeKind::Pointer,
            0x83 => NodeKind::Embed,
            0x84 => NodeKind::Link,
            0x85 => NodeKind::Option,
            0x86 => NodeKind::Map,
            0x87 => NodeKind::Flag,
            _ => return None,
        };
        Some(kind)
    }

    /// The on-wire tag byte
    #[inline]
    pub fn to_raw(self) -> u8 {
        self as u8
    }

    /// True when the tag carries [`COMPLEX_FLAG`]
    #[inline]
    pub fn is_complex(self) -> bool {
        self.to_raw() & COMPLEX_FLAG != 0
    }

    /// True for kinds encoded as a single self-contained value.
    ///
    /// `Link` and `Flag` carry the complex bit but encode like `Hash` and
    /// `Bool`, so they count as primitive. `None` is not primitive.
    pub fn is_primitive(self) -> bool {
        matches!(self.shape(), Shape::Fixed(_) | Shape::Str)
    }

    /// True for kinds that may not appear as list/option elements or map values
    pub fn is_container(self) -> bool {
        matches!(
            self,
            NodeKind::List | NodeKind::List2 | NodeKind::Option | NodeKind::Map
        )
    }

    /// Encoded size for kinds with a fixed layout
    pub fn fixed_size(self) -> Option<usize> {
        match self.shape() {
            Shape::Fixed(n) => Some(n),
            _ => None,
        }
    }

    /// Fewest bytes any value of this kind occupies on the wire
    ///
    /// Used to bound declared element counts before reserving slots for them.
    /// `none` never decodes; it counts as one byte so a run of them is still
    /// bounded by the input.
    pub fn min_encoded_size(self) -> usize {
        match self.shape() {
            Shape::Invalid => 1,
            Shape::Fixed(n) => n,
            Shape::Str => 2,
            // tag, size, count
            Shape::List => 9,
            // a null name
            Shape::FieldList => 4,
            // tag, absent flag
            Shape::Option => 2,
            // key tag, value tag, size, count
            Shape::Map => 10,
        }
    }

    /// Wire layout of this kind
    pub fn shape(self) -> Shape {
        match self {
            NodeKind::None => Shape::Invalid,
            NodeKind::Bool | NodeKind::I8 | NodeKind::U8 | NodeKind::Flag => Shape::Fixed(1),
            NodeKind::I16 | NodeKind::U16 => Shape::Fixed(2),
            NodeKind::I32
            | NodeKind::U32
            | NodeKind::F32
            | NodeKind::Rgba
            | NodeKind::Hash
            | NodeKind::Link => Shape::Fixed(4),
            NodeKind::I64 | NodeKind::U64 | NodeKind::Vec2 | NodeKind::File => Shape::Fixed(8),
            NodeKind::Vec3 => Shape::Fixed(12),
            NodeKind::Vec4 => Shape::Fixed(16),
            NodeKind::Mat4 => Shape::Fixed(64),
            NodeKind::Str => Shape::Str,
            NodeKind::List | NodeKind::List2 => Shape::List,
            NodeKind::Pointer | NodeKind::Embed => Shape::FieldList,
            NodeKind::Option => Shape::Option,
            NodeKind::Map => Shape::Map,
        }
    }

    /// Lower-case display name
    pub fn name(self) -> &'static str {
        match self {
            NodeKind::None => "none",
            NodeKind::Bool => "bool",
            NodeKind::I8 => "i8",
            NodeKind::U8 => "u8",
            NodeKind::I16 => "i16",
            NodeKind::U16 => "u16",
            NodeKind::I32 => "i32",
            NodeKind::U32 => "u32",
            NodeKind::I64 => "i64",
            NodeKind::U64 => "u64",
            NodeKind::F32 => "f32",
            NodeKind::Vec2 => "vec2",
            NodeKind::Vec3 => "vec3",
            NodeKind::Vec4 => "vec4",
            NodeKind::Mat4 => "mtx44",
            NodeKind::Rgba => "rgba",
            NodeKind::Str => "string",
            NodeKind::Hash => "hash",
            NodeKind::File => "file",
            NodeKind::List => "list",
            NodeKind::List2 => "list2",
            NodeKind::Pointer => "pointer",
            NodeKind::Embed => "embed",
            NodeKind::Link => "link",
            NodeKind::Option => "option",
            NodeKind::Map => "map",
            NodeKind::Flag => "flag",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
