//! Text rendering of documents
//!
//! ```text
//! type: string = "PROP"
//! version: u32 = 3
//! linked: list[string] = {
//!   "common.bin"
//! }
//! entries: map[hash,embed] = {
//!   0x1a2b3c4d = 0x5e6f7a8b {
//!     0x00000001: list[u32] = {
//!       1
//!       2
//!     }
//!   }
//! }
//! patches: map[none,none] = {}
//! ```

use crate::document::Document;
use crate::node::{Field, Node};
use std::fmt::{self, Write};

const INDENT: &str = "  ";

/// `Display` adapter for a [`Document`]
pub struct DocumentDisplay<'a> {
    doc: &'a Document,
}

impl<'a> DocumentDisplay<'a> {
    /// Wrap `doc` for printing
    pub fn new(doc: &'a Document) -> Self {
        DocumentDisplay { doc }
    }
}

impl fmt::Display for DocumentDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let p = Printer { doc: self.doc };
        for (name, node) in self.doc.sections() {
            write!(f, "{name}: {} = ", p.type_label(&node))?;
            p.value(f, &node, 0)?;
            f.write_char('\n')?;
        }
        Ok(())
    }
}

/// `Display` adapter for a single node of a [`Document`]
pub struct NodeDisplay<'a> {
    doc: &'a Document,
    node: &'a Node,
}

impl<'a> NodeDisplay<'a> {
    /// Wrap `node`, resolving its children through `doc`
    pub fn new(doc: &'a Document, node: &'a Node) -> Self {
        NodeDisplay { doc, node }
    }
}

impl fmt::Display for NodeDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Printer { doc: self.doc }.value(f, self.node, 0)
    }
}

struct Printer<'a> {
    doc: &'a Document,
}

fn indent(f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
    for _ in 0..depth {
        f.write_str(INDENT)?;
    }
    Ok(())
}

fn floats(f: &mut fmt::Formatter<'_>, vs: &[f32]) -> fmt::Result {
    f.write_str("{ ")?;
    for (i, v) in vs.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{v}")?;
    }
    f.write_str(" }")
}

impl Printer<'_> {
    fn type_label(&self, node: &Node) -> String {
        match node {
            Node::List(l) => format!("list[{}]", l.elem),
            Node::List2(l) => format!("list2[{}]", l.elem),
            Node::Option(o) => format!("option[{}]", o.elem),
            Node::Map(m) => format!("map[{},{}]", m.key, m.value),
            other => other.kind().to_string(),
        }
    }

    fn value(&self, f: &mut fmt::Formatter<'_>, node: &Node, depth: usize) -> fmt::Result {
        match node {
            Node::None => f.write_str("null"),
            Node::Bool(v) | Node::Flag(v) => write!(f, "{v}"),
            Node::I8(v) => write!(f, "{v}"),
            Node::U8(v) => write!(f, "{v}"),
            Node::I16(v) => write!(f, "{v}"),
            Node::U16(v) => write!(f, "{v}"),
            Node::I32(v) => write!(f, "{v}"),
            Node::U32(v) => write!(f, "{v}"),
            Node::I64(v) => write!(f, "{v}"),
            Node::U64(v) => write!(f, "{v}"),
            Node::F32(v) => write!(f, "{v}"),
            Node::Vec2(v) => floats(f, v),
            Node::Vec3(v) => floats(f, v),
            Node::Vec4(v) => floats(f, v),
            Node::Mat4(v) => floats(f, v),
            Node::Rgba([r, g, b, a]) => write!(f, "{{ {r}, {g}, {b}, {a} }}"),
            Node::Str(s) => {
                let text = String::from_utf8_lossy(self.doc.str_bytes(*s));
                write!(f, "\"{}\"", text.escape_debug())
            }
            Node::Hash(h) | Node::Link(h) => write!(f, "{h:#010x}"),
            Node::File(h) => write!(f, "{h:#018x}"),
            Node::List(list) | Node::List2(list) => {
                let items = self.doc.list_items(list);
                self.block(f, depth, items.is_empty(), |f| {
                    for item in items {
                        indent(f, depth + 1)?;
                        self.value(f, item, depth + 1)?;
                        f.write_char('\n')?;
                    }
                    Ok(())
                })
            }
            Node::Pointer(fl) | Node::Embed(fl) => {
                if fl.is_null() {
                    return f.write_str("null");
                }
                write!(f, "{:#010x} ", fl.name)?;
                self.fields(f, self.doc.fields(fl), depth)
            }
            Node::Option(option) => {
                let value = option.value.map(|id| self.doc.node(id));
                self.block(f, depth, value.is_none(), |f| {
                    if let Some(value) = value {
                        indent(f, depth + 1)?;
                        self.value(f, value, depth + 1)?;
                        f.write_char('\n')?;
                    }
                    Ok(())
                })
            }
            Node::Map(map) => {
                let pairs = self.doc.pairs(map);
                self.block(f, depth, pairs.is_empty(), |f| {
                    for pair in pairs {
                        indent(f, depth + 1)?;
                        self.value(f, self.doc.node(pair.key), depth + 1)?;
                        f.write_str(" = ")?;
                        self.value(f, self.doc.node(pair.value), depth + 1)?;
                        f.write_char('\n')?;
                    }
                    Ok(())
                })
            }
        }
    }

    fn fields(&self, f: &mut fmt::Formatter<'_>, fields: &[Field], depth: usize) -> fmt::Result {
        self.block(f, depth, fields.is_empty(), |f| {
            for field in fields {
                let value = self.doc.node(field.value);
                indent(f, depth + 1)?;
                write!(f, "{:#010x}: {} = ", field.name, self.type_label(value))?;
                self.value(f, value, depth + 1)?;
                f.write_char('\n')?;
            }
            Ok(())
        })
    }

    fn block(
        &self,
        f: &mut fmt::Formatter<'_>,
        depth: usize,
        empty: bool,
        body: impl FnOnce(&mut fmt::Formatter<'_>) -> fmt::Result,
    ) -> fmt::Result {
        if empty {
            return f.write_str("{}");
        }
        f.write_str("{\n")?;
        body(f)?;
        indent(f, depth)?;
        f.write_char('}')
    }
}
