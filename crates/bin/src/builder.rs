//! In-memory document assembly
//!
//! [`DocumentBuilder`] creates documents without going through bytes. Values
//! are built bottom-up: each constructor copies its children into the
//! builder's growable [`Mempool`] and returns the container node. The same
//! validity rules the decoder enforces apply here, reported as `Corrupt`.
//!
//! ```ignore
//! let mut b = DocumentBuilder::new(3);
//! let name = b.string("Annie")?;
//! b.entry(fnv1a("Characters/Annie"), fnv1a("CharacterRecord"), [(fnv1a("name"), name)])?;
//! let bytes = b.build()?.write()?;
//! ```

use crate::arena::Mempool;
use crate::document::{Document, PATCH_CLASS, PATCH_PATH_FIELD, PATCH_VALUE_FIELD};
use crate::kind::NodeKind;
use crate::node::{Field, FieldList, ListNode, MapNode, Node, OptionNode, Pair, Span, StrRef};
use crate::walk::{LINKED_FILES_VERSION, PATCHES_VERSION, PATCH_HEADER_LEN, PATCH_MAGIC, PROP_MAGIC};
use riot_core::{Error, Result};

fn invalid(reason: impl Into<String>) -> Error {
    Error::corrupt(0, reason)
}

/// Assembles a [`Document`] from values
#[derive(Debug, Default)]
pub struct DocumentBuilder {
    pool: Mempool,
    version: u32,
    patch_header: Option<[u8; PATCH_HEADER_LEN]>,
    linked_files: Vec<StrRef>,
    entries: Vec<(u32, FieldList)>,
    patches: Vec<(u32, StrRef, Node)>,
}

impl DocumentBuilder {
    /// Start a document of the given format version
    pub fn new(version: u32) -> Self {
        DocumentBuilder {
            pool: Mempool::growable(),
            version,
            ..DocumentBuilder::default()
        }
    }

    /// Mark the document as a patch, carrying `header` after the patch magic
    pub fn with_patch_header(mut self, header: [u8; PATCH_HEADER_LEN]) -> Self {
        self.patch_header = Some(header);
        self
    }

    /// A string node
    pub fn string(&mut self, s: impl AsRef<[u8]>) -> Result<Node> {
        Ok(Node::Str(self.pool.alloc_str(s.as_ref())?))
    }

    fn items(&mut self, elem: NodeKind, items: Vec<Node>) -> Result<ListNode> {
        if elem.is_container() {
            return Err(invalid(format!("list cannot contain {elem}")));
        }
        if let Some(bad) = items.iter().find(|n| n.kind() != elem) {
            return Err(invalid(format!("list of {elem} holds {}", bad.kind())));
        }
        let span = self.pool.alloc_nodes(items.len())?;
        for (i, item) in items.into_iter().enumerate() {
            self.pool.set_node(span.id(i), item);
        }
        Ok(ListNode { elem, items: span })
    }

    /// A `list` node of `elem` values
    pub fn list(&mut self, elem: NodeKind, items: impl IntoIterator<Item = Node>) -> Result<Node> {
        let items = items.into_iter().collect();
        Ok(Node::List(self.items(elem, items)?))
    }

    /// A `list2` node of `elem` values
    pub fn list2(&mut self, elem: NodeKind, items: impl IntoIterator<Item = Node>) -> Result<Node> {
        let items = items.into_iter().collect();
        Ok(Node::List2(self.items(elem, items)?))
    }

    fn fields(&mut self, fields: impl IntoIterator<Item = (u32, Node)>) -> Result<Span> {
        let fields: Vec<(u32, Node)> = fields.into_iter().collect();
        if fields.len() > u16::MAX as usize {
            return Err(invalid(format!("{} fields exceed u16", fields.len())));
        }
        if fields.iter().any(|(_, n)| n.kind() == NodeKind::None) {
            return Err(invalid("field of type none"));
        }
        let span = self.pool.alloc_fields(fields.len())?;
        for (i, (name, node)) in fields.into_iter().enumerate() {
            let value = self.pool.alloc_node(node)?;
            self.pool.set_field(span, i, Field { name, value });
        }
        Ok(span)
    }

    fn field_list(
        &mut self,
        name: u32,
        fields: impl IntoIterator<Item = (u32, Node)>,
    ) -> Result<FieldList> {
        let fields = self.fields(fields)?;
        if name == 0 {
            if !fields.is_empty() {
                return Err(invalid("a zero class hash cannot carry fields"));
            }
            return Ok(FieldList::NULL);
        }
        Ok(FieldList { name, fields })
    }

    /// An `embed` node of class `name`
    pub fn embed(&mut self, name: u32, fields: impl IntoIterator<Item = (u32, Node)>) -> Result<Node> {
        Ok(Node::Embed(self.field_list(name, fields)?))
    }

    /// A `pointer` node of class `name`; a zero name is the null pointer
    pub fn pointer(
        &mut self,
        name: u32,
        fields: impl IntoIterator<Item = (u32, Node)>,
    ) -> Result<Node> {
        Ok(Node::Pointer(self.field_list(name, fields)?))
    }

    /// An `option` node
    pub fn option(&mut self, elem: NodeKind, value: Option<Node>) -> Result<Node> {
        if elem.is_container() {
            return Err(invalid(format!("option cannot contain {elem}")));
        }
        let value = match value {
            Some(node) if node.kind() != elem => {
                return Err(invalid(format!("option of {elem} holds {}", node.kind())));
            }
            Some(node) => Some(self.pool.alloc_node(node)?),
            None => None,
        };
        Ok(Node::Option(OptionNode { elem, value }))
    }

    /// A `map` node
    pub fn map(
        &mut self,
        key: NodeKind,
        value: NodeKind,
        pairs: impl IntoIterator<Item = (Node, Node)>,
    ) -> Result<Node> {
        if !key.is_primitive() {
            return Err(invalid(format!("map keys must be primitive, found {key}")));
        }
        if value.is_container() {
            return Err(invalid(format!("map values cannot be {value}")));
        }
        let pairs: Vec<(Node, Node)> = pairs.into_iter().collect();
        for (k, v) in &pairs {
            if k.kind() != key || v.kind() != value {
                return Err(invalid(format!(
                    "map[{key},{value}] holds {} = {}",
                    k.kind(),
                    v.kind()
                )));
            }
        }
        let span = self.pool.alloc_pairs(pairs.len())?;
        for (i, (k, v)) in pairs.into_iter().enumerate() {
            let k = self.pool.alloc_node(k)?;
            let v = self.pool.alloc_node(v)?;
            self.pool.set_pair(span, i, Pair { key: k, value: v });
        }
        Ok(Node::Map(MapNode {
            key,
            value,
            pairs: span,
        }))
    }

    /// Append a linked file path
    pub fn linked_file(&mut self, path: impl AsRef<[u8]>) -> Result<&mut Self> {
        if self.version < LINKED_FILES_VERSION {
            return Err(invalid(format!(
                "version {} cannot carry linked files",
                self.version
            )));
        }
        let s = self.pool.alloc_str(path.as_ref())?;
        self.linked_files.push(s);
        Ok(self)
    }

    /// Append an entry keyed by `path_hash` whose embed has class `class_hash`
    pub fn entry(
        &mut self,
        path_hash: u32,
        class_hash: u32,
        fields: impl IntoIterator<Item = (u32, Node)>,
    ) -> Result<&mut Self> {
        let fields = self.fields(fields)?;
        self.entries.push((
            path_hash,
            FieldList {
                name: class_hash,
                fields,
            },
        ));
        Ok(self)
    }

    /// Append a patch replacing `path` inside entry `target` with `value`
    pub fn patch(&mut self, target: u32, path: impl AsRef<[u8]>, value: Node) -> Result<&mut Self> {
        if self.version < PATCHES_VERSION || self.patch_header.is_none() {
            return Err(invalid("patches require version 3 and a patch header"));
        }
        if value.kind() == NodeKind::None {
            return Err(invalid("patch value of type none"));
        }
        let path = self.pool.alloc_str(path.as_ref())?;
        self.patches.push((target, path, value));
        Ok(self)
    }

    /// Finish the document
    pub fn build(mut self) -> Result<Document> {
        let magic = if self.patch_header.is_some() {
            PATCH_MAGIC
        } else {
            PROP_MAGIC
        };
        let type_name = self.pool.alloc_str(&magic)?;

        let linked_elem = if self.version >= LINKED_FILES_VERSION {
            NodeKind::Str
        } else {
            NodeKind::None
        };
        let items = self.pool.alloc_nodes(self.linked_files.len())?;
        for (i, s) in self.linked_files.iter().enumerate() {
            self.pool.set_node(items.id(i), Node::Str(*s));
        }

        let pairs = self.pool.alloc_pairs(self.entries.len())?;
        for (i, (path, embed)) in self.entries.iter().enumerate() {
            let key = self.pool.alloc_node(Node::Hash(*path))?;
            let value = self.pool.alloc_node(Node::Embed(*embed))?;
            self.pool.set_pair(pairs, i, Pair { key, value });
        }
        let entries = MapNode {
            key: NodeKind::Hash,
            value: NodeKind::Embed,
            pairs,
        };

        let has_patches = self.version >= PATCHES_VERSION && self.patch_header.is_some();
        let patch_pairs = self.pool.alloc_pairs(self.patches.len())?;
        for (i, (target, path, value)) in self.patches.iter().enumerate() {
            let path = self.pool.alloc_node(Node::Str(*path))?;
            let value = self.pool.alloc_node(*value)?;
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
            let key = self.pool.alloc_node(Node::Hash(*target))?;
            let embed = self.pool.alloc_node(Node::Embed(FieldList {
                name: PATCH_CLASS,
                fields,
            }))?;
            self.pool.set_pair(patch_pairs, i, Pair { key, value: embed });
        }
        let patches = if has_patches {
            MapNode {
                key: NodeKind::Hash,
                value: NodeKind::Embed,
                pairs: patch_pairs,
            }
        } else {
            MapNode {
                key: NodeKind::None,
                value: NodeKind::None,
                pairs: Span::EMPTY,
            }
        };

        Ok(Document {
            pool: self.pool,
            type_name,
            version: self.version,
            patch_header: self.patch_header,
            linked_files: ListNode {
                elem: linked_elem,
                items,
            },
            entries,
            patches,
        })
    }
}
