//! Randomised round trips of builder-assembled documents

use proptest::prelude::*;
use riot_bin::{size_document, Document, DocumentBuilder, Node, NodeKind};
use riot_core::{Limits, Result};

#[derive(Debug, Clone)]
enum Value {
    Bool(bool),
    I32(i32),
    F32(f32),
    Str(String),
    Hash(u32),
    File(u64),
    Vec3([f32; 3]),
    U32List(Vec<u32>),
    StrList2(Vec<String>),
    HashStrMap(Vec<(u32, String)>),
    Option(Option<u16>),
    Fixed(Node),
    FixedList(NodeKind, Vec<Node>),
    FixedOption(NodeKind, Option<Node>),
    FixedMap(NodeKind, NodeKind, Vec<(Node, Node)>),
    Embed(u32, Vec<(u32, Value)>),
    Pointer(Option<(u32, Vec<(u32, Value)>)>),
}

#[derive(Debug, Clone)]
struct DocShape {
    version: u32,
    patch_header: Option<[u8; 8]>,
    linked: Vec<String>,
    entries: Vec<(u32, u32, Vec<(u32, Value)>)>,
    patches: Vec<(u32, String, Value)>,
}

fn name() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9_/.]{0,12}"
}

fn finite() -> impl Strategy<Value = f32> {
    -1.0e6f32..1.0e6f32
}

/// Values of every fixed-width kind
fn fixed() -> impl Strategy<Value = Node> {
    prop_oneof![
        any::<bool>().prop_map(Node::Flag),
        any::<i8>().prop_map(Node::I8),
        any::<u8>().prop_map(Node::U8),
        any::<i16>().prop_map(Node::I16),
        any::<u16>().prop_map(Node::U16),
        any::<u32>().prop_map(Node::U32),
        any::<i64>().prop_map(Node::I64),
        any::<u64>().prop_map(Node::U64),
        prop::array::uniform2(finite()).prop_map(Node::Vec2),
        prop::array::uniform4(finite()).prop_map(Node::Vec4),
        prop::array::uniform16(finite()).prop_map(Node::Mat4),
        any::<[u8; 4]>().prop_map(Node::Rgba),
        any::<u32>().prop_map(Node::Link),
    ]
}

/// A first value fixing the kind, then more values of that kind
fn same_kind(first: Node, rest: Vec<Node>) -> (NodeKind, Vec<Node>) {
    let kind = first.kind();
    let mut items = vec![first];
    items.extend(rest.into_iter().filter(|n| n.kind() == kind));
    (kind, items)
}

fn value() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        any::<bool>().prop_map(Value::Bool),
        any::<i32>().prop_map(Value::I32),
        finite().prop_map(Value::F32),
        name().prop_map(Value::Str),
        any::<u32>().prop_map(Value::Hash),
        any::<u64>().prop_map(Value::File),
        [finite(), finite(), finite()].prop_map(Value::Vec3),
        prop::collection::vec(any::<u32>(), 0..6).prop_map(Value::U32List),
        prop::collection::vec(name(), 0..4).prop_map(Value::StrList2),
        prop::collection::vec((any::<u32>(), name()), 0..4).prop_map(Value::HashStrMap),
        prop::option::of(any::<u16>()).prop_map(Value::Option),
        fixed().prop_map(Value::Fixed),
        (fixed(), prop::collection::vec(fixed(), 0..6)).prop_map(|(first, rest)| {
            let (kind, items) = same_kind(first, rest);
            Value::FixedList(kind, items)
        }),
        (fixed(), any::<bool>()).prop_map(|(n, present)| {
            Value::FixedOption(n.kind(), present.then_some(n))
        }),
        (
            (fixed(), fixed()),
            prop::collection::vec((fixed(), fixed()), 0..4)
        )
            .prop_map(|((k, v), rest)| {
                let (key, value) = (k.kind(), v.kind());
                let mut pairs = vec![(k, v)];
                pairs.extend(
                    rest.into_iter()
                        .filter(|(a, b)| a.kind() == key && b.kind() == value),
                );
                Value::FixedMap(key, value, pairs)
            }),
    ];
    leaf.prop_recursive(3, 24, 4, |inner| {
        let fields = prop::collection::vec((any::<u32>(), inner), 0..4);
        prop_oneof![
            (1u32..=u32::MAX, fields.clone()).prop_map(|(n, f)| Value::Embed(n, f)),
            prop::option::of((1u32..=u32::MAX, fields)).prop_map(Value::Pointer),
        ]
    })
}

fn document() -> impl Strategy<Value = DocShape> {
    let fields = || prop::collection::vec((any::<u32>(), value()), 0..5);
    (
        1u32..=3,
        prop::option::of(any::<[u8; 8]>()),
        prop::collection::vec(name(), 0..3),
        prop::collection::vec((any::<u32>(), any::<u32>(), fields()), 0..4),
        prop::collection::vec((any::<u32>(), name(), value()), 0..3),
    )
        .prop_map(|(version, patch_header, mut linked, entries, mut patches)| {
            if version < 2 {
                linked.clear();
            }
            if version < 3 || patch_header.is_none() {
                patches.clear();
            }
            DocShape {
                version,
                patch_header,
                linked,
                entries,
                patches,
            }
        })
}

fn build_fields(b: &mut DocumentBuilder, fields: &[(u32, Value)]) -> Result<Vec<(u32, Node)>> {
    fields
        .iter()
        .map(|(name, v)| -> Result<(u32, Node)> { Ok((*name, build_value(b, v)?)) })
        .collect()
}

fn build_value(b: &mut DocumentBuilder, v: &Value) -> Result<Node> {
    match v {
        Value::Bool(x) => Ok(Node::Bool(*x)),
        Value::I32(x) => Ok(Node::I32(*x)),
        Value::F32(x) => Ok(Node::F32(*x)),
        Value::Str(s) => b.string(s),
        Value::Hash(h) => Ok(Node::Hash(*h)),
        Value::File(h) => Ok(Node::File(*h)),
        Value::Vec3(x) => Ok(Node::Vec3(*x)),
        Value::U32List(xs) => b.list(NodeKind::U32, xs.iter().map(|x| Node::U32(*x))),
        Value::StrList2(xs) => {
            let items = xs.iter().map(|s| b.string(s)).collect::<Result<Vec<_>>>()?;
            b.list2(NodeKind::Str, items)
        }
        Value::HashStrMap(pairs) => {
            let pairs = pairs
                .iter()
                .map(|(k, s)| -> Result<(Node, Node)> { Ok((Node::Hash(*k), b.string(s)?)) })
                .collect::<Result<Vec<_>>>()?;
            b.map(NodeKind::Hash, NodeKind::Str, pairs)
        }
        Value::Option(x) => b.option(NodeKind::U16, x.map(Node::U16)),
        Value::Fixed(n) => Ok(*n),
        Value::FixedList(kind, items) => b.list(*kind, items.iter().copied()),
        Value::FixedOption(kind, n) => b.option(*kind, *n),
        Value::FixedMap(key, value, pairs) => b.map(*key, *value, pairs.iter().copied()),
        Value::Embed(name, fields) => {
            let fields = build_fields(b, fields)?;
            b.embed(*name, fields)
        }
        Value::Pointer(None) => b.pointer(0, []),
        Value::Pointer(Some((name, fields))) => {
            let fields = build_fields(b, fields)?;
            b.pointer(*name, fields)
        }
    }
}

fn build(shape: &DocShape) -> Result<Document> {
    let mut b = DocumentBuilder::new(shape.version);
    if let Some(header) = shape.patch_header {
        b = b.with_patch_header(header);
    }
    for path in &shape.linked {
        b.linked_file(path)?;
    }
    for (path, class, fields) in &shape.entries {
        let fields = build_fields(&mut b, fields)?;
        b.entry(*path, *class, fields)?;
    }
    for (target, path, value) in &shape.patches {
        let value = build_value(&mut b, value)?;
        b.patch(*target, path, value)?;
    }
    b.build()
}

proptest! {
    #[test]
    fn decode_of_encode_is_identity(shape in document()) {
        let doc = build(&shape).unwrap();
        let bytes = doc.write().unwrap();
        let decoded = Document::read(&bytes).unwrap();
        prop_assert_eq!(&decoded, &doc);
        prop_assert_eq!(decoded.entry_count(), shape.entries.len());
        prop_assert_eq!(decoded.patch_count(), shape.patches.len());
    }

    #[test]
    fn encoding_is_canonical(shape in document()) {
        let bytes = build(&shape).unwrap().write().unwrap();
        let again = Document::read(&bytes).unwrap().write().unwrap();
        prop_assert_eq!(again, bytes);
    }

    #[test]
    fn sizing_predicts_decode_usage(shape in document()) {
        let bytes = build(&shape).unwrap().write().unwrap();
        let sizes = size_document(&bytes, Limits::default()).unwrap();
        let decoded = Document::read(&bytes).unwrap();
        prop_assert_eq!(decoded.mempool().usage(), sizes);
        prop_assert!(decoded.mempool().is_full());
    }

    #[test]
    fn arbitrary_bytes_never_panic(bytes in prop::collection::vec(any::<u8>(), 0..256)) {
        let _ = Document::read(&bytes);
        let mut prefixed = b"PROP\x03\x00\x00\x00".to_vec();
        prefixed.extend_from_slice(&bytes);
        let _ = Document::read(&prefixed);
    }
}
