//! Hand-assembled wire bytes for integration tests
//!
//! These helpers build the format directly rather than through the encoder,
//! so decoding tests do not depend on the code under test.

#![allow(dead_code)]

pub const BOOL: u8 = 0x01;
pub const U8: u8 = 0x03;
pub const U32: u8 = 0x07;
pub const F32: u8 = 0x0A;
pub const VEC3: u8 = 0x0C;
pub const STR: u8 = 0x10;
pub const HASH: u8 = 0x11;
pub const FILE: u8 = 0x12;
pub const LIST: u8 = 0x80;
pub const LIST2: u8 = 0x81;
pub const POINTER: u8 = 0x82;
pub const EMBED: u8 = 0x83;
pub const LINK: u8 = 0x84;
pub const OPTION: u8 = 0x85;
pub const MAP: u8 = 0x86;
pub const FLAG: u8 = 0x87;

/// u32 length prefix followed by `body`
pub fn sized(body: Vec<u8>) -> Vec<u8> {
    let mut out = (body.len() as u32).to_le_bytes().to_vec();
    out.extend(body);
    out
}

pub fn string(s: &str) -> Vec<u8> {
    let mut out = (s.len() as u16).to_le_bytes().to_vec();
    out.extend_from_slice(s.as_bytes());
    out
}

pub fn list(elem: u8, count: u32, items: Vec<u8>) -> Vec<u8> {
    let mut body = count.to_le_bytes().to_vec();
    body.extend(items);
    let mut out = vec![elem];
    out.extend(sized(body));
    out
}

pub fn map(key: u8, value: u8, count: u32, pairs: Vec<u8>) -> Vec<u8> {
    let mut body = count.to_le_bytes().to_vec();
    body.extend(pairs);
    let mut out = vec![key, value];
    out.extend(sized(body));
    out
}

pub fn option(elem: u8, value: Option<Vec<u8>>) -> Vec<u8> {
    match value {
        Some(v) => {
            let mut out = vec![elem, 1];
            out.extend(v);
            out
        }
        None => vec![elem, 0],
    }
}

/// (name, tag, value bytes)
pub type RawField = (u32, u8, Vec<u8>);

pub fn fields(fields: &[RawField]) -> Vec<u8> {
    let mut out = (fields.len() as u16).to_le_bytes().to_vec();
    for (name, tag, value) in fields {
        out.extend_from_slice(&name.to_le_bytes());
        out.push(*tag);
        out.extend_from_slice(value);
    }
    out
}

pub fn embed(name: u32, body: &[RawField]) -> Vec<u8> {
    let mut out = name.to_le_bytes().to_vec();
    out.extend(sized(fields(body)));
    out
}

pub fn null_pointer() -> Vec<u8> {
    vec![0, 0, 0, 0]
}

/// (path hash, class hash, fields)
pub type RawEntry = (u32, u32, Vec<RawField>);

/// (target hash, path, tag, value bytes)
pub type RawPatch = (u32, &'static str, u8, Vec<u8>);

pub struct RawDocument {
    pub patch_header: Option<[u8; 8]>,
    pub version: u32,
    pub linked: Vec<&'static str>,
    pub entries: Vec<RawEntry>,
    pub patches: Vec<RawPatch>,
}

impl RawDocument {
    pub fn new(version: u32) -> Self {
        RawDocument {
            patch_header: None,
            version,
            linked: Vec::new(),
            entries: Vec::new(),
            patches: Vec::new(),
        }
    }

    pub fn bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        if let Some(h) = self.patch_header {
            out.extend_from_slice(b"PTCH");
            out.extend_from_slice(&h);
        }
        out.extend_from_slice(b"PROP");
        out.extend_from_slice(&self.version.to_le_bytes());
        if self.version >= 2 {
            out.extend_from_slice(&(self.linked.len() as u32).to_le_bytes());
            for path in &self.linked {
                out.extend(string(path));
            }
        }
        out.extend_from_slice(&(self.entries.len() as u32).to_le_bytes());
        for (_, class, _) in &self.entries {
            out.extend_from_slice(&class.to_le_bytes());
        }
        for (path, _, body) in &self.entries {
            let mut entry = path.to_le_bytes().to_vec();
            entry.extend(fields(body));
            out.extend(sized(entry));
        }
        if self.version >= 3 && self.patch_header.is_some() {
            out.extend_from_slice(&(self.patches.len() as u32).to_le_bytes());
            for (target, path, tag, value) in &self.patches {
                out.extend_from_slice(&target.to_le_bytes());
                let mut body = vec![*tag];
                body.extend(string(path));
                body.extend_from_slice(value);
                out.extend(sized(body));
            }
        }
        out
    }
}

pub fn u32s(values: &[u32]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_le_bytes()).collect()
}

/// A document touching every node kind
pub fn kitchen_sink() -> RawDocument {
    let mut doc = RawDocument::new(3);
    doc.linked = vec!["common.bin", "shared/skins.bin"];

    let vec3: Vec<u8> = [1.0f32, -2.0, 0.5]
        .iter()
        .flat_map(|v| v.to_le_bytes())
        .collect();
    let mut hash_str = 0xDEADBEEFu32.to_le_bytes().to_vec();
    hash_str.extend(string("abc"));
    let inner = embed(0x1111, &[(1, U8, vec![9])]);
    let mut embeds = inner.clone();
    embeds.extend(embed(0x2222, &[]));

    doc.entries.push((
        0xAAAA_0001,
        0xC1A5_5001,
        vec![
            (0x01, BOOL, vec![1]),
            (0x02, U32, 5u32.to_le_bytes().to_vec()),
            (0x03, F32, 1.5f32.to_le_bytes().to_vec()),
            (0x04, VEC3, vec3),
            (0x05, STR, string("hello")),
            (0x06, HASH, 0x1234_5678u32.to_le_bytes().to_vec()),
            (0x07, FILE, 0x0102_0304_0506_0708u64.to_le_bytes().to_vec()),
            (0x08, LINK, 0x0BAD_F00Du32.to_le_bytes().to_vec()),
            (0x09, FLAG, vec![0]),
            (0x0A, LIST, list(U32, 3, u32s(&[1, 2, 3]))),
            (0x0B, LIST2, list(STR, 0, vec![])),
            (0x0C, MAP, map(HASH, STR, 1, hash_str)),
            (0x0D, POINTER, null_pointer()),
            (0x0E, POINTER, embed(0x3333, &[(2, STR, string("p"))])),
            (0x0F, EMBED, inner),
            (0x10, OPTION, option(STR, Some(string("x")))),
            (0x11, OPTION, option(U32, None)),
            (0x12, LIST, list(EMBED, 2, embeds)),
        ],
    ));
    doc.entries.push((0xAAAA_0002, 0xC1A5_5002, vec![]));
    doc
}
