//! End-to-end conversions through the filesystem

use std::fs;

use riot_bin::{Document, DocumentBuilder, Node};
use riot_cli::{run, Mode, RunOptions};
use riot_core::fnv1a;
use riot_wad::{GzipCodec, IdentityCodec, Wad, WadBuilder, ZstdCodec};
use tempfile::TempDir;

fn sample_document() -> Document {
    let mut b = DocumentBuilder::new(3);
    b.linked_file("data/shared.bin").unwrap();
    let name = b.string("Annie").unwrap();
    let stats = b
        .list(riot_bin::NodeKind::U32, [Node::U32(1), Node::U32(2)])
        .unwrap();
    b.entry(
        fnv1a("Characters/Annie"),
        fnv1a("CharacterRecord"),
        [(fnv1a("name"), name), (fnv1a("stats"), stats)],
    )
    .unwrap();
    b.build().unwrap()
}

fn options(dir: &TempDir, mode: Mode, src: &str, dst: &str) -> RunOptions {
    RunOptions {
        mode,
        src: dir.path().join(src),
        dst: dir.path().join(dst),
        print: true,
        verify: true,
    }
}

#[test]
fn test_inibin_round_trip() {
    let dir = TempDir::new().unwrap();
    let source = sample_document().write().unwrap();
    fs::write(dir.path().join("in.bin"), &source).unwrap();

    let mut out = Vec::new();
    let report = run(&options(&dir, Mode::Inibin, "in.bin", "out.bin"), &mut out).unwrap();
    assert_eq!(report.input_len, source.len());
    assert_eq!(report.output_len, source.len());
    assert!(report.verified);

    assert_eq!(fs::read(dir.path().join("out.bin")).unwrap(), source);
    let printed = String::from_utf8(out).unwrap();
    assert!(printed.contains("\"Annie\""));
    assert!(printed.contains("data/shared.bin"));
}

#[test]
fn test_no_print() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("in.bin"), sample_document().write().unwrap()).unwrap();

    let mut opts = options(&dir, Mode::Inibin, "in.bin", "out.bin");
    opts.print = false;
    let mut out = Vec::new();
    run(&opts, &mut out).unwrap();
    assert!(out.is_empty());
}

#[test]
fn test_wad_rewritten_as_v3() {
    let dir = TempDir::new().unwrap();
    let bin = sample_document().write().unwrap();
    let mut builder = WadBuilder::new();
    builder.add("data/annie.bin", &bin, &ZstdCodec::default()).unwrap();
    builder.add("data/readme.txt", b"hello", &GzipCodec::default()).unwrap();
    builder.add("data/raw", b"raw", &IdentityCodec).unwrap();
    let source = builder.build().unwrap();
    fs::write(dir.path().join("in.wad"), &source).unwrap();

    let mut out = Vec::new();
    run(&options(&dir, Mode::Wad, "in.wad", "out.wad"), &mut out).unwrap();

    let written = fs::read(dir.path().join("out.wad")).unwrap();
    assert_eq!(written, source);
    let wad = Wad::read(&written).unwrap();
    let chunk = wad.find_path("data/annie.bin").unwrap();
    let unpacked = Wad::read_chunk(&written, chunk).unwrap();
    assert_eq!(Document::read(&unpacked).unwrap(), sample_document());

    let printed = String::from_utf8(out).unwrap();
    assert!(printed.starts_with("WAD version 3.1\nWAD chunks: 3\n"));
}

#[test]
fn test_missing_source() {
    let dir = TempDir::new().unwrap();
    let err = run(&options(&dir, Mode::Wad, "absent.wad", "out.wad"), &mut Vec::new())
        .unwrap_err();
    assert!(format!("{err:#}").contains("failed to read"));
    assert!(!dir.path().join("out.wad").exists());
}

#[test]
fn test_corrupt_source_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let mut bytes = sample_document().write().unwrap();
    bytes.truncate(bytes.len() - 1);
    fs::write(dir.path().join("in.bin"), &bytes).unwrap();

    let err = run(&options(&dir, Mode::Inibin, "in.bin", "out.bin"), &mut Vec::new())
        .unwrap_err();
    let msg = format!("{err:#}");
    assert!(msg.contains("failed to convert"));
    assert!(msg.contains("failed to decode BIN document"));
    assert!(!dir.path().join("out.bin").exists());
}

#[test]
fn test_wrong_mode_fails() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("in.bin"), sample_document().write().unwrap()).unwrap();

    let err = run(&options(&dir, Mode::Wad, "in.bin", "out.wad"), &mut Vec::new())
        .unwrap_err();
    assert!(format!("{err:#}").contains("WAD"));
}
