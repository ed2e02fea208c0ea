//! BIN codec benchmarks
//!
//! ## Benchmark Groups
//!
//! - `size_*`: sizing pass alone (validation plus arena accounting)
//! - `decode_*`: full two-pass decode into a sized mempool
//! - `encode_*`: writing a decoded document back to bytes
//!
//! Inputs are synthetic documents of N entries, each carrying a mix of
//! scalars, strings, a list and a nested embed. They are built once outside
//! the timed loops.
//!
//! ## Running
//!
//! ```bash
//! cargo bench -p riot-bin --bench codec_benchmarks
//! cargo bench -p riot-bin --bench codec_benchmarks -- "decode"
//! ```

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use riot_bin::{size_document, Document, DocumentBuilder, Node, NodeKind};
use riot_core::{fnv1a, Limits};

const ENTRY_COUNTS: [usize; 3] = [10, 100, 1000];

// =============================================================================
// Input generation, outside timed loops
// =============================================================================

fn synthetic_document(entries: usize) -> Vec<u8> {
    let mut b = DocumentBuilder::new(3);
    b.linked_file("data/shared.bin").unwrap();
    for i in 0..entries {
        let name = b.string(format!("Characters/Unit{i}")).unwrap();
        let list = b
            .list(NodeKind::U32, (0..16).map(|n| Node::U32(n * i as u32)))
            .unwrap();
        let inner = b
            .embed(
                fnv1a("Stats"),
                [
                    (fnv1a("hp"), Node::F32(600.0 + i as f32)),
                    (fnv1a("armor"), Node::F32(30.0)),
                    (fnv1a("color"), Node::Rgba([255, 128, 0, 255])),
                ],
            )
            .unwrap();
        b.entry(
            fnv1a(&format!("Characters/Unit{i}")),
            fnv1a("CharacterRecord"),
            [
                (fnv1a("name"), name),
                (fnv1a("level"), Node::U8((i % 18) as u8)),
                (fnv1a("abilities"), list),
                (fnv1a("stats"), inner),
            ],
        )
        .unwrap();
    }
    b.build().unwrap().write().unwrap()
}

// =============================================================================
// Benchmarks
// =============================================================================

fn size_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("size_document");
    for count in ENTRY_COUNTS {
        let bytes = synthetic_document(count);
        group.throughput(Throughput::Bytes(bytes.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &bytes, |b, bytes| {
            b.iter(|| size_document(black_box(bytes), Limits::default()).unwrap())
        });
    }
    group.finish();
}

fn decode_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode_document");
    for count in ENTRY_COUNTS {
        let bytes = synthetic_document(count);
        group.throughput(Throughput::Bytes(bytes.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &bytes, |b, bytes| {
            b.iter(|| Document::read(black_box(bytes)).unwrap())
        });
    }
    group.finish();
}

fn encode_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode_document");
    for count in ENTRY_COUNTS {
        let bytes = synthetic_document(count);
        let doc = Document::read(&bytes).unwrap();
        group.throughput(Throughput::Bytes(bytes.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &doc, |b, doc| {
            b.iter(|| black_box(doc).write().unwrap())
        });
    }
    group.finish();
}

criterion_group!(
    name = codec;
    config = Criterion::default().sample_size(50);
    targets = size_benchmarks, decode_benchmarks, encode_benchmarks
);
criterion_main!(codec);
