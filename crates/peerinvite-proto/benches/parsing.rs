//! Benchmarks for invite code parsing and normalization.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use peerinvite_proto::{FeedId, InviteCode, Seed};

fn benchmark_parsing(c: &mut Criterion) {
    let feed = FeedId::from_public_key(&[0x42; 32]);
    let seed = Seed::from_bytes([0x24; 32]).to_base64();
    let legacy = format!("203.0.113.5:8008:{feed}~{seed}");
    let modern = format!("ws://203.0.113.5:8989~shs:{}:{seed}", feed.key_base64());

    let mut group = c.benchmark_group("Invite Parsing");

    group.bench_function("legacy", |b| {
        b.iter(|| {
            let code: InviteCode = black_box(legacy.as_str()).parse().unwrap();
            black_box(code)
        })
    });

    group.bench_function("legacy_to_modern", |b| {
        b.iter(|| {
            let code: InviteCode = black_box(legacy.as_str()).parse().unwrap();
            black_box(code.into_modern().unwrap())
        })
    });

    group.bench_function("modern", |b| {
        b.iter(|| {
            let code: InviteCode = black_box(modern.as_str()).parse().unwrap();
            black_box(code)
        })
    });

    group.finish();
}

criterion_group!(benches, benchmark_parsing);
criterion_main!(benches);
