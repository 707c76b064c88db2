// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Criterion benchmarks for QR encoding and decoding in the certiq-codec
// crate.

use criterion::{Criterion, black_box, criterion_group, criterion_main};

use certiq_codec::{PixelBuffer, QrDecoder, QrEncoder};
use certiq_core::token::Token;

fn bench_token() -> Token {
    Token::mint(1_700_000_000_000, &[1, 2, 3, 4, 5, 6])
}

/// Benchmark rendering a token to raster + SVG.
fn bench_encode(c: &mut Criterion) {
    let encoder = QrEncoder::new();
    let token = bench_token();

    c.bench_function("qr_encode", |b| {
        b.iter(|| {
            let artifact = encoder.encode(black_box(&token)).expect("encode failed");
            black_box(artifact);
        });
    });
}

/// Benchmark the decode path on a frame that contains a code — the
/// successful end of a scan session.
fn bench_decode_hit(c: &mut Criterion) {
    let artifact = QrEncoder::new().encode(&bench_token()).expect("encode failed");
    let decoder = QrDecoder::new();

    c.bench_function("qr_decode (code present)", |b| {
        b.iter(|| {
            let outcome = decoder.decode(black_box(artifact.pixels()));
            black_box(outcome);
        });
    });
}

/// Benchmark the decode path on an empty camera-sized frame — the common
/// per-frame cost while the user is still aiming.
fn bench_decode_miss(c: &mut Criterion) {
    let frame = PixelBuffer::blank(640, 480);
    let decoder = QrDecoder::new();

    c.bench_function("qr_decode (blank 640x480)", |b| {
        b.iter(|| {
            let outcome = decoder.decode(black_box(&frame));
            black_box(outcome);
        });
    });
}

criterion_group!(benches, bench_encode, bench_decode_hit, bench_decode_miss);
criterion_main!(benches);
