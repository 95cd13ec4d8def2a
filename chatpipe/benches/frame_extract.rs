// Copyright 2026 The Chatpipe Project
// SPDX-License-Identifier: Apache-2.0

//! Throughput of the response consumer.
//!
//! Measures:
//! - Text extraction from a fragment of complete frames
//! - Pumping a full response through the store at several chunk sizes
//!
//! Run: cargo bench --bench frame_extract

use bytes::Bytes;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use chatpipe::backend::BackendError;
use chatpipe::frame::{extract_text, MalformedFramePolicy};
use chatpipe::store::MessageStore;
use chatpipe::stream::StreamPump;

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// A reply of `deltas` text frames wrapped in the usual step frames.
fn response(deltas: usize) -> String {
    let mut body = String::from("f:{\"messageId\":\"msg-bench\"}\n");
    for i in 0..deltas {
        body.push_str(&format!("0:\"token {i} 晴れ \"\n"));
    }
    body.push_str("e:{\"finishReason\":\"stop\",\"isContinued\":false}\n");
    body.push_str("d:{\"finishReason\":\"stop\"}\n");
    body
}

fn chunked(body: &str, size: usize) -> Vec<Result<Bytes, BackendError>> {
    body.as_bytes()
        .chunks(size)
        .map(|c| Ok(Bytes::copy_from_slice(c)))
        .collect()
}

// ---------------------------------------------------------------------------
// Benchmarks
// ---------------------------------------------------------------------------

fn bench_extract(c: &mut Criterion) {
    let body = response(500);
    let mut group = c.benchmark_group("extract_text");
    group.throughput(Throughput::Bytes(body.len() as u64));
    group.bench_function("500_deltas", |b| {
        b.iter(|| extract_text(black_box(&body), MalformedFramePolicy::Abort))
    });
    group.finish();
}

fn bench_pump(c: &mut Criterion) {
    let body = response(500);
    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .expect("runtime");

    let mut group = c.benchmark_group("pump");
    group.throughput(Throughput::Bytes(body.len() as u64));
    for size in [16usize, 256, 4096] {
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            b.to_async(&runtime).iter(|| {
                let chunks = chunked(&body, size);
                async move {
                    let mut store = MessageStore::new();
                    let id = store.push_assistant().expect("slot");
                    StreamPump::default()
                        .consume(tokio_stream::iter(chunks), id, &mut store)
                        .await
                        .expect("pump");
                    black_box(store);
                }
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_extract, bench_pump);
criterion_main!(benches);
