//! Benchmarks for event capture, encoding and application
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use keyreplay::session::player::apply_event;
use keyreplay::types::{ChangedRange, EventLog};
use keyreplay::{
    deserialize_events, serialize_events, KeystrokeEvent, KeystrokeRecorder, Position, TextDocument,
    TextRange,
};

/// A log that types `count` characters across lines of 40
fn typing_log(count: usize) -> EventLog {
    (0..count)
        .map(|i| {
            let line = (i / 40) as u32 + 1;
            let column = (i % 40) as u32 + 1;
            let text = if i % 40 == 39 { "\n" } else { "x" };
            KeystrokeEvent::insert(text, Position::new(line, column), i as u64 * 80)
        })
        .collect()
}

fn bench_event_classification(c: &mut Criterion) {
    let changes = [
        ChangedRange {
            range: TextRange::caret(Position::new(3, 7)),
            text: "a".to_string(),
        },
        ChangedRange {
            range: TextRange::new(Position::new(3, 7), Position::new(3, 8)),
            text: String::new(),
        },
        ChangedRange {
            range: TextRange::new(Position::new(1, 1), Position::new(4, 2)),
            text: "fn main() {}".to_string(),
        },
    ];

    c.bench_function("event_from_change", |b| {
        b.iter(|| {
            for change in &changes {
                black_box(KeystrokeEvent::from_change(black_box(change), 42));
            }
        });
    });
}

fn bench_serialization(c: &mut Criterion) {
    let mut group = c.benchmark_group("serialization");

    for size in [100, 1_000, 10_000].iter() {
        let events = typing_log(*size);
        let json = serialize_events(&events);

        group.throughput(Throughput::Elements(*size as u64));
        group.bench_with_input(BenchmarkId::new("serialize", size), &events, |b, events| {
            b.iter(|| black_box(serialize_events(black_box(events))));
        });
        group.bench_with_input(BenchmarkId::new("deserialize", size), &json, |b, json| {
            b.iter(|| black_box(deserialize_events(black_box(json))));
        });
    }

    group.finish();
}

fn bench_replay_application(c: &mut Criterion) {
    let mut group = c.benchmark_group("replay_application");

    for size in [100, 1_000, 5_000].iter() {
        let events = typing_log(*size);

        group.throughput(Throughput::Elements(*size as u64));
        group.bench_with_input(BenchmarkId::new("apply_all", size), &events, |b, events| {
            b.iter(|| {
                let mut doc = TextDocument::default();
                for event in events {
                    let _ = apply_event(&mut doc, event);
                }
                black_box(doc.line_count())
            });
        });
    }

    group.finish();
}

fn bench_recording(c: &mut Criterion) {
    let mut group = c.benchmark_group("recording");
    let size = 1_000;
    group.throughput(Throughput::Elements(size as u64));

    group.bench_function("capture_typing", |b| {
        b.iter(|| {
            let mut doc = TextDocument::default();
            let mut recorder = KeystrokeRecorder::new();
            recorder.start(&mut doc);
            for i in 0..size {
                let at = doc.end_position();
                let _ = doc.insert(at, if i % 40 == 39 { "\n" } else { "x" });
            }
            black_box(recorder.stop())
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_event_classification,
    bench_serialization,
    bench_replay_application,
    bench_recording
);
criterion_main!(benches);
