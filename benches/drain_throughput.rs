//! Benchmarks for draining a backlog of frames down to the latest sample
//!
//! A game at several hundred fps can queue dozens of frames between display
//! ticks; draining them must cost little more than the copy.
//!
//! Platform: Cross-platform (in-memory scripted stream)

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use framewatch::test_utils::{ScriptedSource, legacy_sample, sample_with_frametime};
use framewatch::{DrainingReader, PacketCodec, ProtocolVersion, Sample};
use std::hint::black_box;

fn backlog(codec: PacketCodec, sample: &Sample, frames: usize) -> Vec<u8> {
    let frame = codec.encode(sample);
    frame.repeat(frames)
}

fn bench_drain(c: &mut Criterion) {
    let mut group = c.benchmark_group("drain_backlog");

    for (version, sample) in [
        (ProtocolVersion::Current, sample_with_frametime(2.5)),
        (ProtocolVersion::Legacy88, legacy_sample(2.5)),
    ] {
        let codec = PacketCodec::new(version);
        for frames in [1usize, 16, 256] {
            let bytes = backlog(codec, &sample, frames);
            group.throughput(Throughput::Bytes(bytes.len() as u64));
            group.bench_with_input(
                BenchmarkId::new(version.name(), frames),
                &bytes,
                |b, bytes| {
                    b.iter(|| {
                        let source = ScriptedSource::new(vec![bytes.clone()]);
                        let mut reader = DrainingReader::new(source, codec);
                        black_box(reader.drain())
                    });
                },
            );
        }
    }

    group.finish();
}

fn bench_split_frames(c: &mut Criterion) {
    let codec = PacketCodec::new(ProtocolVersion::Current);
    let frame = codec.encode(&sample_with_frametime(4.0));
    // After a whole first frame, the next one arrives in two reads with a
    // WouldBlock between ticks
    let (head, tail) = frame.split_at(frame.len() / 2);

    c.bench_function("drain_split_frame", |b| {
        b.iter(|| {
            let source = ScriptedSource::new(vec![
                frame.clone(),
                head.to_vec(),
                Vec::new(),
                tail.to_vec(),
            ]);
            let mut reader = DrainingReader::new(source, codec);
            let first = reader.drain();
            let second = reader.drain();
            black_box((first, second))
        });
    });
}

criterion_group!(benches, bench_drain, bench_split_frames);
criterion_main!(benches);
