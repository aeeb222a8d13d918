use criterion::{black_box, criterion_group, criterion_main, Criterion};
use hem_core::config::EngineConfig;
use hem_core::decoder::{decode, EventRecord, FrameUpdate, MatchSetup};
use hem_core::engine::StatsEngine;

fn setup_record() -> EventRecord {
    let mut setup = MatchSetup { stage_id: 32, ..Default::default() };
    setup.competitors[0].starting_stocks = 4;
    setup.competitors[1].starting_stocks = 4;
    setup.to_record()
}

fn frame_records(count: u32) -> Vec<EventRecord> {
    (1..=count)
        .map(|frame| {
            let mut update = FrameUpdate { frame_counter: frame, ..Default::default() };
            for (i, competitor) in update.competitors.iter_mut().enumerate() {
                let phase = frame as f32 / 30.0 + i as f32;
                competitor.stocks = 4;
                competitor.x = phase.sin() * 100.0;
                competitor.y = phase.cos().abs() * 20.0;
                competitor.percent = (frame / 90) as f32;
                competitor.last_hit_by = (1 - i) as u8;
                competitor.animation = if frame % 90 < 10 { 0x4B } else { 0x0E };
            }
            update.to_record()
        })
        .collect()
}

fn bench_decode(c: &mut Criterion) {
    let records = frame_records(1);
    c.bench_function("decode_frame_update", |b| {
        b.iter(|| black_box(decode(black_box(&records[0]))))
    });
}

fn bench_match(c: &mut Criterion) {
    let start = setup_record();
    // eight minutes of frames
    let frames = frame_records(8 * 60 * 60);

    c.bench_function("process_full_match", |b| {
        b.iter(|| {
            let mut engine = StatsEngine::new(EngineConfig::default());
            engine.process(&start);
            for record in &frames {
                black_box(engine.process(record));
            }
            black_box(engine.diagnostics())
        })
    });
}

criterion_group!(benches, bench_decode, bench_match);
criterion_main!(benches);
