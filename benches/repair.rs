use criterion::{black_box, criterion_group, criterion_main, Criterion};

use pixel_mender::region::{BelowRule, ReadMode, Rect, RepairEngine};
use pixel_mender::video::Frame;

fn bench_repair(c: &mut Criterion) {
    let rect = Rect::new((948, 230), (954, 235)).unwrap();
    let frame = Frame::new_filled(1920, 1080, [30, 60, 90]);

    let cascade = RepairEngine::new(rect, BelowRule::Corrected, ReadMode::Cascade).unwrap();
    c.bench_function("repair_1080p_cascade", |b| {
        let mut frame = frame.clone();
        b.iter(|| cascade.repair_frame(black_box(&mut frame)).unwrap())
    });

    let snapshot = RepairEngine::new(rect, BelowRule::Corrected, ReadMode::Snapshot).unwrap();
    c.bench_function("repair_1080p_snapshot", |b| {
        let mut frame = frame.clone();
        b.iter(|| snapshot.repair_frame(black_box(&mut frame)).unwrap())
    });

    let large = Rect::new((100, 100), (400, 300)).unwrap();
    let large = RepairEngine::new(large, BelowRule::Corrected, ReadMode::Cascade).unwrap();
    c.bench_function("repair_1080p_large_rect", |b| {
        let mut frame = frame.clone();
        b.iter(|| large.repair_frame(black_box(&mut frame)).unwrap())
    });
}

criterion_group!(benches, bench_repair);
criterion_main!(benches);
