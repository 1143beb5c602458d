//! Per-frame serialization cost, which must stay off the frame loop's
//! critical path.

use criterion::{criterion_group, criterion_main, Criterion};

use tempo_log::LogWriter;
use tempo_timing::TimerRegistry;

fn write_frame(c: &mut Criterion) {
    let mut registry = TimerRegistry::new();
    for i in 0..16 {
        registry.register(&format!("timer-{i}"));
    }

    c.bench_function("write_frame_16_timers", |b| {
        let mut writer = LogWriter::new(Vec::<u8>::with_capacity(1 << 20));
        b.iter(|| writer.write_frame(&registry).unwrap());
    });
}

criterion_group!(benches, write_frame);
criterion_main!(benches);
