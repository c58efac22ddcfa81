use calpulse::prelude::*;
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn populated_collector(samples: usize) -> TelemetryCollector {
    let telemetry = TelemetryCollector::new(TelemetryConfig {
        max_metrics: samples,
        ..Default::default()
    });
    for i in 0..samples {
        telemetry.record_metric("render.duration", i as f64);
    }
    telemetry
}

fn bench_record(c: &mut Criterion) {
    let telemetry = TelemetryCollector::default();

    c.bench_function("record_metric", |b| {
        b.iter(|| telemetry.record_metric(black_box("render.duration"), black_box(16.7)))
    });

    c.bench_function("record_cache_event", |b| {
        b.iter(|| telemetry.record_cache_event(black_box("events"), CacheOp::Hit))
    });
}

fn bench_query(c: &mut Criterion) {
    let telemetry = populated_collector(1000);

    c.bench_function("query_series_1000", |b| {
        b.iter(|| {
            telemetry.query(
                black_box(Some("render.duration")),
                QueryOptions {
                    limit: Some(100),
                    since_ms: None,
                },
            )
        })
    });

    c.bench_function("statistics_1000", |b| {
        b.iter(|| telemetry.statistics(black_box("render.duration"), QueryOptions::default()))
    });
}

fn bench_report(c: &mut Criterion) {
    let telemetry = populated_collector(1000);
    telemetry.record_cache_event("events", CacheOp::Hit);

    c.bench_function("report_1000", |b| b.iter(|| telemetry.report()));
}

criterion_group!(benches, bench_record, bench_query, bench_report);
criterion_main!(benches);
