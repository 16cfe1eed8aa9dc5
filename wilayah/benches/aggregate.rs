//! Benchmarks pour le noyau géométrique et l'agrégation

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use geo::{LineString, Polygon};
use serde_json::{json, Map, Value};
use wilayah::{aggregate, polygon_centroid, AggregateOptions, Feature, Polygonal, RegionBoundarySet};

fn square(x: f64, y: f64, size: f64) -> Polygonal {
    Polygonal::Polygon(Polygon::new(
        LineString::from(vec![
            (x, y),
            (x + size, y),
            (x + size, y + size),
            (x, y + size),
            (x, y),
        ]),
        vec![],
    ))
}

fn properties(value: Value) -> Map<String, Value> {
    value.as_object().cloned().unwrap_or_default()
}

/// Grille de `side * side` régions de 1°
fn regions(side: usize) -> RegionBoundarySet {
    let features: Vec<Feature> = (0..side * side)
        .map(|i| {
            let (x, y) = ((i % side) as f64, (i / side) as f64);
            Feature::new(
                Some(square(x, y, 1.0)),
                properties(json!({ "KECAMATAN": format!("K{}", i) })),
            )
        })
        .collect();
    RegionBoundarySet::build(&features, "KECAMATAN")
}

fn subjects(count: usize, side: usize) -> Vec<Feature> {
    (0..count)
        .map(|i| {
            let x = (i % (side * 10)) as f64 / 10.0 + 0.01;
            let y = ((i / (side * 10)) % (side * 10)) as f64 / 10.0 + 0.01;
            Feature::new(
                Some(square(x, y, 0.05)),
                properties(json!({ "TAHUN": 2018 + (i % 5) })),
            )
        })
        .collect()
}

fn bench_centroid(c: &mut Criterion) {
    let geometry = square(107.4, -6.6, 0.06);
    c.bench_function("polygon_centroid", |b| {
        b.iter(|| polygon_centroid(black_box(&geometry)))
    });
}

fn bench_aggregate(c: &mut Criterion) {
    let mut group = c.benchmark_group("aggregate");
    let side = 10;
    let boundaries = regions(side);
    let options = AggregateOptions::new("TAHUN");

    for count in [1_000, 10_000] {
        let features = subjects(count, side);
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &features, |b, features| {
            b.iter(|| black_box(aggregate(black_box(features), &boundaries, &options)))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_centroid, bench_aggregate);
criterion_main!(benches);
