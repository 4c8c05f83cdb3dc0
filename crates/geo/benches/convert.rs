//! Benchmarks for geo crate notation converters.

use betterlocation_geo::{geohash, maidenhead, resolve_pair, Coordinate, Mgrs, RawAxis, Utm};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn bench_hemisphere_resolution(c: &mut Criterion) {
    c.bench_function("resolve_pair_swapped", |b| {
        b.iter(|| {
            resolve_pair(
                RawAxis::new(black_box(50.1)).with_prefix("E", false),
                RawAxis::new(black_box(14.2)).with_prefix("N", false),
            )
        })
    });
}

fn bench_grid_conversions(c: &mut Criterion) {
    let prague = Coordinate::new(50.087451, 14.420671).unwrap();
    let utm = Utm::from_coordinate(&prague).unwrap();
    let mgrs = Mgrs::from_coordinate(&prague, 5).unwrap();

    let mut group = c.benchmark_group("grid");

    group.bench_function("utm_forward", |b| b.iter(|| Utm::from_coordinate(black_box(&prague))));
    group.bench_function("utm_inverse", |b| b.iter(|| black_box(&utm).to_coordinate()));
    group.bench_function("mgrs_forward", |b| {
        b.iter(|| Mgrs::from_coordinate(black_box(&prague), 5))
    });
    group.bench_function("mgrs_inverse", |b| b.iter(|| black_box(&mgrs).to_coordinate()));

    group.finish();
}

fn bench_cell_codes(c: &mut Criterion) {
    let prague = Coordinate::new(50.087451, 14.420671).unwrap();

    let mut group = c.benchmark_group("cells");

    group.bench_function("geohash_encode", |b| {
        b.iter(|| geohash::encode(black_box(&prague), geohash::DEFAULT_LENGTH))
    });
    group.bench_function("geohash_decode", |b| b.iter(|| geohash::decode(black_box("u2fkbnhu9cxe"))));
    group.bench_function("maidenhead_encode", |b| b.iter(|| maidenhead::encode(black_box(&prague), maidenhead::MAX_LENGTH / 2)));
    group.bench_function("maidenhead_decode", |b| b.iter(|| maidenhead::decode(black_box("JO70fc12ab"))));

    group.finish();
}

criterion_group!(benches, bench_hemisphere_resolution, bench_grid_conversions, bench_cell_codes);
criterion_main!(benches);
