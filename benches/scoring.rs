use criterion::{black_box, criterion_group, criterion_main, Criterion};

use squad_guessr::core::fuzzy::{levenshtein, name_distance};
use squad_guessr::core::scoring::{location_points, scaled_steps};
use squad_guessr::core::{score_location, CoordinateTransform, MapMetadata};
use squad_guessr::types::{DisplayPoint, WorldSize};

fn bench_score_location(c: &mut Criterion) {
    c.bench_function("score_location_sweep", |b| {
        b.iter(|| {
            let mut total = 0u32;
            for d in (0..600).step_by(7) {
                total += score_location(black_box(d as f64), black_box(4340.0)).points;
            }
            total
        })
    });

    let steps = scaled_steps(4340.0);
    c.bench_function("location_points_prescaled", |b| {
        b.iter(|| location_points(black_box(173.5), black_box(&steps)))
    });
}

fn bench_name_matching(c: &mut Criterion) {
    c.bench_function("levenshtein_map_names", |b| {
        b.iter(|| levenshtein(black_box("fool's road"), black_box("fools raod")))
    });

    c.bench_function("name_distance_multiword", |b| {
        b.iter(|| name_distance(black_box("I think it is Al Basrah"), black_box("Al Basrah")))
    });
}

fn bench_transform(c: &mut Criterion) {
    let map = MapMetadata::new("gorodok", WorldSize::square(4340.0));
    let transform = CoordinateTransform::new(&map).unwrap();

    c.bench_function("guess_to_world", |b| {
        b.iter(|| transform.guess_to_world(black_box(DisplayPoint::new(301.0, -12.5))))
    });
}

criterion_group!(
    benches,
    bench_score_location,
    bench_name_matching,
    bench_transform
);
criterion_main!(benches);
