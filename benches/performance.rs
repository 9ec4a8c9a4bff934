// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Clashframe Inc.

//! Performance benchmarks

use clashframe::clash::{ClashDetector, DetectOptions};
use clashframe::geometry::{triangulate, Mesh, Primitive};
use clashframe::{ClipBoolean, Element, MeshBoolean, ParryBoolean};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use nalgebra::{Matrix4, Point3, Vector3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f64::consts::TAU;

fn placed(mut mesh: Mesh, x: f64, y: f64, z: f64) -> Mesh {
    mesh.transform(&Matrix4::new_translation(&Vector3::new(x, y, z)));
    mesh
}

fn scattered(prefix: &str, count: usize, rng: &mut StdRng) -> Vec<Element> {
    (0..count)
        .map(|i| {
            let size = rng.gen_range(0.5..2.0);
            let mesh = placed(
                Primitive::cube(Vector3::new(size, size, size), false).to_mesh(),
                rng.gen_range(0.0..30.0),
                rng.gen_range(0.0..30.0),
                rng.gen_range(0.0..10.0),
            );
            Element::new(format!("{prefix}{i}"), vec![mesh])
        })
        .collect()
}

fn bench_triangulate(c: &mut Criterion) {
    let mut group = c.benchmark_group("triangulate");

    for n in [4usize, 16, 64, 256] {
        let polygon: Vec<Point3<f64>> = (0..n)
            .map(|i| {
                let a = TAU * i as f64 / n as f64;
                Point3::new(a.cos(), a.sin(), 0.0)
            })
            .collect();
        group.bench_with_input(BenchmarkId::new("regular", n), &polygon, |b, polygon| {
            b.iter(|| triangulate(black_box(polygon)).unwrap());
        });
    }

    group.finish();
}

fn bench_intersect(c: &mut Criterion) {
    let mut group = c.benchmark_group("intersect");

    let cube = Primitive::cube(Vector3::new(1.0, 1.0, 1.0), false).to_mesh();
    let shifted = placed(cube.clone(), 0.5, 0.25, 0.1);
    let duct = placed(Primitive::cylinder(4.0, 0.3, 48).to_mesh(), 0.5, 0.5, -1.5);

    group.bench_function("clip_cubes", |b| {
        b.iter(|| ClipBoolean::default().intersect(black_box(&cube), black_box(&shifted)).unwrap());
    });

    group.bench_function("clip_cylinder", |b| {
        b.iter(|| ClipBoolean::default().intersect(black_box(&duct), black_box(&cube)).unwrap());
    });

    group.bench_function("parry_cylinder", |b| {
        b.iter(|| ParryBoolean.intersect(black_box(&duct), black_box(&cube)));
    });

    group.finish();
}

fn bench_pair_scan(c: &mut Criterion) {
    let mut group = c.benchmark_group("pair_scan");
    group.sample_size(20);

    let mut rng = StdRng::seed_from_u64(42);
    for count in [25usize, 100] {
        let reference = scattered("R", count, &mut rng);
        let candidates = scattered("C", count, &mut rng);
        let detector = ClashDetector::new(ClipBoolean::default());

        for broad_phase in [true, false] {
            let options = DetectOptions {
                broad_phase,
                ..DetectOptions::default()
            };
            let label = if broad_phase { "broad_phase" } else { "exhaustive" };
            group.bench_with_input(BenchmarkId::new(label, count), &options, |b, options| {
                b.iter(|| detector.detect(&reference, &candidates, options).unwrap());
            });
        }
    }

    group.finish();
}

criterion_group!(benches, bench_triangulate, bench_intersect, bench_pair_scan);
criterion_main!(benches);
