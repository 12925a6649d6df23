// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Performance benchmarks

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use nalgebra::{Point3, Vector3};
use polyframe_spatial::TriangleMesh;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Grid of `cells x cells` quads in the XY plane
fn grid_soup(cells: usize) -> Vec<Point3<f64>> {
    let mut positions = Vec::with_capacity(cells * cells * 6);
    for row in 0..cells {
        for col in 0..cells {
            let (x0, y0) = (col as f64, row as f64);
            let (x1, y1) = (x0 + 1.0, y0 + 1.0);
            positions.push(Point3::new(x0, y0, 0.0));
            positions.push(Point3::new(x1, y0, 0.0));
            positions.push(Point3::new(x1, y1, 0.0));
            positions.push(Point3::new(x0, y0, 0.0));
            positions.push(Point3::new(x1, y1, 0.0));
            positions.push(Point3::new(x0, y1, 0.0));
        }
    }
    positions
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("build");

    for cells in [8usize, 32, 64] {
        let soup = grid_soup(cells);
        group.bench_with_input(
            BenchmarkId::new("grid", cells * cells * 2),
            &soup,
            |b, soup| {
                b.iter(|| TriangleMesh::build(black_box(soup), &[]).unwrap());
            },
        );
    }

    group.finish();
}

fn bench_queries(c: &mut Criterion) {
    let mut group = c.benchmark_group("queries");

    let cells = 64usize;
    let mesh = TriangleMesh::build(&grid_soup(cells), &[]).unwrap();
    let extent = cells as f64;
    let mut rng = StdRng::seed_from_u64(42);

    let origins: Vec<Point3<f64>> = (0..256)
        .map(|_| {
            Point3::new(
                rng.gen_range(0.0..extent),
                rng.gen_range(0.0..extent),
                4.0,
            )
        })
        .collect();

    group.bench_function("intersect_segment", |b| {
        let mut cursor = 0;
        b.iter(|| {
            let origin = &origins[cursor % origins.len()];
            cursor += 1;
            let end = Point3::new(origin.x, origin.y, -4.0);
            mesh.intersect_segment(black_box(origin), black_box(&end), true)
        });
    });

    group.bench_function("intersect_ray", |b| {
        let down = Vector3::new(0.0, 0.0, -1.0);
        let mut cursor = 0;
        b.iter(|| {
            let origin = &origins[cursor % origins.len()];
            cursor += 1;
            mesh.intersect_ray(black_box(origin), black_box(&down), true)
        });
    });

    group.bench_function("closest_point", |b| {
        let mut cursor = 0;
        b.iter(|| {
            let origin = &origins[cursor % origins.len()];
            cursor += 1;
            mesh.closest_point(black_box(origin), 8.0, true)
        });
    });

    group.finish();
}

criterion_group!(benches, bench_build, bench_queries);
criterion_main!(benches);
