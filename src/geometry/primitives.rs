// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Clashframe Inc.

//! Closed primitive solids used for fixtures, benchmarks and demo scenes

use super::{Mesh, Triangle, Vertex};
use nalgebra::{Point3, Vector3};
use std::f64::consts::PI;

/// Geometric primitives
pub enum Primitive {
    /// Box from the origin (or centred) with the given edge lengths
    Cube { size: Vector3<f64>, center: bool },
    /// Round segment along +z, like a duct run
    Cylinder { h: f64, r: f64, segments: u32 },
}

impl Primitive {
    pub fn cube(size: Vector3<f64>, center: bool) -> Self {
        Self::Cube { size, center }
    }

    pub fn cylinder(h: f64, r: f64, segments: u32) -> Self {
        let segments = if segments >= 3 { segments } else { 32 };
        Self::Cylinder { h, r, segments }
    }

    pub fn to_mesh(&self) -> Mesh {
        match self {
            Self::Cube { size, center } => generate_cube_mesh(*size, *center),
            Self::Cylinder { h, r, segments } => generate_cylinder_mesh(*h, *r, *segments),
        }
    }
}

fn generate_cube_mesh(size: Vector3<f64>, center: bool) -> Mesh {
    let mut mesh = Mesh::with_capacity(8, 12);

    let offset = if center { size / 2.0 } else { Vector3::zeros() };
    let (min_x, min_y, min_z) = (-offset.x, -offset.y, -offset.z);
    let (max_x, max_y, max_z) = (size.x - offset.x, size.y - offset.y, size.z - offset.z);

    // 8 shared corners so the surface is closed by index
    let positions = [
        Point3::new(min_x, min_y, min_z),
        Point3::new(max_x, min_y, min_z),
        Point3::new(max_x, max_y, min_z),
        Point3::new(min_x, max_y, min_z),
        Point3::new(min_x, min_y, max_z),
        Point3::new(max_x, min_y, max_z),
        Point3::new(max_x, max_y, max_z),
        Point3::new(min_x, max_y, max_z),
    ];
    for position in positions {
        mesh.add_vertex(Vertex::at(position));
    }

    // Two outward-wound triangles per face
    let faces = [
        [4, 5, 6],
        [4, 6, 7], // z+
        [1, 0, 3],
        [1, 3, 2], // z-
        [5, 1, 2],
        [5, 2, 6], // x+
        [0, 4, 7],
        [0, 7, 3], // x-
        [7, 6, 2],
        [7, 2, 3], // y+
        [0, 1, 5],
        [0, 5, 4], // y-
    ];
    for indices in faces {
        mesh.add_triangle(Triangle::new(indices));
    }

    mesh.recompute_normals();
    mesh
}

fn generate_cylinder_mesh(height: f64, radius: f64, segments: u32) -> Mesh {
    let mut mesh = Mesh::new();

    let bottom_center = mesh.add_vertex(Vertex::at(Point3::new(0.0, 0.0, 0.0)));
    let top_center = mesh.add_vertex(Vertex::at(Point3::new(0.0, 0.0, height)));

    let mut bottom = Vec::with_capacity(segments as usize);
    let mut top = Vec::with_capacity(segments as usize);
    for i in 0..segments {
        let angle = 2.0 * PI * i as f64 / segments as f64;
        let (sin, cos) = angle.sin_cos();
        bottom.push(mesh.add_vertex(Vertex::at(Point3::new(radius * cos, radius * sin, 0.0))));
        top.push(mesh.add_vertex(Vertex::at(Point3::new(radius * cos, radius * sin, height))));
    }

    let count = segments as usize;
    for i in 0..count {
        let next = (i + 1) % count;
        mesh.add_triangle(Triangle::new([bottom_center, bottom[next], bottom[i]]));
        mesh.add_triangle(Triangle::new([top_center, top[i], top[next]]));
        mesh.add_triangle(Triangle::new([bottom[i], bottom[next], top[i]]));
        mesh.add_triangle(Triangle::new([top[i], bottom[next], top[next]]));
    }

    mesh.recompute_normals();
    mesh
}
