// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Clashframe Inc.

//! Math utilities

use nalgebra::{Point3, Vector3};

/// Area of a triangle
pub fn triangle_area(p0: &Point3<f64>, p1: &Point3<f64>, p2: &Point3<f64>) -> f64 {
    (p1 - p0).cross(&(p2 - p0)).norm() / 2.0
}

/// Newell normal of a polygon, unnormalized.
///
/// Sums the cross-product terms of consecutive vertex pairs. Unlike a three-point
/// cross product this stays meaningful for non-convex and slightly non-planar
/// loops; its length is twice the projected polygon area.
pub fn newell_normal(points: &[Point3<f64>]) -> Vector3<f64> {
    let mut normal = Vector3::zeros();
    let count = points.len();
    for i in 0..count {
        let curr = &points[i];
        let next = &points[(i + 1) % count];
        normal.x += (curr.y - next.y) * (curr.z + next.z);
        normal.y += (curr.z - next.z) * (curr.x + next.x);
        normal.z += (curr.x - next.x) * (curr.y + next.y);
    }
    normal
}

/// Check if two floats are approximately equal
pub fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
    (a - b).abs() < epsilon
}
