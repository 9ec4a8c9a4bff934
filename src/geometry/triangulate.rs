// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Clashframe Inc.

//! Ear-clipping triangulation of planar polygon faces.
//!
//! The clipper takes the first convex corner it finds in ring order and does
//! not test whether other polygon vertices fall inside the candidate ear. It
//! is exact for convex faces and holds up on mildly non-convex or slightly
//! non-planar ones, which is what model exchange formats produce for walls,
//! slabs and duct faces. Strongly non-convex or self-intersecting polygons
//! can come out with overlapping triangles; this is a known limitation.

use crate::error::TriangulationError;
use crate::utils::newell_normal;
use nalgebra::{Point3, Vector3};

/// Squared-length threshold, relative to the polygon's size, under which the
/// Newell normal counts as degenerate.
const DEGENERATE_NORMAL_EPS: f64 = 1e-12;

/// Triangulate a simple polygon given as an ordered ring of points.
///
/// Returned triples index into `points`. A polygon with N vertices yields
/// N − 2 triangles.
pub fn triangulate(points: &[Point3<f64>]) -> Result<Vec<[usize; 3]>, TriangulationError> {
    let count = points.len();
    if count < 3 {
        return Err(TriangulationError::TooFewVertices { count });
    }

    let normal = reference_normal(points)?;
    if count == 3 {
        return Ok(vec![[0, 1, 2]]);
    }

    let mut ring: Vec<usize> = (0..count).collect();
    let mut triangles = Vec::with_capacity(count - 2);
    let mut cursor = 0;

    // Each scan either clips an ear or fails, so N scans always suffice
    let mut scans_left = count;
    while ring.len() > 2 {
        if scans_left == 0 {
            return Err(TriangulationError::NoEarFound {
                remaining: ring.len(),
            });
        }
        scans_left -= 1;

        let len = ring.len();
        let ear = (0..len)
            .map(|step| (cursor + step) % len)
            .find(|&i| {
                let prev = points[ring[(i + len - 1) % len]];
                let curr = points[ring[i]];
                let next = points[ring[(i + 1) % len]];
                is_convex(&prev, &curr, &next, &normal)
            });

        let Some(i) = ear else {
            return Err(TriangulationError::NoEarFound { remaining: len });
        };

        triangles.push([ring[(i + len - 1) % len], ring[i], ring[(i + 1) % len]]);
        ring.remove(i);
        // Resume at the vertex that moved into the removed slot
        cursor = i % ring.len();
    }

    Ok(triangles)
}

/// Unit Newell normal of the polygon.
fn reference_normal(points: &[Point3<f64>]) -> Result<Vector3<f64>, TriangulationError> {
    let normal = newell_normal(points);

    let scale = points
        .iter()
        .skip(1)
        .map(|p| (p - points[0]).norm_squared())
        .fold(0.0, f64::max);
    if scale == 0.0 || normal.norm_squared() <= DEGENERATE_NORMAL_EPS * scale * scale {
        return Err(TriangulationError::DegenerateNormal);
    }

    Ok(normal.normalize())
}

/// Corner turns left around `normal`
fn is_convex(prev: &Point3<f64>, curr: &Point3<f64>, next: &Point3<f64>, normal: &Vector3<f64>) -> bool {
    (curr - prev).cross(&(next - curr)).dot(normal) > 0.0
}
