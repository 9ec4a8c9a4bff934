// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Clashframe Inc.

//! Geometry analytics: enclosed volume, surface area and closedness

use super::{BoundingBox, Mesh};
use ahash::AHashMap;
use nalgebra::Point3;
use serde::{Deserialize, Serialize};

/// Geometry statistics and analytics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeometryStats {
    /// Signed enclosed volume; positive for outward winding
    pub signed_volume: f64,
    /// Total surface area in square units
    pub surface_area: f64,
    pub bbox: BoundingBox,
    /// Mean of the vertex positions
    pub centroid: Point3<f64>,
    pub vertex_count: usize,
    pub triangle_count: usize,
    /// Directed edges without an opposite partner
    pub open_edges: usize,
}

impl GeometryStats {
    pub fn empty() -> Self {
        Self {
            signed_volume: 0.0,
            surface_area: 0.0,
            bbox: BoundingBox::empty(),
            centroid: Point3::origin(),
            vertex_count: 0,
            triangle_count: 0,
            open_edges: 0,
        }
    }

    /// Unsigned enclosed volume
    pub fn volume(&self) -> f64 {
        self.signed_volume.abs()
    }

    pub fn is_watertight(&self) -> bool {
        self.triangle_count > 0 && self.open_edges == 0
    }
}

/// Analyze mesh geometry and compute statistics
pub fn analyze(mesh: &Mesh) -> GeometryStats {
    let vertex_count = mesh.vertices.len();
    let triangle_count = mesh.triangles.len();

    if vertex_count == 0 || triangle_count == 0 {
        return GeometryStats::empty();
    }

    GeometryStats {
        signed_volume: signed_volume(mesh),
        surface_area: surface_area(mesh),
        bbox: mesh.bounding_box(),
        centroid: centroid(mesh),
        vertex_count,
        triangle_count,
        open_edges: open_edge_count(mesh),
    }
}

/// Signed volume by the divergence theorem.
///
/// Tetrahedra are fanned from the bounding-box centre instead of the world
/// origin so models far from the origin keep their precision. The result is
/// only meaningful for a closed surface.
pub fn signed_volume(mesh: &Mesh) -> f64 {
    if mesh.is_empty() {
        return 0.0;
    }
    let reference = mesh.bounding_box().center();
    signed_volume_about(mesh.triangle_iter(), &reference)
}

/// Signed volume of a triangle soup, fanned from `reference`
pub fn signed_volume_about<I>(triangles: I, reference: &Point3<f64>) -> f64
where
    I: IntoIterator<Item = [Point3<f64>; 3]>,
{
    let sum: f64 = triangles
        .into_iter()
        .map(|[v0, v1, v2]| {
            let a = v0 - reference;
            let b = v1 - reference;
            let c = v2 - reference;
            a.dot(&b.cross(&c))
        })
        .sum();
    sum / 6.0
}

/// Unsigned enclosed volume of a closed mesh
pub fn mesh_volume(mesh: &Mesh) -> f64 {
    signed_volume(mesh).abs()
}

/// Calculate total surface area
pub fn surface_area(mesh: &Mesh) -> f64 {
    mesh.triangle_iter()
        .map(|[v0, v1, v2]| crate::utils::triangle_area(&v0, &v1, &v2))
        .sum()
}

fn centroid(mesh: &Mesh) -> Point3<f64> {
    let sum = mesh
        .vertices
        .iter()
        .fold(nalgebra::Vector3::zeros(), |acc, v| acc + v.position.coords);
    Point3::from(sum / mesh.vertices.len() as f64)
}

/// Exact key for a position; `-0.0` and `0.0` share a key
pub(crate) type PositionKey = [u64; 3];

pub(crate) fn position_key(p: &Point3<f64>) -> PositionKey {
    [
        (p.x + 0.0).to_bits(),
        (p.y + 0.0).to_bits(),
        (p.z + 0.0).to_bits(),
    ]
}

/// Number of directed edges that are not cancelled by an opposite edge.
///
/// Edges are keyed by vertex position rather than index, so meshes with
/// duplicated corner vertices still count as closed. A closed, consistently
/// oriented surface has no open edges.
pub fn open_edge_count(mesh: &Mesh) -> usize {
    let mut balance: AHashMap<(PositionKey, PositionKey), i64> = AHashMap::new();

    for [v0, v1, v2] in mesh.triangle_iter() {
        let keys = [position_key(&v0), position_key(&v1), position_key(&v2)];
        for i in 0..3 {
            let from = keys[i];
            let to = keys[(i + 1) % 3];
            if from == to {
                continue;
            }
            if from < to {
                *balance.entry((from, to)).or_insert(0) += 1;
            } else {
                *balance.entry((to, from)).or_insert(0) -= 1;
            }
        }
    }

    balance.values().map(|net| net.unsigned_abs() as usize).sum()
}

/// Closed and consistently oriented
pub fn is_closed(mesh: &Mesh) -> bool {
    !mesh.is_empty() && open_edge_count(mesh) == 0
}
