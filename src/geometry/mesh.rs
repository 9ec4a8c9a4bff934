// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Clashframe Inc.

//! Mesh representation and utilities

use super::{BoundingBox, Transform};
use crate::error::MeshError;
use nalgebra::{Matrix4, Point3, Vector3};
use serde::{Deserialize, Serialize};

/// Vertex with position and normal
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Vertex {
    pub position: Point3<f64>,
    pub normal: Vector3<f64>,
}

impl Vertex {
    pub fn new(position: Point3<f64>, normal: Vector3<f64>) -> Self {
        Self { position, normal }
    }

    pub fn at(position: Point3<f64>) -> Self {
        Self::new(position, Vector3::z())
    }

    /// Move the position by `matrix` and the normal by `normal_matrix`,
    /// usually the inverse transpose from [`normal_matrix`].
    pub fn transform(&mut self, matrix: &Matrix4<f64>, normal_matrix: &Matrix4<f64>) {
        self.position = matrix.transform_point(&self.position);
        let normal = normal_matrix.transform_vector(&self.normal);
        self.normal = normal.try_normalize(f64::EPSILON).unwrap_or(self.normal);
    }
}

/// Inverse transpose of `matrix`, or `matrix` itself when it is singular
pub fn normal_matrix(matrix: &Matrix4<f64>) -> Matrix4<f64> {
    matrix
        .try_inverse()
        .map(|m| m.transpose())
        .unwrap_or(*matrix)
}

/// Triangle defined by three vertex indices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Triangle {
    pub indices: [usize; 3],
}

impl Triangle {
    pub fn new(indices: [usize; 3]) -> Self {
        Self { indices }
    }
}

/// Triangular mesh
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub triangles: Vec<Triangle>,
}

impl Mesh {
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            triangles: Vec::new(),
        }
    }

    pub fn empty() -> Self {
        Self::new()
    }

    pub fn with_capacity(vertex_count: usize, triangle_count: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(vertex_count),
            triangles: Vec::with_capacity(triangle_count),
        }
    }

    /// Build a mesh from a position buffer and triangle index triples.
    ///
    /// Every index must address an existing position. Normals are derived
    /// from the faces.
    pub fn from_buffers(positions: Vec<Point3<f64>>, faces: Vec<[usize; 3]>) -> Result<Self, MeshError> {
        let vertex_count = positions.len();
        for (triangle, face) in faces.iter().enumerate() {
            if let Some(&index) = face.iter().find(|&&index| index >= vertex_count) {
                return Err(MeshError::IndexOutOfRange {
                    triangle,
                    index,
                    vertex_count,
                });
            }
        }

        let mut mesh = Self {
            vertices: positions.into_iter().map(Vertex::at).collect(),
            triangles: faces.into_iter().map(Triangle::new).collect(),
        };
        mesh.recompute_normals();
        Ok(mesh)
    }

    /// Add a vertex and return its index
    pub fn add_vertex(&mut self, vertex: Vertex) -> usize {
        let index = self.vertices.len();
        self.vertices.push(vertex);
        index
    }

    /// Add a triangle
    pub fn add_triangle(&mut self, triangle: Triangle) {
        self.triangles.push(triangle);
    }

    /// Transform all vertices by a matrix
    pub fn transform(&mut self, matrix: &Matrix4<f64>) {
        let normals = normal_matrix(matrix);
        for vertex in &mut self.vertices {
            vertex.transform(matrix, &normals);
        }
    }

    /// Apply a composed transform, skipping the work for identity
    pub fn apply(&mut self, transform: &Transform) {
        if !transform.is_identity() {
            self.transform(transform.matrix());
        }
    }

    /// Compute bounding box
    pub fn bounding_box(&self) -> BoundingBox {
        BoundingBox::from_vertices(&self.vertices)
    }

    /// Get vertex count
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Get triangle count
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Corner positions of one triangle
    pub fn triangle_points(&self, triangle: &Triangle) -> [Point3<f64>; 3] {
        [
            self.vertices[triangle.indices[0]].position,
            self.vertices[triangle.indices[1]].position,
            self.vertices[triangle.indices[2]].position,
        ]
    }

    /// Iterate over the corner positions of every triangle
    pub fn triangle_iter(&self) -> impl Iterator<Item = [Point3<f64>; 3]> + '_ {
        self.triangles.iter().map(move |t| self.triangle_points(t))
    }

    /// Merge with another mesh (simple concatenation)
    pub fn merge(&mut self, other: &Mesh) {
        let offset = self.vertices.len();
        self.vertices.extend_from_slice(&other.vertices);

        for triangle in &other.triangles {
            self.triangles.push(Triangle::new([
                triangle.indices[0] + offset,
                triangle.indices[1] + offset,
                triangle.indices[2] + offset,
            ]));
        }
    }

    /// Reverse the winding of every triangle
    pub fn flip(&mut self) {
        for triangle in &mut self.triangles {
            triangle.indices.swap(1, 2);
        }
        for vertex in &mut self.vertices {
            vertex.normal = -vertex.normal;
        }
    }

    /// Recompute vertex normals from triangle geometry
    /// Face normals are area-weighted and averaged at shared vertices
    pub fn recompute_normals(&mut self) {
        if self.vertices.is_empty() || self.triangles.is_empty() {
            return;
        }

        let mut normal_sums: Vec<Vector3<f64>> = vec![Vector3::zeros(); self.vertices.len()];

        for triangle in &self.triangles {
            let [p0, p1, p2] = self.triangle_points(triangle);
            // Unnormalized cross product is already area-weighted
            let face_normal = (p1 - p0).cross(&(p2 - p0));
            if face_normal.norm() > 1e-12 {
                for &idx in &triangle.indices {
                    normal_sums[idx] += face_normal;
                }
            }
        }

        for (vertex, sum) in self.vertices.iter_mut().zip(normal_sums) {
            vertex.normal = sum.try_normalize(1e-12).unwrap_or_else(Vector3::z);
        }
    }
}

impl Default for Mesh {
    fn default() -> Self {
        Self::new()
    }
}
