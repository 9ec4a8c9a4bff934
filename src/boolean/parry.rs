// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Clashframe Inc.

//! General intersection through parry's mesh boolean

use super::{Intersection, MeshBoolean};
use crate::error::BooleanError;
use crate::geometry::{analytics, Mesh, Triangle, Vertex};
use nalgebra::{Isometry3, Point3};
use parry3d::shape::{TriMesh, TriMeshFlags};
use parry3d::transformation::intersect_meshes;
use std::panic::{catch_unwind, AssertUnwindSafe};

/// Intersection of arbitrary closed manifolds via `parry3d`.
///
/// parry works in single precision, so both meshes are moved next to the
/// origin before conversion and the result is moved back afterwards.
#[derive(Debug, Clone, Copy, Default)]
pub struct ParryBoolean;

impl ParryBoolean {
    fn backend_error(message: impl Into<String>) -> BooleanError {
        BooleanError::Backend {
            backend: "parry",
            message: message.into(),
        }
    }
}

impl MeshBoolean for ParryBoolean {
    fn name(&self) -> &'static str {
        "parry"
    }

    fn intersect(&self, subject: &Mesh, tool: &Mesh) -> Result<Option<Intersection>, BooleanError> {
        if subject.is_empty() || tool.is_empty() {
            return Ok(None);
        }

        let subject_box = subject.bounding_box();
        let tool_box = tool.bounding_box();
        if !subject_box.intersects(&tool_box) {
            return Ok(None);
        }

        for (operand, mesh) in [("subject", subject), ("tool", tool)] {
            let open_edges = analytics::open_edge_count(mesh);
            if open_edges > 0 {
                return Err(BooleanError::OpenMesh { operand, open_edges });
            }
        }

        let origin = subject_box.union(&tool_box).center();
        let subject_tri = mesh_to_trimesh(subject, &origin)?;
        let tool_tri = mesh_to_trimesh(tool, &origin)?;

        // parry asserts on topology it cannot handle; keep that inside the task
        let identity = Isometry3::identity();
        let outcome = catch_unwind(AssertUnwindSafe(|| {
            intersect_meshes(&identity, &subject_tri, false, &identity, &tool_tri, false)
        }))
        .map_err(|panic| Self::backend_error(panic_message(&*panic)))?;

        let Some(result) = outcome.map_err(|err| Self::backend_error(err.to_string()))? else {
            return Ok(None);
        };

        let mesh = trimesh_to_mesh(&result, &origin);
        let volume = analytics::mesh_volume(&mesh);
        if volume <= 0.0 {
            return Ok(None);
        }
        Ok(Some(Intersection::new(mesh, volume)))
    }
}

/// Convert Mesh to parry3d TriMesh, relative to `origin`
fn mesh_to_trimesh(mesh: &Mesh, origin: &Point3<f64>) -> Result<TriMesh, BooleanError> {
    let vertices: Vec<Point3<f32>> = mesh
        .vertices
        .iter()
        .map(|v| (v.position - origin.coords).cast::<f32>())
        .collect();

    let indices: Vec<[u32; 3]> = mesh
        .triangles
        .iter()
        .map(|t| t.indices.map(|i| i as u32))
        .collect();

    // intersect_meshes needs the half-edge topology and the pseudo-normals
    let flags = TriMeshFlags::HALF_EDGE_TOPOLOGY
        | TriMeshFlags::ORIENTED
        | TriMeshFlags::MERGE_DUPLICATE_VERTICES;
    TriMesh::with_flags(vertices, indices, flags).map_err(|err| ParryBoolean::backend_error(err.to_string()))
}

/// Convert parry3d TriMesh back to a world-space Mesh
fn trimesh_to_mesh(trimesh: &TriMesh, origin: &Point3<f64>) -> Mesh {
    let mut mesh = Mesh::with_capacity(trimesh.vertices().len(), trimesh.indices().len());

    for vertex in trimesh.vertices() {
        mesh.add_vertex(Vertex::at(vertex.cast::<f64>() + origin.coords));
    }
    for indices in trimesh.indices() {
        mesh.add_triangle(Triangle::new(indices.map(|i| i as usize)));
    }

    mesh.recompute_normals();
    mesh
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        format!("panicked: {message}")
    } else if let Some(message) = panic.downcast_ref::<String>() {
        format!("panicked: {message}")
    } else {
        "panicked".to_string()
    }
}
