// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Clashframe Inc.

//! Comparable model elements

use crate::geometry::{BoundingBox, Mesh, Transform};
use serde::{Deserialize, Serialize};

/// One logical model object: an identifier and its world-space meshes.
///
/// Elements are read-only once built. The identifier is stable for a run but
/// the same id may appear in both compared collections.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Element {
    id: String,
    meshes: Vec<Mesh>,
}

impl Element {
    pub fn new(id: impl Into<String>, meshes: Vec<Mesh>) -> Self {
        Self {
            id: id.into(),
            meshes,
        }
    }

    /// Build from local-space meshes, applying one composed transform to all
    pub fn with_transform(id: impl Into<String>, mut meshes: Vec<Mesh>, transform: &Transform) -> Self {
        for mesh in &mut meshes {
            mesh.apply(transform);
        }
        Self::new(id, meshes)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn meshes(&self) -> &[Mesh] {
        &self.meshes
    }

    /// An element without meshes can never clash
    pub fn is_empty(&self) -> bool {
        self.meshes.iter().all(Mesh::is_empty)
    }

    pub fn bounding_box(&self) -> BoundingBox {
        self.meshes
            .iter()
            .fold(BoundingBox::empty(), |acc, mesh| acc.union(&mesh.bounding_box()))
    }

    pub fn triangle_count(&self) -> usize {
        self.meshes.iter().map(Mesh::triangle_count).sum()
    }
}
