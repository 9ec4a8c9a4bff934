// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Clashframe Inc.

//! Geometry module - mesh representation, transforms and measurements

pub mod analytics;
mod bbox;
mod mesh;
mod primitives;
mod transform;
mod triangulate;

pub use analytics::{analyze, is_closed, mesh_volume, open_edge_count, GeometryStats};
pub use bbox::BoundingBox;
pub use mesh::{Mesh, Triangle, Vertex};
pub use primitives::Primitive;
pub use transform::Transform;
pub use triangulate::triangulate;
