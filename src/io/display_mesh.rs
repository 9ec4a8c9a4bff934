// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Clashframe Inc.

//! Display-mesh decoding.
//!
//! Model objects carry their render geometry as flat buffers: `vertices`
//! holds x, y, z triples and `faces` is a count-prefixed index list
//! (`n, i0 .. in-1`). Older exports use `0` for a triangle and `1` for a quad
//! in place of the count.

use super::flatten::FlatObject;
use crate::element::Element;
use crate::error::{ConversionError, MeshError};
use crate::geometry::{triangulate, Mesh, Transform};
use nalgebra::Point3;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

/// Raw display mesh as stored on a model object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayMesh {
    pub vertices: Vec<f64>,
    pub faces: Vec<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub units: Option<String>,
}

impl DisplayMesh {
    pub fn new(vertices: Vec<f64>, faces: Vec<i64>) -> Self {
        Self {
            vertices,
            faces,
            units: None,
        }
    }

    pub fn from_value(value: &Value) -> Result<Self, ConversionError> {
        if !value.is_object() {
            return Err(ConversionError::Malformed(format!("expected a mesh object, got {}", kind(value))));
        }
        Self::deserialize(value).map_err(|err| ConversionError::Malformed(err.to_string()))
    }

    /// Decode into a triangle mesh. Polygon faces go through the ear clipper.
    pub fn to_mesh(&self) -> Result<Mesh, ConversionError> {
        if self.vertices.len() % 3 != 0 {
            return Err(ConversionError::VertexBuffer {
                len: self.vertices.len(),
            });
        }
        let positions: Vec<Point3<f64>> = self
            .vertices
            .chunks_exact(3)
            .map(|c| Point3::new(c[0], c[1], c[2]))
            .collect();
        let vertex_count = positions.len();

        let mut triangles: Vec<[usize; 3]> = Vec::with_capacity(self.faces.len() / 4);
        let mut offset = 0;
        let mut face = 0;
        while offset < self.faces.len() {
            let size = face_size(offset, self.faces[offset])?;
            let available = self.faces.len() - offset - 1;
            if size > available {
                return Err(ConversionError::TruncatedFace {
                    offset,
                    size,
                    available,
                });
            }

            let indices = self.faces[offset + 1..offset + 1 + size]
                .iter()
                .enumerate()
                .map(|(k, &value)| {
                    let index = usize::try_from(value).map_err(|_| ConversionError::InvalidFaceValue {
                        offset: offset + 1 + k,
                        value,
                    })?;
                    if index >= vertex_count {
                        return Err(MeshError::IndexOutOfRange {
                            triangle: face,
                            index,
                            vertex_count,
                        }
                        .into());
                    }
                    Ok(index)
                })
                .collect::<Result<Vec<usize>, ConversionError>>()?;

            if let [a, b, c] = indices[..] {
                triangles.push([a, b, c]);
            } else {
                let ring: Vec<Point3<f64>> = indices.iter().map(|&i| positions[i]).collect();
                for [a, b, c] in triangulate(&ring)? {
                    triangles.push([indices[a], indices[b], indices[c]]);
                }
            }

            offset += size + 1;
            face += 1;
        }

        Ok(Mesh::from_buffers(positions, triangles)?)
    }
}

/// Number of indices announced by a face marker
fn face_size(offset: usize, marker: i64) -> Result<usize, ConversionError> {
    match marker {
        0 => Ok(3),
        1 => Ok(4),
        n if n < 0 => Err(ConversionError::InvalidFaceValue { offset, value: n }),
        n => Ok(n as usize),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Decode one display-mesh value
pub fn mesh_from_value(value: &Value) -> Result<Mesh, ConversionError> {
    DisplayMesh::from_value(value)?.to_mesh()
}

/// Build an element from a flattened model object.
///
/// `displayValue` may hold one mesh or a list. The transform chain is
/// composed once and applied to every mesh. Meshes that cannot be decoded are
/// skipped with a warning, so the element may end up without geometry.
pub fn element_from_object(object: &FlatObject<'_>, id: &str) -> Element {
    let display: Vec<&Value> = match object.value.get("displayValue") {
        Some(Value::Array(items)) => items.iter().collect(),
        Some(Value::Null) | None => Vec::new(),
        Some(single) => vec![single],
    };

    let mut meshes = Vec::with_capacity(display.len());
    for (i, value) in display.into_iter().enumerate() {
        if value.is_null() {
            continue;
        }
        match mesh_from_value(value) {
            Ok(mesh) => meshes.push(mesh),
            Err(err) => warn!(element = id, display_index = i, error = %err, "skipping display mesh"),
        }
    }

    let transform = Transform::compose(&object.transforms);
    debug!(
        element = id,
        meshes = meshes.len(),
        transforms = object.transforms.len(),
        "converted element"
    );
    Element::with_transform(id, meshes, &transform)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TriangulationError;
    use crate::geometry::analytics;
    use serde_json::json;

    fn unit_square_vertices() -> Vec<f64> {
        vec![
            0.0, 0.0, 0.0, //
            1.0, 0.0, 0.0, //
            1.0, 1.0, 0.0, //
            0.0, 1.0, 0.0,
        ]
    }

    #[test]
    fn test_count_prefixed_triangles() {
        let mesh = DisplayMesh::new(unit_square_vertices(), vec![3, 0, 1, 2, 3, 0, 2, 3])
            .to_mesh()
            .unwrap();
        assert_eq!(mesh.triangle_count(), 2);
        assert_eq!(mesh.triangles[1].indices, [0, 2, 3]);
    }

    #[test]
    fn test_quad_is_triangulated() {
        let mesh = DisplayMesh::new(unit_square_vertices(), vec![4, 0, 1, 2, 3])
            .to_mesh()
            .unwrap();
        assert_eq!(mesh.triangle_count(), 2);
        assert!((analytics::surface_area(&mesh) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_legacy_markers() {
        let mesh = DisplayMesh::new(unit_square_vertices(), vec![0, 0, 1, 2, 1, 0, 1, 2, 3])
            .to_mesh()
            .unwrap();
        assert_eq!(mesh.triangle_count(), 3);
    }

    #[test]
    fn test_pentagon_maps_to_global_indices() {
        let mut vertices = vec![9.0, 9.0, 9.0];
        for i in 0..5 {
            let a = std::f64::consts::TAU * i as f64 / 5.0;
            vertices.extend([a.cos(), a.sin(), 0.0]);
        }
        let mesh = DisplayMesh::new(vertices, vec![5, 1, 2, 3, 4, 5]).to_mesh().unwrap();
        assert_eq!(mesh.triangle_count(), 3);
        assert!(mesh.triangles.iter().all(|t| t.indices.iter().all(|&i| i >= 1)));
    }

    #[test]
    fn test_vertex_buffer_must_hold_triples() {
        let err = DisplayMesh::new(vec![0.0; 7], vec![]).to_mesh().unwrap_err();
        assert_eq!(err, ConversionError::VertexBuffer { len: 7 });
    }

    #[test]
    fn test_truncated_face() {
        let err = DisplayMesh::new(unit_square_vertices(), vec![4, 0, 1])
            .to_mesh()
            .unwrap_err();
        assert_eq!(
            err,
            ConversionError::TruncatedFace {
                offset: 0,
                size: 4,
                available: 2
            }
        );
    }

    #[test]
    fn test_index_out_of_range() {
        let err = DisplayMesh::new(unit_square_vertices(), vec![3, 0, 1, 2, 3, 0, 1, 9])
            .to_mesh()
            .unwrap_err();
        assert_eq!(
            err,
            ConversionError::Mesh(MeshError::IndexOutOfRange {
                triangle: 1,
                index: 9,
                vertex_count: 4
            })
        );
    }

    #[test]
    fn test_negative_values_are_rejected() {
        let err = DisplayMesh::new(unit_square_vertices(), vec![3, 0, -1, 2])
            .to_mesh()
            .unwrap_err();
        assert_eq!(err, ConversionError::InvalidFaceValue { offset: 2, value: -1 });
    }

    #[test]
    fn test_degenerate_polygon_fails_conversion() {
        let vertices = vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 2.0, 0.0, 0.0, 3.0, 0.0, 0.0];
        let err = DisplayMesh::new(vertices, vec![4, 0, 1, 2, 3]).to_mesh().unwrap_err();
        assert_eq!(
            err,
            ConversionError::Triangulation(TriangulationError::DegenerateNormal)
        );
    }

    #[test]
    fn test_from_value_rejects_non_mesh() {
        assert!(matches!(
            DisplayMesh::from_value(&json!([1, 2, 3])),
            Err(ConversionError::Malformed(_))
        ));
        assert!(matches!(
            DisplayMesh::from_value(&json!({ "speckle_type": "Objects.Geometry.Line" })),
            Err(ConversionError::Malformed(_))
        ));
    }
}
